// Connection hub: maps connect/disconnect onto the roster and fans per-player payloads out
// to bounded per-connection queues.

use crate::domain::EntityId;
use crate::domain::controls::ControlState;
use crate::use_cases::simulation::Simulation;
use axum::extract::ws::Utf8Bytes;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tokio::sync::{Mutex, mpsc, mpsc::error::TrySendError, watch};
use tracing::{info, warn};

/// Everything a socket task needs after registration.
#[derive(Debug)]
pub struct Connection {
    /// Id of the player entity created for this connection.
    pub player_id: EntityId,
    /// Where the socket reader publishes held keys.
    pub controls: watch::Sender<ControlState>,
    /// Pre-serialized payloads for this connection. Yields `None` once the hub evicts it.
    pub outbound: mpsc::Receiver<Utf8Bytes>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HubError {
    /// No active connection for this player (already closed or evicted).
    UnknownRecipient(EntityId),
    /// Outbound queue was full; the connection has been evicted.
    SlowConsumer(EntityId),
    /// Socket task already dropped its queue; the connection has been evicted.
    Closed(EntityId),
}

impl fmt::Display for HubError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HubError::UnknownRecipient(id) => write!(f, "no connection for player {id}"),
            HubError::SlowConsumer(id) => write!(f, "player {id} evicted: outbound queue full"),
            HubError::Closed(id) => write!(f, "player {id} evicted: outbound queue closed"),
        }
    }
}

impl std::error::Error for HubError {}

/// Active connections keyed by player id.
pub struct Hub {
    /// Simulation whose roster mirrors the active connections.
    simulation: Arc<Simulation>,
    /// Sending half of every connection's outbound queue.
    connections: Mutex<HashMap<EntityId, mpsc::Sender<Utf8Bytes>>>,
    /// Capacity of each outbound queue.
    outbound_capacity: usize,
}

impl Hub {
    pub fn new(simulation: Arc<Simulation>, outbound_capacity: usize) -> Self {
        Self {
            simulation,
            connections: Mutex::new(HashMap::new()),
            outbound_capacity: outbound_capacity.max(1),
        }
    }

    pub fn simulation(&self) -> &Arc<Simulation> {
        &self.simulation
    }

    /// Registers a player and binds an outbound queue to it.
    pub async fn connect(&self) -> Connection {
        let (tx, outbound) = mpsc::channel(self.outbound_capacity);
        // Registering under the connections lock keeps the player's first payload from
        // reaching `deliver` before its queue exists.
        let mut connections = self.connections.lock().await;
        let handle = self.simulation.register().await;
        connections.insert(handle.id, tx);
        let active = connections.len();
        drop(connections);
        info!(player_id = %handle.id, active, "connection registered");
        Connection {
            player_id: handle.id,
            controls: handle.controls,
            outbound,
        }
    }

    /// Closes the connection and unregisters its player. Only the call that actually removes
    /// the connection unregisters, so every close path can call this safely.
    pub async fn disconnect(&self, player_id: EntityId) -> bool {
        let removed = self.connections.lock().await.remove(&player_id).is_some();
        if removed {
            self.simulation.unregister(player_id).await;
            info!(player_id = %player_id, "connection closed");
        }
        removed
    }

    /// Queues one payload without waiting. A full or closed queue evicts the connection.
    pub async fn deliver(&self, player_id: EntityId, payload: Utf8Bytes) -> Result<(), HubError> {
        let mut connections = self.connections.lock().await;
        let Some(tx) = connections.get(&player_id) else {
            return Err(HubError::UnknownRecipient(player_id));
        };
        let err = match tx.try_send(payload) {
            Ok(()) => return Ok(()),
            Err(TrySendError::Full(_)) => HubError::SlowConsumer(player_id),
            Err(TrySendError::Closed(_)) => HubError::Closed(player_id),
        };

        // Dropping the sender ends the socket task's queue, which closes the socket.
        connections.remove(&player_id);
        drop(connections);
        self.simulation.unregister(player_id).await;
        warn!(player_id = %player_id, error = %err, "connection evicted");
        Err(err)
    }

    pub async fn connection_count(&self) -> usize {
        self.connections.lock().await.len()
    }

    pub async fn is_connected(&self, player_id: EntityId) -> bool {
        self.connections.lock().await.contains_key(&player_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::use_cases::simulation::SimulationSettings;
    use crate::use_cases::test_support::ScriptedPhysics;

    fn hub(outbound_capacity: usize) -> Hub {
        let physics = ScriptedPhysics::default();
        let simulation = Arc::new(Simulation::new(
            physics.boxed(),
            SimulationSettings::default(),
        ));
        Hub::new(simulation, outbound_capacity)
    }

    #[tokio::test]
    async fn when_outbound_queue_is_full_then_connection_is_evicted_and_unregistered() {
        let hub = hub(1);
        let mut conn = hub.connect().await;

        hub.deliver(conn.player_id, Utf8Bytes::from("one"))
            .await
            .expect("first payload fits");
        let err = hub
            .deliver(conn.player_id, Utf8Bytes::from("two"))
            .await
            .expect_err("second payload overflows");

        assert_eq!(err, HubError::SlowConsumer(conn.player_id));
        assert!(!hub.is_connected(conn.player_id).await);
        assert!(!hub.simulation().is_registered(conn.player_id).await);
        assert_eq!(
            conn.outbound.recv().await.map(|bytes| bytes.as_str().to_owned()),
            Some("one".to_owned())
        );
        assert!(conn.outbound.recv().await.is_none());
    }

    #[tokio::test]
    async fn when_socket_closes_after_eviction_then_unregister_is_not_repeated() {
        let hub = hub(1);
        let conn = hub.connect().await;
        drop(conn.outbound);

        let err = hub
            .deliver(conn.player_id, Utf8Bytes::from("late"))
            .await
            .expect_err("queue closed");
        assert_eq!(err, HubError::Closed(conn.player_id));

        assert!(!hub.disconnect(conn.player_id).await);
        assert_eq!(hub.connection_count().await, 0);
        assert_eq!(hub.simulation().stats().await.players, 0);
    }

    #[tokio::test]
    async fn when_client_disconnects_then_player_leaves_the_roster() {
        let hub = hub(4);
        let conn = hub.connect().await;
        assert!(hub.simulation().is_registered(conn.player_id).await);

        assert!(hub.disconnect(conn.player_id).await);
        assert!(!hub.simulation().is_registered(conn.player_id).await);
        assert_eq!(
            hub.deliver(conn.player_id, Utf8Bytes::from("x")).await,
            Err(HubError::UnknownRecipient(conn.player_id))
        );
    }

    #[tokio::test]
    async fn when_publish_races_a_new_connection_then_its_full_sync_is_delivered() {
        let hub = Arc::new(hub(4));
        // Hold the world so the connect and the publish queue up behind it.
        let world = hub.simulation().lock_world().await;
        let connecting = tokio::spawn({
            let hub = hub.clone();
            async move { hub.connect().await }
        });
        tokio::task::yield_now().await;
        let publishing = tokio::spawn({
            let hub = hub.clone();
            async move {
                let batch = hub.simulation().publish().await.expect("publish");
                let mut delivered = Vec::new();
                for update in &batch.updates {
                    let outcome = hub
                        .deliver(update.recipient, Utf8Bytes::from("sync"))
                        .await;
                    delivered.push((update.is_full_sync(), outcome));
                }
                delivered
            }
        });
        tokio::task::yield_now().await;
        drop(world);

        let mut conn = connecting.await.expect("connect task panicked");
        let delivered = publishing.await.expect("publish task panicked");

        assert_eq!(delivered, vec![(true, Ok(()))]);
        assert_eq!(
            conn.outbound.recv().await.map(|bytes| bytes.as_str().to_owned()),
            Some("sync".to_owned())
        );
    }
}
