use crate::interface_adapters::protocol::encode_world_update;
use crate::use_cases::{Hub, HubError, WorldBroadcast};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, error, info};

/// Serializes each tick's per-player updates and hands them to the hub.
///
/// Marshaling happens here so the world loop never waits on JSON encoding. Exits when the
/// world loop drops its sender.
pub async fn broadcast_task(mut world_rx: mpsc::Receiver<WorldBroadcast>, hub: Arc<Hub>) {
    while let Some(batch) = world_rx.recv().await {
        for update in &batch.updates {
            let bytes = match encode_world_update(update) {
                Ok(bytes) => bytes,
                Err(e) => {
                    error!(error = ?e, tick = batch.tick, "failed to serialize world update");
                    continue;
                }
            };
            match hub.deliver(update.recipient, bytes).await {
                Ok(()) => {}
                // Socket already gone; its registration is cleaned up by the socket task.
                Err(HubError::UnknownRecipient(id)) => {
                    debug!(player_id = %id, "update for closed connection dropped");
                }
                // Eviction has already been logged by the hub.
                Err(HubError::SlowConsumer(_) | HubError::Closed(_)) => {}
            }
        }
    }
    info!("world updates channel closed; broadcaster exiting");
}
