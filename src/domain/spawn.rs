// Spawn pipeline: behaviors submit new entities here mid-tick; the loop drains them after
// every behavior has run.

use crate::domain::behaviors::{Behavior, Entity};
use crate::domain::physics::BodyDesc;
use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};
use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::debug;

/// A fully-built entity waiting for its physics body.
#[derive(Debug)]
pub struct SpawnRequest {
    pub entity: Entity,
    pub body: BodyDesc,
}

impl SpawnRequest {
    pub fn new(entity: impl Into<Entity>, body: BodyDesc) -> Self {
        Self {
            entity: entity.into(),
            body,
        }
    }
}

/// Producer half. Cheap to clone; every clone feeds the same bounded queue.
#[derive(Debug, Clone)]
pub struct SpawnSink {
    tx: mpsc::Sender<SpawnRequest>,
    dropped: Arc<AtomicU64>,
}

impl SpawnSink {
    /// Never waits. Returns false when the request was dropped (queue full or loop gone).
    pub fn submit(&self, request: SpawnRequest) -> bool {
        match self.tx.try_send(request) {
            Ok(()) => true,
            Err(TrySendError::Full(request)) => {
                let dropped = self.dropped.fetch_add(1, Ordering::Relaxed) + 1;
                debug!(
                    kind = request.entity.record().kind.as_str(),
                    dropped, "spawn pipeline full; request dropped"
                );
                false
            }
            Err(TrySendError::Closed(_)) => false,
        }
    }

    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}

/// Consumer half, owned by the world.
#[derive(Debug)]
pub struct SpawnQueue {
    rx: mpsc::Receiver<SpawnRequest>,
}

impl SpawnQueue {
    pub fn try_next(&mut self) -> Option<SpawnRequest> {
        self.rx.try_recv().ok()
    }
}

pub fn spawn_pipeline(capacity: usize) -> (SpawnSink, SpawnQueue) {
    let (tx, rx) = mpsc::channel(capacity.max(1));
    (
        SpawnSink {
            tx,
            dropped: Arc::new(AtomicU64::new(0)),
        },
        SpawnQueue { rx },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::behaviors::pickup::Pickup;
    use crate::domain::mailbox::Token;
    use crate::domain::physics::Vec2;

    fn pickup_request() -> SpawnRequest {
        let pickup = Pickup::new(Vec2::new(1.0, 1.0), Token::BombPlus);
        let body = pickup.body_desc();
        SpawnRequest::new(pickup, body)
    }

    #[test]
    fn when_pipeline_is_full_then_extra_requests_are_dropped_and_counted() {
        let (sink, mut queue) = spawn_pipeline(2);

        assert!(sink.submit(pickup_request()));
        assert!(sink.clone().submit(pickup_request()));
        assert!(!sink.submit(pickup_request()));
        assert_eq!(sink.dropped(), 1);

        assert!(queue.try_next().is_some());
        assert!(queue.try_next().is_some());
        assert!(queue.try_next().is_none());
    }
}
