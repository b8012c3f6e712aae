// Use-case level outputs of the simulation loop.

use crate::domain::{EntityId, ObjectSnapshot};
use std::sync::Arc;

/// One recipient's view of one tick.
///
/// `shared` is the same allocation for every recipient of a tick; `static_layer` is only
/// present on full-sync payloads.
#[derive(Debug, Clone)]
pub struct WorldUpdate {
    pub tick: u64,
    pub recipient: EntityId,
    pub shared: Arc<[ObjectSnapshot]>,
    pub static_layer: Option<Arc<[ObjectSnapshot]>>,
}

impl WorldUpdate {
    pub fn is_full_sync(&self) -> bool {
        self.static_layer.is_some()
    }

    pub fn objects(&self) -> impl Iterator<Item = &ObjectSnapshot> {
        self.shared
            .iter()
            .chain(self.static_layer.iter().flat_map(|layer| layer.iter()))
    }
}

/// Everything published by one loop iteration.
#[derive(Debug, Clone)]
pub struct WorldBroadcast {
    pub tick: u64,
    pub updates: Vec<WorldUpdate>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimulationStats {
    pub tick: u64,
    pub players: usize,
    pub entities: usize,
    pub bodies: usize,
}
