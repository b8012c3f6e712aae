// Connected-player roster and the register/unregister workflow.

use crate::domain::behaviors::Player;
use crate::domain::controls::{ControlState, control_channel};
use crate::domain::EntityId;
use crate::use_cases::simulation::Simulation;
use std::collections::BTreeSet;
use tokio::sync::watch;
use tracing::info;

/// Ids of every connected player. Always a subset of the live entity ids.
#[derive(Debug, Default)]
pub struct Roster(BTreeSet<EntityId>);

impl Roster {
    pub fn insert(&mut self, id: EntityId) {
        self.0.insert(id);
    }

    /// Returns false when the id was not on the roster.
    pub fn remove(&mut self, id: EntityId) -> bool {
        self.0.remove(&id)
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.0.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.0.iter().copied()
    }
}

/// What a connection gets back from registration.
#[derive(Debug)]
pub struct PlayerHandle {
    pub id: EntityId,
    /// Latest-value channel the connection writes held keys into.
    pub controls: watch::Sender<ControlState>,
}

impl Simulation {
    /// Creates a player entity with its body and puts it on the roster.
    pub async fn register(&self) -> PlayerHandle {
        let (controls, controls_rx) = control_channel();
        let settings = self.settings();
        let player = Player::new(controls_rx, settings.mailbox_capacity, &settings.tuning.player);

        let mut world = self.lock_world().await;
        let id = world.register_player(player);
        info!(player_id = %id, players = world.roster().len(), "player registered");
        PlayerHandle { id, controls }
    }

    /// Removes the player from the roster, the live collection and physics in one lock
    /// section. Returns false when the player was already gone.
    pub async fn unregister(&self, id: EntityId) -> bool {
        let mut world = self.lock_world().await;
        let removed = world.unregister_player(id);
        if removed {
            info!(player_id = %id, players = world.roster().len(), "player unregistered");
        }
        removed
    }
}
