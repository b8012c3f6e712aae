// Simulation context shared by the loop, the hub and the HTTP handlers.

use crate::domain::spawn::spawn_pipeline;
use crate::domain::{EntityId, Physics, PhysicsError, SpawnRequest, SpawnSink, Tuning};
use crate::use_cases::director::HunterDirector;
use crate::use_cases::types::{SimulationStats, WorldBroadcast};
use crate::use_cases::world::World;
use std::fmt;
use std::time::Duration;
use tokio::sync::{Mutex, MutexGuard};

/// Runtime knobs for one simulation.
#[derive(Debug, Clone)]
pub struct SimulationSettings {
    /// Capacity of the spawn pipeline; extra requests in a tick are dropped.
    pub spawn_capacity: usize,
    /// Capacity of each player's mailbox.
    pub mailbox_capacity: usize,
    /// Upper bound for the frame delta handed to behaviors and physics.
    pub max_frame_delta: Duration,
    /// Cadence of the hunter director; zero disables it.
    pub hunter_interval: Duration,
    pub tuning: Tuning,
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            spawn_capacity: 10,
            mailbox_capacity: 10,
            max_frame_delta: Duration::from_millis(250),
            hunter_interval: Duration::ZERO,
            tuning: Tuning::default(),
        }
    }
}

#[derive(Debug)]
pub enum SimulationError {
    // Physics refused a step or lost track of a body; the loop cannot continue.
    Physics(PhysicsError),
}

impl fmt::Display for SimulationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimulationError::Physics(err) => write!(f, "physics failure: {err}"),
        }
    }
}

impl std::error::Error for SimulationError {}

impl From<PhysicsError> for SimulationError {
    fn from(e: PhysicsError) -> Self {
        SimulationError::Physics(e)
    }
}

pub struct Simulation {
    world: Mutex<World>,
    spawner: SpawnSink,
    settings: SimulationSettings,
}

impl Simulation {
    pub fn new(physics: Box<dyn Physics>, settings: SimulationSettings) -> Self {
        let (spawner, spawn_queue) = spawn_pipeline(settings.spawn_capacity);
        let director = HunterDirector::new(settings.hunter_interval);
        let world = World::new(physics, spawn_queue, settings.tuning, director);
        Self {
            world: Mutex::new(world),
            spawner,
            settings,
        }
    }

    pub fn settings(&self) -> &SimulationSettings {
        &self.settings
    }

    /// Producer handle for out-of-loop spawners (trigger scripts, bootstrap helpers).
    pub fn spawner(&self) -> SpawnSink {
        self.spawner.clone()
    }

    pub(crate) async fn lock_world(&self) -> MutexGuard<'_, World> {
        self.world.lock().await
    }

    /// Inserts an entity directly, bypassing the spawn pipeline. Used to seed the world.
    pub async fn admit(&self, request: SpawnRequest) -> EntityId {
        self.lock_world().await.admit(request)
    }

    /// First lock section: behaviors, spawn drain and one physics step.
    pub async fn tick(&self, dt: f32) -> Result<(), SimulationError> {
        let mut world = self.lock_world().await;
        world.step(dt, &self.spawner)?;
        Ok(())
    }

    /// Second lock section: resync, per-player updates and pruning.
    pub async fn publish(&self) -> Result<WorldBroadcast, SimulationError> {
        let mut world = self.lock_world().await;
        let updates = world.publish()?;
        Ok(WorldBroadcast {
            tick: world.stats().tick,
            updates,
        })
    }

    /// One full loop iteration without the sleep.
    pub async fn advance(&self, dt: f32) -> Result<WorldBroadcast, SimulationError> {
        self.tick(dt).await?;
        self.publish().await
    }

    pub async fn stats(&self) -> SimulationStats {
        self.lock_world().await.stats()
    }

    pub async fn is_registered(&self, id: EntityId) -> bool {
        self.lock_world().await.roster().contains(id)
    }

    pub fn spawns_dropped(&self) -> u64 {
        self.spawner.dropped()
    }
}
