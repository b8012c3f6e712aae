// Use cases layer: the simulation loop, player roster and connection hub.

pub mod director;
pub mod game;
pub mod hub;
pub mod roster;
pub mod simulation;
pub mod types;
pub(crate) mod world;

#[cfg(test)]
pub(crate) mod test_support;

pub use hub::{Connection, Hub, HubError};
pub use roster::PlayerHandle;
pub use simulation::{Simulation, SimulationError, SimulationSettings};
pub use types::{SimulationStats, WorldBroadcast, WorldUpdate};
