use crate::use_cases::{Hub, Simulation};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    // Active connections; registering here also registers the player.
    pub hub: Arc<Hub>,
    // Shared simulation, read by the status endpoint.
    pub simulation: Arc<Simulation>,
}
