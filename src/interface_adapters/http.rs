// HTTP surface next to the WebSocket endpoint: a read-only status probe.

use crate::interface_adapters::state::AppState;
use axum::{Json, extract::State};
use std::sync::Arc;

#[derive(Debug, serde::Serialize)]
pub struct StatusResponse {
    // Ticks run since startup.
    pub tick: u64,
    // Players currently in the roster.
    pub players: usize,
    // Live entities of every kind, players included.
    pub entities: usize,
    // Open WebSocket connections known to the hub.
    pub connections: usize,
}

pub async fn status_handler(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    let stats = state.simulation.stats().await;
    let connections = state.hub.connection_count().await;
    Json(StatusResponse {
        tick: stats.tick,
        players: stats.players,
        entities: stats.entities,
        connections,
    })
}
