// Framework bootstrap for the arena server runtime.

use crate::frameworks::config;
use crate::interface_adapters::http::status_handler;
use crate::interface_adapters::map::TileMap;
use crate::interface_adapters::net::{broadcast::broadcast_task, client::ws_handler};
use crate::interface_adapters::physics::RapierPhysics;
use crate::interface_adapters::state::AppState;
use crate::use_cases::game::world_task;
use crate::use_cases::{Hub, Simulation, SimulationSettings};

use axum::{Router, routing::get};
use std::net::SocketAddr;
use std::{io::Result, sync::Arc};
use tokio::sync::mpsc;

fn init_runtime() {
    let _ = dotenvy::dotenv();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let json = matches!(std::env::var("LOG_FORMAT").as_deref(), Ok("json"));
    if json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .json()
            .with_current_span(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .compact()
            .init();
    }

    std::panic::set_hook(Box::new(|info| {
        let backtrace = std::backtrace::Backtrace::capture();
        tracing::error!(%info, ?backtrace, "panic");
    }));
}

pub async fn run(listener: tokio::net::TcpListener) -> Result<()> {
    let address = listener.local_addr()?;
    // build state
    let state = build_state().await?;
    // Start the Web Server
    let app = Router::new()
        .route("/ws", get(ws_handler))
        .route("/status", get(status_handler))
        .with_state(state);

    tracing::info!(%address, "listening");

    // Serve app and report errors rather than panicking
    axum::serve(listener, app).await.inspect_err(|e| {
        tracing::error!(error = %e, "server error");
    })
}

pub async fn run_with_config() -> Result<()> {
    init_runtime();

    let address = SocketAddr::new(config::http_host(), config::http_port());

    // Bind TCP listener with error handling
    let listener = tokio::net::TcpListener::bind(address)
        .await
        .inspect_err(|e| {
            tracing::error!(%address, error = %e, "failed to bind");
        })?;

    run(listener).await
}

async fn build_state() -> Result<Arc<AppState>> {
    let simulation = Arc::new(Simulation::new(
        RapierPhysics::new().boxed(),
        SimulationSettings {
            spawn_capacity: config::SPAWN_QUEUE_CAPACITY,
            mailbox_capacity: config::MAILBOX_CAPACITY,
            max_frame_delta: config::MAX_FRAME_DELTA,
            hunter_interval: config::hunter_spawn_interval(),
            ..SimulationSettings::default()
        },
    ));

    // Seed the initial world straight into the live collection; the spawn queue is
    // reserved for in-tick requests and would drop most of a map.
    let map = match config::tile_map_path() {
        Some(path) => {
            tracing::info!(path = %path.display(), "loading tile map");
            TileMap::load(&path).await
        }
        None => {
            tracing::info!("no tile map configured; using built-in arena");
            Ok(TileMap::default_arena())
        }
    };
    let spawns = map
        .and_then(TileMap::into_spawns)
        .map_err(|e| std::io::Error::other(format!("failed to load tile map: {e}")))?;
    let seeded = spawns.len();
    for request in spawns {
        simulation.admit(request).await;
    }
    tracing::debug!(seeded, "initial world seeded");

    let hub = Arc::new(Hub::new(simulation.clone(), config::OUTBOUND_QUEUE_CAPACITY));

    // World loop -> broadcaster -> per-connection queues.
    let (world_tx, world_rx) = mpsc::channel(config::WORLD_BROADCAST_CAPACITY);
    tokio::spawn(broadcast_task(world_rx, hub.clone()));

    let tick_interval = config::tick_interval();
    let world_simulation = simulation.clone();
    tokio::spawn(async move {
        if let Err(e) = world_task(world_simulation, world_tx, tick_interval).await {
            tracing::error!(error = %e, "world loop failed; shutting down");
            std::process::exit(1);
        }
    });

    Ok(Arc::new(AppState { hub, simulation }))
}
