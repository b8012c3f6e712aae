use super::simulation::{Simulation, SimulationError};
use super::types::WorldBroadcast;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

const LOG_THROTTLE: Duration = Duration::from_secs(2);

/// Drives the simulation on a fixed cadence and hands every tick's updates to the
/// broadcaster. Only returns on a physics failure or when the broadcaster is gone.
pub async fn world_task(
    simulation: Arc<Simulation>,
    world_tx: mpsc::Sender<WorldBroadcast>,
    tick_interval: Duration,
) -> Result<(), SimulationError> {
    let max_frame_delta = simulation.settings().max_frame_delta;

    let mut interval = tokio::time::interval(tick_interval);
    // A slow iteration shifts the schedule instead of bursting to catch up.
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let mut last_frame = Instant::now();
    let mut last_stall_log = Instant::now() - LOG_THROTTLE;

    info!(tick_ms = tick_interval.as_millis() as u64, "world loop started");
    loop {
        interval.tick().await;

        let now = Instant::now();
        let elapsed = now.duration_since(last_frame);
        last_frame = now;
        if elapsed > max_frame_delta {
            debug!(elapsed_ms = elapsed.as_millis() as u64, "frame delta clamped");
        }
        let dt = elapsed.min(max_frame_delta).as_secs_f32();

        simulation.tick(dt).await?;
        let batch = simulation.publish().await?;
        if batch.updates.is_empty() {
            continue;
        }

        // The batch has already consumed full-sync flags and tombstones, so it must not
        // be dropped. The broadcaster never blocks on clients, so this wait is short.
        if world_tx.capacity() == 0 && should_log(&mut last_stall_log) {
            warn!(tick = batch.tick, "broadcast queue full; world loop waiting");
        }
        if world_tx.send(batch).await.is_err() {
            info!("broadcast channel closed; world loop exiting");
            return Ok(());
        }
    }
}

fn should_log(last: &mut Instant) -> bool {
    if last.elapsed() >= LOG_THROTTLE {
        *last = Instant::now();
        true
    } else {
        false
    }
}
