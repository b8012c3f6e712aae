use std::{env, net::IpAddr, path::PathBuf, time::Duration};

// Runtime/server constants (not gameplay tuning).

pub fn http_host() -> IpAddr {
    env::var("SIM_SERVER_HOST")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(IpAddr::from([127, 0, 0, 1]))
}

pub fn http_port() -> u16 {
    env::var("SIM_SERVER_PORT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(8080)
}

// Unset means the built-in arena.
pub fn tile_map_path() -> Option<PathBuf> {
    env::var_os("TILE_MAP_PATH")
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
}

pub fn tick_interval() -> Duration {
    let millis = env::var("TICK_INTERVAL_MS")
        .ok()
        .and_then(|value| value.parse::<u64>().ok())
        .filter(|&value| value > 0)
        .unwrap_or(20);
    Duration::from_millis(millis)
}

// 0 disables the hunter director.
pub fn hunter_spawn_interval() -> Duration {
    let millis = env::var("HUNTER_SPAWN_INTERVAL_MS")
        .ok()
        .and_then(|value| value.parse::<u64>().ok())
        .unwrap_or(1000);
    Duration::from_millis(millis)
}

pub const SPAWN_QUEUE_CAPACITY: usize = 10;
pub const MAILBOX_CAPACITY: usize = 10;
pub const OUTBOUND_QUEUE_CAPACITY: usize = 64;
pub const WORLD_BROADCAST_CAPACITY: usize = 128;

// Upper bound on a single frame's delta after a stall.
pub const MAX_FRAME_DELTA: Duration = Duration::from_millis(250);
