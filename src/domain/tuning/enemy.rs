//! Gameplay tuning for turrets and trackers.

use crate::domain::physics::Vec2;

#[derive(Debug, Clone, Copy)]
pub struct EnemyTuning {
    /// Seconds between two turret shots. The first shot also waits this long.
    pub turret_fire_interval: f32,

    /// Homing impulse per second applied by trackers.
    pub tracker_thrust: f32,

    /// Where the hunter director places new turret/tracker pairs.
    pub spawn_point: Vec2,

    pub hull_size: f32,
}

impl Default for EnemyTuning {
    fn default() -> Self {
        Self {
            turret_fire_interval: 5.0,
            tracker_thrust: 1.5,
            spawn_point: Vec2::new(12.0, 5.0),
            hull_size: 1.0,
        }
    }
}
