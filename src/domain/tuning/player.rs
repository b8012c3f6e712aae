//! Gameplay tuning for player-controlled ships.
//!
//! All distances are meters, all angles radians.

use crate::domain::physics::Vec2;

#[derive(Debug, Clone, Copy)]
pub struct PlayerTuning {
    /// Impulse applied per second of held thrust, along the facing direction.
    pub thrust: f32,

    /// Combined-axis speed (`|vx| + |vy|`) above which the ship is damped.
    pub max_speed: f32,

    /// Velocity multiplier applied each tick while over `max_speed`.
    pub overspeed_damping: f32,

    /// Rotation speed in radians per second.
    pub turn_rate: f32,

    // Brake multipliers, applied once per tick while S is held.
    pub brake_linear: f32,
    pub brake_angular: f32,

    /// Seconds between two shots.
    pub shoot_cooldown: f32,

    /// Seconds between two bomb drops.
    pub bomb_cooldown: f32,

    pub starting_bombs: u32,

    /// Side length of the square hull.
    pub hull_size: f32,

    pub spawn_point: Vec2,
}

impl Default for PlayerTuning {
    fn default() -> Self {
        Self {
            thrust: 60.0,
            max_speed: 25.0,
            overspeed_damping: 0.95,
            turn_rate: 2.0,
            brake_linear: 0.95,
            brake_angular: 0.75,
            shoot_cooldown: 0.5,
            bomb_cooldown: 0.5,
            starting_bombs: 1,
            hull_size: 1.0,
            spawn_point: Vec2::new(5.0, 5.0),
        }
    }
}
