/// Gameplay tuning for bullets.

#[derive(Debug, Clone, Copy)]
pub struct ProjectileTuning {
    /// Launch speed in meters per second.
    pub speed: f32,

    /// Lifetime in seconds before the bullet deletes itself.
    pub life_time: f32,

    /// Collision radius in meters.
    pub radius: f32,

    /// Distance ahead of the shooter's center where the bullet appears.
    pub muzzle_offset: f32,

    pub density: f32,
}

impl Default for ProjectileTuning {
    fn default() -> Self {
        Self {
            speed: 35.0,
            life_time: 5.0,
            radius: 0.125,
            muzzle_offset: 1.0,
            density: 50.5,
        }
    }
}

/// Gameplay tuning for dropped bombs.
#[derive(Debug, Clone, Copy)]
pub struct BombTuning {
    /// Seconds before detonation starts.
    pub fuse: f32,

    /// Number of detonation steps; each one rotates the bomb and fires one bullet.
    pub detonation_steps: u32,

    /// Side length of the bomb body.
    pub size: f32,
}

impl Default for BombTuning {
    fn default() -> Self {
        Self {
            fuse: 1.0,
            detonation_steps: 36,
            size: 0.25,
        }
    }
}
