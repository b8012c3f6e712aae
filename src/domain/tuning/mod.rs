// Gameplay tuning, kept apart from runtime configuration (tick rate, queue sizes, ports).

pub mod enemy;
pub mod player;
pub mod projectile;

use enemy::EnemyTuning;
use player::PlayerTuning;
use projectile::{BombTuning, ProjectileTuning};

#[derive(Debug, Clone, Copy, Default)]
pub struct Tuning {
    pub player: PlayerTuning,
    pub projectile: ProjectileTuning,
    pub bomb: BombTuning,
    pub enemy: EnemyTuning,
}
