// Hunter director: keeps roughly one turret per connected player in play.

use crate::domain::behaviors::{Tracker, Turret};
use crate::domain::spawn::SpawnRequest;
use crate::domain::tuning::enemy::EnemyTuning;
use crate::domain::Vec2;
use crate::use_cases::roster::Roster;
use std::time::Duration;

// Trackers appear beside the turret so the two bodies do not start overlapping.
const TRACKER_OFFSET: Vec2 = Vec2::new(1.5, 0.0);

#[derive(Debug)]
pub struct HunterDirector {
    interval: f32,
    elapsed: f32,
    // Round-robin position over the roster.
    cursor: usize,
}

impl HunterDirector {
    /// A zero interval disables the director.
    pub fn new(interval: Duration) -> Option<Self> {
        if interval.is_zero() {
            return None;
        }
        Some(Self {
            interval: interval.as_secs_f32(),
            elapsed: 0.0,
            cursor: 0,
        })
    }

    /// Spawns due this tick: one turret and one tracker aimed at the next player in turn,
    /// but only while there are fewer turrets than players.
    pub fn advance(
        &mut self,
        dt: f32,
        players: &Roster,
        turrets: usize,
        tuning: &EnemyTuning,
    ) -> Vec<SpawnRequest> {
        self.elapsed += dt;
        if self.elapsed < self.interval {
            return Vec::new();
        }
        self.elapsed = 0.0;

        if players.is_empty() || turrets >= players.len() {
            return Vec::new();
        }
        let Some(target) = players.iter().nth(self.cursor % players.len()) else {
            return Vec::new();
        };
        self.cursor = self.cursor.wrapping_add(1);

        let turret = Turret::new(target, tuning.spawn_point, tuning);
        let turret_body = turret.body_desc(tuning);
        let tracker = Tracker::new(target, tuning.spawn_point + TRACKER_OFFSET);
        let tracker_body = tracker.body_desc(tuning);
        vec![
            SpawnRequest::new(turret, turret_body),
            SpawnRequest::new(tracker, tracker_body),
        ]
    }
}
