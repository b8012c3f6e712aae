use super::{Behavior, TickContext, tracker::Tracker, turret::Turret};
use crate::domain::ids::EntityId;
use crate::domain::physics::{BodyDesc, PhysicsError, Shape, Vec2};
use crate::domain::spawn::{SpawnRequest, SpawnSink};
use crate::domain::state::{EntityKind, EntityRecord, Sprite};
use crate::domain::tuning::enemy::EnemyTuning;
use std::time::Duration;
use tokio::runtime::Handle;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptedKind {
    Turret,
    Tracker,
}

impl ScriptedKind {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "turret" => Some(ScriptedKind::Turret),
            "tracker" => Some(ScriptedKind::Tracker),
            _ => None,
        }
    }
}

/// One scripted spawn. `delay` is measured from the moment the trigger trips.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TriggerAction {
    pub kind: ScriptedKind,
    pub delay: Duration,
    pub position: Vec2,
}

impl TriggerAction {
    fn into_request(self, target: EntityId, tuning: &EnemyTuning) -> SpawnRequest {
        match self.kind {
            ScriptedKind::Turret => {
                let turret = Turret::new(target, self.position, tuning);
                let body = turret.body_desc(tuning);
                SpawnRequest::new(turret, body)
            }
            ScriptedKind::Tracker => {
                let tracker = Tracker::new(target, self.position);
                let body = tracker.body_desc(tuning);
                SpawnRequest::new(tracker, body)
            }
        }
    }
}

/// Static map cell. A tile with a trigger runs its script once, for the first player that
/// touches it, and then removes itself.
#[derive(Debug)]
pub struct Tile {
    record: EntityRecord,
    trigger: Vec<TriggerAction>,
}

impl Tile {
    pub fn new(position: Vec2, sprite: Sprite) -> Self {
        let mut record = EntityRecord::new(EntityKind::Tile, sprite);
        record.position = position;
        record.is_static = true;
        Self {
            record,
            trigger: Vec::new(),
        }
    }

    pub fn with_trigger(mut self, actions: Vec<TriggerAction>) -> Self {
        self.trigger = actions;
        self
    }

    pub fn body_desc(&self) -> BodyDesc {
        BodyDesc::fixed(Shape::square(1.0), self.record.position)
    }

    pub fn is_trigger(&self) -> bool {
        !self.trigger.is_empty()
    }
}

impl Behavior for Tile {
    fn apply_behavior(&mut self, ctx: &mut TickContext<'_>) -> Result<(), PhysicsError> {
        if self.trigger.is_empty() {
            return Ok(());
        }
        let Some(body) = self.record.body else {
            return Ok(());
        };

        let Some(player) = ctx
            .touching(body)?
            .into_iter()
            .find_map(|(id, kind)| (kind == EntityKind::Player).then_some(id))
        else {
            return Ok(());
        };

        let actions = std::mem::take(&mut self.trigger);
        info!(
            entity_id = %self.record.id,
            player_id = %player,
            actions = actions.len(),
            "trigger tripped"
        );
        match Handle::try_current() {
            Ok(runtime) => {
                runtime.spawn(run_script(
                    actions,
                    tokio::time::Instant::now(),
                    player,
                    ctx.spawner.clone(),
                    ctx.tuning.enemy,
                ));
            }
            Err(_) => warn!(entity_id = %self.record.id, "no runtime; trigger script dropped"),
        }
        self.record.mark_deleted();
        Ok(())
    }

    fn record(&self) -> &EntityRecord {
        &self.record
    }

    fn record_mut(&mut self) -> &mut EntityRecord {
        &mut self.record
    }
}

async fn run_script(
    actions: Vec<TriggerAction>,
    tripped_at: tokio::time::Instant,
    target: EntityId,
    spawner: SpawnSink,
    tuning: EnemyTuning,
) {
    for action in actions {
        tokio::time::sleep_until(tripped_at + action.delay).await;
        spawner.submit(action.into_request(target, &tuning));
    }
}
