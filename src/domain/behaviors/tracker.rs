use super::{Behavior, TickContext, aim_angle};
use crate::domain::ids::EntityId;
use crate::domain::physics::{BodyDesc, PhysicsError, Shape, Vec2};
use crate::domain::state::{EntityKind, EntityRecord, Sprite, SpriteRect};
use crate::domain::tuning::enemy::EnemyTuning;

const TRACKER_RECT: SpriteRect = SpriteRect::new(450, 0, 98, 75);

/// Homing drone. Dies on contact with a player or a bullet.
#[derive(Debug)]
pub struct Tracker {
    record: EntityRecord,
    target: EntityId,
}

impl Tracker {
    pub fn new(target: EntityId, position: Vec2) -> Self {
        let sprite = Sprite::frame(TRACKER_RECT).flipped(false, true, false);
        let mut record = EntityRecord::new(EntityKind::Tracker, sprite);
        record.position = position;
        record.velocity = Some(Vec2::ZERO);
        Self { record, target }
    }

    pub fn body_desc(&self, tuning: &EnemyTuning) -> BodyDesc {
        BodyDesc::dynamic(Shape::square(tuning.hull_size), self.record.position)
            .with_angle(self.record.angle)
    }

    pub fn target(&self) -> EntityId {
        self.target
    }
}

impl Behavior for Tracker {
    fn apply_behavior(&mut self, ctx: &mut TickContext<'_>) -> Result<(), PhysicsError> {
        let Some(body) = self.record.body else {
            return Ok(());
        };

        let target = match ctx.peers.get(self.target) {
            Some(peer) if !peer.pending_delete => peer.position,
            _ => {
                self.record.mark_deleted();
                return Ok(());
            }
        };

        let rammed = ctx
            .touching(body)?
            .into_iter()
            .any(|(_, kind)| matches!(kind, EntityKind::Player | EntityKind::Bullet));
        if rammed {
            self.record.mark_deleted();
            return Ok(());
        }

        let position = ctx.physics.position(body)?;
        let angle = aim_angle(position, target);
        ctx.physics.set_angle(body, angle)?;
        ctx.physics.apply_impulse(
            body,
            Vec2::facing(angle) * (ctx.tuning.enemy.tracker_thrust * ctx.dt),
        )?;
        Ok(())
    }

    fn record(&self) -> &EntityRecord {
        &self.record
    }

    fn record_mut(&mut self) -> &mut EntityRecord {
        &mut self.record
    }
}
