use super::{Behavior, TickContext, bullet::Bullet};
use crate::domain::physics::{BodyDesc, PhysicsError, Shape, Vec2};
use crate::domain::state::{EntityKind, EntityRecord, Sprite, SpriteRect};
use crate::domain::tuning::projectile::BombTuning;
use std::f32::consts::TAU;

const BOMB_RECT: SpriteRect = SpriteRect::new(0, 0, 16, 16);

#[derive(Debug)]
pub struct Bomb {
    record: EntityRecord,
    fuse_elapsed: f32,
    // None until the fuse burns out, then the number of detonation steps taken.
    detonation: Option<u32>,
}

impl Bomb {
    pub fn new(position: Vec2) -> Self {
        let mut record = EntityRecord::new(EntityKind::Bomb, Sprite::frame(BOMB_RECT));
        record.position = position;
        record.velocity = Some(Vec2::ZERO);
        Self {
            record,
            fuse_elapsed: 0.0,
            detonation: None,
        }
    }

    pub fn body_desc(&self, tuning: &BombTuning) -> BodyDesc {
        BodyDesc::dynamic(Shape::square(tuning.size), self.record.position)
    }

    pub fn is_detonating(&self) -> bool {
        self.detonation.is_some()
    }
}

impl Behavior for Bomb {
    fn apply_behavior(&mut self, ctx: &mut TickContext<'_>) -> Result<(), PhysicsError> {
        let tuning = ctx.tuning.bomb;
        let Some(body) = self.record.body else {
            return Ok(());
        };

        match self.detonation {
            None => {
                // Shot down before it goes off.
                let defused = ctx
                    .touching(body)?
                    .into_iter()
                    .any(|(_, kind)| kind == EntityKind::Bullet);
                if defused {
                    self.record.mark_deleted();
                    return Ok(());
                }
                self.fuse_elapsed += ctx.dt;
                if self.fuse_elapsed >= tuning.fuse {
                    self.detonation = Some(0);
                }
            }
            Some(step) if step > tuning.detonation_steps => {
                self.record.mark_deleted();
            }
            Some(step) => {
                let angle = TAU / tuning.detonation_steps.max(1) as f32 * step as f32;
                ctx.physics.set_angle(body, angle)?;
                let origin = ctx.physics.position(body)?;
                ctx.spawner
                    .submit(Bullet::fired_from(origin, angle, &ctx.tuning.projectile));
                self.detonation = Some(step + 1);
            }
        }
        Ok(())
    }

    fn record(&self) -> &EntityRecord {
        &self.record
    }

    fn record_mut(&mut self) -> &mut EntityRecord {
        &mut self.record
    }
}
