use super::{Behavior, TickContext};
use crate::domain::physics::{BodyDesc, PhysicsError, Shape, Vec2};
use crate::domain::spawn::SpawnRequest;
use crate::domain::state::{EntityKind, EntityRecord, Sprite, SpriteRect};
use crate::domain::tuning::projectile::ProjectileTuning;

const BULLET_RECT: SpriteRect = SpriteRect::new(0, 0, 16, 16);

#[derive(Debug)]
pub struct Bullet {
    record: EntityRecord,
    // Seconds alive so far.
    age: f32,
}

impl Bullet {
    pub fn new(position: Vec2, angle: f32, velocity: Vec2) -> Self {
        let mut record = EntityRecord::new(EntityKind::Bullet, Sprite::frame(BULLET_RECT));
        record.position = position;
        record.angle = angle;
        record.velocity = Some(velocity);
        Self { record, age: 0.0 }
    }

    /// Bullet leaving a shooter at `origin` facing `angle`, already paired with its body.
    pub fn fired_from(origin: Vec2, angle: f32, tuning: &ProjectileTuning) -> SpawnRequest {
        let facing = Vec2::facing(angle);
        let bullet = Bullet::new(
            origin + facing * tuning.muzzle_offset,
            angle,
            facing * tuning.speed,
        );
        let body = bullet.body_desc(tuning);
        SpawnRequest::new(bullet, body)
    }

    pub fn body_desc(&self, tuning: &ProjectileTuning) -> BodyDesc {
        BodyDesc::dynamic(
            Shape::Circle {
                radius: tuning.radius,
            },
            self.record.position,
        )
        .with_angle(self.record.angle)
        .with_velocity(self.record.velocity.unwrap_or(Vec2::ZERO))
        .with_density(tuning.density)
    }

    pub fn age(&self) -> f32 {
        self.age
    }
}

impl Behavior for Bullet {
    fn apply_behavior(&mut self, ctx: &mut TickContext<'_>) -> Result<(), PhysicsError> {
        self.age += ctx.dt;
        if self.age >= ctx.tuning.projectile.life_time {
            self.record.mark_deleted();
            return Ok(());
        }

        let Some(body) = self.record.body else {
            return Ok(());
        };
        let hit = ctx.touching(body)?.into_iter().any(|(_, kind)| {
            matches!(
                kind,
                EntityKind::Player | EntityKind::Turret | EntityKind::Tracker | EntityKind::Bullet
            )
        });
        if hit {
            self.record.mark_deleted();
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::behaviors::{Entity, PeerDirectory, Pickup};
    use crate::domain::mailbox::Token;
    use crate::domain::physics::Physics;
    use crate::domain::spawn::spawn_pipeline;
    use crate::domain::tuning::Tuning;
    use crate::use_cases::test_support::ScriptedPhysics;

    fn spawned_bullet(physics: &mut ScriptedPhysics, tuning: &Tuning) -> Bullet {
        let request = Bullet::fired_from(Vec2::new(2.0, 2.0), 0.0, &tuning.projectile);
        let Entity::Bullet(mut bullet) = request.entity else {
            panic!("fired_from must build a bullet");
        };
        let body = physics.create_body(bullet.record().id, &request.body);
        bullet.record_mut().body = Some(body);
        bullet
    }

    fn tick(bullet: &mut Bullet, physics: &mut ScriptedPhysics, peers: &PeerDirectory, dt: f32) {
        let tuning = Tuning::default();
        let (sink, _queue) = spawn_pipeline(4);
        let mut ctx = TickContext {
            dt,
            physics,
            spawner: &sink,
            peers,
            tuning: &tuning,
        };
        bullet
            .apply_behavior(&mut ctx)
            .expect("scripted physics never fails here");
    }

    #[test]
    fn fired_bullet_starts_ahead_of_the_shooter_and_moves_along_facing() {
        let tuning = ProjectileTuning::default();
        let request = Bullet::fired_from(Vec2::new(2.0, 2.0), 0.0, &tuning);

        assert_eq!(request.body.position, Vec2::new(2.0, 1.0));
        assert!((request.body.velocity.y + tuning.speed).abs() < 1e-4);
    }

    #[test]
    fn when_age_reaches_lifetime_then_bullet_is_deleted_and_never_earlier() {
        let tuning = Tuning::default();
        let mut physics = ScriptedPhysics::default();
        let mut bullet = spawned_bullet(&mut physics, &tuning);
        let peers = PeerDirectory::from_records([bullet.record()]);

        for _ in 0..9 {
            tick(&mut bullet, &mut physics, &peers, 0.5);
            assert!(!bullet.record().pending_delete, "deleted at {}", bullet.age());
        }
        tick(&mut bullet, &mut physics, &peers, 0.5);
        assert!(bullet.record().pending_delete);
    }

    #[test]
    fn when_touching_a_pickup_then_bullet_survives() {
        let tuning = Tuning::default();
        let mut physics = ScriptedPhysics::default();
        let mut bullet = spawned_bullet(&mut physics, &tuning);
        let mut pickup = Pickup::new(Vec2::new(2.0, 1.0), Token::BombPlus);
        let pickup_body = physics.create_body(pickup.record().id, &pickup.body_desc());
        pickup.record_mut().body = Some(pickup_body);
        physics.touch(
            bullet.record().body.expect("bullet body"),
            pickup_body,
        );
        let peers = PeerDirectory::from_records([bullet.record(), pickup.record()]);

        tick(&mut bullet, &mut physics, &peers, 0.02);

        assert!(!bullet.record().pending_delete);
    }

    #[test]
    fn when_touching_another_bullet_then_bullet_is_deleted() {
        let tuning = Tuning::default();
        let mut physics = ScriptedPhysics::default();
        let mut first = spawned_bullet(&mut physics, &tuning);
        let second = spawned_bullet(&mut physics, &tuning);
        physics.touch(
            first.record().body.expect("bullet body"),
            second.record().body.expect("bullet body"),
        );
        let peers = PeerDirectory::from_records([first.record(), second.record()]);

        tick(&mut first, &mut physics, &peers, 0.02);

        assert!(first.record().pending_delete);
    }
}
