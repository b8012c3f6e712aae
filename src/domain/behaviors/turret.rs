use super::{Behavior, TickContext, aim_angle, bullet::Bullet, pickup::Pickup};
use crate::domain::ids::EntityId;
use crate::domain::mailbox::Token;
use crate::domain::physics::{BodyDesc, PhysicsError, Shape, Vec2};
use crate::domain::spawn::SpawnRequest;
use crate::domain::state::{EntityKind, EntityRecord, Sprite, SpriteRect};
use crate::domain::tuning::enemy::EnemyTuning;
use tracing::debug;

const TURRET_RECT: SpriteRect = SpriteRect::new(225, 0, 98, 75);

/// Stationary gun that tracks one player and fires on a fixed cadence.
#[derive(Debug)]
pub struct Turret {
    record: EntityRecord,
    target: EntityId,
    // Seconds until the next shot.
    reload: f32,
}

impl Turret {
    pub fn new(target: EntityId, position: Vec2, tuning: &EnemyTuning) -> Self {
        let sprite = Sprite::frame(TURRET_RECT).flipped(false, true, false);
        let mut record = EntityRecord::new(EntityKind::Turret, sprite);
        record.position = position;
        Self {
            record,
            target,
            reload: tuning.turret_fire_interval,
        }
    }

    pub fn body_desc(&self, tuning: &EnemyTuning) -> BodyDesc {
        BodyDesc::fixed(Shape::square(tuning.hull_size), self.record.position)
            .with_angle(self.record.angle)
    }

    pub fn target(&self) -> EntityId {
        self.target
    }
}

impl Behavior for Turret {
    fn apply_behavior(&mut self, ctx: &mut TickContext<'_>) -> Result<(), PhysicsError> {
        let Some(body) = self.record.body else {
            return Ok(());
        };

        let target = match ctx.peers.get(self.target) {
            Some(peer) if !peer.pending_delete => peer.position,
            _ => {
                debug!(entity_id = %self.record.id, target = %self.target, "turret target gone");
                self.record.mark_deleted();
                return Ok(());
            }
        };

        let position = ctx.physics.position(body)?;

        let shot_down = ctx
            .touching(body)?
            .into_iter()
            .any(|(_, kind)| kind == EntityKind::Bullet);
        if shot_down {
            let pickup = Pickup::new(position, Token::BombPlus);
            let desc = pickup.body_desc();
            ctx.spawner.submit(SpawnRequest::new(pickup, desc));
            self.record.mark_deleted();
            return Ok(());
        }

        let angle = aim_angle(position, target);
        ctx.physics.set_angle(body, angle)?;

        self.reload -= ctx.dt;
        if self.reload <= 0.0 {
            ctx.spawner
                .submit(Bullet::fired_from(position, angle, &ctx.tuning.projectile));
            self.reload = ctx.tuning.enemy.turret_fire_interval;
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
    use crate::domain::behaviors::PeerDirectory;
    use crate::domain::physics::Physics;
    use crate::domain::spawn::{SpawnQueue, spawn_pipeline};
    use crate::domain::tuning::Tuning;
    use crate::use_cases::test_support::ScriptedPhysics;

    fn placed_turret(physics: &mut ScriptedPhysics, target: EntityId, tuning: &Tuning) -> Turret {
        let mut turret = Turret::new(target, Vec2::new(10.0, 5.0), &tuning.enemy);
        let body = physics.create_body(turret.record().id, &turret.body_desc(&tuning.enemy));
        turret.record_mut().body = Some(body);
        turret
    }

    fn target_record(position: Vec2) -> EntityRecord {
        let mut record = EntityRecord::new(EntityKind::Player, Sprite::frame(TURRET_RECT));
        record.position = position;
        record
    }

    fn kinds(queue: &mut SpawnQueue) -> Vec<EntityKind> {
        std::iter::from_fn(|| queue.try_next())
            .map(|request| request.entity.record().kind)
            .collect()
    }

    #[test]
    fn when_target_is_gone_then_turret_deletes_itself_without_firing() {
        let tuning = Tuning::default();
        let mut physics = ScriptedPhysics::default();
        let mut target = target_record(Vec2::new(5.0, 5.0));
        target.mark_deleted();
        let mut turret = placed_turret(&mut physics, target.id, &tuning);
        // Ready to fire, so only the target check can stop it.
        turret.reload = 0.0;
        let peers = PeerDirectory::from_records([turret.record(), &target]);
        let (sink, mut queue) = spawn_pipeline(4);

        let mut ctx = TickContext {
            dt: 0.02,
            physics: &mut physics,
            spawner: &sink,
            peers: &peers,
            tuning: &tuning,
        };
        turret.apply_behavior(&mut ctx).expect("scripted physics");

        assert!(turret.record().pending_delete);
        assert!(kinds(&mut queue).is_empty());
    }

    #[test]
    fn when_cooldown_elapses_then_turret_fires_at_its_target() {
        let tuning = Tuning::default();
        let mut physics = ScriptedPhysics::default();
        let target = target_record(Vec2::new(5.0, 5.0));
        let mut turret = placed_turret(&mut physics, target.id, &tuning);
        let peers = PeerDirectory::from_records([turret.record(), &target]);
        let (sink, mut queue) = spawn_pipeline(4);

        let mut fired = Vec::new();
        for _ in 0..2 {
            let mut ctx = TickContext {
                dt: 2.5,
                physics: &mut physics,
                spawner: &sink,
                peers: &peers,
                tuning: &tuning,
            };
            turret.apply_behavior(&mut ctx).expect("scripted physics");
            fired.push(kinds(&mut queue));
        }

        assert!(fired[0].is_empty(), "first shot waits a full interval");
        assert_eq!(fired[1], vec![EntityKind::Bullet]);
        // Target is straight to the left: facing points along -X.
        let angle = physics
            .angle(turret.record().body.expect("turret body"))
            .expect("known body");
        let facing = Vec2::facing(angle);
        assert!((facing.x + 1.0).abs() < 1e-4);
    }

    #[test]
    fn when_hit_by_a_bullet_then_turret_drops_a_pickup_and_deletes() {
        let tuning = Tuning::default();
        let mut physics = ScriptedPhysics::default();
        let target = target_record(Vec2::new(5.0, 5.0));
        let mut turret = placed_turret(&mut physics, target.id, &tuning);
        let bullet = Bullet::new(Vec2::new(10.0, 4.0), 0.0, Vec2::ZERO);
        let bullet_body =
            physics.create_body(bullet.record().id, &bullet.body_desc(&tuning.projectile));
        physics.touch(turret.record().body.expect("turret body"), bullet_body);
        let peers = PeerDirectory::from_records([turret.record(), &target, bullet.record()]);
        let (sink, mut queue) = spawn_pipeline(4);

        let mut ctx = TickContext {
            dt: 0.02,
            physics: &mut physics,
            spawner: &sink,
            peers: &peers,
            tuning: &tuning,
        };
        turret.apply_behavior(&mut ctx).expect("scripted physics");

        assert!(turret.record().pending_delete);
        assert_eq!(kinds(&mut queue), vec![EntityKind::Pickup]);
    }
}
