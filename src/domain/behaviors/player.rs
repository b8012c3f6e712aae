use super::{Behavior, TickContext, bomb::Bomb, bullet::Bullet};
use crate::domain::controls::{ControlState, HeldKeys};
use crate::domain::mailbox::{self, Mailbox, Token};
use crate::domain::physics::{BodyDesc, PhysicsError, Shape, Vec2};
use crate::domain::spawn::SpawnRequest;
use crate::domain::state::{EntityKind, EntityRecord, Sprite, SpriteRect};
use crate::domain::tuning::player::PlayerTuning;
use tokio::sync::watch;
use tracing::debug;

const PLAYER_RECT: SpriteRect = SpriteRect::new(325, 0, 98, 75);

#[derive(Debug)]
pub struct Player {
    record: EntityRecord,
    controls: watch::Receiver<ControlState>,
    keys: HeldKeys,
    inbox: Mailbox,

    // Seconds until the next allowed shot / bomb.
    shoot_cooldown: f32,
    bomb_cooldown: f32,
    bombs: u32,
    // Resync requests already turned into a full sync.
    resyncs_seen: u64,
}

impl Player {
    pub fn new(
        controls: watch::Receiver<ControlState>,
        mailbox_capacity: usize,
        tuning: &PlayerTuning,
    ) -> Self {
        let (address, inbox) = mailbox::mailbox(mailbox_capacity);
        let mut record = EntityRecord::new(EntityKind::Player, Sprite::frame(PLAYER_RECT));
        record.position = tuning.spawn_point;
        record.velocity = Some(Vec2::ZERO);
        record.inbox = Some(address);
        // A fresh player has never seen the static layer.
        record.needs_full_sync = true;

        Self {
            record,
            controls,
            keys: HeldKeys::default(),
            inbox,
            shoot_cooldown: 0.0,
            bomb_cooldown: 0.0,
            bombs: tuning.starting_bombs,
            resyncs_seen: 0,
        }
    }

    pub fn body_desc(&self, tuning: &PlayerTuning) -> BodyDesc {
        BodyDesc::dynamic(Shape::square(tuning.hull_size), self.record.position)
            .with_angle(self.record.angle)
    }

    pub fn bombs(&self) -> u32 {
        self.bombs
    }

    fn poll_controls(&mut self) {
        match self.controls.has_changed() {
            Ok(true) => {
                let state = *self.controls.borrow_and_update();
                self.keys = state.keys;
                if state.resync_requests != self.resyncs_seen {
                    self.resyncs_seen = state.resync_requests;
                    self.record.needs_full_sync = true;
                }
            }
            Ok(false) => {}
            // Connection side is gone; stop acting on stale input.
            Err(_) => self.keys = HeldKeys::default(),
        }
    }

    fn drain_inbox(&mut self) {
        while let Some(token) = self.inbox.try_take() {
            match token {
                Token::BombPlus => {
                    self.bombs += 1;
                    debug!(player_id = %self.record.id, bombs = self.bombs, "bomb charge picked up");
                }
            }
        }
    }
}

impl Behavior for Player {
    fn apply_behavior(&mut self, ctx: &mut TickContext<'_>) -> Result<(), PhysicsError> {
        let tuning = ctx.tuning.player;
        let dt = ctx.dt;

        self.poll_controls();
        self.drain_inbox();
        self.shoot_cooldown = (self.shoot_cooldown - dt).max(0.0);
        self.bomb_cooldown = (self.bomb_cooldown - dt).max(0.0);

        let Some(body) = self.record.body else {
            return Ok(());
        };

        let velocity = ctx.physics.velocity(body)?;
        if velocity.manhattan() > tuning.max_speed {
            ctx.physics
                .set_velocity(body, velocity * tuning.overspeed_damping)?;
        }

        let position = ctx.physics.position(body)?;
        let mut angle = ctx.physics.angle(body)?;

        if self.keys.bomb && self.bombs > 0 && self.bomb_cooldown <= 0.0 {
            let bomb = Bomb::new(position);
            let desc = bomb.body_desc(&ctx.tuning.bomb);
            ctx.spawner.submit(SpawnRequest::new(bomb, desc));
            self.bombs -= 1;
            self.bomb_cooldown = tuning.bomb_cooldown;
        }

        if self.keys.thrust {
            ctx.physics
                .apply_impulse(body, Vec2::facing(angle) * (tuning.thrust * dt))?;
        }

        if self.keys.turn_left != self.keys.turn_right {
            let direction = if self.keys.turn_left { -1.0 } else { 1.0 };
            angle += direction * tuning.turn_rate * dt;
            ctx.physics.set_angle(body, angle)?;
            ctx.physics.set_angular_velocity(body, 0.0)?;
        }

        if self.keys.brake {
            let velocity = ctx.physics.velocity(body)?;
            ctx.physics
                .set_velocity(body, velocity * tuning.brake_linear)?;
            let spin = ctx.physics.angular_velocity(body)?;
            ctx.physics
                .set_angular_velocity(body, spin * tuning.brake_angular)?;
        }

        if self.keys.shoot && self.shoot_cooldown <= 0.0 {
            ctx.spawner
                .submit(Bullet::fired_from(position, angle, &ctx.tuning.projectile));
            self.shoot_cooldown = tuning.shoot_cooldown;
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
