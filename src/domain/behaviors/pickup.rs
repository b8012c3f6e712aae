use super::{Behavior, TickContext};
use crate::domain::mailbox::Token;
use crate::domain::physics::{BodyDesc, PhysicsError, Shape, Vec2};
use crate::domain::state::{EntityKind, EntityRecord, Sprite, SpriteRect};
use tracing::debug;

const PICKUP_RECT: SpriteRect = SpriteRect::new(0, 0, 16, 16);

#[derive(Debug)]
pub struct Pickup {
    record: EntityRecord,
    payload: Token,
}

impl Pickup {
    pub fn new(position: Vec2, payload: Token) -> Self {
        let mut record = EntityRecord::new(EntityKind::Pickup, Sprite::frame(PICKUP_RECT));
        record.position = position;
        Self { record, payload }
    }

    pub fn body_desc(&self) -> BodyDesc {
        BodyDesc::fixed(Shape::square(1.0), self.record.position)
    }

    pub fn payload(&self) -> Token {
        self.payload
    }
}

impl Behavior for Pickup {
    fn apply_behavior(&mut self, ctx: &mut TickContext<'_>) -> Result<(), PhysicsError> {
        let Some(body) = self.record.body else {
            return Ok(());
        };

        for (id, kind) in ctx.touching(body)? {
            if kind != EntityKind::Player {
                continue;
            }
            let delivered = ctx
                .peers
                .get(id)
                .and_then(|peer| peer.inbox.as_ref())
                .is_some_and(|inbox| inbox.deliver(self.payload));
            debug!(
                entity_id = %self.record.id,
                player_id = %id,
                payload = self.payload.as_str(),
                delivered,
                "pickup collected"
            );
            self.record.mark_deleted();
            break;
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
    use crate::domain::mailbox::mailbox;
    use crate::domain::physics::Physics;
    use crate::domain::spawn::spawn_pipeline;
    use crate::domain::tuning::Tuning;
    use crate::use_cases::test_support::ScriptedPhysics;

    #[test]
    fn when_player_touches_pickup_then_token_is_delivered_and_pickup_deleted() {
        let tuning = Tuning::default();
        let mut physics = ScriptedPhysics::default();
        let (address, mut inbox) = mailbox(2);
        let mut player = EntityRecord::new(EntityKind::Player, Sprite::frame(PICKUP_RECT));
        player.inbox = Some(address);
        let player_body = physics.create_body(
            player.id,
            &BodyDesc::dynamic(Shape::square(1.0), Vec2::new(7.0, 6.0)),
        );

        let mut pickup = Pickup::new(Vec2::new(7.0, 7.0), Token::BombPlus);
        let body = physics.create_body(pickup.record().id, &pickup.body_desc());
        pickup.record_mut().body = Some(body);
        physics.touch(body, player_body);

        let peers = PeerDirectory::from_records([pickup.record(), &player]);
        let (sink, _queue) = spawn_pipeline(4);
        let mut ctx = TickContext {
            dt: 0.02,
            physics: &mut physics,
            spawner: &sink,
            peers: &peers,
            tuning: &tuning,
        };
        pickup.apply_behavior(&mut ctx).expect("scripted physics");

        assert!(pickup.record().pending_delete);
        assert_eq!(inbox.try_take(), Some(Token::BombPlus));
    }

    #[test]
    fn when_nothing_touches_pickup_then_it_stays() {
        let tuning = Tuning::default();
        let mut physics = ScriptedPhysics::default();
        let mut pickup = Pickup::new(Vec2::new(7.0, 7.0), Token::BombPlus);
        let body = physics.create_body(pickup.record().id, &pickup.body_desc());
        pickup.record_mut().body = Some(body);
        let peers = PeerDirectory::from_records([pickup.record()]);
        let (sink, _queue) = spawn_pipeline(4);

        let mut ctx = TickContext {
            dt: 0.02,
            physics: &mut physics,
            spawner: &sink,
            peers: &peers,
            tuning: &tuning,
        };
        pickup.apply_behavior(&mut ctx).expect("scripted physics");

        assert!(!pickup.record().pending_delete);
    }
}
