// Per-kind behavior entities and the contract the simulation loop drives them through.

pub mod bomb;
pub mod bullet;
pub mod pickup;
pub mod player;
pub mod tile;
pub mod tracker;
pub mod turret;

use crate::domain::ids::EntityId;
use crate::domain::mailbox::MailboxAddress;
use crate::domain::physics::{BodyHandle, Physics, PhysicsError, Vec2};
use crate::domain::spawn::SpawnSink;
use crate::domain::state::{EntityKind, EntityRecord};
use crate::domain::tuning::Tuning;
use std::collections::HashMap;
use std::f32::consts::FRAC_PI_2;

pub use bomb::Bomb;
pub use bullet::Bullet;
pub use pickup::Pickup;
pub use player::Player;
pub use tile::{ScriptedKind, Tile, TriggerAction};
pub use tracker::Tracker;
pub use turret::Turret;

/// What one entity may know about another during a tick.
#[derive(Debug, Clone)]
pub struct PeerInfo {
    pub kind: EntityKind,
    pub position: Vec2,
    pub pending_delete: bool,
    pub inbox: Option<MailboxAddress>,
}

/// Read-only view of every live entity, rebuilt at the start of each tick.
///
/// Targets are held as ids and resolved here; an id that is missing or flagged for deletion
/// counts as gone.
#[derive(Debug, Default)]
pub struct PeerDirectory {
    peers: HashMap<EntityId, PeerInfo>,
}

impl PeerDirectory {
    pub fn from_records<'a>(records: impl IntoIterator<Item = &'a EntityRecord>) -> Self {
        let peers = records
            .into_iter()
            .map(|record| {
                (
                    record.id,
                    PeerInfo {
                        kind: record.kind,
                        position: record.position,
                        pending_delete: record.pending_delete,
                        inbox: record.inbox.clone(),
                    },
                )
            })
            .collect();
        Self { peers }
    }

    pub fn get(&self, id: EntityId) -> Option<&PeerInfo> {
        self.peers.get(&id)
    }

    pub fn kind_of(&self, id: EntityId) -> Option<EntityKind> {
        self.peers.get(&id).map(|peer| peer.kind)
    }

    pub fn is_gone(&self, id: EntityId) -> bool {
        self.peers.get(&id).is_none_or(|peer| peer.pending_delete)
    }
}

/// Everything a behavior may touch while it runs.
pub struct TickContext<'a> {
    /// Seconds since the previous tick.
    pub dt: f32,
    pub physics: &'a mut dyn Physics,
    pub spawner: &'a SpawnSink,
    pub peers: &'a PeerDirectory,
    pub tuning: &'a Tuning,
}

impl TickContext<'_> {
    /// Kinds of everything currently touching `body`. Contacts whose owner is not in the
    /// directory (spawned this tick, already pruned) are skipped.
    pub fn touching(&self, body: BodyHandle) -> Result<Vec<(EntityId, EntityKind)>, PhysicsError> {
        let contacts = self.physics.contacts(body)?;
        Ok(contacts
            .into_iter()
            .filter_map(|id| self.peers.kind_of(id).map(|kind| (id, kind)))
            .collect())
    }
}

pub trait Behavior {
    /// Advances this entity by one tick. Only its own record may change; effects on other
    /// entities go through mailboxes and the spawn sink.
    fn apply_behavior(&mut self, ctx: &mut TickContext<'_>) -> Result<(), PhysicsError>;

    fn record(&self) -> &EntityRecord;

    fn record_mut(&mut self) -> &mut EntityRecord;
}

/// Angle that makes a body at `from` face `to`, in the up-is-zero convention.
pub fn aim_angle(from: Vec2, to: Vec2) -> f32 {
    (to.y - from.y).atan2(to.x - from.x) + FRAC_PI_2
}

#[derive(Debug)]
pub enum Entity {
    Player(Player),
    Bullet(Bullet),
    Bomb(Bomb),
    Turret(Turret),
    Tracker(Tracker),
    Pickup(Pickup),
    Tile(Tile),
}

impl Entity {
    pub fn as_player(&self) -> Option<&Player> {
        match self {
            Entity::Player(player) => Some(player),
            _ => None,
        }
    }
}

impl Behavior for Entity {
    fn apply_behavior(&mut self, ctx: &mut TickContext<'_>) -> Result<(), PhysicsError> {
        match self {
            Entity::Player(player) => player.apply_behavior(ctx),
            Entity::Bullet(bullet) => bullet.apply_behavior(ctx),
            Entity::Bomb(bomb) => bomb.apply_behavior(ctx),
            Entity::Turret(turret) => turret.apply_behavior(ctx),
            Entity::Tracker(tracker) => tracker.apply_behavior(ctx),
            Entity::Pickup(pickup) => pickup.apply_behavior(ctx),
            Entity::Tile(tile) => tile.apply_behavior(ctx),
        }
    }

    fn record(&self) -> &EntityRecord {
        match self {
            Entity::Player(player) => player.record(),
            Entity::Bullet(bullet) => bullet.record(),
            Entity::Bomb(bomb) => bomb.record(),
            Entity::Turret(turret) => turret.record(),
            Entity::Tracker(tracker) => tracker.record(),
            Entity::Pickup(pickup) => pickup.record(),
            Entity::Tile(tile) => tile.record(),
        }
    }

    fn record_mut(&mut self) -> &mut EntityRecord {
        match self {
            Entity::Player(player) => player.record_mut(),
            Entity::Bullet(bullet) => bullet.record_mut(),
            Entity::Bomb(bomb) => bomb.record_mut(),
            Entity::Turret(turret) => turret.record_mut(),
            Entity::Tracker(tracker) => tracker.record_mut(),
            Entity::Pickup(pickup) => pickup.record_mut(),
            Entity::Tile(tile) => tile.record_mut(),
        }
    }
}

impl From<Player> for Entity {
    fn from(player: Player) -> Self {
        Entity::Player(player)
    }
}

impl From<Bullet> for Entity {
    fn from(bullet: Bullet) -> Self {
        Entity::Bullet(bullet)
    }
}

impl From<Bomb> for Entity {
    fn from(bomb: Bomb) -> Self {
        Entity::Bomb(bomb)
    }
}

impl From<Turret> for Entity {
    fn from(turret: Turret) -> Self {
        Entity::Turret(turret)
    }
}

impl From<Tracker> for Entity {
    fn from(tracker: Tracker) -> Self {
        Entity::Tracker(tracker)
    }
}

impl From<Pickup> for Entity {
    fn from(pickup: Pickup) -> Self {
        Entity::Pickup(pickup)
    }
}

impl From<Tile> for Entity {
    fn from(tile: Tile) -> Self {
        Entity::Tile(tile)
    }
}
