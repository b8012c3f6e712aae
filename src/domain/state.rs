// Domain-level entity records and the snapshots produced from them.

use crate::domain::ids::EntityId;
use crate::domain::mailbox::MailboxAddress;
use crate::domain::physics::{BodyHandle, Vec2};
use std::sync::Arc;

pub const SPRITE_SHEET: &str = "spaceShooterRedux";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Player,
    Bullet,
    Bomb,
    Turret,
    Tracker,
    Tile,
    Pickup,
}

impl EntityKind {
    pub fn as_str(self) -> &'static str {
        match self {
            EntityKind::Player => "player",
            EntityKind::Bullet => "bullet",
            EntityKind::Bomb => "bomb",
            EntityKind::Turret => "turret",
            EntityKind::Tracker => "tracker",
            EntityKind::Tile => "tile",
            EntityKind::Pickup => "pickup",
        }
    }
}

/// Source rectangle inside a sprite sheet, in sheet pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SpriteRect {
    pub x0: i32,
    pub y0: i32,
    pub w: i32,
    pub h: i32,
}

impl SpriteRect {
    pub const fn new(x0: i32, y0: i32, w: i32, h: i32) -> Self {
        Self { x0, y0, w, h }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Sprite {
    pub sheet: Arc<str>,
    pub rect: SpriteRect,
    pub flip_h: bool,
    pub flip_v: bool,
    pub flip_d: bool,
}

impl Sprite {
    pub fn new(sheet: impl Into<Arc<str>>, rect: SpriteRect) -> Self {
        Self {
            sheet: sheet.into(),
            rect,
            flip_h: false,
            flip_v: false,
            flip_d: false,
        }
    }

    /// Frame from the shared ship/projectile sheet.
    pub fn frame(rect: SpriteRect) -> Self {
        Self::new(SPRITE_SHEET, rect)
    }

    pub fn flipped(mut self, flip_h: bool, flip_v: bool, flip_d: bool) -> Self {
        self.flip_h = flip_h;
        self.flip_v = flip_v;
        self.flip_d = flip_d;
        self
    }
}

/// Canonical per-object state. Position and angle are a per-tick cache of the physics body.
#[derive(Debug, Clone)]
pub struct EntityRecord {
    pub id: EntityId,
    pub kind: EntityKind,
    pub position: Vec2,
    pub angle: f32,
    pub velocity: Option<Vec2>,
    pub sprite: Sprite,
    pub body: Option<BodyHandle>,

    // Lifecycle flags.
    pub is_static: bool,
    pub needs_full_sync: bool,
    pub pending_delete: bool,

    // Address other entities use to reach this one's mailbox, if it has one.
    pub inbox: Option<MailboxAddress>,
}

impl EntityRecord {
    pub fn new(kind: EntityKind, sprite: Sprite) -> Self {
        Self {
            id: EntityId::allocate(),
            kind,
            position: Vec2::ZERO,
            angle: 0.0,
            velocity: None,
            sprite,
            body: None,
            is_static: false,
            needs_full_sync: false,
            pending_delete: false,
            inbox: None,
        }
    }

    pub fn mark_deleted(&mut self) {
        self.pending_delete = true;
    }

    pub fn snapshot(&self) -> ObjectSnapshot {
        ObjectSnapshot {
            id: self.id,
            kind: self.kind,
            position: self.position,
            angle: self.angle,
            sprite: self.sprite.clone(),
            deleted: self.pending_delete,
        }
    }
}

/// What a client gets to know about one object on one tick.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectSnapshot {
    pub id: EntityId,
    pub kind: EntityKind,
    pub position: Vec2,
    pub angle: f32,
    pub sprite: Sprite,
    pub deleted: bool,
}
