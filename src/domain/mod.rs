// Domain layer: entity records, behaviors, and the physics port they run against.

pub mod behaviors;
pub mod controls;
pub mod ids;
pub mod mailbox;
pub mod physics;
pub mod spawn;
pub mod state;
pub mod tuning;

pub use behaviors::{Behavior, Entity, PeerDirectory, TickContext};
pub use controls::{ControlState, HeldKeys};
pub use ids::EntityId;
pub use mailbox::{Mailbox, MailboxAddress, Token};
pub use physics::{BodyDesc, BodyHandle, Physics, PhysicsError, Vec2};
pub use spawn::{SpawnQueue, SpawnRequest, SpawnSink};
pub use state::{EntityKind, EntityRecord, ObjectSnapshot, Sprite, SpriteRect};
pub use tuning::Tuning;
