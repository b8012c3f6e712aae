// Physics port: the operations the simulation needs from a rigid-body engine.
//
// All lengths are meters and all angles radians. Pixels only appear at the wire boundary.

use crate::domain::ids::EntityId;
use std::{
    fmt,
    ops::{Add, Mul},
};

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Unit vector a body faces at `angle` (0 rad points up, i.e. towards -Y).
    pub fn facing(angle: f32) -> Self {
        Self::new(angle.sin(), -angle.cos())
    }

    /// Sum of absolute components; used for the cheap combined-axis speed cap.
    pub fn manhattan(self) -> f32 {
        self.x.abs() + self.y.abs()
    }
}

impl Add for Vec2 {
    type Output = Vec2;

    fn add(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Mul<f32> for Vec2 {
    type Output = Vec2;

    fn mul(self, rhs: f32) -> Vec2 {
        Vec2::new(self.x * rhs, self.y * rhs)
    }
}

/// Opaque handle to a body registered with a [`Physics`] implementation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BodyHandle(u64);

impl BodyHandle {
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Shape {
    Box { half_width: f32, half_height: f32 },
    Circle { radius: f32 },
}

impl Shape {
    /// Axis-aligned square with the given full side length.
    pub fn square(side: f32) -> Self {
        Shape::Box {
            half_width: side / 2.0,
            half_height: side / 2.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Material {
    pub elasticity: f32,
    pub density: f32,
    pub friction: f32,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            elasticity: 0.25,
            density: 0.5,
            friction: 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyKind {
    Dynamic,
    Static,
}

/// Everything a physics implementation needs to create one body with one shape.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyDesc {
    pub kind: BodyKind,
    pub shape: Shape,
    pub position: Vec2,
    pub angle: f32,
    pub velocity: Vec2,
    pub material: Material,
}

impl BodyDesc {
    pub fn dynamic(shape: Shape, position: Vec2) -> Self {
        Self {
            kind: BodyKind::Dynamic,
            shape,
            position,
            angle: 0.0,
            velocity: Vec2::ZERO,
            material: Material::default(),
        }
    }

    pub fn fixed(shape: Shape, position: Vec2) -> Self {
        Self {
            kind: BodyKind::Static,
            ..Self::dynamic(shape, position)
        }
    }

    pub fn with_angle(mut self, angle: f32) -> Self {
        self.angle = angle;
        self
    }

    pub fn with_velocity(mut self, velocity: Vec2) -> Self {
        self.velocity = velocity;
        self
    }

    pub fn with_density(mut self, density: f32) -> Self {
        self.material.density = density;
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PhysicsError {
    // The handle was never issued or its body has already been removed.
    UnknownBody(BodyHandle),
    // Step was asked to advance by a negative or non-finite delta.
    InvalidDelta(f32),
}

impl fmt::Display for PhysicsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PhysicsError::UnknownBody(handle) => write!(f, "unknown body handle {}", handle.0),
            PhysicsError::InvalidDelta(dt) => write!(f, "invalid step delta {dt}"),
        }
    }
}

impl std::error::Error for PhysicsError {}

/// Port for the rigid-body engine.
///
/// Implementations are single-threaded-call-only; the simulation serializes every call
/// behind its world lock. Each body stores the [`EntityId`] of its owner so contacts can be
/// resolved back to entities without the engine owning any record.
pub trait Physics: Send {
    fn create_body(&mut self, owner: EntityId, desc: &BodyDesc) -> BodyHandle;
    /// Returns false when the body was already gone.
    fn remove_body(&mut self, body: BodyHandle) -> bool;
    fn step(&mut self, dt: f32) -> Result<(), PhysicsError>;

    fn position(&self, body: BodyHandle) -> Result<Vec2, PhysicsError>;
    fn angle(&self, body: BodyHandle) -> Result<f32, PhysicsError>;
    fn set_angle(&mut self, body: BodyHandle, angle: f32) -> Result<(), PhysicsError>;
    fn velocity(&self, body: BodyHandle) -> Result<Vec2, PhysicsError>;
    fn set_velocity(&mut self, body: BodyHandle, velocity: Vec2) -> Result<(), PhysicsError>;
    fn angular_velocity(&self, body: BodyHandle) -> Result<f32, PhysicsError>;
    fn set_angular_velocity(&mut self, body: BodyHandle, spin: f32) -> Result<(), PhysicsError>;
    fn apply_impulse(&mut self, body: BodyHandle, impulse: Vec2) -> Result<(), PhysicsError>;

    /// Only dynamic bodies ever report sleeping.
    fn is_sleeping(&self, body: BodyHandle) -> Result<bool, PhysicsError>;
    /// Owners of every body currently touching `body`, each listed once.
    fn contacts(&self, body: BodyHandle) -> Result<Vec<EntityId>, PhysicsError>;
    fn body_count(&self) -> usize;
}
