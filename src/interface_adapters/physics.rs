// rapier2d-backed implementation of the physics port. Top-down arena, so no gravity.

use crate::domain::physics::{BodyKind, Shape};
use crate::domain::{BodyDesc, BodyHandle, EntityId, Physics, PhysicsError, Vec2};
use rapier2d::prelude::*;
use std::collections::{BTreeSet, HashMap};

/// Rigid bodies plus the handle table mapping port handles onto rapier's.
pub struct RapierPhysics {
    pipeline: PhysicsPipeline,
    gravity: Vector<Real>,
    integration_params: IntegrationParameters,
    island_manager: IslandManager,
    broad_phase: DefaultBroadPhase,
    narrow_phase: NarrowPhase,
    rigid_body_set: RigidBodySet,
    collider_set: ColliderSet,
    impulse_joint_set: ImpulseJointSet,
    multibody_joint_set: MultibodyJointSet,
    ccd_solver: CCDSolver,
    /// Port handle to the rapier body and its single collider.
    handles: HashMap<BodyHandle, (RigidBodyHandle, ColliderHandle)>,
    next_handle: u64,
}

impl Default for RapierPhysics {
    fn default() -> Self {
        Self::new()
    }
}

impl RapierPhysics {
    pub fn new() -> Self {
        Self {
            pipeline: PhysicsPipeline::new(),
            gravity: vector![0.0, 0.0],
            integration_params: IntegrationParameters::default(),
            island_manager: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            rigid_body_set: RigidBodySet::new(),
            collider_set: ColliderSet::new(),
            impulse_joint_set: ImpulseJointSet::new(),
            multibody_joint_set: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
            handles: HashMap::new(),
            next_handle: 1,
        }
    }

    pub fn boxed(self) -> Box<dyn Physics> {
        Box::new(self)
    }

    fn body(&self, body: BodyHandle) -> Result<&RigidBody, PhysicsError> {
        self.handles
            .get(&body)
            .and_then(|(handle, _)| self.rigid_body_set.get(*handle))
            .ok_or(PhysicsError::UnknownBody(body))
    }

    fn body_mut(&mut self, body: BodyHandle) -> Result<&mut RigidBody, PhysicsError> {
        self.handles
            .get(&body)
            .and_then(|(handle, _)| self.rigid_body_set.get_mut(*handle))
            .ok_or(PhysicsError::UnknownBody(body))
    }

    fn owner_of(&self, collider: ColliderHandle) -> Option<EntityId> {
        let parent = self.collider_set.get(collider)?.parent()?;
        let rb = self.rigid_body_set.get(parent)?;
        Some(EntityId::from_raw(rb.user_data as u64))
    }
}

impl Physics for RapierPhysics {
    fn create_body(&mut self, owner: EntityId, desc: &BodyDesc) -> BodyHandle {
        let (shape, ccd) = match desc.shape {
            Shape::Box {
                half_width,
                half_height,
            } => (SharedShape::cuboid(half_width, half_height), false),
            // Projectiles are the only circles and the only bodies fast enough to tunnel.
            Shape::Circle { radius } => (SharedShape::ball(radius), true),
        };
        let builder = match desc.kind {
            BodyKind::Dynamic => RigidBodyBuilder::dynamic(),
            BodyKind::Static => RigidBodyBuilder::fixed(),
        };
        let rb = builder
            .translation(vector![desc.position.x, desc.position.y])
            .rotation(desc.angle)
            .linvel(vector![desc.velocity.x, desc.velocity.y])
            .ccd_enabled(ccd)
            .user_data(u128::from(owner.raw()))
            .build();
        let rb_handle = self.rigid_body_set.insert(rb);

        let collider = ColliderBuilder::new(shape)
            .restitution(desc.material.elasticity)
            .density(desc.material.density)
            .friction(desc.material.friction)
            .build();
        let collider_handle =
            self.collider_set
                .insert_with_parent(collider, rb_handle, &mut self.rigid_body_set);

        let handle = BodyHandle::from_raw(self.next_handle);
        self.next_handle += 1;
        self.handles.insert(handle, (rb_handle, collider_handle));
        handle
    }

    fn remove_body(&mut self, body: BodyHandle) -> bool {
        let Some((rb_handle, _)) = self.handles.remove(&body) else {
            return false;
        };
        self.rigid_body_set
            .remove(
                rb_handle,
                &mut self.island_manager,
                &mut self.collider_set,
                &mut self.impulse_joint_set,
                &mut self.multibody_joint_set,
                true,
            )
            .is_some()
    }

    fn step(&mut self, dt: f32) -> Result<(), PhysicsError> {
        if !dt.is_finite() || dt < 0.0 {
            return Err(PhysicsError::InvalidDelta(dt));
        }
        self.integration_params.dt = dt;
        self.pipeline.step(
            &self.gravity,
            &self.integration_params,
            &mut self.island_manager,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.rigid_body_set,
            &mut self.collider_set,
            &mut self.impulse_joint_set,
            &mut self.multibody_joint_set,
            &mut self.ccd_solver,
            None,
            &(),
            &(),
        );
        Ok(())
    }

    fn position(&self, body: BodyHandle) -> Result<Vec2, PhysicsError> {
        let t = self.body(body)?.translation();
        Ok(Vec2::new(t.x, t.y))
    }

    fn angle(&self, body: BodyHandle) -> Result<f32, PhysicsError> {
        Ok(self.body(body)?.rotation().angle())
    }

    fn set_angle(&mut self, body: BodyHandle, angle: f32) -> Result<(), PhysicsError> {
        self.body_mut(body)?.set_rotation(Rotation::new(angle), true);
        Ok(())
    }

    fn velocity(&self, body: BodyHandle) -> Result<Vec2, PhysicsError> {
        let v = self.body(body)?.linvel();
        Ok(Vec2::new(v.x, v.y))
    }

    fn set_velocity(&mut self, body: BodyHandle, velocity: Vec2) -> Result<(), PhysicsError> {
        self.body_mut(body)?
            .set_linvel(vector![velocity.x, velocity.y], true);
        Ok(())
    }

    fn angular_velocity(&self, body: BodyHandle) -> Result<f32, PhysicsError> {
        Ok(self.body(body)?.angvel())
    }

    fn set_angular_velocity(&mut self, body: BodyHandle, spin: f32) -> Result<(), PhysicsError> {
        self.body_mut(body)?.set_angvel(spin, true);
        Ok(())
    }

    fn apply_impulse(&mut self, body: BodyHandle, impulse: Vec2) -> Result<(), PhysicsError> {
        self.body_mut(body)?
            .apply_impulse(vector![impulse.x, impulse.y], true);
        Ok(())
    }

    fn is_sleeping(&self, body: BodyHandle) -> Result<bool, PhysicsError> {
        let rb = self.body(body)?;
        Ok(rb.is_dynamic() && rb.is_sleeping())
    }

    fn contacts(&self, body: BodyHandle) -> Result<Vec<EntityId>, PhysicsError> {
        let (_, collider) = self
            .handles
            .get(&body)
            .copied()
            .ok_or(PhysicsError::UnknownBody(body))?;

        let mut owners = BTreeSet::new();
        for pair in self.narrow_phase.contact_pairs_with(collider) {
            if !pair.has_any_active_contact {
                continue;
            }
            let other = if pair.collider1 == collider {
                pair.collider2
            } else {
                pair.collider1
            };
            if let Some(owner) = self.owner_of(other) {
                owners.insert(owner);
            }
        }
        Ok(owners.into_iter().collect())
    }

    fn body_count(&self) -> usize {
        self.handles.len()
    }
}
