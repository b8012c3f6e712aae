// In-memory physics double for unit tests.
//
// Bodies move by plain Euler integration with unit mass, contacts only exist when a test
// declares them with `touch`, and clones share state so a test can keep inspecting the world
// after handing a boxed copy to the simulation.

use crate::domain::{BodyDesc, BodyHandle, EntityId, Physics, PhysicsError, Vec2};
use crate::domain::physics::BodyKind;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Debug, Clone)]
struct ScriptedBody {
    owner: EntityId,
    kind: BodyKind,
    position: Vec2,
    angle: f32,
    velocity: Vec2,
    spin: f32,
    sleeping: bool,
}

#[derive(Debug, Default)]
struct ScriptState {
    next_handle: u64,
    bodies: HashMap<BodyHandle, ScriptedBody>,
    contacts: HashSet<(BodyHandle, BodyHandle)>,
    removals: HashMap<BodyHandle, u32>,
    steps: u32,
    fail_next_step: bool,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct ScriptedPhysics {
    state: Arc<Mutex<ScriptState>>,
}

impl ScriptedPhysics {
    fn lock(&self) -> MutexGuard<'_, ScriptState> {
        self.state.lock().expect("scripted physics lock poisoned")
    }

    pub(crate) fn boxed(&self) -> Box<dyn Physics> {
        Box::new(self.clone())
    }

    /// Declares a persistent contact between two bodies.
    pub(crate) fn touch(&self, a: BodyHandle, b: BodyHandle) {
        let mut state = self.lock();
        state.contacts.insert((a, b));
        state.contacts.insert((b, a));
    }

    pub(crate) fn set_sleeping(&self, body: BodyHandle, sleeping: bool) {
        if let Some(body) = self.lock().bodies.get_mut(&body) {
            body.sleeping = sleeping;
        }
    }

    /// How many times `remove_body` actually removed this body.
    pub(crate) fn removals(&self, body: BodyHandle) -> u32 {
        self.lock().removals.get(&body).copied().unwrap_or(0)
    }

    pub(crate) fn fail_next_step(&self) {
        self.lock().fail_next_step = true;
    }

    pub(crate) fn steps(&self) -> u32 {
        self.lock().steps
    }

    pub(crate) fn has_body_for(&self, owner: EntityId) -> bool {
        self.lock().bodies.values().any(|body| body.owner == owner)
    }

    pub(crate) fn body_of(&self, owner: EntityId) -> Option<BodyHandle> {
        self.lock()
            .bodies
            .iter()
            .find(|(_, body)| body.owner == owner)
            .map(|(handle, _)| *handle)
    }

    fn with_body<R>(
        &self,
        handle: BodyHandle,
        f: impl FnOnce(&mut ScriptedBody) -> R,
    ) -> Result<R, PhysicsError> {
        self.lock()
            .bodies
            .get_mut(&handle)
            .map(f)
            .ok_or(PhysicsError::UnknownBody(handle))
    }
}

impl Physics for ScriptedPhysics {
    fn create_body(&mut self, owner: EntityId, desc: &BodyDesc) -> BodyHandle {
        let mut state = self.lock();
        state.next_handle += 1;
        let handle = BodyHandle::from_raw(state.next_handle);
        state.bodies.insert(
            handle,
            ScriptedBody {
                owner,
                kind: desc.kind,
                position: desc.position,
                angle: desc.angle,
                velocity: desc.velocity,
                spin: 0.0,
                sleeping: false,
            },
        );
        handle
    }

    fn remove_body(&mut self, body: BodyHandle) -> bool {
        let mut state = self.lock();
        if state.bodies.remove(&body).is_none() {
            return false;
        }
        state.contacts.retain(|(a, b)| *a != body && *b != body);
        *state.removals.entry(body).or_default() += 1;
        true
    }

    fn step(&mut self, dt: f32) -> Result<(), PhysicsError> {
        let mut state = self.lock();
        if std::mem::take(&mut state.fail_next_step) || !dt.is_finite() || dt < 0.0 {
            return Err(PhysicsError::InvalidDelta(dt));
        }
        state.steps += 1;
        for body in state.bodies.values_mut() {
            if body.kind == BodyKind::Dynamic && !body.sleeping {
                body.position = body.position + body.velocity * dt;
                body.angle += body.spin * dt;
            }
        }
        Ok(())
    }

    fn position(&self, body: BodyHandle) -> Result<Vec2, PhysicsError> {
        self.with_body(body, |b| b.position)
    }

    fn angle(&self, body: BodyHandle) -> Result<f32, PhysicsError> {
        self.with_body(body, |b| b.angle)
    }

    fn set_angle(&mut self, body: BodyHandle, angle: f32) -> Result<(), PhysicsError> {
        self.with_body(body, |b| b.angle = angle)
    }

    fn velocity(&self, body: BodyHandle) -> Result<Vec2, PhysicsError> {
        self.with_body(body, |b| b.velocity)
    }

    fn set_velocity(&mut self, body: BodyHandle, velocity: Vec2) -> Result<(), PhysicsError> {
        self.with_body(body, |b| b.velocity = velocity)
    }

    fn angular_velocity(&self, body: BodyHandle) -> Result<f32, PhysicsError> {
        self.with_body(body, |b| b.spin)
    }

    fn set_angular_velocity(&mut self, body: BodyHandle, spin: f32) -> Result<(), PhysicsError> {
        self.with_body(body, |b| b.spin = spin)
    }

    fn apply_impulse(&mut self, body: BodyHandle, impulse: Vec2) -> Result<(), PhysicsError> {
        self.with_body(body, |b| {
            if b.kind == BodyKind::Dynamic {
                b.velocity = b.velocity + impulse;
                b.sleeping = false;
            }
        })
    }

    fn is_sleeping(&self, body: BodyHandle) -> Result<bool, PhysicsError> {
        self.with_body(body, |b| b.kind == BodyKind::Dynamic && b.sleeping)
    }

    fn contacts(&self, body: BodyHandle) -> Result<Vec<EntityId>, PhysicsError> {
        let state = self.lock();
        if !state.bodies.contains_key(&body) {
            return Err(PhysicsError::UnknownBody(body));
        }
        let mut owners: Vec<EntityId> = state
            .contacts
            .iter()
            .filter(|(a, _)| *a == body)
            .filter_map(|(_, other)| state.bodies.get(other).map(|b| b.owner))
            .collect();
        owners.sort();
        owners.dedup();
        Ok(owners)
    }

    fn body_count(&self) -> usize {
        self.lock().bodies.len()
    }
}
