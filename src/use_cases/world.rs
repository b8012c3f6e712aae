// World state guarded by the simulation lock: live entities, roster, physics and the spawn
// queue. Every method assumes the caller holds that lock.

use crate::domain::behaviors::{Behavior, Entity, PeerDirectory, Player, TickContext};
use crate::domain::{
    EntityId, EntityKind, ObjectSnapshot, Physics, PhysicsError, SpawnQueue, SpawnRequest,
    SpawnSink, Tuning,
};
use crate::use_cases::director::HunterDirector;
use crate::use_cases::roster::Roster;
use crate::use_cases::types::{SimulationStats, WorldUpdate};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;

pub(crate) struct World {
    entities: BTreeMap<EntityId, Entity>,
    roster: Roster,
    physics: Box<dyn Physics>,
    spawn_queue: SpawnQueue,
    // Final snapshots of unregistered players, sent once with the next publish.
    tombstones: Vec<ObjectSnapshot>,
    director: Option<HunterDirector>,
    tuning: Tuning,
    tick: u64,
}

impl World {
    pub(crate) fn new(
        physics: Box<dyn Physics>,
        spawn_queue: SpawnQueue,
        tuning: Tuning,
        director: Option<HunterDirector>,
    ) -> Self {
        Self {
            entities: BTreeMap::new(),
            roster: Roster::default(),
            physics,
            spawn_queue,
            tombstones: Vec::new(),
            director,
            tuning,
            tick: 0,
        }
    }

    /// Creates the body for a spawned entity and adds it to the live collection.
    pub(crate) fn admit(&mut self, request: SpawnRequest) -> EntityId {
        let SpawnRequest { mut entity, body } = request;
        let record = entity.record_mut();
        let handle = self.physics.create_body(record.id, &body);
        record.body = Some(handle);
        record.position = body.position;
        record.angle = body.angle;
        let id = record.id;
        self.entities.insert(id, entity);
        id
    }

    pub(crate) fn register_player(&mut self, player: Player) -> EntityId {
        let body = player.body_desc(&self.tuning.player);
        let id = self.admit(SpawnRequest::new(player, body));
        self.roster.insert(id);
        id
    }

    pub(crate) fn unregister_player(&mut self, id: EntityId) -> bool {
        if !self.roster.remove(id) {
            return false;
        }
        if let Some(mut entity) = self.entities.remove(&id) {
            let record = entity.record_mut();
            if let Some(body) = record.body.take() {
                self.physics.remove_body(body);
            }
            record.mark_deleted();
            self.tombstones.push(record.snapshot());
        }
        true
    }

    /// Tick section: behaviors, director, spawn drain, then one physics step.
    pub(crate) fn step(&mut self, dt: f32, spawner: &SpawnSink) -> Result<(), PhysicsError> {
        if !dt.is_finite() || dt < 0.0 {
            return Err(PhysicsError::InvalidDelta(dt));
        }

        let peers = PeerDirectory::from_records(self.entities.values().map(Behavior::record));
        let mut ctx = TickContext {
            dt,
            physics: self.physics.as_mut(),
            spawner,
            peers: &peers,
            tuning: &self.tuning,
        };
        for entity in self.entities.values_mut() {
            if entity.record().pending_delete {
                continue;
            }
            entity.apply_behavior(&mut ctx)?;
        }

        if let Some(director) = self.director.as_mut() {
            let turrets = self
                .entities
                .values()
                .filter(|e| e.record().kind == EntityKind::Turret && !e.record().pending_delete)
                .count();
            for request in director.advance(dt, &self.roster, turrets, &self.tuning.enemy) {
                spawner.submit(request);
            }
        }

        let mut admitted = 0usize;
        while let Some(request) = self.spawn_queue.try_next() {
            self.admit(request);
            admitted += 1;
        }
        if admitted > 0 {
            debug!(tick = self.tick, admitted, "spawn queue drained");
        }

        if dt > 0.0 {
            self.physics.step(dt)?;
        }
        self.tick += 1;
        Ok(())
    }

    /// Publish section: resync, build one update per roster entry, then prune.
    pub(crate) fn publish(&mut self) -> Result<Vec<WorldUpdate>, PhysicsError> {
        self.resync()?;

        let mut shared = std::mem::take(&mut self.tombstones);
        let mut static_layer = Vec::new();
        for entity in self.entities.values() {
            let record = entity.record();
            let sleeping = match record.body {
                Some(body) => self.physics.is_sleeping(body)?,
                None => false,
            };
            if record.pending_delete || !(record.is_static || sleeping) {
                shared.push(record.snapshot());
            } else {
                static_layer.push(record.snapshot());
            }
        }
        let shared: Arc<[ObjectSnapshot]> = shared.into();
        let static_layer: Arc<[ObjectSnapshot]> = static_layer.into();

        let mut updates = Vec::with_capacity(self.roster.len());
        for id in self.roster.iter() {
            let Some(player) = self.entities.get_mut(&id) else {
                continue;
            };
            let record = player.record_mut();
            let full_sync = std::mem::take(&mut record.needs_full_sync);
            updates.push(WorldUpdate {
                tick: self.tick,
                recipient: id,
                shared: shared.clone(),
                static_layer: full_sync.then(|| static_layer.clone()),
            });
        }

        self.prune();
        Ok(updates)
    }

    fn resync(&mut self) -> Result<(), PhysicsError> {
        for entity in self.entities.values_mut() {
            let record = entity.record_mut();
            let Some(body) = record.body else {
                continue;
            };
            record.position = self.physics.position(body)?;
            record.angle = self.physics.angle(body)?;
            if record.velocity.is_some() {
                record.velocity = Some(self.physics.velocity(body)?);
            }
        }
        Ok(())
    }

    fn prune(&mut self) {
        let doomed: Vec<EntityId> = self
            .entities
            .iter()
            .filter(|(_, entity)| entity.record().pending_delete)
            .map(|(id, _)| *id)
            .collect();
        for id in doomed {
            if let Some(body) = self.entities.remove(&id).and_then(|e| e.record().body) {
                self.physics.remove_body(body);
            }
            self.roster.remove(id);
        }
    }

    pub(crate) fn roster(&self) -> &Roster {
        &self.roster
    }

    #[cfg(test)]
    pub(crate) fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(&id)
    }

    #[cfg(test)]
    pub(crate) fn entity_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.get_mut(&id)
    }

    #[cfg(test)]
    pub(crate) fn entities(&self) -> impl Iterator<Item = &Entity> {
        self.entities.values()
    }

    pub(crate) fn stats(&self) -> SimulationStats {
        SimulationStats {
            tick: self.tick,
            players: self.roster.len(),
            entities: self.entities.len(),
            bodies: self.physics.body_count(),
        }
    }
}
