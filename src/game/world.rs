//! World state: every plane plus the shared projectile pool

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::collections::HashMap;
use std::num::NonZeroUsize;
use tracing::{debug, info};

use super::flight::FlightModel;
use super::input::{handle_input, Command};
use super::plane::Plane;
use super::projectile::ProjectilePool;
use super::snapshot::WorldSnapshot;
use super::{ConnectionId, GatewayEvent};

/// World state (owned by the simulation task)
pub struct WorldState {
    planes: HashMap<ConnectionId, Plane>,
    projectiles: ProjectilePool,
    flight: FlightModel,
    rng: ChaCha8Rng,
    tick: u64,
}

impl WorldState {
    pub fn new(pool_size: NonZeroUsize, flight: FlightModel, seed: u64) -> Self {
        Self {
            planes: HashMap::new(),
            projectiles: ProjectilePool::new(pool_size),
            flight,
            rng: ChaCha8Rng::seed_from_u64(seed),
            tick: 0,
        }
    }

    /// Route a gateway event to the matching handler
    pub fn apply(&mut self, event: GatewayEvent) {
        match event {
            GatewayEvent::Connect { connection_id } => self.connect(connection_id),
            GatewayEvent::Control {
                connection_id,
                command,
            } => self.control(connection_id, command),
            GatewayEvent::Disconnect { connection_id } => self.disconnect(connection_id),
        }
    }

    /// Spawn a plane for a new connection
    pub fn connect(&mut self, connection_id: ConnectionId) {
        let plane = Plane::spawn(&mut self.rng);
        info!(
            connection_id = %connection_id,
            x = plane.x,
            y = plane.y,
            color = %plane.color,
            "Plane spawned"
        );
        self.planes.insert(connection_id, plane);
    }

    /// Apply a control command. Commands for unknown connections are dropped.
    pub fn control(&mut self, connection_id: ConnectionId, command: Command) {
        if command == Command::ResetPlanes {
            self.reset(connection_id);
            return;
        }

        match self.planes.get_mut(&connection_id) {
            Some(plane) => handle_input(plane, command),
            None => {
                debug!(connection_id = %connection_id, %command, "Control for missing plane");
            }
        }
    }

    /// Replace a plane with a freshly spawned one
    fn reset(&mut self, connection_id: ConnectionId) {
        if !self.planes.contains_key(&connection_id) {
            debug!(connection_id = %connection_id, "Reset for missing plane");
            return;
        }
        let plane = Plane::spawn(&mut self.rng);
        info!(connection_id = %connection_id, "Plane reset");
        self.planes.insert(connection_id, plane);
    }

    /// Remove a connection's plane
    pub fn disconnect(&mut self, connection_id: ConnectionId) {
        if self.planes.remove(&connection_id).is_some() {
            info!(connection_id = %connection_id, "Plane removed");
        }
    }

    /// Run one simulation tick and return the resulting snapshot
    pub fn tick(&mut self, dt: f64) -> WorldSnapshot {
        self.tick += 1;

        // Stable, ordered key set so firing order does not depend on hashing
        let mut ids: Vec<ConnectionId> = self.planes.keys().copied().collect();
        ids.sort_unstable();

        for id in ids {
            let Some(plane) = self.planes.remove(&id) else {
                continue;
            };
            let plane = self.flight.step(plane, dt);
            if plane.is_firing {
                self.projectiles.fire_from(&plane);
            }
            self.planes.insert(id, plane);
        }

        self.projectiles.advance_all();

        self.snapshot()
    }

    pub fn snapshot(&self) -> WorldSnapshot {
        WorldSnapshot::new(&self.planes, self.projectiles.slots())
    }

    pub fn plane(&self, connection_id: &ConnectionId) -> Option<&Plane> {
        self.planes.get(connection_id)
    }

    pub fn plane_count(&self) -> usize {
        self.planes.len()
    }

    pub fn projectiles(&self) -> &ProjectilePool {
        &self.projectiles
    }

    pub fn current_tick(&self) -> u64 {
        self.tick
    }
}
