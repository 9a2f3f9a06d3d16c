//! Per-tick world snapshot broadcast to every client

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::{ConnectionId, Plane, Projectile};

/// Immutable copy of the world taken at the end of a tick.
/// Planes are keyed by connection id so clients can find their own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldSnapshot {
    pub airplanes: BTreeMap<ConnectionId, Plane>,
    pub projectiles: Vec<Projectile>,
}

impl WorldSnapshot {
    pub fn new<'a>(
        airplanes: impl IntoIterator<Item = (&'a ConnectionId, &'a Plane)>,
        projectiles: &[Projectile],
    ) -> Self {
        Self {
            airplanes: airplanes
                .into_iter()
                .map(|(id, plane)| (*id, plane.clone()))
                .collect(),
            projectiles: projectiles.to_vec(),
        }
    }
}
