//! Pooled projectiles

use serde::{Deserialize, Serialize};
use std::f64::consts::FRAC_PI_2;
use std::num::NonZeroUsize;

use super::plane::Plane;

/// Distance a fired projectile travels every tick
pub const PROJECTILE_SPEED: f64 = 10.0;

/// Default number of projectile slots
pub const DEFAULT_POOL_SIZE: usize = 100;

/// A projectile slot. Inert slots are not rendered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Projectile {
    pub x: f64,
    pub y: f64,
    pub angle: f64,
    pub speed: f64,
    /// true while in flight
    pub fired: bool,
}

impl Projectile {
    /// Inert projectile at the origin
    pub fn spawn() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            angle: 0.0,
            speed: PROJECTILE_SPEED,
            fired: false,
        }
    }

    /// Re-arm this slot from the plane's current pose
    pub fn fire(&mut self, plane: &Plane) {
        self.x = plane.x;
        self.y = plane.y;
        // Plane angle 0 is nose up, projectile angle 0 points along +x
        self.angle = plane.angle - FRAC_PI_2;
        self.fired = true;
    }

    /// Move a fired projectile one tick forward.
    ///
    /// The displacement is per tick, not per second: changing the tick rate
    /// changes projectile speed.
    pub fn advance(&mut self) {
        if !self.fired {
            return;
        }
        self.x += self.angle.cos() * self.speed;
        self.y += self.angle.sin() * self.speed;
    }
}

impl Default for Projectile {
    fn default() -> Self {
        Self::spawn()
    }
}

/// Fixed-size ring of projectile slots. Fired slots fly until the cursor
/// comes back around and reuses them.
#[derive(Debug, Clone)]
pub struct ProjectilePool {
    slots: Vec<Projectile>,
    cursor: usize,
}

impl ProjectilePool {
    pub fn new(size: NonZeroUsize) -> Self {
        Self {
            slots: vec![Projectile::spawn(); size.get()],
            cursor: 0,
        }
    }

    /// Fire the slot under the cursor from `plane` and advance the cursor.
    /// Returns the index of the slot that was fired.
    pub fn fire_from(&mut self, plane: &Plane) -> usize {
        let index = self.cursor;
        self.slots[index].fire(plane);
        self.cursor = (self.cursor + 1) % self.slots.len();
        index
    }

    pub fn advance_all(&mut self) {
        for slot in &mut self.slots {
            slot.advance();
        }
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn slots(&self) -> &[Projectile] {
        &self.slots
    }

    pub fn in_flight(&self) -> usize {
        self.slots.iter().filter(|p| p.fired).count()
    }
}
