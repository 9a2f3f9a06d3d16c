//! Plane state owned by the world

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::f64::consts::TAU;

/// Engine force a freshly spawned plane starts with
pub const DEFAULT_THRUST: f64 = 75.0;

/// Horizontal speed a freshly spawned plane starts with
pub const SPAWN_SPEED: f64 = 300.0;

/// Spawn area, in world units
pub const SPAWN_X_RANGE: std::ops::RangeInclusive<i32> = 0..=900;
pub const SPAWN_Y_RANGE: std::ops::RangeInclusive<i32> = 200..=800;

/// Authoritative plane state, serialized as-is into every update
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Plane {
    pub x: f64,
    /// Grows downward on screen
    pub y: f64,
    pub vx: f64,
    pub vy: f64,
    /// Radians in [0, 2π)
    pub angle: f64,
    pub thrust: f64,
    pub is_thrusting: bool,
    /// Stays set until the next command for this plane arrives
    pub is_firing: bool,
    pub stalled: bool,
    /// Display color, `#rrggbb`
    pub color: String,
    /// Untouched by the simulation
    pub score: i64,
}

impl Plane {
    /// Create a plane at a random position with default flight settings
    pub fn spawn<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let color: u32 = rng.gen_range(0..0xFF_FFFF);
        Self {
            x: f64::from(rng.gen_range(SPAWN_X_RANGE)),
            y: f64::from(rng.gen_range(SPAWN_Y_RANGE)),
            vx: SPAWN_SPEED,
            vy: 0.0,
            angle: rng.gen_range(0.0..TAU),
            thrust: DEFAULT_THRUST,
            is_thrusting: true,
            is_firing: false,
            stalled: false,
            color: format!("#{color:06x}"),
            score: 0,
        }
    }

    /// Scalar speed derived from the velocity components
    pub fn speed(&self) -> f64 {
        self.vx.hypot(self.vy)
    }
}

/// Wrap an angle into [0, 2π)
pub fn wrap_angle(angle: f64) -> f64 {
    let wrapped = angle.rem_euclid(TAU);
    // rem_euclid can round up to exactly TAU for tiny negative inputs
    if wrapped >= TAU {
        0.0
    } else {
        wrapped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_spawn_defaults() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        for _ in 0..50 {
            let plane = Plane::spawn(&mut rng);
            assert!((0.0..=900.0).contains(&plane.x));
            assert!((200.0..=800.0).contains(&plane.y));
            assert_eq!(plane.x.fract(), 0.0);
            assert_eq!(plane.vx, SPAWN_SPEED);
            assert_eq!(plane.vy, 0.0);
            assert!((0.0..TAU).contains(&plane.angle));
            assert_eq!(plane.thrust, DEFAULT_THRUST);
            assert!(plane.is_thrusting);
            assert!(!plane.is_firing);
            assert!(!plane.stalled);
            assert_eq!(plane.score, 0);
            assert_eq!(plane.color.len(), 7);
            assert!(plane.color.starts_with('#'));
        }
    }

    #[test]
    fn test_wrap_angle() {
        assert_eq!(wrap_angle(0.0), 0.0);
        assert!((wrap_angle(-std::f64::consts::FRAC_PI_2) - 1.5 * std::f64::consts::PI).abs() < 1e-12);
        assert!((wrap_angle(TAU + 1.0) - 1.0).abs() < 1e-12);
        assert!(wrap_angle(-1e-18) < TAU);
    }

    #[test]
    fn test_serializes_camel_case() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let plane = Plane::spawn(&mut rng);
        let json = serde_json::to_value(&plane).unwrap();
        assert!(json.get("isThrusting").is_some());
        assert!(json.get("isFiring").is_some());
        assert!(json.get("stalled").is_some());
        assert!(json.get("is_thrusting").is_none());
    }
}
