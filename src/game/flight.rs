//! Arcade flight physics and the stall state machine

use std::f64::consts::PI;

use super::plane::{wrap_angle, Plane};

/// Flight constants. The stall angle convention lives here so it can be tuned
/// without touching the step itself.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlightModel {
    /// Speed below which a plane enters a stall (strict)
    pub stall_speed: f64,
    /// Speed at or above which a stalled plane recovers
    pub stall_recovery_speed: f64,
    /// Angle forced while stalled (π points the nose straight down)
    pub stall_angle: f64,
    /// Speed lost per second while climbing
    pub climb_factor: f64,
    /// Speed gained per second while diving
    pub dive_factor: f64,
    /// Fraction of speed lost to drag per second
    pub drag: f64,
    /// Upper speed clamp
    pub max_speed: f64,
    /// Largest allowed `y`
    pub ground_level: f64,
    /// Multiplier applied to `vx` on ground contact
    pub ground_friction: f64,
}

impl Default for FlightModel {
    fn default() -> Self {
        Self {
            stall_speed: 10.0,
            stall_recovery_speed: 300.0,
            stall_angle: PI,
            climb_factor: 100.0,
            dive_factor: 100.0,
            drag: 1.0 / 50.0,
            max_speed: 400.0,
            ground_level: 850.0,
            ground_friction: 0.5,
        }
    }
}

impl FlightModel {
    /// Advance a plane by `dt` seconds.
    ///
    /// Velocity is rebuilt from speed and angle every step, the angle is never
    /// derived from velocity.
    pub fn step(&self, mut plane: Plane, dt: f64) -> Plane {
        let mut speed = plane.speed();

        if !plane.stalled && speed < self.stall_speed {
            plane.stalled = true;
            plane.angle = self.stall_angle;
        }

        if is_climbing(plane.angle) {
            speed -= self.climb_factor * dt;
        } else {
            speed += self.dive_factor * dt;
        }

        speed -= speed * self.drag * dt;

        if plane.is_thrusting {
            speed += plane.thrust * dt;
        }

        let speed = speed.clamp(0.0, self.max_speed);

        plane.angle = wrap_angle(plane.angle);
        plane.vx = speed * plane.angle.sin();
        plane.vy = speed * plane.angle.cos();

        if plane.stalled && speed >= self.stall_recovery_speed {
            plane.stalled = false;
        }

        // Overrides any pitch input applied since the last step
        if plane.stalled {
            plane.angle = self.stall_angle;
        }

        self.ground_contact(&mut plane);

        plane.x += plane.vx * dt;
        // Positive vy climbs, screen y grows downward
        plane.y -= plane.vy * dt;

        self.ground_contact(&mut plane);

        plane
    }

    /// Clamp a plane that sank below the ground back onto it
    fn ground_contact(&self, plane: &mut Plane) {
        if plane.y > self.ground_level {
            plane.y = self.ground_level;
            plane.vy = 0.0;
            plane.vx *= self.ground_friction;
        }
    }
}

/// Nose-up regime: the angle, shifted by 90° into [0, 360), lies in (0, 180)
fn is_climbing(angle: f64) -> bool {
    let degrees = angle.to_degrees();
    let angle360 = ((degrees % 360.0) + 360.0 + 90.0) % 360.0;
    angle360 > 0.0 && angle360 < 180.0
}
