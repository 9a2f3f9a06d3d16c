//! Discrete control commands and how they change a plane

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::fmt;
use std::str::FromStr;

use super::plane::{wrap_angle, Plane};
use super::GameError;

/// Pitch change per up/down command, in radians
pub const ANGLE_DELTA: f64 = PI / 12.0;

/// Control commands a client can send
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Command {
    Up,
    Down,
    IncreaseThrust,
    DecreaseThrust,
    Fire,
    /// Replaces the whole plane; handled by the world, not by [`handle_input`]
    ResetPlanes,
}

impl Command {
    pub fn as_str(self) -> &'static str {
        match self {
            Command::Up => "up",
            Command::Down => "down",
            Command::IncreaseThrust => "increaseThrust",
            Command::DecreaseThrust => "decreaseThrust",
            Command::Fire => "fire",
            Command::ResetPlanes => "resetPlanes",
        }
    }
}

impl FromStr for Command {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "up" => Ok(Command::Up),
            "down" => Ok(Command::Down),
            "increaseThrust" => Ok(Command::IncreaseThrust),
            "decreaseThrust" => Ok(Command::DecreaseThrust),
            "fire" => Ok(Command::Fire),
            "resetPlanes" => Ok(Command::ResetPlanes),
            other => Err(GameError::UnknownCommand(other.to_string())),
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Apply a control command to a plane in place.
///
/// Every command clears the fire flag first, so firing continues only until
/// the next command arrives. Pitch commands are ignored while stalled.
pub fn handle_input(plane: &mut Plane, command: Command) {
    plane.is_firing = false;

    match command {
        Command::Up => {
            if !plane.stalled {
                plane.angle = wrap_angle(plane.angle - ANGLE_DELTA);
            }
        }
        Command::Down => {
            if !plane.stalled {
                plane.angle = wrap_angle(plane.angle + ANGLE_DELTA);
            }
        }
        Command::IncreaseThrust => plane.is_thrusting = true,
        Command::DecreaseThrust => plane.is_thrusting = false,
        Command::Fire => plane.is_firing = true,
        Command::ResetPlanes => {}
    }
}
