//! Game simulation modules

pub mod flight;
pub mod input;
pub mod plane;
pub mod projectile;
pub mod simulation;
pub mod snapshot;
pub mod world;

pub use flight::FlightModel;
pub use input::{handle_input, Command};
pub use plane::Plane;
pub use projectile::{Projectile, ProjectilePool};
pub use simulation::SimulationLoop;
pub use snapshot::WorldSnapshot;
pub use world::WorldState;

use uuid::Uuid;

/// Identifier assigned to every WebSocket connection
pub type ConnectionId = Uuid;

/// Events the connection gateway feeds into the simulation task
#[derive(Debug, Clone)]
pub enum GatewayEvent {
    /// New connection, spawn a plane for it
    Connect { connection_id: ConnectionId },
    /// Control command from a connected client
    Control {
        connection_id: ConnectionId,
        command: Command,
    },
    /// Connection closed, remove its plane
    Disconnect { connection_id: ConnectionId },
}

/// Game errors
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum GameError {
    #[error("Unknown control command: {0}")]
    UnknownCommand(String),
}
