//! Application state shared across routes

use std::sync::Arc;
use tokio::sync::{broadcast, mpsc};

use crate::config::Config;
use crate::game::{FlightModel, GatewayEvent, SimulationLoop, WorldState};
use crate::util::time::tick_duration;
use crate::ws::protocol::Frame;

/// Capacity of the gateway -> simulation event channel
pub const EVENT_CHANNEL_CAPACITY: usize = 1024;

/// Capacity of the per-tick update broadcast channel
pub const UPDATE_BROADCAST_CAPACITY: usize = 128;

/// Capacity of the chat relay channel
pub const CHAT_BROADCAST_CAPACITY: usize = 256;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    /// Connection events into the simulation task
    pub events_tx: mpsc::Sender<GatewayEvent>,
    /// Serialized `update` frames out to every connection
    pub update_tx: broadcast::Sender<Frame>,
    /// Serialized `chat message` frames, kept apart so snapshots never evict chat
    pub chat_tx: broadcast::Sender<Frame>,
}

impl AppState {
    /// Build the state together with the simulation loop that serves it.
    /// The caller spawns the loop.
    pub fn new(config: Config) -> (Self, SimulationLoop) {
        let config = Arc::new(config);

        let (events_tx, events_rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
        let (update_tx, _) = broadcast::channel(UPDATE_BROADCAST_CAPACITY);
        let (chat_tx, _) = broadcast::channel(CHAT_BROADCAST_CAPACITY);

        let seed = config.world_seed.unwrap_or_else(rand::random);
        let world = WorldState::new(config.projectile_pool_size, FlightModel::default(), seed);

        let simulation = SimulationLoop::new(
            world,
            events_rx,
            update_tx.clone(),
            tick_duration(config.tick_rate),
        );

        let state = Self {
            config,
            events_tx,
            update_tx,
            chat_tx,
        };

        (state, simulation)
    }
}
