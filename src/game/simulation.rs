//! Authoritative fixed-rate simulation loop

use std::time::Duration;
use tokio::sync::{broadcast, mpsc};
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, error, info, warn};

use crate::util::time::Timer;
use crate::ws::protocol::{Frame, ServerMsg};

use super::world::WorldState;
use super::GatewayEvent;

/// Owns the world and drives it: gateway events are applied the moment they
/// arrive, ticks step the world and broadcast the result.
pub struct SimulationLoop {
    world: WorldState,
    events_rx: mpsc::Receiver<GatewayEvent>,
    update_tx: broadcast::Sender<Frame>,
    tick_duration: Duration,
}

impl SimulationLoop {
    pub fn new(
        world: WorldState,
        events_rx: mpsc::Receiver<GatewayEvent>,
        update_tx: broadcast::Sender<Frame>,
        tick_duration: Duration,
    ) -> Self {
        Self {
            world,
            events_rx,
            update_tx,
            tick_duration,
        }
    }

    /// Run until every gateway handle is gone
    pub async fn run(mut self) {
        info!(
            tick_ms = self.tick_duration.as_secs_f64() * 1000.0,
            pool_size = self.world.projectiles().len(),
            "Simulation started"
        );

        let dt = self.tick_duration.as_secs_f64();
        let mut tick_interval = interval(self.tick_duration);
        // Late ticks run late, none are dropped
        tick_interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = tick_interval.tick() => {
                    self.run_tick(dt);
                }
                event = self.events_rx.recv() => {
                    match event {
                        Some(event) => self.world.apply(event),
                        None => {
                            info!("Gateway channel closed, stopping simulation");
                            break;
                        }
                    }
                }
            }
        }
    }

    fn run_tick(&mut self, dt: f64) {
        let timer = Timer::new();

        let snapshot = self.world.tick(dt);

        // Serialized once here, every connection forwards the same frame
        match ServerMsg::Update(snapshot).to_frame() {
            Ok(frame) => {
                // Nobody listening is fine
                if self.update_tx.send(frame).is_err() {
                    debug!(tick = self.world.current_tick(), "No subscribers for update");
                }
            }
            Err(e) => {
                error!(tick = self.world.current_tick(), error = %e, "Failed to serialize update");
            }
        }

        let elapsed = timer.elapsed();
        if elapsed > self.tick_duration {
            warn!(
                tick = self.world.current_tick(),
                elapsed_us = elapsed.as_micros() as u64,
                "Tick overran its period"
            );
        }
    }
}
