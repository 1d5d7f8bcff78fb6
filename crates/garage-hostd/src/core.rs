//! Host core — owns the world and turns command events into pushes.

use std::time::Duration;

use serde_json::Value;
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, info, warn};

use garage_proto::protocol::HostPush;

use crate::world::WorldHandle;

/// Events flowing into the core from the HTTP surface.
#[derive(Debug)]
pub enum HostEvent {
    Command { name: String, payload: Value },
}

pub struct HostCore {
    world: WorldHandle,
    event_rx: mpsc::Receiver<HostEvent>,
    push_tx: broadcast::Sender<HostPush>,
    delta_interval: Duration,
}

impl HostCore {
    pub fn new(
        world: WorldHandle,
        event_rx: mpsc::Receiver<HostEvent>,
        push_tx: broadcast::Sender<HostPush>,
        delta_interval: Duration,
    ) -> Self {
        Self {
            world,
            event_rx,
            push_tx,
            delta_interval,
        }
    }

    pub async fn run(mut self) {
        let mut drift = tokio::time::interval(self.delta_interval);
        drift.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                Some(event) = self.event_rx.recv() => {
                    self.handle_event(event).await;
                }
                _ = drift.tick() => {
                    let changed = self.world.write().await.drift();
                    if changed {
                        self.push_vehicles().await;
                    }
                }
                else => break,
            }
        }
        info!("host core stopped");
    }

    async fn handle_event(&mut self, event: HostEvent) {
        match event {
            HostEvent::Command { name, payload } => match name.as_str() {
                "driveVehicle" => {
                    let Some(id) = payload.get("vehicleId").and_then(Value::as_str) else {
                        warn!("driveVehicle without vehicleId");
                        return;
                    };
                    let changed = self.world.write().await.drive(id);
                    if changed {
                        self.push_vehicles().await;
                    }
                }
                "closeUI" => {
                    debug!("panel requested close");
                    let _ = self.push_tx.send(HostPush::CloseUi);
                }
                other => {
                    debug!(command = %other, "unhandled command");
                }
            },
        }
    }

    async fn push_vehicles(&self) {
        let vehicles = self.world.read().await.vehicles.clone();
        let _ = self.push_tx.send(HostPush::UpdateVehicles { vehicles });
    }
}
