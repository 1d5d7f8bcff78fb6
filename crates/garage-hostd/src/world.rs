//! A small simulated garage world the daemon serves to panels.

use std::sync::Arc;

use rand::Rng;
use tokio::sync::RwLock;
use tracing::info;

use garage_proto::model::{
    GarageSnapshot, Player, SharingConfig, Vehicle, VehicleStatus,
};

pub type WorldHandle = Arc<RwLock<World>>;

pub struct World {
    pub garage_name: String,
    pub fee: f64,
    pub vehicles: Vec<Vehicle>,
    pub players: Vec<Player>,
}

impl World {
    pub fn seed() -> Self {
        Self {
            garage_name: "Pillbox Garage".to_string(),
            fee: 250.0,
            vehicles: vec![
                vehicle("veh_1", "Sultan", "SUL 7AN", VehicleStatus::Garaged, Some("Daily"), true),
                vehicle("veh_2", "Kuruma", "KRM 440", VehicleStatus::Garaged, None, false),
                vehicle("veh_3", "Bison", "B150 NN", VehicleStatus::Outside, None, false),
                vehicle("veh_4", "Dominator", "D0M 666", VehicleStatus::Impounded, Some("Track toy"), false),
                vehicle("veh_5", "Rumpo", "RMP 001", VehicleStatus::Garaged, None, false),
            ],
            players: vec![
                Player { id: 1, name: "Avery".to_string() },
                Player { id: 2, name: "Moss".to_string() },
            ],
        }
    }

    pub fn snapshot(&self) -> GarageSnapshot {
        GarageSnapshot {
            garage_name: self.garage_name.clone(),
            vehicles: self.vehicles.clone(),
            players: self.players.clone(),
            fee: self.fee,
            is_job: false,
            personal_vehicle_sharing: SharingConfig {
                enabled: true,
                max_shares: 3,
            },
            nicknames: true,
            mileage: true,
        }
    }

    /// Advance the world one step: vehicles that are out burn fuel and gain
    /// mileage.  Returns true when anything changed.
    pub fn drift(&mut self) -> bool {
        let mut rng = rand::thread_rng();
        let mut changed = false;
        for v in &mut self.vehicles {
            if v.status != VehicleStatus::Outside {
                continue;
            }
            if let Some(fuel) = v.fuel.as_mut() {
                *fuel = (*fuel - rng.gen_range(0.0..2.0)).max(0.0);
            }
            if let Some(km) = v.mileage.as_mut() {
                *km += rng.gen_range(0.1..1.5);
            }
            changed = true;
        }
        changed
    }

    /// Handle a take-out request for `id`.  Garaged vehicles go out,
    /// impounded ones transfer back into the garage, vehicles already out
    /// are only tracked.  Returns true when the list changed.
    pub fn drive(&mut self, id: &str) -> bool {
        let Some(v) = self.vehicles.iter_mut().find(|v| v.id == id) else {
            info!(%id, "drive request for unknown vehicle");
            return false;
        };
        match v.status {
            VehicleStatus::Garaged => {
                v.status = VehicleStatus::Outside;
                info!(%id, "vehicle taken out");
                true
            }
            VehicleStatus::Impounded => {
                v.status = VehicleStatus::Garaged;
                info!(%id, "vehicle transferred from impound");
                true
            }
            VehicleStatus::Outside => {
                info!(%id, "vehicle already out, tracking");
                false
            }
            VehicleStatus::Unknown => false,
        }
    }
}

fn vehicle(
    id: &str,
    name: &str,
    plate: &str,
    status: VehicleStatus,
    nickname: Option<&str>,
    favorite: bool,
) -> Vehicle {
    let mut rng = rand::thread_rng();
    Vehicle {
        id: id.to_string(),
        name: name.to_string(),
        plate: plate.to_string(),
        status,
        fuel: Some(rng.gen_range(30.0..100.0f64).round()),
        engine: Some(rng.gen_range(60.0..100.0f64).round()),
        body: Some(rng.gen_range(60.0..100.0f64).round()),
        mileage: Some(rng.gen_range(100.0..40_000.0f64).round()),
        nickname: nickname.map(str::to_string),
        is_favorite: favorite,
        shared: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drive_cycles_statuses() {
        let mut world = World::seed();
        assert!(world.drive("veh_1")); // garaged -> outside
        assert_eq!(
            world.vehicles.iter().find(|v| v.id == "veh_1").unwrap().status,
            VehicleStatus::Outside
        );
        assert!(!world.drive("veh_1")); // already out, no change
        assert!(world.drive("veh_4")); // impound -> garaged
        assert!(!world.drive("veh_999"));
    }

    #[test]
    fn test_drift_only_touches_vehicles_out() {
        let mut world = World::seed();
        let garaged_before = world
            .vehicles
            .iter()
            .filter(|v| v.status == VehicleStatus::Garaged)
            .cloned()
            .collect::<Vec<_>>();
        world.drift();
        for before in garaged_before {
            let after = world.vehicles.iter().find(|v| v.id == before.id).unwrap();
            assert_eq!(after.fuel, before.fuel);
            assert_eq!(after.mileage, before.mileage);
        }
    }
}
