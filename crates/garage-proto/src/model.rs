//! Garage data model — the shapes the host process pushes at the panel.
//!
//! Field names are camelCase on the wire (the host owns the format); the
//! structs here use Rust naming and map via serde.

use serde::{Deserialize, Serialize};

/// Where a vehicle currently is, as reported by the host.
///
/// `Unknown` absorbs statuses this panel does not recognize so a single odd
/// vehicle cannot break snapshot parsing.  Unknown-status vehicles count
/// toward `all` but none of the three known buckets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum VehicleStatus {
    #[default]
    Garaged,
    Outside,
    Impounded,
    #[serde(other)]
    Unknown,
}

impl VehicleStatus {
    pub fn label(self) -> &'static str {
        match self {
            VehicleStatus::Garaged => "garaged",
            VehicleStatus::Outside => "outside",
            VehicleStatus::Impounded => "impounded",
            VehicleStatus::Unknown => "unknown",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Vehicle {
    /// Unique within any single snapshot; the selection key.
    pub id: String,
    pub name: String,
    pub plate: String,
    pub status: VehicleStatus,
    /// Gauges 0–100.  Absent when the host does not track them.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fuel: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub engine: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<f64>,
    /// Only meaningful when the config's mileage flag is set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mileage: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nickname: Option<String>,
    #[serde(default)]
    pub is_favorite: bool,
    #[serde(default)]
    pub shared: bool,
}

/// Read-only reference data; never mutated by the panel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct SharingConfig {
    pub enabled: bool,
    pub max_shares: u32,
}

/// The full `openUI` payload — replaces any prior panel state wholesale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct GarageSnapshot {
    pub garage_name: String,
    #[serde(default)]
    pub vehicles: Vec<Vehicle>,
    #[serde(default)]
    pub players: Vec<Player>,
    pub fee: f64,
    pub is_job: bool,
    #[serde(default)]
    pub personal_vehicle_sharing: SharingConfig,
    /// Gates nickname display.
    #[serde(default)]
    pub nicknames: bool,
    /// Gates mileage display.
    #[serde(default)]
    pub mileage: bool,
}
