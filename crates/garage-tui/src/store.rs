//! View State Store — the panel's picture of the garage.
//!
//! Holds the last snapshot pushed by the host plus the view-local bits the
//! host never sees (selection, filter, search query).  Snapshots replace
//! everything; vehicle deltas replace just the list and re-derive selection.

use garage_proto::model::{GarageSnapshot, Player, SharingConfig, Vehicle, VehicleStatus};

/// Status filter tabs.  `All` passes everything, including vehicles whose
/// status the panel does not recognize.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewFilter {
    #[default]
    All,
    Garaged,
    Outside,
    Impounded,
}

impl ViewFilter {
    pub const ALL: [ViewFilter; 4] = [
        ViewFilter::All,
        ViewFilter::Garaged,
        ViewFilter::Outside,
        ViewFilter::Impounded,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ViewFilter::All => "All",
            ViewFilter::Garaged => "Garaged",
            ViewFilter::Outside => "Out",
            ViewFilter::Impounded => "Impound",
        }
    }

    fn admits(self, status: VehicleStatus) -> bool {
        match self {
            ViewFilter::All => true,
            ViewFilter::Garaged => status == VehicleStatus::Garaged,
            ViewFilter::Outside => status == VehicleStatus::Outside,
            ViewFilter::Impounded => status == VehicleStatus::Impounded,
        }
    }
}

/// One-pass tally over the unfiltered vehicle list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StatusCounts {
    pub all: usize,
    pub garaged: usize,
    pub outside: usize,
    pub impounded: usize,
}

impl StatusCounts {
    pub fn for_filter(&self, filter: ViewFilter) -> usize {
        match filter {
            ViewFilter::All => self.all,
            ViewFilter::Garaged => self.garaged,
            ViewFilter::Outside => self.outside,
            ViewFilter::Impounded => self.impounded,
        }
    }
}

#[derive(Debug, Default)]
pub struct GarageStore {
    pub garage_name: String,
    pub fee: f64,
    pub is_job: bool,
    pub sharing: SharingConfig,
    pub nicknames: bool,
    pub mileage: bool,
    pub players: Vec<Player>,
    vehicles: Vec<Vehicle>,
    selected: Option<Vehicle>,
    filter: ViewFilter,
    query: String,
}

impl GarageStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace all state from a full snapshot.  Selection resets to the
    /// first vehicle, or to nothing when the garage is empty; filter and
    /// query are view-local and survive.
    pub fn apply_snapshot(&mut self, snap: GarageSnapshot) {
        self.garage_name = snap.garage_name;
        self.fee = snap.fee;
        self.is_job = snap.is_job;
        self.sharing = snap.personal_vehicle_sharing;
        self.nicknames = snap.nicknames;
        self.mileage = snap.mileage;
        self.players = snap.players;
        self.selected = snap.vehicles.first().cloned();
        self.vehicles = snap.vehicles;
    }

    /// Replace the vehicle list from a delta push.  If the selected vehicle
    /// still exists (by id) the selection rebinds to the fresh copy so stale
    /// gauges never linger; if it vanished the selection clears.
    pub fn apply_vehicle_update(&mut self, vehicles: Vec<Vehicle>) {
        self.selected = self.selected.take().and_then(|old| {
            vehicles.iter().find(|v| v.id == old.id).cloned()
        });
        self.vehicles = vehicles;
    }

    pub fn vehicles(&self) -> &[Vehicle] {
        &self.vehicles
    }

    pub fn selected(&self) -> Option<&Vehicle> {
        self.selected.as_ref()
    }

    /// Select by id.  Ignored when no vehicle carries that id.
    pub fn select(&mut self, id: &str) {
        if let Some(v) = self.vehicles.iter().find(|v| v.id == id) {
            self.selected = Some(v.clone());
        }
    }

    pub fn filter(&self) -> ViewFilter {
        self.filter
    }

    pub fn set_filter(&mut self, filter: ViewFilter) {
        self.filter = filter;
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
    }

    /// The list as the user sees it: status filter first, then a
    /// case-insensitive substring match on name, plate, or nickname.
    /// Source order is preserved.
    pub fn filtered_vehicles(&self) -> Vec<&Vehicle> {
        let needle = self.query.trim().to_lowercase();
        self.vehicles
            .iter()
            .filter(|v| self.filter.admits(v.status))
            .filter(|v| {
                if needle.is_empty() {
                    return true;
                }
                v.name.to_lowercase().contains(&needle)
                    || v.plate.to_lowercase().contains(&needle)
                    || v.nickname
                        .as_deref()
                        .is_some_and(|n| n.to_lowercase().contains(&needle))
            })
            .collect()
    }

    pub fn counts(&self) -> StatusCounts {
        let mut counts = StatusCounts {
            all: self.vehicles.len(),
            ..StatusCounts::default()
        };
        for v in &self.vehicles {
            match v.status {
                VehicleStatus::Garaged => counts.garaged += 1,
                VehicleStatus::Outside => counts.outside += 1,
                VehicleStatus::Impounded => counts.impounded += 1,
                VehicleStatus::Unknown => {}
            }
        }
        counts
    }
}
