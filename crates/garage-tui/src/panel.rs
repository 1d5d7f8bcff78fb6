//! Panel lifecycle — visibility plus the subscription that only lives while
//! the panel is open.
//!
//! `openUI` applies the snapshot, makes the panel visible, and mounts the
//! `updateVehicles` subscription; both `closeUI` from the host and a local
//! Esc cancel hide the panel and drop the subscription, so deltas arriving
//! against a closed panel never touch the store.  Only the local cancel path
//! notifies the host, and it does so exactly once per open.

use std::cell::RefCell;
use std::rc::Rc;

use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

use garage_proto::model::{GarageSnapshot, Vehicle};
use garage_proto::protocol::Command;

use crate::bridge::{MessageBridge, Subscription};
use crate::store::GarageStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Visibility {
    #[default]
    Hidden,
    Visible,
}

#[derive(Deserialize)]
struct VehicleUpdate {
    #[serde(default)]
    vehicles: Vec<Vehicle>,
}

pub struct Panel {
    visibility: Visibility,
    store: Rc<RefCell<GarageStore>>,
    update_sub: Option<Subscription>,
}

impl Panel {
    pub fn new(store: Rc<RefCell<GarageStore>>) -> Self {
        Self {
            visibility: Visibility::Hidden,
            store,
            update_sub: None,
        }
    }

    pub fn visibility(&self) -> Visibility {
        self.visibility
    }

    pub fn is_visible(&self) -> bool {
        self.visibility == Visibility::Visible
    }

    pub fn store(&self) -> &Rc<RefCell<GarageStore>> {
        &self.store
    }

    /// Host opened (or re-opened) the panel.  Replaces all store state and
    /// mounts a fresh delta subscription; a still-mounted one from a prior
    /// open is dropped first.
    pub fn open(&mut self, bridge: &MessageBridge, snapshot: GarageSnapshot) {
        self.store.borrow_mut().apply_snapshot(snapshot);
        self.update_sub = None;

        let store = self.store.clone();
        self.update_sub = Some(bridge.subscribe("updateVehicles", move |payload: Value| {
            match serde_json::from_value::<VehicleUpdate>(payload) {
                Ok(update) => store.borrow_mut().apply_vehicle_update(update.vehicles),
                Err(err) => warn!(%err, "malformed updateVehicles push, ignoring"),
            }
        }));
        self.visibility = Visibility::Visible;
    }

    /// Host closed the panel.  No command goes back; repeat closes are no-ops.
    pub fn close(&mut self) {
        self.update_sub = None;
        self.visibility = Visibility::Hidden;
    }

    /// Local cancel (Esc).  Hides the panel and yields the `closeUI` command
    /// the caller must fire at the host.  While already hidden there is
    /// nothing to cancel and no command is produced.
    pub fn cancel(&mut self) -> Option<Command> {
        if !self.is_visible() {
            return None;
        }
        self.close();
        Some(Command::CloseUi)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use garage_proto::model::VehicleStatus;

    fn snapshot(ids: &[&str]) -> GarageSnapshot {
        GarageSnapshot {
            garage_name: "Pillbox".into(),
            vehicles: ids
                .iter()
                .map(|id| Vehicle {
                    id: (*id).into(),
                    name: "Sultan".into(),
                    plate: "ABC123".into(),
                    status: VehicleStatus::Garaged,
                    ..Vehicle::default()
                })
                .collect(),
            fee: 0.0,
            ..GarageSnapshot::default()
        }
    }

    fn update_envelope(ids: &[&str]) -> Value {
        let vehicles: Vec<Value> = ids
            .iter()
            .map(|id| {
                serde_json::json!({
                    "id": id, "name": "Sultan", "plate": "ABC123", "status": "outside"
                })
            })
            .collect();
        serde_json::json!({ "type": "updateVehicles", "vehicles": vehicles })
    }

    fn panel() -> Panel {
        Panel::new(Rc::new(RefCell::new(GarageStore::new())))
    }

    #[test]
    fn test_open_applies_snapshot_and_shows() {
        let bridge = MessageBridge::new();
        let mut panel = panel();
        assert_eq!(panel.visibility(), Visibility::Hidden);

        panel.open(&bridge, snapshot(&["a", "b"]));
        assert_eq!(panel.visibility(), Visibility::Visible);
        let store = panel.store().borrow();
        assert_eq!(store.vehicles().len(), 2);
        assert_eq!(store.selected().map(|v| v.id.as_str()), Some("a"));
    }

    #[test]
    fn test_deltas_reach_store_only_while_open() {
        let bridge = MessageBridge::new();
        let mut panel = panel();
        panel.open(&bridge, snapshot(&["a"]));

        bridge.dispatch(update_envelope(&["a", "b"]));
        assert_eq!(panel.store().borrow().vehicles().len(), 2);

        panel.close();
        bridge.dispatch(update_envelope(&["a", "b", "c"]));
        assert_eq!(panel.store().borrow().vehicles().len(), 2);
    }

    #[test]
    fn test_cancel_yields_exactly_one_close_command() {
        let bridge = MessageBridge::new();
        let mut panel = panel();
        panel.open(&bridge, snapshot(&["a"]));

        assert_eq!(panel.cancel(), Some(Command::CloseUi));
        assert_eq!(panel.visibility(), Visibility::Hidden);
        assert_eq!(panel.cancel(), None);
    }

    #[test]
    fn test_cancel_while_hidden_is_inert() {
        let mut panel = panel();
        assert_eq!(panel.cancel(), None);
        assert_eq!(panel.visibility(), Visibility::Hidden);
    }

    #[test]
    fn test_host_close_sends_nothing_and_is_idempotent() {
        let bridge = MessageBridge::new();
        let mut panel = panel();
        panel.open(&bridge, snapshot(&["a"]));

        panel.close();
        panel.close();
        assert_eq!(panel.visibility(), Visibility::Hidden);
        // A cancel after a host close must not produce a late command.
        assert_eq!(panel.cancel(), None);
    }

    #[test]
    fn test_reopen_replaces_subscription_not_stacks_it() {
        let bridge = MessageBridge::new();
        let mut panel = panel();
        panel.open(&bridge, snapshot(&["a"]));
        panel.open(&bridge, snapshot(&["z"]));

        bridge.dispatch(update_envelope(&["z", "y"]));
        let store = panel.store().borrow();
        assert_eq!(store.vehicles().len(), 2);
        // Selection rebinds to the fresh copy of "z" from the delta.
        assert_eq!(store.selected().map(|v| v.status), Some(VehicleStatus::Outside));
    }

    #[test]
    fn test_malformed_delta_leaves_store_untouched() {
        let bridge = MessageBridge::new();
        let mut panel = panel();
        panel.open(&bridge, snapshot(&["a"]));

        bridge.dispatch(serde_json::json!({
            "type": "updateVehicles",
            "vehicles": "not-a-list"
        }));
        assert_eq!(panel.store().borrow().vehicles().len(), 1);
    }
}
