//! End-to-end lifecycle: framed host pushes through the bridge into the
//! panel and store, and the cancel path out through the dispatcher.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use garage_proto::model::{GarageSnapshot, Vehicle, VehicleStatus};
use garage_proto::protocol::{decode_frame, Command, HostPush};
use garage_tui::bridge::MessageBridge;
use garage_tui::dispatch::{CommandDispatcher, SIMULATED_LATENCY};
use garage_tui::panel::{Panel, Visibility};
use garage_tui::store::GarageStore;

fn vehicle(id: &str, status: VehicleStatus) -> Vehicle {
    Vehicle {
        id: id.into(),
        name: "Sultan".into(),
        plate: "ABC123".into(),
        status,
        ..Vehicle::default()
    }
}

enum PanelEvent {
    Open(GarageSnapshot),
    Close,
}

struct Harness {
    bridge: MessageBridge,
    panel: Panel,
    events: Rc<RefCell<VecDeque<PanelEvent>>>,
}

/// Wires open/close subscriptions the way the App does: handlers queue
/// lifecycle events, `push` drains them after dispatch.
impl Harness {
    fn new() -> Self {
        let bridge = MessageBridge::new();
        let panel = Panel::new(Rc::new(RefCell::new(GarageStore::new())));
        let events: Rc<RefCell<VecDeque<PanelEvent>>> = Rc::new(RefCell::new(VecDeque::new()));

        let open_events = events.clone();
        let open_sub = bridge.subscribe("openUI", move |payload| {
            let snap = serde_json::from_value(payload).unwrap();
            open_events.borrow_mut().push_back(PanelEvent::Open(snap));
        });
        let close_events = events.clone();
        let close_sub = bridge.subscribe("closeUI", move |_| {
            close_events.borrow_mut().push_back(PanelEvent::Close);
        });
        // Keep the subscriptions alive for the harness lifetime.
        std::mem::forget(open_sub);
        std::mem::forget(close_sub);

        Self {
            bridge,
            panel,
            events,
        }
    }

    /// Deliver one push the way the connection does: encode to a frame,
    /// decode it back, dispatch the envelope.
    fn push(&mut self, push: HostPush) {
        let frame = push.encode().unwrap();
        let (envelope, consumed) = decode_frame(&frame).unwrap();
        assert_eq!(consumed, frame.len());
        self.bridge.dispatch(envelope);

        loop {
            let event = self.events.borrow_mut().pop_front();
            match event {
                Some(PanelEvent::Open(snap)) => self.panel.open(&self.bridge, snap),
                Some(PanelEvent::Close) => self.panel.close(),
                None => break,
            }
        }
    }
}

#[test]
fn test_open_update_close_lifecycle() {
    let mut h = Harness::new();
    assert_eq!(h.panel.visibility(), Visibility::Hidden);

    h.push(HostPush::OpenUi(GarageSnapshot {
        garage_name: "Pillbox".into(),
        vehicles: vec![
            vehicle("a", VehicleStatus::Garaged),
            vehicle("b", VehicleStatus::Outside),
        ],
        fee: 250.0,
        ..GarageSnapshot::default()
    }));
    assert_eq!(h.panel.visibility(), Visibility::Visible);
    {
        let store = h.panel.store().borrow();
        assert_eq!(store.garage_name, "Pillbox");
        assert_eq!(store.selected().map(|v| v.id.as_str()), Some("a"));
    }

    // Delta rebinds the selection to the fresh copy.
    let mut updated = vehicle("a", VehicleStatus::Outside);
    updated.fuel = Some(55.0);
    h.push(HostPush::UpdateVehicles {
        vehicles: vec![updated, vehicle("b", VehicleStatus::Outside)],
    });
    {
        let store = h.panel.store().borrow();
        let sel = store.selected().unwrap();
        assert_eq!(sel.status, VehicleStatus::Outside);
        assert_eq!(sel.fuel, Some(55.0));
    }

    // Host close hides the panel; later deltas no longer land.
    h.push(HostPush::CloseUi);
    assert_eq!(h.panel.visibility(), Visibility::Hidden);
    h.push(HostPush::UpdateVehicles { vehicles: vec![] });
    assert_eq!(h.panel.store().borrow().vehicles().len(), 2);
}

#[test]
fn test_unknown_push_kinds_are_ignored() {
    let mut h = Harness::new();
    h.bridge.dispatch(serde_json::json!({
        "type": "setWaypoint",
        "x": 120.0, "y": -40.0
    }));
    assert_eq!(h.panel.visibility(), Visibility::Hidden);

    h.push(HostPush::OpenUi(GarageSnapshot {
        vehicles: vec![vehicle("a", VehicleStatus::Garaged)],
        ..GarageSnapshot::default()
    }));
    h.bridge.dispatch(serde_json::json!({ "type": "setWaypoint" }));
    assert_eq!(h.panel.store().borrow().vehicles().len(), 1);
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn test_cancel_sends_one_close_through_dispatcher() {
    let mut h = Harness::new();
    h.push(HostPush::OpenUi(GarageSnapshot {
        vehicles: vec![vehicle("a", VehicleStatus::Garaged)],
        ..GarageSnapshot::default()
    }));

    // First Esc yields the command, repeat presses yield nothing.
    let cmd = h.panel.cancel().expect("first cancel produces closeUI");
    assert_eq!(cmd, Command::CloseUi);
    assert_eq!(h.panel.cancel(), None);
    assert_eq!(h.panel.visibility(), Visibility::Hidden);

    // Fire-and-forget through the simulated dispatcher.
    let dispatcher = CommandDispatcher::new("http://127.0.0.1:1", true);
    let started = tokio::time::Instant::now();
    let value = dispatcher
        .send(cmd.name(), cmd.payload(), Some(serde_json::json!({ "ok": true })))
        .await
        .unwrap();
    assert_eq!(value["ok"], true);
    assert_eq!(started.elapsed(), SIMULATED_LATENCY);
}
