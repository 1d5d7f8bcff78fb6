//! MessageBridge — demultiplexes inbound host pushes to registered handlers.
//!
//! Every push is a JSON object carrying a `type` discriminator.  Components
//! subscribe by kind; the bridge strips the discriminator and hands the
//! remaining object to each handler for that kind, in registration order.
//! Frames with a discriminator nobody recognizes are dropped on purpose —
//! the host broadcasts kinds this panel never consumes.
//!
//! Subscriptions are RAII resources: the handle returned by `subscribe`
//! removes its handler on `Drop`, so a component that unmounts can never be
//! called back.  `unsubscribe()` is also available explicitly and is
//! idempotent either way.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::rc::{Rc, Weak};

use serde_json::Value;
use tracing::trace;

use garage_proto::protocol::split_kind;

type Handler = Box<dyn FnMut(Value)>;

#[derive(Default)]
struct Registry {
    handlers: RefCell<HashMap<String, Vec<(u64, Handler)>>>,
    // Ids unsubscribed while their kind's handler list was checked out for
    // dispatch.  The merge in `dispatch` consumes them.
    dead: RefCell<HashSet<u64>>,
}

pub struct MessageBridge {
    registry: Rc<Registry>,
    next_id: std::cell::Cell<u64>,
}

impl MessageBridge {
    pub fn new() -> Self {
        Self {
            registry: Rc::new(Registry::default()),
            next_id: std::cell::Cell::new(0),
        }
    }

    /// Register `handler` for pushes of `kind`.  Multiple subscriptions for
    /// the same kind coexist and all fire.
    pub fn subscribe(
        &self,
        kind: impl Into<String>,
        handler: impl FnMut(Value) + 'static,
    ) -> Subscription {
        let kind = kind.into();
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        self.registry
            .handlers
            .borrow_mut()
            .entry(kind.clone())
            .or_default()
            .push((id, Box::new(handler)));
        Subscription {
            id,
            kind,
            registry: Rc::downgrade(&self.registry),
        }
    }

    /// Route one inbound envelope.  Envelopes without a usable discriminator
    /// and kinds with no subscribers are dropped without error.
    pub fn dispatch(&self, envelope: Value) {
        let Some((kind, payload)) = split_kind(envelope) else {
            trace!("bridge: envelope without discriminator, dropping");
            return;
        };

        // Take the handler list out for the duration of the calls so a
        // handler may itself subscribe or unsubscribe without re-entering
        // the borrow.
        let mut batch = match self.registry.handlers.borrow_mut().remove(&kind) {
            Some(list) => list,
            None => {
                trace!(kind = %kind, "bridge: no subscriber, dropping");
                return;
            }
        };
        for (_, handler) in batch.iter_mut() {
            handler(payload.clone());
        }

        // Merge back, keeping any handlers registered during the calls and
        // dropping any whose Subscription was torn down meanwhile.
        {
            let mut dead = self.registry.dead.borrow_mut();
            if !dead.is_empty() {
                batch.retain(|(id, _)| !dead.remove(id));
            }
        }
        let mut map = self.registry.handlers.borrow_mut();
        let added = map.remove(&kind).unwrap_or_default();
        batch.extend(added);
        if !batch.is_empty() {
            map.insert(kind, batch);
        }
    }

    #[cfg(test)]
    fn handler_count(&self, kind: &str) -> usize {
        self.registry
            .handlers
            .borrow()
            .get(kind)
            .map_or(0, |v| v.len())
    }
}

impl Default for MessageBridge {
    fn default() -> Self {
        Self::new()
    }
}

/// Handle for one registered handler.  Dropping it unsubscribes.
pub struct Subscription {
    id: u64,
    kind: String,
    registry: Weak<Registry>,
}

impl Subscription {
    /// Remove the handler now.  Safe to call more than once.
    pub fn unsubscribe(&mut self) {
        let Some(registry) = self.registry.upgrade() else {
            return; // bridge already gone
        };
        let mut map = registry.handlers.borrow_mut();
        let mut found = false;
        if let Some(list) = map.get_mut(&self.kind) {
            let before = list.len();
            list.retain(|(id, _)| *id != self.id);
            found = list.len() != before;
            if list.is_empty() {
                map.remove(&self.kind);
            }
        }
        if !found {
            // Our kind's list is checked out for a dispatch in progress;
            // leave a tombstone so the merge discards this handler.
            registry.dead.borrow_mut().insert(self.id);
        }
        self.registry = Weak::new();
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn envelope(kind: &str) -> Value {
        serde_json::json!({ "type": kind, "n": 1 })
    }

    #[test]
    fn test_handlers_receive_payload_without_discriminator() {
        let bridge = MessageBridge::new();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let seen2 = seen.clone();
        let _sub = bridge.subscribe("openUI", move |payload| {
            seen2.borrow_mut().push(payload);
        });

        bridge.dispatch(envelope("openUI"));
        let got = seen.borrow();
        assert_eq!(got.len(), 1);
        assert_eq!(got[0], serde_json::json!({ "n": 1 }));
        assert!(got[0].get("type").is_none());
    }

    #[test]
    fn test_multiple_subscriptions_same_kind_all_fire() {
        let bridge = MessageBridge::new();
        let count = Rc::new(std::cell::Cell::new(0));
        let (c1, c2) = (count.clone(), count.clone());
        let _a = bridge.subscribe("updateVehicles", move |_| c1.set(c1.get() + 1));
        let _b = bridge.subscribe("updateVehicles", move |_| c2.set(c2.get() + 1));

        bridge.dispatch(envelope("updateVehicles"));
        assert_eq!(count.get(), 2);
    }

    #[test]
    fn test_unknown_kind_dropped_silently() {
        let bridge = MessageBridge::new();
        let count = Rc::new(std::cell::Cell::new(0));
        let c = count.clone();
        let _sub = bridge.subscribe("openUI", move |_| c.set(c.get() + 1));

        bridge.dispatch(envelope("somethingElse"));
        bridge.dispatch(serde_json::json!({ "no": "discriminator" }));
        assert_eq!(count.get(), 0);
    }

    #[test]
    fn test_drop_unsubscribes() {
        let bridge = MessageBridge::new();
        let count = Rc::new(std::cell::Cell::new(0));
        let c = count.clone();
        let sub = bridge.subscribe("closeUI", move |_| c.set(c.get() + 1));
        assert_eq!(bridge.handler_count("closeUI"), 1);

        drop(sub);
        assert_eq!(bridge.handler_count("closeUI"), 0);
        bridge.dispatch(envelope("closeUI"));
        assert_eq!(count.get(), 0);
    }

    #[test]
    fn test_unsubscribe_is_idempotent() {
        let bridge = MessageBridge::new();
        let mut sub = bridge.subscribe("closeUI", |_| {});
        sub.unsubscribe();
        sub.unsubscribe();
        assert_eq!(bridge.handler_count("closeUI"), 0);
        drop(sub); // Drop after explicit unsubscribe must also be a no-op
    }

    #[test]
    fn test_handler_may_subscribe_during_dispatch() {
        let bridge = Rc::new(MessageBridge::new());
        let b = bridge.clone();
        let held: Rc<RefCell<Vec<Subscription>>> = Rc::new(RefCell::new(Vec::new()));
        let h = held.clone();
        let _sub = bridge.subscribe("openUI", move |_| {
            h.borrow_mut().push(b.subscribe("openUI", |_| {}));
        });

        bridge.dispatch(envelope("openUI"));
        assert_eq!(bridge.handler_count("openUI"), 2);
    }

    #[test]
    fn test_subscription_dropped_during_dispatch_never_fires_again() {
        let bridge = MessageBridge::new();
        let count = Rc::new(std::cell::Cell::new(0));
        let victim: Rc<RefCell<Option<Subscription>>> = Rc::new(RefCell::new(None));

        // First handler tears down the second's subscription mid-dispatch.
        let slot = victim.clone();
        let _dropper = bridge.subscribe("updateVehicles", move |_| {
            slot.borrow_mut().take();
        });
        let c = count.clone();
        *victim.borrow_mut() =
            Some(bridge.subscribe("updateVehicles", move |_| c.set(c.get() + 1)));

        bridge.dispatch(envelope("updateVehicles"));
        assert_eq!(bridge.handler_count("updateVehicles"), 1);
        let after_first = count.get();
        bridge.dispatch(envelope("updateVehicles"));
        assert_eq!(
            count.get(),
            after_first,
            "handler fired after its subscription was dropped"
        );
    }
}
