//! Synchronous publish/subscribe channel between engine components and the
//! host UI.
//!
//! The bus is an explicitly constructed value with a scoped lifetime: one per
//! quest attempt, passed into whatever needs it, never a process global.
//! Dispatch is synchronous, same-thread, in registration order, and
//! re-entrant: a handler may publish, and the nested dispatch completes on
//! the same call stack before control returns to the original publisher.
//!
//! Snapshot semantics: `publish` fans out to the handlers registered at the
//! moment of the call. Handlers added mid-dispatch see only later events;
//! handlers removed mid-dispatch still receive the in-flight one. A
//! panicking handler is isolated and logged; delivery to the remaining
//! handlers continues.

use std::cell::RefCell;
use std::collections::HashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::rc::Rc;

use crate::event::{EngineEvent, EventKind};

type Handler = Rc<RefCell<dyn FnMut(&EngineEvent)>>;

#[derive(Clone)]
struct Subscription {
    id: u64,
    once: bool,
    handler: Handler,
}

/// Disposer returned by `subscribe`; pass back to `unsubscribe`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubscriptionId {
    kind: EventKind,
    id: u64,
}

#[derive(Default)]
struct BusState {
    next_id: u64,
    subscribers: HashMap<EventKind, Vec<Subscription>>,
}

/// Single-threaded typed event bus. See the module docs for semantics.
#[derive(Default)]
pub struct EventBus {
    state: RefCell<BusState>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler for one event kind. Handlers for a kind fire in
    /// registration order.
    pub fn subscribe<F>(&self, kind: EventKind, handler: F) -> SubscriptionId
    where
        F: FnMut(&EngineEvent) + 'static,
    {
        self.add(kind, false, handler)
    }

    /// Like `subscribe`, but the handler is removed after its first delivery.
    pub fn subscribe_once<F>(&self, kind: EventKind, handler: F) -> SubscriptionId
    where
        F: FnMut(&EngineEvent) + 'static,
    {
        self.add(kind, true, handler)
    }

    fn add<F>(&self, kind: EventKind, once: bool, handler: F) -> SubscriptionId
    where
        F: FnMut(&EngineEvent) + 'static,
    {
        let mut state = self.state.borrow_mut();
        state.next_id += 1;
        let id = state.next_id;
        state
            .subscribers
            .entry(kind)
            .or_default()
            .push(Subscription {
                id,
                once,
                handler: Rc::new(RefCell::new(handler)),
            });
        SubscriptionId { kind, id }
    }

    /// Remove a subscription. Returns whether it was still registered.
    pub fn unsubscribe(&self, subscription: SubscriptionId) -> bool {
        let mut state = self.state.borrow_mut();
        match state.subscribers.get_mut(&subscription.kind) {
            Some(list) => {
                let before = list.len();
                list.retain(|s| s.id != subscription.id);
                list.len() != before
            }
            None => false,
        }
    }

    /// Deliver an event to every handler currently registered for its kind.
    pub fn publish(&self, event: EngineEvent) {
        let kind = event.kind();
        let snapshot: Vec<Subscription> = self
            .state
            .borrow()
            .subscribers
            .get(&kind)
            .cloned()
            .unwrap_or_default();

        // Drop once-subscriptions before dispatch so a re-entrant publish of
        // the same kind cannot deliver them twice.
        if snapshot.iter().any(|s| s.once) {
            let mut state = self.state.borrow_mut();
            if let Some(list) = state.subscribers.get_mut(&kind) {
                list.retain(|s| !s.once);
            }
        }

        for subscription in snapshot {
            let outcome = catch_unwind(AssertUnwindSafe(|| {
                (subscription.handler.borrow_mut())(&event);
            }));
            if outcome.is_err() {
                log::warn!(
                    "event handler panicked during {:?} dispatch; continuing with remaining handlers",
                    kind
                );
            }
        }
    }

    /// Drop every handler. Called at attempt teardown so no handler from a
    /// finished attempt can fire during the next one.
    pub fn clear(&self) {
        self.state.borrow_mut().subscribers.clear();
    }

    /// Number of live handlers for a kind.
    pub fn handler_count(&self, kind: EventKind) -> usize {
        self.state
            .borrow()
            .subscribers
            .get(&kind)
            .map(Vec::len)
            .unwrap_or(0)
    }
}
