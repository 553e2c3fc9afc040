//! Bus Module - Publish/subscribe channel for load signals
//!
//! The sentinel widget and its host talk exclusively through a bus.
//! Delivery is synchronous, in registration order, to every current
//! subscriber of the published signal.
//!
//! # API
//!
//! - `EventBus::new()` - Independent bus instance
//! - `EventBus::shared()` - The default bus of the current UI thread
//! - `subscribe(signal, fn)` - Register a handler, returns a `Subscription`
//! - `publish(signal)` / `publish_with(signal, payload)` - Deliver a signal
//! - `Subscription::remove()` - Unregister (idempotent)
//!
//! # Example
//!
//! ```ignore
//! use spark_infinite_loading::{EventBus, LoadSignal};
//!
//! let bus = EventBus::new();
//! let sub = bus.subscribe(LoadSignal::Loading, |_| {
//!     // fetch the next page, then:
//!     // bus.publish(LoadSignal::LoadingFinished);
//! });
//!
//! bus.publish(LoadSignal::Loading);
//! sub.remove();
//! ```

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fmt;
use std::rc::{Rc, Weak};

use crate::types::LoadSignal;

// =============================================================================
// TYPES
// =============================================================================

/// Completion callback carried by a reinitialize request.
pub type Completion = Rc<dyn Fn()>;

/// Handler invoked on delivery.
pub type BusHandler = Rc<dyn Fn(&Payload)>;

/// Data delivered alongside a signal.
///
/// Only [`LoadSignal::Reinitialize`] uses it, to tell the caller when the
/// widget is ready to trigger again.
#[derive(Clone, Default)]
pub struct Payload {
    completion: Option<Completion>,
}

impl Payload {
    /// Empty payload.
    pub fn none() -> Self {
        Self::default()
    }

    /// Payload carrying a completion callback.
    pub fn with_completion<F>(completion: F) -> Self
    where
        F: Fn() + 'static,
    {
        Self {
            completion: Some(Rc::new(completion)),
        }
    }

    pub fn has_completion(&self) -> bool {
        self.completion.is_some()
    }

    /// Invoke the completion callback, if any.
    pub fn complete(&self) {
        if let Some(completion) = &self.completion {
            completion();
        }
    }
}

impl fmt::Debug for Payload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Payload")
            .field("completion", &self.completion.is_some())
            .finish()
    }
}

// =============================================================================
// HANDLER REGISTRY
// =============================================================================

struct BusRegistry {
    handlers: HashMap<LoadSignal, Vec<(usize, BusHandler)>>,
    next_id: usize,
}

impl BusRegistry {
    fn new() -> Self {
        Self {
            handlers: HashMap::new(),
            next_id: 0,
        }
    }

    fn next_id(&mut self) -> usize {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn contains(&self, signal: LoadSignal, id: usize) -> bool {
        self.handlers
            .get(&signal)
            .is_some_and(|handlers| handlers.iter().any(|(handler_id, _)| *handler_id == id))
    }

    fn remove(&mut self, signal: LoadSignal, id: usize) {
        if let Some(handlers) = self.handlers.get_mut(&signal) {
            handlers.retain(|(handler_id, _)| *handler_id != id);
            if handlers.is_empty() {
                self.handlers.remove(&signal);
            }
        }
    }
}

thread_local! {
    static SHARED_BUS: EventBus = EventBus::new();
}

// =============================================================================
// EVENT BUS
// =============================================================================

/// A publish/subscribe channel for [`LoadSignal`]s.
///
/// Cloning yields another handle to the same channel.
#[derive(Clone)]
pub struct EventBus {
    registry: Rc<RefCell<BusRegistry>>,
}

impl EventBus {
    /// Create an independent bus.
    pub fn new() -> Self {
        Self {
            registry: Rc::new(RefCell::new(BusRegistry::new())),
        }
    }

    /// The default bus of the current UI thread.
    ///
    /// Created on first use and never torn down. Widgets without an
    /// explicit emitter publish here.
    pub fn shared() -> Self {
        SHARED_BUS.with(|bus| bus.clone())
    }

    /// Subscribe to a signal.
    /// Handlers run in registration order.
    pub fn subscribe<F>(&self, signal: LoadSignal, handler: F) -> Subscription
    where
        F: Fn(&Payload) + 'static,
    {
        let id = {
            let mut reg = self.registry.borrow_mut();
            let id = reg.next_id();
            reg.handlers
                .entry(signal)
                .or_default()
                .push((id, Rc::new(handler)));
            id
        };

        Subscription {
            registry: Rc::downgrade(&self.registry),
            signal,
            id,
            active: Cell::new(true),
        }
    }

    /// Publish a signal without payload.
    /// Returns the number of handlers invoked.
    pub fn publish(&self, signal: LoadSignal) -> usize {
        self.publish_with(signal, Payload::none())
    }

    /// Publish a signal with a payload.
    ///
    /// The subscriber list is snapshotted before delivery. Handlers removed
    /// by an earlier handler are skipped; handlers added during delivery
    /// first run on the next publish.
    pub fn publish_with(&self, signal: LoadSignal, payload: Payload) -> usize {
        let snapshot: Vec<(usize, BusHandler)> = {
            let reg = self.registry.borrow();
            match reg.handlers.get(&signal) {
                Some(handlers) => handlers.clone(),
                None => return 0,
            }
        };

        let mut delivered = 0;
        for (id, handler) in snapshot {
            // Borrow released before calling out: handlers re-enter the bus
            if !self.registry.borrow().contains(signal, id) {
                continue;
            }
            handler(&payload);
            delivered += 1;
        }
        delivered
    }

    /// Number of handlers currently subscribed to a signal.
    pub fn subscriber_count(&self, signal: LoadSignal) -> usize {
        self.registry
            .borrow()
            .handlers
            .get(&signal)
            .map_or(0, Vec::len)
    }

    /// Whether both handles refer to the same channel.
    pub fn ptr_eq(&self, other: &EventBus) -> bool {
        Rc::ptr_eq(&self.registry, &other.registry)
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reg = self.registry.borrow();
        let mut counts: Vec<(LoadSignal, usize)> = reg
            .handlers
            .iter()
            .map(|(signal, handlers)| (*signal, handlers.len()))
            .collect();
        counts.sort();
        f.debug_struct("EventBus").field("subscribers", &counts).finish()
    }
}

// =============================================================================
// SUBSCRIPTION
// =============================================================================

/// A (signal, handler) binding on a bus.
///
/// Stays registered until [`Subscription::remove`] is called; dropping the
/// value does not unsubscribe.
pub struct Subscription {
    registry: Weak<RefCell<BusRegistry>>,
    signal: LoadSignal,
    id: usize,
    active: Cell<bool>,
}

impl Subscription {
    /// Unregister the handler. Safe to call more than once.
    pub fn remove(&self) {
        if !self.active.replace(false) {
            return;
        }
        if let Some(registry) = self.registry.upgrade() {
            registry.borrow_mut().remove(self.signal, self.id);
        }
    }

    pub fn signal(&self) -> LoadSignal {
        self.signal
    }

    /// Whether the handler is still registered.
    pub fn is_active(&self) -> bool {
        self.active.get() && self.registry.upgrade().is_some()
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("signal", &self.signal)
            .field("id", &self.id)
            .field("active", &self.active.get())
            .finish()
    }
}

// =============================================================================
// TESTS
// =============================================================================
