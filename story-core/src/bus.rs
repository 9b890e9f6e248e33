//! Synchronous pub/sub event distribution.
//!
//! Views subscribe to a [`Topic`] and are invoked in registration order,
//! synchronously, while `emit` runs. The payload is passed by reference; no
//! cloning happens on the dispatch path. A subscriber that panics is
//! isolated and logged so the remaining subscribers still run.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use story_types::ProjectId;

use crate::store::AppState;

/// Named event channels the core publishes on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Topic {
    /// Fired after every store patch, carrying the new full state.
    StateChanged,
    /// A user-facing failure message.
    Error,
    /// The initial summary list has been stored.
    ProjectsLoaded,
    /// One project reached detailed form.
    ProjectLoaded,
}

/// Payloads published on the bus.
#[derive(Debug, Clone)]
pub enum CoreEvent {
    StateChanged(AppState),
    Error(String),
    ProjectsLoaded,
    ProjectLoaded(ProjectId),
}

/// Handle returned by [`EventBus::subscribe`], used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Handler = Arc<dyn Fn(&CoreEvent) + Send + Sync>;

struct Subscription {
    id: SubscriptionId,
    topic: Topic,
    handler: Handler,
}

/// Minimal synchronous event bus. Cheap to clone; clones share subscribers.
#[derive(Clone)]
pub struct EventBus {
    subscriptions: Arc<Mutex<Vec<Subscription>>>,
    next_id: Arc<AtomicU64>,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBus {
    pub fn new() -> Self {
        Self {
            subscriptions: Arc::new(Mutex::new(Vec::new())),
            next_id: Arc::new(AtomicU64::new(1)),
        }
    }

    /// Register a handler for a topic. Handlers run in registration order.
    pub fn subscribe<F>(&self, topic: Topic, handler: F) -> SubscriptionId
    where
        F: Fn(&CoreEvent) + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let mut subs = self.subscriptions.lock().expect("bus lock poisoned");
        subs.push(Subscription {
            id,
            topic,
            handler: Arc::new(handler),
        });
        tracing::debug!(?topic, subscription = id.0, "subscribed");
        id
    }

    pub fn unsubscribe(&self, id: SubscriptionId) {
        let mut subs = self.subscriptions.lock().expect("bus lock poisoned");
        subs.retain(|s| s.id != id);
    }

    /// Invoke every handler registered for `topic`, synchronously, before
    /// returning. A panicking handler does not stop the others.
    pub fn emit(&self, topic: Topic, event: &CoreEvent) {
        // Snapshot the matching handlers so subscribers may subscribe or
        // unsubscribe from inside a handler without deadlocking.
        let handlers: Vec<Handler> = {
            let subs = self.subscriptions.lock().expect("bus lock poisoned");
            subs.iter()
                .filter(|s| s.topic == topic)
                .map(|s| Arc::clone(&s.handler))
                .collect()
        };

        for handler in handlers {
            if catch_unwind(AssertUnwindSafe(|| handler(event))).is_err() {
                tracing::error!(?topic, "event handler panicked; continuing with remaining handlers");
            }
        }
    }
}
