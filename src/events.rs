//! Change notification for store listeners.

use std::panic::{AssertUnwindSafe, catch_unwind};

/// Events broadcast by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreEvent {
    /// The collection changed; listeners should re-query.
    DataChanged,
}

/// Handle returned by [`Listeners::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Callback = Box<dyn FnMut(&StoreEvent)>;

/// Registered listeners, called synchronously in subscription order.
#[derive(Default)]
pub struct Listeners {
    next_id: u64,
    entries: Vec<(SubscriptionId, Callback)>,
}

impl Listeners {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener.
    pub fn subscribe(&mut self, callback: impl FnMut(&StoreEvent) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.entries.push((id, Box::new(callback)));
        id
    }

    /// Remove a listener. Returns false if it was not registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(entry_id, _)| *entry_id != id);
        self.entries.len() != before
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Deliver `event` to every listener.
    ///
    /// A panicking listener is logged and skipped; the rest still run.
    pub fn notify(&mut self, event: &StoreEvent) {
        for (id, callback) in self.entries.iter_mut() {
            if catch_unwind(AssertUnwindSafe(|| callback(event))).is_err() {
                log::error!("Listener {:?} panicked while handling {:?}", id, event);
            }
        }
    }
}

impl std::fmt::Debug for Listeners {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Listeners").field("count", &self.entries.len()).finish()
    }
}
