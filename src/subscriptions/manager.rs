//! Registry of attached observers.

use crate::error::StreamError;
use crate::stream::Observer;
use crate::types::SubscriptionId;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Observers attached to one stream, keyed by subscription id.
///
/// Not synchronized on its own: owners wrap it in a lock and call the
/// `snapshot`/`take_all` helpers so observers are notified with the lock
/// released.
pub struct SubscriberSet<T> {
    /// Active observers by ID. Ordered so fan-out follows attach order.
    observers: BTreeMap<SubscriptionId, Arc<dyn Observer<T>>>,
    /// Counter for generating subscription IDs.
    next_id: u64,
}

impl<T> SubscriberSet<T> {
    pub fn new() -> Self {
        Self {
            observers: BTreeMap::new(),
            next_id: 1,
        }
    }

    /// Attach an observer and return its id.
    pub fn insert(&mut self, observer: Arc<dyn Observer<T>>) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.observers.insert(id, observer);
        id
    }

    /// Detach an observer. Returns false if it was already gone.
    pub fn remove(&mut self, id: SubscriptionId) -> bool {
        self.observers.remove(&id).is_some()
    }

    pub fn len(&self) -> usize {
        self.observers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }

    /// Clone the current observer list for notification outside the lock.
    pub fn snapshot(&self) -> Vec<Arc<dyn Observer<T>>> {
        self.observers.values().cloned().collect()
    }

    /// Detach everyone, returning them for a final notification.
    pub fn take_all(&mut self) -> Vec<Arc<dyn Observer<T>>> {
        std::mem::take(&mut self.observers).into_values().collect()
    }
}

impl<T> Default for SubscriberSet<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Deliver a value to every observer in `targets`.
pub(crate) fn broadcast_next<T: Clone>(targets: &[Arc<dyn Observer<T>>], value: T) {
    // The last observer takes ownership of the value.
    if let Some((last, rest)) = targets.split_last() {
        for observer in rest {
            observer.on_next(value.clone());
        }
        last.on_next(value);
    }
}

pub(crate) fn broadcast_error<T>(targets: &[Arc<dyn Observer<T>>], error: &StreamError) {
    for observer in targets {
        observer.on_error(error.clone());
    }
}

pub(crate) fn broadcast_completed<T>(targets: &[Arc<dyn Observer<T>>]) {
    for observer in targets {
        observer.on_completed();
    }
}
