//! Subscription handles: idempotent teardown and the two standard containers.

use parking_lot::Mutex;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

type Teardown = Box<dyn FnOnce() + Send>;

struct Inner {
    closed: AtomicBool,
    teardown: Mutex<Option<Teardown>>,
}

/// Handle to a live attachment between an observer and a stream.
///
/// Cloning shares the handle. `unsubscribe` runs the teardown at most once,
/// no matter how many clones call it or from which thread.
#[derive(Clone)]
pub struct Subscription {
    inner: Arc<Inner>,
}

impl Subscription {
    /// Create a subscription that runs `teardown` on the first `unsubscribe`.
    pub fn new<F>(teardown: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        Self {
            inner: Arc::new(Inner {
                closed: AtomicBool::new(false),
                teardown: Mutex::new(Some(Box::new(teardown))),
            }),
        }
    }

    /// A subscription with nothing to tear down.
    pub fn empty() -> Self {
        Self {
            inner: Arc::new(Inner {
                closed: AtomicBool::new(false),
                teardown: Mutex::new(None),
            }),
        }
    }

    /// Release the attachment. Safe to call any number of times.
    pub fn unsubscribe(&self) {
        if self.inner.closed.swap(true, Ordering::AcqRel) {
            return;
        }
        // Run outside the lock; teardown may re-enter other handles.
        let teardown = self.inner.teardown.lock().take();
        if let Some(teardown) = teardown {
            teardown();
        }
    }

    pub fn is_closed(&self) -> bool {
        self.inner.closed.load(Ordering::Acquire)
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("closed", &self.is_closed())
            .finish()
    }
}

struct SerialState {
    current: Option<Subscription>,
    closed: bool,
}

/// Holds at most one subscription; replacing it disposes the previous one.
///
/// Once closed, any subscription handed to `set` is disposed immediately.
pub struct SerialSubscription {
    state: Mutex<SerialState>,
}

impl SerialSubscription {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(SerialState {
                current: None,
                closed: false,
            }),
        }
    }

    /// Install `next`, disposing whatever was held before.
    pub fn set(&self, next: Subscription) {
        let previous = {
            let mut state = self.state.lock();
            if state.closed {
                Some(next)
            } else {
                state.current.replace(next)
            }
        };
        if let Some(previous) = previous {
            previous.unsubscribe();
        }
    }

    /// Dispose the held subscription without closing the slot.
    pub fn clear(&self) {
        let previous = self.state.lock().current.take();
        if let Some(previous) = previous {
            previous.unsubscribe();
        }
    }

    /// Close the slot and dispose the held subscription.
    pub fn unsubscribe(&self) {
        let previous = {
            let mut state = self.state.lock();
            state.closed = true;
            state.current.take()
        };
        if let Some(previous) = previous {
            previous.unsubscribe();
        }
    }

    pub fn is_closed(&self) -> bool {
        self.state.lock().closed
    }

    /// Whether a live subscription is currently held.
    pub fn is_set(&self) -> bool {
        self.state.lock().current.is_some()
    }
}

impl Default for SerialSubscription {
    fn default() -> Self {
        Self::new()
    }
}

/// A group of subscriptions disposed together, in insertion order.
pub struct CompositeSubscription {
    members: Mutex<Option<Vec<Subscription>>>,
}

impl CompositeSubscription {
    pub fn new() -> Self {
        Self {
            members: Mutex::new(Some(Vec::new())),
        }
    }

    /// Add a member. If the group is already disposed the member is disposed now.
    pub fn add(&self, subscription: Subscription) {
        let rejected = {
            let mut members = self.members.lock();
            match members.as_mut() {
                Some(list) => {
                    list.push(subscription);
                    None
                }
                None => Some(subscription),
            }
        };
        if let Some(rejected) = rejected {
            rejected.unsubscribe();
        }
    }

    pub fn unsubscribe(&self) {
        let members = self.members.lock().take();
        for member in members.into_iter().flatten() {
            member.unsubscribe();
        }
    }

    pub fn is_closed(&self) -> bool {
        self.members.lock().is_none()
    }

    pub fn len(&self) -> usize {
        self.members.lock().as_ref().map_or(0, Vec::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for CompositeSubscription {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    fn counting() -> (Subscription, Arc<AtomicUsize>) {
        let count = Arc::new(AtomicUsize::new(0));
        let hits = count.clone();
        let sub = Subscription::new(move || {
            hits.fetch_add(1, Ordering::SeqCst);
        });
        (sub, count)
    }

    #[test]
    fn test_unsubscribe_runs_teardown_once() {
        let (sub, count) = counting();
        let clone = sub.clone();

        sub.unsubscribe();
        clone.unsubscribe();
        sub.unsubscribe();

        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert!(clone.is_closed());
    }

    #[test]
    fn test_serial_replaces_and_disposes_previous() {
        let serial = SerialSubscription::new();
        let (first, first_count) = counting();
        let (second, second_count) = counting();

        serial.set(first);
        assert!(serial.is_set());
        serial.set(second);
        assert_eq!(first_count.load(Ordering::SeqCst), 1);
        assert_eq!(second_count.load(Ordering::SeqCst), 0);

        serial.unsubscribe();
        assert_eq!(second_count.load(Ordering::SeqCst), 1);
        assert!(!serial.is_set());
    }

    #[test]
    fn test_serial_disposes_late_arrival_after_close() {
        let serial = SerialSubscription::new();
        serial.unsubscribe();

        let (late, count) = counting();
        serial.set(late);
        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert!(serial.is_closed());
    }

    #[test]
    fn test_serial_clear_keeps_slot_open() {
        let serial = SerialSubscription::new();
        let (first, count) = counting();
        serial.set(first);
        serial.clear();

        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert!(!serial.is_closed());
    }

    #[test]
    fn test_composite_disposes_in_insertion_order() {
        let order = Arc::new(Mutex::new(Vec::new()));
        let composite = CompositeSubscription::new();
        for i in 0..3 {
            let order = order.clone();
            composite.add(Subscription::new(move || order.lock().push(i)));
        }
        assert_eq!(composite.len(), 3);

        composite.unsubscribe();
        composite.unsubscribe();
        assert_eq!(*order.lock(), vec![0, 1, 2]);
        assert!(composite.is_closed());

        let (late, count) = counting();
        composite.add(late);
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }
}
