//! The observer-facing end of one relay instance.

use crate::error::StreamError;
use crate::stream::Observer;
use crate::types::{Mode, RelayStats};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct Status {
    pub(crate) mode: Mode,
    pub(crate) stats: RelayStats,
}

/// Wraps the subscriber so it sees at most one terminal signal and nothing
/// after it, or after unsubscribing.
pub(crate) struct Downstream<T> {
    observer: Arc<dyn Observer<T>>,
    stopped: AtomicBool,
    status: Mutex<Status>,
}

impl<T> Downstream<T> {
    pub(crate) fn new(observer: Arc<dyn Observer<T>>) -> Self {
        Self {
            observer,
            stopped: AtomicBool::new(false),
            status: Mutex::new(Status::default()),
        }
    }

    /// Hand a value to the observer. Returns false if it was dropped.
    pub(crate) fn deliver(&self, value: T) -> bool {
        if self.is_stopped() {
            return false;
        }
        self.status.lock().stats.delivered += 1;
        self.observer.on_next(value);
        true
    }

    pub(crate) fn complete(&self) {
        if !self.stopped.swap(true, Ordering::AcqRel) {
            self.observer.on_completed();
        }
    }

    pub(crate) fn fail(&self, error: StreamError) {
        if !self.stopped.swap(true, Ordering::AcqRel) {
            self.observer.on_error(error);
        }
    }

    /// Stop delivery without a terminal signal. Returns false if already stopped.
    pub(crate) fn close(&self) -> bool {
        !self.stopped.swap(true, Ordering::AcqRel)
    }

    pub(crate) fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::Acquire)
    }

    pub(crate) fn update<F: FnOnce(&mut Status)>(&self, f: F) {
        f(&mut self.status.lock());
    }

    pub(crate) fn status(&self) -> Status {
        *self.status.lock()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stream::observer;
    use crate::types::Notification;

    #[test]
    fn test_single_terminal_and_silence_after() {
        let (observer, rx) = observer::channel::<i32>();
        let downstream = Downstream::<i32>::new(observer);

        assert!(downstream.deliver(1));
        downstream.complete();
        downstream.fail(StreamError::Closed);
        assert!(!downstream.deliver(2));

        assert_eq!(
            rx.try_iter().collect::<Vec<_>>(),
            vec![Notification::Next(1), Notification::Completed]
        );
        assert_eq!(downstream.status().stats.delivered, 1);
    }

    #[test]
    fn test_close_is_silent() {
        let (observer, rx) = observer::channel::<i32>();
        let downstream = Downstream::<i32>::new(observer);

        assert!(downstream.close());
        assert!(!downstream.close());
        downstream.complete();

        assert!(rx.try_recv().is_err());
    }
}
