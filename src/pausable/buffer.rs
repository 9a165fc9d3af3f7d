//! Replay buffer: records source values for one pause interval.

use crate::error::StreamError;
use crate::stream::Observer;
use parking_lot::Mutex;

struct BufferState<T> {
    events: Vec<T>,
    /// No further values are recorded once sealed.
    sealed: bool,
}

/// Unbounded, append-only capture of the values seen while paused.
///
/// Contents can be taken exactly once, by [`ReplayBuffer::drain`] on resume
/// or [`ReplayBuffer::discard`] on teardown.
pub(crate) struct ReplayBuffer<T> {
    state: Mutex<BufferState<T>>,
}

impl<T> ReplayBuffer<T> {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            state: Mutex::new(BufferState {
                events: Vec::with_capacity(capacity),
                sealed: false,
            }),
        }
    }

    /// Take the recorded values in capture order and seal the buffer.
    pub(crate) fn drain(&self) -> Vec<T> {
        let mut state = self.state.lock();
        state.sealed = true;
        std::mem::take(&mut state.events)
    }

    /// Drop the recorded values and seal. Returns how many were dropped.
    pub(crate) fn discard(&self) -> usize {
        let mut state = self.state.lock();
        state.sealed = true;
        let dropped = state.events.len();
        state.events = Vec::new();
        dropped
    }

    pub(crate) fn len(&self) -> usize {
        self.state.lock().events.len()
    }
}

impl<T: Send> Observer<T> for ReplayBuffer<T> {
    fn on_next(&self, value: T) {
        let mut state = self.state.lock();
        if !state.sealed {
            state.events.push(value);
        }
    }

    fn on_error(&self, _error: StreamError) {
        self.state.lock().sealed = true;
    }

    fn on_completed(&self) {
        self.state.lock().sealed = true;
    }
}
