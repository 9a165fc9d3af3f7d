//! Hot streams with a split emission side and subscription side.
//!
//! A subject is created as a pair: the [`Publisher`] pushes signals in, the
//! [`Topic`] hands them out to every attached observer. Neither half can do
//! the other's job, so ownership of "who may emit" stays explicit.

use crate::error::{Result, StreamError};
use crate::stream::{Observable, Observer};
use crate::subscriptions::{
    broadcast_completed, broadcast_error, broadcast_next, SubscriberSet, Subscription,
};
use parking_lot::Mutex;
use std::sync::{Arc, Weak};
use tracing::trace;

#[derive(Clone)]
enum Terminal {
    Completed,
    Error(StreamError),
}

struct SubjectState<T> {
    subscribers: SubscriberSet<T>,
    terminal: Option<Terminal>,
    /// Last value, replayed to new subscribers (behavior subjects only).
    latest: Option<T>,
}

struct SubjectCore<T> {
    state: Mutex<SubjectState<T>>,
    replay_latest: bool,
}

impl<T: Clone + Send + 'static> SubjectCore<T> {
    fn new(latest: Option<T>, replay_latest: bool) -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(SubjectState {
                subscribers: SubscriberSet::new(),
                terminal: None,
                latest,
            }),
            replay_latest,
        })
    }

    fn next(&self, value: T) -> Result<()> {
        let targets = {
            let mut state = self.state.lock();
            if state.terminal.is_some() {
                return Err(StreamError::Closed);
            }
            if self.replay_latest {
                state.latest = Some(value.clone());
            }
            state.subscribers.snapshot()
        };

        broadcast_next(&targets, value);
        Ok(())
    }

    fn terminate(&self, terminal: Terminal) -> Result<()> {
        let targets = {
            let mut state = self.state.lock();
            if state.terminal.is_some() {
                return Err(StreamError::Closed);
            }
            state.terminal = Some(terminal.clone());
            state.latest = None;
            state.subscribers.take_all()
        };

        match terminal {
            Terminal::Completed => broadcast_completed(&targets),
            Terminal::Error(error) => broadcast_error(&targets, &error),
        }
        Ok(())
    }

    fn subscribe(core: &Arc<Self>, observer: Arc<dyn Observer<T>>) -> Subscription {
        let (id, latest) = {
            let mut state = core.state.lock();
            if let Some(terminal) = state.terminal.clone() {
                drop(state);
                match terminal {
                    Terminal::Completed => observer.on_completed(),
                    Terminal::Error(error) => observer.on_error(error),
                }
                return Subscription::empty();
            }
            let id = state.subscribers.insert(observer.clone());
            (id, state.latest.clone())
        };
        trace!(subscription = %id, "topic subscribed");

        if let Some(value) = latest {
            observer.on_next(value);
        }

        let core: Weak<Self> = Arc::downgrade(core);
        Subscription::new(move || {
            if let Some(core) = core.upgrade() {
                core.state.lock().subscribers.remove(id);
            }
        })
    }

    fn subscriber_count(&self) -> usize {
        self.state.lock().subscribers.len()
    }

    fn is_terminated(&self) -> bool {
        self.state.lock().terminal.is_some()
    }
}

/// Emission half of a subject.
pub struct Publisher<T> {
    core: Arc<SubjectCore<T>>,
}

impl<T> Clone for Publisher<T> {
    fn clone(&self) -> Self {
        Self {
            core: self.core.clone(),
        }
    }
}

impl<T: Clone + Send + 'static> Publisher<T> {
    /// Push a value to every current subscriber.
    ///
    /// Returns `Err(StreamError::Closed)` once the subject has terminated.
    pub fn next(&self, value: T) -> Result<()> {
        self.core.next(value)
    }

    /// Terminate with an error. Late subscribers receive the same error.
    pub fn error(&self, error: StreamError) -> Result<()> {
        self.core.terminate(Terminal::Error(error))
    }

    /// Terminate normally. Late subscribers complete immediately.
    pub fn complete(&self) -> Result<()> {
        self.core.terminate(Terminal::Completed)
    }

    pub fn is_closed(&self) -> bool {
        self.core.is_terminated()
    }

    pub fn subscriber_count(&self) -> usize {
        self.core.subscriber_count()
    }
}

/// Subscription half of a subject.
pub struct Topic<T> {
    core: Arc<SubjectCore<T>>,
}

impl<T> Clone for Topic<T> {
    fn clone(&self) -> Self {
        Self {
            core: self.core.clone(),
        }
    }
}

impl<T: Clone + Send + 'static> Topic<T> {
    pub fn subscriber_count(&self) -> usize {
        self.core.subscriber_count()
    }
}

impl<T: Clone + Send + 'static> Observable<T> for Topic<T> {
    fn subscribe(&self, observer: Arc<dyn Observer<T>>) -> Subscription {
        SubjectCore::subscribe(&self.core, observer)
    }
}

/// Create a hot subject. Values pushed while nobody listens are lost.
pub fn subject<T: Clone + Send + 'static>() -> (Publisher<T>, Topic<T>) {
    let core = SubjectCore::new(None, false);
    (Publisher { core: core.clone() }, Topic { core })
}

/// Create a subject that replays its latest value (starting with `initial`)
/// to each new subscriber.
///
/// A value published concurrently with a new subscription may reach that
/// subscriber ahead of the replayed one; serialize the two if that matters.
pub fn behavior_subject<T: Clone + Send + 'static>(initial: T) -> (Publisher<T>, Topic<T>) {
    let core = SubjectCore::new(Some(initial), true);
    (Publisher { core: core.clone() }, Topic { core })
}
