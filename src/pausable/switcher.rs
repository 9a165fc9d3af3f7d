//! Active-feed switcher: keeps exactly one feed attached at a time.

use super::downstream::Downstream;
use super::hub::Hub;
use super::selector::Feed;
use crate::error::StreamError;
use crate::stream::Observer;
use crate::subscriptions::SerialSubscription;
use std::sync::Arc;
use tracing::debug;

/// Hub consumer that forwards live values to the observer.
struct LiveFeed<T> {
    downstream: Arc<Downstream<T>>,
}

impl<T: Send> Observer<T> for LiveFeed<T> {
    fn on_next(&self, value: T) {
        self.downstream.deliver(value);
    }

    fn on_error(&self, error: StreamError) {
        self.downstream.fail(error);
    }

    fn on_completed(&self) {
        self.downstream.complete();
    }
}

/// Switch-to-latest over the feeds produced by the mode selector.
///
/// Must only be driven from inside the relay's gate: the cancel of the old
/// feed and the start of the new one then happen with no source value in
/// between.
pub(crate) struct FeedSwitcher {
    current: SerialSubscription,
}

impl FeedSwitcher {
    pub(crate) fn new() -> Self {
        Self {
            current: SerialSubscription::new(),
        }
    }

    /// Cancel the active feed and start `feed`. Returns how many buffered
    /// values were replayed.
    pub(crate) fn switch<T>(
        &self,
        feed: Feed<T>,
        hub: &Arc<Hub<T>>,
        downstream: &Arc<Downstream<T>>,
    ) -> usize
    where
        T: Clone + Send + 'static,
    {
        // Detaching a paused feed freezes its buffer before it is replayed.
        self.current.clear();

        match feed {
            Feed::Empty { capture } => {
                self.current.set(hub.attach(capture));
                0
            }
            Feed::ReplayThenLive { replay } => {
                let backlog = replay.map(|buffer| buffer.drain()).unwrap_or_default();
                let replayed = backlog.len();
                if replayed > 0 {
                    debug!(replayed, "replaying paused backlog");
                }
                for value in backlog {
                    if !downstream.deliver(value) {
                        break;
                    }
                }
                downstream.update(|status| status.stats.replayed += replayed as u64);

                let live = Arc::new(LiveFeed {
                    downstream: downstream.clone(),
                });
                self.current.set(hub.attach(live));
                replayed
            }
        }
    }

    /// Cancel the active feed for good.
    pub(crate) fn dispose(&self) {
        self.current.unsubscribe();
    }

    pub(crate) fn is_active(&self) -> bool {
        self.current.is_set()
    }
}
