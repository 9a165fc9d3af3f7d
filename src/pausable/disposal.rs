//! Disposal manager: ordered, idempotent teardown of a relay instance.

use super::buffer::ReplayBuffer;
use super::hub::Hub;
use super::switcher::FeedSwitcher;
use crate::subscriptions::CompositeSubscription;
use std::sync::Arc;
use tracing::trace;

/// Tear down in order: active feed, pending buffer, then `upstream`.
///
/// `upstream` holds the source connection followed by the control
/// subscription and releases them in that order. Every step is idempotent,
/// so calling this again after completion, error or an earlier unsubscribe
/// does nothing. Returns the number of buffered values dropped.
pub(crate) fn dispose<T>(
    switcher: &FeedSwitcher,
    buffer: Option<Arc<ReplayBuffer<T>>>,
    hub: &Hub<T>,
    upstream: &CompositeSubscription,
) -> usize
where
    T: Clone + Send + 'static,
{
    trace!(
        feed_active = switcher.is_active(),
        consumers = hub.consumer_count(),
        buffered = buffer.as_ref().map_or(0, |buffer| buffer.len()),
        "disposing relay"
    );
    switcher.dispose();
    let discarded = buffer.map_or(0, |buffer| buffer.discard());
    upstream.unsubscribe();
    discarded
}
