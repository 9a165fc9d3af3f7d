//! Subscription handles and the observer registry.
//!
//! - [`Subscription`]: idempotent teardown handle returned by every subscribe
//! - [`SerialSubscription`]: single slot, replacing disposes the previous holder
//! - [`CompositeSubscription`]: ordered group teardown
//! - [`SubscriberSet`]: id-keyed observer list used by subjects and hubs

mod manager;
mod types;

pub use manager::SubscriberSet;
pub(crate) use manager::{broadcast_completed, broadcast_error, broadcast_next};
pub use types::{CompositeSubscription, SerialSubscription, Subscription};
