//! # Pausable Relay
//!
//! A push-based stream combinator that relays a source while playing,
//! records it while paused, and replays the recording in order on resume.
//!
//! ## Core Concepts
//!
//! - **Streams**: [`Observable`]s push values to [`Observer`]s synchronously
//! - **Subjects**: hot streams split into a [`Publisher`] and a [`Topic`]
//! - **Subscriptions**: idempotent teardown handles
//! - **Relay**: [`pausable`] gates a source with a `bool` control stream
//!
//! ## Example
//!
//! ```ignore
//! use pausable_relay::{observer, pausable, subject};
//!
//! let (items, source) = subject::<i32>();
//! let (manager, control) = subject::<bool>();
//! let (observer, rx) = observer::channel::<i32>();
//!
//! let relay = pausable(source, control).subscribe_handle(observer);
//!
//! manager.next(true)?;   // pause: values are recorded
//! items.next(1)?;
//! manager.next(false)?;  // play: 1 is replayed, then live
//! items.next(2)?;
//!
//! println!("{:?}", relay.stats());
//! relay.unsubscribe();
//! ```

pub mod error;
pub mod pausable;
pub mod stream;
pub mod subscriptions;
pub mod types;

// Re-exports
pub use error::{Result, StreamError};
pub use pausable::{pausable, ObservableExt, Pausable, PausableConfig, PausableSubscription};
pub use stream::{
    behavior_subject, observer, subject, ChannelObserver, FnObserver, Observable, Observer,
    Publisher, Topic,
};
pub use subscriptions::{CompositeSubscription, SerialSubscription, SubscriberSet, Subscription};
pub use types::*;
