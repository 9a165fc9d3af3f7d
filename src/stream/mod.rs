//! Push-based stream primitives.
//!
//! Observers receive values synchronously in the emitter's calling context.
//! Subjects are the hot sources the rest of the crate is tested against.

pub mod observer;
mod subject;

pub use observer::{ChannelObserver, FnObserver, Observable, Observer};
pub use subject::{behavior_subject, subject, Publisher, Topic};
