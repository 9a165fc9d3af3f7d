//! The pausable relay operator.
//!
//! `pausable(source, control)` relays `source` while `control` last said
//! `false` (playing), records it while `control` says `true` (paused), and
//! replays the recording in order on resume before going live again.
//!
//! Each subscription is an independent relay instance:
//!
//! ```text
//! control ─► normalizer ─► selector ─► switcher ─► observer
//!                                        ▲   ▲
//! source ──► hub ─────────── buffer ─────┘   │
//!             └──────────────── live ────────┘
//! ```
//!
//! All signals of one instance pass through a serializing gate, so source and
//! control may emit from different threads without reordering the output.
//!
//! # Example
//!
//! ```
//! use pausable_relay::{observer, pausable, subject, Notification};
//!
//! let (items, source) = subject::<i32>();
//! let (manager, control) = subject::<bool>();
//! let (observer, rx) = observer::channel::<i32>();
//!
//! let handle = pausable(source, control).subscribe_handle(observer);
//! items.next(1).unwrap();
//! manager.next(true).unwrap();
//! items.next(2).unwrap();
//! manager.next(false).unwrap();
//!
//! let seen: Vec<i32> = rx.try_iter().filter_map(Notification::into_value).collect();
//! assert_eq!(seen, vec![1, 2]);
//! handle.unsubscribe();
//! ```

mod buffer;
mod config;
mod disposal;
mod downstream;
mod gate;
mod hub;
mod normalizer;
mod relay;
mod selector;
mod switcher;

pub use config::PausableConfig;

use crate::stream::{Observable, Observer};
use crate::subscriptions::Subscription;
use crate::types::{Mode, Notification, RelayStats};
use normalizer::ControlNormalizer;
use relay::{Shared, Signal};
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// A source gated by a boolean control stream.
///
/// Nothing is subscribed upstream until [`Pausable::subscribe_handle`] (or
/// [`Observable::subscribe`]) is called.
pub struct Pausable<T> {
    source: Arc<dyn Observable<T>>,
    control: Arc<dyn Observable<bool>>,
    config: PausableConfig,
}

impl<T> Clone for Pausable<T> {
    fn clone(&self) -> Self {
        Self {
            source: self.source.clone(),
            control: self.control.clone(),
            config: self.config.clone(),
        }
    }
}

impl<T: Clone + Send + 'static> Pausable<T> {
    pub fn new<S, C>(source: S, control: C) -> Self
    where
        S: Observable<T> + 'static,
        C: Observable<bool> + 'static,
    {
        Self {
            source: Arc::new(source),
            control: Arc::new(control),
            config: PausableConfig::default(),
        }
    }

    pub fn with_config(mut self, config: PausableConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &PausableConfig {
        &self.config
    }

    /// Start a relay instance for `observer` and return its handle.
    ///
    /// The control stream is attached before the source, so a control value
    /// replayed on subscription takes effect before the first source value.
    pub fn subscribe_handle(&self, observer: Arc<dyn Observer<T>>) -> PausableSubscription<T> {
        let shared = Shared::new(&self.config, observer);
        debug!(relay = %shared.label, instance = shared.instance, "relay subscribed");

        shared.dispatch(Signal::Control(Notification::Next(ControlNormalizer::SEED)));

        // Added after the source disconnect, so teardown releases control last.
        let control = self.control.subscribe(shared.control_sink());
        shared.upstream.add(control);

        if !shared.downstream.is_stopped() {
            shared.hub.connect(&*self.source, shared.source_sink());
        }

        PausableSubscription { shared }
    }
}

impl<T: Clone + Send + 'static> Observable<T> for Pausable<T> {
    fn subscribe(&self, observer: Arc<dyn Observer<T>>) -> Subscription {
        let handle = self.subscribe_handle(observer);
        Subscription::new(move || handle.unsubscribe())
    }
}

/// Handle to one running relay instance.
pub struct PausableSubscription<T> {
    shared: Arc<Shared<T>>,
}

impl<T> Clone for PausableSubscription<T> {
    fn clone(&self) -> Self {
        Self {
            shared: self.shared.clone(),
        }
    }
}

impl<T: Clone + Send + 'static> PausableSubscription<T> {
    /// Stop delivery and release the source and control subscriptions.
    ///
    /// Idempotent, and harmless after the relay already completed or failed.
    pub fn unsubscribe(&self) {
        if self.shared.downstream.close() {
            debug!(
                relay = %self.shared.label,
                instance = self.shared.instance,
                "relay unsubscribed"
            );
        }
        // Teardown runs inside the gate, after any signal being handled.
        self.shared.dispatch(Signal::Dispose);
    }

    /// True once unsubscribed or after a terminal signal was delivered.
    pub fn is_closed(&self) -> bool {
        self.shared.downstream.is_stopped()
    }

    /// Whether the source subscription is still held.
    pub fn is_connected(&self) -> bool {
        self.shared.hub.is_connected()
    }

    pub fn mode(&self) -> Mode {
        self.shared.downstream.status().mode
    }

    pub fn stats(&self) -> RelayStats {
        self.shared.downstream.status().stats
    }

    /// Convert into a plain subscription handle.
    pub fn into_subscription(self) -> Subscription {
        Subscription::new(move || self.unsubscribe())
    }
}

impl<T> fmt::Debug for PausableSubscription<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PausableSubscription")
            .field("label", &self.shared.label)
            .field("instance", &self.shared.instance)
            .finish()
    }
}

/// Build a pausable relay over `source`, gated by `control` (`true` = pause).
pub fn pausable<T, S, C>(source: S, control: C) -> Pausable<T>
where
    T: Clone + Send + 'static,
    S: Observable<T> + 'static,
    C: Observable<bool> + 'static,
{
    Pausable::new(source, control)
}

/// Method-style access to [`pausable`].
pub trait ObservableExt<T>: Observable<T> + Sized + 'static {
    fn pausable<C>(self, control: C) -> Pausable<T>
    where
        T: Clone + Send + 'static,
        C: Observable<bool> + 'static,
    {
        Pausable::new(self, control)
    }
}

impl<T, O> ObservableExt<T> for O where O: Observable<T> + 'static {}
