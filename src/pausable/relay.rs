//! One relay instance: the state owned behind the gate and the signal handler.

use super::config::PausableConfig;
use super::disposal;
use super::downstream::Downstream;
use super::gate::Gate;
use super::hub::Hub;
use super::normalizer::ControlNormalizer;
use super::selector::{self, ModeState};
use super::switcher::FeedSwitcher;
use crate::error::StreamError;
use crate::stream::Observer;
use crate::subscriptions::{CompositeSubscription, Subscription};
use crate::types::{Mode, Notification};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, trace, warn};

static NEXT_INSTANCE: AtomicU64 = AtomicU64::new(1);

/// Everything that reaches the relay, in arrival order.
pub(crate) enum Signal<T> {
    Source(Notification<T>),
    Control(Notification<bool>),
    Dispose,
}

/// State mutated only from inside the gate.
pub(crate) struct Relay<T> {
    normalizer: ControlNormalizer,
    state: ModeState<T>,
    switcher: FeedSwitcher,
    terminated: bool,
}

/// Per-subscription context shared by the sinks and the handle.
pub(crate) struct Shared<T> {
    pub(crate) label: Arc<str>,
    pub(crate) instance: u64,
    capacity_hint: usize,
    pub(crate) hub: Arc<Hub<T>>,
    pub(crate) downstream: Arc<Downstream<T>>,
    /// Source connection, then control; released in that order.
    pub(crate) upstream: CompositeSubscription,
    gate: Gate<Relay<T>, Signal<T>>,
}

impl<T: Clone + Send + 'static> Shared<T> {
    pub(crate) fn new(config: &PausableConfig, observer: Arc<dyn Observer<T>>) -> Arc<Self> {
        let label: Arc<str> = Arc::from(config.label.as_str());
        let instance = NEXT_INSTANCE.fetch_add(1, Ordering::Relaxed);
        let hub = Hub::new(label.clone(), instance);

        let upstream = CompositeSubscription::new();
        let source = hub.clone();
        upstream.add(Subscription::new(move || source.disconnect()));

        Arc::new(Self {
            label,
            instance,
            capacity_hint: config.buffer_capacity_hint,
            hub,
            downstream: Arc::new(Downstream::new(observer)),
            upstream,
            gate: Gate::new(Relay {
                normalizer: ControlNormalizer::new(),
                state: ModeState::default(),
                switcher: FeedSwitcher::new(),
                terminated: false,
            }),
        })
    }

    /// Queue a signal and handle everything pending, unless another caller
    /// is already doing so.
    pub(crate) fn dispatch(&self, signal: Signal<T>) {
        self.gate
            .schedule(signal, |relay, signal| relay.handle(signal, self));
    }

    pub(crate) fn source_sink(self: &Arc<Self>) -> Arc<dyn Observer<T>> {
        Arc::new(SourceSink {
            shared: self.clone(),
        })
    }

    pub(crate) fn control_sink(self: &Arc<Self>) -> Arc<dyn Observer<bool>> {
        Arc::new(ControlSink {
            shared: self.clone(),
        })
    }
}

impl<T: Clone + Send + 'static> Relay<T> {
    fn handle(&mut self, signal: Signal<T>, shared: &Shared<T>) {
        if self.terminated {
            return;
        }
        if shared.downstream.is_stopped() {
            // Observer is gone; record nothing more.
            self.shutdown(shared);
            return;
        }

        match signal {
            Signal::Source(Notification::Next(value)) => {
                if self.state.mode.is_paused() {
                    shared.downstream.update(|status| status.stats.buffered += 1);
                    trace!(relay = %shared.label, instance = shared.instance, "value buffered");
                }
                shared.hub.publish(value);
            }
            Signal::Source(Notification::Completed) => {
                debug!(
                    relay = %shared.label,
                    instance = shared.instance,
                    mode = %self.state.mode,
                    "source completed"
                );
                shared.hub.complete();
                shared.downstream.complete();
                self.shutdown(shared);
            }
            Signal::Source(Notification::Error(error)) => {
                debug!(
                    relay = %shared.label,
                    instance = shared.instance,
                    %error,
                    "source failed"
                );
                shared.hub.error(&error);
                shared.downstream.fail(error);
                self.shutdown(shared);
            }
            Signal::Control(Notification::Next(paused)) => {
                let seeded = self.normalizer.current().is_some();
                match self.normalizer.accept(paused) {
                    Some(mode) => self.apply(mode, seeded, shared),
                    None => trace!(
                        relay = %shared.label,
                        instance = shared.instance,
                        paused,
                        "repeated control value ignored"
                    ),
                }
            }
            Signal::Control(Notification::Completed) => {
                debug!(
                    relay = %shared.label,
                    instance = shared.instance,
                    mode = %self.state.mode,
                    "control completed; mode frozen"
                );
            }
            Signal::Control(Notification::Error(error)) => {
                warn!(
                    relay = %shared.label,
                    instance = shared.instance,
                    %error,
                    "control stream failed; terminating relay"
                );
                shared.downstream.fail(StreamError::control(error));
                self.shutdown(shared);
            }
            Signal::Dispose => self.shutdown(shared),
        }
    }

    /// Move to `mode` and swap in the feed the selector picks for it.
    fn apply(&mut self, mode: Mode, counted: bool, shared: &Shared<T>) {
        let state = std::mem::take(&mut self.state);
        let (next, feed) = selector::transition(state, mode, shared.capacity_hint);
        self.state = next;

        debug!(relay = %shared.label, instance = shared.instance, %mode, "mode transition");
        shared.downstream.update(|status| {
            status.mode = mode;
            if counted {
                status.stats.transitions += 1;
            }
            if mode.is_paused() {
                status.stats.buffers_created += 1;
            }
        });

        self.switcher.switch(feed, &shared.hub, &shared.downstream);
    }

    fn shutdown(&mut self, shared: &Shared<T>) {
        if self.terminated {
            return;
        }
        self.terminated = true;

        let discarded = disposal::dispose(
            &self.switcher,
            self.state.buffer.take(),
            &shared.hub,
            &shared.upstream,
        );
        shared
            .downstream
            .update(|status| status.stats.discarded += discarded as u64);
        debug!(
            relay = %shared.label,
            instance = shared.instance,
            discarded,
            "relay disposed"
        );
    }
}

struct SourceSink<T> {
    shared: Arc<Shared<T>>,
}

impl<T: Clone + Send + 'static> Observer<T> for SourceSink<T> {
    fn on_next(&self, value: T) {
        self.shared.dispatch(Signal::Source(Notification::Next(value)));
    }

    fn on_error(&self, error: StreamError) {
        self.shared
            .dispatch(Signal::Source(Notification::Error(error)));
    }

    fn on_completed(&self) {
        self.shared.dispatch(Signal::Source(Notification::Completed));
    }
}

struct ControlSink<T> {
    shared: Arc<Shared<T>>,
}

impl<T: Clone + Send + 'static> Observer<bool> for ControlSink<T> {
    fn on_next(&self, paused: bool) {
        self.shared
            .dispatch(Signal::Control(Notification::Next(paused)));
    }

    fn on_error(&self, error: StreamError) {
        self.shared
            .dispatch(Signal::Control(Notification::Error(error)));
    }

    fn on_completed(&self) {
        self.shared
            .dispatch(Signal::Control(Notification::Completed));
    }
}
