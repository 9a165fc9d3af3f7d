//! Multicast hub: one upstream subscription shared by the relay's consumers.

use crate::error::StreamError;
use crate::stream::{Observable, Observer};
use crate::subscriptions::{
    broadcast_completed, broadcast_error, broadcast_next, SerialSubscription, SubscriberSet,
    Subscription,
};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::debug;

/// Fans one source out to the replay buffer and the live feed.
///
/// Built unconnected; [`Hub::connect`] subscribes to the source exactly once.
pub(crate) struct Hub<T> {
    label: Arc<str>,
    instance: u64,
    consumers: Mutex<SubscriberSet<T>>,
    upstream: SerialSubscription,
    connected: AtomicBool,
}

impl<T: Clone + Send + 'static> Hub<T> {
    /// `label` and `instance` identify the owning relay in log events.
    pub(crate) fn new(label: Arc<str>, instance: u64) -> Arc<Self> {
        Arc::new(Self {
            label,
            instance,
            consumers: Mutex::new(SubscriberSet::new()),
            upstream: SerialSubscription::new(),
            connected: AtomicBool::new(false),
        })
    }

    /// Subscribe `sink` to `source`. Only the first call connects; later calls
    /// return false and leave the existing connection alone.
    pub(crate) fn connect(&self, source: &dyn Observable<T>, sink: Arc<dyn Observer<T>>) -> bool {
        if self.connected.swap(true, Ordering::AcqRel) {
            return false;
        }
        if self.upstream.is_closed() {
            debug!(
                relay = %self.label,
                instance = self.instance,
                "hub disposed before connect; skipping source subscription"
            );
            return false;
        }
        let subscription = source.subscribe(sink);
        self.upstream.set(subscription);
        debug!(relay = %self.label, instance = self.instance, "hub connected to source");
        true
    }

    /// Attach an internal consumer. The returned handle detaches it.
    pub(crate) fn attach(self: &Arc<Self>, consumer: Arc<dyn Observer<T>>) -> Subscription {
        let id = self.consumers.lock().insert(consumer);
        let hub = Arc::downgrade(self);
        Subscription::new(move || {
            if let Some(hub) = hub.upgrade() {
                hub.consumers.lock().remove(id);
            }
        })
    }

    pub(crate) fn publish(&self, value: T) {
        let targets = self.consumers.lock().snapshot();
        broadcast_next(&targets, value);
    }

    /// Forward completion and detach every consumer.
    pub(crate) fn complete(&self) {
        let targets = self.consumers.lock().take_all();
        broadcast_completed(&targets);
    }

    /// Forward an error and detach every consumer.
    pub(crate) fn error(&self, error: &StreamError) {
        let targets = self.consumers.lock().take_all();
        broadcast_error(&targets, error);
    }

    /// Release the upstream subscription. Idempotent.
    pub(crate) fn disconnect(&self) {
        self.upstream.unsubscribe();
    }

    pub(crate) fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Acquire) && !self.upstream.is_closed()
    }

    pub(crate) fn consumer_count(&self) -> usize {
        self.consumers.lock().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stream::{observer, subject};
    use crate::types::Notification;

    #[test]
    fn test_connect_is_lazy_and_single() {
        let (publisher, topic) = subject::<i32>();
        let hub = Hub::<i32>::new(Arc::from("test"), 0);
        assert_eq!(publisher.subscriber_count(), 0);

        let (sink, _rx) = observer::channel::<i32>();
        assert!(hub.connect(&topic, sink.clone()));
        assert!(!hub.connect(&topic, sink));

        assert_eq!(publisher.subscriber_count(), 1);
        assert!(hub.is_connected());
    }

    #[test]
    fn test_fan_out_and_detach() {
        let hub = Hub::<i32>::new(Arc::from("test"), 0);
        let (a, a_rx) = observer::channel::<i32>();
        let (b, b_rx) = observer::channel::<i32>();
        let sub_a = hub.attach(a);
        let _sub_b = hub.attach(b);

        hub.publish(1);
        sub_a.unsubscribe();
        hub.publish(2);

        assert_eq!(a_rx.try_iter().collect::<Vec<_>>(), vec![Notification::Next(1)]);
        assert_eq!(
            b_rx.try_iter().collect::<Vec<_>>(),
            vec![Notification::Next(1), Notification::Next(2)]
        );
        assert_eq!(hub.consumer_count(), 1);
    }

    #[test]
    fn test_terminal_detaches_everyone() {
        let hub = Hub::<i32>::new(Arc::from("test"), 0);
        let (a, a_rx) = observer::channel::<i32>();
        let _sub = hub.attach(a);

        hub.error(&StreamError::upstream("boom"));

        assert_eq!(
            a_rx.try_recv().unwrap(),
            Notification::Error(StreamError::upstream("boom"))
        );
        assert_eq!(hub.consumer_count(), 0);
    }

    #[test]
    fn test_disconnect_releases_source() {
        let (publisher, topic) = subject::<i32>();
        let hub = Hub::<i32>::new(Arc::from("test"), 0);
        let (sink, _rx) = observer::channel::<i32>();
        hub.connect(&topic, sink);

        hub.disconnect();
        hub.disconnect();

        assert_eq!(publisher.subscriber_count(), 0);
        assert!(!hub.is_connected());
    }

    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

    impl std::io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_connect_logs_owning_relay() {
        let logs = CapturedLogs::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();

        let (_publisher, topic) = subject::<i32>();
        let hub = Hub::<i32>::new(Arc::from("meter"), 7);
        let (sink, _rx) = observer::channel::<i32>();
        tracing::subscriber::with_default(subscriber, || {
            hub.connect(&topic, sink);
        });

        let output = String::from_utf8(logs.0.lock().clone()).unwrap();
        assert!(output.contains("hub connected to source"));
        assert!(output.contains("relay=meter"));
        assert!(output.contains("instance=7"));
    }
}
