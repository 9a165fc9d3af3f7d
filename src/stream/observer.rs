//! Observer and Observable traits plus the stock observers.

use crate::error::StreamError;
use crate::subscriptions::Subscription;
use crate::types::Notification;
use crossbeam_channel::{unbounded, Receiver, Sender};
use std::sync::Arc;

/// Receives the signals of a stream.
///
/// A well-behaved stream calls `on_next` any number of times followed by at
/// most one of `on_error` / `on_completed`, never concurrently.
pub trait Observer<T>: Send + Sync {
    fn on_next(&self, value: T);

    fn on_error(&self, error: StreamError);

    fn on_completed(&self);

    /// Dispatch a reified signal to the matching callback.
    fn notify(&self, notification: Notification<T>) {
        match notification {
            Notification::Next(value) => self.on_next(value),
            Notification::Error(error) => self.on_error(error),
            Notification::Completed => self.on_completed(),
        }
    }
}

/// A push-based stream that observers can attach to.
pub trait Observable<T>: Send + Sync {
    /// Attach `observer`. Signals flow until the returned handle is
    /// unsubscribed or the stream terminates.
    fn subscribe(&self, observer: Arc<dyn Observer<T>>) -> Subscription;
}

impl<T, O> Observable<T> for Arc<O>
where
    O: Observable<T> + ?Sized,
{
    fn subscribe(&self, observer: Arc<dyn Observer<T>>) -> Subscription {
        (**self).subscribe(observer)
    }
}

/// Observer that forwards every signal into a crossbeam channel.
pub struct ChannelObserver<T> {
    sender: Sender<Notification<T>>,
}

impl<T: Send> Observer<T> for ChannelObserver<T> {
    fn on_next(&self, value: T) {
        // A dropped receiver just means nobody is listening any more.
        let _ = self.sender.send(Notification::Next(value));
    }

    fn on_error(&self, error: StreamError) {
        let _ = self.sender.send(Notification::Error(error));
    }

    fn on_completed(&self) {
        let _ = self.sender.send(Notification::Completed);
    }
}

/// Create an observer paired with the receiving end of an unbounded channel.
pub fn channel<T: Send + 'static>() -> (Arc<ChannelObserver<T>>, Receiver<Notification<T>>) {
    let (sender, receiver) = unbounded();
    (Arc::new(ChannelObserver { sender }), receiver)
}

/// Observer backed by a single closure over [`Notification`].
pub struct FnObserver<F> {
    callback: F,
}

impl<T, F> Observer<T> for FnObserver<F>
where
    F: Fn(Notification<T>) + Send + Sync,
{
    fn on_next(&self, value: T) {
        (self.callback)(Notification::Next(value));
    }

    fn on_error(&self, error: StreamError) {
        (self.callback)(Notification::Error(error));
    }

    fn on_completed(&self) {
        (self.callback)(Notification::Completed);
    }
}

/// Wrap a closure as an observer.
pub fn from_fn<T, F>(callback: F) -> Arc<FnObserver<F>>
where
    F: Fn(Notification<T>) + Send + Sync,
{
    Arc::new(FnObserver { callback })
}
