//! Serializing gate: funnels signals from any thread through one state owner.

use crossbeam_channel::{unbounded, Receiver, Sender};
use parking_lot::Mutex;

/// Serializes access to `S` for messages of type `M`.
///
/// Every message is queued first. Whichever caller wins the state lock drains
/// the queue, so handlers never run concurrently and run in enqueue order.
/// A caller that loses the race returns at once; its message is handled by
/// the current drainer. Re-entrant calls from inside a handler are queued the
/// same way and never deadlock.
pub(crate) struct Gate<S, M> {
    sender: Sender<M>,
    receiver: Receiver<M>,
    state: Mutex<S>,
}

impl<S, M> Gate<S, M> {
    pub(crate) fn new(state: S) -> Self {
        let (sender, receiver) = unbounded();
        Self {
            sender,
            receiver,
            state: Mutex::new(state),
        }
    }

    /// Queue `message` and drain the queue if no one else is.
    pub(crate) fn schedule<F>(&self, message: M, mut handle: F)
    where
        F: FnMut(&mut S, M),
    {
        // Both ends are owned here, so the channel cannot be disconnected.
        let _ = self.sender.send(message);

        loop {
            let Some(mut state) = self.state.try_lock() else {
                return;
            };
            while let Ok(message) = self.receiver.try_recv() {
                handle(&mut state, message);
            }
            drop(state);

            // A message queued between the last try_recv and the unlock was
            // left for us by a caller that saw the lock held.
            if self.receiver.is_empty() {
                return;
            }
        }
    }
}
