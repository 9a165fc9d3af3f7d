//! Mode selector: the pure transition from one mode record to the next.

use super::buffer::ReplayBuffer;
use crate::types::Mode;
use std::sync::Arc;

/// Per-instance state record.
pub(crate) struct ModeState<T> {
    pub(crate) mode: Mode,
    /// Buffer of the current pause interval, if paused.
    pub(crate) buffer: Option<Arc<ReplayBuffer<T>>>,
}

impl<T> Default for ModeState<T> {
    fn default() -> Self {
        Self {
            mode: Mode::Playing,
            buffer: None,
        }
    }
}

/// What the observer should be attached to after a transition.
pub(crate) enum Feed<T> {
    /// Emit nothing; `capture` records the hub while this feed is active.
    Empty { capture: Arc<ReplayBuffer<T>> },
    /// Replay `replay` (if any) in capture order, then continue live.
    ReplayThenLive { replay: Option<Arc<ReplayBuffer<T>>> },
}

/// Map a normalized mode to the next state record and its feed.
///
/// Pausing always starts a fresh buffer; a buffer left over from an earlier
/// pause is superseded and dropped with the old record.
pub(crate) fn transition<T>(
    state: ModeState<T>,
    mode: Mode,
    capacity_hint: usize,
) -> (ModeState<T>, Feed<T>) {
    match mode {
        Mode::Paused => {
            let buffer = Arc::new(ReplayBuffer::with_capacity(capacity_hint));
            let next = ModeState {
                mode,
                buffer: Some(buffer.clone()),
            };
            (next, Feed::Empty { capture: buffer })
        }
        Mode::Playing => {
            let next = ModeState { mode, buffer: None };
            (next, Feed::ReplayThenLive { replay: state.buffer })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stream::Observer;

    #[test]
    fn test_pause_creates_buffer() {
        let (state, feed) = transition::<i32>(ModeState::default(), Mode::Paused, 8);

        assert_eq!(state.mode, Mode::Paused);
        let held = state.buffer.expect("paused state holds a buffer");
        match feed {
            Feed::Empty { capture } => assert!(Arc::ptr_eq(&held, &capture)),
            Feed::ReplayThenLive { .. } => panic!("pause must select the empty feed"),
        }
    }

    #[test]
    fn test_resume_hands_over_buffer() {
        let (paused, _) = transition::<i32>(ModeState::default(), Mode::Paused, 0);
        let captured = paused.buffer.clone().unwrap();
        captured.on_next(2);

        let (playing, feed) = transition(paused, Mode::Playing, 0);

        assert_eq!(playing.mode, Mode::Playing);
        assert!(playing.buffer.is_none());
        match feed {
            Feed::ReplayThenLive { replay: Some(buffer) } => assert_eq!(buffer.drain(), vec![2]),
            _ => panic!("resume must replay the paused buffer"),
        }
    }

    #[test]
    fn test_initial_play_has_nothing_to_replay() {
        let (_, feed) = transition::<i32>(ModeState::default(), Mode::Playing, 0);
        assert!(matches!(feed, Feed::ReplayThenLive { replay: None }));
    }

    #[test]
    fn test_repeated_pause_supersedes_buffer() {
        let (first, _) = transition::<i32>(ModeState::default(), Mode::Paused, 0);
        let old = first.buffer.clone().unwrap();
        let (second, _) = transition(first, Mode::Paused, 0);

        assert!(!Arc::ptr_eq(&old, second.buffer.as_ref().unwrap()));
    }
}
