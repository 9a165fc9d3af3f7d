//! Control normalizer: seeds "playing" and drops repeated control values.

use crate::types::Mode;

pub(crate) struct ControlNormalizer {
    current: Option<Mode>,
}

impl ControlNormalizer {
    /// Implicit first control value: start playing.
    pub(crate) const SEED: bool = false;

    pub(crate) fn new() -> Self {
        Self { current: None }
    }

    /// Returns the new mode if `paused` changes it, `None` for a repeat.
    pub(crate) fn accept(&mut self, paused: bool) -> Option<Mode> {
        let mode = Mode::from_paused(paused);
        if self.current == Some(mode) {
            return None;
        }
        self.current = Some(mode);
        Some(mode)
    }

    pub(crate) fn current(&self) -> Option<Mode> {
        self.current
    }
}
