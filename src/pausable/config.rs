//! Relay configuration.

/// Configuration for a [`Pausable`](super::Pausable) relay.
#[derive(Clone, Debug)]
pub struct PausableConfig {
    /// Name attached to every log event of this relay.
    pub label: String,

    /// Initial allocation of each replay buffer. Not a limit: buffers grow
    /// without bound while paused.
    /// Default: 0
    pub buffer_capacity_hint: usize,
}

impl Default for PausableConfig {
    fn default() -> Self {
        Self {
            label: "pausable".to_string(),
            buffer_capacity_hint: 0,
        }
    }
}

impl PausableConfig {
    pub fn with_label(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            ..Default::default()
        }
    }
}
