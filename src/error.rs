//! Error types for streams and the pausable relay.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error carried by a stream's terminal error signal.
///
/// Errors are fanned out to every subscriber of a stream, so they are cheap to
/// clone and comparable in tests. They serialize structurally, so a
/// reified [`Notification::Error`](crate::Notification) round-trips exactly.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum StreamError {
    #[error("upstream error: {0}")]
    Upstream(String),

    /// The control stream failed; fatal to the relay.
    #[error("control stream failed: {0}")]
    Control(Box<StreamError>),

    #[error("stream already terminated")]
    Closed,
}

impl StreamError {
    /// Create an upstream error from any message.
    pub fn upstream(message: impl Into<String>) -> Self {
        StreamError::Upstream(message.into())
    }

    /// Wrap an error that arrived on the control stream.
    pub fn control(inner: StreamError) -> Self {
        StreamError::Control(Box::new(inner))
    }
}

/// Result type for stream operations.
pub type Result<T> = std::result::Result<T, StreamError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_control_error_display_includes_cause() {
        let err = StreamError::control(StreamError::upstream("keyboard unplugged"));
        assert_eq!(
            err.to_string(),
            "control stream failed: upstream error: keyboard unplugged"
        );
    }
}
