//! Core types shared by the stream primitives and the relay.

use crate::error::StreamError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for an attachment to a topic or hub.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SubscriptionId(pub u64);

impl fmt::Debug for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SubscriptionId({})", self.0)
    }
}

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Relay mode, derived from the control stream.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    #[default]
    Playing,
    Paused,
}

impl Mode {
    /// Map a control value (`true` = pause) to a mode.
    pub fn from_paused(paused: bool) -> Self {
        if paused {
            Mode::Paused
        } else {
            Mode::Playing
        }
    }

    pub fn is_paused(self) -> bool {
        self == Mode::Paused
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Playing => f.write_str("playing"),
            Mode::Paused => f.write_str("paused"),
        }
    }
}

/// One stream signal in reified form.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Notification<T> {
    Next(T),
    Error(StreamError),
    Completed,
}

impl<T> Notification<T> {
    /// Whether this signal ends the stream.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Notification::Next(_))
    }

    pub fn into_value(self) -> Option<T> {
        match self {
            Notification::Next(value) => Some(value),
            _ => None,
        }
    }
}

/// Counters describing what one relay instance has done so far.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelayStats {
    /// Values handed to the observer (live and replayed).
    pub delivered: u64,
    /// Values captured by replay buffers while paused.
    pub buffered: u64,
    /// Values delivered out of a replay buffer on resume.
    pub replayed: u64,
    /// Replay buffers created (one per pause interval).
    pub buffers_created: u64,
    /// Mode changes applied, excluding the initial playing seed.
    pub transitions: u64,
    /// Buffered values dropped because the relay terminated first.
    pub discarded: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_from_control_value() {
        assert_eq!(Mode::from_paused(true), Mode::Paused);
        assert_eq!(Mode::from_paused(false), Mode::Playing);
        assert_eq!(Mode::default(), Mode::Playing);
    }

    #[test]
    fn test_terminal_notifications() {
        assert!(!Notification::Next(1).is_terminal());
        assert!(Notification::<i32>::Completed.is_terminal());
        assert!(Notification::<i32>::Error(StreamError::Closed).is_terminal());
        assert_eq!(Notification::Next(4).into_value(), Some(4));
    }

    #[test]
    fn test_subscription_ids_order_by_value() {
        let mut ids = vec![SubscriptionId(3), SubscriptionId(1), SubscriptionId(2)];
        ids.sort();
        assert_eq!(ids, vec![SubscriptionId(1), SubscriptionId(2), SubscriptionId(3)]);
    }

    #[test]
    fn test_error_notifications_survive_json() {
        let errors = [
            StreamError::upstream("sensor lost"),
            StreamError::control(StreamError::upstream("stdin closed")),
            StreamError::control(StreamError::Closed),
            StreamError::Closed,
        ];
        for error in errors {
            let notification = Notification::<i32>::Error(error);
            let json = serde_json::to_string(&notification).unwrap();
            let back: Notification<i32> = serde_json::from_str(&json).unwrap();
            assert_eq!(back, notification);
        }
    }

    #[test]
    fn test_value_notifications_survive_json() {
        for notification in [Notification::Next(7), Notification::Completed] {
            let json = serde_json::to_string(&notification).unwrap();
            let back: Notification<i32> = serde_json::from_str(&json).unwrap();
            assert_eq!(back, notification);
        }
    }
}
