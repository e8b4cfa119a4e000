//! User-facing notification side channel
//!
//! The store emits exactly one notification per completed job; sinks decide
//! how to surface it to the user.

use tracing::{error, info};

/// Message emitted when a tracked execution succeeds.
pub const EXECUTION_SUCCEEDED: &str = "Test suite execution has been executed successfully";

/// Message emitted when a tracked execution fails.
pub const EXECUTION_FAILED: &str = "An error has happened during the test suite execution";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Severity {
    Success,
    Error,
}

/// A user-facing notification.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notification {
    pub content: String,
    pub severity: Severity,
}

impl Notification {
    pub fn success(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            severity: Severity::Success,
        }
    }

    pub fn error(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            severity: Severity::Error,
        }
    }
}

/// Sink for user-facing notifications.
pub trait NotificationSink: Send + Sync {
    fn push(&self, notification: Notification);
}

/// Sink that routes notifications into the log.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogSink;

impl NotificationSink for LogSink {
    fn push(&self, notification: Notification) {
        match notification.severity {
            Severity::Success => info!("{}", notification.content),
            Severity::Error => error!("{}", notification.content),
        }
    }
}
