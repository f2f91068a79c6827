//! Notification sink implementations.

use std::sync::{Mutex, PoisonError};

use crate::ports::NotificationSink;

/// Sink that emits notifications as WARN-level tracing events.
///
/// The headless analogue of a toast surface; a UI embedding this crate would
/// provide its own sink instead.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl NotificationSink for TracingSink {
    fn error(&self, message: &str) {
        tracing::warn!(%message, "user notification");
    }
}

/// Sink that records messages in memory.
///
/// Intended for tests asserting on which notifications an operation emitted.
#[derive(Debug, Default)]
pub struct RecordingSink {
    messages: Mutex<Vec<String>>,
}

impl RecordingSink {
    /// Create an empty recording sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the messages recorded so far, oldest first.
    #[must_use]
    pub fn messages(&self) -> Vec<String> {
        self.messages
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl NotificationSink for RecordingSink {
    fn error(&self, message: &str) {
        self.messages
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(message.to_string());
    }
}
