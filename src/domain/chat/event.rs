//! The canonical event produced by message ingestion.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::Timestamp;

/// Immutable chat event delivered to every subscriber of a channel.
///
/// Produced exactly once per successfully persisted message and never
/// mutated afterwards, so it is safe to clone into any number of
/// subscriber queues.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatEvent {
    /// Display name of whoever posted the message.
    pub sender: String,

    /// The message text as stored.
    pub content: String,

    /// Moment the backing store recorded the message (UTC).
    pub timestamp: Timestamp,
}

impl ChatEvent {
    /// Creates a new chat event.
    pub fn new(sender: impl Into<String>, content: impl Into<String>, timestamp: Timestamp) -> Self {
        Self {
            sender: sender.into(),
            content: content.into(),
            timestamp,
        }
    }
}
