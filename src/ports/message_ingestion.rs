//! MessageIngestion port - the write path for posted messages.
//!
//! The fan-out core never persists anything itself. A posted message goes
//! through this port first; only the canonical event returned on success is
//! handed to the broadcaster. A message that failed to persist must never
//! be fanned out.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::chat::{ChatEvent, SenderDescriptor};
use crate::domain::foundation::{ChannelId, ValidationError};

/// Errors surfaced by message ingestion.
///
/// These are reported to the original publisher (an HTTP error or a
/// WebSocket error frame), never to other subscribers.
#[derive(Debug, Error)]
pub enum IngestionError {
    /// The target channel does not exist in the directory.
    #[error("Channel {0} not found")]
    ChannelNotFound(ChannelId),

    /// The message content failed validation.
    #[error("Message rejected: {0}")]
    ValidationFailed(#[from] ValidationError),

    /// The backing store failed; the message was not persisted.
    #[error("Storage error: {0}")]
    Storage(String),
}

/// Validates and persists a posted message.
///
/// # Contract
///
/// Implementations must:
/// - Validate content via [`crate::domain::chat::MessageContent`]
/// - Reject unknown channels with `IngestionError::ChannelNotFound`
/// - On success, return the canonical stored event (sender display name,
///   stored content, store-assigned timestamp) exactly once
#[async_trait]
pub trait MessageIngestion: Send + Sync {
    /// Persists a message and returns the canonical event to broadcast.
    async fn submit(
        &self,
        channel_id: ChannelId,
        sender: &SenderDescriptor,
        content: &str,
    ) -> Result<ChatEvent, IngestionError>;
}
