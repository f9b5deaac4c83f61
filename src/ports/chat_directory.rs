//! ChatDirectory port - channel management and the history read path.
//!
//! Live delivery is best-effort; clients that reconnect catch up through
//! `recent_messages`, which is a plain store read and entirely separate
//! from the fan-out path.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::chat::{Channel, ChannelName, ChatEvent};
use crate::domain::foundation::ChannelId;

/// Errors surfaced by directory operations.
#[derive(Debug, Error)]
pub enum DirectoryError {
    /// The channel does not exist.
    #[error("Channel {0} not found")]
    ChannelNotFound(ChannelId),

    /// The backing store failed.
    #[error("Storage error: {0}")]
    Storage(String),
}

/// Channel creation, listing, and message history.
#[async_trait]
pub trait ChatDirectory: Send + Sync {
    /// Creates a new channel and returns its record.
    async fn create_channel(&self, name: ChannelName) -> Result<Channel, DirectoryError>;

    /// Lists all channels, oldest first.
    async fn list_channels(&self) -> Result<Vec<Channel>, DirectoryError>;

    /// Returns up to `limit` most recent messages for a channel, oldest first.
    ///
    /// Unknown channels yield `DirectoryError::ChannelNotFound`.
    async fn recent_messages(
        &self,
        channel_id: ChannelId,
        limit: u32,
    ) -> Result<Vec<ChatEvent>, DirectoryError>;

    /// Returns the channel with the given name, creating it if absent.
    ///
    /// Called once at startup to seed the default channel; must be
    /// idempotent.
    async fn ensure_channel(&self, name: &ChannelName) -> Result<Channel, DirectoryError>;
}
