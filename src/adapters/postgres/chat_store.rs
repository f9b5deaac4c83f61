//! PostgreSQL implementation of the chat storage ports.
//!
//! One adapter covers both `MessageIngestion` (the write path feeding
//! the broadcaster) and `ChatDirectory` (channel management and the
//! history read path); they share the channels/messages schema.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::domain::chat::{Channel, ChannelName, ChatEvent, MessageContent, SenderDescriptor};
use crate::domain::foundation::{ChannelId, Timestamp};
use crate::ports::{ChatDirectory, DirectoryError, IngestionError, MessageIngestion};

/// PostgreSQL chat store.
///
/// Uses sqlx with connection pooling; schema lives in `migrations/`.
pub struct PgChatStore {
    pool: PgPool,
}

impl PgChatStore {
    /// Creates a store over an existing connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn channel_exists(&self, channel_id: ChannelId) -> Result<bool, sqlx::Error> {
        let row: Option<(i64,)> = sqlx::query_as("SELECT id FROM channels WHERE id = $1")
            .bind(channel_id.as_i64())
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.is_some())
    }
}

/// Database row representation of a channel.
#[derive(Debug, sqlx::FromRow)]
struct ChannelRow {
    id: i64,
    name: String,
    created_at: DateTime<Utc>,
}

impl ChannelRow {
    fn into_channel(self) -> Result<Channel, DirectoryError> {
        // Stored names were validated on the way in; a failure here means
        // the table was edited out-of-band.
        let name = ChannelName::new(self.name)
            .map_err(|e| DirectoryError::Storage(format!("Invalid stored channel name: {e}")))?;
        Ok(Channel::new(
            ChannelId::new(self.id),
            name,
            Timestamp::from_datetime(self.created_at),
        ))
    }
}

/// Database row representation of a message.
#[derive(Debug, sqlx::FromRow)]
struct MessageRow {
    sender: String,
    content: String,
    created_at: DateTime<Utc>,
}

impl From<MessageRow> for ChatEvent {
    fn from(row: MessageRow) -> Self {
        ChatEvent::new(
            row.sender,
            row.content,
            Timestamp::from_datetime(row.created_at),
        )
    }
}

#[async_trait]
impl ChatDirectory for PgChatStore {
    async fn create_channel(&self, name: ChannelName) -> Result<Channel, DirectoryError> {
        let row: ChannelRow = sqlx::query_as(
            r#"
            INSERT INTO channels (name)
            VALUES ($1)
            RETURNING id, name, created_at
            "#,
        )
        .bind(name.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| DirectoryError::Storage(format!("Failed to create channel: {e}")))?;

        row.into_channel()
    }

    async fn list_channels(&self) -> Result<Vec<Channel>, DirectoryError> {
        let rows: Vec<ChannelRow> =
            sqlx::query_as("SELECT id, name, created_at FROM channels ORDER BY id")
                .fetch_all(&self.pool)
                .await
                .map_err(|e| DirectoryError::Storage(format!("Failed to list channels: {e}")))?;

        rows.into_iter().map(ChannelRow::into_channel).collect()
    }

    async fn recent_messages(
        &self,
        channel_id: ChannelId,
        limit: u32,
    ) -> Result<Vec<ChatEvent>, DirectoryError> {
        let exists = self
            .channel_exists(channel_id)
            .await
            .map_err(|e| DirectoryError::Storage(format!("Failed to check channel: {e}")))?;
        if !exists {
            return Err(DirectoryError::ChannelNotFound(channel_id));
        }

        let rows: Vec<MessageRow> = sqlx::query_as(
            r#"
            SELECT sender, content, created_at
            FROM messages
            WHERE channel_id = $1
            ORDER BY created_at DESC, id DESC
            LIMIT $2
            "#,
        )
        .bind(channel_id.as_i64())
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DirectoryError::Storage(format!("Failed to load messages: {e}")))?;

        // Query returns newest first; history is served oldest first.
        Ok(rows.into_iter().rev().map(ChatEvent::from).collect())
    }

    async fn ensure_channel(&self, name: &ChannelName) -> Result<Channel, DirectoryError> {
        let existing: Option<ChannelRow> =
            sqlx::query_as("SELECT id, name, created_at FROM channels WHERE name = $1")
                .bind(name.as_str())
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| DirectoryError::Storage(format!("Failed to look up channel: {e}")))?;

        match existing {
            Some(row) => row.into_channel(),
            None => self.create_channel(name.clone()).await,
        }
    }
}

#[async_trait]
impl MessageIngestion for PgChatStore {
    async fn submit(
        &self,
        channel_id: ChannelId,
        sender: &SenderDescriptor,
        content: &str,
    ) -> Result<ChatEvent, IngestionError> {
        let content = MessageContent::new(content)?;

        let exists = self
            .channel_exists(channel_id)
            .await
            .map_err(|e| IngestionError::Storage(format!("Failed to check channel: {e}")))?;
        if !exists {
            return Err(IngestionError::ChannelNotFound(channel_id));
        }

        let row: MessageRow = sqlx::query_as(
            r#"
            INSERT INTO messages (channel_id, sender, content)
            VALUES ($1, $2, $3)
            RETURNING sender, content, created_at
            "#,
        )
        .bind(channel_id.as_i64())
        .bind(sender.display_name())
        .bind(content.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| IngestionError::Storage(format!("Failed to store message: {e}")))?;

        Ok(ChatEvent::from(row))
    }
}
