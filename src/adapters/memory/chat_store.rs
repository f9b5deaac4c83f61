//! In-memory implementation of the chat storage ports.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::chat::{Channel, ChannelName, ChatEvent, MessageContent, SenderDescriptor};
use crate::domain::foundation::{ChannelId, Timestamp};
use crate::ports::{ChatDirectory, DirectoryError, IngestionError, MessageIngestion};

#[derive(Default)]
struct StoreState {
    next_channel_id: i64,
    channels: Vec<Channel>,
    messages: HashMap<ChannelId, Vec<ChatEvent>>,
}

/// Chat store backed by process memory.
///
/// Channel ids are assigned sequentially starting at 1, matching the
/// bigserial behavior of the postgres adapter.
#[derive(Default)]
pub struct InMemoryChatStore {
    state: RwLock<StoreState>,
}

impl InMemoryChatStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Total messages stored for a channel (test inspection).
    pub async fn message_count(&self, channel_id: ChannelId) -> usize {
        let state = self.state.read().await;
        state
            .messages
            .get(&channel_id)
            .map(|messages| messages.len())
            .unwrap_or(0)
    }
}

#[async_trait]
impl ChatDirectory for InMemoryChatStore {
    async fn create_channel(&self, name: ChannelName) -> Result<Channel, DirectoryError> {
        let mut state = self.state.write().await;
        state.next_channel_id += 1;
        let channel = Channel::new(
            ChannelId::new(state.next_channel_id),
            name,
            Timestamp::now(),
        );
        state.channels.push(channel.clone());
        state.messages.insert(channel.id, Vec::new());
        Ok(channel)
    }

    async fn list_channels(&self) -> Result<Vec<Channel>, DirectoryError> {
        let state = self.state.read().await;
        Ok(state.channels.clone())
    }

    async fn recent_messages(
        &self,
        channel_id: ChannelId,
        limit: u32,
    ) -> Result<Vec<ChatEvent>, DirectoryError> {
        let state = self.state.read().await;
        let messages = state
            .messages
            .get(&channel_id)
            .ok_or(DirectoryError::ChannelNotFound(channel_id))?;

        let skip = messages.len().saturating_sub(limit as usize);
        Ok(messages[skip..].to_vec())
    }

    async fn ensure_channel(&self, name: &ChannelName) -> Result<Channel, DirectoryError> {
        {
            let state = self.state.read().await;
            if let Some(existing) = state.channels.iter().find(|c| c.name == *name) {
                return Ok(existing.clone());
            }
        }
        self.create_channel(name.clone()).await
    }
}

#[async_trait]
impl MessageIngestion for InMemoryChatStore {
    async fn submit(
        &self,
        channel_id: ChannelId,
        sender: &SenderDescriptor,
        content: &str,
    ) -> Result<ChatEvent, IngestionError> {
        let content = MessageContent::new(content)?;

        let mut state = self.state.write().await;
        let messages = state
            .messages
            .get_mut(&channel_id)
            .ok_or(IngestionError::ChannelNotFound(channel_id))?;

        let event = ChatEvent::new(
            sender.display_name(),
            content.into_inner(),
            Timestamp::now(),
        );
        messages.push(event.clone());
        Ok(event)
    }
}
