//! Post-message use case: ingest first, fan out second.
//!
//! Both posting surfaces (the HTTP endpoint and inbound WebSocket
//! frames) go through this handler, so the two transports cannot drift
//! apart: a message is broadcast if and only if ingestion persisted it.

use std::sync::Arc;

use crate::domain::chat::{ChatEvent, SenderDescriptor};
use crate::domain::foundation::ChannelId;
use crate::ports::{IngestionError, MessageIngestion};
use crate::realtime::Broadcaster;

/// Orchestrates submit-then-publish for posted messages.
#[derive(Clone)]
pub struct PostMessageHandler {
    ingestion: Arc<dyn MessageIngestion>,
    broadcaster: Broadcaster,
}

impl PostMessageHandler {
    /// Creates the handler.
    pub fn new(ingestion: Arc<dyn MessageIngestion>, broadcaster: Broadcaster) -> Self {
        Self {
            ingestion,
            broadcaster,
        }
    }

    /// Persists a message and, on success, broadcasts the canonical
    /// stored event to the channel's current subscribers.
    ///
    /// Ingestion errors go back to the original publisher; a message
    /// that failed to persist is never fanned out.
    pub async fn handle(
        &self,
        channel_id: ChannelId,
        sender: &SenderDescriptor,
        content: &str,
    ) -> Result<ChatEvent, IngestionError> {
        let event = self.ingestion.submit(channel_id, sender, content).await?;
        self.broadcaster.publish(channel_id, event.clone()).await;
        Ok(event)
    }
}
