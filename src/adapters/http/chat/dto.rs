//! Request/response DTOs for the chat REST API.

use serde::{Deserialize, Serialize};

use crate::domain::chat::{Channel, ChatEvent};

/// Body of `POST /api/channels/:channel_id/messages`.
#[derive(Debug, Clone, Deserialize)]
pub struct SendMessageRequest {
    /// Message text.
    pub content: String,

    /// Post without attribution, regardless of identity.
    #[serde(default)]
    pub anonymous: bool,

    /// Guest identity from `GET /api/guest`, for unauthenticated posters.
    #[serde(default)]
    pub guest_id: Option<String>,
}

/// One message as served to clients.
#[derive(Debug, Clone, Serialize)]
pub struct MessageView {
    pub sender: String,
    pub content: String,
    /// RFC 3339 UTC.
    pub timestamp: String,
}

impl From<ChatEvent> for MessageView {
    fn from(event: ChatEvent) -> Self {
        Self {
            sender: event.sender,
            content: event.content,
            timestamp: event.timestamp.to_rfc3339(),
        }
    }
}

/// One channel as served to clients.
#[derive(Debug, Clone, Serialize)]
pub struct ChannelView {
    pub id: i64,
    pub name: String,
    pub created_at: String,
}

impl From<Channel> for ChannelView {
    fn from(channel: Channel) -> Self {
        Self {
            id: channel.id.as_i64(),
            name: channel.name.as_str().to_string(),
            created_at: channel.created_at.to_rfc3339(),
        }
    }
}

/// Body of `POST /api/channels`.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateChannelRequest {
    pub name: String,
}

/// Response of `GET /api/guest`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GuestIdentity {
    pub guest_id: String,
}

/// Error payload shared by every chat endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
}
