//! WebSocket frame types.
//!
//! Defines the protocol between server and connected clients:
//! - Client → Server: post a message, heartbeat
//! - Server → Client: connection status, chat messages, errors, heartbeat

use serde::{Deserialize, Serialize};

use crate::domain::chat::ChatEvent;

// ============================================
// Client → Server Frames
// ============================================

/// All frame types that can be received from a client.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientFrame {
    /// Post a message to the connection's channel.
    Post(PostFrame),

    /// Heartbeat request.
    Ping,
}

/// Payload of a post frame.
#[derive(Debug, Clone, Deserialize)]
pub struct PostFrame {
    /// Message text.
    pub content: String,

    /// Post without attribution.
    #[serde(default)]
    pub anonymous: bool,
}

// ============================================
// Server → Client Frames
// ============================================

/// All frame types that can be sent to a client.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerFrame {
    /// Connection established and registered on a channel.
    Connected(ConnectedFrame),

    /// A chat event fanned out to this channel.
    Message(MessageFrame),

    /// Something about the client's last frame was rejected.
    Error(ErrorFrame),

    /// Heartbeat response.
    Pong(PongFrame),
}

/// Sent once, immediately after registration.
#[derive(Debug, Clone, Serialize)]
pub struct ConnectedFrame {
    pub channel_id: i64,
    pub subscriber_id: String,
    pub timestamp: String,
}

/// One chat event on the wire.
#[derive(Debug, Clone, Serialize)]
pub struct MessageFrame {
    pub sender: String,
    pub content: String,
    /// RFC 3339 UTC.
    pub timestamp: String,
}

impl From<&ChatEvent> for MessageFrame {
    fn from(event: &ChatEvent) -> Self {
        Self {
            sender: event.sender.clone(),
            content: event.content.clone(),
            timestamp: event.timestamp.to_rfc3339(),
        }
    }
}

/// Error reported back to the offending client only.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorFrame {
    pub code: String,
    pub message: String,
}

/// Heartbeat response.
#[derive(Debug, Clone, Serialize)]
pub struct PongFrame {
    pub timestamp: String,
}
