//! WebSocket upgrade handler and connection loop.
//!
//! Connection lifecycle:
//! 1. Resolve identity from the optional `token`/`guest` query params
//! 2. Upgrade to WebSocket and register on the channel
//! 3. Send the `connected` frame
//! 4. Loop: drain the subscriber queue onto the wire, forward inbound
//!    posts through message ingestion
//! 5. Deregister on every exit path

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use futures::stream::SplitSink;
use futures::{SinkExt, StreamExt};
use serde::Deserialize;

use crate::application::PostMessageHandler;
use crate::domain::chat::SenderDescriptor;
use crate::domain::foundation::{ChannelId, Timestamp};
use crate::ports::{IngestionError, TokenValidator};
use crate::realtime::{ChannelRegistry, QueueItem};

use super::messages::{
    ClientFrame, ConnectedFrame, ErrorFrame, MessageFrame, PongFrame, ServerFrame,
};

/// State required for WebSocket handling.
#[derive(Clone)]
pub struct WebSocketState {
    pub registry: Arc<ChannelRegistry>,
    pub post_message: Arc<PostMessageHandler>,
    pub token_validator: Arc<dyn TokenValidator>,
}

impl WebSocketState {
    /// Creates the WebSocket state.
    pub fn new(
        registry: Arc<ChannelRegistry>,
        post_message: Arc<PostMessageHandler>,
        token_validator: Arc<dyn TokenValidator>,
    ) -> Self {
        Self {
            registry,
            post_message,
            token_validator,
        }
    }
}

/// Query parameters accepted on upgrade.
///
/// Browsers cannot set headers on WebSocket handshakes, so the bearer
/// token travels as a query param; `guest` carries an identity from
/// `GET /api/guest`.
#[derive(Debug, Deserialize)]
pub struct WsParams {
    pub token: Option<String>,
    pub guest: Option<String>,
}

/// GET /api/channels/:channel_id/ws - upgrade to a chat connection.
///
/// A missing token means guest traffic; a present-but-invalid token is
/// rejected before the upgrade.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    Path(channel_id): Path<i64>,
    Query(params): Query<WsParams>,
    State(state): State<WebSocketState>,
) -> Response {
    let username = match &params.token {
        Some(token) => match state.token_validator.validate(token).await {
            Ok(user) => Some(user.username),
            Err(e) => {
                tracing::debug!(error = %e, "rejected websocket token");
                return (
                    StatusCode::UNAUTHORIZED,
                    Json(serde_json::json!({
                        "error": e.to_string(),
                        "code": "AUTH_ERROR"
                    })),
                )
                    .into_response();
            }
        },
        None => None,
    };

    let channel_id = ChannelId::new(channel_id);
    ws.on_upgrade(move |socket| handle_socket(socket, channel_id, username, params.guest, state))
}

/// Runs for the lifetime of one established connection.
async fn handle_socket(
    socket: WebSocket,
    channel_id: ChannelId,
    username: Option<String>,
    guest_id: Option<String>,
    state: WebSocketState,
) {
    let (mut sink, mut inbound) = socket.split();

    let mut handle = state.registry.register(channel_id).await;
    let subscriber_id = handle.id();

    let connected = ServerFrame::Connected(ConnectedFrame {
        channel_id: channel_id.as_i64(),
        subscriber_id: subscriber_id.to_string(),
        timestamp: Timestamp::now().to_rfc3339(),
    });
    if send_frame(&mut sink, &connected).await.is_err() {
        // Client disconnected during the handshake.
        state.registry.deregister(channel_id, subscriber_id).await;
        return;
    }

    loop {
        tokio::select! {
            // Drain loop: deliver fanned-out events to this client.
            item = handle.next() => match item {
                QueueItem::Event(event) => {
                    let frame = ServerFrame::Message(MessageFrame::from(&event));
                    if let Err(e) = send_frame(&mut sink, &frame).await {
                        tracing::debug!(
                            %channel_id,
                            %subscriber_id,
                            error = %e,
                            "write failed, treating as disconnect"
                        );
                        break;
                    }
                }
                QueueItem::Shutdown => {
                    let _ = sink.send(Message::Close(None)).await;
                    break;
                }
            },

            // Inbound: client posts and heartbeats.
            frame = inbound.next() => match frame {
                Some(Ok(Message::Text(text))) => {
                    let result = handle_text_frame(
                        &state,
                        channel_id,
                        username.as_deref(),
                        guest_id.as_deref(),
                        &text,
                        &mut sink,
                    )
                    .await;
                    if result.is_err() {
                        break;
                    }
                }
                Some(Ok(Message::Binary(_))) => {
                    let error = ServerFrame::Error(ErrorFrame {
                        code: "MALFORMED_FRAME".to_string(),
                        message: "Binary frames are not supported".to_string(),
                    });
                    if send_frame(&mut sink, &error).await.is_err() {
                        break;
                    }
                }
                Some(Ok(Message::Ping(_))) | Some(Ok(Message::Pong(_))) => {
                    // Protocol-level heartbeats are answered by the transport.
                }
                Some(Ok(Message::Close(_))) | None => {
                    tracing::debug!(%channel_id, %subscriber_id, "client closed connection");
                    break;
                }
                Some(Err(e)) => {
                    tracing::debug!(%channel_id, %subscriber_id, error = %e, "receive error");
                    break;
                }
            }
        }
    }

    // Guaranteed cleanup, whichever side ended the loop.
    state.registry.deregister(channel_id, subscriber_id).await;
}

/// Handles one inbound text frame.
///
/// Malformed input and ingestion rejections are reported back to this
/// client only; the connection stays open. Only write failures bubble
/// up, ending the connection.
async fn handle_text_frame(
    state: &WebSocketState,
    channel_id: ChannelId,
    username: Option<&str>,
    guest_id: Option<&str>,
    text: &str,
    sink: &mut SplitSink<WebSocket, Message>,
) -> Result<(), axum::Error> {
    let frame = match serde_json::from_str::<ClientFrame>(text) {
        Ok(frame) => frame,
        Err(e) => {
            let error = ServerFrame::Error(ErrorFrame {
                code: "MALFORMED_FRAME".to_string(),
                message: format!("Unparsable frame: {e}"),
            });
            return send_frame(sink, &error).await;
        }
    };

    match frame {
        ClientFrame::Post(post) => {
            let sender = SenderDescriptor::resolve(username, guest_id, post.anonymous);
            // The posting client gets the message back through its own
            // subscription, like everyone else in the channel.
            if let Err(e) = state
                .post_message
                .handle(channel_id, &sender, &post.content)
                .await
            {
                let error = ServerFrame::Error(ErrorFrame {
                    code: ingestion_error_code(&e).to_string(),
                    message: e.to_string(),
                });
                return send_frame(sink, &error).await;
            }
            Ok(())
        }
        ClientFrame::Ping => {
            let pong = ServerFrame::Pong(PongFrame {
                timestamp: Timestamp::now().to_rfc3339(),
            });
            send_frame(sink, &pong).await
        }
    }
}

fn ingestion_error_code(err: &IngestionError) -> &'static str {
    match err {
        IngestionError::ChannelNotFound(_) => "CHANNEL_NOT_FOUND",
        IngestionError::ValidationFailed(_) => "VALIDATION_FAILED",
        IngestionError::Storage(_) => "STORAGE_ERROR",
    }
}

/// Serializes and writes one frame.
async fn send_frame(
    sink: &mut SplitSink<WebSocket, Message>,
    frame: &ServerFrame,
) -> Result<(), axum::Error> {
    let json = serde_json::to_string(frame).map_err(axum::Error::new)?;
    sink.send(Message::Text(json)).await
}

/// Creates routes for the WebSocket endpoint.
pub fn websocket_routes() -> Router<WebSocketState> {
    Router::new().route("/channels/:channel_id/ws", get(ws_handler))
}

/// Combined router with the WebSocket route under /api.
pub fn websocket_router() -> Router<WebSocketState> {
    Router::new().nest("/api", websocket_routes())
}
