//! HTTP handlers for chat endpoints.
//!
//! These connect axum routes to the application layer and the chat
//! directory. Posting goes through `PostMessageHandler`, so broadcast
//! only ever happens after successful ingestion.

use std::sync::Arc;

use axum::extract::{Json, Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;
use uuid::Uuid;

use crate::application::PostMessageHandler;
use crate::domain::chat::{ChannelName, SenderDescriptor};
use crate::domain::foundation::ChannelId;
use crate::ports::{ChatDirectory, DirectoryError, IngestionError};

use super::dto::{
    ChannelView, CreateChannelRequest, ErrorResponse, GuestIdentity, MessageView,
    SendMessageRequest,
};
use crate::adapters::http::middleware::{OptionalAuth, RequireAuth};

/// Hard ceiling on history page size, whatever the client asks for.
const MAX_HISTORY_LIMIT: u32 = 500;

/// Shared application state for chat handlers.
#[derive(Clone)]
pub struct ChatAppState {
    pub directory: Arc<dyn ChatDirectory>,
    pub post_message: Arc<PostMessageHandler>,
    /// Default history page size when the client does not ask.
    pub history_limit: u32,
}

impl ChatAppState {
    /// Creates the handler state.
    pub fn new(
        directory: Arc<dyn ChatDirectory>,
        post_message: Arc<PostMessageHandler>,
        history_limit: u32,
    ) -> Self {
        Self {
            directory,
            post_message,
            history_limit,
        }
    }
}

/// Query parameters for history reads.
#[derive(Debug, Deserialize)]
pub struct HistoryParams {
    pub limit: Option<u32>,
}

/// POST /api/channels/:channel_id/messages - post a message.
///
/// Guests may post; the sender name comes from the bearer token when
/// present, otherwise from the request's guest id, and "Anonymous" when
/// the anonymous flag is set.
///
/// # Errors
/// - 404 Not Found: unknown channel
/// - 422 Unprocessable Entity: empty or oversized content
pub async fn send_message(
    State(state): State<ChatAppState>,
    OptionalAuth(user): OptionalAuth,
    Path(channel_id): Path<i64>,
    Json(request): Json<SendMessageRequest>,
) -> Result<Json<MessageView>, ChatApiError> {
    let sender = SenderDescriptor::resolve(
        user.as_ref().map(|u| u.username.as_str()),
        request.guest_id.as_deref(),
        request.anonymous,
    );

    let event = state
        .post_message
        .handle(ChannelId::new(channel_id), &sender, &request.content)
        .await?;

    Ok(Json(MessageView::from(event)))
}

/// GET /api/channels/:channel_id/messages - recent history, oldest first.
pub async fn get_messages(
    State(state): State<ChatAppState>,
    Path(channel_id): Path<i64>,
    Query(params): Query<HistoryParams>,
) -> Result<Json<Vec<MessageView>>, ChatApiError> {
    let limit = params
        .limit
        .unwrap_or(state.history_limit)
        .min(MAX_HISTORY_LIMIT);

    let messages = state
        .directory
        .recent_messages(ChannelId::new(channel_id), limit)
        .await?;

    Ok(Json(messages.into_iter().map(MessageView::from).collect()))
}

/// GET /api/channels - list all channels.
pub async fn list_channels(
    State(state): State<ChatAppState>,
) -> Result<Json<Vec<ChannelView>>, ChatApiError> {
    let channels = state.directory.list_channels().await?;
    Ok(Json(channels.into_iter().map(ChannelView::from).collect()))
}

/// POST /api/channels - create a channel.
///
/// Requires authentication; guests can read and post but not create.
pub async fn create_channel(
    State(state): State<ChatAppState>,
    RequireAuth(user): RequireAuth,
    Json(request): Json<CreateChannelRequest>,
) -> Result<Response, ChatApiError> {
    let name = ChannelName::new(request.name)
        .map_err(|e| ChatApiError::Validation(e.to_string()))?;

    let channel = state.directory.create_channel(name).await?;
    tracing::info!(channel_id = %channel.id, creator = %user.username, "channel created");

    Ok((StatusCode::CREATED, Json(ChannelView::from(channel))).into_response())
}

/// GET /api/guest - issue a throwaway guest identity.
pub async fn guest_identity() -> Json<GuestIdentity> {
    let hex = Uuid::new_v4().simple().to_string();
    Json(GuestIdentity {
        guest_id: format!("guest_{}", &hex[..8]),
    })
}

/// Error type unifying everything the chat endpoints can reject with.
#[derive(Debug)]
pub enum ChatApiError {
    NotFound(String),
    Validation(String),
    Internal(String),
}

impl From<IngestionError> for ChatApiError {
    fn from(err: IngestionError) -> Self {
        match err {
            IngestionError::ChannelNotFound(_) => ChatApiError::NotFound(err.to_string()),
            IngestionError::ValidationFailed(_) => ChatApiError::Validation(err.to_string()),
            IngestionError::Storage(_) => ChatApiError::Internal(err.to_string()),
        }
    }
}

impl From<DirectoryError> for ChatApiError {
    fn from(err: DirectoryError) -> Self {
        match err {
            DirectoryError::ChannelNotFound(_) => ChatApiError::NotFound(err.to_string()),
            DirectoryError::Storage(_) => ChatApiError::Internal(err.to_string()),
        }
    }
}

impl IntoResponse for ChatApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            ChatApiError::NotFound(m) => (StatusCode::NOT_FOUND, "CHANNEL_NOT_FOUND", m),
            ChatApiError::Validation(m) => {
                (StatusCode::UNPROCESSABLE_ENTITY, "VALIDATION_FAILED", m)
            }
            ChatApiError::Internal(m) => {
                tracing::error!(error = %m, "chat endpoint failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "Internal server error".to_string(),
                )
            }
        };

        (
            status,
            Json(ErrorResponse {
                code: code.to_string(),
                message,
            }),
        )
            .into_response()
    }
}
