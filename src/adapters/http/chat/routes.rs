//! Axum routes for chat endpoints.

use axum::routing::get;
use axum::Router;

use super::handlers::{
    create_channel, get_messages, guest_identity, list_channels, send_message, ChatAppState,
};

/// Creates routes for chat endpoints.
///
/// - `GET  /channels` - list channels
/// - `POST /channels` - create a channel (authenticated)
/// - `GET  /channels/:channel_id/messages` - recent history
/// - `POST /channels/:channel_id/messages` - post a message
/// - `GET  /guest` - issue a guest identity
pub fn chat_routes() -> Router<ChatAppState> {
    Router::new()
        .route("/channels", get(list_channels).post(create_channel))
        .route(
            "/channels/:channel_id/messages",
            get(get_messages).post(send_message),
        )
        .route("/guest", get(guest_identity))
}

/// Combined router with all chat routes under /api.
pub fn chat_router() -> Router<ChatAppState> {
    Router::new().nest("/api", chat_routes())
}
