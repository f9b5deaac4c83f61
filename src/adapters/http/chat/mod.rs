//! REST endpoints for channels, message posting, and history.

mod dto;
mod handlers;
mod routes;

pub use dto::{
    ChannelView, CreateChannelRequest, ErrorResponse, GuestIdentity, MessageView,
    SendMessageRequest,
};
pub use handlers::{ChatApiError, ChatAppState};
pub use routes::{chat_router, chat_routes};
