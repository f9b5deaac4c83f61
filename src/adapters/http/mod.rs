//! HTTP adapters - REST endpoints and middleware.

pub mod chat;
pub mod middleware;

pub use chat::{chat_router, chat_routes, ChatAppState};
