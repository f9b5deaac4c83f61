//! PostgreSQL adapters.
//!
//! sqlx-backed implementations of the chat storage ports.

mod chat_store;

pub use chat_store::PgChatStore;
