//! Adapters - Implementations of port interfaces and transport bindings.
//!
//! - `auth` - token validation (JWT, mock)
//! - `http` - REST endpoints and middleware
//! - `memory` - in-memory chat store for tests and local development
//! - `postgres` - sqlx-backed chat store
//! - `sse` - server-push event stream adapter
//! - `websocket` - bidirectional socket adapter

pub mod auth;
pub mod http;
pub mod memory;
pub mod postgres;
pub mod sse;
pub mod websocket;
