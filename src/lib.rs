//! Pulse Chat - channel-based chat with real-time fan-out.
//!
//! Clients post short text messages into named channels and receive
//! near-real-time updates of messages posted by others, over either a
//! server-push SSE stream or a bidirectional WebSocket. The fan-out core
//! (`realtime`) tracks which connections listen to which channel and
//! delivers each ingested event to all of them.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
pub mod realtime;
