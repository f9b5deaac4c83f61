//! Bidirectional adapter: full chat over one WebSocket.
//!
//! Inbound frames post messages through the same ingestion path as the
//! REST endpoint; outbound frames drain the connection's subscriber
//! queue. The two directions run as one `select!` loop, so either side
//! ending tears the whole connection down through the deregister step.

mod handler;
mod messages;

pub use handler::{websocket_router, websocket_routes, ws_handler, WebSocketState, WsParams};
pub use messages::{
    ClientFrame, ConnectedFrame, ErrorFrame, MessageFrame, PongFrame, PostFrame, ServerFrame,
};
