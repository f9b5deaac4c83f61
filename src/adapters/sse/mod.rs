//! Server-push adapter: one-way event streaming over SSE.

mod handler;

pub use handler::{event_stream, sse_router, sse_routes, SseState, SubscriberEventStream};
