//! SSE endpoint for live channel events.
//!
//! On connect the client is registered with the channel registry, gets a
//! synthetic `connected` frame naming the channel, then receives one
//! `message` frame per chat event until the shutdown sentinel ends the
//! stream. A client that just disconnects drops the stream mid-wait; the
//! attached [`DisconnectGuard`] still runs the deregister step, so no
//! registry entry leaks on any exit path.

use std::convert::Infallible;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Duration;

use axum::extract::{Path, State};
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::routing::get;
use axum::Router;
use futures::stream::Stream;

use crate::domain::chat::ChatEvent;
use crate::domain::foundation::ChannelId;
use crate::realtime::{ChannelRegistry, DisconnectGuard, QueueItem, SubscriberHandle};

/// State required for the SSE endpoint.
#[derive(Clone)]
pub struct SseState {
    pub registry: Arc<ChannelRegistry>,
    /// Keep-alive ping interval to stop proxies from timing the stream out.
    pub keep_alive: Duration,
}

impl SseState {
    /// Creates the SSE state.
    pub fn new(registry: Arc<ChannelRegistry>, keep_alive: Duration) -> Self {
        Self {
            registry,
            keep_alive,
        }
    }
}

/// GET /api/channels/:channel_id/events - live event stream.
pub async fn event_stream(
    State(state): State<SseState>,
    Path(channel_id): Path<i64>,
) -> Sse<SubscriberEventStream> {
    let channel_id = ChannelId::new(channel_id);
    let handle = state.registry.register(channel_id).await;
    let guard = DisconnectGuard::new(Arc::clone(&state.registry), &handle);

    tracing::debug!(%channel_id, subscriber_id = %handle.id(), "sse stream opened");

    Sse::new(SubscriberEventStream::new(handle, guard))
        .keep_alive(KeepAlive::new().interval(state.keep_alive).text("ping"))
}

/// Stream adapter draining one subscriber queue into SSE frames.
///
/// Emits the synthetic `connected` frame first, then maps queue items:
/// events become `message` frames, the shutdown sentinel ends the
/// stream. Dropping the stream (client gone) drops the guard, which
/// deregisters the subscriber.
pub struct SubscriberEventStream {
    handle: SubscriberHandle,
    _guard: DisconnectGuard,
    connected_sent: bool,
    finished: bool,
}

impl SubscriberEventStream {
    /// Wraps a registered subscriber handle and its cleanup guard.
    pub fn new(handle: SubscriberHandle, guard: DisconnectGuard) -> Self {
        Self {
            handle,
            _guard: guard,
            connected_sent: false,
            finished: false,
        }
    }
}

impl Stream for SubscriberEventStream {
    type Item = Result<Event, Infallible>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();

        if this.finished {
            return Poll::Ready(None);
        }
        if !this.connected_sent {
            this.connected_sent = true;
            return Poll::Ready(Some(Ok(connected_event(this.handle.channel_id()))));
        }

        match this.handle.poll_next_item(cx) {
            Poll::Ready(QueueItem::Event(event)) => {
                Poll::Ready(Some(Ok(message_event(&event))))
            }
            Poll::Ready(QueueItem::Shutdown) => {
                this.finished = true;
                Poll::Ready(None)
            }
            Poll::Pending => Poll::Pending,
        }
    }
}

/// First frame of every stream: `event: connected`.
fn connected_event(channel_id: ChannelId) -> Event {
    let payload = serde_json::json!({
        "status": "connected",
        "channel_id": channel_id,
    });
    Event::default().event("connected").data(payload.to_string())
}

/// One chat event as an `event: message` frame.
fn message_event(event: &ChatEvent) -> Event {
    match serde_json::to_string(event) {
        Ok(json) => Event::default().event("message").data(json),
        Err(e) => {
            // Unreachable for a plain struct of strings; keep the stream
            // alive regardless.
            tracing::warn!(error = %e, "failed to serialize chat event");
            Event::default().event("message").data("{}")
        }
    }
}

/// Creates routes for the SSE endpoint.
pub fn sse_routes() -> Router<SseState> {
    Router::new().route("/channels/:channel_id/events", get(event_stream))
}

/// Combined router with the SSE route under /api.
pub fn sse_router() -> Router<SseState> {
    Router::new().nest("/api", sse_routes())
}
