//! Snapshot-then-deliver event publication.

use std::sync::Arc;

use crate::domain::chat::ChatEvent;
use crate::domain::foundation::ChannelId;

use super::registry::ChannelRegistry;
use super::subscriber::QueueItem;

/// Delivers one published event to every current subscriber of a channel.
///
/// Cheap to clone; every transport adapter and the HTTP post path share
/// the same underlying registry.
#[derive(Clone)]
pub struct Broadcaster {
    registry: Arc<ChannelRegistry>,
}

impl Broadcaster {
    /// Creates a broadcaster over a registry.
    pub fn new(registry: Arc<ChannelRegistry>) -> Self {
        Self { registry }
    }

    /// Fans `event` out to every subscriber registered on `channel_id`
    /// at the moment of the snapshot.
    ///
    /// Enqueue is non-blocking and unbounded: a slow client accumulates
    /// backlog instead of stalling the publisher or its channel peers.
    /// Publishing to a channel with no subscribers is a no-op; an unknown
    /// channel looks exactly the same from here.
    pub async fn publish(&self, channel_id: ChannelId, event: ChatEvent) {
        let snapshot = self.registry.snapshot(channel_id).await;
        if snapshot.is_empty() {
            tracing::trace!(%channel_id, "publish with no subscribers");
            return;
        }

        tracing::debug!(
            %channel_id,
            subscribers = snapshot.len(),
            sender = %event.sender,
            "broadcasting event"
        );

        for subscriber in snapshot {
            // A failed enqueue means that client disconnected after the
            // snapshot; its adapter handles cleanup. Never propagated -
            // one failing subscriber must not affect the rest.
            if let Err(gone) = subscriber.enqueue(QueueItem::Event(event.clone())) {
                tracing::debug!(%channel_id, error = %gone, "skipping gone subscriber");
            }
        }
    }
}
