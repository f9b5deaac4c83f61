//! Per-connection subscriber queue and handle.
//!
//! Each connected client owns exactly one [`SubscriberHandle`]; the
//! registry keeps the matching [`SubscriberSender`] for delivery. The
//! queue is unbounded and FIFO: a slow client accumulates backlog rather
//! than blocking the publisher or other subscribers.

use std::fmt;
use std::task::{Context, Poll};

use thiserror::Error;
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::domain::chat::ChatEvent;
use crate::domain::foundation::ChannelId;

/// Unique identifier for one subscriber connection.
///
/// Generated server-side at registration time; used for precise cleanup
/// when the connection closes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriberId(Uuid);

impl SubscriberId {
    /// Creates a new random subscriber id.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SubscriberId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SubscriberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One item in a subscriber's queue.
///
/// The shutdown sentinel is a tagged variant rather than a magic value,
/// so drain loops are a single pattern match.
#[derive(Debug, Clone)]
pub enum QueueItem {
    /// A chat event to deliver to the client.
    Event(ChatEvent),
    /// No more events will come; close the connection.
    Shutdown,
}

/// Enqueue failed because the subscriber's receiving half is gone.
///
/// Scoped to that one subscriber; the broadcaster logs it and moves on.
#[derive(Debug, Error)]
#[error("Subscriber {0} is gone")]
pub struct SubscriberGone(pub SubscriberId);

/// Delivery side of a subscriber queue, held by the registry.
#[derive(Debug, Clone)]
pub struct SubscriberSender {
    id: SubscriberId,
    tx: mpsc::UnboundedSender<QueueItem>,
}

impl SubscriberSender {
    /// The subscriber this sender delivers to.
    pub fn id(&self) -> SubscriberId {
        self.id
    }

    /// Appends an item to the subscriber's queue.
    ///
    /// Non-blocking and always succeeds while the subscriber is alive;
    /// the queue is unbounded.
    pub fn enqueue(&self, item: QueueItem) -> Result<(), SubscriberGone> {
        self.tx.send(item).map_err(|_| SubscriberGone(self.id))
    }
}

/// Receiving side of a subscriber queue, owned by the connection adapter.
#[derive(Debug)]
pub struct SubscriberHandle {
    id: SubscriberId,
    channel_id: ChannelId,
    queue: mpsc::UnboundedReceiver<QueueItem>,
}

impl SubscriberHandle {
    /// Creates a linked sender/handle pair for one subscriber.
    pub(crate) fn channel(channel_id: ChannelId) -> (SubscriberSender, SubscriberHandle) {
        let (tx, rx) = mpsc::unbounded_channel();
        let id = SubscriberId::new();
        (
            SubscriberSender { id, tx },
            SubscriberHandle {
                id,
                channel_id,
                queue: rx,
            },
        )
    }

    /// This subscriber's unique id.
    pub fn id(&self) -> SubscriberId {
        self.id
    }

    /// The channel this subscriber is registered on.
    pub fn channel_id(&self) -> ChannelId {
        self.channel_id
    }

    /// Waits for the next queue item, FIFO.
    ///
    /// A closed queue (every sender dropped, e.g. the registry entry was
    /// removed without a sentinel) yields `Shutdown`, so drain loops
    /// terminate deterministically instead of blocking forever.
    pub async fn next(&mut self) -> QueueItem {
        self.queue.recv().await.unwrap_or(QueueItem::Shutdown)
    }

    /// Poll-based variant of [`next`](Self::next) for stream adapters.
    pub fn poll_next_item(&mut self, cx: &mut Context<'_>) -> Poll<QueueItem> {
        self.queue
            .poll_recv(cx)
            .map(|item| item.unwrap_or(QueueItem::Shutdown))
    }
}
