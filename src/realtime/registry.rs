//! Channel registry - who is currently listening to what.
//!
//! The registry's channel → subscriber-set mapping is the only state in
//! the fan-out core mutated from multiple tasks. All mutations (register,
//! deregister, shutdown) take the write lock; broadcast snapshots take
//! the read lock. Delivery happens outside the lock, so a subscriber
//! added or removed mid-broadcast either receives the event or cleanly
//! doesn't - never a partial view.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::domain::foundation::ChannelId;

use super::subscriber::{QueueItem, SubscriberHandle, SubscriberId, SubscriberSender};

/// Tracks the set of active subscribers per channel.
///
/// Invariants:
/// - a subscriber id appears in at most one channel's set
/// - an entry exists exactly as long as its connection is registered;
///   empty channel sets are removed eagerly
#[derive(Default)]
pub struct ChannelRegistry {
    channels: RwLock<HashMap<ChannelId, HashMap<SubscriberId, SubscriberSender>>>,
}

impl ChannelRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a new subscriber on a channel.
    ///
    /// The channel's set is created on first registration; registration
    /// never fails. Returns the handle the connection adapter drains.
    pub async fn register(&self, channel_id: ChannelId) -> SubscriberHandle {
        let (sender, handle) = SubscriberHandle::channel(channel_id);

        let mut channels = self.channels.write().await;
        let subscribers = channels.entry(channel_id).or_default();
        subscribers.insert(sender.id(), sender);

        tracing::debug!(
            %channel_id,
            subscriber_id = %handle.id(),
            total = subscribers.len(),
            "subscriber registered"
        );

        handle
    }

    /// Removes a subscriber from a channel.
    ///
    /// Idempotent: removing an already-removed subscriber or touching an
    /// unknown channel is a no-op, since client disconnects race with
    /// process shutdown.
    pub async fn deregister(&self, channel_id: ChannelId, subscriber_id: SubscriberId) {
        let mut channels = self.channels.write().await;

        if let Some(subscribers) = channels.get_mut(&channel_id) {
            if subscribers.remove(&subscriber_id).is_some() {
                tracing::debug!(
                    %channel_id,
                    %subscriber_id,
                    remaining = subscribers.len(),
                    "subscriber deregistered"
                );
            }
            if subscribers.is_empty() {
                channels.remove(&channel_id);
            }
        }
    }

    /// Atomically snapshots the current subscriber set for a channel.
    ///
    /// The broadcaster enqueues to the returned senders after the lock is
    /// released; holding the lock for the duration of delivery would
    /// serialize registrations behind slow fan-outs for no benefit.
    pub async fn snapshot(&self, channel_id: ChannelId) -> Vec<SubscriberSender> {
        let channels = self.channels.read().await;
        channels
            .get(&channel_id)
            .map(|subscribers| subscribers.values().cloned().collect())
            .unwrap_or_default()
    }

    /// Enqueues the shutdown sentinel into every live queue and clears
    /// the registry.
    ///
    /// Called exactly once during graceful process termination, before
    /// the server stops scheduling connection tasks, so every client gets
    /// a clean close instead of an abrupt transport reset. `register`
    /// remains callable afterwards; nothing will drain such a handle.
    pub async fn shutdown(&self) {
        let mut channels = self.channels.write().await;

        let mut notified = 0usize;
        for subscribers in channels.values() {
            for sender in subscribers.values() {
                // A subscriber that is already gone is fine; it has
                // nothing left to close.
                if sender.enqueue(QueueItem::Shutdown).is_ok() {
                    notified += 1;
                }
            }
        }
        channels.clear();

        tracing::info!(subscribers = notified, "registry shut down");
    }

    /// Number of subscribers currently registered on a channel.
    pub async fn subscriber_count(&self, channel_id: ChannelId) -> usize {
        let channels = self.channels.read().await;
        channels
            .get(&channel_id)
            .map(|subscribers| subscribers.len())
            .unwrap_or(0)
    }

    /// Total subscribers across all channels.
    pub async fn total_subscribers(&self) -> usize {
        let channels = self.channels.read().await;
        channels.values().map(|subscribers| subscribers.len()).sum()
    }

    /// Channels that currently have at least one subscriber.
    pub async fn active_channels(&self) -> Vec<ChannelId> {
        let channels = self.channels.read().await;
        channels.keys().copied().collect()
    }
}

/// Deregisters a subscriber when dropped.
///
/// Stream-shaped adapters (SSE) have no code path that runs after the
/// client disconnects; the transport simply drops the stream mid-wait.
/// Tying deregistration to drop guarantees the cleanup step on every
/// exit path.
pub struct DisconnectGuard {
    registry: Arc<ChannelRegistry>,
    channel_id: ChannelId,
    subscriber_id: SubscriberId,
}

impl DisconnectGuard {
    /// Creates a guard that will deregister `handle`'s registry entry.
    pub fn new(registry: Arc<ChannelRegistry>, handle: &SubscriberHandle) -> Self {
        Self {
            registry,
            channel_id: handle.channel_id(),
            subscriber_id: handle.id(),
        }
    }
}

impl Drop for DisconnectGuard {
    fn drop(&mut self) {
        let registry = Arc::clone(&self.registry);
        let channel_id = self.channel_id;
        let subscriber_id = self.subscriber_id;

        match tokio::runtime::Handle::try_current() {
            Ok(rt) => {
                rt.spawn(async move {
                    registry.deregister(channel_id, subscriber_id).await;
                });
            }
            Err(_) => {
                // Runtime already gone (process teardown); the registry
                // dies with it.
                tracing::debug!(%channel_id, %subscriber_id, "dropped outside runtime");
            }
        }
    }
}
