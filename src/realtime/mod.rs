//! Real-time fan-out core.
//!
//! Tracks which connections are listening to which channel and delivers
//! newly ingested events to all of them. Transport adapters (SSE,
//! WebSocket) sit on top of this module and never talk to each other.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                        Broadcaster                              │
//! │   publish(channel, event): snapshot the channel's subscriber    │
//! │   set under the registry lock, enqueue outside the lock         │
//! └─────────────────────────────────────────────────────────────────┘
//!                                 │
//!                                 ▼
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                      ChannelRegistry                            │
//! │   Channel 1              Channel 2              Channel 3       │
//! │   ├── subscriber-a       ├── subscriber-d       └── subscriber-f│
//! │   ├── subscriber-b       └── subscriber-e                       │
//! │   └── subscriber-c                                              │
//! └─────────────────────────────────────────────────────────────────┘
//!                                 │ one unbounded queue each
//!                                 ▼
//! ┌─────────────────────────────────────────────────────────────────┐
//! │   SubscriberHandle (owned by the connection adapter)            │
//! │   drain loop: Event(e) → write to client, Shutdown → stop,      │
//! │   deregister, drop                                              │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Components
//!
//! - [`subscriber`] - per-connection queue, handle, and queue items
//! - [`registry`] - channel → subscriber-set bookkeeping and shutdown
//! - [`broadcaster`] - snapshot-then-deliver event publication

pub mod broadcaster;
pub mod registry;
pub mod subscriber;

pub use broadcaster::Broadcaster;
pub use registry::{ChannelRegistry, DisconnectGuard};
pub use subscriber::{QueueItem, SubscriberGone, SubscriberHandle, SubscriberId, SubscriberSender};
