//! Chat domain - channels, messages, and the events fanned out to subscribers.

mod channel;
mod event;
mod message;

pub use channel::{Channel, ChannelName, MAX_CHANNEL_NAME_LEN};
pub use event::ChatEvent;
pub use message::{MessageContent, SenderDescriptor, MAX_MESSAGE_CONTENT_LEN};
