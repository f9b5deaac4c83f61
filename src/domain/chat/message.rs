//! Message content validation and sender attribution.

use std::fmt;

use crate::domain::foundation::ValidationError;

/// Maximum length of a single message, in characters.
pub const MAX_MESSAGE_CONTENT_LEN: usize = 10_000;

/// Validated message text.
///
/// Construction is the only validation point; everything downstream
/// (ingestion, persistence, fan-out) can assume the invariants hold.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageContent(String);

impl MessageContent {
    /// Validates and wraps raw message text.
    ///
    /// Rejects text that is empty (after trimming) or longer than
    /// [`MAX_MESSAGE_CONTENT_LEN`] characters.
    pub fn new(raw: impl Into<String>) -> Result<Self, ValidationError> {
        let raw = raw.into();
        if raw.trim().is_empty() {
            return Err(ValidationError::empty_field("content"));
        }
        let len = raw.chars().count();
        if len > MAX_MESSAGE_CONTENT_LEN {
            return Err(ValidationError::too_long(
                "content",
                MAX_MESSAGE_CONTENT_LEN,
                len,
            ));
        }
        Ok(Self(raw))
    }

    /// Returns the message text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the wrapper and returns the owned text.
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for MessageContent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Who a message should be attributed to.
///
/// Mirrors the posting rules of the HTTP and WebSocket surfaces: an
/// authenticated user posts under their username, unauthenticated
/// clients post under a guest identity, and anyone may post anonymously.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SenderDescriptor {
    /// Posted with a verified bearer token.
    Authenticated(String),

    /// Posted with a self-assigned guest identity.
    Guest(String),

    /// Posted with the anonymous flag set; identity deliberately hidden.
    Anonymous,
}

impl SenderDescriptor {
    /// Fallback guest name when the client supplied no identity at all.
    const DEFAULT_GUEST: &'static str = "Guest";

    /// Resolves the descriptor from request context.
    ///
    /// The anonymous flag wins over any identity; an authenticated
    /// username wins over a guest id.
    pub fn resolve(username: Option<&str>, guest_id: Option<&str>, anonymous: bool) -> Self {
        if anonymous {
            return SenderDescriptor::Anonymous;
        }
        if let Some(name) = username {
            return SenderDescriptor::Authenticated(name.to_string());
        }
        match guest_id {
            Some(guest) if !guest.trim().is_empty() => {
                SenderDescriptor::Guest(guest.to_string())
            }
            _ => SenderDescriptor::Guest(Self::DEFAULT_GUEST.to_string()),
        }
    }

    /// The name recorded on the stored message and shown to other clients.
    pub fn display_name(&self) -> &str {
        match self {
            SenderDescriptor::Authenticated(name) => name,
            SenderDescriptor::Guest(name) => name,
            SenderDescriptor::Anonymous => "Anonymous",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_accepts_ordinary_text() {
        let content = MessageContent::new("hello world").unwrap();
        assert_eq!(content.as_str(), "hello world");
    }

    #[test]
    fn content_rejects_empty_and_whitespace_only() {
        assert!(MessageContent::new("").is_err());
        assert!(MessageContent::new("   \n\t").is_err());
    }

    #[test]
    fn content_rejects_text_over_limit() {
        let long = "x".repeat(MAX_MESSAGE_CONTENT_LEN + 1);
        assert!(MessageContent::new(long).is_err());
    }

    #[test]
    fn content_accepts_text_exactly_at_limit() {
        let max = "x".repeat(MAX_MESSAGE_CONTENT_LEN);
        assert!(MessageContent::new(max).is_ok());
    }

    #[test]
    fn anonymous_flag_wins_over_any_identity() {
        let sender = SenderDescriptor::resolve(Some("alice"), Some("guest_1234"), true);
        assert_eq!(sender, SenderDescriptor::Anonymous);
        assert_eq!(sender.display_name(), "Anonymous");
    }

    #[test]
    fn authenticated_username_wins_over_guest_id() {
        let sender = SenderDescriptor::resolve(Some("alice"), Some("guest_1234"), false);
        assert_eq!(sender.display_name(), "alice");
    }

    #[test]
    fn guest_id_is_used_when_present() {
        let sender = SenderDescriptor::resolve(None, Some("guest_1234"), false);
        assert_eq!(sender.display_name(), "guest_1234");
    }

    #[test]
    fn blank_guest_id_falls_back_to_default() {
        let sender = SenderDescriptor::resolve(None, Some("   "), false);
        assert_eq!(sender.display_name(), "Guest");

        let sender = SenderDescriptor::resolve(None, None, false);
        assert_eq!(sender.display_name(), "Guest");
    }
}
