//! Channel value objects.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{ChannelId, Timestamp, ValidationError};

/// Maximum length of a channel name, in characters.
pub const MAX_CHANNEL_NAME_LEN: usize = 100;

/// Validated, human-readable channel name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChannelName(String);

impl ChannelName {
    /// Validates and wraps a channel name.
    pub fn new(raw: impl Into<String>) -> Result<Self, ValidationError> {
        let raw = raw.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::empty_field("name"));
        }
        let len = trimmed.chars().count();
        if len > MAX_CHANNEL_NAME_LEN {
            return Err(ValidationError::too_long("name", MAX_CHANNEL_NAME_LEN, len));
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Returns the name.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ChannelName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A chat channel as recorded by the directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Channel {
    pub id: ChannelId,
    pub name: ChannelName,
    pub created_at: Timestamp,
}

impl Channel {
    /// Creates a channel record.
    pub fn new(id: ChannelId, name: ChannelName, created_at: Timestamp) -> Self {
        Self {
            id,
            name,
            created_at,
        }
    }
}
