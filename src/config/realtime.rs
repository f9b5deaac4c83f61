//! Real-time fan-out configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// Configuration for the live delivery surfaces (SSE, WebSocket) and
/// the history read path.
#[derive(Debug, Clone, Deserialize)]
pub struct RealtimeConfig {
    /// SSE keep-alive ping interval in seconds
    #[serde(default = "default_sse_keep_alive")]
    pub sse_keep_alive_secs: u64,

    /// Default number of messages served by the history endpoint
    #[serde(default = "default_history_limit")]
    pub history_limit: u32,

    /// Channel seeded at startup so first-time clients have somewhere to go
    #[serde(default = "default_channel_name")]
    pub default_channel_name: String,
}

impl RealtimeConfig {
    /// Get the SSE keep-alive interval as Duration
    pub fn sse_keep_alive(&self) -> Duration {
        Duration::from_secs(self.sse_keep_alive_secs)
    }

    /// Validate realtime configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.sse_keep_alive_secs == 0 || self.sse_keep_alive_secs > 300 {
            return Err(ValidationError::InvalidKeepAlive);
        }
        if self.history_limit == 0 || self.history_limit > 500 {
            return Err(ValidationError::InvalidHistoryLimit);
        }
        if self.default_channel_name.trim().is_empty() {
            return Err(ValidationError::MissingRequired("DEFAULT_CHANNEL_NAME"));
        }
        Ok(())
    }
}

impl Default for RealtimeConfig {
    fn default() -> Self {
        Self {
            sse_keep_alive_secs: default_sse_keep_alive(),
            history_limit: default_history_limit(),
            default_channel_name: default_channel_name(),
        }
    }
}

fn default_sse_keep_alive() -> u64 {
    30
}

fn default_history_limit() -> u32 {
    50
}

fn default_channel_name() -> String {
    "General".to_string()
}
