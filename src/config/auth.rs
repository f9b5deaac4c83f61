//! Authentication configuration

use serde::Deserialize;

use super::error::ValidationError;
use super::server::Environment;

/// Authentication configuration (HS256 bearer tokens)
///
/// Tokens are issued by the account system; this service only verifies
/// them, so the shared signing secret is all it needs.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct AuthConfig {
    /// Shared secret used to verify token signatures
    #[serde(default)]
    pub jwt_secret: String,
}

impl AuthConfig {
    /// Validate authentication configuration
    ///
    /// Development tolerates any non-empty secret; production requires
    /// at least 32 bytes.
    pub fn validate(&self, environment: &Environment) -> Result<(), ValidationError> {
        if self.jwt_secret.is_empty() {
            return Err(ValidationError::MissingRequired("JWT_SECRET"));
        }
        if *environment == Environment::Production && self.jwt_secret.len() < 32 {
            return Err(ValidationError::WeakJwtSecret);
        }
        Ok(())
    }
}
