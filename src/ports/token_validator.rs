//! Token validation port for bearer token authentication.
//!
//! Provider-agnostic: the HTTP middleware and the WebSocket upgrade
//! handler validate tokens through this trait, so swapping the signing
//! scheme (or mocking it in tests) never touches transport code.

use async_trait::async_trait;

use crate::domain::foundation::{AuthError, AuthenticatedUser};

/// Validates access tokens and extracts user identity.
///
/// # Contract
///
/// Implementations must:
/// - Verify the token signature
/// - Verify expiry
/// - Return `AuthError::InvalidToken` for malformed or bad-signature tokens
/// - Return `AuthError::TokenExpired` for expired tokens
#[async_trait]
pub trait TokenValidator: Send + Sync {
    /// Validates a raw token (without the "Bearer " prefix).
    async fn validate(&self, token: &str) -> Result<AuthenticatedUser, AuthError>;
}
