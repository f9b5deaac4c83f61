//! Authentication types for the domain layer.
//!
//! These types represent an authenticated user extracted from a bearer
//! token. They carry no provider dependencies - any token scheme can
//! populate them via the `TokenValidator` port.

use thiserror::Error;

/// Authenticated user extracted from a validated token.
///
/// Account management (registration, passwords) lives outside this
/// service; all the chat core needs for sender attribution is a username.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    /// Username claimed by the token's subject.
    pub username: String,
}

impl AuthenticatedUser {
    /// Creates a new authenticated user.
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
        }
    }
}

/// Authentication errors that can occur during token validation.
#[derive(Debug, Clone, Error)]
pub enum AuthError {
    /// Token is malformed or its signature does not verify.
    #[error("Invalid token")]
    InvalidToken,

    /// Token signature is valid but the token has expired.
    #[error("Token expired")]
    TokenExpired,
}
