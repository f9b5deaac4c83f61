//! Mock token validation for tests.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use crate::domain::foundation::{AuthError, AuthenticatedUser};
use crate::ports::TokenValidator;

/// Test validator that accepts a fixed set of tokens.
#[derive(Default)]
pub struct MockTokenValidator {
    tokens: RwLock<HashMap<String, AuthenticatedUser>>,
}

impl MockTokenValidator {
    /// Creates a validator that rejects everything.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a token as valid for the given username.
    pub fn with_token(self, token: impl Into<String>, username: impl Into<String>) -> Self {
        self.tokens
            .write()
            .expect("mock token map poisoned")
            .insert(token.into(), AuthenticatedUser::new(username));
        self
    }
}

#[async_trait]
impl TokenValidator for MockTokenValidator {
    async fn validate(&self, token: &str) -> Result<AuthenticatedUser, AuthError> {
        self.tokens
            .read()
            .expect("mock token map poisoned")
            .get(token)
            .cloned()
            .ok_or(AuthError::InvalidToken)
    }
}
