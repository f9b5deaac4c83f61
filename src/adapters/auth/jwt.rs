//! HS256 JWT validation.
//!
//! The account system (outside this service) issues tokens whose `sub`
//! claim carries the username; this adapter only verifies and extracts.

use async_trait::async_trait;
use jsonwebtoken::{decode, errors::ErrorKind, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

use crate::domain::foundation::{AuthError, AuthenticatedUser};
use crate::ports::TokenValidator;

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    /// Username the token was issued for.
    sub: String,
    /// Expiry as unix seconds.
    exp: usize,
}

/// Validates HS256-signed bearer tokens against a shared secret.
pub struct JwtTokenValidator {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtTokenValidator {
    /// Creates a validator for the given shared secret.
    pub fn new(secret: &str) -> Self {
        Self {
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation: Validation::new(Algorithm::HS256),
        }
    }
}

#[async_trait]
impl TokenValidator for JwtTokenValidator {
    async fn validate(&self, token: &str) -> Result<AuthenticatedUser, AuthError> {
        let data =
            decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(|e| {
                match e.kind() {
                    ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                    _ => AuthError::InvalidToken,
                }
            })?;

        if data.claims.sub.trim().is_empty() {
            return Err(AuthError::InvalidToken);
        }
        Ok(AuthenticatedUser::new(data.claims.sub))
    }
}
