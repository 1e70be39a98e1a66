//! JWT identity token handling
//!
//! Tokens are HS256, signed with the secret shared with the identity
//! provider. `conference token` mints them locally for development.

use std::fmt;

use anyhow::{Result, anyhow};
use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// JWT validation error
#[derive(Debug)]
pub enum JwtError {
    /// Token has expired
    Expired,
    /// Token signature is invalid
    InvalidSignature,
    /// Other validation error
    Invalid(String),
}

impl fmt::Display for JwtError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Expired => write!(f, "Identity token has expired"),
            Self::InvalidSignature => write!(f, "Invalid identity token signature"),
            Self::Invalid(msg) => write!(f, "Invalid identity token: {}", msg),
        }
    }
}

impl std::error::Error for JwtError {}

/// JWT claims carried by identity tokens
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityClaims {
    /// User ID
    pub sub: String,
    pub email: String,
    pub iat: i64,
    pub exp: i64,
    pub jti: String,
}

impl IdentityClaims {
    pub fn new(user_id: &str, email: &str, ttl: Duration) -> Self {
        let now = Utc::now();
        Self {
            sub: user_id.to_string(),
            email: email.to_string(),
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
            jti: Uuid::new_v4().to_string(),
        }
    }

    pub fn user_id(&self) -> &str {
        &self.sub
    }
}

/// Create a signed identity token
pub fn create_identity_token(
    signing_key: &[u8],
    user_id: &str,
    email: &str,
    ttl: Duration,
) -> Result<String> {
    let claims = IdentityClaims::new(user_id, email, ttl);
    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(signing_key),
    )
    .map_err(|e| anyhow!("Failed to create JWT: {}", e))
}

/// Validate and decode an identity token
pub fn validate_identity_token(token: &str, signing_key: &[u8]) -> Result<IdentityClaims, JwtError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;
    validation.set_required_spec_claims(&["exp", "sub"]);

    let token_data =
        decode::<IdentityClaims>(token, &DecodingKey::from_secret(signing_key), &validation)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => JwtError::Expired,
                jsonwebtoken::errors::ErrorKind::InvalidSignature => JwtError::InvalidSignature,
                _ => JwtError::Invalid(e.to_string()),
            })?;

    Ok(token_data.claims)
}
