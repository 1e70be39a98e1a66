//! Authentication manager

use anyhow::Result;
use chrono::Duration;

use super::jwt::{IdentityClaims, JwtError, create_identity_token, validate_identity_token};
use crate::core::config::AuthConfig;
use crate::core::constants::DEFAULT_TOKEN_TTL_HOURS;

/// Verifies identity tokens with the shared secret
pub struct AuthManager {
    signing_key: Vec<u8>,
    enabled: bool,
}

impl std::fmt::Debug for AuthManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthManager")
            .field("enabled", &self.enabled)
            .finish()
    }
}

impl AuthManager {
    pub fn new(config: &AuthConfig) -> Self {
        if config.enabled {
            tracing::debug!("Authentication enabled");
        } else {
            tracing::warn!("Authentication DISABLED");
        }

        Self {
            signing_key: config.jwt_secret.as_bytes().to_vec(),
            enabled: config.enabled,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Mint a development token for `user_id`
    pub fn issue_token(&self, user_id: &str, email: &str) -> Result<String> {
        if self.signing_key.is_empty() {
            anyhow::bail!("No JWT secret configured; set --jwt-secret or CONFERENCE_JWT_SECRET");
        }
        create_identity_token(
            &self.signing_key,
            user_id,
            email,
            Duration::hours(DEFAULT_TOKEN_TTL_HOURS),
        )
    }

    /// Validate a bearer token
    pub fn validate(&self, jwt: &str) -> Result<IdentityClaims, JwtError> {
        validate_identity_token(jwt, &self.signing_key)
    }
}
