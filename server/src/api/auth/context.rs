//! Authentication context

use crate::core::constants::{DEFAULT_USER_EMAIL, DEFAULT_USER_ID};
use crate::domain::Identity;

/// Caller identity attached to a request by the auth middleware
#[derive(Debug, Clone)]
pub enum AuthContext {
    /// Verified bearer token
    Token { user_id: String, email: String },
    /// Default local user (--no-auth mode)
    LocalDefault,
}

impl AuthContext {
    /// Identity handed to the domain services
    pub fn identity(&self) -> Identity {
        match self {
            Self::Token { user_id, email } => Identity::new(user_id.as_str(), email.as_str()),
            Self::LocalDefault => Identity::new(DEFAULT_USER_ID, DEFAULT_USER_EMAIL),
        }
    }
}
