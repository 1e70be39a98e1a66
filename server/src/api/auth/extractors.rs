//! Identity extractor for Axum handlers
//!
//! ```no_run
//! # use conference_server::api::auth::CurrentUser;
//! # use conference_server::api::types::ApiError;
//! pub async fn get_profile(user: CurrentUser) -> Result<(), ApiError> {
//!     let identity = &user.identity;
//!     Ok(())
//! }
//! ```

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use super::context::AuthContext;
use super::middleware::AuthError;
use crate::domain::Identity;

/// Authenticated caller. Rejects with 401 `AUTH_REQUIRED` when the request
/// carries no identity.
pub struct CurrentUser {
    pub identity: Identity,
}

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let ctx = parts
            .extensions
            .get::<AuthContext>()
            .ok_or(AuthError::Required)?;

        Ok(Self {
            identity: ctx.identity(),
        })
    }
}
