//! Identity resolution middleware

use std::sync::Arc;

use axum::Json;
use axum::extract::{Request, State};
use axum::http::{StatusCode, header};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use super::context::AuthContext;
use super::jwt::JwtError;
use super::manager::AuthManager;

/// 401 rejection raised while resolving the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthError {
    /// Handler needs a user and the request carried none
    Required,
    Expired,
    Invalid,
}

impl AuthError {
    pub fn code(self) -> &'static str {
        match self {
            Self::Required => "AUTH_REQUIRED",
            Self::Expired => "TOKEN_EXPIRED",
            Self::Invalid => "TOKEN_INVALID",
        }
    }

    fn message(self) -> &'static str {
        match self {
            Self::Required => "Authorization required",
            Self::Expired => "Identity token has expired",
            Self::Invalid => "Invalid identity token",
        }
    }
}

impl From<JwtError> for AuthError {
    fn from(e: JwtError) -> Self {
        match e {
            JwtError::Expired => Self::Expired,
            JwtError::InvalidSignature | JwtError::Invalid(_) => Self::Invalid,
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let body = json!({
            "error": "unauthorized",
            "code": self.code(),
            "message": self.message(),
        });
        (StatusCode::UNAUTHORIZED, Json(body)).into_response()
    }
}

#[derive(Clone)]
pub struct AuthState {
    pub auth_manager: Arc<AuthManager>,
}

/// Attach an `AuthContext` to the request.
///
/// With auth disabled every caller is the local default user. Otherwise a
/// `Bearer` token must verify; a request without the header passes through
/// anonymous and `CurrentUser` rejects it where a user is needed.
pub async fn resolve_identity(
    State(state): State<AuthState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let context = if state.auth_manager.is_enabled() {
        bearer_context(&state.auth_manager, &request)?
    } else {
        Some(AuthContext::LocalDefault)
    };

    if let Some(context) = context {
        request.extensions_mut().insert(context);
    }
    Ok(next.run(request).await)
}

fn bearer_context(
    auth_manager: &AuthManager,
    request: &Request,
) -> Result<Option<AuthContext>, AuthError> {
    let Some(value) = request.headers().get(header::AUTHORIZATION) else {
        return Ok(None);
    };

    let jwt = value
        .to_str()
        .ok()
        .and_then(|h| h.strip_prefix("Bearer "))
        .ok_or(AuthError::Invalid)?;

    let claims = auth_manager.validate(jwt).map_err(|e| {
        tracing::debug!(error = %e, "Rejected identity token");
        AuthError::from(e)
    })?;

    Ok(Some(AuthContext::Token {
        user_id: claims.sub,
        email: claims.email,
    }))
}
