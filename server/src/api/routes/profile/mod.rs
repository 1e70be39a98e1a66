//! Profile API endpoints

pub mod types;

use std::sync::Arc;

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};

use types::{ProfileDto, ProfileRequest};

use crate::api::auth::CurrentUser;
use crate::api::extractors::ValidatedJson;
use crate::api::types::ApiError;
use crate::domain::ProfileService;

/// Shared state for Profile API endpoints
#[derive(Clone)]
pub struct ProfileApiState {
    pub profiles: Arc<ProfileService>,
}

/// Build Profile API routes
pub fn routes(profiles: Arc<ProfileService>) -> Router<()> {
    let state = ProfileApiState { profiles };

    Router::new()
        .route("/profile", get(get_profile).put(save_profile))
        .with_state(state)
}

/// Caller's profile, created on first access
#[utoipa::path(
    get,
    path = "/api/v1/profile",
    tag = "profile",
    responses(
        (status = 200, description = "Profile", body = ProfileDto),
        (status = 401, description = "Authorization required")
    )
)]
pub async fn get_profile(
    State(state): State<ProfileApiState>,
    user: CurrentUser,
) -> Result<Json<ProfileDto>, ApiError> {
    let profile = state.profiles.get_profile(&user.identity).await?;
    Ok(Json(profile.into()))
}

/// Update display name and tee shirt size
#[utoipa::path(
    put,
    path = "/api/v1/profile",
    tag = "profile",
    request_body = ProfileRequest,
    responses(
        (status = 200, description = "Updated profile", body = ProfileDto),
        (status = 401, description = "Authorization required")
    )
)]
pub async fn save_profile(
    State(state): State<ProfileApiState>,
    user: CurrentUser,
    ValidatedJson(req): ValidatedJson<ProfileRequest>,
) -> Result<Json<ProfileDto>, ApiError> {
    let profile = state
        .profiles
        .save_profile(&user.identity, req.into())
        .await?;
    Ok(Json(profile.into()))
}
