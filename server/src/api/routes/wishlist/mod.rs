//! Wishlist API endpoints

pub mod types;

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::{Json, Router};

use types::WishlistResponse;

use crate::api::auth::CurrentUser;
use crate::api::routes::sessions::types::SessionsResponse;
use crate::api::types::ApiError;
use crate::domain::WishlistService;

/// Shared state for Wishlist API endpoints
#[derive(Clone)]
pub struct WishlistApiState {
    pub wishlist: Arc<WishlistService>,
}

/// Build Wishlist API routes
pub fn routes(wishlist: Arc<WishlistService>) -> Router<()> {
    let state = WishlistApiState { wishlist };

    Router::new()
        .route("/wishlist", get(get_sessions_in_wishlist))
        .route(
            "/wishlist/{key}",
            post(add_session_to_wishlist).delete(delete_session_in_wishlist),
        )
        .with_state(state)
}

/// Sessions on the caller's wishlist
#[utoipa::path(
    get,
    path = "/api/v1/wishlist",
    tag = "wishlist",
    responses(
        (status = 200, description = "Wishlisted sessions that still exist", body = SessionsResponse),
        (status = 401, description = "Authorization required")
    )
)]
pub async fn get_sessions_in_wishlist(
    State(state): State<WishlistApiState>,
    user: CurrentUser,
) -> Result<Json<SessionsResponse>, ApiError> {
    let sessions = state
        .wishlist
        .get_sessions_in_wishlist(&user.identity)
        .await?;
    Ok(Json(sessions.into()))
}

/// Add a session to the caller's wishlist
#[utoipa::path(
    post,
    path = "/api/v1/wishlist/{key}",
    tag = "wishlist",
    params(("key" = String, Path, description = "Websafe session key")),
    responses(
        (status = 200, description = "Session added", body = WishlistResponse),
        (status = 404, description = "No session with this key"),
        (status = 409, description = "Session already on the wishlist")
    )
)]
pub async fn add_session_to_wishlist(
    State(state): State<WishlistApiState>,
    user: CurrentUser,
    Path(key): Path<String>,
) -> Result<Json<WishlistResponse>, ApiError> {
    let session_keys = state
        .wishlist
        .add_session_to_wishlist(&user.identity, &key)
        .await?;
    Ok(Json(WishlistResponse { session_keys }))
}

/// Remove a session from the caller's wishlist
#[utoipa::path(
    delete,
    path = "/api/v1/wishlist/{key}",
    tag = "wishlist",
    params(("key" = String, Path, description = "Websafe session key")),
    responses(
        (status = 200, description = "Session removed", body = WishlistResponse),
        (status = 409, description = "Session not on the wishlist")
    )
)]
pub async fn delete_session_in_wishlist(
    State(state): State<WishlistApiState>,
    user: CurrentUser,
    Path(key): Path<String>,
) -> Result<Json<WishlistResponse>, ApiError> {
    let session_keys = state
        .wishlist
        .delete_session_in_wishlist(&user.identity, &key)
        .await?;
    Ok(Json(WishlistResponse { session_keys }))
}
