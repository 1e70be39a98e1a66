//! Wishlist API types

use serde::Serialize;
use utoipa::ToSchema;

/// Session keys on the caller's wishlist after a change
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WishlistResponse {
    pub session_keys: Vec<String>,
}
