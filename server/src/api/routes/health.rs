//! Liveness probe

use axum::Json;
use serde::Serialize;
use utoipa::ToSchema;

use crate::core::constants::APP_NAME;

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
}

#[utoipa::path(
    get,
    path = "/api/v1/health",
    tag = "health",
    responses(
        (status = 200, description = "Server is up", body = HealthResponse)
    )
)]
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        service: APP_NAME,
        version: env!("CARGO_PKG_VERSION"),
    })
}
