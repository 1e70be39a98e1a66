//! Session API endpoints

pub mod types;

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};

use types::{ConferenceSpeakerPath, SessionDto, SessionRequest, SessionTypePath, SessionsResponse};

use crate::api::auth::CurrentUser;
use crate::api::extractors::ValidatedJson;
use crate::api::types::{ApiError, QueryFiltersRequest};
use crate::domain::SessionService;

/// Shared state for Session API endpoints
#[derive(Clone)]
pub struct SessionsApiState {
    pub sessions: Arc<SessionService>,
}

/// Build Session API routes
pub fn routes(sessions: Arc<SessionService>) -> Router<()> {
    let state = SessionsApiState { sessions };

    Router::new()
        .route(
            "/conference/{key}/sessions",
            post(create_session).get(get_conference_sessions),
        )
        .route(
            "/conference/{key}/sessions/type/{type_of_session}",
            get(get_conference_sessions_by_type),
        )
        .route(
            "/conference/{key}/sessions/query",
            post(query_conference_sessions),
        )
        .route(
            "/conference/{key}/speaker/{speaker_key}/sessions",
            get(get_sessions_by_conference_speaker),
        )
        .route("/sessions/query", post(query_sessions))
        .route("/speaker/{key}/sessions", get(get_sessions_by_speaker))
        .with_state(state)
}

/// Create a session in a conference (organizer only)
#[utoipa::path(
    post,
    path = "/api/v1/conference/{key}/sessions",
    tag = "sessions",
    params(("key" = String, Path, description = "Websafe conference key")),
    request_body = SessionRequest,
    responses(
        (status = 201, description = "Session created", body = SessionDto),
        (status = 400, description = "Missing name or malformed field"),
        (status = 403, description = "Caller is not the organizer"),
        (status = 404, description = "Unknown conference or speaker")
    )
)]
pub async fn create_session(
    State(state): State<SessionsApiState>,
    user: CurrentUser,
    Path(key): Path<String>,
    ValidatedJson(req): ValidatedJson<SessionRequest>,
) -> Result<(StatusCode, Json<SessionDto>), ApiError> {
    let session = state
        .sessions
        .create_session(&user.identity, &key, req.into())
        .await?;
    Ok((StatusCode::CREATED, Json(session.into())))
}

/// All sessions of a conference
#[utoipa::path(
    get,
    path = "/api/v1/conference/{key}/sessions",
    tag = "sessions",
    params(("key" = String, Path, description = "Websafe conference key")),
    responses(
        (status = 200, description = "Sessions", body = SessionsResponse),
        (status = 404, description = "No conference with this key")
    )
)]
pub async fn get_conference_sessions(
    State(state): State<SessionsApiState>,
    Path(key): Path<String>,
) -> Result<Json<SessionsResponse>, ApiError> {
    let sessions = state.sessions.get_conference_sessions(&key).await?;
    Ok(Json(sessions.into()))
}

/// Sessions of a conference with a given type
#[utoipa::path(
    get,
    path = "/api/v1/conference/{key}/sessions/type/{type_of_session}",
    tag = "sessions",
    params(
        ("key" = String, Path, description = "Websafe conference key"),
        ("type_of_session" = String, Path, description = "Session type, e.g. WORKSHOP")
    ),
    responses(
        (status = 200, description = "Sessions", body = SessionsResponse),
        (status = 400, description = "Unknown session type"),
        (status = 404, description = "No conference with this key")
    )
)]
pub async fn get_conference_sessions_by_type(
    State(state): State<SessionsApiState>,
    Path(path): Path<SessionTypePath>,
) -> Result<Json<SessionsResponse>, ApiError> {
    let sessions = state
        .sessions
        .get_conference_sessions_by_type(&path.key, &path.type_of_session)
        .await?;
    Ok(Json(sessions.into()))
}

/// Search the sessions of one conference
#[utoipa::path(
    post,
    path = "/api/v1/conference/{key}/sessions/query",
    tag = "sessions",
    params(("key" = String, Path, description = "Websafe conference key")),
    request_body = QueryFiltersRequest,
    responses(
        (status = 200, description = "Matching sessions", body = SessionsResponse),
        (status = 400, description = "Invalid filter, filter value or query"),
        (status = 404, description = "No conference with this key")
    )
)]
pub async fn query_conference_sessions(
    State(state): State<SessionsApiState>,
    Path(key): Path<String>,
    ValidatedJson(req): ValidatedJson<QueryFiltersRequest>,
) -> Result<Json<SessionsResponse>, ApiError> {
    let sessions = state
        .sessions
        .query_conference_sessions(&key, &req.filters)
        .await?;
    Ok(Json(sessions.into()))
}

/// Search sessions across all conferences
#[utoipa::path(
    post,
    path = "/api/v1/sessions/query",
    tag = "sessions",
    request_body = QueryFiltersRequest,
    responses(
        (status = 200, description = "Matching sessions", body = SessionsResponse),
        (status = 400, description = "Invalid filter, filter value or query")
    )
)]
pub async fn query_sessions(
    State(state): State<SessionsApiState>,
    ValidatedJson(req): ValidatedJson<QueryFiltersRequest>,
) -> Result<Json<SessionsResponse>, ApiError> {
    let sessions = state.sessions.query_sessions(&req.filters).await?;
    Ok(Json(sessions.into()))
}

/// Sessions given by a speaker across all conferences
#[utoipa::path(
    get,
    path = "/api/v1/speaker/{key}/sessions",
    tag = "sessions",
    params(("key" = String, Path, description = "Websafe speaker key")),
    responses(
        (status = 200, description = "Sessions", body = SessionsResponse),
        (status = 404, description = "No speaker with this key")
    )
)]
pub async fn get_sessions_by_speaker(
    State(state): State<SessionsApiState>,
    Path(key): Path<String>,
) -> Result<Json<SessionsResponse>, ApiError> {
    let sessions = state.sessions.get_sessions_by_speaker(&key).await?;
    Ok(Json(sessions.into()))
}

/// Sessions given by a speaker at one conference
#[utoipa::path(
    get,
    path = "/api/v1/conference/{key}/speaker/{speaker_key}/sessions",
    tag = "sessions",
    params(
        ("key" = String, Path, description = "Websafe conference key"),
        ("speaker_key" = String, Path, description = "Websafe speaker key")
    ),
    responses(
        (status = 200, description = "Sessions", body = SessionsResponse),
        (status = 404, description = "Unknown conference or speaker")
    )
)]
pub async fn get_sessions_by_conference_speaker(
    State(state): State<SessionsApiState>,
    Path(path): Path<ConferenceSpeakerPath>,
) -> Result<Json<SessionsResponse>, ApiError> {
    let sessions = state
        .sessions
        .get_sessions_by_conference_speaker(&path.speaker_key, &path.key)
        .await?;
    Ok(Json(sessions.into()))
}
