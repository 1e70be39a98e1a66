//! Conference API endpoints

pub mod types;

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};

use types::{ConferenceDto, ConferenceRequest, ConferencesResponse};

use crate::api::auth::CurrentUser;
use crate::api::extractors::ValidatedJson;
use crate::api::types::{ApiError, BooleanMessage, QueryFiltersRequest, StringMessage};
use crate::domain::{AnnouncementService, ConferenceService};

/// Shared state for Conference API endpoints
#[derive(Clone)]
pub struct ConferencesApiState {
    pub conferences: Arc<ConferenceService>,
    pub announcements: Arc<AnnouncementService>,
}

/// Build Conference API routes
pub fn routes(
    conferences: Arc<ConferenceService>,
    announcements: Arc<AnnouncementService>,
) -> Router<()> {
    let state = ConferencesApiState {
        conferences,
        announcements,
    };

    Router::new()
        .route("/conference", post(create_conference))
        .route(
            "/conference/{key}",
            get(get_conference).put(update_conference),
        )
        .route(
            "/conference/{key}/registration",
            post(register_for_conference).delete(unregister_from_conference),
        )
        .route("/conferences/query", post(query_conferences))
        .route("/conferences/created", get(get_conferences_created))
        .route("/conferences/attending", get(get_conferences_to_attend))
        .route("/announcement", get(get_announcement))
        .with_state(state)
}

/// Create a conference owned by the caller
#[utoipa::path(
    post,
    path = "/api/v1/conference",
    tag = "conferences",
    request_body = ConferenceRequest,
    responses(
        (status = 201, description = "Conference created", body = ConferenceDto),
        (status = 400, description = "Missing name or malformed date"),
        (status = 401, description = "Authorization required")
    )
)]
pub async fn create_conference(
    State(state): State<ConferencesApiState>,
    user: CurrentUser,
    ValidatedJson(req): ValidatedJson<ConferenceRequest>,
) -> Result<(StatusCode, Json<ConferenceDto>), ApiError> {
    let conference = state
        .conferences
        .create_conference(&user.identity, req.into())
        .await?;
    Ok((StatusCode::CREATED, Json(conference.into())))
}

/// Get a conference by websafe key
#[utoipa::path(
    get,
    path = "/api/v1/conference/{key}",
    tag = "conferences",
    params(("key" = String, Path, description = "Websafe conference key")),
    responses(
        (status = 200, description = "Conference", body = ConferenceDto),
        (status = 404, description = "No conference with this key")
    )
)]
pub async fn get_conference(
    State(state): State<ConferencesApiState>,
    Path(key): Path<String>,
) -> Result<Json<ConferenceDto>, ApiError> {
    let conference = state.conferences.get_conference(&key).await?;
    Ok(Json(conference.into()))
}

/// Update a conference (organizer only)
#[utoipa::path(
    put,
    path = "/api/v1/conference/{key}",
    tag = "conferences",
    params(("key" = String, Path, description = "Websafe conference key")),
    request_body = ConferenceRequest,
    responses(
        (status = 200, description = "Conference updated", body = ConferenceDto),
        (status = 403, description = "Caller is not the organizer"),
        (status = 404, description = "No conference with this key")
    )
)]
pub async fn update_conference(
    State(state): State<ConferencesApiState>,
    user: CurrentUser,
    Path(key): Path<String>,
    ValidatedJson(req): ValidatedJson<ConferenceRequest>,
) -> Result<Json<ConferenceDto>, ApiError> {
    let conference = state
        .conferences
        .update_conference(&user.identity, &key, req.into())
        .await?;
    Ok(Json(conference.into()))
}

/// Register the caller for a conference
#[utoipa::path(
    post,
    path = "/api/v1/conference/{key}/registration",
    tag = "conferences",
    params(("key" = String, Path, description = "Websafe conference key")),
    responses(
        (status = 200, description = "Registered", body = BooleanMessage),
        (status = 404, description = "No conference with this key"),
        (status = 409, description = "Already registered or no seats available")
    )
)]
pub async fn register_for_conference(
    State(state): State<ConferencesApiState>,
    user: CurrentUser,
    Path(key): Path<String>,
) -> Result<Json<BooleanMessage>, ApiError> {
    state
        .conferences
        .register_for_conference(&user.identity, &key)
        .await?;
    Ok(Json(BooleanMessage { data: true }))
}

/// Unregister the caller from a conference
#[utoipa::path(
    delete,
    path = "/api/v1/conference/{key}/registration",
    tag = "conferences",
    params(("key" = String, Path, description = "Websafe conference key")),
    responses(
        (status = 200, description = "`data` is false when the caller was not registered", body = BooleanMessage),
        (status = 404, description = "No conference with this key")
    )
)]
pub async fn unregister_from_conference(
    State(state): State<ConferencesApiState>,
    user: CurrentUser,
    Path(key): Path<String>,
) -> Result<Json<BooleanMessage>, ApiError> {
    let data = state
        .conferences
        .unregister_from_conference(&user.identity, &key)
        .await?;
    Ok(Json(BooleanMessage { data }))
}

/// Search conferences with field filters
#[utoipa::path(
    post,
    path = "/api/v1/conferences/query",
    tag = "conferences",
    request_body = QueryFiltersRequest,
    responses(
        (status = 200, description = "Matching conferences", body = ConferencesResponse),
        (status = 400, description = "Invalid filter, filter value or query")
    )
)]
pub async fn query_conferences(
    State(state): State<ConferencesApiState>,
    ValidatedJson(req): ValidatedJson<QueryFiltersRequest>,
) -> Result<Json<ConferencesResponse>, ApiError> {
    let conferences = state.conferences.query_conferences(&req.filters).await?;
    Ok(Json(conferences.into()))
}

/// Conferences created by the caller
#[utoipa::path(
    get,
    path = "/api/v1/conferences/created",
    tag = "conferences",
    responses(
        (status = 200, description = "Conferences organized by the caller", body = ConferencesResponse),
        (status = 401, description = "Authorization required")
    )
)]
pub async fn get_conferences_created(
    State(state): State<ConferencesApiState>,
    user: CurrentUser,
) -> Result<Json<ConferencesResponse>, ApiError> {
    let conferences = state
        .conferences
        .get_conferences_created(&user.identity)
        .await?;
    Ok(Json(conferences.into()))
}

/// Conferences the caller registered for
#[utoipa::path(
    get,
    path = "/api/v1/conferences/attending",
    tag = "conferences",
    responses(
        (status = 200, description = "Conferences the caller attends", body = ConferencesResponse),
        (status = 401, description = "Authorization required")
    )
)]
pub async fn get_conferences_to_attend(
    State(state): State<ConferencesApiState>,
    user: CurrentUser,
) -> Result<Json<ConferencesResponse>, ApiError> {
    let conferences = state
        .conferences
        .get_conferences_to_attend(&user.identity)
        .await?;
    Ok(Json(conferences.into()))
}

/// Nearly-sold-out announcement
#[utoipa::path(
    get,
    path = "/api/v1/announcement",
    tag = "conferences",
    responses(
        (status = 200, description = "Cached announcement, empty when none", body = StringMessage)
    )
)]
pub async fn get_announcement(
    State(state): State<ConferencesApiState>,
) -> Result<Json<StringMessage>, ApiError> {
    let data = state.announcements.get_announcement().await?;
    Ok(Json(StringMessage { data }))
}
