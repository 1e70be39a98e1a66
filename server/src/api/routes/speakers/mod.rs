//! Speaker API endpoints

pub mod types;

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};

use types::{SpeakerDto, SpeakerRequest, SpeakersResponse};

use crate::api::auth::CurrentUser;
use crate::api::extractors::ValidatedJson;
use crate::api::types::{ApiError, StringMessage};
use crate::domain::SpeakerService;

/// Shared state for Speaker API endpoints
#[derive(Clone)]
pub struct SpeakersApiState {
    pub speakers: Arc<SpeakerService>,
}

/// Build Speaker API routes
pub fn routes(speakers: Arc<SpeakerService>) -> Router<()> {
    let state = SpeakersApiState { speakers };

    Router::new()
        .route("/speaker", get(get_speakers).post(create_speaker))
        .route("/speaker/featured", get(get_featured_speaker))
        .route("/conference/{key}/speakers", get(get_conference_speakers))
        .with_state(state)
}

/// Create a speaker
#[utoipa::path(
    post,
    path = "/api/v1/speaker",
    tag = "speakers",
    request_body = SpeakerRequest,
    responses(
        (status = 201, description = "Speaker created", body = SpeakerDto),
        (status = 400, description = "Missing name or email"),
        (status = 401, description = "Authorization required"),
        (status = 409, description = "A speaker with this email exists")
    )
)]
pub async fn create_speaker(
    State(state): State<SpeakersApiState>,
    _user: CurrentUser,
    ValidatedJson(req): ValidatedJson<SpeakerRequest>,
) -> Result<(StatusCode, Json<SpeakerDto>), ApiError> {
    let speaker = state.speakers.create_speaker(req.into()).await?;
    Ok((StatusCode::CREATED, Json(speaker.into())))
}

/// All speakers
#[utoipa::path(
    get,
    path = "/api/v1/speaker",
    tag = "speakers",
    responses((status = 200, description = "Speakers", body = SpeakersResponse))
)]
pub async fn get_speakers(
    State(state): State<SpeakersApiState>,
) -> Result<Json<SpeakersResponse>, ApiError> {
    let speakers = state.speakers.get_speakers().await?;
    Ok(Json(speakers.into()))
}

/// Current featured speaker announcement
#[utoipa::path(
    get,
    path = "/api/v1/speaker/featured",
    tag = "speakers",
    responses(
        (status = 200, description = "Cached announcement, empty when none", body = StringMessage)
    )
)]
pub async fn get_featured_speaker(
    State(state): State<SpeakersApiState>,
) -> Result<Json<StringMessage>, ApiError> {
    let data = state.speakers.get_featured_speaker().await?;
    Ok(Json(StringMessage { data }))
}

/// Distinct speakers of a conference's sessions
#[utoipa::path(
    get,
    path = "/api/v1/conference/{key}/speakers",
    tag = "speakers",
    params(("key" = String, Path, description = "Websafe conference key")),
    responses(
        (status = 200, description = "Speakers", body = SpeakersResponse),
        (status = 404, description = "Undecodable conference key")
    )
)]
pub async fn get_conference_speakers(
    State(state): State<SpeakersApiState>,
    Path(key): Path<String>,
) -> Result<Json<SpeakersResponse>, ApiError> {
    let speakers = state.speakers.get_conference_speakers(&key).await?;
    Ok(Json(speakers.into()))
}
