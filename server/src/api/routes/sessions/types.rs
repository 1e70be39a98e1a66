//! Session API types

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::data::types::{Keyed, Session, SessionType};
use crate::domain::SessionForm;

/// Session DTO for API responses
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SessionDto {
    pub websafe_key: String,
    /// Websafe key of the owning conference
    pub conference_key: Option<String>,
    pub name: String,
    pub type_of_session: SessionType,
    pub speaker_key: Option<String>,
    pub highlights: Vec<String>,
    pub date: Option<NaiveDate>,
    pub location: Option<String>,
    /// `HH:MM:SS`
    pub start_time: Option<String>,
    /// Minutes
    pub duration: Option<i64>,
}

impl From<Keyed<Session>> for SessionDto {
    fn from(s: Keyed<Session>) -> Self {
        Self {
            websafe_key: s.key.to_websafe(),
            conference_key: s.key.parent().map(|p| p.to_websafe()),
            name: s.entity.name,
            type_of_session: s.entity.type_of_session,
            speaker_key: s.entity.speaker_key,
            highlights: s.entity.highlights,
            date: s.entity.date,
            location: s.entity.location,
            start_time: s
                .entity
                .start_time
                .map(|t| t.format("%H:%M:%S").to_string()),
            duration: s.entity.duration,
        }
    }
}

/// List of sessions
#[derive(Debug, Serialize, ToSchema)]
pub struct SessionsResponse {
    pub items: Vec<SessionDto>,
}

impl From<Vec<Keyed<Session>>> for SessionsResponse {
    fn from(sessions: Vec<Keyed<Session>>) -> Self {
        Self {
            items: sessions.into_iter().map(SessionDto::from).collect(),
        }
    }
}

/// Request body for creating a session
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SessionRequest {
    #[validate(length(max = 200, message = "Name must be at most 200 characters"))]
    pub name: Option<String>,
    #[serde(default)]
    pub highlights: Vec<String>,
    /// Websafe key of an existing speaker
    #[serde(alias = "websafeSpeakerKey")]
    pub speaker_key: Option<String>,
    #[validate(range(min = 0, message = "duration must not be negative"))]
    pub duration: Option<i64>,
    /// LECTURE, KEYNOTE, WORKSHOP, OTHER or NOT_SPECIFIED
    pub type_of_session: Option<String>,
    /// `YYYY-MM-DD`
    pub date: Option<String>,
    /// `HH:MM:SS`
    pub start_time: Option<String>,
    #[validate(length(max = 200, message = "Location must be at most 200 characters"))]
    pub location: Option<String>,
}

impl From<SessionRequest> for SessionForm {
    fn from(req: SessionRequest) -> Self {
        Self {
            name: req.name,
            highlights: req.highlights,
            speaker_key: req.speaker_key,
            duration: req.duration,
            type_of_session: req.type_of_session,
            date: req.date,
            start_time: req.start_time,
            location: req.location,
        }
    }
}

/// Path parameters for conference-speaker routes
#[derive(Debug, Deserialize)]
pub struct ConferenceSpeakerPath {
    pub key: String,
    pub speaker_key: String,
}

/// Path parameters for session-type routes
#[derive(Debug, Deserialize)]
pub struct SessionTypePath {
    pub key: String,
    pub type_of_session: String,
}
