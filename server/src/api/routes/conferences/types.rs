//! Conference API types

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::data::types::{Conference, Keyed};
use crate::domain::ConferenceForm;

/// Conference DTO for API responses
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConferenceDto {
    pub websafe_key: String,
    pub name: String,
    pub description: Option<String>,
    pub organizer_user_id: String,
    pub topics: Vec<String>,
    pub city: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub month: i64,
    pub end_date: Option<NaiveDate>,
    pub max_attendees: i64,
    pub seats_available: i64,
}

impl From<Keyed<Conference>> for ConferenceDto {
    fn from(c: Keyed<Conference>) -> Self {
        Self {
            websafe_key: c.key.to_websafe(),
            name: c.entity.name,
            description: c.entity.description,
            organizer_user_id: c.entity.organizer_user_id,
            topics: c.entity.topics,
            city: c.entity.city,
            start_date: c.entity.start_date,
            month: c.entity.month,
            end_date: c.entity.end_date,
            max_attendees: c.entity.max_attendees,
            seats_available: c.entity.seats_available,
        }
    }
}

/// List of conferences
#[derive(Debug, Serialize, ToSchema)]
pub struct ConferencesResponse {
    pub items: Vec<ConferenceDto>,
}

impl From<Vec<Keyed<Conference>>> for ConferencesResponse {
    fn from(conferences: Vec<Keyed<Conference>>) -> Self {
        Self {
            items: conferences.into_iter().map(ConferenceDto::from).collect(),
        }
    }
}

/// Request body for creating or updating a conference.
/// On update, only non-empty fields overwrite stored values.
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConferenceRequest {
    #[validate(length(max = 200, message = "Name must be at most 200 characters"))]
    pub name: Option<String>,
    #[validate(length(max = 2000, message = "Description must be at most 2000 characters"))]
    pub description: Option<String>,
    pub topics: Option<Vec<String>>,
    #[validate(length(max = 100, message = "City must be at most 100 characters"))]
    pub city: Option<String>,
    /// `YYYY-MM-DD`
    pub start_date: Option<String>,
    /// `YYYY-MM-DD`
    pub end_date: Option<String>,
    #[validate(range(min = 0, message = "maxAttendees must not be negative"))]
    pub max_attendees: Option<i64>,
}

impl From<ConferenceRequest> for ConferenceForm {
    fn from(req: ConferenceRequest) -> Self {
        Self {
            name: req.name,
            description: req.description,
            topics: req.topics,
            city: req.city,
            start_date: req.start_date,
            end_date: req.end_date,
            max_attendees: req.max_attendees,
        }
    }
}
