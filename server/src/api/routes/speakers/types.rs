//! Speaker API types

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::data::types::{Keyed, Speaker};
use crate::domain::SpeakerForm;

/// Speaker DTO for API responses
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SpeakerDto {
    pub websafe_key: String,
    pub name: String,
    pub email: String,
}

impl From<Keyed<Speaker>> for SpeakerDto {
    fn from(s: Keyed<Speaker>) -> Self {
        Self {
            websafe_key: s.key.to_websafe(),
            name: s.entity.name,
            email: s.entity.email,
        }
    }
}

/// List of speakers
#[derive(Debug, Serialize, ToSchema)]
pub struct SpeakersResponse {
    pub items: Vec<SpeakerDto>,
}

impl From<Vec<Keyed<Speaker>>> for SpeakersResponse {
    fn from(speakers: Vec<Keyed<Speaker>>) -> Self {
        Self {
            items: speakers.into_iter().map(SpeakerDto::from).collect(),
        }
    }
}

/// Request body for creating a speaker
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct SpeakerRequest {
    #[validate(length(max = 200, message = "Name must be at most 200 characters"))]
    pub name: Option<String>,
    #[validate(email(message = "Email must be a valid address"))]
    pub email: Option<String>,
}

impl From<SpeakerRequest> for SpeakerForm {
    fn from(req: SpeakerRequest) -> Self {
        Self {
            name: req.name,
            email: req.email,
        }
    }
}
