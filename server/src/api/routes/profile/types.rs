//! Profile API types

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::data::types::{Keyed, Profile, TeeShirtSize};
use crate::domain::ProfileForm;

/// Profile DTO for API responses
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProfileDto {
    pub display_name: String,
    pub main_email: String,
    pub tee_shirt_size: TeeShirtSize,
    pub conference_keys_to_attend: Vec<String>,
}

impl From<Keyed<Profile>> for ProfileDto {
    fn from(p: Keyed<Profile>) -> Self {
        Self {
            display_name: p.entity.display_name,
            main_email: p.entity.main_email,
            tee_shirt_size: p.entity.tee_shirt_size,
            conference_keys_to_attend: p.entity.conference_keys_to_attend,
        }
    }
}

/// Request body for updating the caller's profile
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProfileRequest {
    #[validate(length(max = 100, message = "Display name must be at most 100 characters"))]
    pub display_name: Option<String>,
    pub tee_shirt_size: Option<TeeShirtSize>,
}

impl From<ProfileRequest> for ProfileForm {
    fn from(req: ProfileRequest) -> Self {
        Self {
            display_name: req.display_name,
            tee_shirt_size: req.tee_shirt_size,
        }
    }
}
