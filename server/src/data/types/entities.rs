//! Persisted conference entities
//!
//! Each struct is the JSON body of one document kind. Property names are
//! camelCase because they double as the property names filters refer to.

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

// ============================================================================
// Enums
// ============================================================================

/// Kind of a conference session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SessionType {
    #[default]
    NotSpecified,
    Lecture,
    Keynote,
    Workshop,
    Other,
}

impl SessionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotSpecified => "NOT_SPECIFIED",
            Self::Lecture => "LECTURE",
            Self::Keynote => "KEYNOTE",
            Self::Workshop => "WORKSHOP",
            Self::Other => "OTHER",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "NOT_SPECIFIED" => Some(Self::NotSpecified),
            "LECTURE" => Some(Self::Lecture),
            "KEYNOTE" => Some(Self::Keynote),
            "WORKSHOP" => Some(Self::Workshop),
            "OTHER" => Some(Self::Other),
            _ => None,
        }
    }
}

/// T-shirt size preference on a profile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default, ToSchema)]
pub enum TeeShirtSize {
    #[default]
    #[serde(rename = "NOT_SPECIFIED")]
    NotSpecified,
    #[serde(rename = "XS_M")]
    XsM,
    #[serde(rename = "XS_W")]
    XsW,
    #[serde(rename = "S_M")]
    SM,
    #[serde(rename = "S_W")]
    SW,
    #[serde(rename = "M_M")]
    MM,
    #[serde(rename = "M_W")]
    MW,
    #[serde(rename = "L_M")]
    LM,
    #[serde(rename = "L_W")]
    LW,
    #[serde(rename = "XL_M")]
    XlM,
    #[serde(rename = "XL_W")]
    XlW,
    #[serde(rename = "XXL_M")]
    XxlM,
    #[serde(rename = "XXL_W")]
    XxlW,
    #[serde(rename = "XXXL_M")]
    XxxlM,
    #[serde(rename = "XXXL_W")]
    XxxlW,
}

// ============================================================================
// Entities
// ============================================================================

/// User profile, keyed by user id at the root of the key space
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub display_name: String,
    pub main_email: String,
    #[serde(default)]
    pub tee_shirt_size: TeeShirtSize,
    /// Websafe keys of conferences the user registered for
    #[serde(default)]
    pub conference_keys_to_attend: Vec<String>,
}

/// Conference, child of its organizer's profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Conference {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub organizer_user_id: String,
    #[serde(default)]
    pub topics: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub month: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub max_attendees: i64,
    #[serde(default)]
    pub seats_available: i64,
}

/// Session, child of its conference
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub name: String,
    #[serde(default)]
    pub type_of_session: SessionType,
    /// Websafe key of the speaker
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speaker_key: Option<String>,
    #[serde(default)]
    pub highlights: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<NaiveTime>,
    /// Minutes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Speaker {
    pub name: String,
    pub email: String,
}

/// Per-user wishlist, child of the profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Wishlist {
    #[serde(default)]
    pub session_keys: Vec<String>,
}
