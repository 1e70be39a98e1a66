//! OpenAPI specification and Swagger UI

use axum::http::header;
use axum::response::{Html, IntoResponse, Json};
use utoipa::OpenApi;

use crate::api::routes::{conferences, health, profile, sessions, speakers, wishlist};
use crate::api::types::{BooleanMessage, QueryFiltersRequest, StringMessage};
use crate::data::types::{SessionType, TeeShirtSize};
use crate::domain::query::RawFilter;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Conference Central API",
        version = env!("CARGO_PKG_VERSION"),
        description = "Conference organization backend"
    ),
    tags(
        (name = "health", description = "Health check endpoint"),
        (name = "conferences", description = "Conferences, registration and announcements"),
        (name = "sessions", description = "Conference sessions and session search"),
        (name = "speakers", description = "Speakers and the featured speaker"),
        (name = "wishlist", description = "Per-user session wishlist"),
        (name = "profile", description = "Caller profile")
    ),
    paths(
        // Health
        health::health,
        // Conferences
        conferences::create_conference,
        conferences::get_conference,
        conferences::update_conference,
        conferences::register_for_conference,
        conferences::unregister_from_conference,
        conferences::query_conferences,
        conferences::get_conferences_created,
        conferences::get_conferences_to_attend,
        conferences::get_announcement,
        // Sessions
        sessions::create_session,
        sessions::get_conference_sessions,
        sessions::get_conference_sessions_by_type,
        sessions::query_conference_sessions,
        sessions::query_sessions,
        sessions::get_sessions_by_speaker,
        sessions::get_sessions_by_conference_speaker,
        // Speakers
        speakers::create_speaker,
        speakers::get_speakers,
        speakers::get_featured_speaker,
        speakers::get_conference_speakers,
        // Wishlist
        wishlist::get_sessions_in_wishlist,
        wishlist::add_session_to_wishlist,
        wishlist::delete_session_in_wishlist,
        // Profile
        profile::get_profile,
        profile::save_profile,
    ),
    components(schemas(
        // API types
        RawFilter,
        QueryFiltersRequest,
        StringMessage,
        BooleanMessage,
        SessionType,
        TeeShirtSize,
        // Health
        health::HealthResponse,
        // Conferences
        conferences::types::ConferenceDto,
        conferences::types::ConferencesResponse,
        conferences::types::ConferenceRequest,
        // Sessions
        sessions::types::SessionDto,
        sessions::types::SessionsResponse,
        sessions::types::SessionRequest,
        // Speakers
        speakers::types::SpeakerDto,
        speakers::types::SpeakersResponse,
        speakers::types::SpeakerRequest,
        // Wishlist
        wishlist::types::WishlistResponse,
        // Profile
        profile::types::ProfileDto,
        profile::types::ProfileRequest,
    ))
)]
pub struct ApiDoc;

/// Serve OpenAPI JSON specification
pub async fn openapi_json() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "application/json")],
        Json(ApiDoc::openapi()),
    )
}

/// Serve Swagger UI from CDN
pub async fn swagger_ui_html() -> Html<&'static str> {
    Html(SWAGGER_UI_HTML)
}

const SWAGGER_UI_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Conference Central API</title>
    <link rel="stylesheet" type="text/css" href="https://unpkg.com/swagger-ui-dist@5/swagger-ui.css">
</head>
<body>
    <div id="swagger-ui"></div>
    <script src="https://unpkg.com/swagger-ui-dist@5/swagger-ui-bundle.js"></script>
    <script>
        window.onload = () => {
            window.ui = SwaggerUIBundle({
                url: "/api/openapi.json",
                dom_id: '#swagger-ui',
                deepLinking: true
            });
        };
    </script>
</body>
</html>"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_lists_query_endpoints() {
        let doc = ApiDoc::openapi();
        let paths = &doc.paths.paths;
        assert!(paths.contains_key("/api/v1/sessions/query"));
        assert!(paths.contains_key("/api/v1/conferences/query"));
        assert!(paths.contains_key("/api/v1/conference/{key}/sessions/query"));
        assert!(paths.contains_key("/api/v1/wishlist/{key}"));
    }
}
