//! API server initialization

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::get;
use tokio::net::TcpListener;
use tower_http::compression::CompressionLayer;

use super::auth::{AuthManager, AuthState, resolve_identity};
use super::middleware::{self, AllowedOrigins};
use super::openapi::{openapi_json, swagger_ui_html};
use super::routes::{conferences, health, profile, sessions, speakers, wishlist};
use crate::core::CoreApp;
use crate::core::constants::DEFAULT_BODY_LIMIT;
use crate::domain::Services;

pub struct ApiServer {
    app: CoreApp,
    allowed_origins: AllowedOrigins,
}

impl ApiServer {
    pub fn new(app: CoreApp) -> Self {
        let allowed_origins = AllowedOrigins::new(&app.config.server);
        Self {
            app,
            allowed_origins,
        }
    }

    /// Returns CoreApp for graceful shutdown
    pub async fn start(self) -> Result<CoreApp> {
        let Self {
            app,
            allowed_origins,
        } = self;

        let shutdown = app.shutdown.clone();
        let addr = SocketAddr::new(app.config.server.host.parse()?, app.config.server.port);

        let router = build_router(&app.services, app.auth.clone(), &allowed_origins);

        let listener = TcpListener::bind(addr).await?;
        tracing::info!(
            address = %addr,
            auth = app.auth.is_enabled(),
            data_dir = %app.storage.data_dir().display(),
            "Conference API listening"
        );

        axum::serve(
            listener,
            router.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(shutdown.wait())
        .await?;

        Ok(app)
    }
}

/// Assemble the full HTTP router over the domain services
pub(crate) fn build_router(
    services: &Services,
    auth_manager: Arc<AuthManager>,
    allowed_origins: &AllowedOrigins,
) -> Router {
    let api_routes = Router::new()
        .route("/health", get(health::health))
        .merge(conferences::routes(
            services.conferences.clone(),
            services.announcements.clone(),
        ))
        .merge(sessions::routes(services.sessions.clone()))
        .merge(speakers::routes(services.speakers.clone()))
        .merge(wishlist::routes(services.wishlist.clone()))
        .merge(profile::routes(services.profiles.clone()))
        .layer(axum::middleware::from_fn_with_state(
            AuthState { auth_manager },
            resolve_identity,
        ));

    Router::new()
        .route("/api/openapi.json", get(openapi_json))
        .route("/api/docs", get(swagger_ui_html))
        .nest("/api/v1", api_routes)
        .fallback(middleware::handle_404)
        .layer(CompressionLayer::new())
        .layer(middleware::cors(allowed_origins))
        .layer(DefaultBodyLimit::max(DEFAULT_BODY_LIMIT))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode, header};
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use crate::core::config::{AuthConfig, CacheConfig, EvictionPolicy, ServerConfig};
    use crate::data::SqliteService;
    use crate::data::cache::CacheService;
    use crate::domain::TaskQueue;

    const SECRET: &str = "router-test-secret";

    struct Harness {
        router: Router,
        auth: Arc<AuthManager>,
        // Keeps the task channel open so enqueue does not warn
        _tasks: tokio::sync::mpsc::Receiver<crate::domain::Task>,
    }

    async fn harness(auth_enabled: bool) -> Harness {
        let store = Arc::new(SqliteService::in_memory().await);
        let cache = Arc::new(
            CacheService::new(&CacheConfig {
                max_entries: 100,
                eviction_policy: EvictionPolicy::TinyLfu,
            })
            .unwrap(),
        );
        let (tasks, rx) = TaskQueue::new(16);
        let services = Services::new(store, cache, tasks);
        let auth = Arc::new(AuthManager::new(&AuthConfig {
            enabled: auth_enabled,
            jwt_secret: SECRET.to_string(),
        }));
        let origins = AllowedOrigins::new(&ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 8080,
        });
        Harness {
            router: build_router(&services, auth.clone(), &origins),
            auth,
            _tasks: rx,
        }
    }

    async fn send(
        router: &Router,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut req = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            req = req.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let req = match body {
            Some(body) => req
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => req.body(Body::empty()).unwrap(),
        };
        let response = router.clone().oneshot(req).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), 1 << 20)
            .await
            .unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    #[tokio::test]
    async fn test_health() {
        let h = harness(true).await;
        let (status, body) = send(&h.router, "GET", "/api/v1/health", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn test_mutation_requires_identity() {
        let h = harness(true).await;
        let (status, body) = send(
            &h.router,
            "POST",
            "/api/v1/conference",
            None,
            Some(json!({"name": "RustConf"})),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["code"], "AUTH_REQUIRED");
    }

    #[tokio::test]
    async fn test_bad_token_rejected() {
        let h = harness(true).await;
        let (status, body) =
            send(&h.router, "GET", "/api/v1/profile", Some("garbage"), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["code"], "TOKEN_INVALID");
    }

    #[tokio::test]
    async fn test_conference_session_search_flow() {
        let h = harness(true).await;
        let token = h.auth.issue_token("u1", "ada@example.com").unwrap();

        let (status, conference) = send(
            &h.router,
            "POST",
            "/api/v1/conference",
            Some(&token),
            Some(json!({"name": "RustConf", "city": "Portland", "maxAttendees": 10})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(conference["seatsAvailable"], 10);
        let key = conference["websafeKey"].as_str().unwrap().to_string();

        for (name, kind, time) in [
            ("A", "WORKSHOP", "10:00:00"),
            ("B", "WORKSHOP", "14:00:00"),
            ("C", "LECTURE", "15:00:00"),
        ] {
            let (status, _) = send(
                &h.router,
                "POST",
                &format!("/api/v1/conference/{}/sessions", key),
                Some(&token),
                Some(json!({"name": name, "typeOfSession": kind, "startTime": time})),
            )
            .await;
            assert_eq!(status, StatusCode::CREATED);
        }

        let (status, found) = send(
            &h.router,
            "POST",
            "/api/v1/sessions/query",
            None,
            Some(json!({"filters": [
                {"field": "TYPE", "operator": "EQ", "value": "WORKSHOP"},
                {"field": "TIME", "operator": "GT", "value": "12:00:00"}
            ]})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let names: Vec<&str> = found["items"]
            .as_array()
            .unwrap()
            .iter()
            .map(|s| s["name"].as_str().unwrap())
            .collect();
        assert_eq!(names, vec!["B"]);
    }

    #[tokio::test]
    async fn test_invalid_filter_is_400() {
        let h = harness(false).await;
        let (status, body) = send(
            &h.router,
            "POST",
            "/api/v1/sessions/query",
            None,
            Some(json!({"filters": [{"field": "BOGUS", "operator": "EQ", "value": "x"}]})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "INVALID_FILTER");

        let (status, body) = send(
            &h.router,
            "POST",
            "/api/v1/sessions/query",
            None,
            Some(json!({"filters": [
                {"field": "TYPE", "operator": "NE", "value": "LECTURE"},
                {"field": "TIME", "operator": "GT", "value": "noon"}
            ]})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "INVALID_FILTER_VALUE");
    }

    #[tokio::test]
    async fn test_no_auth_mode_acts_as_local_user() {
        let h = harness(false).await;
        let (status, profile) = send(&h.router, "GET", "/api/v1/profile", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(profile["mainEmail"], "local@localhost");
    }

    #[tokio::test]
    async fn test_unknown_key_is_404() {
        let h = harness(false).await;
        let (status, body) =
            send(&h.router, "GET", "/api/v1/conference/not-a-key", None, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_unknown_route_is_404() {
        let h = harness(false).await;
        let (status, body) = send(&h.router, "GET", "/api/v1/nope", None, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], "ROUTE_NOT_FOUND");
    }
}
