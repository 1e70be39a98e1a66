//! HTTP middleware (CORS, 404 handler)

use axum::extract::Request;
use axum::http::{HeaderValue, Method, header};
use axum::response::IntoResponse;
use tower_http::cors::{AllowOrigin, CorsLayer};

use super::types::ApiError;
use crate::core::config::{ServerConfig, is_all_interfaces};

/// Browser origins allowed to call the API
#[derive(Debug, Clone)]
pub struct AllowedOrigins {
    origins: Vec<String>,
}

impl AllowedOrigins {
    pub fn new(server: &ServerConfig) -> Self {
        let host = server.host.as_str();
        let port = server.port;
        let is_all = is_all_interfaces(host);

        let base_hosts: Vec<&str> = if is_all || host == "127.0.0.1" || host == "localhost" {
            vec!["localhost", "127.0.0.1"]
        } else {
            vec![host]
        };

        let mut origins: Vec<String> = base_hosts
            .iter()
            .flat_map(|h| [format!("http://{}:{}", h, port), format!("http://{}", h)])
            .collect();

        // LAN clients reach the server by interface address
        if is_all && let Ok(interfaces) = local_ip_address::list_afinet_netifas() {
            origins.extend(
                interfaces
                    .iter()
                    .filter(|(_, ip)| ip.is_ipv4() && !ip.is_loopback())
                    .map(|(_, ip)| format!("http://{}:{}", ip, port)),
            );
        }

        Self { origins }
    }

    pub fn is_allowed(&self, origin: &str) -> bool {
        self.origins.iter().any(|o| o == origin)
    }

    fn as_header_values(&self) -> Vec<HeaderValue> {
        self.origins.iter().filter_map(|o| o.parse().ok()).collect()
    }
}

/// Create CORS layer
pub fn cors(allowed: &AllowedOrigins) -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed.as_header_values()))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::ACCEPT])
}

/// Unknown route
pub async fn handle_404(req: Request) -> impl IntoResponse {
    tracing::debug!(method = %req.method(), uri = %req.uri(), "[404]");
    ApiError::not_found(
        "ROUTE_NOT_FOUND",
        format!("No route for {} {}", req.method(), req.uri().path()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn server(host: &str, port: u16) -> ServerConfig {
        ServerConfig {
            host: host.to_string(),
            port,
        }
    }

    #[test]
    fn test_loopback_allows_both_names() {
        let origins = AllowedOrigins::new(&server("127.0.0.1", 8080));
        assert!(origins.is_allowed("http://localhost:8080"));
        assert!(origins.is_allowed("http://127.0.0.1:8080"));
        assert!(!origins.is_allowed("http://evil.example:8080"));
    }

    #[test]
    fn test_named_host_only_allows_itself() {
        let origins = AllowedOrigins::new(&server("conf.internal", 9000));
        assert!(origins.is_allowed("http://conf.internal:9000"));
        assert!(!origins.is_allowed("http://localhost:9000"));
    }
}
