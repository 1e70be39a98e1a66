//! Shared API types
//!
//! Common types used across all API endpoints: the JSON error envelope,
//! service error mapping and shared body validators.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

use crate::core::constants::MAX_QUERY_FILTERS;
use crate::data::DataError;
use crate::domain::ServiceError;
use crate::domain::query::{QueryError, RawFilter};

/// Maximum length of a filter value
pub const MAX_FILTER_VALUE_LENGTH: usize = 256;

/// Validator function for filter lists in query bodies
pub fn validate_filters<T: AsRef<[RawFilter]>>(filters: T) -> Result<(), ValidationError> {
    let filters = filters.as_ref();
    if filters.len() > MAX_QUERY_FILTERS {
        return Err(ValidationError::new("filters_too_many").with_message(
            format!("Cannot apply more than {} filters at once", MAX_QUERY_FILTERS).into(),
        ));
    }
    if filters
        .iter()
        .any(|f| f.value.len() > MAX_FILTER_VALUE_LENGTH)
    {
        return Err(ValidationError::new("filter_value_too_long").with_message(
            format!(
                "Filter value too long (max {} chars)",
                MAX_FILTER_VALUE_LENGTH
            )
            .into(),
        ));
    }
    Ok(())
}

/// Body of the `.../query` endpoints: filters are ANDed together
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct QueryFiltersRequest {
    #[serde(default)]
    #[validate(custom(function = "validate_filters"))]
    pub filters: Vec<RawFilter>,
}

/// Single string payload (`{"data": "..."}`) used by announcement endpoints
#[derive(Debug, Serialize, ToSchema)]
pub struct StringMessage {
    pub data: String,
}

/// Boolean payload (`{"data": true}`)
#[derive(Debug, Serialize, ToSchema)]
pub struct BooleanMessage {
    pub data: bool,
}

/// Standard API error response
#[derive(Debug)]
pub enum ApiError {
    BadRequest { code: String, message: String },
    NotFound { code: String, message: String },
    Forbidden { code: String, message: String },
    Conflict { code: String, message: String },
    Internal { message: String },
}

impl ApiError {
    pub fn bad_request(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::BadRequest {
            code: code.into(),
            message: message.into(),
        }
    }

    pub fn not_found(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::NotFound {
            code: code.into(),
            message: message.into(),
        }
    }

    pub fn forbidden(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Forbidden {
            code: code.into(),
            message: message.into(),
        }
    }

    pub fn conflict(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Conflict {
            code: code.into(),
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    pub fn from_data(e: DataError) -> Self {
        match e {
            DataError::InvalidQuery(message) => Self::bad_request("INVALID_QUERY", message),
            e => {
                tracing::error!(error = %e, backend = ?e.backend(), "Data error");
                Self::internal("Database operation failed")
            }
        }
    }

    pub fn from_query(e: QueryError) -> Self {
        match e {
            e @ QueryError::InvalidFilter { .. } => {
                Self::bad_request("INVALID_FILTER", e.to_string())
            }
            e @ QueryError::TypeCoercion { .. } => {
                Self::bad_request("INVALID_FILTER_VALUE", e.to_string())
            }
            QueryError::Datastore(e) => Self::from_data(e),
        }
    }
}

impl From<ServiceError> for ApiError {
    fn from(e: ServiceError) -> Self {
        match e {
            ServiceError::NotFound(message) => Self::not_found("NOT_FOUND", message),
            ServiceError::Forbidden(message) => Self::forbidden("FORBIDDEN", message),
            ServiceError::Conflict(message) => Self::conflict("CONFLICT", message),
            ServiceError::BadRequest(message) => Self::bad_request("BAD_REQUEST", message),
            ServiceError::Query(e) => Self::from_query(e),
            ServiceError::Data(e) => Self::from_data(e),
            ServiceError::Cache(e) => {
                tracing::error!(error = %e, "Cache error");
                Self::internal("Cache operation failed")
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type, code, message) = match self {
            Self::BadRequest { code, message } => {
                (StatusCode::BAD_REQUEST, "bad_request", code, message)
            }
            Self::NotFound { code, message } => (StatusCode::NOT_FOUND, "not_found", code, message),
            Self::Forbidden { code, message } => {
                (StatusCode::FORBIDDEN, "forbidden", code, message)
            }
            Self::Conflict { code, message } => (StatusCode::CONFLICT, "conflict", code, message),
            Self::Internal { message } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
                "INTERNAL".to_string(),
                message,
            ),
        };
        (
            status,
            Json(serde_json::json!({
                "error": error_type,
                "code": code,
                "message": message
            })),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn code_of(err: ApiError) -> (StatusCode, String) {
        match err {
            ApiError::BadRequest { code, .. } => (StatusCode::BAD_REQUEST, code),
            ApiError::NotFound { code, .. } => (StatusCode::NOT_FOUND, code),
            ApiError::Forbidden { code, .. } => (StatusCode::FORBIDDEN, code),
            ApiError::Conflict { code, .. } => (StatusCode::CONFLICT, code),
            ApiError::Internal { .. } => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL".into()),
        }
    }

    #[test]
    fn test_query_errors_map_to_client_errors() {
        let invalid: ServiceError = QueryError::InvalidFilter {
            field: "BOGUS".into(),
            operator: "EQ".into(),
        }
        .into();
        assert_eq!(
            code_of(invalid.into()),
            (StatusCode::BAD_REQUEST, "INVALID_FILTER".to_string())
        );

        let coercion: ServiceError = QueryError::TypeCoercion {
            field: "TIME".into(),
            value: "noon".into(),
            expected: "a time (HH:MM:SS)",
        }
        .into();
        assert_eq!(
            code_of(coercion.into()),
            (StatusCode::BAD_REQUEST, "INVALID_FILTER_VALUE".to_string())
        );

        let rejected: ServiceError =
            QueryError::Datastore(DataError::invalid_query("two properties")).into();
        assert_eq!(
            code_of(rejected.into()),
            (StatusCode::BAD_REQUEST, "INVALID_QUERY".to_string())
        );
    }

    #[test]
    fn test_service_errors_map_to_status() {
        assert_eq!(
            code_of(ServiceError::not_found("No conference found with key: x").into()).0,
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            code_of(ServiceError::forbidden("Only the owner can update the conference.").into()).0,
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            code_of(ServiceError::conflict("Session is already in your wishlist").into()).0,
            StatusCode::CONFLICT
        );
        let internal: ServiceError = DataError::Sqlite(sqlx::Error::PoolClosed).into();
        assert_eq!(code_of(internal.into()).0, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_validate_filters() {
        let ok = vec![RawFilter::new("CITY", "EQ", "London")];
        assert!(validate_filters(&ok).is_ok());

        let too_many = vec![RawFilter::new("CITY", "EQ", "London"); MAX_QUERY_FILTERS + 1];
        assert!(validate_filters(&too_many).is_err());

        let long = vec![RawFilter::new("CITY", "EQ", &"x".repeat(MAX_FILTER_VALUE_LENGTH + 1))];
        assert!(validate_filters(&long).is_err());
    }

    #[tokio::test]
    async fn test_error_envelope() {
        let response = ApiError::conflict("CONFLICT", "There are no seats available.").into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);
        let bytes = axum::body::to_bytes(response.into_body(), 1024).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"], "conflict");
        assert_eq!(body["code"], "CONFLICT");
        assert_eq!(body["message"], "There are no seats available.");
    }
}
