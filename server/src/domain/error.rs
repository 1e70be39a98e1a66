//! Service error type

use thiserror::Error;

use super::query::QueryError;
use crate::data::DataError;
use crate::data::cache::CacheError;

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    BadRequest(String),

    #[error(transparent)]
    Query(#[from] QueryError),

    #[error(transparent)]
    Data(#[from] DataError),

    #[error(transparent)]
    Cache(#[from] CacheError),
}

impl ServiceError {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict(message.into())
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_pass_through() {
        assert_eq!(
            ServiceError::conflict("You have already registered for this conference").to_string(),
            "You have already registered for this conference"
        );
        let err: ServiceError = DataError::invalid_query("two properties").into();
        assert_eq!(err.to_string(), "Invalid query: two properties");
    }
}
