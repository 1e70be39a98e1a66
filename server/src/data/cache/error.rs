//! Cache error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CacheError {
    #[error("Cache configuration error: {0}")]
    Config(String),

    #[error("Cached value could not be encoded or decoded: {0}")]
    Serialization(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(
            CacheError::Config("max_entries must be positive".to_string()).to_string(),
            "Cache configuration error: max_entries must be positive"
        );
        assert!(
            CacheError::Serialization("eof".to_string())
                .to_string()
                .ends_with(": eof")
        );
    }
}
