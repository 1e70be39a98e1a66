//! Query evaluation errors

use thiserror::Error;

use crate::data::DataError;

/// Errors raised while parsing, planning or running a filtered query.
/// All are terminal for the call; nothing is retried.
#[derive(Error, Debug)]
pub enum QueryError {
    /// Unknown field or operator token
    #[error("Filter contains invalid field or operator: {field} {operator}")]
    InvalidFilter { field: String, operator: String },

    /// Filter value does not parse as the field's native type
    #[error("Invalid value '{value}' for {field}: expected {expected}")]
    TypeCoercion {
        field: String,
        value: String,
        expected: &'static str,
    },

    /// Raised by the datastore, surfaced unchanged
    #[error("Datastore query failed: {0}")]
    Datastore(#[from] DataError),
}
