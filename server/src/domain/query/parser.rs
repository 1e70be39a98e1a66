//! Filter parsing against the allow-lists

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::error::QueryError;
use super::fields::{FieldSpec, lookup_field, lookup_operator};
use crate::data::types::Comparison;

/// Filter as supplied by a client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct RawFilter {
    /// Field token, e.g. `TYPE` or `TIME`
    pub field: String,
    /// Operator token: `EQ`, `GT`, `GTEQ`, `LT`, `LTEQ` or `NE`
    pub operator: String,
    #[serde(default)]
    pub value: String,
}

impl RawFilter {
    pub fn new(field: &str, operator: &str, value: &str) -> Self {
        Self {
            field: field.to_string(),
            operator: operator.to_string(),
            value: value.to_string(),
        }
    }
}

/// Filter after allow-list translation; the value is still raw text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedFilter {
    pub field: FieldSpec,
    pub op: Comparison,
    pub raw_value: String,
}

/// Resolve every filter, preserving input order.
/// Fails on the first unknown field or operator token.
pub fn parse_filters(
    raw: &[RawFilter],
    fields: &[FieldSpec],
) -> Result<Vec<ResolvedFilter>, QueryError> {
    raw.iter()
        .map(|f| {
            let field = lookup_field(fields, &f.field);
            let op = lookup_operator(&f.operator);
            match (field, op) {
                (Some(field), Some(op)) => Ok(ResolvedFilter {
                    field,
                    op,
                    raw_value: f.value.clone(),
                }),
                _ => Err(QueryError::InvalidFilter {
                    field: f.field.clone(),
                    operator: f.operator.clone(),
                }),
            }
        })
        .collect()
}
