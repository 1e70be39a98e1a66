//! Value coercion and in-memory filter evaluation
//!
//! Filter values arrive as text and are coerced to the field's native type
//! before any comparison. Records are matched with datastore semantics:
//! repeated properties match when any element matches, and a value of the
//! wrong type never matches.

use std::cmp::Ordering;

use chrono::{NaiveDate, NaiveTime};
use serde_json::Value;

use super::error::QueryError;
use super::fields::{FieldKind, FieldSpec};
use super::parser::ResolvedFilter;
use crate::data::types::{Comparison, Document, PropertyFilter, PropertyValue};

const DATE_FORMAT: &str = "%Y-%m-%d";
const TIME_FORMAT: &str = "%H:%M:%S";

/// Filter operand in the field's native type
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterValue {
    Text(String),
    Integer(i64),
    Date(NaiveDate),
    Time(NaiveTime),
}

impl FilterValue {
    fn parse(kind: FieldKind, raw: &str) -> Option<Self> {
        match kind {
            FieldKind::Text => Some(Self::Text(raw.to_string())),
            FieldKind::Integer => raw.trim().parse().ok().map(Self::Integer),
            FieldKind::Date => NaiveDate::parse_from_str(raw, DATE_FORMAT)
                .ok()
                .map(Self::Date),
            FieldKind::Time => NaiveTime::parse_from_str(raw, TIME_FORMAT)
                .ok()
                .map(Self::Time),
        }
    }

    /// Read a stored scalar as `kind`. Stored times may carry fractional seconds.
    fn from_stored(kind: FieldKind, value: &Value) -> Option<Self> {
        match kind {
            FieldKind::Text => value.as_str().map(|s| Self::Text(s.to_string())),
            FieldKind::Integer => value.as_i64().map(Self::Integer),
            FieldKind::Date => value
                .as_str()
                .and_then(|s| NaiveDate::parse_from_str(s, DATE_FORMAT).ok())
                .map(Self::Date),
            FieldKind::Time => value
                .as_str()
                .and_then(|s| {
                    NaiveTime::parse_from_str(s, TIME_FORMAT)
                        .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M:%S%.f"))
                        .ok()
                })
                .map(Self::Time),
        }
    }

    fn compare(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Self::Text(a), Self::Text(b)) => Some(a.cmp(b)),
            (Self::Integer(a), Self::Integer(b)) => Some(a.cmp(b)),
            (Self::Date(a), Self::Date(b)) => Some(a.cmp(b)),
            (Self::Time(a), Self::Time(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }

    /// Store operand. Dates and times use their canonical zero-padded text.
    fn to_property_value(&self) -> PropertyValue {
        match self {
            Self::Text(s) => PropertyValue::Text(s.clone()),
            Self::Integer(n) => PropertyValue::Integer(*n),
            Self::Date(d) => PropertyValue::Text(d.format(DATE_FORMAT).to_string()),
            Self::Time(t) => PropertyValue::Text(t.format(TIME_FORMAT).to_string()),
        }
    }
}

/// Filter with its operand coerced. `target` is `None` for an empty
/// operand under `=`/`!=`, which tests for the absence of a value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoercedFilter {
    pub field: FieldSpec,
    pub op: Comparison,
    pub target: Option<FilterValue>,
}

pub fn coerce(filter: &ResolvedFilter) -> Result<CoercedFilter, QueryError> {
    let ResolvedFilter {
        field,
        op,
        raw_value,
    } = filter;

    if raw_value.is_empty() && matches!(op, Comparison::Eq | Comparison::Ne) {
        return Ok(CoercedFilter {
            field: *field,
            op: *op,
            target: None,
        });
    }

    let target = FilterValue::parse(field.kind, raw_value)
        // Empty text is a valid operand only for text fields
        .filter(|_| !raw_value.is_empty() || field.kind == FieldKind::Text)
        .ok_or_else(|| QueryError::TypeCoercion {
            field: field.token.to_string(),
            value: raw_value.clone(),
            expected: field.kind.expected(),
        })?;

    Ok(CoercedFilter {
        field: *field,
        op: *op,
        target: Some(target),
    })
}

pub fn coerce_all(filters: &[ResolvedFilter]) -> Result<Vec<CoercedFilter>, QueryError> {
    filters.iter().map(coerce).collect()
}

impl CoercedFilter {
    pub fn to_property_filter(&self) -> PropertyFilter {
        let value = self
            .target
            .as_ref()
            .map(FilterValue::to_property_value)
            .unwrap_or_else(|| PropertyValue::Text(String::new()));
        PropertyFilter::new(self.field.property, self.op, value)
    }

    pub fn matches(&self, doc: &Document) -> bool {
        let values = stored_values(doc.property(self.field.property));
        let empty = values.is_empty();

        if empty && !matches!(self.op, Comparison::Eq | Comparison::Ne) {
            return false;
        }

        let Some(target) = &self.target else {
            return match self.op {
                Comparison::Eq => empty,
                _ => !empty,
            };
        };

        if empty {
            return self.op == Comparison::Ne;
        }

        values.iter().any(|v| {
            FilterValue::from_stored(self.field.kind, v)
                .and_then(|stored| stored.compare(target))
                .is_some_and(|ord| apply(self.op, ord))
        })
    }
}

/// Non-empty scalars held by a property; lists are flattened one level
fn stored_values(value: Option<&Value>) -> Vec<&Value> {
    let scalars: Vec<&Value> = match value {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items.iter().collect(),
        Some(other) => vec![other],
    };
    scalars
        .into_iter()
        .filter(|v| !v.is_null() && v.as_str() != Some(""))
        .collect()
}

fn apply(op: Comparison, ord: Ordering) -> bool {
    match op {
        Comparison::Eq => ord == Ordering::Equal,
        Comparison::Ne => ord != Ordering::Equal,
        Comparison::Gt => ord == Ordering::Greater,
        Comparison::Ge => ord != Ordering::Less,
        Comparison::Lt => ord == Ordering::Less,
        Comparison::Le => ord != Ordering::Greater,
    }
}

/// Keep the records passing every filter, in their original order
pub fn evaluate(records: Vec<Document>, filters: &[CoercedFilter]) -> Vec<Document> {
    if filters.is_empty() {
        return records;
    }
    records
        .into_iter()
        .filter(|doc| filters.iter().all(|f| f.matches(doc)))
        .collect()
}
