//! Field and operator allow-lists
//!
//! Each searchable kind exposes a fixed set of field tokens. A token maps to
//! the stored property name and the native type used when comparing it.

use crate::data::types::Comparison;

/// Native comparison type of a filterable property
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Integer,
    /// `YYYY-MM-DD`
    Date,
    /// `HH:MM:SS`
    Time,
}

impl FieldKind {
    pub fn expected(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Integer => "an integer",
            Self::Date => "a date (YYYY-MM-DD)",
            Self::Time => "a time (HH:MM:SS)",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub token: &'static str,
    pub property: &'static str,
    pub kind: FieldKind,
}

const fn field(token: &'static str, property: &'static str, kind: FieldKind) -> FieldSpec {
    FieldSpec {
        token,
        property,
        kind,
    }
}

/// Session search fields
pub const SESSION_FIELDS: &[FieldSpec] = &[
    field("TYPE", "typeOfSession", FieldKind::Text),
    field("TIME", "startTime", FieldKind::Time),
    field("DATE", "date", FieldKind::Date),
    field("DURATION", "duration", FieldKind::Integer),
    field("LOCATION", "location", FieldKind::Text),
    field("NAME", "name", FieldKind::Text),
    field("HIGHLIGHTS", "highlights", FieldKind::Text),
    field("SPEAKER", "speakerKey", FieldKind::Text),
];

/// Conference search fields
pub const CONFERENCE_FIELDS: &[FieldSpec] = &[
    field("CITY", "city", FieldKind::Text),
    field("TOPIC", "topics", FieldKind::Text),
    field("MONTH", "month", FieldKind::Integer),
    field("MAX_ATTENDEES", "maxAttendees", FieldKind::Integer),
];

/// Operator tokens accepted from clients
pub const OPERATORS: &[(&str, Comparison)] = &[
    ("EQ", Comparison::Eq),
    ("GT", Comparison::Gt),
    ("GTEQ", Comparison::Ge),
    ("LT", Comparison::Lt),
    ("LTEQ", Comparison::Le),
    ("NE", Comparison::Ne),
];

pub fn lookup_field(fields: &[FieldSpec], token: &str) -> Option<FieldSpec> {
    fields.iter().find(|f| f.token == token).copied()
}

pub fn lookup_operator(token: &str) -> Option<Comparison> {
    OPERATORS
        .iter()
        .find(|(t, _)| *t == token)
        .map(|(_, op)| *op)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_field() {
        let time = lookup_field(SESSION_FIELDS, "TIME").unwrap();
        assert_eq!(time.property, "startTime");
        assert_eq!(time.kind, FieldKind::Time);
        assert!(lookup_field(SESSION_FIELDS, "CITY").is_none());
        assert!(lookup_field(SESSION_FIELDS, "time").is_none());
    }

    #[test]
    fn test_operator_symbols() {
        let symbols: Vec<_> = OPERATORS
            .iter()
            .map(|(t, op)| (*t, op.symbol()))
            .collect();
        assert_eq!(
            symbols,
            vec![
                ("EQ", "="),
                ("GT", ">"),
                ("GTEQ", ">="),
                ("LT", "<"),
                ("LTEQ", "<="),
                ("NE", "!="),
            ]
        );
        assert!(lookup_operator("LIKE").is_none());
    }

    #[test]
    fn test_tokens_are_unique() {
        for fields in [SESSION_FIELDS, CONFERENCE_FIELDS] {
            for (i, a) in fields.iter().enumerate() {
                assert!(fields[i + 1..].iter().all(|b| b.token != a.token));
            }
        }
    }
}
