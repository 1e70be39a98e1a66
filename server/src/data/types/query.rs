//! Store-level query model
//!
//! A `Query` selects documents of one kind, optionally scoped to the
//! descendants of an ancestor key, constrained by typed property filters
//! that are all ANDed together.

use std::fmt;

use crate::data::error::DataError;
use crate::data::keys::{EntityKey, Kind};

/// Comparison applied by a property filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Comparison {
    Eq,
    Ne,
    Gt,
    Ge,
    Lt,
    Le,
}

impl Comparison {
    pub fn symbol(&self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::Ne => "!=",
            Self::Gt => ">",
            Self::Ge => ">=",
            Self::Lt => "<",
            Self::Le => "<=",
        }
    }

    pub fn from_symbol(symbol: &str) -> Option<Self> {
        match symbol {
            "=" => Some(Self::Eq),
            "!=" => Some(Self::Ne),
            ">" => Some(Self::Gt),
            ">=" => Some(Self::Ge),
            "<" => Some(Self::Lt),
            "<=" => Some(Self::Le),
            _ => None,
        }
    }

    /// Everything except `=` is an inequality for the store, including `!=`
    pub fn is_inequality(&self) -> bool {
        !matches!(self, Self::Eq)
    }
}

impl fmt::Display for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Typed filter operand. Dates and times travel as their canonical
/// zero-padded text, which orders the same way the values do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropertyValue {
    Text(String),
    Integer(i64),
}

impl PropertyValue {
    pub fn is_empty_text(&self) -> bool {
        matches!(self, Self::Text(s) if s.is_empty())
    }
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => write!(f, "{:?}", s),
            Self::Integer(n) => write!(f, "{}", n),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyFilter {
    pub property: String,
    pub op: Comparison,
    pub value: PropertyValue,
}

impl PropertyFilter {
    pub fn new(property: impl Into<String>, op: Comparison, value: PropertyValue) -> Self {
        Self {
            property: property.into(),
            op,
            value,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    pub kind: Kind,
    pub ancestor: Option<EntityKey>,
    pub filters: Vec<PropertyFilter>,
}

impl Query {
    pub fn new(kind: Kind) -> Self {
        Self {
            kind,
            ancestor: None,
            filters: Vec::new(),
        }
    }

    pub fn ancestor(mut self, key: EntityKey) -> Self {
        self.ancestor = Some(key);
        self
    }

    pub fn filter(mut self, property: impl Into<String>, op: Comparison, value: PropertyValue) -> Self {
        self.filters.push(PropertyFilter::new(property, op, value));
        self
    }

    /// The single property carrying inequality filters, if any.
    ///
    /// Fails when inequality filters span more than one property; such a
    /// query cannot be answered from one ordered index scan.
    pub fn inequality_property(&self) -> Result<Option<&str>, DataError> {
        let mut found: Option<&str> = None;
        for f in self.filters.iter().filter(|f| f.op.is_inequality()) {
            match found {
                None => found = Some(&f.property),
                Some(p) if p == f.property => {}
                Some(p) => {
                    return Err(DataError::invalid_query(format!(
                        "inequality filters are limited to one property per query, got '{}' and '{}'",
                        p, f.property
                    )));
                }
            }
        }
        Ok(found)
    }
}
