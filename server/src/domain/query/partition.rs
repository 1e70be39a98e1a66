//! Filter partitioning
//!
//! Equality filters always go to the datastore. Inequality filters are
//! grouped by property; the store accepts inequality constraints on a single
//! property per query, so only the first property (in input order) is pushed
//! down and the others are evaluated in memory.

use super::parser::ResolvedFilter;

#[derive(Debug, Default, PartialEq, Eq)]
pub struct FilterPartition {
    pub equality: Vec<ResolvedFilter>,
    /// Inequality filters of the chosen property (empty when there is none)
    pub pushdown: Vec<ResolvedFilter>,
    /// Remaining inequality filters, grouped by property in input order
    pub deferred: Vec<Vec<ResolvedFilter>>,
}

impl FilterPartition {
    pub fn pushdown_property(&self) -> Option<&'static str> {
        self.pushdown.first().map(|f| f.field.property)
    }

    pub fn deferred_len(&self) -> usize {
        self.deferred.iter().map(Vec::len).sum()
    }
}

pub fn partition(filters: Vec<ResolvedFilter>) -> FilterPartition {
    let mut equality = Vec::new();
    let mut groups: Vec<Vec<ResolvedFilter>> = Vec::new();

    for filter in filters {
        if !filter.op.is_inequality() {
            equality.push(filter);
            continue;
        }
        match groups
            .iter_mut()
            .find(|g| g[0].field.property == filter.field.property)
        {
            Some(group) => group.push(filter),
            None => groups.push(vec![filter]),
        }
    }

    let mut groups = groups.into_iter();
    let pushdown = groups.next().unwrap_or_default();
    FilterPartition {
        equality,
        pushdown,
        deferred: groups.collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::query::fields::SESSION_FIELDS;
    use crate::domain::query::parser::{RawFilter, parse_filters};

    fn resolve(raw: &[(&str, &str, &str)]) -> Vec<ResolvedFilter> {
        let raw: Vec<RawFilter> = raw
            .iter()
            .map(|(f, o, v)| RawFilter::new(f, o, v))
            .collect();
        parse_filters(&raw, SESSION_FIELDS).unwrap()
    }

    #[test]
    fn test_equality_only_never_defers() {
        let p = partition(resolve(&[("TYPE", "EQ", "WORKSHOP"), ("LOCATION", "EQ", "Hall A")]));
        assert_eq!(p.equality.len(), 2);
        assert!(p.pushdown.is_empty());
        assert!(p.deferred.is_empty());
        assert_eq!(p.pushdown_property(), None);
    }

    #[test]
    fn test_single_inequality_field_fully_pushed_down() {
        let p = partition(resolve(&[
            ("TIME", "GT", "09:00:00"),
            ("TYPE", "EQ", "WORKSHOP"),
            ("TIME", "LT", "17:00:00"),
        ]));
        assert_eq!(p.equality.len(), 1);
        assert_eq!(p.pushdown.len(), 2);
        assert_eq!(p.pushdown_property(), Some("startTime"));
        assert_eq!(p.deferred_len(), 0);
    }

    #[test]
    fn test_ne_counts_as_inequality() {
        let p = partition(resolve(&[("TYPE", "NE", "KEYNOTE")]));
        assert!(p.equality.is_empty());
        assert_eq!(p.pushdown_property(), Some("typeOfSession"));
    }

    #[test]
    fn test_first_inequality_field_wins() {
        let p = partition(resolve(&[
            ("DURATION", "LTEQ", "60"),
            ("TIME", "GT", "12:00:00"),
            ("DATE", "GTEQ", "2026-05-01"),
            ("DURATION", "GT", "10"),
        ]));
        assert_eq!(p.pushdown_property(), Some("duration"));
        assert_eq!(p.pushdown.len(), 2);
        let deferred: Vec<_> = p.deferred.iter().map(|g| g[0].field.property).collect();
        assert_eq!(deferred, vec!["startTime", "date"]);
    }

    #[test]
    fn test_no_filter_lost_or_duplicated() {
        let input = resolve(&[
            ("TYPE", "EQ", "WORKSHOP"),
            ("TIME", "GT", "12:00:00"),
            ("DURATION", "LT", "90"),
            ("NAME", "NE", ""),
            ("TIME", "LT", "18:00:00"),
            ("HIGHLIGHTS", "EQ", "rust"),
        ]);
        let p = partition(input.clone());

        let mut out: Vec<ResolvedFilter> = p.equality.clone();
        out.extend(p.pushdown.clone());
        out.extend(p.deferred.iter().flatten().cloned());
        assert_eq!(out.len(), input.len());
        for f in &input {
            assert_eq!(
                out.iter().filter(|o| *o == f).count(),
                input.iter().filter(|i| *i == f).count()
            );
        }
        // Each deferred group holds one property, distinct from the pushdown one
        for group in &p.deferred {
            assert!(group.iter().all(|f| f.field.property == group[0].field.property));
            assert_ne!(Some(group[0].field.property), p.pushdown_property());
        }
    }

    #[test]
    fn test_deterministic() {
        let raw = [("TIME", "GT", "12:00:00"), ("DURATION", "LT", "90")];
        assert_eq!(partition(resolve(&raw)), partition(resolve(&raw)));
    }
}
