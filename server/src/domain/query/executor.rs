//! Query planning and execution
//!
//! Every filter is coerced up front, so a malformed value fails before any
//! datastore round trip. Equality and pushdown filters are ANDed into one
//! store query; deferred filters run over the materialized result.

use super::error::QueryError;
use super::evaluator::{CoercedFilter, coerce_all, evaluate};
use super::partition::FilterPartition;
use crate::data::traits::DocumentStore;
use crate::data::types::{Document, Query};

#[derive(Debug, Clone, PartialEq)]
pub struct QueryPlan {
    pub query: Query,
    pub deferred: Vec<CoercedFilter>,
}

impl QueryPlan {
    pub fn build(base: Query, partition: &FilterPartition) -> Result<Self, QueryError> {
        let equality = coerce_all(&partition.equality)?;
        let pushdown = coerce_all(&partition.pushdown)?;
        let deferred = partition
            .deferred
            .iter()
            .map(|group| coerce_all(group))
            .collect::<Result<Vec<_>, _>>()?
            .into_iter()
            .flatten()
            .collect();

        let mut query = base;
        query.filters.extend(
            equality
                .iter()
                .chain(pushdown.iter())
                .map(CoercedFilter::to_property_filter),
        );

        Ok(Self { query, deferred })
    }

    /// Run the store query once, then apply the deferred filters
    pub async fn execute(&self, store: &dyn DocumentStore) -> Result<Vec<Document>, QueryError> {
        let records = store.run_query(&self.query).await?;
        let fetched = records.len();
        let out = evaluate(records, &self.deferred);

        tracing::debug!(
            kind = %self.query.kind,
            fetched,
            returned = out.len(),
            deferred = self.deferred.len(),
            "Filtered query executed"
        );
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::keys::Kind;
    use crate::data::types::{Comparison, PropertyValue};
    use crate::domain::query::fields::SESSION_FIELDS;
    use crate::domain::query::parser::{RawFilter, parse_filters};
    use crate::domain::query::partition::partition;

    fn plan(raw: &[RawFilter]) -> Result<QueryPlan, QueryError> {
        let parsed = parse_filters(raw, SESSION_FIELDS)?;
        QueryPlan::build(Query::new(Kind::Session), &partition(parsed))
    }

    #[test]
    fn test_plan_pushes_equality_and_first_inequality() {
        let plan = plan(&[
            RawFilter::new("TYPE", "EQ", "WORKSHOP"),
            RawFilter::new("TIME", "GT", "12:00:00"),
            RawFilter::new("DURATION", "LTEQ", "90"),
        ])
        .unwrap();

        let pushed: Vec<_> = plan
            .query
            .filters
            .iter()
            .map(|f| (f.property.as_str(), f.op))
            .collect();
        assert_eq!(
            pushed,
            vec![("typeOfSession", Comparison::Eq), ("startTime", Comparison::Gt)]
        );
        assert_eq!(plan.deferred.len(), 1);
        assert_eq!(plan.deferred[0].field.property, "duration");
        assert_eq!(plan.query.inequality_property().unwrap(), Some("startTime"));
    }

    #[test]
    fn test_plan_coerces_deferred_values() {
        let err = plan(&[
            RawFilter::new("DURATION", "GT", "10"),
            RawFilter::new("TIME", "GT", "noon"),
        ])
        .unwrap_err();
        assert!(matches!(err, QueryError::TypeCoercion { .. }));
    }

    #[test]
    fn test_plan_keeps_ancestor() {
        let conf = crate::data::keys::EntityKey::with_id(Kind::Conference, 3);
        let parsed = parse_filters(&[RawFilter::new("DURATION", "EQ", "45")], SESSION_FIELDS).unwrap();
        let plan = QueryPlan::build(Query::new(Kind::Session).ancestor(conf.clone()), &partition(parsed)).unwrap();

        assert_eq!(plan.query.ancestor, Some(conf));
        assert_eq!(plan.query.filters[0].value, PropertyValue::Integer(45));
        assert!(plan.deferred.is_empty());
    }
}
