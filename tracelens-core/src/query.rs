//! Declarative analytics aggregation queries
//!
//! Every dashboard visualization constructs an [`AnalyticsQuery`] rather
//! than a bespoke request. The query is serialized verbatim and the backend
//! performs the aggregation; the client renders whatever comes back and
//! never reorders or pads the result.

use serde::{Deserialize, Serialize};

use crate::filters::FilterSet;

/// Record collection an aggregation runs over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Collection {
    Tasks,
    Sessions,
    Events,
    Clusterings,
}

impl Collection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Collection::Tasks => "tasks",
            Collection::Sessions => "sessions",
            Collection::Events => "events",
            Collection::Clusterings => "clusterings",
        }
    }
}

/// Aggregate computed by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AggregationOperation {
    Count,
    Average,
    Sum,
    Min,
    Max,
}

impl AggregationOperation {
    pub fn as_str(&self) -> &'static str {
        match self {
            AggregationOperation::Count => "count",
            AggregationOperation::Average => "average",
            AggregationOperation::Sum => "sum",
            AggregationOperation::Min => "min",
            AggregationOperation::Max => "max",
        }
    }
}

/// Time bucket width for time-series queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeStep {
    Minute,
    Hour,
    Day,
}

/// A declarative aggregation request sent verbatim to the backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyticsQuery {
    pub project_id: String,
    pub collection: Collection,
    pub aggregation_operation: AggregationOperation,
    /// Grouping keys (e.g. "day", "hour", "event_name"). Order determines
    /// chart series/grouping order and is preserved end to end. Empty means
    /// a purely time-bucketed scalar series using `time_step` alone.
    pub dimensions: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_step: Option<TimeStep>,
    pub filters: FilterSet,
    /// When true the backend fills gaps in the bucketed output; the client
    /// performs no local padding or interpolation either way.
    pub fill_missing_buckets: bool,
}

impl AnalyticsQuery {
    pub fn new(
        project_id: impl Into<String>,
        collection: Collection,
        aggregation_operation: AggregationOperation,
    ) -> Self {
        Self {
            project_id: project_id.into(),
            collection,
            aggregation_operation,
            dimensions: Vec::new(),
            time_step: None,
            filters: FilterSet::default(),
            fill_missing_buckets: false,
        }
    }

    pub fn with_dimensions(mut self, dimensions: Vec<String>) -> Self {
        self.dimensions = dimensions;
        self
    }

    pub fn with_time_step(mut self, time_step: TimeStep) -> Self {
        self.time_step = Some(time_step);
        self
    }

    pub fn with_filters(mut self, filters: FilterSet) -> Self {
        self.filters = filters;
        self
    }

    /// Request a filled time series: the backend emits empty buckets
    /// explicitly instead of omitting them.
    pub fn filled(mut self) -> Self {
        self.fill_missing_buckets = true;
        self
    }

    /// Whether the query may be issued at all; aggregations without a
    /// project are never sent.
    pub fn is_sendable(&self) -> bool {
        !self.project_id.is_empty()
    }

    /// A purely time-bucketed scalar series, as opposed to categorical
    /// grouping by dimensions.
    pub fn is_time_series(&self) -> bool {
        self.dimensions.is_empty() && self.time_step.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_shape() {
        let query = AnalyticsQuery::new("proj-1", Collection::Tasks, AggregationOperation::Count)
            .with_dimensions(vec!["day".to_string(), "event_name".to_string()])
            .filled();

        let value = serde_json::to_value(&query).unwrap();
        assert_eq!(value["project_id"], "proj-1");
        assert_eq!(value["collection"], "tasks");
        assert_eq!(value["aggregation_operation"], "count");
        assert_eq!(value["fill_missing_buckets"], true);
        // time_step is omitted entirely when unset
        assert!(value.get("time_step").is_none());
    }

    #[test]
    fn test_dimension_order_preserved() {
        let query = AnalyticsQuery::new("proj-1", Collection::Events, AggregationOperation::Sum)
            .with_dimensions(vec!["event_name".to_string(), "day".to_string()]);

        let value = serde_json::to_value(&query).unwrap();
        let dims: Vec<String> = serde_json::from_value(value["dimensions"].clone()).unwrap();
        assert_eq!(dims, vec!["event_name", "day"]);
    }

    #[test]
    fn test_time_series_classification() {
        let scalar_series =
            AnalyticsQuery::new("proj-1", Collection::Tasks, AggregationOperation::Count)
                .with_time_step(TimeStep::Day);
        assert!(scalar_series.is_time_series());

        let grouped = scalar_series
            .clone()
            .with_dimensions(vec!["event_name".to_string()]);
        assert!(!grouped.is_time_series());
    }

    #[test]
    fn test_sendable_guard() {
        let query = AnalyticsQuery::new("", Collection::Tasks, AggregationOperation::Count);
        assert!(!query.is_sendable());

        let query = AnalyticsQuery::new("proj-1", Collection::Tasks, AggregationOperation::Count);
        assert!(query.is_sendable());
    }
}
