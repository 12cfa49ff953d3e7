//! Raw backend response decomposition.

use serde_json::Value;

use crate::{
    aggs::{self, Aggregation},
    error::SearchError,
    spell::{self, Suggestion},
};

/// The decomposed pieces of one backend response.
#[derive(Debug, Clone)]
pub struct QueryResult {
    /// Total matching documents (`hits.total.value`).
    pub total: usize,
    /// The returned documents (`hits.hits[]._source`).
    pub items: Vec<Value>,
    /// Collected slice aggregations.
    pub aggregations: Vec<Aggregation>,
    /// Collected spelling suggestions.
    pub spell: Vec<Suggestion>,
}

impl QueryResult {
    /// Decomposes a response. A response without the hits contract is
    /// malformed; aggregations and suggestions are optional.
    pub fn from_response(response: &Value) -> Result<Self, SearchError> {
        let total = response
            .pointer("/hits/total/value")
            .and_then(Value::as_u64)
            .ok_or_else(|| {
                SearchError::MalformedResponse("missing hits.total.value".to_string())
            })?;

        let items = response
            .pointer("/hits/hits")
            .and_then(Value::as_array)
            .map(|hits| {
                hits.iter()
                    .filter_map(|hit| hit.get("_source").cloned())
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self {
            total: total as usize,
            items,
            aggregations: aggs::collect_aggregations(response),
            spell: spell::collect_suggestions(response),
        })
    }
}
