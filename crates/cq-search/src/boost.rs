//! Relevance boosting.
//!
//! Two unconditional score contributions ride along with every query as
//! siblings of the main clause: a constant-score preference ranking real
//! records over virtual records over cache records, and a function score
//! favoring entities that more records link to. Free-text queries
//! additionally search a weighted field list. All three are overridable
//! per request.

use serde_json::{Value, json};

/// Boost configuration for one request.
#[derive(Debug, Clone, PartialEq)]
pub struct BoostConfig {
    /// Weighted fields (`field^N`) free text is searched over.
    pub fields: Vec<String>,
    /// Constant-score preferences: (record type, boost).
    pub record_type_boosts: Vec<(String, f64)>,
    /// Field for the function score, if enabled.
    pub function_score_field: Option<String>,
    /// Function score multiplier.
    pub function_score_factor: f64,
}

impl Default for BoostConfig {
    fn default() -> Self {
        Self {
            fields: vec![
                "label^20".to_string(),
                "prefLabel^20".to_string(),
                "title^10".to_string(),
                "_str^4".to_string(),
            ],
            record_type_boosts: vec![
                ("Record".to_string(), 1.0),
                ("VirtualRecord".to_string(), 0.8),
                ("CacheRecord".to_string(), 0.5),
            ],
            function_score_field: Some("reverseLinks.totalItems".to_string()),
            function_score_factor: 1.0,
        }
    }
}

/// The field holding a document's record type.
const RECORD_TYPE_FIELD: &str = "meta.@type";

impl BoostConfig {
    /// Returns a copy with the free-text fields replaced by a per-request
    /// override (`field^2,other^10`).
    pub fn with_field_override(&self, spec: &str) -> Self {
        let fields: Vec<String> = spec
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(ToString::to_string)
            .collect();
        if fields.is_empty() {
            self.clone()
        } else {
            Self {
                fields,
                ..self.clone()
            }
        }
    }

    /// The constant-score record-type preference clause, or `Null` when
    /// unconfigured.
    pub fn constant_score(&self) -> Value {
        if self.record_type_boosts.is_empty() {
            return Value::Null;
        }
        let should: Vec<Value> = self
            .record_type_boosts
            .iter()
            .map(|(record_type, boost)| {
                json!({
                    "constant_score": {
                        "filter": { "term": { RECORD_TYPE_FIELD: record_type } },
                        "boost": boost,
                    }
                })
            })
            .collect();
        json!({ "bool": { "should": should } })
    }

    /// The function-score clause, or `Null` when unconfigured.
    pub fn function_score(&self) -> Value {
        match &self.function_score_field {
            Some(field) => json!({
                "function_score": {
                    "field_value_factor": {
                        "field": field,
                        "modifier": "log1p",
                        "factor": self.function_score_factor,
                        "missing": 0,
                    }
                }
            }),
            None => Value::Null,
        }
    }
}
