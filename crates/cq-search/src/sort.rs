//! Sort specifications.
//!
//! A sort spec is a comma-separated list of field paths; a leading `-`
//! sorts descending. An empty spec means relevancy order (no sort clause
//! at all).

use serde_json::{Value, json};

/// One sort criterion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortParam {
    /// The index field path.
    pub field: String,
    /// True for ascending order.
    pub ascending: bool,
}

/// A parsed sort specification.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Sort {
    parameters: Vec<SortParam>,
}

impl Sort {
    /// Parses a sort spec. Blank input is relevancy order.
    pub fn from_spec(spec: &str) -> Self {
        let parameters = spec
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|part| match part.strip_prefix('-') {
                Some(field) => SortParam {
                    field: field.to_string(),
                    ascending: false,
                },
                None => SortParam {
                    field: part.to_string(),
                    ascending: true,
                },
            })
            .collect();
        Self { parameters }
    }

    /// True for relevancy order.
    pub fn is_empty(&self) -> bool {
        self.parameters.is_empty()
    }

    /// Builds the backend sort clauses. `resolve` maps each field to the
    /// actual sort field (e.g. its `keyword` subfield).
    pub fn to_clauses(&self, resolve: impl Fn(&str) -> String) -> Value {
        let clauses: Vec<Value> = self
            .parameters
            .iter()
            .map(|param| {
                let order = if param.ascending { "asc" } else { "desc" };
                json!({ resolve(&param.field): { "order": order } })
            })
            .collect();
        Value::Array(clauses)
    }

    /// Renders the spec back to its parameter form.
    pub fn as_spec(&self) -> String {
        self.parameters
            .iter()
            .map(|param| {
                if param.ascending {
                    param.field.clone()
                } else {
                    format!("-{}", param.field)
                }
            })
            .collect::<Vec<_>>()
            .join(",")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_spec_is_relevancy() {
        assert!(Sort::from_spec("").is_empty());
        assert!(Sort::from_spec("  ").is_empty());
    }

    #[test]
    fn parses_directions() {
        let sort = Sort::from_spec("year,-title");
        assert_eq!(
            sort.to_clauses(str::to_string),
            json!([
                { "year": { "order": "asc" } },
                { "title": { "order": "desc" } },
            ])
        );
    }

    #[test]
    fn resolver_rewrites_fields() {
        let sort = Sort::from_spec("title");
        let clauses = sort.to_clauses(|f| format!("{f}.keyword"));
        assert_eq!(clauses, json!([{ "title.keyword": { "order": "asc" } }]));
    }

    #[test]
    fn spec_round_trip() {
        let spec = "year,-title";
        assert_eq!(Sort::from_spec(spec).as_spec(), spec);
    }
}
