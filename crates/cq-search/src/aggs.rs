//! Aggregation requests and result collection.
//!
//! Two distinct shapes: per-slice term aggregations feeding the facet
//! view, and the "predicate" filter aggregations used by object search to
//! count how many documents link to an object via each curated relation.
//! The two are separate requests when both are needed.

use std::collections::BTreeMap;

use cq_query::{FlattenedAst, Operator};
use cq_tree::{Outset, build_with_outset, search_paths};
use cq_vocab::Disambiguator;
use serde_json::{Map, Value, json};

use crate::{
    boost::BoostConfig,
    dsl::{self, must_wrap},
    mappings::EsMappings,
};

/// Name of the inner aggregation when a nested wrapper is needed.
pub const NESTED_AGG_NAME: &str = "n";
/// Name of the predicate filter aggregation.
pub const PREDICATE_AGG_NAME: &str = "_predicates";

/// One value bucket of an aggregation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bucket {
    /// The bucket's value (a term or a link).
    pub value: String,
    /// Documents carrying the value.
    pub count: i64,
}

/// A collected aggregation for one property at one concrete path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Aggregation {
    /// The configured property.
    pub property: String,
    /// The concrete index path aggregated over.
    pub path: String,
    /// The value buckets.
    pub buckets: Vec<Bucket>,
}

/// Builds the term aggregations for every configured slice.
///
/// Each slice aggregates at every concrete search path of its property
/// (both Work and Instance variants when the level is undecided), wrapped
/// in a `nested` aggregation where the index requires it. With no slices
/// configured, a plain type aggregation is returned.
pub fn build_agg_query(
    config: &cq_config::AppConfig,
    disambiguator: &Disambiguator<'_>,
    outset: Outset,
    mappings: &EsMappings,
    size_overrides: &BTreeMap<String, usize>,
) -> Value {
    if config.slices.is_empty() {
        return json!({ "@type": { "terms": { "field": "@type" } } });
    }

    let mut query = Map::new();

    for slice in &config.slices {
        let size = size_overrides
            .get(&slice.property)
            .copied()
            .unwrap_or(slice.size);

        for path in search_paths(&slice.property, disambiguator, outset) {
            let field = path.field();

            let mut agg = json!({
                "terms": {
                    "field": field,
                    "size": size,
                    "order": { slice.sort.backend_key(): slice.sort_order.backend_key() },
                }
            });

            if let Some(stem) = mappings.nested_stem(&field) {
                agg = json!({
                    "nested": { "path": stem },
                    "aggs": { NESTED_AGG_NAME: agg },
                });
            }

            query.insert(
                field,
                json!({
                    "aggs": { slice.property.clone(): agg },
                    "filter": must_wrap(vec![]),
                }),
            );
        }
    }

    Value::Object(query)
}

/// Collects slice aggregations from a response.
pub fn collect_aggregations(response: &Value) -> Vec<Aggregation> {
    let Some(aggregations) = response.get("aggregations").and_then(Value::as_object) else {
        return Vec::new();
    };

    let mut collected = Vec::new();
    for (path, value) in aggregations {
        if path == PREDICATE_AGG_NAME {
            continue;
        }
        let Some(inner) = value.as_object() else {
            continue;
        };
        // The single non-bookkeeping key is the property name.
        let Some((property, mut agg)) = inner
            .iter()
            .find(|(k, _)| *k != "doc_count" && *k != "meta")
        else {
            continue;
        };
        if let Some(nested) = agg.get(NESTED_AGG_NAME) {
            agg = nested;
        }
        let buckets = collect_buckets(agg);
        collected.push(Aggregation {
            property: property.clone(),
            path: path.clone(),
            buckets,
        });
    }
    collected
}

/// Reads `buckets: [{key, doc_count}]` from a term aggregation.
fn collect_buckets(agg: &Value) -> Vec<Bucket> {
    agg.get("buckets")
        .and_then(Value::as_array)
        .map(|buckets| {
            buckets
                .iter()
                .filter_map(|bucket| {
                    let value = bucket.get("key")?;
                    let value = match value {
                        Value::String(s) => s.clone(),
                        other => other.to_string(),
                    };
                    let count = bucket.get("doc_count")?.as_i64()?;
                    Some(Bucket { value, count })
                })
                .collect()
        })
        .unwrap_or_default()
}

/// Builds the predicate filter aggregations for object search: one filter
/// per curated predicate, counting documents that link to the object via
/// that predicate. Unresolvable predicates are skipped.
pub fn build_predicate_aggs(
    object: &str,
    predicates: &[String],
    disambiguator: &Disambiguator<'_>,
    mappings: &EsMappings,
) -> Value {
    let boost = BoostConfig {
        fields: Vec::new(),
        record_type_boosts: Vec::new(),
        function_score_field: None,
        function_score_factor: 0.0,
    };

    let mut filters = Map::new();
    for predicate in predicates {
        let condition = FlattenedAst::Code {
            code: predicate.clone(),
            operator: Operator::Equals,
            value: object.to_string(),
        };
        match build_with_outset(&condition, disambiguator, Outset::Resource) {
            Ok(tree) => {
                if let Some(root) = tree.root() {
                    filters.insert(
                        predicate.clone(),
                        dsl::compile_node(root, mappings, &boost),
                    );
                }
            }
            Err(err) => {
                tracing::warn!(predicate, %err, "skipping unresolvable curated predicate");
            }
        }
    }

    if filters.is_empty() {
        return json!({});
    }
    json!({ PREDICATE_AGG_NAME: { "filters": { "filters": filters } } })
}

/// Collects the predicate aggregation buckets from a response.
pub fn collect_predicate_buckets(response: &Value) -> Vec<Bucket> {
    response
        .get("aggregations")
        .and_then(|aggs| aggs.get(PREDICATE_AGG_NAME))
        .and_then(|agg| agg.get("buckets"))
        .and_then(Value::as_object)
        .map(|buckets| {
            buckets
                .iter()
                .filter_map(|(predicate, bucket)| {
                    Some(Bucket {
                        value: predicate.clone(),
                        count: bucket.get("doc_count")?.as_i64()?,
                    })
                })
                .collect()
        })
        .unwrap_or_default()
}

/// Merges buckets for one property across its alternate paths, summing
/// counts per value and keeping the highest counts up to `size`.
///
/// A document matching at both Work and Instance level is counted twice
/// here; the original system documents this approximation and it is kept
/// pending a product decision.
pub fn merge_buckets(aggregations: &[&Aggregation], size: usize) -> Vec<Bucket> {
    let mut merged: BTreeMap<String, i64> = BTreeMap::new();
    for aggregation in aggregations {
        for bucket in &aggregation.buckets {
            *merged.entry(bucket.value.clone()).or_default() += bucket.count;
        }
    }

    let mut buckets: Vec<Bucket> = merged
        .into_iter()
        .map(|(value, count)| Bucket { value, count })
        .collect();
    buckets.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.value.cmp(&b.value)));
    buckets.truncate(size);
    buckets
}

#[cfg(test)]
mod tests {
    use cq_config::AppConfig;
    use cq_vocab::fixtures;

    use super::*;

    fn config() -> AppConfig {
        AppConfig::from_json(json!({
            "sliceList": [
                { "property": "genreForm", "size": 20 },
                { "property": "language", "sort": "key", "sortOrder": "asc" },
            ],
        }))
        .unwrap()
    }

    #[test]
    fn empty_config_aggregates_types() {
        let vocab = fixtures::vocab();
        let disambiguator = Disambiguator::new(&vocab);
        let query = build_agg_query(
            &AppConfig::default(),
            &disambiguator,
            Outset::Resource,
            &EsMappings::default(),
            &BTreeMap::new(),
        );
        assert_eq!(query["@type"]["terms"]["field"], "@type");
    }

    #[test]
    fn slice_aggregations_follow_config() {
        let vocab = fixtures::vocab();
        let disambiguator = Disambiguator::new(&vocab);
        let query = build_agg_query(
            &config(),
            &disambiguator,
            Outset::Resource,
            &EsMappings::default(),
            &BTreeMap::new(),
        );

        let genre = &query["genreForm.@id"]["aggs"]["genreForm"]["terms"];
        assert_eq!(genre["field"], "genreForm.@id");
        assert_eq!(genre["size"], 20);
        assert_eq!(genre["order"]["_count"], "desc");

        let language = &query["language.@id"]["aggs"]["language"]["terms"];
        assert_eq!(language["order"]["_key"], "asc");
    }

    #[test]
    fn size_override_applies() {
        let vocab = fixtures::vocab();
        let disambiguator = Disambiguator::new(&vocab);
        let overrides = BTreeMap::from([("genreForm".to_string(), 5)]);
        let query = build_agg_query(
            &config(),
            &disambiguator,
            Outset::Resource,
            &EsMappings::default(),
            &overrides,
        );
        assert_eq!(query["genreForm.@id"]["aggs"]["genreForm"]["terms"]["size"], 5);
    }

    #[test]
    fn work_outset_adds_alternate_paths() {
        let vocab = fixtures::vocab();
        let disambiguator = Disambiguator::new(&vocab);
        let query = build_agg_query(
            &config(),
            &disambiguator,
            Outset::Work,
            &EsMappings::default(),
            &BTreeMap::new(),
        );
        // language sits at Creation level: aggregated at both variants.
        assert!(query.get("language.@id").is_some());
        assert!(query.get("@reverse.instanceOf.language.@id").is_some());
    }

    #[test]
    fn nested_path_wraps_the_aggregation() {
        let vocab = fixtures::vocab();
        let disambiguator = Disambiguator::new(&vocab);
        let mappings = EsMappings::from_json(&json!({
            "properties": { "contribution": { "type": "nested" } },
        }));
        let config = AppConfig::from_json(json!({
            "sliceList": [{ "property": "author" }],
        }))
        .unwrap();
        let query = build_agg_query(
            &config,
            &disambiguator,
            Outset::Resource,
            &mappings,
            &BTreeMap::new(),
        );
        let agg = &query["contribution.agent.@id"]["aggs"]["author"];
        assert_eq!(agg["nested"]["path"], "contribution");
        assert_eq!(
            agg["aggs"][NESTED_AGG_NAME]["terms"]["field"],
            "contribution.agent.@id"
        );
    }

    #[test]
    fn collects_plain_and_nested_aggregations() {
        let response = json!({
            "aggregations": {
                "genreForm.@id": {
                    "genreForm": {
                        "buckets": [
                            { "key": "https://example.org/gf/poetry", "doc_count": 7 },
                        ],
                    },
                },
                "contribution.agent.@id": {
                    "author": {
                        NESTED_AGG_NAME: {
                            "buckets": [{ "key": "https://example.org/p/1", "doc_count": 3 }],
                        },
                    },
                },
            },
        });
        let mut aggregations = collect_aggregations(&response);
        aggregations.sort_by(|a, b| a.property.cmp(&b.property));
        assert_eq!(aggregations.len(), 2);
        assert_eq!(aggregations[0].property, "author");
        assert_eq!(aggregations[0].buckets[0].count, 3);
        assert_eq!(aggregations[1].property, "genreForm");
        assert_eq!(aggregations[1].buckets[0].value, "https://example.org/gf/poetry");
    }

    #[test]
    fn predicate_aggs_build_one_filter_per_predicate() {
        let vocab = fixtures::vocab();
        let disambiguator = Disambiguator::new(&vocab);
        let query = build_predicate_aggs(
            "https://example.org/person/1",
            &["author".to_string(), "translator".to_string(), "bogus".to_string()],
            &disambiguator,
            &EsMappings::default(),
        );
        let filters = query[PREDICATE_AGG_NAME]["filters"]["filters"]
            .as_object()
            .unwrap();
        assert_eq!(filters.len(), 2, "unresolvable predicates are skipped");
        assert!(filters.contains_key("author"));
        assert!(filters.contains_key("translator"));
    }

    #[test]
    fn collects_predicate_buckets() {
        let response = json!({
            "aggregations": {
                PREDICATE_AGG_NAME: {
                    "buckets": {
                        "author": { "doc_count": 12 },
                        "translator": { "doc_count": 2 },
                    },
                },
            },
        });
        let buckets = collect_predicate_buckets(&response);
        assert_eq!(buckets.len(), 2);
        assert_eq!(buckets[0].value, "author");
        assert_eq!(buckets[0].count, 12);
    }

    #[test]
    fn merge_sums_counts_across_paths() {
        let a = Aggregation {
            property: "subject".into(),
            path: "subject.@id".into(),
            buckets: vec![
                Bucket { value: "x".into(), count: 5 },
                Bucket { value: "y".into(), count: 2 },
            ],
        };
        let b = Aggregation {
            property: "subject".into(),
            path: "@reverse.instanceOf.subject.@id".into(),
            buckets: vec![Bucket { value: "x".into(), count: 4 }],
        };
        let merged = merge_buckets(&[&a, &b], 10);
        assert_eq!(
            merged,
            vec![
                Bucket { value: "x".into(), count: 9 },
                Bucket { value: "y".into(), count: 2 },
            ]
        );
    }

    #[test]
    fn merge_truncates_to_size() {
        let a = Aggregation {
            property: "p".into(),
            path: "p".into(),
            buckets: (0..5)
                .map(|i| Bucket { value: format!("v{i}"), count: i })
                .collect(),
        };
        assert_eq!(merge_buckets(&[&a], 2).len(), 2);
    }
}
