//! Facet slice assembly.
//!
//! Turns collected aggregation buckets into the `sliceByDimension` view:
//! per configured property, one observation per bucket carrying the count
//! and a link to the query with that value applied. Values already
//! selected at the top level are omitted (selecting them again is a
//! no-op). Range slices emit a templated link with a `{?property}`
//! placeholder instead of per-bucket links.

use cq_query::Operator;
use cq_tree::{FreeText, Node, PathValue, QueryTree, Value as TreeValue};
use cq_vocab::looks_like_iri;
use serde_json::{Map, Value, json};

use crate::{
    aggs::{Aggregation, Bucket, merge_buckets},
    params::QueryParams,
    urls::make_find_url,
};

/// Builds the `sliceByDimension` statistics view.
pub fn build_stats(
    aggregations: &[Aggregation],
    tree: &QueryTree,
    config: &cq_config::AppConfig,
    params: &QueryParams,
) -> Value {
    let mut slice_by_dimension = Map::new();

    for slice in &config.slices {
        let relevant: Vec<&Aggregation> = aggregations
            .iter()
            .filter(|a| a.property == slice.property)
            .collect();
        if relevant.is_empty() {
            continue;
        }

        let size = params
            .facet_sizes
            .get(&slice.property)
            .copied()
            .unwrap_or(slice.size);
        let buckets = merge_buckets(&relevant, size);

        let node = if slice.range {
            range_slice_node(slice, &buckets, tree, params)
        } else {
            term_slice_node(slice, &buckets, tree, params, size)
        };

        if let Some(node) = node {
            slice_by_dimension.insert(slice.property.clone(), node);
        }
    }

    json!({ "@id": "#stats", "sliceByDimension": slice_by_dimension })
}

/// The top-level range conditions represented by range-facet templates.
/// These are excluded from the displayed query mapping, since the template
/// carries them instead.
pub fn range_selected(tree: &QueryTree, config: &cq_config::AppConfig) -> Vec<Node> {
    config
        .slices
        .iter()
        .filter(|slice| slice.range)
        .flat_map(|slice| range_conditions(tree, &slice.property))
        .cloned()
        .map(Node::PathValue)
        .collect()
}

/// A regular term slice: one observation per unselected bucket.
fn term_slice_node(
    slice: &cq_config::Slice,
    buckets: &[Bucket],
    tree: &QueryTree,
    params: &QueryParams,
    size: usize,
) -> Option<Value> {
    let or_group = or_selection(tree, &slice.property, buckets);
    let connective = if or_group.is_some() {
        cq_config::Connective::Or
    } else {
        slice.connective
    };

    let mut observations = Vec::new();
    for bucket in buckets {
        if is_selected(tree, &slice.property, &bucket.value) {
            continue;
        }
        if let Some((_, values)) = &or_group
            && values.contains(&bucket.value)
        {
            continue;
        }

        let pv = equality_node(&slice.property, &bucket.value);
        let altered = match (&or_group, connective) {
            (Some((or_node, _)), cq_config::Connective::Or) => {
                // Extend the existing OR-selection with this value.
                let Node::Or(children) = or_node else {
                    continue;
                };
                let mut children = children.clone();
                children.push(pv);
                tree.remove(or_node).add(Node::Or(children))
            }
            _ => tree.add(pv),
        };

        observations.push(json!({
            "totalItems": bucket.count,
            "view": { "@id": make_find_url(&altered, params) },
            "object": bucket.value,
        }));
    }

    if observations.is_empty() {
        return None;
    }
    Some(json!({
        "dimension": slice.property,
        "observation": observations,
        "maxItems": size,
        "_connective": connective.name(),
    }))
}

/// A range slice: a templated link carrying the selected min/max, with
/// bucket counts but no per-bucket links.
fn range_slice_node(
    slice: &cq_config::Slice,
    buckets: &[Bucket],
    tree: &QueryTree,
    params: &QueryParams,
) -> Option<Value> {
    let selected: Vec<Node> = range_conditions(tree, &slice.property)
        .into_iter()
        .cloned()
        .map(Node::PathValue)
        .collect();

    let placeholder = Node::FreeText(FreeText {
        operator: Operator::Equals,
        value: format!("{{?{}}}", slice.property),
    });
    let template_tree = tree.remove_all(selected.iter()).add(placeholder);
    let template_url = make_find_url(&template_tree, params);

    let limit = |operator: Operator| {
        range_conditions(tree, &slice.property)
            .into_iter()
            .find(|pv| pv.operator == operator)
            .map(|pv| pv.value.as_str().to_string())
            .unwrap_or_default()
    };

    let observations: Vec<Value> = buckets
        .iter()
        .map(|bucket| json!({ "totalItems": bucket.count, "object": bucket.value }))
        .collect();

    let min_key = Operator::GreaterThanOrEquals.term_key();
    let max_key = Operator::LessThanOrEquals.term_key();
    Some(json!({
        "dimension": slice.property,
        "search": {
            "template": template_url,
            "mapping": {
                "variable": slice.property,
                min_key: limit(Operator::GreaterThanOrEquals),
                max_key: limit(Operator::LessThanOrEquals),
            },
        },
        "observation": observations,
        "_connective": cq_config::Connective::And.name(),
    }))
}

/// The top-level range conditions on a property.
fn range_conditions<'t>(tree: &'t QueryTree, property: &str) -> Vec<&'t PathValue> {
    tree.top_level_path_values()
        .into_iter()
        .filter(|pv| {
            pv.property == property
                && matches!(
                    pv.operator,
                    Operator::GreaterThan
                        | Operator::GreaterThanOrEquals
                        | Operator::LessThan
                        | Operator::LessThanOrEquals
                )
        })
        .collect()
}

/// A simple equality node for a facet value, used to build links. The
/// value is typed as a link when it looks like an identifier.
fn equality_node(property: &str, value: &str) -> Node {
    let typed = if looks_like_iri(value) {
        TreeValue::Link(value.to_string())
    } else {
        TreeValue::Literal(value.to_string())
    };
    Node::PathValue(PathValue::equals(property, typed))
}

/// True if a top-level node already selects `property = value`. A node
/// selects a pair if it is such an equality condition, or a group whose
/// every child selects it (the shape alternate-path expansion produces).
fn is_selected(tree: &QueryTree, property: &str, value: &str) -> bool {
    tree.top_level_nodes()
        .into_iter()
        .any(|node| selects(node, property, value))
}

/// See [`is_selected`].
fn selects(node: &Node, property: &str, value: &str) -> bool {
    match node {
        Node::PathValue(pv) => {
            pv.property == property
                && pv.operator == Operator::Equals
                && pv.value.as_str() == value
        }
        Node::And(children) | Node::Or(children) => {
            !children.is_empty() && children.iter().all(|c| selects(c, property, value))
        }
        Node::FreeText(_) => false,
    }
}

/// The single value a node selects on a property, if it selects exactly
/// one.
fn selected_value<'n>(node: &'n Node, property: &str) -> Option<&'n str> {
    match node {
        Node::PathValue(pv) if pv.property == property && pv.operator == Operator::Equals => {
            Some(pv.value.as_str())
        }
        Node::And(children) | Node::Or(children) => {
            let mut values = children.iter().map(|c| selected_value(c, property));
            let first = values.next()??;
            values
                .all(|v| v == Some(first))
                .then_some(first)
        }
        _ => None,
    }
}

/// Detects an OR-selection: a top-level OR whose children each select one
/// value of the property, all of which the backend reports as possible
/// buckets. Returns the OR node and its selected values.
fn or_selection<'t>(
    tree: &'t QueryTree,
    property: &str,
    buckets: &[Bucket],
) -> Option<(&'t Node, Vec<String>)> {
    for node in tree.top_level_nodes() {
        // A group that selects a single value is a plain selection, not a
        // multi-select.
        if selected_value(node, property).is_some() {
            continue;
        }
        let Node::Or(children) = node else {
            continue;
        };
        let values: Option<Vec<String>> = children
            .iter()
            .map(|c| selected_value(c, property).map(ToString::to_string))
            .collect();
        if let Some(values) = values
            && values
                .iter()
                .all(|v| buckets.iter().any(|b| &b.value == v))
        {
            return Some((node, values));
        }
    }
    None
}
