//! Query-tree to backend-DSL compilation.
//!
//! Renders a [`QueryTree`] into the engine's boolean clause language:
//! `And`/`Or` become `must`/`should` containers, path conditions become
//! field clauses (wrapped in a `nested` container scoped at the longest
//! nested path segment), and free text becomes a weighted multi-field
//! query. An AND-group of path conditions sharing one nested stem compiles
//! to a single `nested` query so all conditions hit the same repeated
//! object.

use cq_query::Operator;
use cq_tree::{Node, PathValue, QueryTree};
use serde_json::{Value, json};

use crate::{boost::BoostConfig, mappings::EsMappings};

/// Compiles the full query: main clause plus the unconditional boosts,
/// inside one `must` wrapper.
pub fn compile_query(tree: &QueryTree, mappings: &EsMappings, boost: &BoostConfig) -> Value {
    let main = match tree.root() {
        Some(root) => compile_node(root, mappings, boost),
        None => json!({ "match_all": {} }),
    };

    let clauses: Vec<Value> = [main, boost.function_score(), boost.constant_score()]
        .into_iter()
        .filter(|clause| !clause.is_null())
        .collect();
    must_wrap(clauses)
}

/// Compiles one query-tree node.
pub fn compile_node(node: &Node, mappings: &EsMappings, boost: &BoostConfig) -> Value {
    match node {
        Node::And(children) => {
            if let Some(compiled) = compile_nested_group(children, mappings) {
                return compiled;
            }
            must_wrap(
                children
                    .iter()
                    .map(|c| compile_node(c, mappings, boost))
                    .collect(),
            )
        }
        Node::Or(children) => should_wrap(
            children
                .iter()
                .map(|c| compile_node(c, mappings, boost))
                .collect(),
        ),
        Node::PathValue(pv) => compile_path_value(pv, mappings),
        Node::FreeText(ft) => compile_free_text(&ft.value, ft.operator, boost),
    }
}

/// Compiles an AND-group whose conditions all sit under one nested stem
/// into a single `nested` query, so they must match on the same repeated
/// object. Returns `None` when the group does not qualify.
fn compile_nested_group(children: &[Node], mappings: &EsMappings) -> Option<Value> {
    if children.len() < 2 {
        return None;
    }
    let path_values: Vec<&PathValue> = children
        .iter()
        .map(|child| match child {
            Node::PathValue(pv) => Some(pv),
            _ => None,
        })
        .collect::<Option<_>>()?;

    let stem = common_stem(&path_values)?;
    let nested_path = mappings.nested_stem(&stem)?;

    let musts: Vec<Value> = path_values
        .iter()
        .map(|pv| json!({ "match": { pv.path.field(): pv.value.as_str() } }))
        .collect();
    let nested = json!({
        "nested": { "path": nested_path, "query": must_wrap(musts) }
    });

    if path_values.iter().any(|pv| pv.operator == Operator::NotEquals) {
        Some(must_not_wrap(nested))
    } else {
        Some(must_wrap(vec![nested]))
    }
}

/// The longest common hop prefix of a group's paths, dot-joined.
fn common_stem(path_values: &[&PathValue]) -> Option<String> {
    let first = path_values.first()?.path.hops();
    let mut len = first.len();
    for pv in &path_values[1..] {
        let hops = pv.path.hops();
        len = len.min(hops.len());
        while len > 0 && first[..len] != hops[..len] {
            len -= 1;
        }
    }
    if len == 0 {
        None
    } else {
        Some(first[..len].join("."))
    }
}

/// Compiles one path condition, nested-wrapping where the index requires
/// it.
fn compile_path_value(pv: &PathValue, mappings: &EsMappings) -> Value {
    let field = pv.path.field();
    let value = pv.value.as_str();

    let positive = match pv.operator {
        Operator::Equals | Operator::NotEquals => field_match(&field, &quote_if_phrase(value)),
        Operator::GreaterThan => range_filter(&field, "gt", value),
        Operator::GreaterThanOrEquals => range_filter(&field, "gte", value),
        Operator::LessThan => range_filter(&field, "lt", value),
        Operator::LessThanOrEquals => range_filter(&field, "lte", value),
    };

    match mappings.nested_stem(&field) {
        Some(stem) => {
            let nested = json!({ "nested": { "path": stem, "query": positive } });
            // A nested field absent from the parent document can only be
            // negated by negating the nested query itself.
            if pv.operator == Operator::NotEquals {
                must_not_wrap(nested)
            } else {
                nested
            }
        }
        None => {
            if pv.operator == Operator::NotEquals {
                filter_wrap(must_not_wrap(positive))
            } else {
                filter_wrap(positive)
            }
        }
    }
}

/// A single-field match clause.
fn field_match(field: &str, value: &str) -> Value {
    json!({
        "simple_query_string": {
            "query": value,
            "fields": [field],
            "default_operator": "AND",
        }
    })
}

/// A range clause.
fn range_filter(field: &str, key: &str, value: &str) -> Value {
    json!({ "range": { field: { key: value } } })
}

/// Compiles a free-text condition over the weighted boost fields plus
/// their `.exact` variants.
fn compile_free_text(text: &str, operator: Operator, boost: &BoostConfig) -> Value {
    let base = json!({
        "simple_query_string": {
            "query": text,
            "analyze_wildcard": true,
            "default_operator": "AND",
        }
    });

    let clause = if boost.fields.is_empty() {
        base
    } else {
        let exact_fields: Vec<String> = boost
            .fields
            .iter()
            .map(|f| exact_variant(f))
            .collect();
        let boosted = json!({
            "simple_query_string": {
                "query": text,
                "fields": boost.fields,
                "analyze_wildcard": true,
                "default_operator": "AND",
            }
        });
        let boosted_exact = json!({
            "simple_query_string": {
                "query": text,
                "fields": exact_fields,
                "analyze_wildcard": true,
                "default_operator": "AND",
            }
        });
        should_wrap(vec![boosted_exact, boosted, base])
    };

    if operator == Operator::NotEquals {
        must_not_wrap(clause)
    } else {
        clause
    }
}

/// The `.exact` variant of a weighted field spec, keeping the weight.
fn exact_variant(field: &str) -> String {
    match field.split_once('^') {
        Some((name, weight)) => format!("{name}.exact^{weight}"),
        None => format!("{field}.exact"),
    }
}

/// Wraps clauses in `bool.must`.
pub fn must_wrap(clauses: Vec<Value>) -> Value {
    json!({ "bool": { "must": clauses } })
}

/// Wraps clauses in `bool.should`.
pub fn should_wrap(clauses: Vec<Value>) -> Value {
    json!({ "bool": { "should": clauses } })
}

/// Wraps a clause in `bool.must_not`.
pub fn must_not_wrap(clause: Value) -> Value {
    json!({ "bool": { "must_not": clause } })
}

/// Wraps a clause in `bool.filter`.
pub fn filter_wrap(clause: Value) -> Value {
    json!({ "bool": { "filter": clause } })
}

/// Quotes a value containing whitespace so it matches as a phrase.
fn quote_if_phrase(value: &str) -> String {
    if value.chars().any(char::is_whitespace) && !value.starts_with('"') {
        format!("\"{value}\"")
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use cq_query::parse_query;
    use cq_tree::build;
    use cq_vocab::{Disambiguator, fixtures};

    use super::*;

    fn mappings() -> EsMappings {
        EsMappings::from_json(&json!({
            "properties": {
                "contribution": {
                    "type": "nested",
                    "properties": {
                        "agent": { "properties": { "name": { "type": "text" } } },
                        "role": { "properties": { "@id": { "type": "text" } } },
                    },
                },
            },
        }))
    }

    fn compile(query: &str) -> Value {
        let vocab = fixtures::vocab();
        let disambiguator = Disambiguator::new(&vocab);
        let ast = parse_query(query).unwrap().unwrap();
        let tree = build(&ast, &disambiguator).unwrap();
        compile_node(tree.root().unwrap(), &mappings(), &BoostConfig::default())
    }

    #[test]
    fn equality_is_a_filtered_field_clause() {
        let clause = compile("year:1999");
        assert_eq!(
            clause["bool"]["filter"]["simple_query_string"]["fields"][0],
            "year"
        );
    }

    #[test]
    fn phrase_values_are_quoted() {
        let clause = compile("year:\"19 99\"");
        assert_eq!(
            clause["bool"]["filter"]["simple_query_string"]["query"],
            "\"19 99\""
        );
    }

    #[test]
    fn range_condition() {
        let clause = compile("year>=1950");
        assert_eq!(clause["bool"]["filter"]["range"]["year"]["gte"], "1950");
    }

    #[test]
    fn negated_condition_is_must_not() {
        let clause = compile("not year:1999");
        assert!(clause["bool"]["filter"]["bool"]["must_not"].is_object());
    }

    #[test]
    fn nested_field_is_nested_wrapped() {
        let clause = compile("contribution.agent.name:Tove");
        assert_eq!(clause["nested"]["path"], "contribution");
        assert_eq!(
            clause["nested"]["query"]["simple_query_string"]["fields"][0],
            "contribution.agent.name"
        );
    }

    #[test]
    fn negated_nested_field_negates_the_nested_query() {
        let clause = compile("not contribution.agent.name:Tove");
        assert_eq!(clause["bool"]["must_not"]["nested"]["path"], "contribution");
    }

    #[test]
    fn and_becomes_must() {
        let clause = compile("year:1999 extent:300");
        assert_eq!(clause["bool"]["must"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn or_becomes_should() {
        let clause = compile("year:1999 or year:2000");
        assert_eq!(clause["bool"]["should"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn chain_group_shares_one_nested_scope() {
        // translator expands to contribution.agent + role/type constraints;
        // all three share the nested contribution stem, so the whole group
        // is one nested query.
        let clause = compile("translator:\"ex:p1\"");
        let groups = clause["bool"]["should"].as_array().unwrap();
        let nested = &groups[0]["bool"]["must"][0]["nested"];
        assert_eq!(nested["path"], "contribution");
        assert_eq!(nested["query"]["bool"]["must"].as_array().unwrap().len(), 3);
    }

    #[test]
    fn free_text_searches_boost_fields() {
        let clause = compile("winter");
        let shoulds = clause["bool"]["should"].as_array().unwrap();
        assert_eq!(shoulds.len(), 3);
        assert_eq!(
            shoulds[0]["simple_query_string"]["fields"][0],
            "label.exact^20"
        );
        assert_eq!(shoulds[1]["simple_query_string"]["fields"][0], "label^20");
    }

    #[test]
    fn negated_free_text() {
        let clause = compile("not winter");
        assert!(clause["bool"]["must_not"].is_object());
    }

    #[test]
    fn empty_tree_compiles_to_match_all() {
        let compiled = compile_query(
            &cq_tree::QueryTree::empty(),
            &mappings(),
            &BoostConfig::default(),
        );
        let musts = compiled["bool"]["must"].as_array().unwrap();
        assert!(musts[0]["match_all"].is_object());
        // Function score and constant score ride along.
        assert_eq!(musts.len(), 3);
    }

    #[test]
    fn boosts_are_siblings_of_the_main_clause() {
        let vocab = fixtures::vocab();
        let disambiguator = Disambiguator::new(&vocab);
        let ast = parse_query("winter").unwrap().unwrap();
        let tree = build(&ast, &disambiguator).unwrap();
        let compiled = compile_query(&tree, &mappings(), &BoostConfig::default());
        let musts = compiled["bool"]["must"].as_array().unwrap();
        assert_eq!(musts.len(), 3);
        assert!(musts[1]["function_score"].is_object());
        assert!(musts[2]["bool"]["should"].is_array());
    }
}
