//! Query tree construction.
//!
//! Converts a flattened AST into a typed query tree, using the vocabulary
//! to resolve codes and values, expand chain axioms and decide per-property
//! search paths. Work/Instance handling is driven by the query's outset:
//!
//! - A property bound to the *other* level than the outset gets its path
//!   rewritten to traverse between levels.
//! - A property whose level cannot be decided (creation supertype, unknown
//!   domain) gets the traversal added as an *alternate* path instead — an
//!   OR over both variants, which widens the result set but never narrows
//!   it.

use cq_query::{FlattenedAst, Operator, WILDCARD};
use cq_vocab::{Chain, ChainConstraint, Disambiguator, DomainCategory, TYPE_KEY, looks_like_iri};

use crate::{
    error::BuildError,
    node::{FreeText, Node, PathValue, QueryTree},
    path::{self, Path},
    value::Value,
};

/// The level a query is anchored at, inferred from explicit type filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outset {
    /// Every given type is Work-compatible.
    Work,
    /// Every given type is Instance-compatible.
    Instance,
    /// Mixed or absent type filters; no rewriting or branching applies.
    Resource,
}

impl Outset {
    /// Infers the outset by scanning the flattened AST for `rdf:type`
    /// equality conditions. Aliases that fail to resolve are ignored here;
    /// they error during the build proper.
    pub fn infer(ast: &FlattenedAst, disambiguator: &Disambiguator<'_>) -> Self {
        let mut types = Vec::new();
        collect_given_types(ast, disambiguator, &mut types);
        if types.is_empty() {
            return Self::Resource;
        }

        let vocab = disambiguator.vocab();
        if types.iter().all(|t| vocab.is_sub_class_of(t, cq_vocab::WORK)) {
            Self::Work
        } else if types
            .iter()
            .all(|t| vocab.is_sub_class_of(t, cq_vocab::INSTANCE))
        {
            Self::Instance
        } else {
            Self::Resource
        }
    }
}

/// Collects resolved `rdf:type` equality values.
fn collect_given_types(
    ast: &FlattenedAst,
    disambiguator: &Disambiguator<'_>,
    types: &mut Vec<String>,
) {
    match ast {
        FlattenedAst::And(operands) | FlattenedAst::Or(operands) => {
            for operand in operands {
                collect_given_types(operand, disambiguator, types);
            }
        }
        FlattenedAst::Code {
            code,
            operator: Operator::Equals,
            value,
        } => {
            if disambiguator.resolve_property(code).as_deref() == Ok(TYPE_KEY)
                && let Ok(class) = disambiguator.resolve_class(value)
            {
                types.push(class);
            }
        }
        FlattenedAst::Code { .. } | FlattenedAst::Not(_) | FlattenedAst::Leaf(_) => {}
    }
}

/// Builds a query tree from a flattened AST.
pub fn build(
    ast: &FlattenedAst,
    disambiguator: &Disambiguator<'_>,
) -> Result<QueryTree, BuildError> {
    let outset = Outset::infer(ast, disambiguator);
    build_with_outset(ast, disambiguator, outset)
}

/// Builds a query tree with an explicitly chosen outset.
pub fn build_with_outset(
    ast: &FlattenedAst,
    disambiguator: &Disambiguator<'_>,
    outset: Outset,
) -> Result<QueryTree, BuildError> {
    Ok(QueryTree::new(convert(ast, disambiguator, outset)?))
}

/// Converts one flattened-AST node.
fn convert(
    ast: &FlattenedAst,
    disambiguator: &Disambiguator<'_>,
    outset: Outset,
) -> Result<Node, BuildError> {
    match ast {
        FlattenedAst::And(operands) => Ok(Node::and(
            operands
                .iter()
                .map(|o| convert(o, disambiguator, outset))
                .collect::<Result<_, _>>()?,
        )),
        FlattenedAst::Or(operands) => Ok(Node::or(
            operands
                .iter()
                .map(|o| convert(o, disambiguator, outset))
                .collect::<Result<_, _>>()?,
        )),
        FlattenedAst::Leaf(value) => Ok(Node::FreeText(FreeText {
            operator: Operator::Equals,
            value: value.clone(),
        })),
        FlattenedAst::Not(value) => Ok(Node::FreeText(FreeText {
            operator: Operator::NotEquals,
            value: value.clone(),
        })),
        FlattenedAst::Code {
            code,
            operator,
            value,
        } => build_condition(code, *operator, value, disambiguator, outset),
    }
}

/// Builds the node for one `code <op> value` condition.
fn build_condition(
    code: &str,
    operator: Operator,
    value: &str,
    disambiguator: &Disambiguator<'_>,
    outset: Outset,
) -> Result<Node, BuildError> {
    let segments = resolve_segments(code, disambiguator)?;
    let property = segments
        .iter()
        .rev()
        .find(|s| s.resolved)
        .map(|s| s.key.clone());
    let hops: Vec<String> = segments.into_iter().map(|s| s.key).collect();

    // A dotted code is taken as an accurate path: the user addressed the
    // index directly, so no chain expansion or level rewriting applies.
    if hops.len() > 1 {
        return build_accurate(hops, property.as_deref(), operator, value, disambiguator);
    }

    let Some(property) = property else {
        return Err(BuildError::UnknownProperty(code.to_string()));
    };

    if property == TYPE_KEY {
        return build_type_condition(operator, value, disambiguator);
    }

    let typed = type_value(&property, value, disambiguator)?;

    // Chain axioms replace the virtual property with its real hops and may
    // add implicit constraint conjuncts.
    let chain = disambiguator.expand_chain(&property);
    let (stem, constraints) = match &chain {
        Some(Chain { hops, constraints }) => (hops.clone(), constraints.as_slice()),
        None => (vec![property.clone()], [].as_slice()),
    };

    let category = disambiguator.domain_category(&property);
    let plan = RootPlan::decide(category, outset);

    let suffix = value_suffix(&property, &typed, disambiguator);

    let variants: Vec<Node> = plan
        .prefixes()
        .iter()
        .map(|prefix| {
            build_variant(
                prefix,
                &stem,
                constraints,
                &property,
                operator,
                &typed,
                suffix,
                disambiguator,
            )
        })
        .collect();

    Ok(combine(variants, operator))
}

/// A resolved code segment.
struct Segment {
    /// Canonical key (or the raw indexable key).
    key: String,
    /// True if the segment resolved to a vocabulary property.
    resolved: bool,
}

/// Resolves the dot-separated segments of a code.
fn resolve_segments(
    code: &str,
    disambiguator: &Disambiguator<'_>,
) -> Result<Vec<Segment>, BuildError> {
    code.split('.')
        .map(|segment| match disambiguator.resolve_property(segment) {
            Ok(key) => Ok(Segment {
                key,
                resolved: true,
            }),
            Err(err) => {
                // Raw JSON-LD keys and underscore-prefixed index keys are
                // legal path segments even though they are not vocabulary
                // terms.
                if segment.starts_with('@') || segment.starts_with('_') {
                    Ok(Segment {
                        key: segment.to_string(),
                        resolved: false,
                    })
                } else {
                    Err(BuildError::from_property_resolve(err))
                }
            }
        })
        .collect()
}

/// Builds the node for a dotted, user-specified path.
fn build_accurate(
    mut hops: Vec<String>,
    property: Option<&str>,
    operator: Operator,
    value: &str,
    disambiguator: &Disambiguator<'_>,
) -> Result<Node, BuildError> {
    let typed = match property {
        Some(TYPE_KEY) => {
            let class = disambiguator
                .resolve_class(value)
                .map_err(|_| BuildError::UnknownType(value.to_string()))?;
            // The type key addresses the index directly.
            if hops.last().map(String::as_str) == Some(TYPE_KEY) {
                hops.pop();
                hops.push(path::TYPE_KEY.to_string());
            }
            Value::VocabTerm(class)
        }
        Some(p) => type_value(p, value, disambiguator)?,
        None => Value::Literal(value.to_string()),
    };

    if let Some(p) = property
        && let Some(suffix) = value_suffix(p, &typed, disambiguator)
        && hops.last().map(String::as_str) == Some(p)
    {
        hops.push(suffix.to_string());
    }

    let rendered_property = hops.join(".");
    Ok(Node::PathValue(PathValue {
        property: rendered_property,
        path: Path::new(hops),
        operator,
        value: typed,
    }))
}

/// Builds the node for an `rdf:type` condition, expanding Work/Instance to
/// their subclass closures.
fn build_type_condition(
    operator: Operator,
    value: &str,
    disambiguator: &Disambiguator<'_>,
) -> Result<Node, BuildError> {
    let class = disambiguator
        .resolve_class(value)
        .map_err(|_| BuildError::UnknownType(value.to_string()))?;

    let vocab = disambiguator.vocab();
    let alternatives: Vec<String> = if class == cq_vocab::WORK || class == cq_vocab::INSTANCE {
        let mut classes = vocab.sub_classes(&class);
        classes.insert(class.clone());
        classes.into_iter().collect()
    } else {
        vec![class]
    };

    let nodes: Vec<Node> = alternatives
        .into_iter()
        .map(|class| {
            Node::PathValue(PathValue {
                property: TYPE_KEY.to_string(),
                path: Path::new([path::TYPE_KEY]),
                operator,
                value: Value::VocabTerm(class),
            })
        })
        .collect();

    Ok(combine(nodes, operator))
}

/// Types a value against its property.
fn type_value(
    property: &str,
    value: &str,
    disambiguator: &Disambiguator<'_>,
) -> Result<Value, BuildError> {
    if value == WILDCARD {
        return Ok(Value::Literal(WILDCARD.to_string()));
    }

    if disambiguator.has_vocab_value(property) {
        return match disambiguator.resolve_enum(value) {
            Ok(key) => Ok(Value::VocabTerm(key)),
            Err(cq_vocab::ResolveError::Unknown(_)) => Err(BuildError::InvalidEnumValue {
                property: property.to_string(),
                value: value.to_string(),
            }),
            Err(cq_vocab::ResolveError::Ambiguous { alias, candidates }) => {
                Err(BuildError::AmbiguousAlias { alias, candidates })
            }
        };
    }

    if disambiguator.is_object_property(property) {
        let expanded = disambiguator.vocab().expand_prefixed(value);
        if looks_like_iri(&expanded) {
            return Ok(Value::Link(expanded));
        }
    }

    Ok(Value::Literal(value.to_string()))
}

/// The suffix an object-property value needs, if any: `@id` for links, the
/// search-string key for plain literals. Both are added as alternates
/// alongside the base path, since the same property may be stored as
/// either a link or a string depending on cataloging practice.
fn value_suffix(
    property: &str,
    value: &Value,
    disambiguator: &Disambiguator<'_>,
) -> Option<&'static str> {
    if !disambiguator.is_object_property(property) || disambiguator.has_vocab_value(property) {
        return None;
    }
    match value {
        Value::Link(_) => Some(path::ID_KEY),
        Value::Literal(v) if v != WILDCARD => Some(path::SEARCH_KEY),
        _ => None,
    }
}

/// The root prefixes a condition expands over.
enum RootPlan {
    /// Only the base path.
    Base,
    /// The base path is replaced by a rewritten variant.
    Rewrite(&'static [&'static str]),
    /// The base path plus a widening alternate.
    Branch(&'static [&'static str]),
}

/// Work-to-Instance traversal: the reverse instance relation.
const FROM_WORK: [&str; 2] = [path::REVERSE_KEY, path::WORK_KEY];
/// Instance-to-Work traversal: the embedded work.
const FROM_INSTANCE: [&str; 1] = [path::WORK_KEY];

impl RootPlan {
    /// Decides rewriting/branching from the domain category and outset.
    fn decide(category: DomainCategory, outset: Outset) -> Self {
        match (outset, category) {
            (Outset::Work, DomainCategory::Instance | DomainCategory::Embodiment) => {
                Self::Rewrite(&FROM_WORK)
            }
            (Outset::Work, DomainCategory::CreationSuper | DomainCategory::Unknown) => {
                Self::Branch(&FROM_WORK)
            }
            (Outset::Instance, DomainCategory::Work) => Self::Rewrite(&FROM_INSTANCE),
            (Outset::Instance, DomainCategory::CreationSuper | DomainCategory::Unknown) => {
                Self::Branch(&FROM_INSTANCE)
            }
            _ => Self::Base,
        }
    }

    /// The prefixes to expand over, in order.
    fn prefixes(&self) -> Vec<&'static [&'static str]> {
        match self {
            Self::Base => vec![&[]],
            Self::Rewrite(prefix) => vec![prefix],
            Self::Branch(prefix) => vec![&[], prefix],
        }
    }
}

/// Builds the conjunct for one root variant: the primary condition (with
/// its suffix alternates) plus the chain's implicit constraints, all under
/// the same prefix so nested-field grouping can keep them on one object.
#[expect(clippy::too_many_arguments, reason = "internal assembly step")]
fn build_variant(
    prefix: &[&str],
    stem: &[String],
    constraints: &[ChainConstraint],
    property: &str,
    operator: Operator,
    value: &Value,
    suffix: Option<&'static str>,
    disambiguator: &Disambiguator<'_>,
) -> Node {
    let mut primary = prefixed_path(prefix, stem);
    let admin = disambiguator.domain_category(property) == DomainCategory::AdminMetadata;
    if admin {
        primary = primary.prepend_record();
    }
    if let Some(suffix) = suffix {
        primary = primary.branch_suffix(suffix);
    }

    let constraint_nodes: Vec<Node> = constraints
        .iter()
        .map(|constraint| {
            let mut path = prefixed_path(prefix, &constraint.path);
            if admin {
                path = path.prepend_record();
            }
            let constrained = constraint.path.last().cloned().unwrap_or_default();
            Node::PathValue(PathValue {
                property: constrained,
                path,
                operator: Operator::Equals,
                value: Value::VocabTerm(constraint.value.clone()),
            })
        })
        .collect();

    // One group per concrete path so the backend compiler can scope the
    // primary condition and its constraints to the same nested object.
    let groups: Vec<Node> = primary
        .expand()
        .into_iter()
        .map(|path| {
            let primary_node = Node::PathValue(PathValue {
                property: property.to_string(),
                path,
                operator,
                value: value.clone(),
            });
            if constraint_nodes.is_empty() {
                primary_node
            } else {
                let mut conjuncts = vec![primary_node];
                conjuncts.extend(constraint_nodes.iter().cloned());
                Node::And(conjuncts)
            }
        })
        .collect();

    combine(groups, operator)
}

/// A path from a root prefix plus stem hops.
fn prefixed_path(prefix: &[&str], stem: &[String]) -> Path {
    let hops: Vec<String> = prefix
        .iter()
        .map(ToString::to_string)
        .chain(stem.iter().cloned())
        .collect();
    Path::new(hops)
}

/// The concrete index paths a property is aggregated at, given an outset:
/// the chain-expanded stem with record prefixing and Work/Instance
/// branching applied. Object-property aggregations address the `@id`
/// subfield, since their buckets are links.
pub fn search_paths(
    property: &str,
    disambiguator: &Disambiguator<'_>,
    outset: Outset,
) -> Vec<Path> {
    if property == TYPE_KEY {
        return vec![Path::new([path::TYPE_KEY])];
    }

    let stem = match disambiguator.expand_chain(property) {
        Some(chain) => chain.hops,
        None => vec![property.to_string()],
    };
    let category = disambiguator.domain_category(property);

    RootPlan::decide(category, outset)
        .prefixes()
        .iter()
        .map(|prefix| {
            let mut path = prefixed_path(prefix, &stem);
            if category == DomainCategory::AdminMetadata {
                path = path.prepend_record();
            }
            if disambiguator.is_object_property(property)
                && !disambiguator.has_vocab_value(property)
            {
                path = path.append(path::ID_KEY);
            }
            path
        })
        .collect()
}

/// Combines alternates: OR widens under a positive operator, AND under a
/// negated one (every alternate must miss).
fn combine(mut nodes: Vec<Node>, operator: Operator) -> Node {
    if nodes.len() == 1 {
        return nodes.remove(0);
    }
    if operator == Operator::NotEquals {
        Node::And(nodes)
    } else {
        Node::Or(nodes)
    }
}
