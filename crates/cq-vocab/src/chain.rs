//! Chain-axiom expansion.
//!
//! A property marked with `propertyChainAxiom` is a virtual property that
//! really is a fixed sequence of real property hops. Expansion returns the
//! hop sequence plus any implicit constraints the axiom carries: a type
//! constraint when a hop declares a `range` that is itself a vocabulary
//! class, and a value constraint when a hop carries an OWL restriction
//! (`onProperty`/`hasValue`). The caller combines the primary path and all
//! implicit constraints with AND.

use crate::index::{Ref, TermDef, Vocab};

/// The JSON-LD type key, used for implicit type constraints.
pub const TYPE_PROPERTY: &str = "@type";

/// An implicit conjunct a chain axiom adds alongside its primary path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainConstraint {
    /// Full hop path of the constrained field, ending in the constrained
    /// property (`@type` for type constraints).
    pub path: Vec<String>,
    /// The required value (a class key or an enum/value key).
    pub value: String,
}

/// The result of expanding a chain axiom.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chain {
    /// The constituent hop sequence replacing the virtual property.
    pub hops: Vec<String>,
    /// Implicit conjuncts, ANDed with the primary path.
    pub constraints: Vec<ChainConstraint>,
}

/// Expands a property's chain axiom.
///
/// Returns `None` when the property declares no chain axiom, or when a hop
/// cannot be resolved to a property key (the property is then used as a
/// plain single-hop path).
pub fn expand_chain(vocab: &Vocab, property: &str) -> Option<Chain> {
    let def = vocab.term(property)?;
    if def.property_chain_axiom.is_empty() {
        return None;
    }

    let mut hops: Vec<String> = Vec::new();
    let mut constraints = Vec::new();

    for hop in def.property_chain_axiom.iter() {
        let key = hop_key(vocab, hop)?;
        hops.push(key);

        // range on the hop that names a vocabulary class: implicit type
        // constraint on the sub-path.
        if let Some(range_class) = hop
            .range
            .iter()
            .filter_map(|r| vocab.ref_key(r))
            .find(|key| vocab.term(key).is_some_and(TermDef::is_class))
        {
            let mut path = hops.clone();
            path.push(TYPE_PROPERTY.to_string());
            constraints.push(ChainConstraint {
                path,
                value: range_class,
            });
        }

        // OWL restriction on the hop: implicit value constraint.
        if let (Some(on_property), Some(has_value)) = (&hop.on_property, &hop.has_value)
            && let Some(constrained) = vocab.ref_key(on_property)
            && let Some(value) = vocab.ref_key(has_value)
        {
            let mut path = hops.clone();
            path.push(constrained);
            constraints.push(ChainConstraint { path, value });
        }
    }

    Some(Chain { hops, constraints })
}

/// Resolves a chain hop to a property key: a direct link, or an anonymous
/// hop via its single `subPropertyOf`.
fn hop_key(vocab: &Vocab, hop: &Ref) -> Option<String> {
    if let Some(key) = vocab.ref_key(hop) {
        return Some(key);
    }
    match hop.sub_property_of.as_slice() {
        [only] => vocab.ref_key(only),
        _ => None,
    }
}
