//! Vocabulary index and disambiguation for cq catalog search.
//!
//! Consumes an already-loaded RDF vocabulary (the loader is an external
//! collaborator) and provides everything the query compiler needs to make
//! sense of user shorthand:
//!
//! - a read-only term index with class-subclass closures
//! - alias tables resolving shorthand to canonical term keys, with
//!   explicit ambiguity handling
//! - property domain inference and Work/Instance classification
//! - chain-axiom expansion for virtual properties
//!
//! Everything is built once at startup and shared read-only across
//! concurrent queries; no synchronization is needed after construction.
//!
//! # Example
//!
//! ```
//! use cq_vocab::{Disambiguator, fixtures};
//!
//! let vocab = fixtures::vocab();
//! let disambiguator = Disambiguator::new(&vocab);
//! assert_eq!(disambiguator.resolve_property("genre").unwrap(), "genreForm");
//! ```

#![warn(missing_docs)]
#![recursion_limit = "256"]

mod alias;
mod chain;
mod domain;
mod error;
pub mod fixtures;
mod index;
mod iri;

use std::collections::BTreeMap;

pub use alias::{AliasTable, TYPE_KEY};
pub use chain::{Chain, ChainConstraint, TYPE_PROPERTY, expand_chain};
pub use domain::{
    ADMIN_METADATA, DomainCategory, DomainClassifier, INSTANCE, WORK, domain_of,
    domains_by_property,
};
pub use error::{ResolveError, VocabError};
pub use index::{Context, OneOrMany, Ref, TermDef, Vocab, VocabData};
pub use iri::{expand_prefixed, looks_like_iri, to_prefixed};

/// Vocabulary-aware resolution for the query compiler.
///
/// Bundles the alias tables, the precomputed property domains and the
/// domain classifier over one vocabulary. Built once, then shared
/// read-only.
#[derive(Debug, Clone)]
pub struct Disambiguator<'v> {
    vocab: &'v Vocab,
    aliases: AliasTable,
    classifier: DomainClassifier,
    domains: BTreeMap<String, String>,
}

impl<'v> Disambiguator<'v> {
    /// Builds the disambiguation tables for a vocabulary.
    pub fn new(vocab: &'v Vocab) -> Self {
        Self {
            vocab,
            aliases: AliasTable::build(vocab),
            classifier: DomainClassifier::new(vocab),
            domains: domains_by_property(vocab),
        }
    }

    /// The underlying vocabulary.
    pub fn vocab(&self) -> &'v Vocab {
        self.vocab
    }

    /// Resolves a property alias to its canonical key.
    pub fn resolve_property(&self, alias: &str) -> Result<String, ResolveError> {
        self.aliases.resolve_property(alias, self.vocab)
    }

    /// Resolves a class alias to its canonical key.
    pub fn resolve_class(&self, alias: &str) -> Result<String, ResolveError> {
        self.aliases.resolve_class(alias, self.vocab)
    }

    /// Resolves an enumeration-value alias to its canonical key.
    pub fn resolve_enum(&self, alias: &str) -> Result<String, ResolveError> {
        self.aliases.resolve_enum(alias, self.vocab)
    }

    /// The inferred domain of a property, if any.
    pub fn domain_of(&self, property: &str) -> Option<&str> {
        self.domains.get(property).map(String::as_str)
    }

    /// The domain category of a property, driving path rewriting.
    pub fn domain_category(&self, property: &str) -> DomainCategory {
        self.classifier.classify(self.domain_of(property))
    }

    /// Expands a property's chain axiom, if it has one.
    pub fn expand_chain(&self, property: &str) -> Option<Chain> {
        expand_chain(self.vocab, property)
    }

    /// True if the key names an object property.
    pub fn is_object_property(&self, property: &str) -> bool {
        self.vocab.is_object_property(property)
    }

    /// True if the property takes vocabulary terms (enums) as values.
    pub fn has_vocab_value(&self, property: &str) -> bool {
        self.vocab.has_vocab_value(property)
    }
}
