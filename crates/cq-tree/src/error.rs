//! Error types for query tree building.

use cq_vocab::ResolveError;
use thiserror::Error;

/// Errors raised while turning a flattened AST into a query tree.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
    /// A field code matches no vocabulary property.
    #[error("unrecognized property alias: {0}")]
    UnknownProperty(String),

    /// An alias (property, class or enumeration) matches more than one
    /// vocabulary term.
    #[error("ambiguous alias \"{alias}\", candidates: {}", candidates.join(", "))]
    AmbiguousAlias {
        /// The offending alias.
        alias: String,
        /// The canonical keys claiming the alias, sorted.
        candidates: Vec<String>,
    },

    /// A type value matches no vocabulary class.
    #[error("unrecognized type: {0}")]
    UnknownType(String),

    /// A value for an enumeration-valued property matches no enumeration.
    #[error("invalid value \"{value}\" for property {property}")]
    InvalidEnumValue {
        /// The property whose value was rejected.
        property: String,
        /// The rejected value.
        value: String,
    },

    /// A path segment is neither a property alias nor an indexable key.
    #[error("unrecognized path segment: {0}")]
    UnknownPathSegment(String),
}

impl BuildError {
    /// Converts a property-resolution failure, keeping the candidates.
    pub(crate) fn from_property_resolve(err: ResolveError) -> Self {
        match err {
            ResolveError::Unknown(alias) => Self::UnknownProperty(alias),
            ResolveError::Ambiguous { alias, candidates } => {
                Self::AmbiguousAlias { alias, candidates }
            }
        }
    }
}
