//! Error types for the cq-vocab crate.

use thiserror::Error;

/// Errors that can occur when loading a vocabulary.
#[derive(Debug, Error)]
pub enum VocabError {
    /// The vocabulary JSON did not match the expected shape.
    #[error("failed to parse vocabulary: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Failure to resolve a user-typed alias to a canonical vocabulary term.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    /// The alias matches no vocabulary term.
    #[error("unrecognized alias: {0}")]
    Unknown(String),

    /// The alias matches more than one vocabulary term.
    #[error("ambiguous alias \"{alias}\", candidates: {}", candidates.join(", "))]
    Ambiguous {
        /// The offending alias.
        alias: String,
        /// The canonical keys that claim this alias, sorted.
        candidates: Vec<String>,
    },
}
