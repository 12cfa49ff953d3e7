//! Error types for the cq-search crate.

use thiserror::Error;

/// Errors raised while compiling, executing or assembling a search.
///
/// Validation failures ([`SearchError::InvalidQuery`]) are detected before
/// any backend call and are never retried; backend failures are a distinct
/// class so callers can tell a bad query from an unavailable engine.
#[derive(Debug, Error)]
pub enum SearchError {
    /// The request is invalid: bad query syntax, unresolvable aliases,
    /// out-of-range pagination, or a missing search mode parameter.
    #[error("invalid query: {0}")]
    InvalidQuery(String),

    /// The search engine could not be reached or itself failed.
    #[error("search backend unavailable: {0}")]
    Backend(String),

    /// The engine responded with something that does not match the
    /// response contract.
    #[error("malformed backend response: {0}")]
    MalformedResponse(String),
}

impl From<cq_query::QueryError> for SearchError {
    fn from(err: cq_query::QueryError) -> Self {
        Self::InvalidQuery(err.to_string())
    }
}

impl From<cq_tree::BuildError> for SearchError {
    fn from(err: cq_tree::BuildError) -> Self {
        Self::InvalidQuery(err.to_string())
    }
}
