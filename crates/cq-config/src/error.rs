//! Error types for the cq-config crate.

use thiserror::Error;

/// Errors raised while loading site configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration JSON did not match the expected shape.
    #[error("failed to parse app configuration: {0}")]
    Parse(#[from] serde_json::Error),

    /// A slice declares an unknown bucket sort key.
    #[error("slice \"{property}\": unknown sort key \"{sort}\" (expected \"count\" or \"key\")")]
    InvalidSort {
        /// The slice's property.
        property: String,
        /// The rejected sort key.
        sort: String,
    },

    /// A slice declares an unknown sort order.
    #[error("slice \"{property}\": unknown sort order \"{order}\" (expected \"asc\" or \"desc\")")]
    InvalidSortOrder {
        /// The slice's property.
        property: String,
        /// The rejected order.
        order: String,
    },

    /// A slice declares an unknown multi-select connective.
    #[error("slice \"{property}\": unknown connective \"{connective}\" (expected \"AND\" or \"OR\")")]
    InvalidConnective {
        /// The slice's property.
        property: String,
        /// The rejected connective.
        connective: String,
    },
}
