//! Per-site search configuration for cq.
//!
//! A deployment configures its search behavior as JSON: which properties
//! become facets (and how each is sized, sorted and selected), which
//! filters apply to every search by default, and which relation properties
//! summarize how an object is referenced ("curated predicates"). Loaded
//! once per request from the site configuration; read-only afterwards.

#![warn(missing_docs)]

mod error;

use std::collections::BTreeMap;

use serde::Deserialize;

pub use error::ConfigError;

/// Default bucket count for a facet slice.
pub const DEFAULT_BUCKET_SIZE: usize = 10;

/// How a slice's buckets are sorted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BucketSort {
    /// By document count.
    #[default]
    Count,
    /// By bucket key.
    Key,
}

impl BucketSort {
    /// The backend sort key for a term aggregation.
    pub fn backend_key(self) -> &'static str {
        match self {
            Self::Count => "_count",
            Self::Key => "_key",
        }
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    /// Descending.
    #[default]
    Desc,
    /// Ascending.
    Asc,
}

impl SortOrder {
    /// The backend order string.
    pub fn backend_key(self) -> &'static str {
        match self {
            Self::Desc => "desc",
            Self::Asc => "asc",
        }
    }
}

/// The boolean connective for multi-selected facet values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Connective {
    /// Every additional selection narrows the result further.
    #[default]
    And,
    /// Additional selections widen: values are OR-ed.
    Or,
}

impl Connective {
    /// The name shown in result views.
    pub fn name(self) -> &'static str {
        match self {
            Self::And => "AND",
            Self::Or => "OR",
        }
    }
}

/// One configured facet: a property whose value distribution is aggregated
/// and offered as a narrowing control.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Slice {
    /// The property to aggregate.
    pub property: String,
    /// Bucket count.
    pub size: usize,
    /// Bucket sort key.
    pub sort: BucketSort,
    /// Bucket sort order.
    pub sort_order: SortOrder,
    /// True for range facets (rendered as a min/max template instead of
    /// one link per bucket).
    pub range: bool,
    /// Default connective for multiple selected values.
    pub connective: Connective,
}

/// The full site configuration.
#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    /// Configured facet slices, in display order.
    pub slices: Vec<Slice>,
    /// Raw filter query strings AND-ed onto every search.
    pub default_filters: Vec<String>,
    /// Curated reverse predicates per type, used by object search.
    pub relation_filters: BTreeMap<String, Vec<String>>,
}

impl AppConfig {
    /// Loads the configuration from JSON.
    pub fn from_json(json: serde_json::Value) -> Result<Self, ConfigError> {
        let raw: RawConfig = serde_json::from_value(json)?;

        let slices = raw
            .slice_list
            .into_iter()
            .map(RawSlice::into_slice)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            slices,
            default_filters: raw.default_filters,
            relation_filters: raw.relation_filters,
        })
    }

    /// Looks up the slice configured for a property.
    pub fn slice(&self, property: &str) -> Option<&Slice> {
        self.slices.iter().find(|s| s.property == property)
    }

    /// The curated predicates for a type, if configured.
    pub fn curated_predicates(&self, type_key: &str) -> &[String] {
        self.relation_filters
            .get(type_key)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }
}

/// Raw JSON shape of the configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct RawConfig {
    /// Facet slices.
    #[serde(rename = "sliceList")]
    slice_list: Vec<RawSlice>,
    /// Default filter query strings.
    #[serde(rename = "defaultFilters")]
    default_filters: Vec<String>,
    /// Curated predicates per type.
    #[serde(rename = "relationFilters")]
    relation_filters: BTreeMap<String, Vec<String>>,
}

/// Raw JSON shape of one slice.
#[derive(Debug, Clone, Deserialize)]
struct RawSlice {
    /// The property to aggregate.
    property: String,
    /// Bucket count.
    size: Option<usize>,
    /// Bucket sort key: "count" or "key".
    sort: Option<String>,
    /// Sort order: "asc" or "desc".
    #[serde(rename = "sortOrder")]
    sort_order: Option<String>,
    /// Range facet flag.
    #[serde(default)]
    range: bool,
    /// Multi-select connective: "AND" or "OR".
    connective: Option<String>,
}

impl RawSlice {
    /// Validates and converts a raw slice.
    fn into_slice(self) -> Result<Slice, ConfigError> {
        let sort = match self.sort.as_deref() {
            None | Some("count") => BucketSort::Count,
            Some("key") => BucketSort::Key,
            Some(other) => {
                return Err(ConfigError::InvalidSort {
                    property: self.property,
                    sort: other.to_string(),
                });
            }
        };
        let sort_order = match self.sort_order.as_deref() {
            None | Some("desc") => SortOrder::Desc,
            Some("asc") => SortOrder::Asc,
            Some(other) => {
                return Err(ConfigError::InvalidSortOrder {
                    property: self.property,
                    order: other.to_string(),
                });
            }
        };
        let connective = match self.connective.as_deref() {
            None | Some("AND") => Connective::And,
            Some("OR") => Connective::Or,
            Some(other) => {
                return Err(ConfigError::InvalidConnective {
                    property: self.property,
                    connective: other.to_string(),
                });
            }
        };

        Ok(Slice {
            property: self.property,
            size: self.size.unwrap_or(DEFAULT_BUCKET_SIZE),
            sort,
            sort_order,
            range: self.range,
            connective,
        })
    }
}
