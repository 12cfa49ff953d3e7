//! Backend query compilation and result assembly for cq catalog search.
//!
//! The top half of the crate turns a built query tree into the search
//! engine's request JSON: boolean/nested clause rendering, relevance
//! boosts, facet and predicate aggregations, sorting, pagination and
//! spell-check payloads. The bottom half consumes the engine's response
//! and assembles the paginated, faceted collection view, including the
//! speculative links (facet observations, pagination, "up" mappings) that
//! pure tree transformations make cheap to compute.
//!
//! The engine itself is behind the [`SearchClient`] trait; everything
//! else is pure and shares only read-only vocabulary and configuration.

#![warn(missing_docs)]

mod aggs;
mod boost;
mod client;
mod dsl;
mod error;
mod facets;
mod mappings;
mod pagination;
mod params;
mod result;
mod search;
mod sort;
mod spell;
mod urls;

pub use aggs::{
    Aggregation, Bucket, NESTED_AGG_NAME, PREDICATE_AGG_NAME, build_agg_query,
    build_predicate_aggs, collect_aggregations, collect_predicate_buckets, merge_buckets,
};
pub use boost::BoostConfig;
pub use client::{ClientError, SearchClient};
pub use dsl::{compile_node, compile_query};
pub use error::SearchError;
pub use facets::{build_stats, range_selected};
pub use mappings::EsMappings;
pub use pagination::{MAX_PAGEABLE_ITEMS, Offsets};
pub use params::{DEBUG_ES_QUERY, DEFAULT_LIMIT, MAX_LIMIT, QueryParams, api};
pub use result::QueryResult;
pub use search::{LINKS_FIELD, Search, SearchMode};
pub use sort::{Sort, SortParam};
pub use spell::{SpellMode, Suggestion, build_suggest_query, collect_suggestions};
pub use urls::{FIND_PATH, make_find_url, make_find_url_with_offset};
