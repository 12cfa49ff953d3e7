//! Request parameter parsing and validation.
//!
//! All validation failures here are client errors detected before any
//! backend call.

use std::collections::BTreeMap;

use crate::{error::SearchError, sort::Sort, spell::SpellMode};

/// Parameter names of the search API.
pub mod api {
    /// The query string.
    pub const QUERY: &str = "_q";
    /// The object IRI for object search.
    pub const OBJECT: &str = "_o";
    /// Selected predicates for predicate-object search.
    pub const PREDICATES: &str = "_p";
    /// Sort specification.
    pub const SORT: &str = "_sort";
    /// Page size.
    pub const LIMIT: &str = "_limit";
    /// Page offset.
    pub const OFFSET: &str = "_offset";
    /// Spell-check mode.
    pub const SPELL: &str = "_spell";
    /// Debug flags.
    pub const DEBUG: &str = "_debug";
    /// Statistics toggle (`false` skips facets).
    pub const STATS: &str = "_stats";
    /// Free-text boost field override.
    pub const BOOST: &str = "_boost";
    /// Per-facet bucket-size override (`_facetSize-<property>=<n>`).
    pub const FACET_SIZE_PREFIX: &str = "_facetSize-";
}

/// Default page size.
pub const DEFAULT_LIMIT: usize = 200;
/// Largest accepted page size; anything above falls back to the default.
pub const MAX_LIMIT: usize = 4000;

/// Debug flag requesting the compiled backend request in the view.
pub const DEBUG_ES_QUERY: &str = "esQuery";

/// Parsed and validated request parameters.
#[derive(Debug, Clone, Default)]
pub struct QueryParams {
    /// The raw query string.
    pub q: String,
    /// Object IRI for object search.
    pub object: Option<String>,
    /// Selected predicates for predicate-object search.
    pub predicates: Vec<String>,
    /// Sort specification.
    pub sort: Sort,
    /// Page size.
    pub limit: usize,
    /// Page offset.
    pub offset: usize,
    /// Spell-check mode.
    pub spell: SpellMode,
    /// Debug flags.
    pub debug: Vec<String>,
    /// True to skip facet statistics.
    pub skip_stats: bool,
    /// Free-text boost field override.
    pub boost: Option<String>,
    /// Per-facet bucket-size overrides.
    pub facet_sizes: BTreeMap<String, usize>,
}

impl QueryParams {
    /// Parses request parameters from key/value pairs.
    pub fn parse<'a>(
        pairs: impl IntoIterator<Item = (&'a str, &'a str)>,
    ) -> Result<Self, SearchError> {
        let mut params = Self {
            limit: DEFAULT_LIMIT,
            ..Self::default()
        };

        for (key, value) in pairs {
            match key {
                api::QUERY => params.q = value.to_string(),
                api::OBJECT if !value.is_empty() => params.object = Some(value.to_string()),
                api::OBJECT => {}
                api::PREDICATES => params
                    .predicates
                    .extend(split_list(value).map(ToString::to_string)),
                api::SORT => params.sort = Sort::from_spec(value),
                api::LIMIT => params.limit = parse_limit(value)?,
                api::OFFSET => params.offset = parse_offset(value)?,
                api::SPELL => params.spell = SpellMode::from_param(value),
                api::DEBUG => params
                    .debug
                    .extend(split_list(value).map(ToString::to_string)),
                api::STATS => params.skip_stats = value.eq_ignore_ascii_case("false"),
                api::BOOST if !value.is_empty() => params.boost = Some(value.to_string()),
                api::BOOST => {}
                _ => {
                    if let Some(property) = key.strip_prefix(api::FACET_SIZE_PREFIX)
                        && let Ok(size) = value.parse::<usize>()
                    {
                        params.facet_sizes.insert(property.to_string(), size);
                    }
                    // Unknown parameters are ignored.
                }
            }
        }

        Ok(params)
    }

    /// The parameters echoed into generated links, excluding the query
    /// string and offset (which each link sets itself).
    pub fn non_query_params(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::new();
        pairs.push((api::LIMIT.to_string(), self.limit.to_string()));
        if let Some(object) = &self.object {
            pairs.push((api::OBJECT.to_string(), object.clone()));
        }
        if !self.predicates.is_empty() {
            pairs.push((api::PREDICATES.to_string(), self.predicates.join(",")));
        }
        if !self.sort.is_empty() {
            pairs.push((api::SORT.to_string(), self.sort.as_spec()));
        }
        if let Some(spell) = self.spell.as_param() {
            pairs.push((api::SPELL.to_string(), spell.to_string()));
        }
        if self.skip_stats {
            pairs.push((api::STATS.to_string(), "false".to_string()));
        }
        pairs
    }

    /// True if the given debug flag was requested.
    pub fn has_debug(&self, flag: &str) -> bool {
        self.debug.iter().any(|d| d == flag)
    }
}

/// Splits a comma-separated parameter value.
fn split_list(value: &str) -> impl Iterator<Item = &str> {
    value.split(',').map(str::trim).filter(|s| !s.is_empty())
}

/// Parses and validates the limit parameter.
fn parse_limit(value: &str) -> Result<usize, SearchError> {
    let limit: i64 = value
        .parse()
        .map_err(|_| SearchError::InvalidQuery(format!("{} must be an integer", api::LIMIT)))?;
    if limit < 0 {
        return Err(SearchError::InvalidQuery(format!(
            "{} query parameter can't be negative",
            api::LIMIT
        )));
    }
    let limit = limit as usize;
    Ok(if limit > MAX_LIMIT { DEFAULT_LIMIT } else { limit })
}

/// Parses and validates the offset parameter.
fn parse_offset(value: &str) -> Result<usize, SearchError> {
    let offset: i64 = value
        .parse()
        .map_err(|_| SearchError::InvalidQuery(format!("{} must be an integer", api::OFFSET)))?;
    if offset < 0 {
        return Err(SearchError::InvalidQuery(format!(
            "{} query parameter can't be negative",
            api::OFFSET
        )));
    }
    Ok(offset as usize)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let params = QueryParams::parse([]).unwrap();
        assert_eq!(params.limit, DEFAULT_LIMIT);
        assert_eq!(params.offset, 0);
        assert!(params.q.is_empty());
        assert!(!params.skip_stats);
    }

    #[test]
    fn parses_everything() {
        let params = QueryParams::parse([
            ("_q", "winter"),
            ("_o", "https://example.org/person/1"),
            ("_p", "author,translator"),
            ("_sort", "-year"),
            ("_limit", "20"),
            ("_offset", "40"),
            ("_spell", "true"),
            ("_debug", "esQuery"),
            ("_stats", "false"),
            ("_boost", "title^5"),
            ("_facetSize-genreForm", "50"),
        ])
        .unwrap();

        assert_eq!(params.q, "winter");
        assert_eq!(params.object.as_deref(), Some("https://example.org/person/1"));
        assert_eq!(params.predicates, vec!["author", "translator"]);
        assert_eq!(params.limit, 20);
        assert_eq!(params.offset, 40);
        assert_eq!(params.spell, SpellMode::Suggest);
        assert!(params.has_debug(DEBUG_ES_QUERY));
        assert!(params.skip_stats);
        assert_eq!(params.boost.as_deref(), Some("title^5"));
        assert_eq!(params.facet_sizes.get("genreForm"), Some(&50));
    }

    #[test]
    fn negative_limit_is_rejected() {
        let err = QueryParams::parse([("_limit", "-1")]).unwrap_err();
        assert!(matches!(err, SearchError::InvalidQuery(_)));
    }

    #[test]
    fn negative_offset_is_rejected() {
        let err = QueryParams::parse([("_offset", "-5")]).unwrap_err();
        assert!(matches!(err, SearchError::InvalidQuery(_)));
    }

    #[test]
    fn oversized_limit_falls_back_to_default() {
        let params = QueryParams::parse([("_limit", "99999")]).unwrap();
        assert_eq!(params.limit, DEFAULT_LIMIT);
    }

    #[test]
    fn zero_limit_is_allowed() {
        let params = QueryParams::parse([("_limit", "0")]).unwrap();
        assert_eq!(params.limit, 0);
    }

    #[test]
    fn non_query_params_echo_round_trips() {
        let params = QueryParams::parse([
            ("_q", "winter"),
            ("_limit", "20"),
            ("_sort", "-year"),
            ("_spell", "true"),
        ])
        .unwrap();
        let pairs = params.non_query_params();
        assert!(pairs.contains(&("_limit".to_string(), "20".to_string())));
        assert!(pairs.contains(&("_sort".to_string(), "-year".to_string())));
        assert!(pairs.contains(&("_spell".to_string(), "true".to_string())));
        assert!(!pairs.iter().any(|(k, _)| k == "_q" || k == "_offset"));
    }
}
