//! Search URL construction.
//!
//! Every generated link (facet observations, pagination, "up" links in the
//! search mapping) is a `/find` URL reconstructed from a query tree plus
//! the request's non-query parameters.

use cq_tree::QueryTree;
use url::form_urlencoded;

use crate::params::{QueryParams, api};

/// The search endpoint path.
pub const FIND_PATH: &str = "/find";

/// Builds a `/find` URL for a query tree, echoing the request's non-query
/// parameters.
pub fn make_find_url(tree: &QueryTree, params: &QueryParams) -> String {
    make_find_url_with_offset(tree, params, None)
}

/// Builds a `/find` URL pinned to a specific offset.
pub fn make_find_url_with_offset(
    tree: &QueryTree,
    params: &QueryParams,
    offset: Option<usize>,
) -> String {
    let mut serializer = form_urlencoded::Serializer::new(String::new());

    let query_string = tree.to_query_string();
    serializer.append_pair(
        api::QUERY,
        if query_string.is_empty() { "*" } else { &query_string },
    );
    for (key, value) in params.non_query_params() {
        serializer.append_pair(&key, &value);
    }
    if let Some(offset) = offset.filter(|o| *o > 0) {
        serializer.append_pair(api::OFFSET, &offset.to_string());
    }

    format!("{FIND_PATH}?{}", serializer.finish())
}
