//! Search orchestration: mode dispatch, request assembly and the result
//! view.
//!
//! A search runs as a pure pipeline per request: parse, build the query
//! tree, compile the backend request(s), execute through the client, and
//! assemble the paginated, faceted collection view. The only shared state
//! is the read-only vocabulary and configuration passed in at
//! construction.

use cq_config::AppConfig;
use cq_query::{FlattenedAst, Operator, parse_query};
use cq_tree::{
    Node, Outset, Path, PathValue, QueryTree, Value as TreeValue, build_with_outset,
};
use cq_vocab::Disambiguator;
use serde_json::{Map, Value, json};

use crate::{
    aggs,
    boost::BoostConfig,
    client::SearchClient,
    dsl,
    error::SearchError,
    facets,
    mappings::EsMappings,
    pagination::Offsets,
    params::{DEBUG_ES_QUERY, QueryParams},
    result::QueryResult,
    spell::{self, SpellMode},
    urls,
};

/// The reverse-link field recording which documents reference a record.
pub const LINKS_FIELD: &str = "_links";

/// The search mode, decided by the given parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchMode {
    /// A free-text/condition query.
    Standard,
    /// All records referencing an object, with per-predicate counts.
    Object,
    /// Records referencing an object via selected predicates.
    PredicateObject,
}

/// A prepared search: validated parameters, a built query tree, and
/// everything needed to compile and execute the backend requests.
#[derive(Debug, Clone)]
pub struct Search<'a> {
    disambiguator: &'a Disambiguator<'a>,
    config: &'a AppConfig,
    mappings: &'a EsMappings,
    params: QueryParams,
    boost: BoostConfig,
    mode: SearchMode,
    /// The user's query (plus default filters); drives URLs and mappings.
    tree: QueryTree,
    /// The executed tree: `tree` plus any object-search conditions.
    query_tree: QueryTree,
    outset: Outset,
}

impl<'a> Search<'a> {
    /// Validates the parameters and builds the query tree. All failures
    /// here are client errors, raised before any backend call.
    pub fn new(
        params: QueryParams,
        disambiguator: &'a Disambiguator<'a>,
        config: &'a AppConfig,
        mappings: &'a EsMappings,
    ) -> Result<Self, SearchError> {
        let mode = match (&params.object, params.q.trim().is_empty()) {
            (Some(_), _) if params.predicates.is_empty() => SearchMode::Object,
            (Some(_), _) => SearchMode::PredicateObject,
            (None, false) => SearchMode::Standard,
            (None, true) => {
                return Err(SearchError::InvalidQuery(
                    "missing search mode parameter: provide _q or _o".to_string(),
                ));
            }
        };

        let ast = parse_query(&params.q)?;
        let (outset, mut tree) = match &ast {
            Some(ast) => {
                let outset = Outset::infer(ast, disambiguator);
                (outset, build_with_outset(ast, disambiguator, outset)?)
            }
            None => (Outset::Resource, QueryTree::empty()),
        };

        tree = apply_default_filters(tree, config, disambiguator, outset)?;
        let query_tree = match (mode, &params.object) {
            (SearchMode::Object, Some(object)) => tree.add(links_node(object)),
            (SearchMode::PredicateObject, Some(object)) => tree.add(predicate_selection(
                object,
                &params.predicates,
                disambiguator,
            )?),
            _ => tree.clone(),
        };

        let boost = match &params.boost {
            Some(spec) => BoostConfig::default().with_field_override(spec),
            None => BoostConfig::default(),
        };

        Ok(Self {
            disambiguator,
            config,
            mappings,
            params,
            boost,
            mode,
            tree,
            query_tree,
            outset,
        })
    }

    /// The decided search mode.
    pub fn mode(&self) -> SearchMode {
        self.mode
    }

    /// The built query tree.
    pub fn tree(&self) -> &QueryTree {
        &self.tree
    }

    /// The inferred outset.
    pub fn outset(&self) -> Outset {
        self.outset
    }

    /// Compiles the main backend request.
    pub fn request(&self) -> Value {
        let suggest = match self.params.spell {
            SpellMode::Off => None,
            SpellMode::Suggest | SpellMode::SuggestOnly => {
                let text = self.tree.free_text_part().unwrap_or(&self.params.q);
                Some(spell::build_suggest_query(text))
            }
        };

        // Suggest-only mode skips the search itself.
        if self.params.spell == SpellMode::SuggestOnly
            && let Some(suggest) = &suggest
        {
            return json!({ "suggest": suggest, "size": 0, "track_total_hits": true });
        }

        let mut request = Map::new();
        request.insert(
            "query".to_string(),
            dsl::compile_query(&self.query_tree, self.mappings, &self.boost),
        );
        request.insert("size".to_string(), json!(self.params.limit));
        request.insert("from".to_string(), json!(self.params.offset));

        if !self.params.sort.is_empty() {
            let clauses = self.params.sort.to_clauses(|field| {
                if self.mappings.has_keyword_subfield(field) {
                    format!("{field}.keyword")
                } else {
                    field.to_string()
                }
            });
            request.insert("sort".to_string(), clauses);
        }

        if let Some(suggest) = suggest {
            request.insert("suggest".to_string(), suggest);
        }

        if !self.params.skip_stats {
            request.insert(
                "aggs".to_string(),
                aggs::build_agg_query(
                    self.config,
                    self.disambiguator,
                    self.outset,
                    self.mappings,
                    &self.params.facet_sizes,
                ),
            );
        }

        request.insert("track_total_hits".to_string(), json!(true));
        Value::Object(request)
    }

    /// Compiles the predicate aggregation request, when the mode needs
    /// one. This is a distinct query shape issued in parallel with the
    /// main request.
    pub fn predicate_request(&self) -> Option<Value> {
        if !matches!(self.mode, SearchMode::Object | SearchMode::PredicateObject)
            || self.params.skip_stats
        {
            return None;
        }
        let object = self.params.object.as_deref()?;

        let predicates = self.curated_predicates();
        if predicates.is_empty() {
            return None;
        }

        let aggs = aggs::build_predicate_aggs(
            object,
            &predicates,
            self.disambiguator,
            self.mappings,
        );
        if aggs.as_object().is_some_and(Map::is_empty) {
            return None;
        }

        Some(json!({
            "query": { "match_all": {} },
            "size": 0,
            "aggs": aggs,
            "track_total_hits": true,
        }))
    }

    /// Executes the search and assembles the collection view.
    ///
    /// Backend failures surface as [`SearchError::Backend`]; a missing or
    /// malformed predicate aggregation degrades to a view without
    /// predicate counts rather than failing the whole search.
    pub fn execute(&self, client: &impl SearchClient) -> Result<Value, SearchError> {
        let mut requests = vec![self.request()];
        if let Some(predicate_request) = self.predicate_request() {
            requests.push(predicate_request);
        }
        tracing::debug!(requests = requests.len(), mode = ?self.mode, "executing search");

        let responses = client
            .multi_search(&requests)
            .map_err(|err| SearchError::Backend(err.to_string()))?;
        let Some(main_response) = responses.first() else {
            return Err(SearchError::MalformedResponse(
                "no response for main query".to_string(),
            ));
        };
        let result = QueryResult::from_response(main_response)?;

        let predicate_buckets = match responses.get(1) {
            Some(response) => aggs::collect_predicate_buckets(response),
            None if requests.len() > 1 => {
                tracing::warn!("predicate aggregation response missing; omitting counts");
                Vec::new()
            }
            None => Vec::new(),
        };

        Ok(self.build_view(&result, &predicate_buckets))
    }

    /// Assembles the partial collection view.
    fn build_view(&self, result: &QueryResult, predicate_buckets: &[aggs::Bucket]) -> Value {
        let mut view = Map::new();
        view.insert("@type".to_string(), json!("PartialCollectionView"));
        view.insert(
            "@id".to_string(),
            json!(urls::make_find_url_with_offset(
                &self.tree,
                &self.params,
                Some(self.params.offset),
            )),
        );
        view.insert("itemOffset".to_string(), json!(self.params.offset));
        view.insert("itemsPerPage".to_string(), json!(self.params.limit));
        view.insert("totalItems".to_string(), json!(result.total));

        view.insert(
            "search".to_string(),
            json!({ "mapping": self.search_mapping() }),
        );

        let pageable = result.total.min(crate::pagination::MAX_PAGEABLE_ITEMS);
        if let Some(offsets) = Offsets::new(pageable, self.params.limit, self.params.offset) {
            let link = |offset: usize| {
                json!({
                    "@id": urls::make_find_url_with_offset(
                        &self.tree,
                        &self.params,
                        Some(offset),
                    )
                })
            };
            if let Some(first) = offsets.first {
                view.insert("first".to_string(), link(first));
            }
            if let Some(prev) = offsets.prev {
                view.insert("previous".to_string(), link(prev));
            }
            if let Some(next) = offsets.next {
                view.insert("next".to_string(), link(next));
            }
            view.insert("last".to_string(), link(offsets.last));
        }

        view.insert("items".to_string(), Value::Array(result.items.clone()));

        if !self.params.skip_stats {
            let mut stats = facets::build_stats(
                &result.aggregations,
                &self.tree,
                self.config,
                &self.params,
            );
            if !predicate_buckets.is_empty()
                && let Some(stats_map) = stats.as_object_mut()
            {
                stats_map.insert(
                    "_predicates".to_string(),
                    self.predicate_observations(predicate_buckets),
                );
            }
            view.insert("stats".to_string(), stats);
        }

        if !result.spell.is_empty() {
            let suggestions: Vec<Value> = result
                .spell
                .iter()
                .map(|s| json!({ "label": s.text, "labelHtml": s.highlighted }))
                .collect();
            view.insert("_spell".to_string(), Value::Array(suggestions));
        }

        if self.params.has_debug(DEBUG_ES_QUERY) {
            view.insert(
                "_debug".to_string(),
                json!({ DEBUG_ES_QUERY: self.request() }),
            );
        }

        Value::Object(view)
    }

    /// The human-readable reconstruction of the query, one mapping per
    /// top-level fragment, each with an "up" link to the query without
    /// that fragment. Range conditions represented by a range-facet
    /// template are excluded.
    fn search_mapping(&self) -> Vec<Value> {
        let displayed = self
            .tree
            .remove_all(facets::range_selected(&self.tree, self.config).iter());

        displayed
            .top_level_nodes()
            .into_iter()
            .map(|node| {
                let mut mapping = match mapping_fragment(node) {
                    Value::Object(map) => map,
                    other => Map::from_iter([("value".to_string(), other)]),
                };
                let up = displayed.remove(node);
                mapping.insert(
                    "up".to_string(),
                    json!({ "@id": urls::make_find_url(&up, &self.params) }),
                );
                Value::Object(mapping)
            })
            .collect()
    }

    /// Observations for the predicate counts of object search.
    fn predicate_observations(&self, buckets: &[aggs::Bucket]) -> Value {
        let observations: Vec<Value> = buckets
            .iter()
            .map(|bucket| {
                let mut params = self.params.clone();
                params.predicates = vec![bucket.value.clone()];
                json!({
                    "totalItems": bucket.count,
                    "object": bucket.value,
                    "view": { "@id": urls::make_find_url(&self.tree, &params) },
                })
            })
            .collect();
        Value::Array(observations)
    }

    /// The curated predicate list: the explicitly selected predicates, or
    /// every configured relation filter.
    fn curated_predicates(&self) -> Vec<String> {
        if !self.params.predicates.is_empty() {
            return self.params.predicates.clone();
        }
        let mut predicates: Vec<String> = self
            .config
            .relation_filters
            .values()
            .flatten()
            .cloned()
            .collect();
        predicates.dedup();
        predicates
    }
}

/// Renders one query-tree node as a mapping fragment.
fn mapping_fragment(node: &Node) -> Value {
    match node {
        Node::And(children) => {
            json!({ "and": children.iter().map(mapping_fragment).collect::<Vec<_>>() })
        }
        Node::Or(children) => {
            json!({ "or": children.iter().map(mapping_fragment).collect::<Vec<_>>() })
        }
        Node::PathValue(pv) => {
            json!({ "property": pv.property, pv.operator.term_key(): pv.value.as_str() })
        }
        Node::FreeText(ft) => {
            json!({ "property": "textQuery", ft.operator.term_key(): ft.value })
        }
    }
}

/// The reverse-link condition anchoring an object search.
fn links_node(object: &str) -> Node {
    Node::PathValue(PathValue {
        property: LINKS_FIELD.to_string(),
        path: Path::new([LINKS_FIELD]),
        operator: Operator::Equals,
        value: TreeValue::Link(object.to_string()),
    })
}

/// The OR of the selected predicate conditions for predicate-object
/// search. Unknown predicates are client errors.
fn predicate_selection(
    object: &str,
    predicates: &[String],
    disambiguator: &Disambiguator<'_>,
) -> Result<Node, SearchError> {
    let mut alternatives = Vec::new();
    for predicate in predicates {
        let condition = FlattenedAst::Code {
            code: predicate.clone(),
            operator: Operator::Equals,
            value: object.to_string(),
        };
        let tree = build_with_outset(&condition, disambiguator, Outset::Resource)?;
        if let Some(root) = tree.root() {
            alternatives.push(root.clone());
        }
    }
    Ok(Node::or(alternatives))
}

/// AND-extends the tree with the site's default filters, skipping any
/// filter whose property the query already constrains at top level.
fn apply_default_filters(
    mut tree: QueryTree,
    config: &AppConfig,
    disambiguator: &Disambiguator<'_>,
    outset: Outset,
) -> Result<QueryTree, SearchError> {
    for filter in &config.default_filters {
        let Some(ast) = parse_query(filter)? else {
            continue;
        };
        let filter_tree = build_with_outset(&ast, disambiguator, outset)?;
        for node in filter_tree.top_level_nodes() {
            let constrained = primary_property(node).is_some_and(|property| {
                tree.top_level_nodes()
                    .iter()
                    .any(|n| primary_property(n) == Some(property))
            });
            if !constrained {
                tree = tree.add(node.clone());
            }
        }
    }
    Ok(tree)
}

/// The single property a node constrains, if all its conditions agree.
fn primary_property(node: &Node) -> Option<&str> {
    match node {
        Node::PathValue(pv) => Some(&pv.property),
        Node::And(children) | Node::Or(children) => {
            let mut properties = children.iter().map(primary_property);
            let first = properties.next()??;
            properties.all(|p| p == Some(first)).then_some(first)
        }
        Node::FreeText(_) => None,
    }
}
