//! End-to-end scenarios: query string in, backend request out, response in,
//! collection view out — with a stub client standing in for the engine.

use std::cell::RefCell;

use cq_config::AppConfig;
use cq_search::{ClientError, EsMappings, QueryParams, Search, SearchClient, SearchMode};
use cq_vocab::{Disambiguator, Vocab, fixtures};
use serde_json::{Value, json};

/// A stub engine: records the requests it receives and replies with
/// canned responses, one per request in order.
struct StubClient {
    responses: Vec<Value>,
    requests: RefCell<Vec<Value>>,
}

impl StubClient {
    fn new(responses: Vec<Value>) -> Self {
        Self {
            responses,
            requests: RefCell::new(Vec::new()),
        }
    }

    fn empty_result() -> Value {
        json!({ "hits": { "total": { "value": 0 }, "hits": [] } })
    }
}

impl SearchClient for StubClient {
    fn search(&self, request: &Value) -> Result<Value, ClientError> {
        let index = self.requests.borrow().len();
        self.requests.borrow_mut().push(request.clone());
        self.responses
            .get(index)
            .cloned()
            .ok_or_else(|| ClientError("no canned response left".to_string()))
    }
}

/// A client that always fails, for backend-error propagation.
struct DownClient;

impl SearchClient for DownClient {
    fn search(&self, _request: &Value) -> Result<Value, ClientError> {
        Err(ClientError("connection refused".to_string()))
    }
}

fn vocab() -> Vocab {
    fixtures::vocab()
}

fn search<'a>(
    disambiguator: &'a Disambiguator<'a>,
    config: &'a AppConfig,
    mappings: &'a EsMappings,
    pairs: &[(&str, &str)],
) -> Search<'a> {
    let params = QueryParams::parse(pairs.iter().copied()).unwrap();
    Search::new(params, disambiguator, config, mappings).unwrap()
}

#[test]
fn author_genre_scenario_compiles_as_specified() {
    let vocab = vocab();
    let disambiguator = Disambiguator::new(&vocab);
    let config = AppConfig::default();
    let mappings = EsMappings::default();

    let search = search(
        &disambiguator,
        &config,
        &mappings,
        &[("_q", "author:Bergman and (genre:poetry or genre:prose)")],
    );
    let request = search.request();

    assert_eq!(request["track_total_hits"], true);

    // The main clause is a boolean AND of the author condition and an OR
    // of the two genre conditions.
    let main = &request["query"]["bool"]["must"][0];
    let conjuncts = main["bool"]["must"].as_array().unwrap();
    assert_eq!(conjuncts.len(), 2);

    // Author: link-or-literal match on the chain-expanded path.
    let author_alternatives = conjuncts[0]["bool"]["should"].as_array().unwrap();
    let author_fields: Vec<&str> = author_alternatives
        .iter()
        .map(|alt| {
            alt["bool"]["filter"]["simple_query_string"]["fields"][0]
                .as_str()
                .unwrap()
        })
        .collect();
    assert_eq!(
        author_fields,
        vec!["contribution.agent", "contribution.agent._str"]
    );

    // Genre: an OR of two equality clauses, with no Work/Instance
    // branching anywhere (domains known, outset Resource).
    let genre_alternatives = conjuncts[1]["bool"]["should"].as_array().unwrap();
    assert_eq!(genre_alternatives.len(), 2);
    let rendered = serde_json::to_string(&request).unwrap();
    assert!(!rendered.contains("instanceOf"));
}

#[test]
fn round_trip_reproduces_an_equivalent_query() {
    let vocab = vocab();
    let disambiguator = Disambiguator::new(&vocab);
    let config = AppConfig::default();
    let mappings = EsMappings::default();

    for query in [
        "winter book",
        "author:Bergman and (genre:poetry or genre:prose)",
        "year>=1950 year<=1999",
        "not genre:drama winter",
    ] {
        let first = search(&disambiguator, &config, &mappings, &[("_q", query)]);
        let rendered = first.tree().to_query_string();
        let second = search(&disambiguator, &config, &mappings, &[("_q", &rendered)]);
        assert_eq!(
            first.request()["query"],
            second.request()["query"],
            "round trip diverged for {query:?} (rendered as {rendered:?})"
        );
    }
}

#[test]
fn view_carries_pagination_and_items() {
    let vocab = vocab();
    let disambiguator = Disambiguator::new(&vocab);
    let config = AppConfig::default();
    let mappings = EsMappings::default();

    let client = StubClient::new(vec![json!({
        "hits": {
            "total": { "value": 10 },
            "hits": [
                { "_id": "1", "_source": { "@id": "https://example.org/1" } },
            ],
        },
    })]);

    let search = search(
        &disambiguator,
        &config,
        &mappings,
        &[("_q", "winter"), ("_limit", "3"), ("_offset", "0"), ("_stats", "false")],
    );
    let view = search.execute(&client).unwrap();

    assert_eq!(view["@type"], "PartialCollectionView");
    assert_eq!(view["totalItems"], 10);
    assert_eq!(view["itemsPerPage"], 3);
    assert_eq!(view["itemOffset"], 0);
    assert_eq!(view["items"].as_array().unwrap().len(), 1);

    // total=10, limit=3, offset=0: next at 3, last at 9, no prev/first.
    assert!(view.get("first").is_none());
    assert!(view.get("previous").is_none());
    assert!(view["next"]["@id"].as_str().unwrap().contains("_offset=3"));
    assert!(view["last"]["@id"].as_str().unwrap().contains("_offset=9"));

    // The search mapping reconstructs the query fragment.
    let mapping = view["search"]["mapping"].as_array().unwrap();
    assert_eq!(mapping[0]["property"], "textQuery");
    assert_eq!(mapping[0]["equals"], "winter");
    assert!(mapping[0]["up"]["@id"].as_str().is_some());
}

#[test]
fn zero_limit_yields_no_pagination_links() {
    let vocab = vocab();
    let disambiguator = Disambiguator::new(&vocab);
    let config = AppConfig::default();
    let mappings = EsMappings::default();

    let client = StubClient::new(vec![StubClient::empty_result()]);
    let search = search(
        &disambiguator,
        &config,
        &mappings,
        &[("_q", "winter"), ("_limit", "0"), ("_stats", "false")],
    );
    let view = search.execute(&client).unwrap();

    assert!(view.get("first").is_none());
    assert!(view.get("previous").is_none());
    assert!(view.get("next").is_none());
    assert!(view.get("last").is_none());
}

#[test]
fn facets_round_trip_from_aggregations() {
    let vocab = vocab();
    let disambiguator = Disambiguator::new(&vocab);
    let config = AppConfig::from_json(json!({
        "sliceList": [{ "property": "genreForm", "size": 10 }],
    }))
    .unwrap();
    let mappings = EsMappings::default();

    let client = StubClient::new(vec![json!({
        "hits": { "total": { "value": 9 }, "hits": [] },
        "aggregations": {
            "genreForm.@id": {
                "genreForm": {
                    "buckets": [
                        { "key": "https://example.org/gf/poetry", "doc_count": 7 },
                        { "key": "https://example.org/gf/prose", "doc_count": 2 },
                    ],
                },
            },
        },
    })]);

    let search = search(&disambiguator, &config, &mappings, &[("_q", "winter")]);
    let view = search.execute(&client).unwrap();

    let observations = view["stats"]["sliceByDimension"]["genreForm"]["observation"]
        .as_array()
        .unwrap();
    assert_eq!(observations.len(), 2);
    assert_eq!(observations[0]["totalItems"], 7);
    let url = observations[0]["view"]["@id"].as_str().unwrap();
    assert!(url.contains("genreForm"));
    assert!(url.contains("winter"));
}

#[test]
fn range_facet_scenario() {
    let vocab = vocab();
    let disambiguator = Disambiguator::new(&vocab);
    let config = AppConfig::from_json(json!({
        "sliceList": [{ "property": "year", "range": true }],
    }))
    .unwrap();
    let mappings = EsMappings::default();

    let client = StubClient::new(vec![json!({
        "hits": { "total": { "value": 3 }, "hits": [] },
        "aggregations": {
            "year": { "year": { "buckets": [{ "key": "1960", "doc_count": 3 }] } },
        },
    })]);

    let search = search(
        &disambiguator,
        &config,
        &mappings,
        &[("_q", "year>=1950 and year<=1999")],
    );
    let view = search.execute(&client).unwrap();

    let slice = &view["stats"]["sliceByDimension"]["year"];
    let mapping = &slice["search"]["mapping"];
    assert_eq!(mapping["variable"], "year");
    assert_eq!(mapping["greaterThanOrEquals"], "1950");
    assert_eq!(mapping["lessThanOrEquals"], "1999");
    assert!(
        slice["search"]["template"]
            .as_str()
            .unwrap()
            .contains("%7B%3Fyear%7D")
    );

    // The two range conditions are represented by the template, not the
    // displayed query mapping.
    assert!(view["search"]["mapping"].as_array().unwrap().is_empty());
}

#[test]
fn object_search_issues_two_parallel_requests() {
    let vocab = vocab();
    let disambiguator = Disambiguator::new(&vocab);
    let config = AppConfig::from_json(json!({
        "relationFilters": { "Agent": ["author", "translator"] },
    }))
    .unwrap();
    let mappings = EsMappings::default();

    let client = StubClient::new(vec![
        json!({ "hits": { "total": { "value": 14 }, "hits": [] } }),
        json!({
            "aggregations": {
                "_predicates": {
                    "buckets": {
                        "author": { "doc_count": 12 },
                        "translator": { "doc_count": 2 },
                    },
                },
            },
        }),
    ]);

    let search = search(
        &disambiguator,
        &config,
        &mappings,
        &[("_o", "https://example.org/person/1")],
    );
    assert_eq!(search.mode(), SearchMode::Object);

    let view = search.execute(&client).unwrap();
    assert_eq!(view["totalItems"], 14);

    let requests = client.requests.borrow();
    assert_eq!(requests.len(), 2, "main query plus predicate aggregation");
    assert!(
        serde_json::to_string(&requests[0])
            .unwrap()
            .contains("_links")
    );
    assert!(requests[1]["aggs"]["_predicates"]["filters"]["filters"]["author"].is_object());

    let predicates = view["stats"]["_predicates"].as_array().unwrap();
    assert_eq!(predicates.len(), 2);
    assert_eq!(predicates[0]["object"], "author");
    assert_eq!(predicates[0]["totalItems"], 12);
    assert!(
        predicates[0]["view"]["@id"]
            .as_str()
            .unwrap()
            .contains("_p=author")
    );
}

#[test]
fn predicate_object_search_narrows_by_selected_predicate() {
    let vocab = vocab();
    let disambiguator = Disambiguator::new(&vocab);
    let config = AppConfig::default();
    let mappings = EsMappings::default();

    let search = search(
        &disambiguator,
        &config,
        &mappings,
        &[("_o", "https://example.org/person/1"), ("_p", "author")],
    );
    assert_eq!(search.mode(), SearchMode::PredicateObject);

    let rendered = serde_json::to_string(&search.request()).unwrap();
    assert!(rendered.contains("contribution.agent"));
    assert!(!rendered.contains("_links"));
}

#[test]
fn backend_failure_propagates_as_backend_error() {
    let vocab = vocab();
    let disambiguator = Disambiguator::new(&vocab);
    let config = AppConfig::default();
    let mappings = EsMappings::default();

    let search = search(&disambiguator, &config, &mappings, &[("_q", "winter")]);
    let err = search.execute(&DownClient).unwrap_err();
    assert!(matches!(err, cq_search::SearchError::Backend(_)));
    assert!(err.to_string().contains("connection refused"));
}

#[test]
fn invalid_queries_fail_before_any_backend_call() {
    let vocab = vocab();
    let disambiguator = Disambiguator::new(&vocab);
    let config = AppConfig::default();
    let mappings = EsMappings::default();

    for (pairs, fragment) in [
        (vec![("_q", "\"unclosed")], "unterminated"),
        (vec![("_q", "title:(x author:y)")], "nested"),
        (vec![("_q", "nosuch:thing")], "nosuch"),
        (vec![("_q", "anm:hello")], "ambiguous"),
    ] {
        let params = QueryParams::parse(pairs.iter().copied()).unwrap();
        let err = Search::new(params, &disambiguator, &config, &mappings).unwrap_err();
        assert!(
            err.to_string().contains(fragment),
            "expected {fragment:?} in {err}"
        );
    }
}

#[test]
fn spell_suggestions_reach_the_view() {
    let vocab = vocab();
    let disambiguator = Disambiguator::new(&vocab);
    let config = AppConfig::default();
    let mappings = EsMappings::default();

    let client = StubClient::new(vec![json!({
        "hits": { "total": { "value": 0 }, "hits": [] },
        "suggest": {
            "spell": [{
                "text": "tvoe",
                "options": [
                    { "text": "tove", "highlighted": "<em>tove</em>" },
                ],
            }],
        },
    })]);

    let search = search(
        &disambiguator,
        &config,
        &mappings,
        &[("_q", "tvoe"), ("_spell", "true"), ("_stats", "false")],
    );
    let view = search.execute(&client).unwrap();

    let spell = view["_spell"].as_array().unwrap();
    assert_eq!(spell[0]["label"], "tove");
    assert_eq!(spell[0]["labelHtml"], "<em>tove</em>");
}
