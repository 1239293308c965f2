//! Common test utilities

#![allow(dead_code)]

use serde_json::{json, Value};
use std::path::Path;
use termlink::config::Config;
use termlink::fetcher::FetcherConfig;
use termlink::utils::retry::RetryConfig;
use wiremock::matchers::{method, path};
use wiremock::{Match, Mock, MockServer, Request, ResponseTemplate};

pub const SPARQL_PATH: &str = "/sparql";
pub const SPARQL_JSON: &str = "application/sparql-results+json";

/// Matches requests whose `query` parameter contains a fragment
pub struct QueryContains(pub String);

pub fn query_contains(fragment: &str) -> QueryContains {
    QueryContains(fragment.to_string())
}

impl Match for QueryContains {
    fn matches(&self, request: &Request) -> bool {
        request
            .url
            .query_pairs()
            .any(|(key, value)| key == "query" && value.contains(&self.0))
    }
}

/// Plain literal binding
pub fn literal(value: &str) -> Value {
    json!({ "type": "literal", "value": value })
}

/// Language-tagged literal binding
pub fn tagged(value: &str, lang: &str) -> Value {
    json!({ "type": "literal", "value": value, "xml:lang": lang })
}

/// URI binding
pub fn uri(value: &str) -> Value {
    json!({ "type": "uri", "value": value })
}

/// SELECT result document
pub fn select_response(rows: Vec<Value>) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(
        json!({ "head": { "vars": [] }, "results": { "bindings": rows } }).to_string(),
        SPARQL_JSON,
    )
}

/// ASK result document
pub fn ask_response(answer: bool) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_raw(json!({ "head": {}, "boolean": answer }).to_string(), SPARQL_JSON)
}

/// Answer SELECT queries containing `fragment` with `rows`
pub async fn mount_select(server: &MockServer, fragment: &str, rows: Vec<Value>) {
    Mock::given(method("GET"))
        .and(path(SPARQL_PATH))
        .and(query_contains(fragment))
        .respond_with(select_response(rows))
        .mount(server)
        .await;
}

/// Answer ASK queries containing `fragment` with `answer`
pub async fn mount_ask(server: &MockServer, fragment: &str, answer: bool) {
    Mock::given(method("GET"))
        .and(path(SPARQL_PATH))
        .and(query_contains(fragment))
        .respond_with(ask_response(answer))
        .mount(server)
        .await;
}

/// Fallbacks for every other query: no rows, and `false` for ASK.
/// Mount after the specific mocks.
pub async fn mount_fallbacks(server: &MockServer) {
    mount_ask(server, "ASK", false).await;
    mount_select(server, "SELECT", Vec::new()).await;
}

/// Fast fetcher settings for mock servers
pub fn fast_fetcher() -> FetcherConfig {
    FetcherConfig {
        requests_per_second: 1000,
        retry: RetryConfig::with_delays(2, 10, 50),
        ..Default::default()
    }
}

/// Configuration pointed at a mock server, writing into `dir`
pub fn mock_config(server: &MockServer, dir: &Path) -> Config {
    let mut config = Config::default();
    config.endpoint.sparql_url = format!("{}{SPARQL_PATH}", server.uri());
    config.endpoint.dictionary_url = format!("{}/wiki/", server.uri());
    config.endpoint.requests_per_second = 1000;
    config.endpoint.retry_base_delay_ms = 10;
    config.endpoint.request_timeout_secs = 5;
    config.output.rdf_path = dir.join("lexicon.ttl");
    config.output.id_map_path = dir.join("scterm_dict.csv");
    config.output.empty_facts_path = dir.join("errors.txt");
    config
}

/// Queries received by the mock server
pub async fn received_queries(server: &MockServer) -> Vec<String> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter_map(|r| {
            r.url
                .query_pairs()
                .find(|(k, _)| k == "query")
                .map(|(_, v)| v.into_owned())
        })
        .collect()
}
