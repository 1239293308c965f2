//! Error scenario tests
//!
//! A failure while processing one term must never cost the other terms
//! their output.

use serde_json::json;
use std::time::Duration;
use tempfile::TempDir;
use termlink::models::{FailureKind, Stage, Term};
use termlink::pipeline::{ArtifactWriter, Pipeline};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::fixtures::{entity, mount_architecture};
use crate::common::{
    literal, mock_config, mount_ask, mount_fallbacks, mount_select, query_contains, select_response,
    tagged, uri, SPARQL_PATH,
};

/// Test that a slow endpoint answer becomes a per-term error
#[tokio::test]
async fn test_timeout_is_per_term() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(SPARQL_PATH))
        .and(query_contains("\"lento\"@it"))
        .respond_with(select_response(vec![]).set_delay(Duration::from_secs(5)))
        .mount(&server)
        .await;
    mount_architecture(&server).await;

    let dir = TempDir::new().unwrap();
    let mut config = mock_config(&server, dir.path());
    config.endpoint.request_timeout_secs = 1;
    config.endpoint.max_retries = 0;
    config.lexical.skip_enrichment = true;

    let pipeline = Pipeline::from_config(&config).unwrap();
    let output = pipeline
        .process(&[Term::new("lento"), Term::new("architettura")])
        .await;

    assert_eq!(output.report.rendered, 1);
    assert_eq!(output.report.failures.len(), 1);
    assert_eq!(output.report.failures[0].term, "lento");
    assert_eq!(output.report.failures[0].stage, Stage::Resolve);
    assert_eq!(output.report.failures[0].kind, FailureKind::Error);
}

/// Test that a server error on one term leaves the others untouched
#[tokio::test]
async fn test_server_error_is_per_term() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(SPARQL_PATH))
        .and(query_contains("\"ponte\"@it"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    mount_architecture(&server).await;

    let dir = TempDir::new().unwrap();
    let mut config = mock_config(&server, dir.path());
    config.lexical.skip_enrichment = true;

    let pipeline = Pipeline::from_config(&config).unwrap();
    let writer = ArtifactWriter::new(config.output.clone());
    let report = pipeline
        .run(
            &[Term::new("ponte"), Term::new("architettura")],
            &writer,
        )
        .await
        .unwrap();

    assert_eq!(report.rendered, 1);
    assert_eq!(report.errors(), 1);
    assert_eq!(report.failures[0].term, "ponte");
    assert!(report.failures[0].reason.contains("500"));

    let turtle = std::fs::read_to_string(&config.output.rdf_path).unwrap();
    assert!(turtle.contains(":architettura a ontolex:LexicalEntry"));
    assert!(!turtle.contains("ponte"));
}

/// Test that an unreadable classification answer is a Classify error
#[tokio::test]
async fn test_malformed_answer_is_per_term() {
    let server = MockServer::start().await;

    mount_select(&server, "\"volta\"@it", vec![json!({ "item": entity("Q12277") })]).await;
    Mock::given(method("GET"))
        .and(path(SPARQL_PATH))
        .and(query_contains("wd:Q12277 (wdt:P361|wdt:P279|wdt:P31)+"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{ not json"))
        .mount(&server)
        .await;
    mount_architecture(&server).await;

    let dir = TempDir::new().unwrap();
    let mut config = mock_config(&server, dir.path());
    config.lexical.skip_enrichment = true;

    let pipeline = Pipeline::from_config(&config).unwrap();
    let output = pipeline
        .process(&[Term::new("volta"), Term::new("architettura")])
        .await;

    assert_eq!(output.records.len(), 1);
    let failure = &output.report.failures[0];
    assert_eq!(failure.term, "volta");
    assert_eq!(failure.stage, Stage::Classify);
    assert_eq!(failure.kind, FailureKind::Error);
}

/// Test that a value colliding with template syntax fails rendering only
#[tokio::test]
async fn test_placeholder_collision_fails_render() {
    let server = MockServer::start().await;

    mount_select(&server, "\"arco\"@it", vec![json!({ "item": entity("Q12909") })]).await;
    mount_ask(&server, "wd:Q12909 (wdt:P361|wdt:P279|wdt:P31)+ wd:Q12271", true).await;
    mount_select(
        &server,
        "schema:about wd:Q12909",
        vec![
            json!({
                "article": uri("https://it.wikipedia.org/wiki/Arco"),
                "lang": literal("it"),
                "name": tagged("arco", "it"),
            }),
            json!({
                "article": uri("https://en.wikipedia.org/wiki/Arch"),
                "lang": literal("en"),
                "name": tagged("arch {{broken}}", "en"),
            }),
        ],
    )
    .await;
    mount_architecture(&server).await;

    let dir = TempDir::new().unwrap();
    let mut config = mock_config(&server, dir.path());
    config.lexical.skip_enrichment = true;

    let pipeline = Pipeline::from_config(&config).unwrap();
    let output = pipeline
        .process(&[Term::new("arco"), Term::new("architettura")])
        .await;

    assert_eq!(output.records.len(), 1);
    assert!(output.records[0].starts_with(":architettura"));

    let failure = &output.report.failures[0];
    assert_eq!(failure.term, "arco");
    assert_eq!(failure.stage, Stage::Render);
    assert_eq!(failure.kind, FailureKind::Error);
}

/// Test that a dictionary outage still yields a record without attributes
#[tokio::test]
async fn test_dictionary_outage_keeps_record() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/wiki/architettura"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;
    mount_architecture(&server).await;

    let dir = TempDir::new().unwrap();
    let mut config = mock_config(&server, dir.path());
    config.endpoint.max_retries = 0;

    let pipeline = Pipeline::from_config(&config).unwrap();
    let output = pipeline.process(&[Term::new("architettura")]).await;

    assert!(output.report.failures.is_empty());
    assert_eq!(output.records.len(), 1);
    assert!(!output.records[0].contains("lexinfo:partOfSpeech"));
}

/// Test that an endpoint with nothing to say excludes every term
#[tokio::test]
async fn test_empty_endpoint_excludes_terms() {
    let server = MockServer::start().await;
    mount_fallbacks(&server).await;

    let dir = TempDir::new().unwrap();
    let config = mock_config(&server, dir.path());

    let pipeline = Pipeline::from_config(&config).unwrap();
    let output = pipeline
        .process(&[Term::new("uno"), Term::new("due")])
        .await;

    assert!(output.records.is_empty());
    assert_eq!(output.report.excluded(), 2);
    assert!(output
        .report
        .failures
        .iter()
        .all(|f| f.stage == Stage::Resolve));
}
