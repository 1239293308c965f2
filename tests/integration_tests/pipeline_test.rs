//! End-to-end pipeline tests against a mock SPARQL endpoint and dictionary

use tempfile::TempDir;
use termlink::models::{FailureKind, Stage, Term, Variant};
use termlink::pipeline::{ArtifactWriter, Pipeline};
use termlink::render::ids::IdStrategy;
use wiremock::MockServer;

use super::fixtures::{mount_architecture, mount_labour_law};
use crate::common::{mock_config, received_queries};

fn lexical_terms() -> Vec<Term> {
    vec![
        Term::new("architettura"),
        Term::new("diritto civile"),
        Term::new("colonna"),
    ]
}

#[tokio::test]
async fn test_lexical_run_end_to_end() {
    let server = MockServer::start().await;
    mount_architecture(&server).await;
    let dir = TempDir::new().unwrap();

    let config = mock_config(&server, dir.path());
    let pipeline = Pipeline::from_config(&config).unwrap();
    let writer = ArtifactWriter::new(config.output.clone());

    let report = pipeline.run(&lexical_terms(), &writer).await.unwrap();

    assert_eq!(report.attempted, 3);
    assert_eq!(report.rendered, 1);
    assert_eq!(report.excluded(), 2);
    assert_eq!(report.errors(), 0);

    let validate = report
        .failures
        .iter()
        .find(|f| f.term == "diritto civile")
        .unwrap();
    assert_eq!(validate.stage, Stage::Validate);
    assert_eq!(validate.kind, FailureKind::Excluded);

    let colonna = report.failures.iter().find(|f| f.term == "colonna").unwrap();
    assert_eq!(colonna.stage, Stage::Classify);

    let turtle = std::fs::read_to_string(&config.output.rdf_path).unwrap();
    assert!(turtle.starts_with("@prefix"));
    assert!(turtle.contains("@prefix ontolex:"));
    assert!(turtle.contains(":architettura a ontolex:LexicalEntry"));
    assert!(turtle.contains("wd:Q12280"));
    assert!(turtle.contains("wd:Q12271"));
    assert!(turtle.contains("dc:subject \"architecture\""));
    assert_eq!(turtle.matches("a vartrans:Translation").count(), 1);
    assert!(turtle.contains("<https://en.wikipedia.org/wiki/Architecture>"));

    // Multi-word terms never reach the endpoint
    let queries = received_queries(&server).await;
    assert!(!queries.is_empty());
    assert!(!queries.iter().any(|q| q.contains("diritto")));
}

#[tokio::test]
async fn test_lexical_run_without_enrichment_skips_dictionary() {
    let server = MockServer::start().await;
    mount_architecture(&server).await;
    let dir = TempDir::new().unwrap();

    let mut config = mock_config(&server, dir.path());
    config.lexical.skip_enrichment = true;
    let pipeline = Pipeline::from_config(&config).unwrap();
    let writer = ArtifactWriter::new(config.output.clone());

    let report = pipeline
        .run(&[Term::new("architettura")], &writer)
        .await
        .unwrap();
    assert_eq!(report.rendered, 1);

    let requests = server.received_requests().await.unwrap();
    assert!(requests.iter().all(|r| !r.url.path().starts_with("/wiki/")));
}

#[tokio::test]
async fn test_lexical_output_is_appended() {
    let server = MockServer::start().await;
    mount_architecture(&server).await;
    let dir = TempDir::new().unwrap();

    let config = mock_config(&server, dir.path());
    let pipeline = Pipeline::from_config(&config).unwrap();
    let writer = ArtifactWriter::new(config.output.clone());

    pipeline
        .run(&[Term::new("architettura")], &writer)
        .await
        .unwrap();
    pipeline
        .run(&[Term::new("architettura")], &writer)
        .await
        .unwrap();

    let turtle = std::fs::read_to_string(&config.output.rdf_path).unwrap();
    assert_eq!(turtle.matches("@prefix ontolex:").count(), 2);
    assert_eq!(turtle.matches(":architettura a ontolex:LexicalEntry").count(), 2);
}

#[tokio::test]
async fn test_taxonomic_run_end_to_end() {
    let server = MockServer::start().await;
    mount_labour_law(&server).await;
    let dir = TempDir::new().unwrap();

    let mut config = mock_config(&server, dir.path());
    config.run.variant = Variant::Taxonomic;
    config.run.language = "english".to_string();
    config.run.id_strategy = IdStrategy::Counter;
    config.run.concurrency = 2;

    let pipeline = Pipeline::from_config(&config).unwrap();
    let writer = ArtifactWriter::new(config.output.clone());

    let report = pipeline
        .run(&[Term::new("law"), Term::new("annual leave")], &writer)
        .await
        .unwrap();

    assert_eq!(report.variant, Variant::Taxonomic);
    assert_eq!(report.rendered, 1);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].term, "annual leave");
    assert_eq!(report.failures[0].stage, Stage::Collect);

    let id_map = std::fs::read_to_string(&config.output.id_map_path).unwrap();
    assert_eq!(id_map, "law , LT1000000\nannual leave , LT1000001\n");

    let empty = std::fs::read_to_string(&config.output.empty_facts_path).unwrap();
    assert_eq!(empty, "annual leave\n");

    let turtle = std::fs::read_to_string(&config.output.rdf_path).unwrap();
    assert!(turtle.contains("@prefix skos:"));
    assert!(turtle.contains(
        "<http://lkg.lynx-project.eu/kos/labourlaw_terms/LT1000000> a skos:Concept ;"
    ));
    assert!(turtle.contains("skos:closeMatch <https://www.wikidata.org/wiki/Q7748>"));
    assert!(turtle.contains("\"Recht\"@de"));
    assert!(turtle.contains("\"system of rules\"@en"));
    assert!(turtle.contains("skos:broader <http://lkg.lynx-project.eu/kos/labourlaw/LT1000002>"));
    assert!(turtle.contains("skos:exactMatch <https://www.wikidata.org/wiki/Q2135465>"));
    assert!(turtle.contains("\"legal concept\"@en"));
}

#[tokio::test]
async fn test_taxonomic_output_is_replaced() {
    let server = MockServer::start().await;
    mount_labour_law(&server).await;
    let dir = TempDir::new().unwrap();

    let mut config = mock_config(&server, dir.path());
    config.run.variant = Variant::Taxonomic;
    config.run.language = "english".to_string();

    let pipeline = Pipeline::from_config(&config).unwrap();
    let writer = ArtifactWriter::new(config.output.clone());

    for _ in 0..2 {
        pipeline.run(&[Term::new("law")], &writer).await.unwrap();
    }

    let turtle = std::fs::read_to_string(&config.output.rdf_path).unwrap();
    assert_eq!(turtle.matches("@prefix skos:").count(), 1);
    assert_eq!(turtle.matches("skos:closeMatch").count(), 1);
}
