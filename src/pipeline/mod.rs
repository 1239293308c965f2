//! Term pipeline orchestration
//!
//! # Stages
//!
//! ```text
//! term ─▶ validate ─▶ resolve ─▶ classify ─▶ collect ─▶ enrich ─▶ render
//!            │           │           │           │          │         │
//!            └───────────┴───────────┴─────┬─────┴──────────┘         │
//!                                          ▼                          ▼
//!                                   TermFailure list           Turtle records
//! ```
//!
//! Terms are independent. Up to `concurrency` terms are in flight at once
//! and results come back in input order, so records are written in the
//! order the terms were read. Each term's outcome is its own value; there
//! is no shared mutable state between in-flight terms.

pub mod input;
pub mod output;

use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::config::Config;
use crate::error::{Error, ErrorCategory, Result};
use crate::fetcher::FetcherConfig;
use crate::knowledge::{EntityResolver, FactCollector, SubjectClassifier};
use crate::lexicon::{DictionarySource, LexicalEnricher, LexicalPolicy, WiktionaryClient};
use crate::models::{
    FailureKind, Language, LexicalInfo, Lookup, Stage, Term, TermFailure, TermRecord, Variant,
};
use crate::render::ids::concept_id;
use crate::render::Renderer;
use crate::sparql::{SparqlClient, SparqlEndpoint};

pub use input::{read_terms, TermListFormat};
pub use output::ArtifactWriter;

const EMPTY_FACTS: &str = "empty fact table";

/// Summary of one run
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub variant: Variant,
    pub language: String,
    pub attempted: usize,
    pub rendered: usize,
    pub failures: Vec<TermFailure>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl RunReport {
    /// Terms excluded because a stage had no answer for them
    pub fn excluded(&self) -> usize {
        self.failures
            .iter()
            .filter(|f| f.kind == FailureKind::Excluded)
            .count()
    }

    /// Terms lost to errors
    pub fn errors(&self) -> usize {
        self.failures
            .iter()
            .filter(|f| f.kind == FailureKind::Error)
            .count()
    }

    /// Error counts per category, most frequent first
    pub fn errors_by_category(&self) -> Vec<(ErrorCategory, usize)> {
        let mut counts: BTreeMap<ErrorCategory, usize> = BTreeMap::new();
        for category in self.failures.iter().filter_map(|f| f.category) {
            *counts.entry(category).or_default() += 1;
        }
        let mut counts: Vec<_> = counts.into_iter().collect();
        counts.sort_by(|a, b| b.1.cmp(&a.1));
        counts
    }

    pub fn duration(&self) -> chrono::Duration {
        self.finished_at - self.started_at
    }
}

/// Result of processing the terms, before anything is written
#[derive(Debug)]
pub struct RunOutput {
    /// Rendered records in input order
    pub records: Vec<String>,
    pub report: RunReport,

    /// `(term, concept id)` pairs (taxonomic variant)
    pub id_map: Vec<(String, String)>,

    /// Terms whose fact table was empty (taxonomic variant)
    pub empty_facts: Vec<String>,
}

/// Drives terms through every stage
pub struct Pipeline {
    variant: Variant,
    language: Language,
    concurrency: usize,
    resolver: EntityResolver,
    classifier: SubjectClassifier,
    collector: FactCollector,
    enricher: Option<LexicalEnricher>,
    renderer: Renderer,
}

impl Pipeline {
    /// Assemble a pipeline over the given endpoint and dictionary
    ///
    /// `dictionary` is only consulted in the lexical variant; pass `None` to
    /// skip enrichment.
    pub fn new(
        config: &Config,
        endpoint: Arc<dyn SparqlEndpoint>,
        dictionary: Option<Arc<dyn DictionarySource>>,
        renderer: Renderer,
    ) -> Self {
        let policy = LexicalPolicy {
            gender: config.lexical.gender_policy,
            plural: config.lexical.plural_policy,
        };

        Self {
            variant: config.run.variant,
            language: config.language(),
            concurrency: config.run.concurrency.max(1),
            resolver: EntityResolver::new(Arc::clone(&endpoint)),
            classifier: SubjectClassifier::new(Arc::clone(&endpoint), config.anchors()),
            collector: FactCollector::new(
                endpoint,
                config.taxonomic.languages.clone(),
                config.taxonomic.relation_limit,
            ),
            enricher: dictionary.map(|source| LexicalEnricher::new(source, policy)),
            renderer,
        }
    }

    /// Pipeline talking to the configured SPARQL endpoint and dictionary
    pub fn from_config(config: &Config) -> Result<Self> {
        config.validate().map_err(|e| Error::config(format!("{e:#}")))?;

        let fetcher = FetcherConfig::from_config(config);
        let endpoint: Arc<dyn SparqlEndpoint> =
            Arc::new(SparqlClient::new(&config.endpoint.sparql_url, fetcher.clone())?);

        let dictionary: Option<Arc<dyn DictionarySource>> =
            if config.run.variant == Variant::Lexical && !config.lexical.skip_enrichment {
                Some(Arc::new(WiktionaryClient::new(
                    &config.endpoint.dictionary_url,
                    fetcher,
                )?))
            } else {
                None
            };

        Ok(Self::new(config, endpoint, dictionary, Renderer::from_config(config)?))
    }

    /// Process `terms` and write every artifact through `writer`
    ///
    /// The id map is written before any query is sent. Only failing to
    /// write an artifact ends the run early.
    pub async fn run(&self, terms: &[Term], writer: &ArtifactWriter) -> Result<RunReport> {
        let id_map = self.assign_ids(terms);
        if self.variant == Variant::Taxonomic {
            writer.write_id_map(&id_map).await?;
        }

        let output = self.process_all(terms, id_map).await;

        writer.start(self.variant).await?;
        writer.append_records(&output.records).await?;
        if self.variant == Variant::Taxonomic {
            writer.write_empty_facts(&output.empty_facts).await?;
        }

        Ok(output.report)
    }

    /// Concept ids for every term, in input order
    fn assign_ids(&self, terms: &[Term]) -> Vec<(String, String)> {
        match self.variant {
            Variant::Lexical => Vec::new(),
            Variant::Taxonomic => terms
                .iter()
                .map(|t| (t.text.clone(), concept_id(self.renderer.ids(), &t.text)))
                .collect(),
        }
    }

    /// Process `terms` without writing anything
    pub async fn process(&self, terms: &[Term]) -> RunOutput {
        self.process_all(terms, self.assign_ids(terms)).await
    }

    async fn process_all(&self, terms: &[Term], id_map: Vec<(String, String)>) -> RunOutput {
        let started_at = Utc::now();
        tracing::info!(
            variant = self.variant.as_str(),
            language = %self.language.code,
            terms = terms.len(),
            concurrency = self.concurrency,
            "Starting run"
        );

        let local_ids = terms
            .iter()
            .enumerate()
            .map(|(i, _)| id_map.get(i).map(|(_, id)| id.clone()));

        let outcomes: Vec<std::result::Result<TermRecord, TermFailure>> =
            stream::iter(terms.iter().zip(local_ids))
                .map(|(term, local_id)| self.process_term(term, local_id))
                .buffered(self.concurrency)
                .collect()
                .await;

        let mut records = Vec::new();
        let mut failures = Vec::new();
        let mut empty_facts = Vec::new();

        for outcome in outcomes {
            let record = match outcome {
                Ok(record) => record,
                Err(failure) => {
                    if failure.stage == Stage::Collect && failure.reason == EMPTY_FACTS {
                        empty_facts.push(failure.term.clone());
                    }
                    failures.push(failure);
                    continue;
                }
            };

            match self.renderer.render(&record, self.variant) {
                Ok(text) => records.push(text),
                Err(e) => {
                    tracing::error!(term = %record.term, error = %e, "Failed to render record");
                    failures.push(TermFailure::error(&record.term, Stage::Render, e));
                }
            }
        }

        let report = RunReport {
            variant: self.variant,
            language: self.language.code.clone(),
            attempted: terms.len(),
            rendered: records.len(),
            failures,
            started_at,
            finished_at: Utc::now(),
        };

        tracing::info!(
            attempted = report.attempted,
            rendered = report.rendered,
            excluded = report.excluded(),
            errors = report.errors(),
            "Run completed"
        );

        RunOutput {
            records,
            report,
            id_map,
            empty_facts,
        }
    }

    /// Take one term as far as it goes
    async fn process_term(
        &self,
        term: &Term,
        local_id: Option<String>,
    ) -> std::result::Result<TermRecord, TermFailure> {
        let fail = |failure: TermFailure| {
            match failure.kind {
                FailureKind::Excluded => tracing::info!(
                    term = %term,
                    stage = failure.stage.as_str(),
                    reason = %failure.reason,
                    "Term excluded"
                ),
                FailureKind::Error => tracing::warn!(
                    term = %term,
                    stage = failure.stage.as_str(),
                    category = failure.category.map(|c| c.as_str()).unwrap_or("other"),
                    error = %failure.reason,
                    "Term failed"
                ),
            }
            failure
        };

        if term.text.trim().is_empty() {
            return Err(fail(TermFailure::excluded(term, Stage::Validate, "empty term")));
        }
        if self.variant == Variant::Lexical && term.is_multi_word() {
            return Err(fail(TermFailure::excluded(term, Stage::Validate, "multi-word term")));
        }

        let entity = match self.resolver.resolve(&term.text, &self.language.code).await {
            Lookup::Hit(entity) => entity,
            Lookup::Miss => {
                return Err(fail(TermFailure::excluded(term, Stage::Resolve, "not found in knowledge base")))
            }
            Lookup::Failed(e) => return Err(fail(TermFailure::error(term, Stage::Resolve, e))),
        };

        let subject = match self.classifier.classify(&entity).await {
            Lookup::Hit(subject) => subject,
            Lookup::Miss => {
                return Err(fail(TermFailure::excluded(
                    term,
                    Stage::Classify,
                    format!("{entity} matches no subject anchor"),
                )))
            }
            Lookup::Failed(e) => return Err(fail(TermFailure::error(term, Stage::Classify, e))),
        };

        let facts = self
            .collector
            .collect(&entity, self.variant)
            .await
            .map_err(|e| fail(TermFailure::error(term, Stage::Collect, e)))?;

        let mut relations = Vec::new();
        let mut lexical = LexicalInfo::default();

        match self.variant {
            Variant::Taxonomic => {
                if facts.is_empty() {
                    return Err(fail(TermFailure::excluded(term, Stage::Collect, EMPTY_FACTS)));
                }
                relations = match self.collector.relations(&entity).await {
                    Ok(relations) => relations,
                    Err(e) => {
                        tracing::warn!(term = %term, entity = %entity, error = %e, "Relation lookup failed");
                        Vec::new()
                    }
                };
            }
            Variant::Lexical => {
                if let Some(enricher) = &self.enricher {
                    lexical = match enricher.enrich(&term.text, &self.language).await {
                        Lookup::Hit(info) => info,
                        Lookup::Miss => {
                            tracing::debug!(term = %term, "No dictionary entry");
                            LexicalInfo::default()
                        }
                        Lookup::Failed(e) => {
                            tracing::warn!(term = %term, error = %e, "Dictionary lookup failed");
                            LexicalInfo::default()
                        }
                    };
                }
            }
        }

        tracing::debug!(
            term = %term,
            entity = %entity,
            subject = %subject.name,
            facts = facts.len(),
            relations = relations.len(),
            "Term collected"
        );

        Ok(TermRecord {
            term: term.clone(),
            language: self.language.clone(),
            entity,
            subject,
            facts,
            relations,
            lexical,
            local_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::ids::FixedId;
    use crate::sparql::Row;
    use crate::testing::ScriptedEndpoint;

    fn lexical_config() -> Config {
        let mut config = Config::default();
        config.run.concurrency = 2;
        config
    }

    fn taxonomic_config() -> Config {
        let mut config = Config::default();
        config.run.variant = Variant::Taxonomic;
        config.run.language = "english".into();
        config
    }

    fn renderer() -> Renderer {
        Renderer::new(Arc::new(FixedId(55_555))).unwrap()
    }

    fn architettura_endpoint() -> ScriptedEndpoint {
        ScriptedEndpoint::new()
            .select_when(
                "\"architettura\"@it",
                vec![Row::from_pairs([("item", "http://www.wikidata.org/entity/Q12280")])],
            )
            .select_when(
                "\"colonna\"@it",
                vec![Row::from_pairs([("item", "http://www.wikidata.org/entity/Q4202")])],
            )
            .ask_when("wd:Q12280 (wdt:P361|wdt:P279|wdt:P31)+ wd:Q12271", true)
            .select_when(
                "schema:about wd:Q12280",
                vec![
                    Row::from_pairs([("article", "https://it.wikipedia.org/wiki/Architettura"), ("lang", "it"), ("name", "architettura")]),
                    Row::from_pairs([("article", "https://en.wikipedia.org/wiki/Architecture"), ("lang", "en"), ("name", "architecture")]),
                ],
            )
    }

    #[tokio::test]
    async fn test_lexical_run_records_and_failures() {
        let endpoint = Arc::new(architettura_endpoint());
        let pipeline = Pipeline::new(&lexical_config(), endpoint.clone(), None, renderer());

        let terms = vec![
            Term::new("architettura"),
            Term::new("diritto civile"),
            Term::new("colonna"),
            Term::new("zzz"),
        ];
        let output = pipeline.process(&terms).await;

        assert_eq!(output.report.attempted, 4);
        assert_eq!(output.report.rendered, 1);
        assert_eq!(output.records.len(), 1);
        assert!(output.records[0].contains("dc:subject \"architecture\""));
        assert_eq!(output.records[0].matches("a vartrans:Translation").count(), 1);

        let stages: Vec<_> = output
            .report
            .failures
            .iter()
            .map(|f| (f.term.as_str(), f.stage))
            .collect();
        assert_eq!(
            stages,
            vec![
                ("diritto civile", Stage::Validate),
                ("colonna", Stage::Classify),
                ("zzz", Stage::Resolve),
            ]
        );

        assert!(!endpoint.queries().iter().any(|q| q.contains("diritto")));
    }

    #[tokio::test]
    async fn test_resolution_error_is_per_term() {
        let endpoint = architettura_endpoint().fail_when("\"ponte\"@it");
        let pipeline = Pipeline::new(&lexical_config(), Arc::new(endpoint), None, renderer());

        let output = pipeline
            .process(&[Term::new("ponte"), Term::new("architettura")])
            .await;

        assert_eq!(output.report.rendered, 1);
        assert_eq!(output.report.errors(), 1);
        assert_eq!(output.report.failures[0].kind, FailureKind::Error);
        assert_eq!(output.report.failures[0].category, Some(ErrorCategory::Network));
        assert_eq!(
            output.report.errors_by_category(),
            vec![(ErrorCategory::Network, 1)]
        );
    }

    #[tokio::test]
    async fn test_records_keep_input_order() {
        let mut endpoint = ScriptedEndpoint::new();
        let words = ["uno", "due", "tre", "quattro", "cinque", "sei"];
        for (i, word) in words.iter().enumerate() {
            endpoint = endpoint.select_when(
                &format!("\"{word}\"@it"),
                vec![Row::from_pairs([("item", format!("http://www.wikidata.org/entity/Q{}", i + 1).as_str())])],
            );
        }
        let endpoint = endpoint.ask_when("wd:Q12271", true);

        let mut config = lexical_config();
        config.run.concurrency = 4;
        let pipeline = Pipeline::new(&config, Arc::new(endpoint), None, renderer());

        let terms: Vec<Term> = words.iter().map(|w| Term::new(*w)).collect();
        let output = pipeline.process(&terms).await;

        assert_eq!(output.records.len(), words.len());
        for (record, word) in output.records.iter().zip(words) {
            assert!(record.starts_with(&format!(":{word} a ontolex:LexicalEntry")));
        }
    }

    #[tokio::test]
    async fn test_taxonomic_run_assigns_ids_and_lists_empty_facts() {
        let endpoint = ScriptedEndpoint::new()
            .select_when(
                "\"law\"@en",
                vec![Row::from_pairs([("item", "http://www.wikidata.org/entity/Q7748")])],
            )
            .select_when(
                "\"leave\"@en",
                vec![Row::from_pairs([("item", "http://www.wikidata.org/entity/Q13561011")])],
            )
            .ask_when("wd:Q1156854", true)
            .select_when(
                "schema:about wd:Q7748",
                vec![Row::from_pairs([("lang", "en"), ("name", "law"), ("desc", "system of rules")])],
            );
        let pipeline = Pipeline::new(&taxonomic_config(), Arc::new(endpoint), None, renderer());

        let output = pipeline
            .process(&[Term::new("law"), Term::new("leave")])
            .await;

        assert_eq!(output.id_map.len(), 2);
        assert_eq!(output.id_map[0], ("law".to_string(), "LT1000000".to_string()));
        assert_eq!(output.empty_facts, vec!["leave".to_string()]);
        assert_eq!(output.records.len(), 1);
        assert!(output.records[0].contains("labourlaw_terms/LT1000000>"));
    }

    #[tokio::test]
    async fn test_relation_failure_keeps_concept() {
        let endpoint = ScriptedEndpoint::new()
            .fail_when("?kind ?target ?label")
            .select_when(
                "\"law\"@en",
                vec![Row::from_pairs([("item", "http://www.wikidata.org/entity/Q7748")])],
            )
            .ask_when("wd:Q1156854", true)
            .select_when(
                "schema:about wd:Q7748",
                vec![Row::from_pairs([("lang", "en"), ("name", "law"), ("desc", "system of rules")])],
            );
        let endpoint = Arc::new(endpoint);
        let pipeline = Pipeline::new(&taxonomic_config(), endpoint.clone(), None, renderer());

        let output = pipeline.process(&[Term::new("law")]).await;

        assert!(endpoint.queries().iter().any(|q| q.contains("?kind ?target ?label")));
        assert!(output.report.failures.is_empty());
        assert_eq!(output.records.len(), 1);
        assert!(output.records[0].contains("skos:prefLabel \"law\"@en"));
        assert!(!output.records[0].contains("skos:broader"));
        assert!(!output.records[0].contains("skos:exactMatch"));
    }

    #[tokio::test]
    async fn test_taxonomic_multi_word_terms_are_queried() {
        let endpoint = Arc::new(ScriptedEndpoint::new());
        let pipeline = Pipeline::new(&taxonomic_config(), endpoint.clone(), None, renderer());

        let output = pipeline.process(&[Term::new("labour law")]).await;
        assert_eq!(output.report.failures[0].stage, Stage::Resolve);
        assert_eq!(endpoint.queries().len(), 1);
    }
}
