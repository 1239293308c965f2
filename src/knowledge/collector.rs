//! Cross-lingual fact collection for a classified entity

use std::sync::Arc;

use crate::models::{EntityRef, FactRow, LocalizedText, RelationKind, RelationTarget, Variant};
use crate::sparql::{query, Row, SparqlEndpoint};
use crate::utils::error::SparqlError;

/// Collects fact rows and relation targets for an entity
///
/// An entity without data yields an empty table; only transport and
/// response failures are errors.
pub struct FactCollector {
    endpoint: Arc<dyn SparqlEndpoint>,
    languages: Vec<String>,
    relation_limit: usize,
}

impl FactCollector {
    /// `languages` is the taxonomic allow-list; the lexical variant keeps every language
    pub fn new(endpoint: Arc<dyn SparqlEndpoint>, languages: Vec<String>, relation_limit: usize) -> Self {
        Self {
            endpoint,
            languages,
            relation_limit,
        }
    }

    /// Fact rows for `entity`, in endpoint order
    pub async fn collect(
        &self,
        entity: &EntityRef,
        variant: Variant,
    ) -> Result<Vec<FactRow>, SparqlError> {
        match variant {
            Variant::Lexical => self.collect_articles(entity).await,
            Variant::Taxonomic => self.collect_labels(entity).await,
        }
    }

    /// `(article language, article URL, article name)` rows
    async fn collect_articles(&self, entity: &EntityRef) -> Result<Vec<FactRow>, SparqlError> {
        let rows = self.endpoint.select(&query::article_facts(entity)).await?;
        Ok(rows
            .iter()
            .filter_map(|row| keep_row(entity, row, article_row(row)))
            .collect())
    }

    /// `(language, label, description)` rows in allow-listed languages
    async fn collect_labels(&self, entity: &EntityRef) -> Result<Vec<FactRow>, SparqlError> {
        let rows = self
            .endpoint
            .select(&query::labelled_facts(entity, &self.languages))
            .await?;
        Ok(rows
            .iter()
            .filter_map(|row| keep_row(entity, row, label_row(row)))
            .filter(|fact| self.languages.iter().any(|l| *l == fact.language))
            .collect())
    }

    /// Broader, narrower and related targets of `entity`, with their labels
    ///
    /// Targets keep first-seen order; labels are grouped per target.
    pub async fn relations(&self, entity: &EntityRef) -> Result<Vec<RelationTarget>, SparqlError> {
        let rows = self
            .endpoint
            .select(&query::relations(entity, &self.languages, self.relation_limit))
            .await?;

        let mut targets: Vec<RelationTarget> = Vec::new();
        for row in &rows {
            let (Some(kind), Some(target)) = (
                row.get("kind").and_then(|k| k.parse::<RelationKind>().ok()),
                row.get("target").and_then(EntityRef::from_uri),
            ) else {
                tracing::debug!(entity = %entity, "Skipping incomplete relation row");
                continue;
            };

            let index = match targets
                .iter()
                .position(|t| t.kind == kind && t.entity == target)
            {
                Some(index) => index,
                None => {
                    if targets.iter().filter(|t| t.kind == kind).count() >= self.relation_limit {
                        continue;
                    }
                    targets.push(RelationTarget {
                        kind,
                        entity: target,
                        labels: Vec::new(),
                    });
                    targets.len() - 1
                }
            };

            if let (Some(label), Some(lang)) = (row.get("label"), row.lang("label")) {
                let labels = &mut targets[index].labels;
                if !labels.iter().any(|l| l.language == lang) {
                    labels.push(LocalizedText {
                        language: lang.to_string(),
                        text: label.to_string(),
                    });
                }
            }
        }

        Ok(targets)
    }
}

fn article_row(row: &Row) -> Result<FactRow, SparqlError> {
    Ok(FactRow::new(
        row.require("lang")?,
        row.require("article")?,
        row.require("name")?,
    ))
}

fn label_row(row: &Row) -> Result<FactRow, SparqlError> {
    Ok(FactRow::new(
        row.require("lang")?,
        row.require("name")?,
        row.require("desc")?,
    ))
}

fn keep_row(entity: &EntityRef, row: &Row, parsed: Result<FactRow, SparqlError>) -> Option<FactRow> {
    match parsed {
        Ok(fact) if fact.language.trim().is_empty() => {
            tracing::warn!(entity = %entity, row = ?row, "Skipping fact row without a language");
            None
        }
        Ok(fact) => Some(fact),
        Err(e) => {
            tracing::debug!(entity = %entity, error = %e, row = ?row, "Skipping incomplete fact row");
            None
        }
    }
}
