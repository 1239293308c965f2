//! Entity resolution: term → knowledge-base entity

use std::sync::Arc;

use crate::models::{EntityRef, Lookup};
use crate::sparql::{query, SparqlEndpoint};
use crate::utils::error::SparqlError;

/// Finds the entity whose label equals a term
///
/// The first binding returned by the endpoint wins; there is no ranking.
pub struct EntityResolver {
    endpoint: Arc<dyn SparqlEndpoint>,
}

impl EntityResolver {
    pub fn new(endpoint: Arc<dyn SparqlEndpoint>) -> Self {
        Self { endpoint }
    }

    /// Resolve `term`, labelled in language `lang`, to an entity
    pub async fn resolve(&self, term: &str, lang: &str) -> Lookup<EntityRef, SparqlError> {
        if !query::is_safe_language(lang) {
            return Lookup::Failed(SparqlError::MalformedResponse {
                reason: format!("unusable language code {lang:?}"),
            });
        }

        let rows = match self.endpoint.select(&query::label_lookup(term, lang)).await {
            Ok(rows) => rows,
            Err(e) => return Lookup::Failed(e),
        };

        let Some(first) = rows.first() else {
            tracing::debug!(term = %term, lang = %lang, "No entity carries this label");
            return Lookup::Miss;
        };

        let uri = match first.require("item") {
            Ok(uri) => uri,
            Err(e) => return Lookup::Failed(e),
        };

        match EntityRef::from_uri(uri) {
            Some(entity) if query::is_safe_entity(&entity) => {
                tracing::debug!(term = %term, entity = %entity, "Resolved term");
                Lookup::Hit(entity)
            }
            _ => Lookup::Failed(SparqlError::MalformedResponse {
                reason: format!("not an entity URI: {uri}"),
            }),
        }
    }
}
