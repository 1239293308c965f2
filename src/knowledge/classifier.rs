//! Subject classification by transitive-closure ASK queries
//!
//! Anchors are checked in declaration order and the first one that answers
//! `true` is the subject. Reordering an anchor set changes classifications.

use std::sync::Arc;

use crate::models::{Anchor, EntityRef, Lookup, SubjectClass, Variant};
use crate::sparql::{query, SparqlEndpoint};
use crate::utils::error::SparqlError;

const LEXICAL_ANCHORS: &[(&str, &str)] = &[
    ("architecture", "Q12271"),
    ("archeology", "Q10855079"),
    ("law", "Q7748"),
    ("legal science", "Q382995"),
    ("social issue", "Q1920219"),
    ("jurisprudence", "Q4932206"),
    ("rule", "Q1151067"),
    ("Economy", "Q159810"),
    ("Economics", "Q8134"),
    ("labour law", "Q628967"),
    ("human action", "Q451967"),
    ("legal concept", "Q2135465"),
];

const TAXONOMIC_ANCHORS: &[(&str, &str)] = &[
    ("policy", "Q1156854"),
    ("leave of absence", "Q13561011"),
    ("sources of law", "Q846882"),
    ("rights policy", "Q2135597"),
    ("comparative law", "Q741338"),
    ("sociology of law", "Q847034"),
    ("legal doctrine", "Q1192543"),
    ("area of law", "Q1756157"),
    ("law", "Q7748"),
    ("legal science", "Q382995"),
    ("social issue", "Q1920219"),
    ("jurisprudence", "Q4932206"),
    ("rule", "Q1151067"),
    ("Economy", "Q159810"),
    ("Economics", "Q8134"),
    ("labour law", "Q628967"),
    ("human action", "Q451967"),
    ("legal concept", "Q2135465"),
];

/// The built-in anchor set of a variant, in classification order
pub fn default_anchors(variant: Variant) -> Vec<Anchor> {
    let table = match variant {
        Variant::Lexical => LEXICAL_ANCHORS,
        Variant::Taxonomic => TAXONOMIC_ANCHORS,
    };
    table
        .iter()
        .map(|(name, id)| Anchor::new(*name, *id))
        .collect()
}

/// Assigns an entity to the first anchor it descends from
pub struct SubjectClassifier {
    endpoint: Arc<dyn SparqlEndpoint>,
    anchors: Vec<Anchor>,
}

impl SubjectClassifier {
    pub fn new(endpoint: Arc<dyn SparqlEndpoint>, anchors: Vec<Anchor>) -> Self {
        Self { endpoint, anchors }
    }

    /// Classify `entity` against the anchor set
    ///
    /// A failed ASK is logged and skipped. The result is `Failed` only when
    /// every anchor query failed.
    pub async fn classify(&self, entity: &EntityRef) -> Lookup<SubjectClass, SparqlError> {
        let mut first_error = None;
        let mut answered = 0usize;

        for anchor in &self.anchors {
            match self
                .endpoint
                .ask(&query::membership_ask(entity, &anchor.id))
                .await
            {
                Ok(true) => {
                    tracing::debug!(entity = %entity, anchor = %anchor.name, "Classified entity");
                    return Lookup::Hit(anchor.clone());
                }
                Ok(false) => answered += 1,
                Err(e) => {
                    tracing::warn!(
                        entity = %entity,
                        anchor = %anchor.name,
                        error = %e,
                        "Membership query failed"
                    );
                    first_error.get_or_insert(e);
                }
            }
        }

        match first_error {
            Some(e) if answered == 0 => Lookup::Failed(e),
            _ => Lookup::Miss,
        }
    }
}
