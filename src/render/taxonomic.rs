//! Slots of a SKOS concept and its companion concepts

use serde::Serialize;

use super::ids::{concept_id, IdGenerator};
use super::{checked, required};
use crate::models::{LocalizedText, TermRecord};
use crate::utils::error::RenderError;
use crate::utils::{escape_iri, escape_literal, local_name};

#[derive(Debug, Serialize)]
pub(super) struct SkosSlots {
    concept: String,
    entity: String,
    labels: Vec<LiteralSlot>,
    descriptions: Vec<LiteralSlot>,
    relations: Vec<RelationSlots>,
    subject_id: String,
}

#[derive(Debug, Serialize)]
struct LiteralSlot {
    text: String,
    lang: String,
}

impl LiteralSlot {
    fn new(field: &str, text: &str, lang: &str) -> Result<Self, RenderError> {
        Ok(Self {
            text: escape_literal(checked(field, text)?),
            lang: local_name(required("language", lang)?),
        })
    }
}

#[derive(Debug, Serialize)]
struct RelationSlots {
    kind: &'static str,
    concept: String,
    entity: String,
    labels: Vec<LiteralSlot>,
}

fn labels(texts: &[LocalizedText]) -> Result<Vec<LiteralSlot>, RenderError> {
    texts
        .iter()
        .map(|t| LiteralSlot::new("relation label", &t.text, &t.language))
        .collect()
}

pub(super) fn slots(
    record: &TermRecord,
    ids: &dyn IdGenerator,
    concept_base: &str,
    companion_base: &str,
) -> Result<SkosSlots, RenderError> {
    let local_id = required("local_id", record.local_id.as_deref().unwrap_or_default())?;
    if record.facts.is_empty() {
        return Err(RenderError::MissingField {
            field: "prefLabel".to_string(),
        });
    }

    let labels_out = record
        .facts
        .iter()
        .map(|f| LiteralSlot::new("prefLabel", &f.primary, &f.language))
        .collect::<Result<Vec<_>, _>>()?;
    let descriptions = record
        .facts
        .iter()
        .map(|f| LiteralSlot::new("description", &f.secondary, &f.language))
        .collect::<Result<Vec<_>, _>>()?;

    let relations = record
        .relations
        .iter()
        .map(|target| {
            let entity = required("relation target", target.entity.as_str())?;
            Ok(RelationSlots {
                kind: target.kind.as_str(),
                concept: escape_iri(&format!("{companion_base}{}", concept_id(ids, entity))),
                entity: local_name(entity),
                labels: labels(&target.labels)?,
            })
        })
        .collect::<Result<Vec<_>, RenderError>>()?;

    Ok(SkosSlots {
        concept: escape_iri(&format!("{concept_base}{local_id}")),
        entity: local_name(required("entity", record.entity.as_str())?),
        labels: labels_out,
        descriptions,
        relations,
        subject_id: local_name(required("subject", record.subject.id.as_str())?),
    })
}
