//! Slots of an OntoLex lexical entry

use serde::Serialize;

use super::ids::{IdGenerator, TRANSLATION_IDS};
use super::{checked, required};
use crate::models::TermRecord;
use crate::utils::error::RenderError;
use crate::utils::{escape_iri, escape_literal, local_name};

#[derive(Debug, Serialize)]
pub(super) struct LexicalSlots {
    local: String,
    written: String,
    lang: String,
    entity: String,
    article: Option<String>,
    subject_id: String,
    subject_name: String,
    reference: Option<String>,
    pos: Option<String>,
    gender: Option<String>,
    plural: Option<String>,
    translations: Vec<TranslationSlots>,
}

#[derive(Debug, Serialize)]
struct TranslationSlots {
    local: String,
    source: String,
    lang: String,
    written: String,
    article: String,
}

fn optional_name(field: &str, value: Option<&String>) -> Result<Option<String>, RenderError> {
    value
        .filter(|v| !v.is_empty())
        .map(|v| checked(field, v).map(local_name))
        .transpose()
}

pub(super) fn slots(record: &TermRecord, ids: &dyn IdGenerator) -> Result<LexicalSlots, RenderError> {
    let term = required("term", &record.term.text)?;
    let lang = &record.language.code;
    let local = local_name(term);

    // The localized article is the first row in the source language.
    let article = record
        .facts
        .iter()
        .find(|row| row.language == *lang)
        .map(|row| checked("article", &row.primary).map(escape_iri))
        .transpose()?;

    let reference = record
        .term
        .external_uri
        .as_deref()
        .map(|uri| checked("reference", uri).map(escape_iri))
        .transpose()?;

    let plural = record
        .lexical
        .plural
        .as_deref()
        .filter(|p| !p.is_empty())
        .map(|p| checked("plural", p).map(escape_literal))
        .transpose()?;

    let mut translations = Vec::new();
    for row in record.facts.iter().filter(|row| row.language != *lang) {
        let row_lang = required("translation language", &row.language)?;
        let key = format!("{term}\t{row_lang}\t{}", row.primary);
        let n = ids.next_id(&TRANSLATION_IDS, &key);

        translations.push(TranslationSlots {
            local: format!("{}_{n}", local_name(row_lang)),
            source: local.clone(),
            lang: local_name(row_lang),
            written: escape_literal(checked("translation", &row.secondary)?),
            article: escape_iri(checked("translation article", &row.primary)?),
        });
    }

    Ok(LexicalSlots {
        written: escape_literal(term),
        lang: local_name(required("language", lang)?),
        entity: local_name(required("entity", record.entity.as_str())?),
        article,
        subject_id: local_name(required("subject", record.subject.id.as_str())?),
        subject_name: escape_literal(checked("subject name", &record.subject.name)?),
        reference,
        pos: optional_name("part of speech", record.lexical.part_of_speech.as_ref())?,
        gender: optional_name("gender", record.lexical.gender.as_ref())?,
        plural,
        translations,
        local,
    })
}
