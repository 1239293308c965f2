//! Lexical enrichment from a dictionary
//!
//! The dictionary supplies etymology, part of speech and the headword line
//! of a term's first definition. Gender and plural are pulled out of that
//! headword line by splitting on a language-specific "plural" marker:
//!
//! ```text
//! "architettura f (plural architetture)"
//!   -> strip term and NBSP   " f (plural architetture)"
//!   -> split on " (plural "  [" f", "architetture)"]
//!   -> gender signal " f", plural "architetture"
//! ```
//!
//! Two steps of the original behaviour look unintended and are kept behind
//! [`GenderPolicy`] and [`PluralPolicy`] rather than silently fixed.

pub mod wiktionary;

use async_trait::async_trait;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, OnceLock};

use crate::models::{Language, LexicalInfo, Lookup};
use crate::utils::clean_text;
use crate::utils::error::DictionaryError;

pub use wiktionary::WiktionaryClient;

/// One definition block of a dictionary entry
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Definition {
    /// Lowercase part of speech, e.g. `noun`
    pub part_of_speech: String,

    /// Headword line first, then the individual senses
    pub text: Vec<String>,
}

/// One etymology-level entry of a dictionary page
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DictionaryEntry {
    pub etymology: String,
    pub definitions: Vec<Definition>,
}

/// A dictionary that can be asked about a term in a language
#[async_trait]
pub trait DictionarySource: Send + Sync {
    /// Entries for `term`; an empty list when the dictionary has none
    async fn lookup(
        &self,
        term: &str,
        language: &Language,
    ) -> Result<Vec<DictionaryEntry>, DictionaryError>;
}

/// How the raw gender signal becomes a gender
///
/// The original compared the signal with the number `1`, which a text
/// fragment never equals, so no gender was ever written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenderPolicy {
    /// Accept only a signal equal to the literal sentinel `"1"`
    #[default]
    Sentinel,
    /// Map the signal's first token (`m`, `f`, `n`) to a gender
    Mapped,
}

/// Whether a parsed plural reaches the record
///
/// The original copied the plural only when the record's plural slot was
/// already filled, which it never was at that point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PluralPolicy {
    /// Copy only into an already non-empty slot
    #[default]
    Gated,
    /// Copy whenever a plural was parsed
    Direct,
}

/// Both enrichment policies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LexicalPolicy {
    pub gender: GenderPolicy,
    pub plural: PluralPolicy,
}

const GENDER_SENTINEL: &str = "1";

const GENDERS: &[(&str, &str)] = &[("m", "masculine"), ("f", "feminine"), ("n", "neuter")];

fn gender_name(code: &str) -> Option<String> {
    GENDERS
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, name)| (*name).to_string())
}

/// Attributes read off the first definition, before any policy
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RawLexical {
    pub etymology: String,
    pub part_of_speech: String,
    pub gender_signal: String,
    pub plural: String,
}

fn plural_marker(language: &Language) -> &'static Regex {
    static ITALIAN: OnceLock<Regex> = OnceLock::new();
    static GENERIC: OnceLock<Regex> = OnceLock::new();

    if language.name == "italian" {
        ITALIAN.get_or_init(|| {
            Regex::new(&regex::escape(" (plural ")).expect("Invalid regex pattern")
        })
    } else {
        GENERIC.get_or_init(|| Regex::new(r".*plural ").expect("Invalid regex pattern"))
    }
}

/// Split a headword line into `(gender signal, plural)`
///
/// The plural is the text after the marker up to the first `)`, kept only
/// when it is longer than three characters.
pub fn split_definition(term: &str, text: &str, language: &Language) -> (String, String) {
    let cleaned = text.replace(term, "").replace('\u{a0}', "");
    let mut segments = plural_marker(language).split(&cleaned);

    let gender = segments.next().unwrap_or_default().to_string();
    let plural = segments
        .next()
        .map(|rest| rest.split(')').next().unwrap_or_default())
        .filter(|candidate| candidate.chars().count() > 3)
        .unwrap_or_default()
        .to_string();

    (gender, plural)
}

/// Read the raw attributes off the first entry's first definition
///
/// Returns `None` when there is no entry or the entry has no definitions.
pub fn extract_raw(term: &str, language: &Language, entries: &[DictionaryEntry]) -> Option<RawLexical> {
    let entry = entries.first()?;
    let definition = entry.definitions.first()?;
    let headword = definition.text.first().map(String::as_str).unwrap_or_default();
    let (gender_signal, plural) = split_definition(term, headword, language);

    Some(RawLexical {
        etymology: clean_text(&entry.etymology),
        part_of_speech: definition.part_of_speech.clone(),
        gender_signal,
        plural,
    })
}

/// Turn raw attributes into the record's lexical fields
pub fn apply_policy(raw: &RawLexical, policy: LexicalPolicy) -> LexicalInfo {
    let pos_len = raw.part_of_speech.chars().count();
    let part_of_speech = (3..=9)
        .contains(&pos_len)
        .then(|| raw.part_of_speech.clone());

    let gender = match policy.gender {
        GenderPolicy::Sentinel if raw.gender_signal == GENDER_SENTINEL => {
            gender_name(&raw.gender_signal)
        }
        GenderPolicy::Sentinel => None,
        GenderPolicy::Mapped => raw
            .gender_signal
            .split_whitespace()
            .next()
            .and_then(gender_name),
    };

    // The plural slot of a fresh record is always empty here.
    let plural_slot = "";
    let plural = match policy.plural {
        PluralPolicy::Gated if plural_slot.is_empty() => None,
        PluralPolicy::Gated | PluralPolicy::Direct => {
            (!raw.plural.is_empty()).then(|| raw.plural.clone())
        }
    };

    LexicalInfo {
        etymology: raw.etymology.clone(),
        part_of_speech,
        gender,
        plural,
    }
}

/// Looks terms up in a dictionary and derives their lexical fields
pub struct LexicalEnricher {
    source: Arc<dyn DictionarySource>,
    policy: LexicalPolicy,
}

impl LexicalEnricher {
    pub fn new(source: Arc<dyn DictionarySource>, policy: LexicalPolicy) -> Self {
        Self { source, policy }
    }

    /// Enrich `term`; `Miss` when the dictionary has no usable entry
    pub async fn enrich(&self, term: &str, language: &Language) -> Lookup<LexicalInfo, DictionaryError> {
        let entries = match self.source.lookup(term, language).await {
            Ok(entries) => entries,
            Err(e) => return Lookup::Failed(e),
        };

        match extract_raw(term, language, &entries) {
            Some(raw) => {
                tracing::debug!(
                    term = %term,
                    pos = %raw.part_of_speech,
                    gender_signal = %raw.gender_signal,
                    plural = %raw.plural,
                    "Dictionary entry found"
                );
                Lookup::Hit(apply_policy(&raw, self.policy))
            }
            None => Lookup::Miss,
        }
    }
}
