// Core data structures for termlink

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Error, ErrorCategory};

/// Output mode of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
    /// OntoLex lexical entries with translations
    #[default]
    Lexical,
    /// SKOS concepts with broader/narrower/related links
    Taxonomic,
}

impl Variant {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Lexical => "lexical",
            Self::Taxonomic => "taxonomic",
        }
    }
}

impl std::str::FromStr for Variant {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "lexical" | "ontolex" => Ok(Self::Lexical),
            "taxonomic" | "skos" => Ok(Self::Taxonomic),
            other => Err(format!("unknown variant: {other}")),
        }
    }
}

/// Language names the dictionary understands, with their ISO 639-1 codes
const LANGUAGES: &[(&str, &str)] = &[
    ("italian", "it"),
    ("english", "en"),
    ("spanish", "es"),
    ("german", "de"),
    ("dutch", "nl"),
    ("french", "fr"),
    ("portuguese", "pt"),
    ("catalan", "ca"),
    ("basque", "eu"),
];

/// Source language of a run
///
/// The dictionary is addressed by name (`italian`), the knowledge base by
/// ISO 639-1 code (`it`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Language {
    pub name: String,
    pub code: String,
}

impl Language {
    /// Build from a language name; unknown names use their first two letters
    pub fn from_name(name: &str) -> Self {
        let name = name.trim().to_lowercase();
        let code = LANGUAGES
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, c)| (*c).to_string())
            .unwrap_or_else(|| name.chars().take(2).collect());
        Self { name, code }
    }

    /// Section heading used by the dictionary, e.g. `Italian`
    pub fn heading(&self) -> String {
        let mut chars = self.name.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }
}

impl Default for Language {
    fn default() -> Self {
        Self::from_name("italian")
    }
}

/// A source-language term, the unit of work
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Term {
    /// Surface string, matched exactly against knowledge-base labels
    pub text: String,

    /// URI of the term in the thesaurus it was read from, if any
    pub external_uri: Option<String>,
}

impl Term {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            external_uri: None,
        }
    }

    pub fn with_uri(text: impl Into<String>, uri: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            external_uri: Some(uri.into()),
        }
    }

    /// Multi-word terms cannot be resolved in the lexical variant
    pub fn is_multi_word(&self) -> bool {
        self.text.chars().any(char::is_whitespace)
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Knowledge-base entity identifier, e.g. `Q12280`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityRef(String);

impl EntityRef {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Take the last path segment of an entity URI
    ///
    /// `http://www.wikidata.org/entity/Q12280` becomes `Q12280`.
    pub fn from_uri(uri: &str) -> Option<Self> {
        uri.trim_end_matches('/')
            .rsplit('/')
            .next()
            .filter(|id| !id.is_empty())
            .map(|id| Self(id.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One member of the subject-category set used for classification
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Anchor {
    pub name: String,
    pub id: EntityRef,
}

impl Anchor {
    pub fn new(name: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            id: EntityRef::new(id),
        }
    }
}

/// The anchor a resolved entity was classified under
pub type SubjectClass = Anchor;

/// One localized row collected for an entity
///
/// Lexical rows carry `(article language, article URL, article name)`;
/// taxonomic rows carry `(language, label, description)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FactRow {
    pub language: String,
    pub primary: String,
    pub secondary: String,
}

impl FactRow {
    pub fn new(
        language: impl Into<String>,
        primary: impl Into<String>,
        secondary: impl Into<String>,
    ) -> Self {
        Self {
            language: language.into(),
            primary: primary.into(),
            secondary: secondary.into(),
        }
    }
}

/// Kind of taxonomic link between two concepts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RelationKind {
    Broader,
    Narrower,
    Related,
}

impl RelationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Broader => "broader",
            Self::Narrower => "narrower",
            Self::Related => "related",
        }
    }
}

impl std::str::FromStr for RelationKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "broader" => Ok(Self::Broader),
            "narrower" => Ok(Self::Narrower),
            "related" => Ok(Self::Related),
            other => Err(format!("unknown relation kind: {other}")),
        }
    }
}

/// A language-tagged label
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalizedText {
    pub language: String,
    pub text: String,
}

/// A broader/narrower/related entity attached to a taxonomic record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationTarget {
    pub kind: RelationKind,
    pub entity: EntityRef,
    pub labels: Vec<LocalizedText>,
}

/// Dictionary-derived attributes of a term (lexical variant)
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LexicalInfo {
    pub etymology: String,
    pub part_of_speech: Option<String>,
    pub gender: Option<String>,
    pub plural: Option<String>,
}

impl LexicalInfo {
    pub fn is_empty(&self) -> bool {
        self.etymology.is_empty()
            && self.part_of_speech.is_none()
            && self.gender.is_none()
            && self.plural.is_none()
    }
}

/// Everything collected for one term, ready for rendering
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TermRecord {
    pub term: Term,
    pub language: Language,
    pub entity: EntityRef,
    pub subject: SubjectClass,
    pub facts: Vec<FactRow>,
    pub relations: Vec<RelationTarget>,
    pub lexical: LexicalInfo,

    /// Synthetic concept identifier (taxonomic variant)
    pub local_id: Option<String>,
}

/// Outcome of one pipeline stage for one term
#[derive(Debug)]
pub enum Lookup<T, E> {
    /// The stage produced a value
    Hit(T),
    /// The knowledge source answered, but had nothing for this term
    Miss,
    /// The stage could not get an answer
    Failed(E),
}

impl<T, E> Lookup<T, E> {
    pub fn is_hit(&self) -> bool {
        matches!(self, Self::Hit(_))
    }

    pub fn hit(self) -> Option<T> {
        match self {
            Self::Hit(value) => Some(value),
            _ => None,
        }
    }
}

/// Pipeline stage, used to label failures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Validate,
    Resolve,
    Classify,
    Collect,
    Enrich,
    Render,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Validate => "validate",
            Self::Resolve => "resolve",
            Self::Classify => "classify",
            Self::Collect => "collect",
            Self::Enrich => "enrich",
            Self::Render => "render",
        }
    }
}

/// Whether a failure was an answer ("not there") or an error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailureKind {
    Excluded,
    Error,
}

/// A term that did not make it into the output
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TermFailure {
    pub term: String,
    pub stage: Stage,
    pub kind: FailureKind,
    pub reason: String,

    /// Class of the error behind a failure of kind `Error`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<ErrorCategory>,
}

impl TermFailure {
    pub fn excluded(term: &Term, stage: Stage, reason: impl Into<String>) -> Self {
        Self {
            term: term.text.clone(),
            stage,
            kind: FailureKind::Excluded,
            reason: reason.into(),
            category: None,
        }
    }

    pub fn error<E>(term: &Term, stage: Stage, err: E) -> Self
    where
        E: Into<Error> + fmt::Display,
    {
        let reason = err.to_string();
        Self {
            term: term.text.clone(),
            stage,
            kind: FailureKind::Error,
            reason,
            category: Some(err.into().category()),
        }
    }
}
