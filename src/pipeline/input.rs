//! Term list readers
//!
//! Two layouts are accepted:
//! - `tsv`: `<uri>\t"term"@it` rows exported from a thesaurus
//! - `plain`: one term per line
//!
//! Blank lines are skipped and a repeated term keeps its first occurrence.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use std::str::FromStr;

use crate::models::Term;
use crate::utils::error::InputError;

/// Layout of a term list file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TermListFormat {
    Tsv,
    #[default]
    Plain,
}

impl TermListFormat {
    /// Guess the layout from a file extension
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("tsv") => Self::Tsv,
            _ => Self::Plain,
        }
    }
}

impl FromStr for TermListFormat {
    type Err = InputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "tsv" => Ok(Self::Tsv),
            "plain" | "txt" | "list" => Ok(Self::Plain),
            other => Err(InputError::UnknownFormat(other.to_string())),
        }
    }
}

/// Read a term list from `path`
pub async fn read_terms(path: &Path, format: TermListFormat) -> Result<Vec<Term>, InputError> {
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| InputError::Read {
            path: path.display().to_string(),
            source,
        })?;

    let terms = parse_terms(&content, format);
    tracing::info!(path = %path.display(), count = terms.len(), "Loaded term list");
    Ok(terms)
}

/// Parse term list text
pub fn parse_terms(content: &str, format: TermListFormat) -> Vec<Term> {
    let parsed = content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter_map(|line| match format {
            TermListFormat::Plain => Some(Term::new(line)),
            TermListFormat::Tsv => parse_tsv_row(line),
        });

    let mut seen = HashSet::new();
    parsed.filter(|term| seen.insert(term.text.clone())).collect()
}

fn parse_tsv_row(line: &str) -> Option<Term> {
    let mut columns = line.split('\t');
    let uri = columns.next()?.trim();
    let Some(label) = columns.next() else {
        tracing::debug!(line = %line, "Skipping row without a term column");
        return None;
    };

    let text = strip_language_tag(label.trim()).trim_matches('"').trim();
    if text.is_empty() {
        return None;
    }

    let uri = uri.trim_start_matches('<').trim_end_matches('>');
    if uri.is_empty() {
        Some(Term::new(text))
    } else {
        Some(Term::with_uri(text, uri))
    }
}

/// `"term"@it` -> `"term"`
fn strip_language_tag(label: &str) -> &str {
    match label.rsplit_once('@') {
        Some((literal, tag))
            if literal.ends_with('"')
                && !tag.is_empty()
                && tag.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') =>
        {
            literal
        }
        _ => label,
    }
}
