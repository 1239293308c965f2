//! Wiktionary page client
//!
//! Pages are fetched as rendered HTML and walked in document order. An
//! `h2` opens a language section; inside the requested language,
//! "Etymology" headings open a new entry and part-of-speech headings open a
//! definition whose first paragraph is the headword line.

use async_trait::async_trait;
use scraper::{ElementRef, Html, Selector};
use std::sync::OnceLock;
use url::Url;

use super::{Definition, DictionaryEntry, DictionarySource};
use crate::fetcher::{FetcherConfig, HttpFetcher};
use crate::models::Language;
use crate::utils::error::{DictionaryError, FetchError};

macro_rules! parse_selector {
    ($s:expr) => {
        Selector::parse($s).expect(concat!("Invalid CSS selector: ", $s))
    };
}

fn page_walk() -> &'static Selector {
    static WALK: OnceLock<Selector> = OnceLock::new();
    WALK.get_or_init(|| parse_selector!("h2, h3, h4, h5, p, ol"))
}

const PART_OF_SPEECH_HEADINGS: &[&str] = &[
    "Noun",
    "Proper noun",
    "Verb",
    "Adjective",
    "Adverb",
    "Pronoun",
    "Preposition",
    "Conjunction",
    "Interjection",
    "Article",
    "Determiner",
    "Numeral",
    "Particle",
    "Participle",
    "Prefix",
    "Suffix",
    "Phrase",
    "Prepositional phrase",
    "Abbreviation",
];

const HTML: &str = "text/html";

/// Dictionary source backed by Wiktionary's rendered pages
pub struct WiktionaryClient {
    fetcher: HttpFetcher,
    base_url: Url,
}

impl WiktionaryClient {
    /// Create a client for pages under `base_url`, e.g. `https://en.wiktionary.org/wiki/`
    ///
    /// # Errors
    ///
    /// Returns `FetchError` if `base_url` is not a URL or the HTTP client
    /// cannot be created
    pub fn new(base_url: &str, config: FetcherConfig) -> Result<Self, FetchError> {
        let base_url =
            Url::parse(base_url).map_err(|e| FetchError::InvalidUrl(format!("{base_url}: {e}")))?;

        Ok(Self {
            fetcher: HttpFetcher::new(config)?,
            base_url,
        })
    }

    /// Page URL for `term`, with the term percent-encoded as one path segment
    pub fn page_url(&self, term: &str) -> Result<Url, FetchError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| FetchError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .push(term);
        Ok(url)
    }
}

#[async_trait]
impl DictionarySource for WiktionaryClient {
    async fn lookup(
        &self,
        term: &str,
        language: &Language,
    ) -> Result<Vec<DictionaryEntry>, DictionaryError> {
        let url = self.page_url(term)?;

        let html = match self.fetcher.get_text(url.as_str(), &[], HTML).await {
            Ok(html) => html,
            Err(FetchError::NotFound(_)) => {
                tracing::debug!(term = %term, "No dictionary page");
                return Ok(Vec::new());
            }
            Err(e) => return Err(e.into()),
        };

        Ok(parse_entries(&html, language))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Section {
    Outside,
    Etymology,
    PartOfSpeech { name: String, headword: Option<String> },
    Other,
}

/// Extract the entries of `language` from a rendered page
pub fn parse_entries(html: &str, language: &Language) -> Vec<DictionaryEntry> {
    let document = Html::parse_document(html);
    let wanted = language.heading();

    let mut in_language = false;
    let mut section = Section::Outside;
    let mut entries: Vec<DictionaryEntry> = Vec::new();

    for element in document.select(page_walk()) {
        let tag = element.value().name();

        if tag == "h2" {
            in_language = heading_text(element) == wanted;
            section = Section::Outside;
            continue;
        }
        if !in_language {
            continue;
        }

        match tag {
            "h3" | "h4" | "h5" => {
                let heading = heading_text(element);
                if heading.starts_with("Etymology") {
                    let needs_entry = entries
                        .last()
                        .map_or(true, |e| !e.etymology.is_empty() || !e.definitions.is_empty());
                    if needs_entry {
                        entries.push(DictionaryEntry::default());
                    }
                    section = Section::Etymology;
                } else if PART_OF_SPEECH_HEADINGS.contains(&heading.as_str()) {
                    if entries.is_empty() {
                        entries.push(DictionaryEntry::default());
                    }
                    section = Section::PartOfSpeech {
                        name: heading.to_lowercase(),
                        headword: None,
                    };
                } else {
                    section = Section::Other;
                }
            }
            "p" => {
                let text = element_text(element);
                if text.is_empty() {
                    continue;
                }
                match &mut section {
                    Section::Etymology => {
                        if let Some(entry) = entries.last_mut() {
                            if !entry.etymology.is_empty() {
                                entry.etymology.push('\n');
                            }
                            entry.etymology.push_str(&text);
                        }
                    }
                    Section::PartOfSpeech { headword, .. } if headword.is_none() => {
                        *headword = Some(text);
                    }
                    _ => {}
                }
            }
            "ol" if !is_nested_list(element) => {
                if let Section::PartOfSpeech { name, headword } = &section {
                    let mut text = vec![headword.clone().unwrap_or_default()];
                    text.extend(list_items(element));
                    if let Some(entry) = entries.last_mut() {
                        entry.definitions.push(Definition {
                            part_of_speech: name.clone(),
                            text,
                        });
                    }
                    section = Section::Other;
                }
            }
            _ => {}
        }
    }

    entries
}

fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

fn heading_text(element: ElementRef<'_>) -> String {
    let text = element_text(element);
    text.strip_suffix("[edit]").unwrap_or(&text).trim().to_string()
}

fn is_nested_list(element: ElementRef<'_>) -> bool {
    element
        .parent()
        .and_then(ElementRef::wrap)
        .is_some_and(|parent| parent.value().name() == "li")
}

/// First line of each direct `li` child; examples and sublists follow on later lines
fn list_items(list: ElementRef<'_>) -> Vec<String> {
    list.children()
        .filter_map(ElementRef::wrap)
        .filter(|child| child.value().name() == "li")
        .filter_map(|li| {
            li.text()
                .collect::<String>()
                .lines()
                .map(str::trim)
                .find(|line| !line.is_empty())
                .map(str::to_string)
        })
        .collect()
}
