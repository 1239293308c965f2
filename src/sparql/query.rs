//! SPARQL query text for each resolution stage
//!
//! Terms are user data and are escaped as string literals. Entity and
//! language identifiers are checked before they are spliced into a query.

use crate::models::EntityRef;
use crate::utils::escape_literal;

const PREFIXES: &str = "PREFIX wd: <http://www.wikidata.org/entity/>
PREFIX wdt: <http://www.wikidata.org/prop/direct/>
PREFIX rdfs: <http://www.w3.org/2000/01/rdf-schema#>
PREFIX schema: <http://schema.org/>
";

/// Whether `id` can be used as the local part of `wd:` in a query
pub fn is_safe_entity(id: &EntityRef) -> bool {
    let id = id.as_str();
    !id.is_empty() && id.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Whether `code` looks like a language tag
pub fn is_safe_language(code: &str) -> bool {
    !code.is_empty() && code.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
}

/// Entities carrying `term` as a label in language `lang`
pub fn label_lookup(term: &str, lang: &str) -> String {
    format!(
        "{PREFIXES}SELECT ?item WHERE {{\n  ?item rdfs:label \"{}\"@{lang} .\n}}",
        escape_literal(term)
    )
}

/// Is `entity` reachable from `anchor` via part-of / subclass-of / instance-of
pub fn membership_ask(entity: &EntityRef, anchor: &EntityRef) -> String {
    format!(
        "{PREFIXES}ASK {{\n  wd:{entity} (wdt:P361|wdt:P279|wdt:P31)+ wd:{anchor} .\n}}"
    )
}

/// Wiki articles about `entity`, in every language
pub fn article_facts(entity: &EntityRef) -> String {
    format!(
        "{PREFIXES}SELECT DISTINCT ?article ?lang ?name WHERE {{
  ?article schema:about wd:{entity} ;
           schema:inLanguage ?lang ;
           schema:name ?name .
}}"
    )
}

fn language_list(languages: &[String]) -> String {
    languages
        .iter()
        .filter(|l| is_safe_language(l))
        .map(|l| format!("'{l}'"))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Article names and entity descriptions of `entity`, in matching languages
pub fn labelled_facts(entity: &EntityRef, languages: &[String]) -> String {
    format!(
        "{PREFIXES}SELECT DISTINCT ?desc ?lang ?name WHERE {{
  ?article schema:about wd:{entity} ;
           schema:inLanguage ?lang ;
           schema:name ?name .
  wd:{entity} schema:description ?desc .
  FILTER(?lang IN ({langs}))
  FILTER(lang(?name) = lang(?desc))
}} ORDER BY ?lang",
        langs = language_list(languages)
    )
}

/// Broader, narrower and related entities of `entity`, with their labels
pub fn relations(entity: &EntityRef, languages: &[String], limit: usize) -> String {
    format!(
        "{PREFIXES}SELECT ?kind ?target ?label WHERE {{
  {{
    {{ SELECT ?target (\"broader\" AS ?kind) WHERE {{ wd:{entity} (wdt:P279|wdt:P361) ?target . }} LIMIT {limit} }}
    UNION
    {{ SELECT ?target (\"narrower\" AS ?kind) WHERE {{ ?target wdt:P279 wd:{entity} . }} LIMIT {limit} }}
    UNION
    {{ SELECT ?target (\"related\" AS ?kind) WHERE {{ wd:{entity} wdt:P1382 ?target . }} LIMIT {limit} }}
  }}
  OPTIONAL {{
    ?target rdfs:label ?label .
    FILTER(lang(?label) IN ({langs}))
  }}
}}",
        langs = language_list(languages)
    )
}
