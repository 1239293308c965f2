//! Turtle rendering of term records
//!
//! Every record is rendered in a single Handlebars pass over a struct of
//! already-escaped slot values. The registry runs in strict mode, so a
//! slot missing from the data is an error rather than an empty string, and
//! HTML escaping is off because values are escaped for Turtle beforehand.
//!
//! Values containing `{{` or `}}` are rejected outright.

pub mod ids;
mod lexical;
mod taxonomic;

use handlebars::Handlebars;
use serde::Serialize;
use std::sync::Arc;

use crate::config::Config;
use crate::models::{TermRecord, Variant};
use crate::utils::error::RenderError;
use ids::IdGenerator;

const LEXICAL_TEMPLATE: &str = include_str!("../../templates/lexical_entry.hbs");
const SKOS_TEMPLATE: &str = include_str!("../../templates/skos_concept.hbs");
const LEXICAL_PREFIXES: &str = include_str!("../../templates/prefixes_lexical.ttl");
const SKOS_PREFIXES: &str = include_str!("../../templates/prefixes_taxonomic.ttl");

const LEXICAL: &str = "lexical_entry";
const SKOS: &str = "skos_concept";

/// Default namespace of term concepts
pub const DEFAULT_CONCEPT_BASE: &str = "http://lkg.lynx-project.eu/kos/labourlaw_terms/";

/// Default namespace of companion concepts
pub const DEFAULT_COMPANION_BASE: &str = "http://lkg.lynx-project.eu/kos/labourlaw/";

/// Prefix block written once at the top of an output file
pub fn prefixes(variant: Variant) -> &'static str {
    match variant {
        Variant::Lexical => LEXICAL_PREFIXES,
        Variant::Taxonomic => SKOS_PREFIXES,
    }
}

/// Reject a raw value that reads as a template placeholder
pub(crate) fn checked<'a>(field: &str, value: &'a str) -> Result<&'a str, RenderError> {
    if value.contains("{{") || value.contains("}}") {
        return Err(RenderError::PlaceholderCollision {
            field: field.to_string(),
            value: value.to_string(),
        });
    }
    Ok(value)
}

/// Require a non-empty raw value
pub(crate) fn required<'a>(field: &str, value: &'a str) -> Result<&'a str, RenderError> {
    if value.trim().is_empty() {
        return Err(RenderError::MissingField {
            field: field.to_string(),
        });
    }
    checked(field, value)
}

/// Renders term records as Turtle blocks
pub struct Renderer {
    registry: Handlebars<'static>,
    ids: Arc<dyn IdGenerator>,
    concept_base: String,
    companion_base: String,
}

impl Renderer {
    /// Create a renderer drawing suffixes from `ids`
    ///
    /// # Errors
    ///
    /// Returns `RenderError::TemplateRegistration` if a built-in template
    /// does not compile
    pub fn new(ids: Arc<dyn IdGenerator>) -> Result<Self, RenderError> {
        let mut registry = Handlebars::new();
        registry.set_strict_mode(true);
        registry.register_escape_fn(handlebars::no_escape);

        for (name, source) in [(LEXICAL, LEXICAL_TEMPLATE), (SKOS, SKOS_TEMPLATE)] {
            registry
                .register_template_string(name, source)
                .map_err(|e| RenderError::TemplateRegistration {
                    name: name.to_string(),
                    reason: e.to_string(),
                })?;
        }

        Ok(Self {
            registry,
            ids,
            concept_base: DEFAULT_CONCEPT_BASE.to_string(),
            companion_base: DEFAULT_COMPANION_BASE.to_string(),
        })
    }

    /// Renderer with the id strategy and concept namespaces of `config`
    pub fn from_config(config: &Config) -> Result<Self, RenderError> {
        Ok(Self::new(ids::generator(config.run.id_strategy))?.with_bases(
            &config.taxonomic.concept_base,
            &config.taxonomic.companion_base,
        ))
    }

    /// Override the concept and companion namespaces
    pub fn with_bases(mut self, concept_base: &str, companion_base: &str) -> Self {
        self.concept_base = concept_base.to_string();
        self.companion_base = companion_base.to_string();
        self
    }

    /// Identifier generator shared with the orchestrator
    pub fn ids(&self) -> &dyn IdGenerator {
        self.ids.as_ref()
    }

    /// Render one record
    ///
    /// # Errors
    ///
    /// Returns `RenderError` on a placeholder collision, an empty required
    /// field, or a template failure. The record is not rendered partially.
    pub fn render(&self, record: &TermRecord, variant: Variant) -> Result<String, RenderError> {
        match variant {
            Variant::Lexical => {
                let slots = lexical::slots(record, self.ids.as_ref())?;
                self.fill(LEXICAL, &slots)
            }
            Variant::Taxonomic => {
                let slots = taxonomic::slots(
                    record,
                    self.ids.as_ref(),
                    &self.concept_base,
                    &self.companion_base,
                )?;
                self.fill(SKOS, &slots)
            }
        }
    }

    fn fill<T: Serialize>(&self, name: &str, slots: &T) -> Result<String, RenderError> {
        self.registry
            .render(name, slots)
            .map_err(|e| RenderError::Template {
                name: name.to_string(),
                reason: e.to_string(),
            })
    }
}
