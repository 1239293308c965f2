//! termlink - link domain terms to a knowledge graph as RDF
//!
//! Takes a list of source-language terms, resolves each one to a Wikidata
//! entity, classifies it under a subject anchor, collects its cross-lingual
//! labels and renders the result as Turtle: OntoLex lexical entries with
//! translations, or SKOS concepts with broader/narrower/related links.
//!
//! # Architecture
//!
//! - [`config`] - Configuration management and settings
//! - [`fetcher`] - Rate-limited HTTP client with retry
//! - [`sparql`] - SPARQL endpoint access and query text
//! - [`knowledge`] - Entity resolution, classification and fact collection
//! - [`lexicon`] - Dictionary enrichment (lexical variant)
//! - [`render`] - Turtle rendering
//! - [`pipeline`] - Orchestration, term list input and artifact output
//! - [`models`] - Core data structures and types
//! - [`utils`] - Common utilities and helpers
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use termlink::config::Config;
//! use termlink::pipeline::{read_terms, ArtifactWriter, Pipeline, TermListFormat};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::from_env()?;
//!     let terms = read_terms(Path::new("terms.txt"), TermListFormat::Plain).await?;
//!     let pipeline = Pipeline::from_config(&config)?;
//!     let report = pipeline.run(&terms, &ArtifactWriter::new(config.output.clone())).await?;
//!     println!("{} of {} terms rendered", report.rendered, report.attempted);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod fetcher;
pub mod knowledge;
pub mod lexicon;
pub mod models;
pub mod pipeline;
pub mod render;
pub mod sparql;
pub mod utils;

#[cfg(test)]
pub(crate) mod testing;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::Config;
    pub use crate::error::{Error, ErrorCategory, Result};
    pub use crate::models::{
        Anchor, EntityRef, FactRow, Language, Lookup, Stage, Term, TermFailure, TermRecord,
        Variant,
    };
    pub use crate::pipeline::{ArtifactWriter, Pipeline, RunReport, TermListFormat};
    pub use crate::render::Renderer;
    pub use crate::sparql::{SparqlClient, SparqlEndpoint};
}

// Direct re-exports for convenience
pub use models::{Term, TermFailure, Variant};
