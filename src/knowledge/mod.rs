//! Knowledge-base stages of the term pipeline
//!
//! Each stage talks to a [`SparqlEndpoint`](crate::sparql::SparqlEndpoint)
//! and reports an explicit [`Lookup`](crate::models::Lookup) or `Result`,
//! so the orchestrator can tell a miss from an error.
//!
//! - [`resolver`] - term → entity
//! - [`classifier`] - entity → first matching subject anchor
//! - [`collector`] - entity → cross-lingual fact rows and relation targets

pub mod classifier;
pub mod collector;
pub mod resolver;

pub use classifier::{default_anchors, SubjectClassifier};
pub use collector::FactCollector;
pub use resolver::EntityResolver;
