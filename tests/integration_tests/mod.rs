//! Integration tests module
//!
//! End-to-end runs of the termlink pipeline against a wiremock SPARQL
//! endpoint and dictionary, writing real artifacts into temp directories:
//! - Lexical (OntoLex) and taxonomic (SKOS) runs
//! - Error handling and per-term isolation

pub mod error_scenarios;
pub mod fixtures;
pub mod pipeline_test;
