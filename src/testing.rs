//! In-memory SPARQL endpoint for unit tests

use async_trait::async_trait;
use std::sync::Mutex;

use crate::sparql::{Row, SparqlEndpoint};
use crate::utils::error::{FetchError, SparqlError};

enum Reply {
    Rows(Vec<Row>),
    Boolean(bool),
    Fail,
}

/// Answers queries by substring match against scripted rules
///
/// Rules are tried in insertion order. Unmatched SELECTs return no rows and
/// unmatched ASKs return `false`.
#[derive(Default)]
pub struct ScriptedEndpoint {
    rules: Vec<(String, Reply)>,
    log: Mutex<Vec<String>>,
}

impl ScriptedEndpoint {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn select_when(mut self, needle: &str, rows: Vec<Row>) -> Self {
        self.rules.push((needle.to_string(), Reply::Rows(rows)));
        self
    }

    pub fn ask_when(mut self, needle: &str, answer: bool) -> Self {
        self.rules.push((needle.to_string(), Reply::Boolean(answer)));
        self
    }

    pub fn fail_when(mut self, needle: &str) -> Self {
        self.rules.push((needle.to_string(), Reply::Fail));
        self
    }

    /// Queries received so far
    pub fn queries(&self) -> Vec<String> {
        self.log.lock().map(|log| log.clone()).unwrap_or_default()
    }

    fn reply(&self, query: &str) -> Option<&Reply> {
        if let Ok(mut log) = self.log.lock() {
            log.push(query.to_string());
        }
        self.rules
            .iter()
            .find(|(needle, _)| query.contains(needle.as_str()))
            .map(|(_, reply)| reply)
    }
}

#[async_trait]
impl SparqlEndpoint for ScriptedEndpoint {
    async fn select(&self, query: &str) -> Result<Vec<Row>, SparqlError> {
        match self.reply(query) {
            Some(Reply::Rows(rows)) => Ok(rows.clone()),
            Some(Reply::Fail) => Err(SparqlError::Fetch(FetchError::ServerError(503))),
            Some(Reply::Boolean(_)) => Err(SparqlError::UnexpectedShape {
                expected: "SELECT bindings",
            }),
            None => Ok(Vec::new()),
        }
    }

    async fn ask(&self, query: &str) -> Result<bool, SparqlError> {
        match self.reply(query) {
            Some(Reply::Boolean(answer)) => Ok(*answer),
            Some(Reply::Fail) => Err(SparqlError::Fetch(FetchError::ServerError(503))),
            Some(Reply::Rows(_)) => Err(SparqlError::UnexpectedShape {
                expected: "ASK boolean",
            }),
            None => Ok(false),
        }
    }
}
