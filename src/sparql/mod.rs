//! SPARQL endpoint access
//!
//! [`SparqlEndpoint`] is the seam between the resolution stages and the
//! network: the stages only need `SELECT` rows and `ASK` answers.
//! [`SparqlClient`] implements it over HTTP GET with `format=json`.

pub mod query;

use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;

use crate::fetcher::{FetcherConfig, HttpFetcher};
use crate::utils::error::{FetchError, SparqlError};

/// Access to a SPARQL endpoint
#[async_trait]
pub trait SparqlEndpoint: Send + Sync {
    /// Run a SELECT query, returning rows in endpoint order
    async fn select(&self, query: &str) -> Result<Vec<Row>, SparqlError>;

    /// Run an ASK query
    async fn ask(&self, query: &str) -> Result<bool, SparqlError>;
}

/// One bound value in a SPARQL JSON result row
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct BoundValue {
    #[serde(rename = "type")]
    pub kind: String,
    pub value: String,
    #[serde(rename = "xml:lang", default)]
    pub lang: Option<String>,
}

impl BoundValue {
    /// Plain literal
    pub fn literal(value: impl Into<String>) -> Self {
        Self {
            kind: "literal".to_string(),
            value: value.into(),
            lang: None,
        }
    }

    /// Language-tagged literal
    pub fn tagged(value: impl Into<String>, lang: impl Into<String>) -> Self {
        Self {
            lang: Some(lang.into()),
            ..Self::literal(value)
        }
    }
}

/// One solution of a SELECT query
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct Row(HashMap<String, BoundValue>);

impl Row {
    /// Value of a variable, if bound
    pub fn get(&self, variable: &str) -> Option<&str> {
        self.0.get(variable).map(|b| b.value.as_str())
    }

    /// Value of a variable that must be bound
    pub fn require(&self, variable: &str) -> Result<&str, SparqlError> {
        self.get(variable).ok_or_else(|| SparqlError::MissingBinding {
            variable: variable.to_string(),
        })
    }

    /// Language tag of a bound literal
    pub fn lang(&self, variable: &str) -> Option<&str> {
        self.0.get(variable).and_then(|b| b.lang.as_deref())
    }

    /// Build a row from `(variable, value)` pairs, as plain literals
    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        Self::from_values(pairs.into_iter().map(|(k, v)| (k, BoundValue::literal(v))))
    }

    /// Build a row from `(variable, bound value)` pairs
    pub fn from_values<'a>(values: impl IntoIterator<Item = (&'a str, BoundValue)>) -> Self {
        Self(
            values
                .into_iter()
                .map(|(k, v)| (k.to_string(), v))
                .collect(),
        )
    }
}

#[derive(Debug, Deserialize)]
struct SelectResults {
    bindings: Vec<Row>,
}

/// SPARQL 1.1 JSON results document
#[derive(Debug, Deserialize)]
struct SparqlResponse {
    #[serde(default)]
    results: Option<SelectResults>,
    #[serde(default)]
    boolean: Option<bool>,
}

impl SparqlResponse {
    fn parse(body: &str) -> Result<Self, SparqlError> {
        serde_json::from_str(body).map_err(|e| SparqlError::MalformedResponse {
            reason: e.to_string(),
        })
    }
}

const SPARQL_JSON: &str = "application/sparql-results+json";

/// SPARQL endpoint client over HTTP
pub struct SparqlClient {
    fetcher: HttpFetcher,
    endpoint: String,
}

impl SparqlClient {
    /// Create a client for `endpoint`
    ///
    /// # Errors
    ///
    /// Returns `FetchError` if the HTTP client cannot be created or the
    /// endpoint is not a URL
    pub fn new(endpoint: &str, config: FetcherConfig) -> Result<Self, FetchError> {
        url::Url::parse(endpoint).map_err(|e| FetchError::InvalidUrl(format!("{endpoint}: {e}")))?;

        Ok(Self {
            fetcher: HttpFetcher::new(config)?,
            endpoint: endpoint.to_string(),
        })
    }

    async fn run(&self, query: &str) -> Result<SparqlResponse, SparqlError> {
        let body = self
            .fetcher
            .get_text(
                &self.endpoint,
                &[("format", "json"), ("query", query)],
                SPARQL_JSON,
            )
            .await?;
        SparqlResponse::parse(&body)
    }
}

#[async_trait]
impl SparqlEndpoint for SparqlClient {
    async fn select(&self, query: &str) -> Result<Vec<Row>, SparqlError> {
        let response = self.run(query).await?;
        response
            .results
            .map(|r| r.bindings)
            .ok_or(SparqlError::UnexpectedShape {
                expected: "SELECT bindings",
            })
    }

    async fn ask(&self, query: &str) -> Result<bool, SparqlError> {
        let response = self.run(query).await?;
        response.boolean.ok_or(SparqlError::UnexpectedShape {
            expected: "ASK boolean",
        })
    }
}
