//! Configuration management for termlink
//!
//! This module handles loading and validating configuration from environment
//! variables and TOML files. A `Config` is passed explicitly into the
//! orchestrator; nothing is read from process-wide state after startup.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::knowledge::classifier::default_anchors;
use crate::lexicon::{GenderPolicy, PluralPolicy};
use crate::models::{Anchor, Language, Variant};
use crate::render::ids::IdStrategy;
use crate::render::{DEFAULT_COMPANION_BASE, DEFAULT_CONCEPT_BASE};
use crate::sparql::query;
use crate::utils::retry::RetryConfig;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// Remote services
    pub endpoint: EndpointConfig,

    /// What to run and how wide
    pub run: RunConfig,

    /// Lexical variant options
    pub lexical: LexicalConfig,

    /// Taxonomic variant options
    pub taxonomic: TaxonomicConfig,

    /// Output artifacts
    pub output: OutputConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// SPARQL endpoint and dictionary service settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EndpointConfig {
    /// SPARQL endpoint URL
    pub sparql_url: String,

    /// Dictionary page base URL; the term is appended
    pub dictionary_url: String,

    /// User agent string (the public endpoint rejects anonymous clients)
    pub user_agent: String,

    /// Request timeout in seconds
    pub request_timeout_secs: u64,

    /// Rate limit (requests per second, shared by all workers)
    pub requests_per_second: u32,

    /// Retries on transient failures
    pub max_retries: u32,

    /// Base backoff delay in milliseconds
    pub retry_base_delay_ms: u64,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            sparql_url: String::from("https://query.wikidata.org/sparql"),
            dictionary_url: String::from("https://en.wiktionary.org/wiki/"),
            user_agent: format!(
                "termlink/{} (linked-data term linking)",
                env!("CARGO_PKG_VERSION")
            ),
            request_timeout_secs: 30,
            requests_per_second: 5,
            max_retries: 2,
            retry_base_delay_ms: 500,
        }
    }
}

/// Run-level settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Output mode
    pub variant: Variant,

    /// Source language name, e.g. `italian`
    pub language: String,

    /// Number of terms processed concurrently
    pub concurrency: usize,

    /// Ordered anchor set; the variant's default set when absent
    pub anchors: Option<Vec<Anchor>>,

    /// How synthetic identifiers are generated
    pub id_strategy: IdStrategy,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            variant: Variant::Lexical,
            language: String::from("italian"),
            concurrency: 4,
            anchors: None,
            id_strategy: IdStrategy::ContentHash,
        }
    }
}

/// Lexical variant settings
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct LexicalConfig {
    /// Whether and how the raw gender signal becomes a gender triple
    pub gender_policy: GenderPolicy,

    /// Whether a parsed plural form reaches the output
    pub plural_policy: PluralPolicy,

    /// Skip the dictionary entirely
    pub skip_enrichment: bool,
}

/// Taxonomic variant settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TaxonomicConfig {
    /// Languages kept in labels and descriptions, in this order of preference
    pub languages: Vec<String>,

    /// Base IRI for the term concepts
    pub concept_base: String,

    /// Base IRI for broader/narrower/related companion concepts
    pub companion_base: String,

    /// Maximum targets per relation kind
    pub relation_limit: usize,
}

impl Default for TaxonomicConfig {
    fn default() -> Self {
        Self {
            languages: ["es", "de", "nl", "en"].iter().map(|s| s.to_string()).collect(),
            concept_base: String::from(DEFAULT_CONCEPT_BASE),
            companion_base: String::from(DEFAULT_COMPANION_BASE),
            relation_limit: 10,
        }
    }
}

/// Output artifact paths
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Turtle output (appended in the lexical variant, replaced in the taxonomic one)
    pub rdf_path: PathBuf,

    /// Term to synthetic identifier mapping (taxonomic)
    pub id_map_path: PathBuf,

    /// Terms whose fact table was empty (taxonomic)
    pub empty_facts_path: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            rdf_path: PathBuf::from("output/lexicon.ttl"),
            id_map_path: PathBuf::from("output/scterm_dict.csv"),
            empty_facts_path: PathBuf::from("output/errors.txt"),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Log format (text, json)
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: String::from("info"),
            format: String::from("text"),
        }
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.parse::<T>().ok())
}

impl Config {
    /// Load configuration from environment variables over the defaults
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(url) = std::env::var("TERMLINK_SPARQL_URL") {
            config.endpoint.sparql_url = url;
        }
        if let Ok(url) = std::env::var("TERMLINK_DICTIONARY_URL") {
            config.endpoint.dictionary_url = url;
        }
        if let Ok(agent) = std::env::var("TERMLINK_USER_AGENT") {
            config.endpoint.user_agent = agent;
        }
        if let Some(timeout) = env_parse("TERMLINK_REQUEST_TIMEOUT") {
            config.endpoint.request_timeout_secs = timeout;
        }
        if let Some(rps) = env_parse("TERMLINK_RATE_LIMIT") {
            config.endpoint.requests_per_second = rps;
        }
        if let Some(retries) = env_parse("TERMLINK_MAX_RETRIES") {
            config.endpoint.max_retries = retries;
        }
        if let Ok(variant) = std::env::var("TERMLINK_VARIANT") {
            config.run.variant = variant
                .parse()
                .map_err(|e: String| anyhow::anyhow!(e))
                .context("Invalid TERMLINK_VARIANT")?;
        }
        if let Ok(language) = std::env::var("TERMLINK_LANGUAGE") {
            config.run.language = language;
        }
        if let Some(concurrency) = env_parse("TERMLINK_CONCURRENCY") {
            config.run.concurrency = concurrency;
        }
        if let Ok(strategy) = std::env::var("TERMLINK_ID_STRATEGY") {
            config.run.id_strategy = strategy
                .parse()
                .map_err(|e: String| anyhow::anyhow!(e))
                .context("Invalid TERMLINK_ID_STRATEGY")?;
        }
        if let Ok(path) = std::env::var("TERMLINK_OUTPUT") {
            config.output.rdf_path = PathBuf::from(path);
        }
        if let Ok(level) = std::env::var("TERMLINK_LOG_LEVEL") {
            config.logging.level = level;
        }
        if let Ok(format) = std::env::var("TERMLINK_LOG_FORMAT") {
            config.logging.format = format;
        }

        Ok(config)
    }

    /// Load configuration from a file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse TOML config file: {}", path.display()))?;

        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.run.concurrency == 0 {
            anyhow::bail!("concurrency must be greater than 0");
        }

        if self.endpoint.requests_per_second == 0 {
            anyhow::bail!("requests_per_second must be greater than 0");
        }

        if self.endpoint.request_timeout_secs == 0 {
            anyhow::bail!("request_timeout_secs must be greater than 0");
        }

        url::Url::parse(&self.endpoint.sparql_url).context("sparql_url is not a valid URL")?;
        url::Url::parse(&self.endpoint.dictionary_url)
            .context("dictionary_url is not a valid URL")?;

        if self.run.language.trim().len() < 2 {
            anyhow::bail!("language must name a language, e.g. 'italian'");
        }

        if let Some(anchors) = &self.run.anchors {
            if anchors.is_empty() {
                anyhow::bail!("anchor set must not be empty");
            }
            if let Some(bad) = anchors.iter().find(|a| !query::is_safe_entity(&a.id)) {
                anyhow::bail!("anchor '{}' has an invalid entity id '{}'", bad.name, bad.id);
            }
        }

        if self.run.variant == Variant::Taxonomic && self.taxonomic.languages.is_empty() {
            anyhow::bail!("taxonomic language allow-list must not be empty");
        }

        Ok(())
    }

    /// Get request timeout as Duration
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.endpoint.request_timeout_secs)
    }

    /// Retry policy for remote calls
    #[must_use]
    pub fn retry(&self) -> RetryConfig {
        RetryConfig::with_delays(
            self.endpoint.max_retries,
            self.endpoint.retry_base_delay_ms,
            self.endpoint.retry_base_delay_ms.saturating_mul(16),
        )
    }

    /// Source language of the run
    #[must_use]
    pub fn language(&self) -> Language {
        Language::from_name(&self.run.language)
    }

    /// Ordered anchor set in effect
    #[must_use]
    pub fn anchors(&self) -> Vec<Anchor> {
        self.run
            .anchors
            .clone()
            .unwrap_or_else(|| default_anchors(self.run.variant))
    }
}
