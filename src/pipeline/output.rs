//! Output artifacts of a run
//!
//! - the Turtle file: appended to for the lexical variant, rewritten for
//!   the taxonomic one
//! - the term to concept id map (`term , LT1234567` per line)
//! - the list of terms whose fact table came back empty

use std::path::Path;
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;

use crate::config::OutputConfig;
use crate::error::Result;
use crate::models::Variant;
use crate::render::prefixes;

/// Writes the artifacts named in an [`OutputConfig`]
#[derive(Debug, Clone)]
pub struct ArtifactWriter {
    config: OutputConfig,
}

impl ArtifactWriter {
    pub fn new(config: OutputConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &OutputConfig {
        &self.config
    }

    /// Write the prefix block that opens the Turtle file
    pub async fn start(&self, variant: Variant) -> Result<()> {
        let block = format!("{}\n\n", prefixes(variant).trim_end());
        match variant {
            Variant::Lexical => append(&self.config.rdf_path, &block).await,
            Variant::Taxonomic => overwrite(&self.config.rdf_path, &block).await,
        }
    }

    /// Append rendered records, in order, each followed by a blank line
    pub async fn append_records(&self, records: &[String]) -> Result<()> {
        let mut body = String::new();
        for record in records {
            body.push_str(record.trim_end());
            body.push_str("\n\n");
        }
        append(&self.config.rdf_path, &body).await
    }

    /// Persist the term to concept id map
    pub async fn write_id_map(&self, ids: &[(String, String)]) -> Result<()> {
        let body: String = ids
            .iter()
            .map(|(term, id)| format!("{term} , {id}\n"))
            .collect();
        overwrite(&self.config.id_map_path, &body).await
    }

    /// Persist the terms whose fact table was empty
    pub async fn write_empty_facts(&self, terms: &[String]) -> Result<()> {
        let body: String = terms.iter().map(|t| format!("{t}\n")).collect();
        overwrite(&self.config.empty_facts_path, &body).await
    }
}

async fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).await?;
    }
    Ok(())
}

async fn append(path: &Path, content: &str) -> Result<()> {
    ensure_parent(path).await?;
    let mut file = OpenOptions::new().create(true).append(true).open(path).await?;
    file.write_all(content.as_bytes()).await?;
    file.flush().await?;
    Ok(())
}

async fn overwrite(path: &Path, content: &str) -> Result<()> {
    ensure_parent(path).await?;
    fs::write(path, content).await?;
    tracing::debug!(path = %path.display(), bytes = content.len(), "Wrote artifact");
    Ok(())
}
