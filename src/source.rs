//! Data source abstraction for the four raw catalog documents.
//!
//! The engine never reads files or URLs directly; it asks a [`DataSource`]
//! for raw text by name. The two built-in sources cover the deployment
//! variants the catalog ships in: a local directory of exports and an HTTP
//! endpoint serving the same files.
//!
//! Fetch failures are the only errors that propagate out of a catalog load.
//! They carry the source name as context and are never retried here; retry
//! policy belongs to the caller.

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use std::path::PathBuf;

use crate::config::{Config, DataConfig};

/// An async text fetch primitive keyed by a file name.
#[async_trait]
pub trait DataSource: Send + Sync {
    /// Human-readable description of where this source reads from.
    fn describe(&self) -> String;

    /// Fetch one raw document. Any failure (missing file, non-success
    /// status) is an error; there is no partial success.
    async fn fetch_text(&self, name: &str) -> Result<String>;
}

/// Reads catalog exports from a local directory.
pub struct FsSource {
    root: PathBuf,
}

impl FsSource {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }
}

#[async_trait]
impl DataSource for FsSource {
    fn describe(&self) -> String {
        format!("directory {}", self.root.display())
    }

    async fn fetch_text(&self, name: &str) -> Result<String> {
        let path = self.root.join(name);
        if !path.exists() {
            bail!("data file does not exist: {}", path.display());
        }
        tokio::fs::read_to_string(&path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))
    }
}

/// Fetches catalog exports over HTTP.
pub struct HttpSource {
    client: reqwest::Client,
    base_url: String,
}

impl HttpSource {
    pub fn new(base_url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl DataSource for HttpSource {
    fn describe(&self) -> String {
        format!("url {}", self.base_url)
    }

    async fn fetch_text(&self, name: &str) -> Result<String> {
        let url = format!("{}/{}", self.base_url, name);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .with_context(|| format!("Failed to fetch {url}"))?;
        let response = response
            .error_for_status()
            .with_context(|| format!("Non-success status fetching {url}"))?;
        response
            .text()
            .await
            .with_context(|| format!("Failed to read body of {url}"))
    }
}

/// Build the configured source. Config validation guarantees exactly one
/// variant is set.
pub fn source_from_config(config: &Config) -> Result<Box<dyn DataSource>> {
    match (&config.data.root, &config.data.base_url) {
        (Some(root), None) => Ok(Box::new(FsSource::new(root.clone()))),
        (None, Some(base)) => Ok(Box::new(HttpSource::new(base.clone()))),
        _ => bail!("config must set exactly one of data.root or data.base_url"),
    }
}

/// The four raw documents a catalog is built from.
#[derive(Debug, Clone)]
pub struct RawSources {
    pub models: String,
    pub schematics: String,
    pub links: String,
    pub parts: String,
}

/// Fetch all four documents concurrently. Any single failure fails the
/// whole load; no partial set is returned.
pub async fn fetch_all(source: &dyn DataSource, data: &DataConfig) -> Result<RawSources> {
    let (models, schematics, links, parts) = tokio::try_join!(
        fetch_named(source, &data.models),
        fetch_named(source, &data.schematics),
        fetch_named(source, &data.links),
        fetch_named(source, &data.parts),
    )?;
    Ok(RawSources {
        models,
        schematics,
        links,
        parts,
    })
}

async fn fetch_named(source: &dyn DataSource, name: &str) -> Result<String> {
    source
        .fetch_text(name)
        .await
        .with_context(|| format!("Failed to load catalog source '{name}'"))
}
