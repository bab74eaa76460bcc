//! Where the character dataset comes from.
//!
//! A [`DataSource`] is either the public HTTP endpoint or a local JSON file
//! with the same shape. Each load is a single attempt: no retries, no cache.

use std::path::PathBuf;
use std::time::Duration;

use census_core::error::{CensusError, Result};
use census_core::models::Record;
use tracing::{debug, info};

use crate::decode::decode_records;

/// Default HTTP request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

// ── HttpSource ────────────────────────────────────────────────────────────────

/// Fetch the dataset with a single HTTP GET.
#[derive(Debug, Clone)]
pub struct HttpSource {
    url: String,
    timeout: Duration,
}

impl HttpSource {
    pub fn new(url: impl Into<String>, timeout_secs: u64) -> Self {
        Self {
            url: url.into(),
            timeout: Duration::from_secs(timeout_secs),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub async fn load(&self) -> Result<Vec<Record>> {
        let client = reqwest::Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(|e| self.http_error(e))?;

        debug!(url = %self.url, "requesting dataset");
        let response = client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| self.http_error(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(CensusError::Http {
                url: self.url.clone(),
                message: format!("unexpected status {status}"),
            });
        }

        let body = response.text().await.map_err(|e| self.http_error(e))?;
        let records = decode_records(&body)?;
        info!(url = %self.url, count = records.len(), "dataset fetched");
        Ok(records)
    }

    fn http_error(&self, e: reqwest::Error) -> CensusError {
        CensusError::Http {
            url: self.url.clone(),
            message: e.to_string(),
        }
    }
}

// ── FileSource ────────────────────────────────────────────────────────────────

/// Read the dataset from a local JSON file.
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub async fn load(&self) -> Result<Vec<Record>> {
        let body = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|source| CensusError::FileRead {
                path: self.path.clone(),
                source,
            })?;
        let records = decode_records(&body)?;
        info!(path = %self.path.display(), count = records.len(), "dataset loaded");
        Ok(records)
    }
}

// ── DataSource ────────────────────────────────────────────────────────────────

/// Either source, chosen once at startup.
#[derive(Debug, Clone)]
pub enum DataSource {
    Http(HttpSource),
    File(FileSource),
}

impl DataSource {
    /// Pick the file source when `input` is given, otherwise HTTP.
    pub fn from_options(url: &str, input: Option<PathBuf>, timeout_secs: u64) -> Self {
        match input {
            Some(path) => Self::File(FileSource::new(path)),
            None => Self::Http(HttpSource::new(url, timeout_secs)),
        }
    }

    /// Short human-readable origin for status lines.
    pub fn describe(&self) -> String {
        match self {
            Self::Http(s) => s.url().to_string(),
            Self::File(s) => s.path.display().to_string(),
        }
    }

    pub async fn load(&self) -> Result<Vec<Record>> {
        match self {
            Self::Http(s) => s.load().await,
            Self::File(s) => s.load().await,
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
