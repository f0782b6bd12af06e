//! Analysis service HTTP client.
//!
//! Blocking reqwest client (no Tokio runtime required). One POST per run.

use std::time::Duration;

use fieldrisk_config::Settings;
use fieldrisk_core::FieldRecord;
use fieldrisk_recon::{AnalysisError, AnalysisService, RemoteReply};

/// Analysis service client (blocking).
#[derive(Clone)]
pub struct AnalysisClient {
    http: reqwest::blocking::Client,
    url: String,
}

/// Error type for transport failures.
#[derive(Debug)]
pub enum ClientError {
    /// Request never produced a status (connect, DNS, timeout)
    Network(String),
    /// Status arrived but the body could not be read
    Http(u16, String),
    /// Client could not be constructed
    Build(String),
}

impl std::fmt::Display for ClientError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ClientError::Network(msg) => write!(f, "Network error: {}", msg),
            ClientError::Http(code, msg) => write!(f, "HTTP {}: {}", code, msg),
            ClientError::Build(msg) => write!(f, "Cannot create HTTP client: {}", msg),
        }
    }
}

impl std::error::Error for ClientError {}

impl From<ClientError> for AnalysisError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::Http(status, body) => AnalysisError::remote_status(status, &body),
            other => AnalysisError::network(other.to_string()),
        }
    }
}

impl AnalysisClient {
    /// Client for the configured analysis URL and timeout.
    pub fn from_settings(settings: &Settings) -> Result<Self, ClientError> {
        Self::new(settings.analysis_url.clone(), settings.timeout())
    }

    /// Client for an explicit URL. `None` means no timeout.
    pub fn new(url: String, timeout: Option<Duration>) -> Result<Self, ClientError> {
        let http = reqwest::blocking::Client::builder()
            .user_agent(format!("fieldrisk/{}", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .map_err(|e| ClientError::Build(e.to_string()))?;

        Ok(Self { http, url })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// POST the batch as a JSON array. Any status is returned as a reply;
    /// only transport failures are errors.
    pub fn post_batch(&self, records: &[FieldRecord]) -> Result<RemoteReply, ClientError> {
        log::debug!("POST {} ({} record(s))", self.url, records.len());

        let response = self.http.post(&self.url)
            .json(records)
            .send()
            .map_err(|e| ClientError::Network(e.to_string()))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .map_err(|e| ClientError::Http(status, format!("cannot read response body: {}", e)))?;

        log::debug!("analysis service replied {} ({} bytes)", status, body.len());
        Ok(RemoteReply::new(status, body))
    }
}

impl AnalysisService for AnalysisClient {
    fn submit(&self, records: &[FieldRecord]) -> Result<RemoteReply, AnalysisError> {
        self.post_batch(records).map_err(AnalysisError::from)
    }
}
