//! HTTP client for the platform's routing backend
//!
//! Posts a question to the backend's analyze endpoint and parses the returned
//! routing analysis.

use reqwest::Client;
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;
use tracing::warn;

use super::RoutingAnalysis;

/// Path of the analyze endpoint, relative to the backend base URL
const ANALYZE_PATH: &str = "/api/v1/routing/analyze";

/// Default request timeout
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Errors that can occur when classifying a question remotely
#[derive(Debug, Error)]
pub enum ClassifyError {
    /// HTTP request failed (connection, timeout, body read)
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// Backend answered with a non-success status
    #[error("Backend returned status {0}")]
    Status(u16),

    /// Failed to parse JSON response
    #[error("Failed to parse JSON response: {0}")]
    ParseError(#[from] serde_json::Error),
}

/// Request body for the analyze endpoint
#[derive(Debug, Serialize)]
struct AnalyzeRequest<'a> {
    question: &'a str,
}

/// Builds an HTTP client with `timeout`
///
/// The builder only fails when the TLS backend cannot initialize. The client
/// then has no timeout, and the failure is logged.
fn build_client(timeout: Duration) -> Client {
    Client::builder().timeout(timeout).build().unwrap_or_else(|e| {
        warn!(error = %e, timeout_secs = timeout.as_secs(), "HTTP client setup failed, request timeout disabled");
        Client::new()
    })
}

/// Client for the routing backend
#[derive(Debug, Clone)]
pub struct RemoteClassifier {
    client: Client,
    base_url: String,
}

impl RemoteClassifier {
    /// Creates a client for `base_url` with the default timeout
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    /// Creates a client for `base_url` with a custom request timeout
    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Self {
        Self::with_client(build_client(timeout), base_url)
    }

    /// Creates a client around an existing HTTP client
    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    /// Base URL of the backend
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Full URL of the analyze endpoint
    fn analyze_url(&self) -> String {
        format!("{}{}", self.base_url, ANALYZE_PATH)
    }

    /// Asks the backend which persona should answer `question`
    ///
    /// # Returns
    /// * `Ok(RoutingAnalysis)` - The backend's recommendation
    /// * `Err(ClassifyError)` - If the request fails, the status is not 2xx
    ///   or the body is not a routing analysis
    pub async fn classify(&self, question: &str) -> Result<RoutingAnalysis, ClassifyError> {
        let response = self
            .client
            .post(self.analyze_url())
            .json(&AnalyzeRequest { question })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ClassifyError::Status(status.as_u16()));
        }

        let text = response.text().await?;
        let analysis: RoutingAnalysis = serde_json::from_str(&text)?;
        Ok(analysis)
    }
}
