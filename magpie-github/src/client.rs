//! Extraction service client
//!
//! The client wraps the external page-to-structured-data service: one POST
//! per artifact, bearer-token auth, JSON envelope in and out. Transient
//! failures are retried here with exponential backoff; callers only ever
//! see the final success or the final classified failure.

use async_trait::async_trait;
use backon::{ExponentialBuilder, Retryable};
use magpie_core::{Config, RetryConfig, Secrets};
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use crate::{ArtifactLocator, ArtifactRecord, Error, Result};

/// Source of artifact records, keyed by URL
///
/// [`ExtractorClient`] is the production implementation; tests drive the
/// traversal engine with in-memory implementations.
#[async_trait]
pub trait ArtifactSource: Send + Sync {
    /// Fetch and normalize the artifact at `url`
    async fn fetch(&self, url: &str) -> Result<ArtifactRecord>;
}

/// Client for the structured-extraction service and the raw-diff host
pub struct ExtractorClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    diff_host: String,
    retry: RetryConfig,
}

/// Response envelope of the extraction endpoint
#[derive(Debug, Deserialize)]
struct ExtractResponse {
    #[serde(default)]
    success: bool,
    data: Option<serde_json::Value>,
    error: Option<String>,
}

impl ExtractorClient {
    /// Create a client, loading the API key from the environment or the
    /// secrets file
    pub fn new(config: &Config) -> Result<Self> {
        let secrets = Secrets::load().map_err(|e| Error::Other(e.to_string()))?;

        let api_key = secrets.api_key().ok_or_else(|| {
            Error::PermissionDenied(
                "extraction API key not found. Set MAGPIE_API_KEY \
                 or add it to ~/.config/magpie/secrets.toml"
                    .to_string(),
            )
        })?;

        Self::with_api_key(config, api_key)
    }

    /// Create a client with an explicit API key
    pub fn with_api_key(config: &Config, api_key: impl Into<String>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.extractor.timeout)
            .build()?;

        Ok(Self {
            http,
            base_url: config.extractor.base_url.trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            diff_host: config.diff.host.clone(),
            retry: config.extractor.retry.clone(),
        })
    }

    /// POST one extraction request, retrying transient failures
    pub(crate) async fn extract_payload(
        &self,
        url: &str,
        prompt: &str,
        schema: &serde_json::Value,
    ) -> Result<serde_json::Value> {
        let strategy = ExponentialBuilder::default()
            .with_min_delay(self.retry.min_delay)
            .with_factor(self.retry.backoff_factor)
            .with_max_times(self.retry.max_attempts.saturating_sub(1))
            .with_jitter();

        let operation = || self.extract_once(url, prompt, schema);

        operation.retry(strategy).when(Error::is_retryable).await
    }

    async fn extract_once(
        &self,
        url: &str,
        prompt: &str,
        schema: &serde_json::Value,
    ) -> Result<serde_json::Value> {
        let endpoint = format!("{}/v1/extract", self.base_url);

        debug!(url, endpoint = %endpoint, "Requesting extraction");

        let request_body = json!({
            "urls": [url],
            "prompt": prompt,
            "schema": schema,
        });

        let response = self
            .http
            .post(&endpoint)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("User-Agent", "magpie-github")
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read response".to_string());
            return Err(classify_status(status.as_u16(), url, &text));
        }

        let envelope: ExtractResponse = response
            .json()
            .await
            .map_err(|e| Error::Parse(format!("Failed to parse extraction response: {}", e)))?;

        if !envelope.success {
            return Err(Error::Extraction(
                envelope
                    .error
                    .unwrap_or_else(|| "extraction reported failure".to_string()),
            ));
        }

        envelope
            .data
            .ok_or_else(|| Error::Parse("extraction response missing data".to_string()))
    }

    /// GET the raw unified diff for a pull request
    ///
    /// Never retried: a failing diff host fails the fetch immediately with
    /// a [`Error::DiffFetch`] distinct from extraction failures.
    pub(crate) async fn fetch_diff(&self, locator: &ArtifactLocator) -> Result<String> {
        let url = locator.diff_url(&self.diff_host);

        debug!(url = %url, "Fetching raw diff");

        let response = self
            .http
            .get(&url)
            .header("User-Agent", "magpie-github")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::DiffFetch {
                url,
                status: status.as_u16(),
            });
        }

        response.text().await.map_err(Error::Http)
    }
}

#[async_trait]
impl ArtifactSource for ExtractorClient {
    async fn fetch(&self, url: &str) -> Result<ArtifactRecord> {
        self.fetch_artifact(url).await
    }
}

impl std::fmt::Debug for ExtractorClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExtractorClient")
            .field("base_url", &self.base_url)
            .field("diff_host", &self.diff_host)
            .finish_non_exhaustive()
    }
}

/// Map a non-success extraction status to a classified error
fn classify_status(status: u16, url: &str, body: &str) -> Error {
    match status {
        429 => Error::RateLimited(format!("{}: {}", url, body)),
        401 | 403 => Error::PermissionDenied(format!("{}: {}", url, body)),
        404 => Error::NotFound(url.to_string()),
        _ => Error::Extraction(format!("status {} for {}: {}", status, url, body)),
    }
}
