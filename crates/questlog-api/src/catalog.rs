use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};

use crate::retry::{is_retryable_status, retry_transient, RetryConfig};

const USER_AGENT: &str = "questlog/0.1.0";
const DEFAULT_TIMEOUT_SECS: u64 = 15;

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Catalog request failed: {0}")]
    RequestFailed(String),

    #[error("Catalog not found at {0}")]
    NotFound(String),

    #[error("Catalog server returned {status}")]
    ServerError { status: reqwest::StatusCode },

    #[error("Catalog request timed out")]
    Timeout,

    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),
}

impl CatalogError {
    /// Worth another attempt? Timeouts and 5xx yes, a missing file no.
    pub fn is_transient(&self) -> bool {
        match self {
            CatalogError::ServerError { status } => is_retryable_status(*status),
            CatalogError::Timeout => true,
            CatalogError::NetworkError(e) => e.is_connect() || e.is_timeout(),
            CatalogError::RequestFailed(_) | CatalogError::NotFound(_) => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, CatalogError>;

/// Fetches the static quest catalog document
///
/// The body is returned as text; parsing and validation belong to the
/// repository that owns the catalog.
pub struct CatalogClient {
    client: reqwest::Client,
    url: String,
    retry_config: RetryConfig,
}

impl CatalogClient {
    pub fn new(url: impl Into<String>) -> Result<Self> {
        Self::with_timeout(url, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    pub fn with_timeout(url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            reqwest::header::USER_AGENT,
            reqwest::header::HeaderValue::from_static(USER_AGENT),
        );
        headers.insert(
            reqwest::header::ACCEPT,
            reqwest::header::HeaderValue::from_static("application/json"),
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            url: url.into(),
            retry_config: RetryConfig::default(),
        })
    }

    /// Replace the retry configuration
    pub fn with_retry_config(mut self, retry_config: RetryConfig) -> Self {
        self.retry_config = retry_config;
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Read the catalog document once
    pub async fn fetch_document(&self) -> Result<String> {
        debug!("Fetching quest catalog from {}", self.url);

        let body = retry_transient(
            &self.retry_config,
            || async {
                let response = self.client.get(&self.url).send().await.map_err(|e| {
                    if e.is_timeout() {
                        CatalogError::Timeout
                    } else {
                        CatalogError::NetworkError(e)
                    }
                })?;

                let status = response.status();

                if status == reqwest::StatusCode::NOT_FOUND {
                    return Err(CatalogError::NotFound(self.url.clone()));
                }

                if is_retryable_status(status) {
                    return Err(CatalogError::ServerError { status });
                }

                if !status.is_success() {
                    let body = response.text().await.unwrap_or_default();
                    return Err(CatalogError::RequestFailed(format!(
                        "Status {}: {}",
                        status, body
                    )));
                }

                Ok(response.text().await?)
            },
            CatalogError::is_transient,
        )
        .await?;

        info!("Fetched quest catalog ({} bytes)", body.len());
        Ok(body)
    }
}
