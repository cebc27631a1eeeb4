// HTTP catalog source - bridges CatalogClient with the CatalogSource trait
use async_trait::async_trait;
use questlog_api::CatalogClient;
use std::time::Duration;

use crate::{catalog::CatalogSource, Error, Result};

/// Wrapper around CatalogClient that implements CatalogSource
pub struct HttpCatalogSource {
    client: CatalogClient,
}

impl HttpCatalogSource {
    pub fn new(url: String, timeout: Duration) -> Result<Self> {
        let client = CatalogClient::with_timeout(url, timeout)
            .map_err(|e| Error::ConfigError(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl CatalogSource for HttpCatalogSource {
    async fn fetch(&self) -> Result<String> {
        self.client
            .fetch_document()
            .await
            .map_err(|e| Error::CatalogLoad(e.to_string()))
    }

    fn describe(&self) -> String {
        self.client.url().to_string()
    }
}
