use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, warn};
use url::Url;

use crate::{
    error::AppError,
    search::{
        filters::SearchFilters,
        result::{buckets_from_envelope, SearchResult},
    },
    utils::config::AppConfig,
};

/// Anything able to answer a filter record with aggregation buckets.
#[async_trait]
pub trait SearchBackend: Send + Sync {
    async fn search(&self, filters: &SearchFilters) -> Result<Vec<SearchResult>, AppError>;
}

/// Talks to the external search API over HTTP.
#[derive(Clone, Debug)]
pub struct HttpSearchClient {
    client: reqwest::Client,
    endpoint: Url,
}

impl HttpSearchClient {
    pub fn new(endpoint: &str, timeout: Duration) -> Result<Self, AppError> {
        let endpoint = Url::parse(endpoint)?;
        let client = reqwest::ClientBuilder::new().timeout(timeout).build()?;
        Ok(Self { client, endpoint })
    }

    pub fn from_config(config: &AppConfig) -> Result<Self, AppError> {
        Self::new(
            &config.search_api_url,
            Duration::from_secs(config.search_timeout_secs),
        )
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl SearchBackend for HttpSearchClient {
    async fn search(&self, filters: &SearchFilters) -> Result<Vec<SearchResult>, AppError> {
        debug!(
            endpoint = %self.endpoint,
            page = filters.page,
            rows = filters.rows,
            "Sending search request"
        );

        let response = self
            .client
            .post(self.endpoint.clone())
            .json(filters)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            warn!(%status, "Search API returned a non-success status");
            return Err(AppError::UpstreamStatus(status));
        }

        let envelope = response
            .json::<Value>()
            .await
            .map_err(|e| AppError::UpstreamPayload(e.to_string()))?;

        let buckets = buckets_from_envelope(&envelope)?;
        debug!(count = buckets.len(), "Search API returned buckets");
        Ok(buckets)
    }
}
