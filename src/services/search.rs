// src/services/search.rs

//! Search index client.
//!
//! Records are written with partial updates that create the object when
//! it does not exist yet, keyed by `objectID`.

use async_trait::async_trait;
use reqwest::Client;
use url::Url;

use crate::error::Result;
use crate::models::{SearchConfig, SearchRecord, require};
use crate::utils::http::ensure_success;
use crate::utils::join_segments;

const SERVICE: &str = "search index";

/// Abstracts the hosted search index.
#[async_trait]
pub trait SearchIndex: Send + Sync {
    /// Create or partially update `record` in `index`.
    async fn partial_update(&self, index: &str, record: &SearchRecord) -> Result<()>;
}

/// HTTP client for an Algolia application.
pub struct AlgoliaClient {
    client: Client,
    base_url: String,
    app_id: String,
    api_key: String,
}

impl AlgoliaClient {
    /// Create a client; application id and API key must be configured.
    pub fn new(client: Client, config: &SearchConfig) -> Result<Self> {
        let app_id = require(&config.app_id, "search.app_id")?.to_string();
        let api_key = require(&config.api_key, "search.api_key")?.to_string();

        Ok(Self {
            client,
            base_url: format!("https://{}.algolia.net/1/indexes", app_id.to_lowercase()),
            app_id,
            api_key,
        })
    }

    /// Point the client at another host (e.g. a DSN replica).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Endpoint of a create-if-absent partial update.
    pub fn partial_update_url(&self, index: &str, object_id: &str) -> Result<Url> {
        let mut url = join_segments(&self.base_url, [index, object_id, "partial"])?;
        url.query_pairs_mut().append_pair("createIfNotExists", "true");
        Ok(url)
    }
}

#[async_trait]
impl SearchIndex for AlgoliaClient {
    async fn partial_update(&self, index: &str, record: &SearchRecord) -> Result<()> {
        let url = self.partial_update_url(index, record.object_id())?;

        let response = self
            .client
            .post(url)
            .header("X-Algolia-Application-Id", &self.app_id)
            .header("X-Algolia-API-Key", &self.api_key)
            .json(record)
            .send()
            .await?;
        ensure_success(SERVICE, response).await?;

        log::info!(
            "Index {} for document '{}' updated in {}",
            record.object_id(),
            record.title(),
            index
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;

    fn config() -> SearchConfig {
        SearchConfig {
            app_id: "LATENCY".into(),
            api_key: "key".into(),
            ..SearchConfig::default()
        }
    }

    #[test]
    fn test_requires_credentials() {
        let err = AlgoliaClient::new(Client::new(), &SearchConfig::default())
            .err()
            .unwrap();
        assert!(matches!(err, AppError::Config(_)));
    }

    #[test]
    fn test_partial_update_url() {
        let client = AlgoliaClient::new(Client::new(), &config()).unwrap();
        let url = client.partial_update_url("Recipes", "XqB2/1").unwrap();
        assert_eq!(
            url.as_str(),
            "https://latency.algolia.net/1/indexes/Recipes/XqB2%2F1/partial?createIfNotExists=true"
        );
    }

    #[test]
    fn test_custom_base_url() {
        let client = AlgoliaClient::new(Client::new(), &config())
            .unwrap()
            .with_base_url("https://latency-dsn.algolia.net/1/indexes");
        let url = client.partial_update_url("BlogPosts", "p1").unwrap();
        let expected = "https://latency-dsn.algolia.net/1/indexes/BlogPosts/p1/";
        assert!(url.as_str().starts_with(expected));
    }
}
