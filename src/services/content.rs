// src/services/content.rs

//! Content API client.
//!
//! Looks up the most recently published document at a given content
//! release ref.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use url::Url;

use crate::error::{AppError, Result};
use crate::models::{CmsDocument, ContentConfig};
use crate::utils::http::ensure_success;

const SERVICE: &str = "content API";

/// Ordering that puts the latest publication first.
const LATEST_FIRST: &str = "[document.last_publication_date desc]";

/// Source of published CMS documents.
#[async_trait]
pub trait ContentSource: Send + Sync {
    /// Fetch the most recently published document visible at `master_ref`.
    async fn latest_document(&self, master_ref: &str) -> Result<CmsDocument>;
}

/// Page of search results.
#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<CmsDocument>,
}

/// HTTP client for the content API.
pub struct ContentApiClient {
    client: Client,
    endpoint: String,
    lang: String,
    access_token: Option<String>,
}

impl ContentApiClient {
    pub fn new(client: Client, config: &ContentConfig) -> Self {
        let access_token = Some(config.access_token.trim())
            .filter(|token| !token.is_empty())
            .map(String::from);

        Self {
            client,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            lang: config.lang.clone(),
            access_token,
        }
    }

    /// Search URL returning the single latest document at `master_ref`.
    pub fn latest_document_url(&self, master_ref: &str) -> Result<Url> {
        let mut params = vec![
            ("ref", master_ref),
            ("lang", self.lang.as_str()),
            ("orderings", LATEST_FIRST),
            ("pageSize", "1"),
            ("page", "1"),
        ];
        if let Some(token) = &self.access_token {
            params.push(("access_token", token.as_str()));
        }

        Ok(Url::parse_with_params(
            &format!("{}/documents/search", self.endpoint),
            &params,
        )?)
    }
}

#[async_trait]
impl ContentSource for ContentApiClient {
    async fn latest_document(&self, master_ref: &str) -> Result<CmsDocument> {
        let url = self.latest_document_url(master_ref)?;
        log::debug!("Querying content API: {}", self.endpoint);

        let response = self.client.get(url).send().await?;
        let page: SearchResponse = ensure_success(SERVICE, response).await?.json().await?;

        page.results
            .into_iter()
            .next()
            .ok_or_else(|| AppError::DocumentNotFound(master_ref.to_string()))
    }
}
