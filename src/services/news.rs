// src/services/news.rs

//! News search API client.

use async_trait::async_trait;
use chrono::{Days, NaiveDate};
use reqwest::Client;
use url::Url;

use crate::error::{AppError, Result};
use crate::models::{NewsApiResponse, NewsConfig, require};
use crate::utils::http::ensure_success;

const SERVICE: &str = "news API";

/// Parameters of an article search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewsQuery {
    pub q: String,
    /// Oldest publication date included
    pub from: NaiveDate,
    pub language: String,
    pub sort_by: String,
}

impl NewsQuery {
    /// Query covering the configured look-back window ending at `today`.
    ///
    /// Fails when the window does not fit the calendar.
    pub fn for_window(config: &NewsConfig, today: NaiveDate) -> Result<Self> {
        let from = u64::try_from(config.lookback_days)
            .ok()
            .and_then(|days| today.checked_sub_days(Days::new(days)))
            .ok_or_else(|| {
                AppError::validation(format!(
                    "news.lookback_days {} is out of range",
                    config.lookback_days
                ))
            })?;

        Ok(Self {
            q: config.query.clone(),
            from,
            language: config.language.clone(),
            sort_by: config.sort_by.clone(),
        })
    }

    fn params(&self) -> [(&'static str, String); 4] {
        [
            ("q", self.q.clone()),
            ("from", self.from.format("%Y-%m-%d").to_string()),
            ("language", self.language.clone()),
            ("sortBy", self.sort_by.clone()),
        ]
    }
}

/// Source of news articles.
#[async_trait]
pub trait NewsSource: Send + Sync {
    async fn everything(&self, query: &NewsQuery) -> Result<NewsApiResponse>;
}

/// HTTP client for the news search API.
pub struct NewsApiClient {
    client: Client,
    endpoint: String,
    api_key: String,
}

impl NewsApiClient {
    pub fn new(client: Client, config: &NewsConfig) -> Result<Self> {
        Ok(Self {
            client,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            api_key: require(&config.api_key, "news.api_key")?.to_string(),
        })
    }

    pub fn everything_url(&self, query: &NewsQuery) -> Result<Url> {
        Ok(Url::parse_with_params(
            &format!("{}/v2/everything", self.endpoint),
            query.params(),
        )?)
    }
}

#[async_trait]
impl NewsSource for NewsApiClient {
    async fn everything(&self, query: &NewsQuery) -> Result<NewsApiResponse> {
        let url = self.everything_url(query)?;

        let response = self
            .client
            .get(url)
            .header("X-Api-Key", &self.api_key)
            .send()
            .await?;
        let body: NewsApiResponse = ensure_success(SERVICE, response).await?.json().await?;

        if body.status != "ok" {
            let message = format!("status '{}'", body.status);
            return Err(AppError::api(SERVICE, 200, message));
        }
        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_starts_three_days_back() {
        let today = NaiveDate::from_ymd_opt(2026, 3, 2).unwrap();
        let query = NewsQuery::for_window(&NewsConfig::default(), today).unwrap();
        assert_eq!(query.from, NaiveDate::from_ymd_opt(2026, 2, 27).unwrap());
        assert_eq!(query.q, r#"entomophagy OR "edible insects""#);
    }

    #[test]
    fn test_oversized_window_is_rejected() {
        let config = NewsConfig {
            lookback_days: i64::MAX / 2,
            ..NewsConfig::default()
        };
        let today = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();

        let err = NewsQuery::for_window(&config, today).unwrap_err();
        assert!(err.is_client_error());
    }

    #[test]
    fn test_everything_url() {
        let config = NewsConfig {
            api_key: "k".into(),
            ..NewsConfig::default()
        };
        let client = NewsApiClient::new(Client::new(), &config).unwrap();
        let today = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
        let query = NewsQuery::for_window(&config, today).unwrap();
        let url = client.everything_url(&query).unwrap();

        assert_eq!(url.path(), "/v2/everything");
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert_eq!(
            pairs,
            vec![
                ("q".to_string(), r#"entomophagy OR "edible insects""#.to_string()),
                ("from".to_string(), "2026-10-16".to_string()),
                ("language".to_string(), "en".to_string()),
                ("sortBy".to_string(), "relevancy".to_string()),
            ]
        );
    }

    #[test]
    fn test_requires_api_key() {
        let config = NewsConfig::default();
        assert!(NewsApiClient::new(Client::new(), &config).is_err());
    }
}
