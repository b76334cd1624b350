//! News search API responses and the records derived from them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Response of the `everything` endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsApiResponse {
    pub status: String,
    #[serde(default)]
    pub total_results: u64,
    #[serde(default)]
    pub articles: Vec<NewsApiArticle>,
}

/// An article as returned by the news search API.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsApiArticle {
    pub source: NewsSourceRef,
    #[serde(default)]
    pub author: Option<String>,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub url: String,
    #[serde(default)]
    pub url_to_image: Option<String>,
    pub published_at: String,
    #[serde(default)]
    pub content: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewsSourceRef {
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
}

/// A news article as stored in the `news_articles` collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsArticle {
    pub authors: Vec<String>,
    pub content: Option<String>,
    pub description: Option<String>,
    pub published_at: DateTime<Utc>,
    /// Source display name
    pub source: String,
    pub title: String,
    pub url: String,
    pub url_to_image: Option<String>,
}

impl TryFrom<NewsApiArticle> for NewsArticle {
    type Error = AppError;

    fn try_from(article: NewsApiArticle) -> Result<Self> {
        let published_at = DateTime::parse_from_rfc3339(&article.published_at)
            .map_err(|e| {
                AppError::validation(format!(
                    "invalid publishedAt '{}': {e}",
                    article.published_at
                ))
            })?
            .with_timezone(&Utc);

        Ok(Self {
            authors: split_authors(article.author.as_deref()),
            content: article.content,
            description: article.description,
            published_at,
            source: article.source.name,
            title: article.title,
            url: article.url,
            url_to_image: article.url_to_image,
        })
    }
}

/// Split a comma separated author line.
fn split_authors(author: Option<&str>) -> Vec<String> {
    author
        .map(|line| {
            line.split(',')
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .map(String::from)
                .collect()
        })
        .unwrap_or_default()
}

/// Key facts about a stored article, published for the email notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewsDigest {
    /// Document id in `news_articles`
    pub id: String,
    pub title: String,
    pub url: String,
    pub source: String,
}

impl NewsDigest {
    pub fn new(id: impl Into<String>, article: &NewsArticle) -> Self {
        Self {
            id: id.into(),
            title: article.title.clone(),
            url: article.url.clone(),
            source: article.source.clone(),
        }
    }
}
