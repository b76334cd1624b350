// src/pipeline/news.rs

//! Latest news: search recent articles, store them, announce each one.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use serde::Serialize;

use crate::error::Result;
use crate::models::{NewsApiArticle, NewsArticle, NewsConfig, NewsDigest, PubSubMessage};
use crate::services::{NewsQuery, NewsSource, Publisher};
use crate::storage::{DocumentStore, ObjectStore};

/// Counts reported by a latest news run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct NewsSummary {
    /// Articles reported by the search
    pub found: u64,
    pub stored: usize,
    pub published: usize,
    pub failed: usize,
}

/// Per-article result.
#[derive(Debug, Clone, Copy, Default)]
struct ArticleResult {
    stored: bool,
    published: bool,
}

/// Attributes attached to every digest message.
fn message_attributes(origin: &str, now: DateTime<Utc>) -> BTreeMap<String, String> {
    BTreeMap::from([
        ("origin".to_string(), origin.to_string()),
        ("date".to_string(), now.format("%a %b %d %Y").to_string()),
    ])
}

/// Run the latest news search.
///
/// `origin` names the caller and is attached to the published messages.
pub async fn run_latest_news<S: ObjectStore>(
    config: &NewsConfig,
    source: &dyn NewsSource,
    db: &DocumentStore<S>,
    publisher: &dyn Publisher,
    origin: &str,
    now: DateTime<Utc>,
) -> Result<NewsSummary> {
    let query = NewsQuery::for_window(config, now.date_naive())?;
    log::info!("Searching news for '{}' since {}", query.q, query.from);

    let response = source.everything(&query).await?;
    let mut summary = NewsSummary {
        found: response.total_results,
        ..NewsSummary::default()
    };

    if response.total_results == 0 || response.articles.is_empty() {
        log::info!("No articles found");
        return Ok(summary);
    }

    let attributes = message_attributes(origin, now);
    let results: Vec<ArticleResult> = stream::iter(response.articles)
        .map(|article| process_article(config, db, publisher, &attributes, article))
        .buffer_unordered(config.max_concurrent.max(1))
        .collect()
        .await;

    for result in results {
        summary.stored += usize::from(result.stored);
        summary.published += usize::from(result.published);
        summary.failed += usize::from(!result.published);
    }

    log::info!(
        "Latest news: {} found, {} stored, {} published, {} failed",
        summary.found,
        summary.stored,
        summary.published,
        summary.failed
    );
    Ok(summary)
}

/// Store and announce one article. Failures are logged, not propagated.
async fn process_article<S: ObjectStore>(
    config: &NewsConfig,
    db: &DocumentStore<S>,
    publisher: &dyn Publisher,
    attributes: &BTreeMap<String, String>,
    raw: NewsApiArticle,
) -> ArticleResult {
    let mut result = ArticleResult::default();
    let url = raw.url.clone();

    let article = match NewsArticle::try_from(raw) {
        Ok(article) => article,
        Err(e) => {
            log::warn!("Skipping article {}: {}", url, e);
            return result;
        }
    };

    let id = match db.add(&config.collection, &article).await {
        Ok(id) => id,
        Err(e) => {
            log::warn!("Failed to store article {}: {}", url, e);
            return result;
        }
    };
    result.stored = true;

    let message = match PubSubMessage::json(&NewsDigest::new(&id, &article), attributes.clone()) {
        Ok(message) => message,
        Err(e) => {
            log::warn!("Failed to encode digest of {}: {}", id, e);
            return result;
        }
    };

    match publisher.publish(&config.topic, &message).await {
        Ok(message_id) => {
            log::debug!("Article {} announced as message {}", id, message_id);
            result.published = true;
        }
        Err(e) => log::warn!("Failed to publish article {}: {}", id, e),
    }

    result
}
