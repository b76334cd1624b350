// src/pipeline/webhook.rs

//! Content webhook: index the newest published document.

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::models::SearchConfig;
use crate::pipeline::DocumentIndexer;
use crate::services::{ContentSource, SearchIndex};

/// Body the CMS posts on publication.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookPayload {
    #[serde(default)]
    pub master_ref: Option<String>,
    #[serde(default)]
    pub secret: String,
}

/// What a webhook call did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum WebhookOutcome {
    /// The secret did not match; nothing was fetched or indexed.
    Rejected,
    Indexed {
        #[serde(rename = "objectID")]
        object_id: String,
        index: String,
        title: String,
    },
}

/// Handle one webhook delivery.
pub async fn handle_webhook(
    indexer: &DocumentIndexer,
    content: &dyn ContentSource,
    search: &dyn SearchIndex,
    indexes: &SearchConfig,
    payload: WebhookPayload,
) -> Result<WebhookOutcome> {
    if !indexer.verify_webhook_secret(&payload.secret) {
        log::warn!("Rejected webhook call with invalid secret");
        return Ok(WebhookOutcome::Rejected);
    }

    let master_ref = payload
        .master_ref
        .filter(|r| !r.trim().is_empty())
        .ok_or_else(|| AppError::validation("webhook payload has no masterRef"))?;

    let document = content.latest_document(&master_ref).await?;
    log::info!(
        "Fetched {} document {} at ref {}",
        document.kind,
        document.id,
        master_ref
    );

    let record = indexer.index_document(document)?;
    let index = indexes.index_for(record.kind());
    search.partial_update(index, &record).await?;

    log::info!(
        "Indexed {} '{}' into {}",
        record.object_id(),
        record.title(),
        index
    );
    Ok(WebhookOutcome::Indexed {
        object_id: record.object_id().to_string(),
        index: index.to_string(),
        title: record.title().to_string(),
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use serde_json::json;

    use super::*;
    use crate::models::{CmsDocument, SearchRecord};

    struct FakeContent {
        document: CmsDocument,
        calls: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl ContentSource for FakeContent {
        async fn latest_document(&self, master_ref: &str) -> Result<CmsDocument> {
            self.calls.lock().unwrap().push(master_ref.to_string());
            Ok(self.document.clone())
        }
    }

    #[derive(Default)]
    struct FakeIndex {
        updates: Mutex<Vec<(String, SearchRecord)>>,
    }

    #[async_trait]
    impl SearchIndex for FakeIndex {
        async fn partial_update(&self, index: &str, record: &SearchRecord) -> Result<()> {
            self.updates
                .lock()
                .unwrap()
                .push((index.to_string(), record.clone()));
            Ok(())
        }
    }

    fn content(kind: &str) -> FakeContent {
        let document = serde_json::from_value(json!({
            "id": "doc-1",
            "type": kind,
            "lang": "de-de",
            "data": {"title": [{"type": "heading1", "text": "Grillen", "spans": []}]}
        }))
        .unwrap();
        FakeContent {
            document,
            calls: Mutex::new(Vec::new()),
        }
    }

    async fn run(
        indexer: &DocumentIndexer,
        content: &FakeContent,
        index: &FakeIndex,
        payload: WebhookPayload,
    ) -> Result<WebhookOutcome> {
        handle_webhook(indexer, content, index, &SearchConfig::default(), payload).await
    }

    fn payload(secret: &str) -> WebhookPayload {
        serde_json::from_value(json!({
            "masterRef": "ref-1",
            "secret": secret,
            "type": "api-update"
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn test_indexes_blog_post() {
        let indexer = DocumentIndexer::new("s3cret");
        let content = content("post");
        let index = FakeIndex::default();

        let outcome = run(&indexer, &content, &index, payload("s3cret"))
            .await
            .unwrap();

        assert_eq!(
            outcome,
            WebhookOutcome::Indexed {
                object_id: "doc-1".into(),
                index: "BlogPosts".into(),
                title: "Grillen".into(),
            }
        );
        assert_eq!(*content.calls.lock().unwrap(), vec!["ref-1"]);
        let updates = index.updates.lock().unwrap();
        assert_eq!(updates.len(), 1);
        assert_eq!(updates[0].0, "BlogPosts");
    }

    #[tokio::test]
    async fn test_rejects_bad_secret_without_fetching() {
        let indexer = DocumentIndexer::new("s3cret");
        let content = content("recipe");
        let index = FakeIndex::default();

        let outcome = run(&indexer, &content, &index, payload("S3CRET"))
            .await
            .unwrap();

        assert_eq!(outcome, WebhookOutcome::Rejected);
        assert!(content.calls.lock().unwrap().is_empty());
        assert!(index.updates.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_missing_ref() {
        let indexer = DocumentIndexer::new("s3cret");
        let payload = WebhookPayload {
            master_ref: None,
            secret: "s3cret".into(),
        };

        let err = run(&indexer, &content("recipe"), &FakeIndex::default(), payload)
            .await
            .unwrap_err();
        assert!(err.is_client_error());
    }

    #[tokio::test]
    async fn test_unknown_kind_is_not_indexed() {
        let indexer = DocumentIndexer::new("s3cret");
        let index = FakeIndex::default();

        let err = run(&indexer, &content("event"), &index, payload("s3cret"))
            .await
            .unwrap_err();

        match err {
            AppError::UnknownDocumentKind(kind) => assert_eq!(kind, "event"),
            other => panic!("unexpected error {other:?}"),
        }
        assert!(index.updates.lock().unwrap().is_empty());
    }

    #[test]
    fn test_outcome_json() {
        let outcome = WebhookOutcome::Indexed {
            object_id: "r1".into(),
            index: "Recipes".into(),
            title: "Ant Stew".into(),
        };
        let json = serde_json::to_value(outcome).unwrap();
        assert_eq!(json["outcome"], "indexed");
        assert_eq!(json["objectID"], "r1");
    }
}
