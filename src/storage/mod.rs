//! Storage abstractions for documents and backups.
//!
//! Everything is persisted as objects under string keys. The document
//! database is a thin layer that stores one JSON object per document:
//!
//! ```text
//! {prefix}/
//! ├── comments/
//! │   ├── 0b6c…e1.json
//! │   └── 9f2a…07.json
//! └── news_articles/
//!     └── 41d3…c8.json
//! ```
//!
//! Backups go to a separate object store under `backups/`.

pub mod local;
#[cfg(feature = "s3")]
pub mod s3;

use std::collections::{BTreeMap, BTreeSet};

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

use crate::error::Result;

// Re-export for convenience
pub use local::LocalStore;

/// Per-object write options.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PutOptions {
    pub content_type: Option<String>,
    pub cache_control: Option<String>,
    /// `Content-Encoding` of the stored bytes (e.g. `gzip`)
    pub content_encoding: Option<String>,
    /// User metadata stored alongside the object
    pub metadata: BTreeMap<String, String>,
}

impl PutOptions {
    /// Options for a plain JSON object.
    pub fn json() -> Self {
        Self {
            content_type: Some("application/json".to_string()),
            ..Self::default()
        }
    }
}

/// Trait for object storage backends.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Write `bytes` under `key`, returning a human-readable location.
    async fn put_bytes(&self, key: &str, bytes: Vec<u8>, options: &PutOptions) -> Result<String>;

    /// Read the object at `key`, or `None` if it does not exist.
    async fn read_bytes_optional(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// List all keys starting with `prefix`, sorted.
    async fn list_keys(&self, prefix: &str) -> Result<Vec<String>>;
}

/// Collection/document JSON database on top of an object store.
pub struct DocumentStore<S> {
    objects: S,
    prefix: String,
}

impl<S: ObjectStore> DocumentStore<S> {
    pub fn new(objects: S, prefix: impl Into<String>) -> Self {
        Self {
            objects,
            prefix: prefix.into().trim_matches('/').to_string(),
        }
    }

    /// Key prefix of `collection` (with trailing slash).
    fn collection_prefix(&self, collection: &str) -> String {
        if self.prefix.is_empty() {
            format!("{collection}/")
        } else {
            format!("{}/{}/", self.prefix, collection)
        }
    }

    fn root_prefix(&self) -> String {
        if self.prefix.is_empty() {
            String::new()
        } else {
            format!("{}/", self.prefix)
        }
    }

    /// Insert `document` into `collection` under a fresh id.
    pub async fn add<T: Serialize + Sync>(&self, collection: &str, document: &T) -> Result<String> {
        let id = Uuid::new_v4().simple().to_string();
        let key = format!("{}{}.json", self.collection_prefix(collection), id);
        let bytes = serde_json::to_vec(document)?;
        let options = PutOptions::json();

        self.objects.put_bytes(&key, bytes, &options).await?;
        log::debug!("Added document {} to {}", id, collection);
        Ok(id)
    }

    /// Ids of all collections holding at least one document.
    pub async fn list_collections(&self) -> Result<Vec<String>> {
        let root = self.root_prefix();
        let keys = self.objects.list_keys(&root).await?;

        let collections: BTreeSet<String> = keys
            .iter()
            .filter_map(|key| key.strip_prefix(root.as_str()))
            .filter_map(|rest| rest.split_once('/'))
            .filter(|(_, file)| file.ends_with(".json") && !file.contains('/'))
            .map(|(collection, _)| collection.to_string())
            .collect();

        Ok(collections.into_iter().collect())
    }

    /// All documents of `collection`, keyed by id.
    pub async fn get_collection(&self, collection: &str) -> Result<BTreeMap<String, Value>> {
        let prefix = self.collection_prefix(collection);
        let mut documents = BTreeMap::new();

        for key in self.objects.list_keys(&prefix).await? {
            let Some(id) = key
                .strip_prefix(prefix.as_str())
                .and_then(|file| file.strip_suffix(".json"))
                .filter(|id| !id.contains('/'))
            else {
                continue;
            };

            if let Some(bytes) = self.objects.read_bytes_optional(&key).await? {
                documents.insert(id.to_string(), serde_json::from_slice(&bytes)?);
            }
        }

        Ok(documents)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use tempfile::TempDir;

    use super::*;

    fn store(dir: &TempDir, prefix: &str) -> DocumentStore<LocalStore> {
        DocumentStore::new(LocalStore::new(dir.path()), prefix)
    }

    #[tokio::test]
    async fn test_add_and_read_back() {
        let dir = TempDir::new().unwrap();
        let db = store(&dir, "firestore");

        let id = db.add("comments", &json!({"text": "Yum"})).await.unwrap();
        let comments = db.get_collection("comments").await.unwrap();

        assert_eq!(comments.len(), 1);
        assert_eq!(comments[&id]["text"], "Yum");
        let path = dir.path().join(format!("firestore/comments/{id}.json"));
        assert!(path.exists());
    }

    #[tokio::test]
    async fn test_ids_are_unique() {
        let dir = TempDir::new().unwrap();
        let db = store(&dir, "");

        let first = db.add("comments", &json!({})).await.unwrap();
        let second = db.add("comments", &json!({})).await.unwrap();
        assert_ne!(first, second);
        assert_eq!(db.get_collection("comments").await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_list_collections() {
        let dir = TempDir::new().unwrap();
        let db = store(&dir, "/db/");

        db.add("news_articles", &json!({"title": "a"})).await.unwrap();
        db.add("comments", &json!({"text": "b"})).await.unwrap();
        db.add("comments", &json!({"text": "c"})).await.unwrap();

        assert_eq!(
            db.list_collections().await.unwrap(),
            vec!["comments".to_string(), "news_articles".to_string()]
        );
    }

    #[tokio::test]
    async fn test_empty_database() {
        let dir = TempDir::new().unwrap();
        let db = store(&dir, "firestore");
        assert!(db.list_collections().await.unwrap().is_empty());
        assert!(db.get_collection("comments").await.unwrap().is_empty());
    }
}
