// src/pipeline/backup.rs

//! Full export of the document database.

use std::collections::BTreeMap;
use std::io::Write;

use chrono::{DateTime, Utc};
use flate2::Compression;
use flate2::write::GzEncoder;
use serde::Serialize;
use serde_json::Value;
use sha2::{Digest, Sha256};

use crate::error::Result;
use crate::models::BackupConfig;
use crate::storage::{DocumentStore, ObjectStore, PutOptions};

/// Result of a backup run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BackupSummary {
    pub collections: usize,
    pub documents: usize,
    /// Size of the JSON export before compression
    pub bytes: usize,
    /// Size of the stored object
    pub stored_bytes: usize,
    pub location: String,
}

/// Object key of the backup taken at `now`.
pub fn backup_key(prefix: &str, now: DateTime<Utc>) -> String {
    let file_name = format!("backup_{}.txt", now.format("%Y%m%dT%H%M%S"));
    let prefix = prefix.trim_matches('/');
    if prefix.is_empty() {
        file_name
    } else {
        format!("{prefix}/{file_name}")
    }
}

/// Gzip `bytes` in memory.
fn gzip(bytes: &[u8]) -> Result<Vec<u8>> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(bytes)?;
    Ok(encoder.finish()?)
}

/// Export every collection as one JSON object `{collection: {id: document}}`.
///
/// The `sha256` metadata entry is the digest of the uncompressed export.
pub async fn backup_database<S: ObjectStore>(
    db: &DocumentStore<S>,
    sink: &dyn ObjectStore,
    config: &BackupConfig,
    now: DateTime<Utc>,
) -> Result<BackupSummary> {
    let mut export: BTreeMap<String, BTreeMap<String, Value>> = BTreeMap::new();
    let mut documents = 0;

    for collection in db.list_collections().await? {
        let docs = db.get_collection(&collection).await?;
        log::debug!("Collection {}: {} documents", collection, docs.len());
        documents += docs.len();
        export.insert(collection, docs);
    }

    let json = serde_json::to_vec(&export)?;
    let size = json.len();
    let digest = hex::encode(Sha256::digest(&json));

    let (body, content_encoding) = if config.gzip {
        (gzip(&json)?, Some("gzip".to_string()))
    } else {
        (json, None)
    };
    let stored_bytes = body.len();

    let options = PutOptions {
        content_type: Some("application/json".to_string()),
        cache_control: Some(config.cache_control.clone()),
        content_encoding,
        metadata: BTreeMap::from([("sha256".to_string(), digest)]),
    };
    let location = sink
        .put_bytes(&backup_key(&config.prefix, now), body, &options)
        .await?;

    log::info!(
        "Backed up {} documents in {} collections to {} ({} of {} bytes)",
        documents,
        export.len(),
        location,
        stored_bytes,
        size
    );

    Ok(BackupSummary {
        collections: export.len(),
        documents,
        bytes: size,
        stored_bytes,
        location,
    })
}
