//! Local filesystem storage implementation.
//!
//! Keys map to paths below a root directory; `/` in a key becomes a
//! directory separator. Used by the CLI and by tests. Production
//! deployments use `S3Store`.
//!
//! ## Storage Layout
//!
//! ```text
//! {root}/
//! ├── config.toml           # Optional configuration
//! ├── firestore/            # Document database
//! │   └── {collection}/{id}.json
//! └── backups/
//!     └── backup_YYYYMMDDTHHMMSS.txt
//! ```

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;

use crate::error::{AppError, Result};
use crate::storage::{ObjectStore, PutOptions};

/// Suffix of in-flight writes; never listed.
const TMP_SUFFIX: &str = ".tmp";

/// Local filesystem storage backend.
#[derive(Debug, Clone)]
pub struct LocalStore {
    root_dir: PathBuf,
}

impl LocalStore {
    /// Create a new LocalStore rooted at the given directory.
    pub fn new(root_dir: impl Into<PathBuf>) -> Self {
        Self {
            root_dir: root_dir.into(),
        }
    }

    pub fn root_dir(&self) -> &Path {
        &self.root_dir
    }

    /// Get the full path for a key, rejecting keys that escape the root.
    fn path(&self, key: &str) -> Result<PathBuf> {
        let mut path = self.root_dir.clone();
        for part in key.split('/').filter(|part| !part.is_empty()) {
            if part == "." || part == ".." {
                return Err(AppError::validation(format!("invalid storage key '{key}'")));
            }
            path.push(part);
        }
        Ok(path)
    }

    /// Ensure parent directory exists.
    async fn ensure_dir(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        Ok(())
    }

    /// Collect every file below `dir` as a `/`-separated key.
    async fn walk(&self, dir: PathBuf) -> Result<Vec<String>> {
        let mut keys = Vec::new();
        let mut pending = vec![dir];

        while let Some(dir) = pending.pop() {
            let mut entries = match tokio::fs::read_dir(&dir).await {
                Ok(entries) => entries,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
                Err(e) => return Err(AppError::Io(e)),
            };

            while let Some(entry) = entries.next_entry().await? {
                let path = entry.path();
                if entry.file_type().await?.is_dir() {
                    pending.push(path);
                    continue;
                }

                let Ok(relative) = path.strip_prefix(&self.root_dir) else {
                    continue;
                };
                let key = relative
                    .components()
                    .map(|c| c.as_os_str().to_string_lossy())
                    .collect::<Vec<_>>()
                    .join("/");
                if !key.ends_with(TMP_SUFFIX) {
                    keys.push(key);
                }
            }
        }

        Ok(keys)
    }
}

#[async_trait]
impl ObjectStore for LocalStore {
    /// Write bytes atomically (write to temp, then rename).
    async fn put_bytes(&self, key: &str, bytes: Vec<u8>, _options: &PutOptions) -> Result<String> {
        let path = self.path(key)?;
        self.ensure_dir(&path).await?;

        let mut tmp = path.clone().into_os_string();
        tmp.push(TMP_SUFFIX);
        let tmp = PathBuf::from(tmp);

        let mut file = tokio::fs::File::create(&tmp).await?;
        file.write_all(&bytes).await?;
        file.flush().await?;
        drop(file);

        tokio::fs::rename(&tmp, &path).await?;
        Ok(path.display().to_string())
    }

    /// Read bytes, returning None if file doesn't exist.
    async fn read_bytes_optional(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let path = self.path(key)?;
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AppError::Io(e)),
        }
    }

    async fn list_keys(&self, prefix: &str) -> Result<Vec<String>> {
        // Only walk the directory part of the prefix.
        let dir_part = prefix.rsplit_once('/').map(|(dir, _)| dir).unwrap_or("");
        let start = self.path(dir_part)?;

        let mut keys: Vec<String> = self
            .walk(start)
            .await?
            .into_iter()
            .filter(|key| key.starts_with(prefix))
            .collect();
        keys.sort();
        Ok(keys)
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[tokio::test]
    async fn test_put_and_read() {
        let dir = TempDir::new().unwrap();
        let store = LocalStore::new(dir.path());

        let location = store
            .put_bytes("a/b/c.json", b"{}".to_vec(), &PutOptions::json())
            .await
            .unwrap();
        assert!(location.ends_with("c.json"));

        let bytes = store.read_bytes_optional("a/b/c.json").await.unwrap();
        assert_eq!(bytes.as_deref(), Some(&b"{}"[..]));
        assert!(!dir.path().join("a/b/c.json.tmp").exists());
    }

    #[tokio::test]
    async fn test_read_missing() {
        let dir = TempDir::new().unwrap();
        let store = LocalStore::new(dir.path());
        let missing = store.read_bytes_optional("missing.json").await.unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn test_overwrite() {
        let dir = TempDir::new().unwrap();
        let store = LocalStore::new(dir.path());
        let options = PutOptions::default();

        store.put_bytes("k", b"one".to_vec(), &options).await.unwrap();
        store.put_bytes("k", b"two".to_vec(), &options).await.unwrap();
        let bytes = store.read_bytes_optional("k").await.unwrap();
        assert_eq!(bytes.as_deref(), Some(&b"two"[..]));
    }

    #[tokio::test]
    async fn test_list_keys() {
        let dir = TempDir::new().unwrap();
        let store = LocalStore::new(dir.path());
        let options = PutOptions::default();

        for key in [
            "db/comments/2.json",
            "db/comments/1.json",
            "db/news/1.json",
            "other.json",
        ] {
            store.put_bytes(key, Vec::new(), &options).await.unwrap();
        }

        assert_eq!(
            store.list_keys("db/comments/").await.unwrap(),
            vec!["db/comments/1.json", "db/comments/2.json"]
        );
        assert_eq!(store.list_keys("db/").await.unwrap().len(), 3);
        assert_eq!(store.list_keys("").await.unwrap().len(), 4);
        assert!(store.list_keys("nothing/").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_rejects_escaping_keys() {
        let dir = TempDir::new().unwrap();
        let store = LocalStore::new(dir.path());
        assert!(store.read_bytes_optional("../etc/passwd").await.is_err());
    }
}
