// src/config.rs

//! Configuration loading utilities.
//!
//! The CLI reads `config.toml` from its storage directory; the Lambda
//! runtime reads it from S3. Environment overrides apply in both cases.

use std::path::Path;

use crate::error::Result;
use crate::models::Config;

#[cfg(feature = "s3")]
pub use lambda_loader::LambdaConfigLoader;

/// Load configuration from a TOML file and apply environment overrides.
///
/// Falls back to defaults if the file cannot be loaded.
pub fn load_config(path: &Path) -> Result<Config> {
    let mut config = Config::load_or_default(path);
    config.apply_env_overrides();
    config.validate()?;
    Ok(config)
}

#[cfg(feature = "s3")]
mod lambda_loader {
    use tracing::{info, warn};

    use crate::error::{AppError, Result};
    use crate::models::Config;
    use crate::storage::ObjectStore;
    use crate::storage::s3::S3Store;

    /// Config loader for Lambda environment.
    pub struct LambdaConfigLoader {
        storage: S3Store,
        key: String,
    }

    impl LambdaConfigLoader {
        pub fn new(storage: S3Store, key: impl Into<String>) -> Self {
            Self {
                storage,
                key: key.into(),
            }
        }

        /// Loader for `CONFIG_S3_BUCKET` / `CONFIG_S3_KEY`, if the bucket is set.
        pub async fn from_env() -> Result<Option<Self>> {
            let Ok(bucket) = std::env::var("CONFIG_S3_BUCKET") else {
                return Ok(None);
            };
            let key = std::env::var("CONFIG_S3_KEY").unwrap_or_else(|_| "config.toml".to_string());
            let storage = S3Store::from_env(bucket).await?;
            Ok(Some(Self::new(storage, key)))
        }

        /// Load the config file; a missing object yields defaults.
        pub async fn load_config(&self) -> Result<Config> {
            info!(
                "Loading config file from s3://{}/{}",
                self.storage.bucket(),
                self.key
            );
            let Some(bytes) = self.storage.read_bytes_optional(&self.key).await? else {
                warn!("Config file {} not found in S3, using defaults", self.key);
                return Ok(Config::default());
            };

            let s = String::from_utf8(bytes).map_err(|e| {
                AppError::Config(format!("Config file {} is not UTF-8: {e}", self.key))
            })?;
            Config::from_toml(&s)
        }
    }

    /// Load Lambda configuration: S3 file (when configured), then env overrides.
    pub async fn load_lambda_config() -> Result<Config> {
        let mut config = match LambdaConfigLoader::from_env().await? {
            Some(loader) => loader.load_config().await?,
            None => Config::default(),
        };
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }
}

#[cfg(feature = "s3")]
pub use lambda_loader::load_lambda_config;

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn test_load_config_from_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[news]\nlookback_days = 7\n").unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.news.lookback_days, 7);
        assert_eq!(config.news.collection, "news_articles");
    }

    #[test]
    fn test_load_config_falls_back_to_defaults() {
        let dir = TempDir::new().unwrap();
        let config = load_config(&dir.path().join("missing.toml")).unwrap();
        assert_eq!(config.search.recipes_index, "Recipes");
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[news]\nmax_concurrent = 0\n").unwrap();

        assert!(load_config(&path).is_err());
    }
}
