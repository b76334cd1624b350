//! Application configuration structures.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::models::DocumentKind;

/// Longest news search window, in days.
pub const MAX_LOOKBACK_DAYS: i64 = 365;

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Shared HTTP client settings
    #[serde(default)]
    pub http: HttpConfig,

    /// Content API and webhook settings
    #[serde(default)]
    pub content: ContentConfig,

    /// Search index settings
    #[serde(default)]
    pub search: SearchConfig,

    /// News search settings
    #[serde(default)]
    pub news: NewsConfig,

    /// Transactional email settings
    #[serde(default)]
    pub email: EmailConfig,

    /// Pub/sub relay settings
    #[serde(default)]
    pub pubsub: PubSubConfig,

    /// Document database settings
    #[serde(default)]
    pub storage: StorageConfig,

    /// Database backup settings
    #[serde(default)]
    pub backup: BackupConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse configuration from TOML text.
    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Apply overrides from process environment variables.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Apply overrides from an arbitrary key lookup.
    ///
    /// Secrets are expected to arrive this way rather than through the file.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let set = |target: &mut String, key: &str| {
            if let Some(value) = lookup(key) {
                *target = value;
            }
        };

        set(&mut self.content.endpoint, "PRISMIC_API_ENDPOINT");
        set(&mut self.content.access_token, "PRISMIC_ACCESS_TOKEN");
        set(&mut self.content.webhook_secret, "PRISMIC_WEBHOOK_SECRET");
        set(&mut self.search.app_id, "ALGOLIA_APP_ID");
        set(&mut self.search.api_key, "ALGOLIA_API_KEY");
        set(&mut self.news.api_key, "NEWSAPI_KEY");
        set(&mut self.email.api_key, "SENDGRID_API_KEY");
        set(&mut self.pubsub.endpoint, "PUBSUB_ENDPOINT");
        set(&mut self.pubsub.token, "PUBSUB_TOKEN");
        set(&mut self.storage.bucket, "STORAGE_BUCKET");
        set(&mut self.storage.prefix, "STORAGE_PREFIX");
        set(&mut self.backup.bucket, "BACKUP_BUCKET");

        if let Some(timeout) = lookup("HTTP_TIMEOUT_SECS") {
            match timeout.parse() {
                Ok(secs) => self.http.timeout_secs = secs,
                Err(_) => log::warn!("Ignoring invalid HTTP_TIMEOUT_SECS '{}'", timeout),
            }
        }
    }

    /// Validate configuration values for basic sanity.
    ///
    /// Secrets are not checked here; each client checks the ones it needs.
    pub fn validate(&self) -> Result<()> {
        if self.http.user_agent.trim().is_empty() {
            return Err(AppError::validation("http.user_agent is empty"));
        }
        if self.http.timeout_secs == 0 {
            return Err(AppError::validation("http.timeout_secs must be > 0"));
        }
        for (name, endpoint) in [
            ("content.endpoint", &self.content.endpoint),
            ("news.endpoint", &self.news.endpoint),
            ("email.endpoint", &self.email.endpoint),
        ] {
            url::Url::parse(endpoint)
                .map_err(|e| AppError::validation(format!("{name} '{endpoint}' is invalid: {e}")))?;
        }
        if self.search.recipes_index.is_empty() || self.search.blog_posts_index.is_empty() {
            return Err(AppError::validation("search index names must not be empty"));
        }
        if self.news.query.trim().is_empty() {
            return Err(AppError::validation("news.query is empty"));
        }
        if !(0..=MAX_LOOKBACK_DAYS).contains(&self.news.lookback_days) {
            return Err(AppError::validation(format!(
                "news.lookback_days must be between 0 and {MAX_LOOKBACK_DAYS}"
            )));
        }
        if self.news.max_concurrent == 0 {
            return Err(AppError::validation("news.max_concurrent must be > 0"));
        }
        if self.news.collection.is_empty() || self.storage.comments_collection.is_empty() {
            return Err(AppError::validation("collection names must not be empty"));
        }
        if self.news.topic.is_empty() {
            return Err(AppError::validation("news.topic is empty"));
        }
        Ok(())
    }
}

/// Return `value` or a configuration error naming the missing key.
pub fn require<'a>(value: &'a str, key: &str) -> Result<&'a str> {
    if value.trim().is_empty() {
        Err(AppError::config(format!("{key} is not set")))
    } else {
        Ok(value)
    }
}

/// HTTP client settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
        }
    }
}

/// Content API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentConfig {
    /// API v2 root (e.g. `https://{repo}.cdn.prismic.io/api/v2`)
    #[serde(default = "defaults::content_endpoint")]
    pub endpoint: String,

    /// Locale requested when fetching published documents
    #[serde(default = "defaults::content_lang")]
    pub lang: String,

    /// Access token for private repositories (empty for public ones)
    #[serde(default)]
    pub access_token: String,

    /// Shared secret the CMS sends with every webhook call
    #[serde(default)]
    pub webhook_secret: String,
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            endpoint: defaults::content_endpoint(),
            lang: defaults::content_lang(),
            access_token: String::new(),
            webhook_secret: String::new(),
        }
    }
}

/// Search index settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    #[serde(default)]
    pub app_id: String,

    /// Write-capable API key
    #[serde(default)]
    pub api_key: String,

    #[serde(default = "defaults::recipes_index")]
    pub recipes_index: String,

    #[serde(default = "defaults::blog_posts_index")]
    pub blog_posts_index: String,
}

impl SearchConfig {
    /// Name of the index holding documents of `kind`.
    pub fn index_for(&self, kind: DocumentKind) -> &str {
        match kind {
            DocumentKind::Recipe => &self.recipes_index,
            DocumentKind::BlogPost => &self.blog_posts_index,
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            app_id: String::new(),
            api_key: String::new(),
            recipes_index: defaults::recipes_index(),
            blog_posts_index: defaults::blog_posts_index(),
        }
    }
}

/// News search settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewsConfig {
    #[serde(default = "defaults::news_endpoint")]
    pub endpoint: String,

    #[serde(default)]
    pub api_key: String,

    /// Search expression
    #[serde(default = "defaults::news_query")]
    pub query: String,

    #[serde(default = "defaults::news_language")]
    pub language: String,

    #[serde(default = "defaults::news_sort_by")]
    pub sort_by: String,

    /// How many days back the search window starts
    #[serde(default = "defaults::lookback_days")]
    pub lookback_days: i64,

    /// Collection receiving stored articles
    #[serde(default = "defaults::news_collection")]
    pub collection: String,

    /// Topic receiving article digests
    #[serde(default = "defaults::news_topic")]
    pub topic: String,

    /// Articles stored and published concurrently
    #[serde(default = "defaults::max_concurrent")]
    pub max_concurrent: usize,
}

impl Default for NewsConfig {
    fn default() -> Self {
        Self {
            endpoint: defaults::news_endpoint(),
            api_key: String::new(),
            query: defaults::news_query(),
            language: defaults::news_language(),
            sort_by: defaults::news_sort_by(),
            lookback_days: defaults::lookback_days(),
            collection: defaults::news_collection(),
            topic: defaults::news_topic(),
            max_concurrent: defaults::max_concurrent(),
        }
    }
}

/// Transactional email settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailConfig {
    #[serde(default = "defaults::email_endpoint")]
    pub endpoint: String,

    #[serde(default)]
    pub api_key: String,

    /// Recipient of news digests
    #[serde(default = "defaults::email_to")]
    pub to: String,

    /// Verified sender address
    #[serde(default)]
    pub from: String,

    /// Dynamic template rendering the digest
    #[serde(default)]
    pub template_id: String,
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            endpoint: defaults::email_endpoint(),
            api_key: String::new(),
            to: defaults::email_to(),
            from: String::new(),
            template_id: String::new(),
        }
    }
}

/// Pub/sub relay settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PubSubConfig {
    /// REST root; topics are published at `{endpoint}/topics/{topic}:publish`
    #[serde(default)]
    pub endpoint: String,

    /// Bearer token (optional)
    #[serde(default)]
    pub token: String,
}

/// Document database settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// S3 bucket holding the documents (Lambda only)
    #[serde(default)]
    pub bucket: String,

    /// Key prefix of all collections
    #[serde(default = "defaults::storage_prefix")]
    pub prefix: String,

    #[serde(default = "defaults::comments_collection")]
    pub comments_collection: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            bucket: String::new(),
            prefix: defaults::storage_prefix(),
            comments_collection: defaults::comments_collection(),
        }
    }
}

/// Database backup settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackupConfig {
    /// S3 bucket receiving backups (Lambda only; defaults to the storage bucket)
    #[serde(default)]
    pub bucket: String,

    #[serde(default = "defaults::backup_prefix")]
    pub prefix: String,

    #[serde(default = "defaults::cache_control")]
    pub cache_control: String,

    /// Gzip the export and store it with `Content-Encoding: gzip`
    #[serde(default = "defaults::gzip")]
    pub gzip: bool,
}

impl Default for BackupConfig {
    fn default() -> Self {
        Self {
            bucket: String::new(),
            prefix: defaults::backup_prefix(),
            cache_control: defaults::cache_control(),
            gzip: defaults::gzip(),
        }
    }
}

mod defaults {
    // HTTP defaults
    pub fn user_agent() -> String {
        "Mozilla/5.0 (compatible; allsect-functions/0.1)".into()
    }
    pub fn timeout() -> u64 {
        30
    }

    // Content defaults
    pub fn content_endpoint() -> String {
        "https://allsect.cdn.prismic.io/api/v2".into()
    }
    pub fn content_lang() -> String {
        "en-au".into()
    }

    // Search defaults
    pub fn recipes_index() -> String {
        "Recipes".into()
    }
    pub fn blog_posts_index() -> String {
        "BlogPosts".into()
    }

    // News defaults
    pub fn news_endpoint() -> String {
        "https://newsapi.org".into()
    }
    pub fn news_query() -> String {
        r#"entomophagy OR "edible insects""#.into()
    }
    pub fn news_language() -> String {
        "en".into()
    }
    pub fn news_sort_by() -> String {
        "relevancy".into()
    }
    pub fn lookback_days() -> i64 {
        3
    }
    pub fn news_collection() -> String {
        "news_articles".into()
    }
    pub fn news_topic() -> String {
        "email-latest-news".into()
    }
    pub fn max_concurrent() -> usize {
        4
    }

    // Email defaults
    pub fn email_endpoint() -> String {
        "https://api.sendgrid.com".into()
    }
    pub fn email_to() -> String {
        "info@allsect.com".into()
    }

    // Storage defaults
    pub fn storage_prefix() -> String {
        "firestore".into()
    }
    pub fn comments_collection() -> String {
        "comments".into()
    }

    // Backup defaults
    pub fn backup_prefix() -> String {
        "backups".into()
    }
    pub fn cache_control() -> String {
        "public, max-age=31536000".into()
    }

    pub fn gzip() -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    #[test]
    fn validate_default_config_ok() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn validate_rejects_empty_user_agent() {
        let mut config = Config::default();
        config.http.user_agent = "  ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_zero_concurrency() {
        let mut config = Config::default();
        config.news.max_concurrent = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_bounds_lookback_days() {
        let mut config = Config::default();
        config.news.lookback_days = MAX_LOOKBACK_DAYS;
        assert!(config.validate().is_ok());

        config.news.lookback_days = i64::MAX / 2;
        assert!(config.validate().is_err());

        config.news.lookback_days = -1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_bad_endpoint() {
        let mut config = Config::default();
        config.content.endpoint = "not a url".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config = Config::from_toml(
            r#"
            [search]
            recipes_index = "Recipes_staging"

            [news]
            lookback_days = 7
            "#,
        )
        .unwrap();
        assert_eq!(config.search.recipes_index, "Recipes_staging");
        assert_eq!(config.search.blog_posts_index, "BlogPosts");
        assert_eq!(config.news.lookback_days, 7);
        assert_eq!(config.news.topic, "email-latest-news");
        assert_eq!(config.backup.cache_control, "public, max-age=31536000");
        assert!(config.backup.gzip);
    }

    #[test]
    fn overrides_fill_secrets() {
        let env: HashMap<&str, &str> = [
            ("PRISMIC_WEBHOOK_SECRET", "s3cret"),
            ("ALGOLIA_APP_ID", "APP"),
            ("HTTP_TIMEOUT_SECS", "5"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config.apply_overrides(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.content.webhook_secret, "s3cret");
        assert_eq!(config.search.app_id, "APP");
        assert_eq!(config.http.timeout_secs, 5);
        assert!(config.search.api_key.is_empty());
    }

    #[test]
    fn index_for_kind() {
        let search = SearchConfig::default();
        assert_eq!(search.index_for(DocumentKind::Recipe), "Recipes");
        assert_eq!(search.index_for(DocumentKind::BlogPost), "BlogPosts");
    }

    #[test]
    fn require_rejects_blank() {
        assert!(require("", "search.api_key").is_err());
        assert_eq!(require("key", "search.api_key").unwrap(), "key");
    }
}
