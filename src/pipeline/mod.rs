//! Handler entry points.
//!
//! - `handle_webhook`: Index the newest published CMS document
//! - `run_latest_news`: Store recent news articles and announce them
//! - `send_latest_news_email`: Mail an announced article
//! - `post_comment`: Store a website comment
//! - `backup_database`: Export all collections

pub mod backup;
pub mod comment;
pub mod email;
pub mod index;
pub mod news;
pub mod webhook;

pub use backup::{BackupSummary, backup_database};
pub use comment::post_comment;
pub use email::send_latest_news_email;
pub use index::{DocumentIndexer, FlattenedContent};
pub use news::{NewsSummary, run_latest_news};
pub use webhook::{WebhookOutcome, WebhookPayload, handle_webhook};
