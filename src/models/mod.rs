// src/models/mod.rs

//! Domain models for the site functions.
//!
//! This module contains all data structures exchanged with the external
//! services, organized by their primary purpose.

mod comment;
mod config;
mod document;
mod message;
mod news;
mod record;
mod richtext;

// Re-export all public types
pub use comment::{NewComment, PostCommentData};
pub use config::{
    BackupConfig, Config, ContentConfig, EmailConfig, HttpConfig, NewsConfig, PubSubConfig,
    SearchConfig, StorageConfig, require,
};
pub use document::{
    BlogPost, BlogPostData, CmsDocument, ContentBlock, Dimensions, DocumentKind, DocumentMeta,
    ImageContent, ImageRef, Recipe, RecipeData, SourceDocument, TextContent,
};
pub use message::{PubSubMessage, PushEnvelope};
pub use news::{NewsApiArticle, NewsApiResponse, NewsArticle, NewsDigest, NewsSourceRef};
pub use record::{BlogPostRecord, RecipeRecord, SearchRecord};
pub use richtext::{RichText, RichTextBlock};
