//! Search record generation for published CMS documents.
//!
//! Flattens a structured recipe or blog post into the flat record the
//! search index stores:
//!
//! > rich text fields are rendered to plain text, body slices are
//! > concatenated into a single `text` field, and the locale is reduced to
//! > a coarse language code.
//!
//! Everything here is pure; the only state is the webhook secret injected
//! at construction.

use crate::error::Result;
use crate::models::{
    BlogPost, BlogPostRecord, CmsDocument, ContentBlock, ContentConfig, ImageRef, Recipe,
    RecipeRecord, SearchRecord, SourceDocument, require,
};

/// Text and images extracted from a document body.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlattenedContent {
    /// Plain text of all text and quote slices, space separated
    pub text: String,
    /// Images of all image slices, in body order. Not part of the record.
    pub images: Vec<ImageRef>,
}

/// Turns webhook-delivered documents into search records.
#[derive(Debug, Clone)]
pub struct DocumentIndexer {
    webhook_secret: String,
}

impl DocumentIndexer {
    /// Create an indexer accepting webhook calls signed with `webhook_secret`.
    pub fn new(webhook_secret: impl Into<String>) -> Self {
        Self {
            webhook_secret: webhook_secret.into(),
        }
    }

    /// Create an indexer from configuration; the secret must be set.
    pub fn from_config(config: &ContentConfig) -> Result<Self> {
        let secret = require(&config.webhook_secret, "content.webhook_secret")?;
        Ok(Self::new(secret))
    }

    /// Exact comparison of the secret sent by the CMS.
    pub fn verify_webhook_secret(&self, received: &str) -> bool {
        received == self.webhook_secret
    }

    /// Build the record for a raw API document.
    ///
    /// Fails with `UnknownDocumentKind` when the document is neither a
    /// recipe nor a blog post.
    pub fn index_document(&self, doc: CmsDocument) -> Result<SearchRecord> {
        let source = SourceDocument::try_from(doc)?;
        Ok(build_search_record(&source))
    }
}

/// Reduce a locale tag to the language codes the index filters on.
pub fn normalize_language(tag: &str) -> &'static str {
    match tag {
        "en-au" | "en-us" => "en",
        "de-de" => "de",
        _ => "en",
    }
}

/// Collect body text and images in body order.
///
/// Slices of other types, and slices missing their content, contribute
/// nothing.
pub fn flatten_body(blocks: &[ContentBlock]) -> FlattenedContent {
    let mut texts = Vec::new();
    let mut images = Vec::new();

    for block in blocks {
        match block {
            ContentBlock::Text { primary } | ContentBlock::Quote { primary } => {
                if let Some(text) = &primary.text {
                    texts.push(text.as_text());
                }
            }
            ContentBlock::Image { primary } | ContentBlock::ImageWithCaption { primary } => {
                if let Some(image) = &primary.image {
                    images.push(image.clone());
                }
            }
            ContentBlock::Other => {}
        }
    }

    FlattenedContent {
        text: texts.join(" "),
        images,
    }
}

/// Build the search record of a recipe.
pub fn build_recipe_record(doc: &Recipe) -> RecipeRecord {
    let data = &doc.data;
    let FlattenedContent { text, .. } = flatten_body(&data.body);

    RecipeRecord {
        object_id: doc.meta.id.clone(),
        uid: doc.meta.uid.clone(),
        language: normalize_language(&doc.meta.language).to_string(),
        title: data.title.as_text(),
        subtitle: data.subtitle.as_text(),
        date: data.date.clone(),
        introduction: data.introduction.as_text(),
        recipe_type: data.recipe_type.clone(),
        main_ingredient: data.main_ingredient.clone(),
        ingredients: data.ingredients.as_text(),
        main_image: data.main_image.clone(),
        preparation: data.preparation.as_text(),
        text,
    }
}

/// Build the search record of a blog post.
pub fn build_blog_post_record(doc: &BlogPost) -> BlogPostRecord {
    let data = &doc.data;
    let FlattenedContent { text, .. } = flatten_body(&data.body);

    BlogPostRecord {
        object_id: doc.meta.id.clone(),
        uid: doc.meta.uid.clone(),
        language: normalize_language(&doc.meta.language).to_string(),
        title: data.title.as_text(),
        subtitle: data.subtitle.as_text(),
        date: data.date.clone(),
        tl_dr: data.tl_dr.clone(),
        tags: data.tags.clone(),
        main_image: data.main_image.clone(),
        text,
    }
}

/// Build the search record of a typed document.
pub fn build_search_record(doc: &SourceDocument) -> SearchRecord {
    match doc {
        SourceDocument::Recipe(recipe) => SearchRecord::Recipe(build_recipe_record(recipe)),
        SourceDocument::BlogPost(post) => SearchRecord::BlogPost(build_blog_post_record(post)),
    }
}
