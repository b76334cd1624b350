//! CMS documents: the raw API shape and the typed recipe / blog post variants.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::error::{AppError, Result};
use crate::models::RichText;

/// A document exactly as returned by the content API search endpoint.
///
/// `data` is kept untyped until the document kind is known.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CmsDocument {
    pub id: String,

    #[serde(default)]
    pub uid: Option<String>,

    /// Custom type tag (`recipe`, `post`, ...)
    #[serde(rename = "type")]
    pub kind: String,

    /// Locale tag (e.g. `en-au`)
    pub lang: String,

    #[serde(default)]
    pub data: Value,
}

/// The document kinds that can be indexed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentKind {
    Recipe,
    BlogPost,
}

impl DocumentKind {
    /// Resolve a CMS type tag.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "recipe" => Some(Self::Recipe),
            "post" => Some(Self::BlogPost),
            _ => None,
        }
    }

    /// The CMS type tag for this kind.
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Recipe => "recipe",
            Self::BlogPost => "post",
        }
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Reference to an image asset.
///
/// Known keys are typed; captions, thumbnail variants and anything else the
/// API adds are preserved verbatim in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImageRef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alt: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub copyright: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dimensions: Option<Dimensions>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ImageRef {
    /// Image reference pointing at `url`.
    pub fn from_url(url: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            ..Self::default()
        }
    }
}

/// Pixel dimensions of an image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

/// Decode an explicit `null` the same way as an absent field.
fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// A body slice of a document.
///
/// A slice whose `primary` is missing or `null` decodes with empty content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "slice_type", rename_all = "snake_case")]
pub enum ContentBlock {
    Text {
        #[serde(default, deserialize_with = "null_as_default")]
        primary: TextContent,
    },
    Quote {
        #[serde(default, deserialize_with = "null_as_default")]
        primary: TextContent,
    },
    Image {
        #[serde(default, deserialize_with = "null_as_default")]
        primary: ImageContent,
    },
    ImageWithCaption {
        #[serde(default, deserialize_with = "null_as_default")]
        primary: ImageContent,
    },
    /// Any slice type the indexer does not read
    #[serde(other)]
    Other,
}

impl ContentBlock {
    /// Text slice holding `text`.
    pub fn text(text: RichText) -> Self {
        Self::Text {
            primary: TextContent { text: Some(text) },
        }
    }

    /// Quote slice holding `text`.
    pub fn quote(text: RichText) -> Self {
        Self::Quote {
            primary: TextContent { text: Some(text) },
        }
    }

    /// Image slice showing `image`.
    pub fn image(image: ImageRef) -> Self {
        Self::Image {
            primary: ImageContent { image: Some(image) },
        }
    }

    /// Captioned image slice showing `image`.
    pub fn image_with_caption(image: ImageRef) -> Self {
        Self::ImageWithCaption {
            primary: ImageContent { image: Some(image) },
        }
    }
}

/// Primary fields of a text or quote slice.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TextContent {
    #[serde(default)]
    pub text: Option<RichText>,
}

/// Primary fields of an image slice.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImageContent {
    #[serde(default)]
    pub image: Option<ImageRef>,
}

/// Identity shared by every document kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentMeta {
    pub id: String,
    pub uid: Option<String>,
    pub language: String,
}

/// Fields of a `recipe` document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecipeData {
    #[serde(default)]
    pub title: RichText,
    #[serde(default)]
    pub subtitle: RichText,
    /// Publication date (`YYYY-MM-DD`)
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub main_image: Option<ImageRef>,
    #[serde(default)]
    pub body: Vec<ContentBlock>,

    #[serde(default)]
    pub introduction: RichText,
    #[serde(default)]
    pub recipe_type: Option<String>,
    #[serde(default, rename = "insect_of_choice")]
    pub main_ingredient: Option<String>,
    #[serde(default)]
    pub ingredients: RichText,
    #[serde(default, rename = "prep")]
    pub preparation: RichText,
}

/// Fields of a `post` document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BlogPostData {
    #[serde(default)]
    pub title: RichText,
    #[serde(default)]
    pub subtitle: RichText,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub main_image: Option<ImageRef>,
    #[serde(default)]
    pub body: Vec<ContentBlock>,

    #[serde(default)]
    pub tl_dr: Option<String>,
    #[serde(default)]
    pub tags: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Recipe {
    pub meta: DocumentMeta,
    pub data: RecipeData,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BlogPost {
    pub meta: DocumentMeta,
    pub data: BlogPostData,
}

/// A document of a known kind.
#[derive(Debug, Clone, PartialEq)]
pub enum SourceDocument {
    Recipe(Recipe),
    BlogPost(BlogPost),
}

impl SourceDocument {
    pub fn kind(&self) -> DocumentKind {
        match self {
            Self::Recipe(_) => DocumentKind::Recipe,
            Self::BlogPost(_) => DocumentKind::BlogPost,
        }
    }

    pub fn meta(&self) -> &DocumentMeta {
        match self {
            Self::Recipe(recipe) => &recipe.meta,
            Self::BlogPost(post) => &post.meta,
        }
    }
}

impl TryFrom<CmsDocument> for SourceDocument {
    type Error = AppError;

    /// Decode the `data` payload according to the document type.
    ///
    /// Fails with `UnknownDocumentKind` for unsupported types and with a
    /// JSON error when a field (e.g. a rich text) is malformed.
    fn try_from(doc: CmsDocument) -> Result<Self> {
        let kind = DocumentKind::from_tag(&doc.kind)
            .ok_or_else(|| AppError::UnknownDocumentKind(doc.kind.clone()))?;

        let meta = DocumentMeta {
            id: doc.id,
            uid: doc.uid,
            language: doc.lang,
        };

        let data = match doc.data {
            Value::Null => Value::Object(Map::new()),
            data => data,
        };

        Ok(match kind {
            DocumentKind::Recipe => Self::Recipe(Recipe {
                meta,
                data: serde_json::from_value(data)?,
            }),
            DocumentKind::BlogPost => Self::BlogPost(BlogPost {
                meta,
                data: serde_json::from_value(data)?,
            }),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slices_decode() {
        let json = r#"[
            {"slice_type": "text", "slice_label": null, "primary": {"text": [{"type": "paragraph", "text": "A", "spans": []}]}, "items": [{}]},
            {"slice_type": "image_with_caption", "primary": {"image": {"url": "https://images.example.com/1.jpg", "alt": null, "dimensions": {"width": 800, "height": 600}}, "caption": []}},
            {"slice_type": "video", "primary": {"embed": {"html": "<iframe></iframe>"}}},
            {"slice_type": "quote"}
        ]"#;
        let blocks: Vec<ContentBlock> = serde_json::from_str(json).unwrap();

        assert_eq!(blocks.len(), 4);
        assert_eq!(blocks[0], ContentBlock::text(RichText::paragraph("A")));
        match &blocks[1] {
            ContentBlock::ImageWithCaption { primary } => {
                let image = primary.image.as_ref().unwrap();
                assert_eq!(
                    image.url.as_deref(),
                    Some("https://images.example.com/1.jpg")
                );
                assert_eq!(
                    image.dimensions,
                    Some(Dimensions {
                        width: 800,
                        height: 600
                    })
                );
            }
            other => panic!("unexpected block {other:?}"),
        }
        assert_eq!(blocks[2], ContentBlock::Other);
        assert_eq!(
            blocks[3],
            ContentBlock::Quote {
                primary: TextContent::default()
            }
        );
    }

    #[test]
    fn test_image_ref_keeps_unknown_keys() {
        let json = r#"{"url": "https://images.example.com/1.jpg", "thumbnail": {"url": "https://images.example.com/t.jpg"}}"#;
        let image: ImageRef = serde_json::from_str(json).unwrap();
        assert!(image.extra.contains_key("thumbnail"));

        let back = serde_json::to_value(&image).unwrap();
        assert_eq!(back["thumbnail"]["url"], "https://images.example.com/t.jpg");
    }

    #[test]
    fn test_try_from_recipe() {
        let doc: CmsDocument = serde_json::from_str(
            r#"{
                "id": "X1", "uid": "ant-stew", "type": "recipe", "lang": "en-au",
                "data": {
                    "title": [{"type": "heading1", "text": "Ant Stew"}],
                    "recipe_type": "main",
                    "insect_of_choice": "ants",
                    "prep": [{"type": "paragraph", "text": "Simmer."}]
                }
            }"#,
        )
        .unwrap();

        let source = SourceDocument::try_from(doc).unwrap();
        assert_eq!(source.kind(), DocumentKind::Recipe);
        assert_eq!(source.meta().uid.as_deref(), Some("ant-stew"));
        match source {
            SourceDocument::Recipe(recipe) => {
                assert_eq!(recipe.data.main_ingredient.as_deref(), Some("ants"));
                assert_eq!(recipe.data.preparation.as_text(), "Simmer.");
                assert!(recipe.data.body.is_empty());
            }
            other => panic!("unexpected document {other:?}"),
        }
    }

    #[test]
    fn test_try_from_unknown_kind() {
        let doc = CmsDocument {
            id: "e1".into(),
            uid: None,
            kind: "event".into(),
            lang: "en-au".into(),
            data: Value::Null,
        };
        match SourceDocument::try_from(doc).unwrap_err() {
            AppError::UnknownDocumentKind(kind) => assert_eq!(kind, "event"),
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_try_from_malformed_rich_text() {
        let doc = CmsDocument {
            id: "p1".into(),
            uid: Some("post".into()),
            kind: "post".into(),
            lang: "de-de".into(),
            data: serde_json::json!({ "title": "not rich text" }),
        };
        let err = SourceDocument::try_from(doc).unwrap_err();
        assert!(matches!(err, AppError::Json(_)));
    }

    #[test]
    fn test_kind_tags() {
        assert_eq!(DocumentKind::from_tag("recipe"), Some(DocumentKind::Recipe));
        assert_eq!(DocumentKind::from_tag("post"), Some(DocumentKind::BlogPost));
        assert_eq!(DocumentKind::from_tag("Recipe"), None);
        assert_eq!(DocumentKind::BlogPost.to_string(), "post");
    }
}
