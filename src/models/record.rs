//! Flat records pushed to the search index.

use serde::Serialize;

use crate::models::{DocumentKind, ImageRef};

/// Search record for a recipe.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecipeRecord {
    #[serde(rename = "objectID")]
    pub object_id: String,
    pub uid: Option<String>,
    #[serde(rename = "lang")]
    pub language: String,
    pub title: String,
    pub subtitle: String,
    pub date: Option<String>,
    pub introduction: String,
    pub recipe_type: Option<String>,
    #[serde(rename = "insect_of_choice")]
    pub main_ingredient: Option<String>,
    pub ingredients: String,
    pub main_image: Option<ImageRef>,
    #[serde(rename = "prep")]
    pub preparation: String,
    /// Flattened body text
    pub text: String,
}

/// Search record for a blog post.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BlogPostRecord {
    #[serde(rename = "objectID")]
    pub object_id: String,
    pub uid: Option<String>,
    #[serde(rename = "lang")]
    pub language: String,
    pub title: String,
    pub subtitle: String,
    pub date: Option<String>,
    pub tl_dr: Option<String>,
    pub tags: Option<String>,
    pub main_image: Option<ImageRef>,
    /// Flattened body text
    pub text: String,
}

/// A record ready for a partial update in the search index.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SearchRecord {
    Recipe(RecipeRecord),
    BlogPost(BlogPostRecord),
}

impl SearchRecord {
    pub fn kind(&self) -> DocumentKind {
        match self {
            Self::Recipe(_) => DocumentKind::Recipe,
            Self::BlogPost(_) => DocumentKind::BlogPost,
        }
    }

    /// Index key; always the source document id.
    pub fn object_id(&self) -> &str {
        match self {
            Self::Recipe(record) => &record.object_id,
            Self::BlogPost(record) => &record.object_id,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            Self::Recipe(record) => &record.title,
            Self::BlogPost(record) => &record.title,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blog_post_wire_keys() {
        let record = SearchRecord::BlogPost(BlogPostRecord {
            object_id: "p1".into(),
            uid: Some("why-insects".into()),
            language: "en".into(),
            title: "Why insects?".into(),
            subtitle: String::new(),
            date: Some("2020-05-01".into()),
            tl_dr: Some("They are great.".into()),
            tags: None,
            main_image: None,
            text: "Body".into(),
        });

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["objectID"], "p1");
        assert_eq!(json["lang"], "en");
        assert_eq!(json["tl_dr"], "They are great.");
        assert!(json["tags"].is_null());
        assert!(json.get("kind").is_none());
        assert_eq!(record.object_id(), "p1");
        assert_eq!(record.kind(), DocumentKind::BlogPost);
    }
}
