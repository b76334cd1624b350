//! User comments posted from the website.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Payload sent by the website when a comment is submitted.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostCommentData {
    pub username: String,
    pub text: String,
    /// `blogPost` or `recipe`
    pub post_type: String,
    pub post_id: String,
}

/// A comment as stored in the `comments` collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewComment {
    pub username: String,
    pub text: String,
    pub date_created: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blog_post_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipe_id: Option<String>,
}

impl NewComment {
    /// Build the stored comment, linking it to the post it belongs to.
    ///
    /// Unrecognized post types leave the comment unlinked.
    pub fn from_post(data: PostCommentData, date_created: DateTime<Utc>) -> Self {
        let mut comment = Self {
            username: data.username,
            text: data.text,
            date_created,
            blog_post_id: None,
            recipe_id: None,
        };

        match data.post_type.as_str() {
            "blogPost" => comment.blog_post_id = Some(data.post_id),
            "recipe" => comment.recipe_id = Some(data.post_id),
            _ => {}
        }

        comment
    }
}
