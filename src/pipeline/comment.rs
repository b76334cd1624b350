// src/pipeline/comment.rs

//! Store a comment submitted from the website.

use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::models::{NewComment, PostCommentData};
use crate::storage::{DocumentStore, ObjectStore};

/// Add the comment to `collection` and return its document id.
pub async fn post_comment<S: ObjectStore>(
    db: &DocumentStore<S>,
    collection: &str,
    data: PostCommentData,
    now: DateTime<Utc>,
) -> Result<String> {
    let comment = NewComment::from_post(data, now);
    if comment.blog_post_id.is_none() && comment.recipe_id.is_none() {
        log::warn!("Comment by {} is not linked to a post", comment.username);
    }

    let id = db.add(collection, &comment).await?;
    log::info!("Stored comment {} by {}", id, comment.username);
    Ok(id)
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;
    use crate::storage::LocalStore;

    fn data(text: &str, post_type: &str) -> PostCommentData {
        PostCommentData {
            username: "bugfan".into(),
            text: text.into(),
            post_type: post_type.into(),
            post_id: "r1".into(),
        }
    }

    #[tokio::test]
    async fn test_post_comment() {
        let dir = TempDir::new().unwrap();
        let db = DocumentStore::new(LocalStore::new(dir.path()), "firestore");

        let id = post_comment(&db, "comments", data("Crunchy!", "recipe"), Utc::now())
            .await
            .unwrap();

        let comments = db.get_collection("comments").await.unwrap();
        assert_eq!(comments[&id]["recipeId"], "r1");
        assert_eq!(comments[&id]["text"], "Crunchy!");
    }

    #[tokio::test]
    async fn test_stores_comment_as_given() {
        let dir = TempDir::new().unwrap();
        let db = DocumentStore::new(LocalStore::new(dir.path()), "firestore");

        let id = post_comment(&db, "comments", data("", "event"), Utc::now())
            .await
            .unwrap();

        let comments = db.get_collection("comments").await.unwrap();
        let comment = &comments[&id];
        assert_eq!(comment["text"], "");
        assert!(comment.get("recipeId").is_none());
        assert!(comment.get("blogPostId").is_none());
    }
}
