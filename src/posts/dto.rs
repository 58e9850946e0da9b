use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;
use validator::Validate;

use super::repo_types::{Likes, Post};

/// Body of create-post and update-post.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default)]
pub struct PostRequest {
    #[validate(length(min = 1, message = "Title is required"))]
    pub title: String,
    #[validate(length(min = 1, message = "Content is required"))]
    pub content: String,
    #[serde(alias = "postImage")]
    pub post_image: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct PostView {
    pub id: Uuid,
    pub author: Uuid,
    pub title: String,
    pub content: String,
    pub slug: String,
    pub post_image: Option<String>,
    pub likes: Likes,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl PostView {
    pub fn new(post: Post, likers: Vec<Uuid>) -> Self {
        Self {
            id: post.id,
            author: post.author,
            title: post.title,
            content: post.content,
            slug: post.slug,
            post_image: post.post_image,
            likes: Likes::from(likers),
            created_at: post.created_at,
            updated_at: post.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PostResponse {
    pub success: bool,
    pub post: PostView,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct PostListResponse {
    pub success: bool,
    pub posts: Vec<PostView>,
}

#[derive(Debug, Serialize)]
pub struct ImageUploadResponse {
    pub success: bool,
    pub filename: String,
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct Pagination {
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

fn default_limit() -> i64 {
    20
}

impl Pagination {
    pub fn clamped(&self) -> (i64, i64) {
        (self.limit.clamp(1, 100), self.offset.max(0))
    }
}
