use serde::Serialize;
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Post {
    pub id: Uuid,
    pub author: Uuid,
    pub title: String,
    pub content: String,
    pub slug: String,
    pub post_image: Option<String>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

/// Fields written on create and replaced wholesale on update.
#[derive(Debug, Clone)]
pub struct PostFields {
    pub title: String,
    pub content: String,
    pub slug: String,
    pub post_image: Option<String>,
}

/// Users who liked a post, in like order. The count is always the set size.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct Likes {
    pub count: usize,
    pub user: Vec<Uuid>,
}

impl From<Vec<Uuid>> for Likes {
    fn from(user: Vec<Uuid>) -> Self {
        Self {
            count: user.len(),
            user,
        }
    }
}
