use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::repo_types::{Post, PostFields};
use crate::error::StoreResult;

#[async_trait]
pub trait PostRepo: Send + Sync {
    async fn create(&self, author: Uuid, fields: PostFields) -> StoreResult<Post>;
    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<Post>>;
    /// Newest first.
    async fn list(&self, limit: i64, offset: i64) -> StoreResult<Vec<Post>>;
    /// Updates only when `author` owns the post. `None` when nothing matched.
    async fn update(&self, id: Uuid, author: Uuid, fields: PostFields) -> StoreResult<Option<Post>>;
    /// Deletes only when `author` owns the post.
    async fn delete(&self, id: Uuid, author: Uuid) -> StoreResult<bool>;
    /// Records a like. Returns `false` when this user already liked the post,
    /// `StoreError::NotFound` when the post is gone.
    async fn add_like(&self, post_id: Uuid, user_id: Uuid) -> StoreResult<bool>;
    /// Likers per post, in like order. Posts without likes may be absent.
    async fn likers(&self, post_ids: &[Uuid]) -> StoreResult<HashMap<Uuid, Vec<Uuid>>>;
}

const POST_COLUMNS: &str =
    "id, author, title, content, slug, post_image, created_at, updated_at";

#[derive(Clone)]
pub struct PgPostRepo {
    db: PgPool,
}

impl PgPostRepo {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl PostRepo for PgPostRepo {
    async fn create(&self, author: Uuid, fields: PostFields) -> StoreResult<Post> {
        let sql = format!(
            r#"
            INSERT INTO posts (author, title, content, slug, post_image)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {POST_COLUMNS}
            "#
        );
        let post = sqlx::query_as::<_, Post>(&sql)
            .bind(author)
            .bind(&fields.title)
            .bind(&fields.content)
            .bind(&fields.slug)
            .bind(&fields.post_image)
            .fetch_one(&self.db)
            .await?;
        Ok(post)
    }

    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<Post>> {
        let sql = format!("SELECT {POST_COLUMNS} FROM posts WHERE id = $1");
        let post = sqlx::query_as::<_, Post>(&sql)
            .bind(id)
            .fetch_optional(&self.db)
            .await?;
        Ok(post)
    }

    async fn list(&self, limit: i64, offset: i64) -> StoreResult<Vec<Post>> {
        let sql = format!(
            r#"
            SELECT {POST_COLUMNS}
              FROM posts
             ORDER BY created_at DESC
             LIMIT $1 OFFSET $2
            "#
        );
        let rows = sqlx::query_as::<_, Post>(&sql)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.db)
            .await?;
        Ok(rows)
    }

    async fn update(&self, id: Uuid, author: Uuid, fields: PostFields) -> StoreResult<Option<Post>> {
        let sql = format!(
            r#"
            UPDATE posts
               SET title = $3,
                   content = $4,
                   slug = $5,
                   post_image = $6,
                   updated_at = now()
             WHERE id = $1 AND author = $2
            RETURNING {POST_COLUMNS}
            "#
        );
        let post = sqlx::query_as::<_, Post>(&sql)
            .bind(id)
            .bind(author)
            .bind(&fields.title)
            .bind(&fields.content)
            .bind(&fields.slug)
            .bind(&fields.post_image)
            .fetch_optional(&self.db)
            .await?;
        Ok(post)
    }

    async fn delete(&self, id: Uuid, author: Uuid) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM posts WHERE id = $1 AND author = $2")
            .bind(id)
            .bind(author)
            .execute(&self.db)
            .await?;
        Ok(result.rows_affected() == 1)
    }

    async fn add_like(&self, post_id: Uuid, user_id: Uuid) -> StoreResult<bool> {
        // The (post_id, user_id) primary key decides; no prior read.
        let result = sqlx::query(
            r#"
            INSERT INTO post_likes (post_id, user_id)
            VALUES ($1, $2)
            ON CONFLICT (post_id, user_id) DO NOTHING
            "#,
        )
        .bind(post_id)
        .bind(user_id)
        .execute(&self.db)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    async fn likers(&self, post_ids: &[Uuid]) -> StoreResult<HashMap<Uuid, Vec<Uuid>>> {
        let rows = sqlx::query_as::<_, (Uuid, Uuid)>(
            r#"
            SELECT post_id, user_id
              FROM post_likes
             WHERE post_id = ANY($1)
             ORDER BY created_at ASC
            "#,
        )
        .bind(post_ids)
        .fetch_all(&self.db)
        .await?;

        let mut out: HashMap<Uuid, Vec<Uuid>> = HashMap::new();
        for (post_id, user_id) in rows {
            out.entry(post_id).or_default().push(user_id);
        }
        Ok(out)
    }
}
