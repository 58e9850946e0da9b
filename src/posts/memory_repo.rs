use std::collections::HashMap;

use async_trait::async_trait;
use time::OffsetDateTime;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::repo::PostRepo;
use super::repo_types::{Post, PostFields};
use crate::error::{StoreError, StoreResult};

#[derive(Default)]
struct Tables {
    posts: HashMap<Uuid, Post>,
    likes: HashMap<Uuid, Vec<Uuid>>,
}

/// Process-local post store; each like is checked and recorded under one write lock.
#[derive(Default)]
pub struct MemoryPostRepo {
    tables: RwLock<Tables>,
}

impl MemoryPostRepo {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PostRepo for MemoryPostRepo {
    async fn create(&self, author: Uuid, fields: PostFields) -> StoreResult<Post> {
        let now = OffsetDateTime::now_utc();
        let post = Post {
            id: Uuid::new_v4(),
            author,
            title: fields.title,
            content: fields.content,
            slug: fields.slug,
            post_image: fields.post_image,
            created_at: now,
            updated_at: now,
        };
        self.tables.write().await.posts.insert(post.id, post.clone());
        Ok(post)
    }

    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<Post>> {
        Ok(self.tables.read().await.posts.get(&id).cloned())
    }

    async fn list(&self, limit: i64, offset: i64) -> StoreResult<Vec<Post>> {
        let tables = self.tables.read().await;
        let mut posts: Vec<Post> = tables.posts.values().cloned().collect();
        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(posts
            .into_iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .collect())
    }

    async fn update(&self, id: Uuid, author: Uuid, fields: PostFields) -> StoreResult<Option<Post>> {
        let mut tables = self.tables.write().await;
        let Some(post) = tables.posts.get_mut(&id).filter(|p| p.author == author) else {
            return Ok(None);
        };
        post.title = fields.title;
        post.content = fields.content;
        post.slug = fields.slug;
        post.post_image = fields.post_image;
        post.updated_at = OffsetDateTime::now_utc();
        Ok(Some(post.clone()))
    }

    async fn delete(&self, id: Uuid, author: Uuid) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        if tables.posts.get(&id).is_some_and(|p| p.author == author) {
            tables.posts.remove(&id);
            tables.likes.remove(&id);
            return Ok(true);
        }
        Ok(false)
    }

    async fn add_like(&self, post_id: Uuid, user_id: Uuid) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        if !tables.posts.contains_key(&post_id) {
            return Err(StoreError::NotFound("post"));
        }
        let likers = tables.likes.entry(post_id).or_default();
        if likers.contains(&user_id) {
            return Ok(false);
        }
        likers.push(user_id);
        Ok(true)
    }

    async fn likers(&self, post_ids: &[Uuid]) -> StoreResult<HashMap<Uuid, Vec<Uuid>>> {
        let tables = self.tables.read().await;
        Ok(post_ids
            .iter()
            .filter_map(|id| tables.likes.get(id).map(|l| (*id, l.clone())))
            .collect())
    }
}
