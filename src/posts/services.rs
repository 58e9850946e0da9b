use std::sync::Arc;

use tracing::{info, warn};
use uuid::Uuid;

use super::{
    dto::{PostRequest, PostView},
    repo::PostRepo,
    repo_types::{Post, PostFields},
    slug::slugify,
};
use crate::error::{AppError, AppResult, StoreError};

const POST_NOT_FOUND: &str = "Post not found.";
const NOT_OWNER: &str = "Post does not belong to you";
const ALREADY_LIKED: &str = "You have already liked this post";

pub struct PostService {
    posts: Arc<dyn PostRepo>,
}

fn fields_from(req: PostRequest) -> PostFields {
    PostFields {
        slug: slugify(&req.title),
        title: req.title,
        content: req.content,
        post_image: req.post_image.filter(|s| !s.trim().is_empty()),
    }
}

impl PostService {
    pub fn new(posts: Arc<dyn PostRepo>) -> Self {
        Self { posts }
    }

    async fn view(&self, post: Post) -> AppResult<PostView> {
        let mut likers = self.posts.likers(&[post.id]).await?;
        let users = likers.remove(&post.id).unwrap_or_default();
        Ok(PostView::new(post, users))
    }

    /// Loads the post and checks that `user_id` wrote it.
    async fn owned(&self, id: Uuid, user_id: Uuid) -> AppResult<Post> {
        let post = self
            .posts
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found(POST_NOT_FOUND))?;
        if post.author != user_id {
            warn!(post_id = %id, %user_id, "post ownership mismatch");
            return Err(AppError::forbidden(NOT_OWNER));
        }
        Ok(post)
    }

    pub async fn create(&self, author: Uuid, req: PostRequest) -> AppResult<PostView> {
        let post = self.posts.create(author, fields_from(req)).await?;
        info!(post_id = %post.id, %author, "post created");
        Ok(PostView::new(post, Vec::new()))
    }

    pub async fn update(&self, user_id: Uuid, id: Uuid, req: PostRequest) -> AppResult<PostView> {
        self.owned(id, user_id).await?;
        // Ownership is re-checked by the store; a concurrent delete yields None.
        let post = self
            .posts
            .update(id, user_id, fields_from(req))
            .await?
            .ok_or_else(|| AppError::not_found(POST_NOT_FOUND))?;
        info!(post_id = %id, %user_id, "post updated");
        self.view(post).await
    }

    pub async fn delete(&self, user_id: Uuid, id: Uuid) -> AppResult<()> {
        self.owned(id, user_id).await?;
        if !self.posts.delete(id, user_id).await? {
            return Err(AppError::not_found(POST_NOT_FOUND));
        }
        info!(post_id = %id, %user_id, "post deleted");
        Ok(())
    }

    pub async fn like(&self, user_id: Uuid, id: Uuid) -> AppResult<PostView> {
        let post = self
            .posts
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found(POST_NOT_FOUND))?;

        let added = self.posts.add_like(id, user_id).await.map_err(|e| match e {
            StoreError::NotFound(_) => AppError::not_found(POST_NOT_FOUND),
            other => other.into(),
        })?;
        if !added {
            return Err(AppError::conflict(ALREADY_LIKED));
        }
        info!(post_id = %id, %user_id, "post liked");
        self.view(post).await
    }

    pub async fn get(&self, id: Uuid) -> AppResult<PostView> {
        let post = self
            .posts
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found(POST_NOT_FOUND))?;
        self.view(post).await
    }

    pub async fn list(&self, limit: i64, offset: i64) -> AppResult<Vec<PostView>> {
        let posts = self.posts.list(limit, offset).await?;
        let ids: Vec<Uuid> = posts.iter().map(|p| p.id).collect();
        let mut likers = self.posts.likers(&ids).await?;
        Ok(posts
            .into_iter()
            .map(|p| {
                let users = likers.remove(&p.id).unwrap_or_default();
                PostView::new(p, users)
            })
            .collect())
    }
}
