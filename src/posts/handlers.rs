use axum::{
    extract::{DefaultBodyLimit, Multipart, Path, Query, State},
    http::StatusCode,
    routing::{delete, get, post, put},
    Json, Router,
};
use tracing::{info, instrument, warn};
use uuid::Uuid;
use validator::Validate;

use crate::{
    auth::{dto::MessageResponse, jwt::AuthUser},
    error::{AppError, AppResult},
    extract::AppJson,
    images::services::{store_post_image, UploadItem},
    state::AppState,
};

use super::dto::{ImageUploadResponse, Pagination, PostListResponse, PostRequest, PostResponse};

const MAX_IMAGE_BYTES: usize = 10 * 1024 * 1024;

pub fn read_routes() -> Router<AppState> {
    Router::new()
        .route("/api/posts", get(list_posts))
        .route("/api/posts/:id", get(get_post))
}

pub fn write_routes() -> Router<AppState> {
    Router::new()
        .route("/api/create-post", post(create_post))
        .route("/api/update-post/:id", put(update_post))
        .route("/api/delete-post/:id", delete(delete_post))
        .route("/api/like-post/:id", put(like_post))
        .route(
            "/api/post-image-upload",
            post(upload_post_image).layer(DefaultBodyLimit::max(MAX_IMAGE_BYTES)),
        )
}

#[instrument(skip(state, payload))]
pub async fn create_post(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    AppJson(payload): AppJson<PostRequest>,
) -> AppResult<(StatusCode, Json<PostResponse>)> {
    payload.validate()?;
    let post = state.posts.create(user_id, payload).await?;
    Ok((
        StatusCode::CREATED,
        Json(PostResponse {
            success: true,
            post,
            message: "Your post is published!".into(),
        }),
    ))
}

#[instrument(skip(state, payload))]
pub async fn update_post(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
    AppJson(payload): AppJson<PostRequest>,
) -> AppResult<Json<PostResponse>> {
    payload.validate()?;
    let post = state.posts.update(user_id, id, payload).await?;
    Ok(Json(PostResponse {
        success: true,
        post,
        message: "Post updated successfully".into(),
    }))
}

#[instrument(skip(state))]
pub async fn delete_post(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<MessageResponse>> {
    state.posts.delete(user_id, id).await?;
    Ok(Json(MessageResponse::ok("Post deleted successfully")))
}

#[instrument(skip(state))]
pub async fn like_post(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<PostResponse>> {
    let post = state.posts.like(user_id, id).await?;
    Ok(Json(PostResponse {
        success: true,
        post,
        message: "You liked this post".into(),
    }))
}

#[instrument(skip(state))]
pub async fn list_posts(
    State(state): State<AppState>,
    Query(p): Query<Pagination>,
) -> AppResult<Json<PostListResponse>> {
    let (limit, offset) = p.clamped();
    let posts = state.posts.list(limit, offset).await?;
    Ok(Json(PostListResponse {
        success: true,
        posts,
    }))
}

#[instrument(skip(state))]
pub async fn get_post(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<PostResponse>> {
    let post = state.posts.get(id).await?;
    Ok(Json(PostResponse {
        success: true,
        post,
        message: "Post found".into(),
    }))
}

/// POST /posts/api/post-image-upload (multipart, field `image`)
#[instrument(skip(state, mp))]
pub async fn upload_post_image(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    mut mp: Multipart,
) -> AppResult<Json<ImageUploadResponse>> {
    let mut upload = None;
    loop {
        let field = match mp.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => {
                warn!(error = %e, "malformed multipart body");
                return Err(AppError::invalid_field("image", "Unable to read the uploaded file"));
            }
        };
        if field.name() != Some("image") {
            continue;
        }
        let content_type = field
            .content_type()
            .map(|s| s.to_string())
            .unwrap_or_else(|| "application/octet-stream".into());
        let body = field.bytes().await.map_err(|e| {
            warn!(error = %e, "failed to read image field");
            AppError::invalid_field("image", "Unable to read the uploaded file")
        })?;
        upload = Some(UploadItem { body, content_type });
        break;
    }

    let upload = upload.ok_or_else(|| AppError::invalid_field("image", "Image file is required"))?;
    let filename = store_post_image(state.storage.as_ref(), upload).await?;
    info!(%user_id, %filename, "post image uploaded");

    Ok(Json(ImageUploadResponse {
        success: true,
        filename,
        message: "Image uploaded successfully".into(),
    }))
}
