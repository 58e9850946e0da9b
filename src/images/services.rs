use anyhow::Context;
use bytes::Bytes;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    storage::StorageClient,
};

pub const POST_IMAGE_PREFIX: &str = "post-images";

pub struct UploadItem {
    pub body: Bytes,
    pub content_type: String,
}

/// Stores one post image and returns the URL it can be fetched from.
pub async fn store_post_image(storage: &dyn StorageClient, img: UploadItem) -> AppResult<String> {
    let ext = ext_from_mime(&img.content_type)
        .ok_or_else(|| AppError::invalid_field("image", "Only image uploads are allowed"))?;
    if img.body.is_empty() {
        return Err(AppError::invalid_field("image", "Image file is empty"));
    }

    let millis = OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000;
    let key = format!(
        "{}/img-{}-{}.{}",
        POST_IMAGE_PREFIX,
        millis,
        Uuid::new_v4().simple(),
        ext
    );

    storage
        .put_object(&key, img.body, &img.content_type)
        .await
        .with_context(|| format!("put_object {}", key))?;
    let url = storage
        .public_url(&key)
        .await
        .with_context(|| format!("public url for {}", key))?;

    tracing::info!(%key, "post image stored");
    Ok(url)
}

fn ext_from_mime(ct: &str) -> Option<&'static str> {
    match ct {
        "image/jpeg" | "image/jpg" => Some("jpg"),
        "image/png" => Some("png"),
        "image/webp" => Some("webp"),
        "image/gif" => Some("gif"),
        "image/heic" => Some("heic"),
        _ => None,
    }
}
