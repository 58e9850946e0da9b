use std::path::PathBuf;

use anyhow::Context;
use async_trait::async_trait;
use aws_config::{defaults, BehaviorVersion};
use aws_credential_types::Credentials;
use aws_sdk_s3::{
    config::{Builder as S3ConfigBuilder, Region},
    presigning::PresigningConfig,
    Client,
};
use aws_smithy_types::byte_stream::ByteStream;
use bytes::Bytes;

/// Longest lifetime S3 accepts for a presigned URL.
const S3_URL_TTL_SECS: u64 = 7 * 24 * 60 * 60;

#[async_trait]
pub trait StorageClient: Send + Sync {
    async fn put_object(&self, key: &str, body: Bytes, content_type: &str) -> anyhow::Result<()>;
    /// URL a browser can fetch the object from.
    async fn public_url(&self, key: &str) -> anyhow::Result<String>;
}

/// Files on local disk, served by the app itself under `/{key}`.
#[derive(Clone)]
pub struct LocalStorage {
    root: PathBuf,
    public_base: String,
}

impl LocalStorage {
    pub fn new(root: impl Into<PathBuf>, public_base: &str) -> Self {
        Self {
            root: root.into(),
            public_base: public_base.trim_end_matches('/').to_string(),
        }
    }

    fn path_for(&self, key: &str) -> anyhow::Result<PathBuf> {
        anyhow::ensure!(
            !key.split('/').any(|part| part.is_empty() || part == ".." || part == "."),
            "invalid storage key {key:?}"
        );
        Ok(self.root.join(key))
    }
}

#[async_trait]
impl StorageClient for LocalStorage {
    async fn put_object(&self, key: &str, body: Bytes, _content_type: &str) -> anyhow::Result<()> {
        let path = self.path_for(key)?;
        if let Some(dir) = path.parent() {
            tokio::fs::create_dir_all(dir)
                .await
                .with_context(|| format!("create dir {}", dir.display()))?;
        }
        tokio::fs::write(&path, &body)
            .await
            .with_context(|| format!("write {}", path.display()))?;
        Ok(())
    }

    async fn public_url(&self, key: &str) -> anyhow::Result<String> {
        self.path_for(key)?;
        Ok(format!("{}/{}", self.public_base, key))
    }
}

#[derive(Clone)]
pub struct S3Storage {
    client: Client,
    bucket: String,
}

impl S3Storage {
    pub async fn new(
        endpoint: &str,
        bucket: &str,
        access_key: &str,
        secret_key: &str,
        region: &str,
    ) -> anyhow::Result<Self> {
        let shared = defaults(BehaviorVersion::latest())
            .region(Region::new(region.to_string()))
            .credentials_provider(Credentials::new(
                access_key, secret_key, None, None, "static",
            ))
            .endpoint_url(endpoint)
            .load()
            .await;

        let conf = S3ConfigBuilder::from(&shared)
            .endpoint_url(endpoint)
            .force_path_style(true)
            .build();

        Ok(Self {
            client: Client::from_conf(conf),
            bucket: bucket.to_string(),
        })
    }
}

#[async_trait]
impl StorageClient for S3Storage {
    async fn put_object(&self, key: &str, body: Bytes, content_type: &str) -> anyhow::Result<()> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(body))
            .content_type(content_type)
            .send()
            .await
            .context("s3 put_object")?;
        Ok(())
    }

    async fn public_url(&self, key: &str) -> anyhow::Result<String> {
        let presigned = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .presigned(PresigningConfig::expires_in(
                std::time::Duration::from_secs(S3_URL_TTL_SECS),
            )?)
            .await
            .context("s3 presign get_object")?;
        Ok(presigned.uri().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn local_storage_writes_file_and_builds_url() {
        let root = TempDir::new().unwrap();
        let storage = LocalStorage::new(root.path(), "https://example.com/");
        storage
            .put_object("post-images/a.png", Bytes::from_static(b"png"), "image/png")
            .await
            .unwrap();

        let written = tokio::fs::read(root.path().join("post-images/a.png"))
            .await
            .unwrap();
        assert_eq!(written, b"png");
        assert_eq!(
            storage.public_url("post-images/a.png").await.unwrap(),
            "https://example.com/post-images/a.png"
        );
    }

    #[tokio::test]
    async fn local_storage_rejects_traversal() {
        let root = TempDir::new().unwrap();
        let storage = LocalStorage::new(root.path(), "http://x");
        let err = storage
            .put_object("../etc/passwd", Bytes::new(), "text/plain")
            .await;
        assert!(err.is_err());
        assert!(storage.public_url("a//b").await.is_err());
    }
}
