//! Uploader backed by the `object_store` crate
//!
//! Supports Amazon S3 (and S3-compatible endpoints) and a local directory
//! backend where each bucket is a subdirectory of the configured root.

use super::traits::{ObjectUploader, UploadReceipt};
use crate::config::schema::{StorageBackend, StorageConfig};
use crate::domain::errors::UploadError;
use crate::domain::ids::BucketName;
use async_trait::async_trait;
use object_store::aws::AmazonS3Builder;
use object_store::buffered::BufWriter;
use object_store::local::LocalFileSystem;
use object_store::path::Path as ObjectPath;
use object_store::ObjectStore;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::AsyncWriteExt;

/// Object store uploader
pub struct ObjectStoreUploader {
    backend: StorageBackend,
    region: String,
    endpoint: Option<String>,
    local_root: Option<PathBuf>,
}

impl ObjectStoreUploader {
    /// Creates an uploader from the storage section
    ///
    /// `default_region` is used when the storage section names none.
    pub fn new(config: &StorageConfig, default_region: &str) -> Self {
        Self {
            backend: config.backend,
            region: config
                .region
                .clone()
                .unwrap_or_else(|| default_region.to_string()),
            endpoint: config.endpoint.clone(),
            local_root: config.local_root.clone(),
        }
    }

    /// Uploader writing into `root/<bucket>/<key>`
    pub fn local(root: impl Into<PathBuf>) -> Self {
        Self {
            backend: StorageBackend::Local,
            region: String::new(),
            endpoint: None,
            local_root: Some(root.into()),
        }
    }

    fn store_for(&self, bucket: &BucketName) -> Result<Arc<dyn ObjectStore>, UploadError> {
        match self.backend {
            StorageBackend::S3 => {
                let mut builder = AmazonS3Builder::from_env()
                    .with_bucket_name(bucket.as_str())
                    .with_region(&self.region);
                if let Some(endpoint) = &self.endpoint {
                    builder = builder
                        .with_endpoint(endpoint)
                        .with_allow_http(endpoint.starts_with("http://"));
                }
                let store = builder
                    .build()
                    .map_err(|e| UploadError::Store(e.to_string()))?;
                Ok(Arc::new(store))
            }
            StorageBackend::Local => {
                let root = self.local_root.as_ref().ok_or_else(|| {
                    UploadError::Store("local storage backend has no root directory".to_string())
                })?;
                let dir = root.join(bucket.as_str());
                std::fs::create_dir_all(&dir).map_err(|e| {
                    UploadError::Store(format!("cannot create {}: {e}", dir.display()))
                })?;
                let store = LocalFileSystem::new_with_prefix(&dir)
                    .map_err(|e| UploadError::Store(e.to_string()))?;
                Ok(Arc::new(store))
            }
        }
    }

    fn location(&self, bucket: &BucketName, key: &str) -> String {
        match (self.backend, &self.local_root) {
            (StorageBackend::Local, Some(root)) => {
                format!("file://{}", root.join(bucket.as_str()).join(key).display())
            }
            _ => format!("s3://{bucket}/{key}"),
        }
    }
}

#[async_trait]
impl ObjectUploader for ObjectStoreUploader {
    fn backend_name(&self) -> &str {
        match self.backend {
            StorageBackend::S3 => "s3",
            StorageBackend::Local => "local",
        }
    }

    async fn upload(
        &self,
        local_path: &Path,
        bucket: &BucketName,
        key: &str,
    ) -> Result<UploadReceipt, UploadError> {
        let object_path =
            ObjectPath::parse(key).map_err(|e| UploadError::InvalidKey(e.to_string()))?;
        if object_path.as_ref().is_empty() {
            return Err(UploadError::InvalidKey("object key is empty".to_string()));
        }

        let mut file = tokio::fs::File::open(local_path).await.map_err(|e| {
            UploadError::LocalFile(format!("{}: {e}", local_path.display()))
        })?;

        let store = self.store_for(bucket)?;

        tracing::debug!(
            backend = self.backend_name(),
            bucket = %bucket,
            key = %key,
            "Streaming export to object store"
        );

        let mut writer = BufWriter::new(Arc::clone(&store), object_path.clone());
        if let Err(e) = tokio::io::copy(&mut file, &mut writer).await {
            if let Err(abort_err) = writer.abort().await {
                tracing::warn!(error = %abort_err, "Failed to abort multipart upload");
            }
            return Err(UploadError::Store(format!("transfer failed: {e}")));
        }
        writer
            .shutdown()
            .await
            .map_err(|e| UploadError::Store(format!("failed to complete upload: {e}")))?;

        let meta = store
            .head(&object_path)
            .await
            .map_err(|e| UploadError::Store(e.to_string()))?;

        Ok(UploadReceipt {
            location: self.location(bucket, key),
            size: meta.size as u64,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_local_upload_copies_file() {
        let work = TempDir::new().unwrap();
        let store_root = TempDir::new().unwrap();
        let local = work.path().join("inventory_1700000000.jsonl");
        std::fs::write(&local, b"{\"sku\":\"A1\"}\n{\"sku\":\"B2\"}\n").unwrap();

        let uploader = ObjectStoreUploader::local(store_root.path());
        let bucket = BucketName::new("exports").unwrap();
        let receipt = uploader
            .upload(&local, &bucket, "backups/inventory/inventory_1700000000.jsonl")
            .await
            .unwrap();

        let stored = store_root
            .path()
            .join("exports/backups/inventory/inventory_1700000000.jsonl");
        assert_eq!(std::fs::read(&stored).unwrap(), std::fs::read(&local).unwrap());
        assert_eq!(receipt.size, std::fs::metadata(&local).unwrap().len());
        assert!(receipt.location.starts_with("file://"));
        assert!(local.exists());
    }

    #[tokio::test]
    async fn test_missing_local_file() {
        let store_root = TempDir::new().unwrap();
        let uploader = ObjectStoreUploader::local(store_root.path());
        let bucket = BucketName::new("exports").unwrap();

        let err = uploader
            .upload(Path::new("/nonexistent/export.jsonl"), &bucket, "a/b.jsonl")
            .await
            .unwrap_err();
        assert!(matches!(err, UploadError::LocalFile(_)));
    }

    #[test]
    fn test_s3_location() {
        let uploader = ObjectStoreUploader::new(&StorageConfig::default(), "us-east-1");
        let bucket = BucketName::new("exports").unwrap();
        assert_eq!(uploader.backend_name(), "s3");
        assert_eq!(
            uploader.location(&bucket, "opensearch-backups/inventory/x.jsonl"),
            "s3://exports/opensearch-backups/inventory/x.jsonl"
        );
    }
}
