//! Object storage abstraction for the upload handoff

use crate::domain::errors::UploadError;
use crate::domain::ids::BucketName;
use async_trait::async_trait;
use std::path::Path;

/// Confirmation returned by a successful upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadReceipt {
    /// Where the object now lives, e.g. `s3://bucket/key`
    pub location: String,

    /// Object size in bytes as reported by the store after the transfer
    pub size: u64,
}

/// Uploads a finished export file to object storage
#[async_trait]
pub trait ObjectUploader: Send + Sync {
    /// Short name for log output
    fn backend_name(&self) -> &str;

    /// Copies `local_path` unchanged to `bucket` under `key`
    ///
    /// # Errors
    ///
    /// Returns [`UploadError`] if the local file cannot be read, the key is
    /// rejected or the store fails the transfer. The local file is never
    /// modified.
    async fn upload(
        &self,
        local_path: &Path,
        bucket: &BucketName,
        key: &str,
    ) -> Result<UploadReceipt, UploadError>;
}
