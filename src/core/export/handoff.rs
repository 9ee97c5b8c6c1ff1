//! Upload handoff of a completed export
//!
//! The finished file is copied unchanged to object storage. Once the store
//! confirms an object of the same size, the local file and its checkpoint
//! sidecar are removed unless the caller asked to keep them.

use crate::adapters::storage::ObjectUploader;
use crate::config::StorageConfig;
use crate::core::export::summary::{ExportResult, ExportStatus};
use crate::core::state::CheckpointStore;
use crate::domain::errors::{DredgeError, UploadError};
use crate::domain::ids::{BucketName, IndexName};
use crate::domain::Result;
use std::sync::Arc;

/// Builds the object key `<prefix>/<index>/<index>_<timestamp>.jsonl`
///
/// # Examples
///
/// ```
/// use dredge::core::export::object_key;
/// use dredge::domain::IndexName;
///
/// let index = IndexName::new("inventory").unwrap();
/// assert_eq!(
///     object_key("opensearch-backups", &index, 1_700_000_000),
///     "opensearch-backups/inventory/inventory_1700000000.jsonl"
/// );
/// ```
pub fn object_key(prefix: &str, index: &IndexName, timestamp: i64) -> String {
    let prefix = prefix.trim_matches('/');
    if prefix.is_empty() {
        format!("{index}/{index}_{timestamp}.jsonl")
    } else {
        format!("{prefix}/{index}/{index}_{timestamp}.jsonl")
    }
}

/// Confirmation of a finished handoff
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandoffReceipt {
    /// Where the object now lives
    pub location: String,
    /// Object key inside the bucket
    pub key: String,
    /// Confirmed object size in bytes
    pub size: u64,
    /// Whether the local copy was deleted
    pub local_removed: bool,
}

/// Hands completed exports to object storage
pub struct UploadHandoff {
    uploader: Arc<dyn ObjectUploader>,
    prefix: String,
    keep_local: bool,
}

impl UploadHandoff {
    /// Creates a handoff writing under `prefix`
    pub fn new(uploader: Arc<dyn ObjectUploader>, prefix: impl Into<String>) -> Self {
        Self {
            uploader,
            prefix: prefix.into(),
            keep_local: false,
        }
    }

    /// Creates a handoff using the `[storage]` settings
    pub fn from_config(uploader: Arc<dyn ObjectUploader>, config: &StorageConfig) -> Self {
        Self::new(uploader, config.prefix.clone()).keep_local(config.keep_local)
    }

    /// Keeps the local file after a confirmed upload
    pub fn keep_local(mut self, keep_local: bool) -> Self {
        self.keep_local = keep_local;
        self
    }

    /// Uploads the output of `result`, keyed by the run's start time
    pub async fn hand_off(&self, result: &ExportResult, bucket: &BucketName) -> Result<HandoffReceipt> {
        self.hand_off_at(result, bucket, result.started_at.timestamp())
            .await
    }

    /// Uploads the output of `result` under an explicit key timestamp
    ///
    /// # Errors
    ///
    /// - [`DredgeError::Validation`] for interrupted runs or writer outputs
    /// - [`DredgeError::Upload`] when the transfer fails or the stored size
    ///   differs from the local file; the local file is left in place
    pub async fn hand_off_at(
        &self,
        result: &ExportResult,
        bucket: &BucketName,
        timestamp: i64,
    ) -> Result<HandoffReceipt> {
        if result.status != ExportStatus::Completed {
            return Err(DredgeError::Validation(format!(
                "Only completed exports are uploaded; {} is {}",
                result.index, result.status
            )));
        }

        let path = result.output.path().ok_or_else(|| {
            DredgeError::Validation("Only file outputs can be uploaded".to_string())
        })?;

        let local_size = std::fs::metadata(path)
            .map_err(|e| UploadError::LocalFile(format!("{}: {e}", path.display())))?
            .len();

        let key = object_key(&self.prefix, &result.index, timestamp);
        tracing::info!(
            index = %result.index,
            bucket = %bucket,
            key = %key,
            backend = self.uploader.backend_name(),
            size = local_size,
            "Uploading export"
        );

        let receipt = self.uploader.upload(path, bucket, &key).await?;
        if receipt.size != local_size {
            return Err(UploadError::SizeMismatch {
                expected: local_size,
                actual: receipt.size,
            }
            .into());
        }

        tracing::info!(location = %receipt.location, size = receipt.size, "Upload confirmed");

        let local_removed = if self.keep_local {
            false
        } else {
            let removed = match std::fs::remove_file(path) {
                Ok(()) => true,
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "Failed to remove local export");
                    false
                }
            };
            if let Err(e) = CheckpointStore::for_output(path).remove() {
                tracing::warn!(error = %e, "Failed to remove checkpoint sidecar");
            }
            removed
        };

        Ok(HandoffReceipt {
            location: receipt.location,
            key,
            size: receipt.size,
            local_removed,
        })
    }
}
