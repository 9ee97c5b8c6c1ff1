//! Export job orchestration
//!
//! An [`ExportJob`] turns configuration plus per-invocation options into a
//! full run: export, optional verification and optional upload handoff. The
//! CLI command and the event handler both drive exports through it.

use crate::adapters::search::SearchBackend;
use crate::adapters::storage::ObjectUploader;
use crate::config::DredgeConfig;
use crate::core::export::exporter::{Exporter, ProgressObserver};
use crate::core::export::handoff::{HandoffReceipt, UploadHandoff};
use crate::core::export::request::{ExportRequest, OutputTarget};
use crate::core::export::retry::RetryPolicy;
use crate::core::export::summary::ExportResult;
use crate::core::verification::{verify_output, VerificationReport};
use crate::domain::errors::DredgeError;
use crate::domain::ids::{BucketName, IndexName};
use crate::domain::Result;
use chrono::Utc;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::watch;

/// Per-invocation overrides of the configured export settings
#[derive(Debug, Clone, Default)]
pub struct JobOptions {
    /// Output file (derived from the index name when unset)
    pub output: Option<PathBuf>,
    /// Destination bucket (falls back to `storage.bucket`)
    pub bucket: Option<BucketName>,
    /// Batch size override
    pub batch_size: Option<usize>,
    /// Sort field override
    pub sort_field: Option<String>,
    /// Continue from an existing checkpoint
    pub resume: bool,
    /// Keep the local file after upload (falls back to `storage.keep_local`)
    pub keep_local: Option<bool>,
    /// Verify the output (falls back to `export.verify_output`)
    pub verify: Option<bool>,
}

/// Everything a finished job produced
#[derive(Debug, Clone)]
pub struct JobOutcome {
    /// Export result
    pub export: ExportResult,
    /// Verification report, when verification ran
    pub verification: Option<VerificationReport>,
    /// Upload confirmation, when the file was handed off
    pub upload: Option<HandoffReceipt>,
}

/// Runs exports with injected collaborators
pub struct ExportJob {
    config: DredgeConfig,
    backend: Arc<dyn SearchBackend>,
    uploader: Option<Arc<dyn ObjectUploader>>,
    shutdown: Option<watch::Receiver<bool>>,
    observer: Option<Arc<dyn ProgressObserver>>,
}

impl ExportJob {
    /// Creates a job without an uploader
    pub fn new(config: DredgeConfig, backend: Arc<dyn SearchBackend>) -> Self {
        Self {
            config,
            backend,
            uploader: None,
            shutdown: None,
            observer: None,
        }
    }

    /// Sets the uploader used for the handoff
    pub fn with_uploader(mut self, uploader: Arc<dyn ObjectUploader>) -> Self {
        self.uploader = Some(uploader);
        self
    }

    /// Sets the shutdown signal passed to the exporter
    pub fn with_shutdown(mut self, shutdown: watch::Receiver<bool>) -> Self {
        self.shutdown = Some(shutdown);
        self
    }

    /// Sets the progress observer passed to the exporter
    pub fn with_observer(mut self, observer: Arc<dyn ProgressObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Configuration the job runs with
    pub fn config(&self) -> &DredgeConfig {
        &self.config
    }

    /// Destination bucket: the option wins over `storage.bucket`
    pub fn resolve_bucket(&self, options: &JobOptions) -> Result<Option<BucketName>> {
        match &options.bucket {
            Some(bucket) => Ok(Some(bucket.clone())),
            None => self
                .config
                .storage
                .bucket_name()
                .map_err(DredgeError::Configuration),
        }
    }

    /// Output file for a run started at `timestamp`
    ///
    /// - explicit `options.output`
    /// - `<export.output_dir>/<index>_<timestamp>.jsonl` when uploading
    /// - `./<index>_data.jsonl` otherwise
    pub fn resolve_output(&self, index: &IndexName, options: &JobOptions, uploading: bool, timestamp: i64) -> PathBuf {
        if let Some(output) = &options.output {
            return output.clone();
        }
        if uploading {
            self.config
                .export
                .output_dir()
                .join(format!("{index}_{timestamp}.jsonl"))
        } else {
            PathBuf::from(format!("{index}_data.jsonl"))
        }
    }

    /// Runs the export, then verification and upload as configured
    ///
    /// Interrupted runs are returned without verification or upload.
    ///
    /// # Errors
    ///
    /// Export errors as returned by [`Exporter::export_to_file`], a
    /// [`DredgeError::Validation`] when verification fails, and
    /// [`DredgeError::Upload`] when the handoff fails.
    pub async fn run(&self, index: &IndexName, options: &JobOptions) -> Result<JobOutcome> {
        let bucket = self.resolve_bucket(options)?;
        let run_ts = Utc::now().timestamp();
        let output = self.resolve_output(index, options, bucket.is_some(), run_ts);

        let mut request = ExportRequest::from_config(
            index.clone(),
            OutputTarget::File(output.clone()),
            &self.config.export,
        )?
        .with_resume(options.resume);
        if let Some(batch_size) = options.batch_size {
            request = request.with_batch_size(batch_size)?;
        }
        if let Some(sort_field) = &options.sort_field {
            request = request.with_sort_field(sort_field.clone())?;
        }

        let export = self.exporter().export_to_file(&request).await?;
        if !export.is_complete() {
            return Ok(JobOutcome {
                export,
                verification: None,
                upload: None,
            });
        }

        let verification = if options.verify.unwrap_or(self.config.export.verify_output) {
            let report = verify_output(&output, Some(export.documents_written))?;
            if !report.is_success() {
                return Err(DredgeError::Validation(format!(
                    "Output verification failed for {}: {} invalid lines, {} lines read, {} expected",
                    output.display(),
                    report.invalid_lines,
                    report.total_lines,
                    export.documents_written
                )));
            }
            Some(report)
        } else {
            None
        };

        let upload = match bucket {
            Some(bucket) => {
                let uploader = self.uploader.clone().ok_or_else(|| {
                    DredgeError::Configuration(
                        "A bucket was given but no uploader is configured".to_string(),
                    )
                })?;
                let keep_local = options.keep_local.unwrap_or(self.config.storage.keep_local);
                let handoff = UploadHandoff::from_config(uploader, &self.config.storage)
                    .keep_local(keep_local);
                Some(handoff.hand_off_at(&export, &bucket, run_ts).await?)
            }
            None => None,
        };

        Ok(JobOutcome {
            export,
            verification,
            upload,
        })
    }

    fn exporter(&self) -> Exporter {
        let mut exporter = Exporter::new(self.backend.clone())
            .with_retry(RetryPolicy::from_config(&self.config.search.retry))
            .with_checkpointing(self.config.export.enable_checkpointing);
        if let Some(observer) = &self.observer {
            exporter = exporter.with_observer(observer.clone());
        }
        if let Some(shutdown) = &self.shutdown {
            exporter = exporter.with_shutdown(shutdown.clone());
        }
        exporter
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SearchConfig;

    fn job(bucket: Option<&str>) -> ExportJob {
        let mut config = DredgeConfig::new(SearchConfig::new("https://search.example.com"));
        config.storage.bucket = bucket.map(str::to_string);
        config.export.output_dir = Some(PathBuf::from("/var/tmp/dredge"));

        struct NoBackend;
        #[async_trait::async_trait]
        impl SearchBackend for NoBackend {
            fn backend_name(&self) -> &str {
                "none"
            }
            async fn index_exists(&self, _: &IndexName) -> crate::adapters::search::SearchResult<bool> {
                Ok(false)
            }
            async fn approximate_count(&self, _: &IndexName) -> crate::adapters::search::SearchResult<u64> {
                Ok(0)
            }
            async fn search_page(
                &self,
                _: &IndexName,
                _: &crate::domain::PageQuery,
            ) -> crate::adapters::search::SearchResult<Vec<crate::domain::SearchHit>> {
                Ok(Vec::new())
            }
        }

        ExportJob::new(config, Arc::new(NoBackend))
    }

    fn inventory() -> IndexName {
        IndexName::new("inventory").unwrap()
    }

    #[test]
    fn test_default_output_without_upload() {
        let output = job(None).resolve_output(&inventory(), &JobOptions::default(), false, 42);
        assert_eq!(output, PathBuf::from("inventory_data.jsonl"));
    }

    #[test]
    fn test_default_output_when_uploading() {
        let output = job(None).resolve_output(&inventory(), &JobOptions::default(), true, 42);
        assert_eq!(output, PathBuf::from("/var/tmp/dredge/inventory_42.jsonl"));
    }

    #[test]
    fn test_explicit_output_wins() {
        let options = JobOptions {
            output: Some(PathBuf::from("dump.jsonl")),
            ..Default::default()
        };
        let output = job(None).resolve_output(&inventory(), &options, true, 42);
        assert_eq!(output, PathBuf::from("dump.jsonl"));
    }

    #[test]
    fn test_bucket_resolution() {
        assert_eq!(
            job(Some("from-config"))
                .resolve_bucket(&JobOptions::default())
                .unwrap()
                .map(|b| b.to_string()),
            Some("from-config".to_string())
        );

        let options = JobOptions {
            bucket: Some(BucketName::new("from-option").unwrap()),
            ..Default::default()
        };
        assert_eq!(
            job(Some("from-config"))
                .resolve_bucket(&options)
                .unwrap()
                .map(|b| b.to_string()),
            Some("from-option".to_string())
        );

        assert!(job(None).resolve_bucket(&JobOptions::default()).unwrap().is_none());
    }

    #[tokio::test]
    async fn test_missing_index_is_not_found() {
        let dir = tempfile::TempDir::new().unwrap();
        let options = JobOptions {
            output: Some(dir.path().join("out.jsonl")),
            ..Default::default()
        };
        let err = job(None).run(&inventory(), &options).await.unwrap_err();
        assert!(matches!(err, DredgeError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_missing_index_leaves_no_output_directory() {
        let dir = tempfile::TempDir::new().unwrap();
        let options = JobOptions {
            output: Some(dir.path().join("exports").join("out.jsonl")),
            ..Default::default()
        };
        let err = job(None).run(&inventory(), &options).await.unwrap_err();
        assert!(matches!(err, DredgeError::NotFound { .. }));
        assert!(!dir.path().join("exports").exists());
    }
}
