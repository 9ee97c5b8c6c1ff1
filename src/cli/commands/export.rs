//! Export command implementation
//!
//! This module implements the `export` command for dumping an index to a
//! line-delimited JSON file and optionally uploading it.

use crate::adapters::factory::{create_search_backend, create_uploader};
use crate::config::load_config_or_env;
use crate::core::export::{ExportJob, ExportStatus, JobOptions, Progress, ProgressObserver};
use crate::domain::errors::{DredgeError, SearchError};
use crate::domain::ids::{BucketName, IndexName};
use clap::Args;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::watch;

/// Arguments for the export command
#[derive(Args, Debug)]
pub struct ExportArgs {
    /// Index to export
    #[arg(default_value = "inventory")]
    pub index: String,

    /// Output file (default: ./<index>_data.jsonl, or a temp file when uploading)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Upload the finished file to this bucket
    #[arg(short, long)]
    pub bucket: Option<String>,

    /// Documents per page request
    #[arg(long)]
    pub batch_size: Option<usize>,

    /// Field to sort and paginate by
    #[arg(long)]
    pub sort_field: Option<String>,

    /// Continue an interrupted or failed export from its checkpoint
    #[arg(long)]
    pub resume: bool,

    /// Keep the local file after a confirmed upload
    #[arg(long)]
    pub keep_local: bool,

    /// Re-read the output and check every line after the export
    #[arg(long)]
    pub verify: bool,
}

/// Prints a single updating progress line to stdout
#[derive(Debug, Default)]
struct ConsoleProgress;

impl ConsoleProgress {
    fn line(progress: &Progress) -> String {
        match (progress.advisory_total, progress.percent()) {
            (Some(total), Some(percent)) => format!(
                "   Exporting... {}/{} ({percent:.1}%)",
                progress.documents_written, total
            ),
            _ => format!("   Exporting... {}", progress.documents_written),
        }
    }
}

impl ProgressObserver for ConsoleProgress {
    fn on_batch(&self, progress: &Progress) {
        print!("\r{}", Self::line(progress));
        let _ = std::io::stdout().flush();
    }
}

/// Maps an export error to the process exit code
///
/// 1 partial success, 2 configuration, 3 index not found, 4 connection,
/// 5 fatal.
pub fn exit_code(error: &DredgeError) -> i32 {
    match error {
        DredgeError::Configuration(_) => 2,
        DredgeError::NotFound { .. } => 3,
        DredgeError::TransientFetch(_) => 4,
        DredgeError::Search(
            SearchError::ConnectionFailed(_)
            | SearchError::AuthenticationFailed(_)
            | SearchError::Timeout(_)
            | SearchError::Throttled(_),
        ) => 4,
        DredgeError::Upload(_) | DredgeError::Validation(_) => 1,
        _ => 5,
    }
}

impl ExportArgs {
    fn job_options(&self) -> Result<JobOptions, String> {
        let bucket = self
            .bucket
            .as_deref()
            .map(BucketName::new)
            .transpose()?;

        Ok(JobOptions {
            output: self.output.clone(),
            bucket,
            batch_size: self.batch_size,
            sort_field: self.sort_field.clone(),
            resume: self.resume,
            keep_local: self.keep_local.then_some(true),
            verify: self.verify.then_some(true),
        })
    }

    /// Execute the export command
    pub async fn execute(
        &self,
        config_path: &str,
        shutdown_signal: watch::Receiver<bool>,
    ) -> anyhow::Result<i32> {
        tracing::info!(index = %self.index, "Starting export command");

        let config = match load_config_or_env(config_path) {
            Ok(c) => c,
            Err(e) => {
                tracing::error!(error = %e, "Configuration loading failed");
                eprintln!("❌ Configuration error: {e}");
                return Ok(2);
            }
        };

        let index = match IndexName::new(self.index.as_str()) {
            Ok(index) => index,
            Err(e) => {
                eprintln!("❌ {e}");
                return Ok(2);
            }
        };

        let options = match self.job_options() {
            Ok(options) => options,
            Err(e) => {
                eprintln!("❌ {e}");
                return Ok(2);
            }
        };

        let backend = match create_search_backend(&config).await {
            Ok(backend) => backend,
            Err(e) => {
                tracing::error!(error = %e, "Failed to create search client");
                eprintln!("❌ Failed to initialize search client: {e}");
                return Ok(4);
            }
        };
        let uploader = create_uploader(&config);

        let job = ExportJob::new(config, backend)
            .with_uploader(uploader)
            .with_shutdown(shutdown_signal)
            .with_observer(Arc::new(ConsoleProgress));

        println!("🚀 Exporting index '{index}'...");

        let outcome = match job.run(&index, &options).await {
            Ok(outcome) => outcome,
            Err(e) => {
                println!();
                tracing::error!(error = %e, "Export failed");
                match &e {
                    DredgeError::NotFound { index } => {
                        eprintln!("❌ Index '{index}' not found.");
                    }
                    _ => eprintln!("❌ Export failed: {e}"),
                }
                if let Some(failure) = e.fetch_failure() {
                    eprintln!(
                        "   Stopped at batch {} after {} documents",
                        failure.batch, failure.documents_written
                    );
                }
                if let Some(path) = e.partial_output() {
                    eprintln!("   Partial output kept at {}", path.display());
                    eprintln!("   Re-run with --resume to continue.");
                }
                return Ok(exit_code(&e));
            }
        };

        let export = &outcome.export;
        println!();
        println!("📊 Export Summary:");
        println!("  Index: {}", export.index);
        println!("  Documents: {}", export.documents_written);
        if let Some(total) = export.advisory_total {
            println!("  Advisory total: {total}");
        }
        println!("  Batches: {}", export.batches_fetched);
        println!("  Bytes: {}", export.bytes_written);
        println!("  Output: {}", export.output);
        println!("  Duration: {:.2}s", export.duration.as_secs_f64());
        if let Some(checksum) = &export.checksum {
            println!("  SHA-256: {checksum}");
        }
        println!();

        if export.status == ExportStatus::Interrupted {
            println!("⚠️  Export interrupted gracefully. Progress saved.");
            println!("   Run the same command with --resume to continue.");
            tracing::info!("Export interrupted by user signal");
            return Ok(130);
        }

        if let Some(total) = export.count_mismatch() {
            println!(
                "⚠️  Wrote {} documents but the index reported {total}",
                export.documents_written
            );
        }

        if let Some(report) = &outcome.verification {
            println!("{}", report.format_summary());
        }

        if let Some(upload) = &outcome.upload {
            println!("✅ Uploaded to {}", upload.location);
            if upload.local_removed {
                println!("   Local copy removed.");
            }
        } else {
            println!("✅ Export completed successfully!");
        }

        Ok(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::errors::{FetchFailure, UploadError};

    fn args() -> ExportArgs {
        ExportArgs {
            index: "inventory".to_string(),
            output: None,
            bucket: None,
            batch_size: None,
            sort_field: None,
            resume: false,
            keep_local: false,
            verify: false,
        }
    }

    #[test]
    fn test_job_options_defaults_defer_to_config() {
        let options = args().job_options().unwrap();
        assert!(options.bucket.is_none());
        assert!(options.keep_local.is_none());
        assert!(options.verify.is_none());
        assert!(!options.resume);
    }

    #[test]
    fn test_job_options_with_overrides() {
        let options = ExportArgs {
            bucket: Some("backups".to_string()),
            batch_size: Some(250),
            keep_local: true,
            resume: true,
            ..args()
        }
        .job_options()
        .unwrap();

        assert_eq!(options.bucket.unwrap().as_str(), "backups");
        assert_eq!(options.batch_size, Some(250));
        assert_eq!(options.keep_local, Some(true));
        assert!(options.resume);
    }

    #[test]
    fn test_invalid_bucket_rejected() {
        let result = ExportArgs {
            bucket: Some("Not_A_Bucket".to_string()),
            ..args()
        }
        .job_options();
        assert!(result.is_err());
    }

    #[test]
    fn test_progress_line() {
        let progress = Progress {
            index: IndexName::new("inventory").unwrap(),
            batch: 3,
            documents_written: 300,
            advisory_total: Some(1200),
        };
        assert_eq!(
            ConsoleProgress::line(&progress),
            "   Exporting... 300/1200 (25.0%)"
        );

        let unknown = Progress {
            advisory_total: None,
            ..progress.clone()
        };
        assert_eq!(ConsoleProgress::line(&unknown), "   Exporting... 300");

        let empty_index = Progress {
            advisory_total: Some(0),
            ..progress
        };
        assert_eq!(ConsoleProgress::line(&empty_index), "   Exporting... 300");
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(exit_code(&DredgeError::Configuration("x".into())), 2);
        assert_eq!(
            exit_code(&DredgeError::NotFound {
                index: "x".into()
            }),
            3
        );
        assert_eq!(
            exit_code(&DredgeError::TransientFetch(FetchFailure::new("x", 3, "reset"))),
            4
        );
        assert_eq!(exit_code(&DredgeError::Upload(UploadError::MissingBucket)), 1);
        assert_eq!(
            exit_code(&DredgeError::MalformedCursor(FetchFailure::new("x", 1, "no sort"))),
            5
        );
    }
}
