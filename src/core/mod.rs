//! Core business logic for Dredge.
//!
//! # Modules
//!
//! - [`export`] - Cursor-paginated export, upload handoff and job orchestration
//! - [`state`] - Checkpoint sidecars for incomplete and resumable exports
//! - [`verification`] - Output checksums and line-level verification
//! - [`event`] - Event-driven entry point returning status-coded responses
//!
//! # Export Workflow
//!
//! 1. **Check**: Confirm the index exists before any output is opened
//! 2. **Count**: Fetch the advisory document count for progress reporting
//! 3. **Page**: Request sorted batches, continuing after the last sort tuple
//! 4. **Write**: Append each batch as JSON lines and checkpoint it
//! 5. **Verify** (optional): Re-read the file and compare line counts
//! 6. **Upload** (optional): Hand the file to object storage
//!
//! # Example
//!
//! ```rust,no_run
//! use dredge::adapters::factory::{create_search_backend, create_uploader};
//! use dredge::config::load_config;
//! use dredge::core::export::{ExportJob, JobOptions};
//! use dredge::domain::IndexName;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("dredge.toml")?;
//! let backend = create_search_backend(&config).await?;
//! let uploader = create_uploader(&config);
//!
//! let (_shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
//! let job = ExportJob::new(config, backend)
//!     .with_uploader(uploader)
//!     .with_shutdown(shutdown_rx);
//!
//! let outcome = job.run(&IndexName::new("inventory")?, &JobOptions::default()).await?;
//! println!("Exported: {}", outcome.export.documents_written);
//! # Ok(())
//! # }
//! ```

pub mod event;
pub mod export;
pub mod state;
pub mod verification;
