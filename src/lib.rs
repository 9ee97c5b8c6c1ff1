// Dredge - OpenSearch export tool
// Copyright (c) 2025 Dredge Contributors
// Licensed under the MIT License

//! # Dredge - OpenSearch index export
//!
//! Dredge dumps every document of an OpenSearch index (managed domain or
//! serverless collection) to a line-delimited JSON file and can hand the
//! finished file to S3 or an S3-compatible object store.
//!
//! ## Overview
//!
//! - **Paging** through the whole index with `search_after`, one bounded batch
//!   at a time, ordered by a unique sort key
//! - **Writing** each document's `_source` as one compact JSON line
//! - **Checkpointing** after every batch so interrupted runs can resume
//! - **Uploading** completed files under a timestamped object key
//!
//! ## Architecture
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`core`] - Export loop, checkpoints, verification, event handling
//! - [`adapters`] - Search service and object storage integrations
//! - [`domain`] - Core domain types and errors
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use dredge::adapters::factory::create_search_backend;
//! use dredge::config::load_config;
//! use dredge::core::export::{ExportRequest, Exporter, OutputTarget};
//! use dredge::domain::IndexName;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = load_config("dredge.toml")?;
//!     let backend = create_search_backend(&config).await?;
//!
//!     let request = ExportRequest::new(
//!         IndexName::new("inventory")?,
//!         OutputTarget::File("inventory_data.jsonl".into()),
//!     );
//!     let result = Exporter::new(backend).export_to_file(&request).await?;
//!
//!     println!("Exported {} documents", result.documents_written);
//!     Ok(())
//! }
//! ```
//!
//! ## Error Handling
//!
//! All library errors are [`domain::DredgeError`]. Errors that abort a
//! running export carry a [`domain::FetchFailure`] with the failing batch,
//! the documents already written and the last persisted cursor:
//!
//! ```rust,no_run
//! use dredge::domain::DredgeError;
//!
//! fn report(err: &DredgeError) {
//!     if let Some(failure) = err.fetch_failure() {
//!         eprintln!("stopped at batch {} after {} documents", failure.batch, failure.documents_written);
//!     }
//! }
//! ```

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod logging;
