//! Export orchestration
//!
//! This module provides the core export logic for Dredge, including:
//! - The cursor-paginated [`Exporter`] loop and its line-delimited JSON sink
//! - Retry with bounded exponential backoff for page requests
//! - The upload handoff of completed files
//! - [`ExportJob`], shared by the CLI and the event handler

pub mod exporter;
pub mod handoff;
pub mod job;
pub mod request;
pub mod retry;
pub mod sink;
pub mod summary;

pub use exporter::{Exporter, Progress, ProgressObserver};
pub use handoff::{object_key, HandoffReceipt, UploadHandoff};
pub use job::{ExportJob, JobOptions, JobOutcome};
pub use request::{ExportRequest, OutputTarget, DEFAULT_BATCH_SIZE};
pub use retry::RetryPolicy;
pub use sink::{JsonLinesSink, RecordSink};
pub use summary::{ExportResult, ExportStatus};
