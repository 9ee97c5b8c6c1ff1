//! Checkpoint model for tracking export progress
//!
//! A checkpoint is written next to the output file after every batch. It
//! marks incomplete output and carries what a resumed run needs: the byte
//! length of the fully written batches and the cursor after the last one.

use crate::domain::ids::IndexName;
use crate::domain::Cursor;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use uuid::Uuid;

/// Checkpoint status enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CheckpointStatus {
    /// Export was never started
    #[default]
    NotStarted,
    /// Export is in progress (or the process died mid-run)
    InProgress,
    /// Export completed successfully
    Completed,
    /// Export stopped on a shutdown signal
    Interrupted,
    /// Export aborted with an error
    Failed,
}

impl std::fmt::Display for CheckpointStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            CheckpointStatus::NotStarted => "not_started",
            CheckpointStatus::InProgress => "in_progress",
            CheckpointStatus::Completed => "completed",
            CheckpointStatus::Interrupted => "interrupted",
            CheckpointStatus::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// Progress record for one export run
///
/// # Examples
///
/// ```
/// use dredge::core::state::{Checkpoint, CheckpointStatus};
/// use dredge::domain::{Cursor, IndexName};
/// use serde_json::json;
///
/// let index = IndexName::new("inventory").unwrap();
/// let mut checkpoint = Checkpoint::new(index, "inventory_data.jsonl", "_id");
/// checkpoint.mark_started();
/// checkpoint.record_batch(1000, 48_213, Cursor::new(vec![json!("sku-1000")]));
///
/// assert_eq!(checkpoint.status, CheckpointStatus::InProgress);
/// assert!(checkpoint.is_resumable());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Checkpoint {
    /// Identifier of the run that wrote this checkpoint
    pub run_id: Uuid,

    /// Index being exported
    pub index: IndexName,

    /// Output file this checkpoint describes
    pub output: PathBuf,

    /// Sort field used for pagination
    pub sort_field: String,

    /// Run status
    pub status: CheckpointStatus,

    /// Documents written in completed batches
    pub documents_written: u64,

    /// Completed non-empty batches
    pub batches: u64,

    /// Output length covering the completed batches
    pub bytes_written: u64,

    /// Cursor after the last completed batch
    pub cursor: Option<Cursor>,

    /// When the run started
    pub started_at: DateTime<Utc>,

    /// Last time this checkpoint was updated
    pub updated_at: DateTime<Utc>,

    /// When the run reached a terminal state
    pub completed_at: Option<DateTime<Utc>>,

    /// Error message for failed runs
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Checkpoint {
    /// Creates a fresh checkpoint for a new run
    pub fn new(index: IndexName, output: impl Into<PathBuf>, sort_field: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            run_id: Uuid::new_v4(),
            index,
            output: output.into(),
            sort_field: sort_field.into(),
            status: CheckpointStatus::NotStarted,
            documents_written: 0,
            batches: 0,
            bytes_written: 0,
            cursor: None,
            started_at: now,
            updated_at: now,
            completed_at: None,
            error: None,
        }
    }

    /// Whether a later run can continue from this checkpoint
    pub fn is_resumable(&self) -> bool {
        matches!(
            self.status,
            CheckpointStatus::InProgress | CheckpointStatus::Interrupted | CheckpointStatus::Failed
        )
    }

    /// Whether this checkpoint belongs to an export of `index` sorted by `sort_field`
    pub fn matches(&self, index: &IndexName, sort_field: &str) -> bool {
        &self.index == index && self.sort_field == sort_field
    }

    /// Check if the run completed successfully
    pub fn is_completed(&self) -> bool {
        self.status == CheckpointStatus::Completed
    }

    /// Duration of the run if it reached a terminal state
    pub fn duration(&self) -> Option<chrono::Duration> {
        self.completed_at.map(|completed| completed - self.started_at)
    }

    /// Mark the run as started
    pub fn mark_started(&mut self) {
        self.status = CheckpointStatus::InProgress;
        self.completed_at = None;
        self.error = None;
        self.touch();
    }

    /// Mark the run as resumed by a new process
    pub fn mark_resumed(&mut self) {
        self.run_id = Uuid::new_v4();
        self.mark_started();
    }

    /// Record a completed batch
    pub fn record_batch(&mut self, batch_len: u64, bytes_written: u64, cursor: Option<Cursor>) {
        self.documents_written += batch_len;
        self.batches += 1;
        self.bytes_written = bytes_written;
        self.cursor = cursor;
        self.touch();
    }

    /// Mark the run as completed
    pub fn mark_completed(&mut self) {
        self.finish(CheckpointStatus::Completed);
    }

    /// Mark the run as interrupted
    pub fn mark_interrupted(&mut self) {
        self.finish(CheckpointStatus::Interrupted);
    }

    /// Mark the run as failed
    pub fn mark_failed(&mut self, error: impl Into<String>) {
        self.error = Some(error.into());
        self.finish(CheckpointStatus::Failed);
    }

    fn finish(&mut self, status: CheckpointStatus) {
        self.status = status;
        self.completed_at = Some(Utc::now());
        self.touch();
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}
