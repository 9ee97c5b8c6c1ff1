//! Export result and reporting
//!
//! This module defines the record returned by a finished export run.

use crate::core::export::request::OutputTarget;
use crate::domain::ids::IndexName;
use crate::domain::Cursor;
use chrono::{DateTime, Utc};
use std::time::Duration;

/// How an export run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportStatus {
    /// An empty batch was reached; every page was written
    Completed,
    /// A shutdown signal stopped the run between batches
    Interrupted,
}

impl std::fmt::Display for ExportStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExportStatus::Completed => f.write_str("completed"),
            ExportStatus::Interrupted => f.write_str("interrupted"),
        }
    }
}

/// Result of an export run
#[derive(Debug, Clone)]
pub struct ExportResult {
    /// Exported index
    pub index: IndexName,

    /// Documents in the output, including any resumed prefix
    pub documents_written: u64,

    /// Non-empty batches in the output, including any resumed prefix
    pub batches_fetched: u64,

    /// Document count reported by the service before the scan
    pub advisory_total: Option<u64>,

    /// Where the records were written
    pub output: OutputTarget,

    /// How the run ended
    pub status: ExportStatus,

    /// Wall-clock time of this run
    pub duration: Duration,

    /// When this run started
    pub started_at: DateTime<Utc>,

    /// Cursor after the last written batch
    pub final_cursor: Option<Cursor>,

    /// SHA-256 of the output file (file outputs only)
    pub checksum: Option<String>,

    /// Bytes in the output
    pub bytes_written: u64,
}

impl ExportResult {
    /// Check if every page was exported
    pub fn is_complete(&self) -> bool {
        self.status == ExportStatus::Completed
    }

    /// Advisory total when it disagrees with the written count
    ///
    /// Only meaningful for completed runs; the advisory count is a snapshot
    /// and concurrent writes make a small difference normal.
    pub fn count_mismatch(&self) -> Option<u64> {
        match (self.status, self.advisory_total) {
            (ExportStatus::Completed, Some(total)) if total != self.documents_written => {
                Some(total)
            }
            _ => None,
        }
    }

    /// Documents per second over this run
    pub fn throughput(&self) -> f64 {
        let secs = self.duration.as_secs_f64();
        if secs <= f64::EPSILON {
            return 0.0;
        }
        self.documents_written as f64 / secs
    }

    /// Log the result
    pub fn log_summary(&self) {
        tracing::info!(
            index = %self.index,
            status = %self.status,
            documents_written = self.documents_written,
            batches = self.batches_fetched,
            bytes_written = self.bytes_written,
            output = %self.output,
            duration_secs = self.duration.as_secs(),
            throughput = format!("{:.1} docs/s", self.throughput()),
            "Export finished"
        );

        if let Some(total) = self.count_mismatch() {
            tracing::warn!(
                index = %self.index,
                advisory_total = total,
                documents_written = self.documents_written,
                "Written document count differs from the advisory total"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(status: ExportStatus, written: u64, advisory: Option<u64>) -> ExportResult {
        ExportResult {
            index: IndexName::new("inventory").unwrap(),
            documents_written: written,
            batches_fetched: 1,
            advisory_total: advisory,
            output: OutputTarget::Writer,
            status,
            duration: Duration::from_secs(2),
            started_at: Utc::now(),
            final_cursor: None,
            checksum: None,
            bytes_written: 0,
        }
    }

    #[test]
    fn test_count_mismatch() {
        assert_eq!(
            result(ExportStatus::Completed, 10, Some(12)).count_mismatch(),
            Some(12)
        );
        assert_eq!(
            result(ExportStatus::Completed, 10, Some(10)).count_mismatch(),
            None
        );
        assert_eq!(result(ExportStatus::Completed, 10, None).count_mismatch(), None);
    }

    #[test]
    fn test_interrupted_run_has_no_mismatch() {
        let r = result(ExportStatus::Interrupted, 4, Some(10));
        assert!(!r.is_complete());
        assert_eq!(r.count_mismatch(), None);
    }

    #[test]
    fn test_throughput() {
        assert_eq!(result(ExportStatus::Completed, 100, None).throughput(), 50.0);
    }
}
