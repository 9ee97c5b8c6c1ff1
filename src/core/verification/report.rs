//! Verification report structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Upper bound on line failures kept in a report
pub const MAX_RECORDED_FAILURES: usize = 20;

/// Result of re-reading an exported file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationReport {
    /// File that was verified
    pub path: PathBuf,

    /// When the verification was performed
    pub verified_at: DateTime<Utc>,

    /// Lines read
    pub total_lines: u64,

    /// Lines holding a JSON object
    pub valid_lines: u64,

    /// Lines that are not a JSON object
    pub invalid_lines: u64,

    /// Line count the export reported, if known
    pub expected_lines: Option<u64>,

    /// SHA-256 of the file
    pub checksum: String,

    /// First few failing lines
    pub failures: Vec<VerificationFailure>,

    /// Duration of verification in milliseconds
    pub duration_ms: u64,
}

/// A line that failed verification
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct VerificationFailure {
    /// 1-based line number
    pub line: u64,

    /// Reason for failure
    pub reason: String,
}

impl VerificationReport {
    /// Create an empty report for `path`
    pub fn new(path: impl Into<PathBuf>, expected_lines: Option<u64>) -> Self {
        Self {
            path: path.into(),
            verified_at: Utc::now(),
            total_lines: 0,
            valid_lines: 0,
            invalid_lines: 0,
            expected_lines,
            checksum: String::new(),
            failures: Vec::new(),
            duration_ms: 0,
        }
    }

    /// Record a valid line
    pub fn record_pass(&mut self) {
        self.total_lines += 1;
        self.valid_lines += 1;
    }

    /// Record an invalid line
    pub fn record_failure(&mut self, reason: impl Into<String>) {
        self.total_lines += 1;
        self.invalid_lines += 1;
        if self.failures.len() < MAX_RECORDED_FAILURES {
            self.failures.push(VerificationFailure {
                line: self.total_lines,
                reason: reason.into(),
            });
        }
    }

    /// Whether the line count matches the expected count (true when unknown)
    pub fn count_matches(&self) -> bool {
        self.expected_lines
            .map(|expected| expected == self.total_lines)
            .unwrap_or(true)
    }

    /// Check if the file passed verification
    pub fn is_success(&self) -> bool {
        self.invalid_lines == 0 && self.count_matches()
    }

    /// Format the report as a human-readable string
    pub fn format_summary(&self) -> String {
        let mut summary = String::new();
        summary.push_str("📊 Verification Report\n");
        summary.push_str(&format!("  File: {}\n", self.path.display()));
        summary.push_str(&format!("  Duration: {} ms\n", self.duration_ms));
        summary.push_str(&format!("  Lines: {}\n", self.total_lines));
        if let Some(expected) = self.expected_lines {
            summary.push_str(&format!("  Expected: {}\n", expected));
        }
        summary.push_str(&format!("  ✅ Valid: {}\n", self.valid_lines));
        summary.push_str(&format!("  ❌ Invalid: {}\n", self.invalid_lines));
        summary.push_str(&format!("  SHA-256: {}\n", self.checksum));

        if !self.failures.is_empty() {
            summary.push_str("\n❌ Failures:\n");
            for failure in &self.failures {
                summary.push_str(&format!("  line {}: {}\n", failure.line, failure.reason));
            }
        }

        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_report_is_success() {
        let report = VerificationReport::new("out.jsonl", None);
        assert_eq!(report.total_lines, 0);
        assert!(report.is_success());
    }

    #[test]
    fn test_record_failure() {
        let mut report = VerificationReport::new("out.jsonl", Some(2));
        report.record_pass();
        report.record_failure("not a JSON object");

        assert_eq!(report.total_lines, 2);
        assert_eq!(report.invalid_lines, 1);
        assert_eq!(
            report.failures,
            vec![VerificationFailure {
                line: 2,
                reason: "not a JSON object".to_string()
            }]
        );
        assert!(!report.is_success());
    }

    #[test]
    fn test_count_mismatch_fails() {
        let mut report = VerificationReport::new("out.jsonl", Some(3));
        report.record_pass();
        report.record_pass();
        assert!(!report.count_matches());
        assert!(!report.is_success());
    }

    #[test]
    fn test_failures_are_capped() {
        let mut report = VerificationReport::new("out.jsonl", None);
        for _ in 0..(MAX_RECORDED_FAILURES + 5) {
            report.record_failure("bad");
        }
        assert_eq!(report.failures.len(), MAX_RECORDED_FAILURES);
        assert_eq!(report.invalid_lines as usize, MAX_RECORDED_FAILURES + 5);
    }

    #[test]
    fn test_format_summary() {
        let mut report = VerificationReport::new("out.jsonl", Some(1));
        report.record_pass();
        let summary = report.format_summary();
        assert!(summary.contains("Lines: 1"));
        assert!(summary.contains("Expected: 1"));
    }
}
