//! Output file verification
//!
//! Streams an exported file line by line and checks that every line is a
//! JSON object and that the number of lines matches what the export wrote.

use super::report::VerificationReport;
use crate::domain::Result;
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::time::Instant;

/// Verifies an exported line-delimited JSON file
///
/// The checksum is computed over the same bytes that are parsed.
///
/// # Errors
///
/// Returns an I/O error if the file cannot be read. Content problems are
/// reported in the [`VerificationReport`], not as errors.
pub fn verify_output(path: &Path, expected_lines: Option<u64>) -> Result<VerificationReport> {
    let start = Instant::now();
    let mut report = VerificationReport::new(path, expected_lines);
    let mut reader = BufReader::new(File::open(path)?);
    let mut hasher = Sha256::new();
    let mut line = Vec::new();

    loop {
        line.clear();
        let n = reader.read_until(b'\n', &mut line)?;
        if n == 0 {
            break;
        }
        hasher.update(&line);

        if line.last() != Some(&b'\n') {
            report.record_failure("last line is not newline-terminated");
            continue;
        }

        match serde_json::from_slice::<Value>(&line[..line.len() - 1]) {
            Ok(Value::Object(_)) => report.record_pass(),
            Ok(_) => report.record_failure("line is not a JSON object"),
            Err(e) => report.record_failure(format!("invalid JSON: {e}")),
        }
    }

    report.checksum = format!("{:x}", hasher.finalize());
    report.duration_ms = start.elapsed().as_millis() as u64;

    if report.is_success() {
        tracing::info!(
            path = %path.display(),
            lines = report.total_lines,
            "Output verification passed"
        );
    } else {
        tracing::warn!(
            path = %path.display(),
            lines = report.total_lines,
            expected = ?report.expected_lines,
            invalid = report.invalid_lines,
            "Output verification failed"
        );
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::verification::checksum::calculate_checksum_bytes;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn file_with(contents: &[u8]) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_valid_file() {
        let data = b"{\"sku\":\"A1\"}\n{\"sku\":\"B2\",\"qty\":3}\n";
        let file = file_with(data);

        let report = verify_output(file.path(), Some(2)).unwrap();
        assert!(report.is_success());
        assert_eq!(report.valid_lines, 2);
        assert_eq!(report.checksum, calculate_checksum_bytes(data));
    }

    #[test]
    fn test_empty_file() {
        let file = file_with(b"");
        let report = verify_output(file.path(), Some(0)).unwrap();
        assert!(report.is_success());
        assert_eq!(report.total_lines, 0);
    }

    #[test]
    fn test_rejects_non_object_lines() {
        let file = file_with(b"{\"a\":1}\n[1,2]\nnot json\n");
        let report = verify_output(file.path(), None).unwrap();

        assert_eq!(report.valid_lines, 1);
        assert_eq!(report.invalid_lines, 2);
        assert_eq!(report.failures[0].line, 2);
        assert!(!report.is_success());
    }

    #[test]
    fn test_truncated_last_line() {
        let file = file_with(b"{\"a\":1}\n{\"a\":");
        let report = verify_output(file.path(), None).unwrap();
        assert_eq!(report.invalid_lines, 1);
        assert!(report.failures[0].reason.contains("newline"));
    }

    #[test]
    fn test_line_count_mismatch() {
        let file = file_with(b"{\"a\":1}\n");
        let report = verify_output(file.path(), Some(5)).unwrap();
        assert!(!report.is_success());
    }
}
