//! Logging and observability
//!
//! Structured `tracing` output with:
//! - Human-readable or JSON console logs on stderr
//! - Configurable log levels (`RUST_LOG` wins when set)
//! - Optional local JSON log files with rotation
//!
//! # Example
//!
//! ```no_run
//! use dredge::logging::init_logging;
//! use dredge::config::LoggingConfig;
//!
//! let config = LoggingConfig::default();
//! let _guard = init_logging("info", &config).expect("Failed to initialize logging");
//!
//! tracing::info!(index = "inventory", "Export requested");
//! ```

pub mod structured;

pub use structured::{init_logging, LoggingGuard};

/// Log the start of an export
///
/// # Example
///
/// ```no_run
/// use dredge::log_export_start;
///
/// log_export_start!("inventory", 1000, "_id");
/// ```
#[macro_export]
macro_rules! log_export_start {
    ($index:expr, $batch_size:expr, $sort_field:expr) => {
        tracing::info!(
            index = %$index,
            batch_size = $batch_size,
            sort_field = %$sort_field,
            "Starting export"
        );
    };
}

/// Log progress after a batch has been written
///
/// The advisory total is an `Option<u64>`; a percentage is only logged when
/// it is known and non-zero.
///
/// # Example
///
/// ```no_run
/// use dredge::log_batch_progress;
///
/// log_batch_progress!("inventory", 3, 3000, Some(10_000u64));
/// ```
#[macro_export]
macro_rules! log_batch_progress {
    ($index:expr, $batch:expr, $written:expr, $total:expr) => {
        match $total {
            Some(total) if total > 0 => tracing::debug!(
                index = %$index,
                batch = $batch,
                documents_written = $written,
                advisory_total = total,
                progress_pct = ($written as f64 / total as f64 * 100.0),
                "Batch written"
            ),
            _ => tracing::debug!(
                index = %$index,
                batch = $batch,
                documents_written = $written,
                "Batch written"
            ),
        }
    };
}

/// Log a retry attempt
///
/// # Example
///
/// ```no_run
/// use dredge::log_retry_attempt;
///
/// log_retry_attempt!(2, 3, 400u64, "Connection timeout");
/// ```
#[macro_export]
macro_rules! log_retry_attempt {
    ($attempt:expr, $max_attempts:expr, $delay_ms:expr, $reason:expr) => {
        tracing::warn!(
            attempt = $attempt,
            max_attempts = $max_attempts,
            delay_ms = $delay_ms,
            reason = %$reason,
            "Retrying request"
        );
    };
}
