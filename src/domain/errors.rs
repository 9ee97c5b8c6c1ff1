//! Domain error types
//!
//! This module defines the error hierarchy for Dredge. All errors are
//! domain-specific and don't expose third-party client types.

use crate::domain::cursor::Cursor;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Main Dredge error type
///
/// This is the primary error type used throughout the application.
/// Export failures carry a [`FetchFailure`] with enough context to resume.
#[derive(Debug, Error)]
pub enum DredgeError {
    /// Missing or invalid endpoint, credentials or settings
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The requested index does not exist
    #[error("Index not found: {index}")]
    NotFound { index: String },

    /// Search backend errors outside of page fetching
    #[error("Search error: {0}")]
    Search(#[from] SearchError),

    /// A page request failed after the retry budget was exhausted
    #[error("Page fetch failed: {0}")]
    TransientFetch(FetchFailure),

    /// A batch's last record did not carry a usable sort tuple
    #[error("Malformed cursor: {0}")]
    MalformedCursor(FetchFailure),

    /// Post-export transfer failure; the local export is left intact
    #[error("Upload error: {0}")]
    Upload(#[from] UploadError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// Checkpoint persistence errors
    #[error("State management error: {0}")]
    State(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),
}

impl DredgeError {
    /// Returns the export context when the error aborted a running export
    pub fn fetch_failure(&self) -> Option<&FetchFailure> {
        match self {
            DredgeError::TransientFetch(failure) | DredgeError::MalformedCursor(failure) => {
                Some(failure)
            }
            _ => None,
        }
    }

    /// Path of the incomplete output left on disk, if any
    pub fn partial_output(&self) -> Option<&PathBuf> {
        self.fetch_failure()
            .and_then(|failure| failure.partial_output.as_ref())
    }
}

/// Context attached to an export that aborted mid-run
///
/// Carries the index, the failing batch number (1-based), the number of
/// documents already written and the last cursor that was fully persisted.
#[derive(Debug, Clone)]
pub struct FetchFailure {
    /// Index being exported
    pub index: String,

    /// Batch number that failed (1-based)
    pub batch: u64,

    /// Documents written before the failure
    pub documents_written: u64,

    /// Cursor of the last fully written batch
    pub last_cursor: Option<Cursor>,

    /// Incomplete output file kept on disk
    pub partial_output: Option<PathBuf>,

    /// Underlying error message
    pub message: String,
}

impl FetchFailure {
    /// Creates a new fetch failure for the given index and batch
    pub fn new(index: impl Into<String>, batch: u64, message: impl Into<String>) -> Self {
        Self {
            index: index.into(),
            batch,
            documents_written: 0,
            last_cursor: None,
            partial_output: None,
            message: message.into(),
        }
    }

    /// Sets the number of documents written so far
    pub fn with_documents_written(mut self, documents_written: u64) -> Self {
        self.documents_written = documents_written;
        self
    }

    /// Sets the last persisted cursor
    pub fn with_last_cursor(mut self, cursor: Option<Cursor>) -> Self {
        self.last_cursor = cursor;
        self
    }

    /// Sets the partial output location
    pub fn with_partial_output(mut self, path: Option<PathBuf>) -> Self {
        self.partial_output = path;
        self
    }
}

impl fmt::Display for FetchFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "index={}, batch={}, documents_written={}: {}",
            self.index, self.batch, self.documents_written, self.message
        )
    }
}

/// Search backend errors
///
/// Errors that occur when talking to the search service.
#[derive(Debug, Clone, Error)]
pub enum SearchError {
    /// Failed to reach the search service
    #[error("Failed to connect to search service: {0}")]
    ConnectionFailed(String),

    /// Credentials were rejected (401/403)
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    /// Request rate exceeded (429)
    #[error("Request throttled: {0}")]
    Throttled(String),

    /// Server error (5xx)
    #[error("Server error: {status} - {message}")]
    ServerError { status: u16, message: String },

    /// Client error (4xx)
    #[error("Client error: {status} - {message}")]
    ClientError { status: u16, message: String },

    /// Timeout
    #[error("Request timeout: {0}")]
    Timeout(String),

    /// Response body could not be understood
    #[error("Invalid response from server: {0}")]
    InvalidResponse(String),

    /// The request named an index that does not exist
    #[error("Index not found: {0}")]
    IndexNotFound(String),
}

impl SearchError {
    /// Maps an HTTP status and body to the matching error variant
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        match status {
            401 | 403 => SearchError::AuthenticationFailed(message),
            429 => SearchError::Throttled(message),
            500..=599 => SearchError::ServerError { status, message },
            _ => SearchError::ClientError { status, message },
        }
    }

    /// Whether retrying the same request may succeed
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            SearchError::ConnectionFailed(_)
                | SearchError::Throttled(_)
                | SearchError::ServerError { .. }
                | SearchError::Timeout(_)
        )
    }
}

/// Object storage upload errors
#[derive(Debug, Clone, Error)]
pub enum UploadError {
    /// No bucket was configured or supplied
    #[error("No destination bucket provided")]
    MissingBucket,

    /// Object key could not be used by the store
    #[error("Invalid object key: {0}")]
    InvalidKey(String),

    /// Local export file could not be read
    #[error("Failed to read local file: {0}")]
    LocalFile(String),

    /// The object store rejected or failed the transfer
    #[error("Object store error: {0}")]
    Store(String),

    /// Stored object size does not match the local file
    #[error("Uploaded size mismatch: expected {expected} bytes, store reports {actual}")]
    SizeMismatch { expected: u64, actual: u64 },
}

impl From<std::io::Error> for DredgeError {
    fn from(err: std::io::Error) -> Self {
        DredgeError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for DredgeError {
    fn from(err: serde_json::Error) -> Self {
        DredgeError::Serialization(err.to_string())
    }
}

impl From<toml::de::Error> for DredgeError {
    fn from(err: toml::de::Error) -> Self {
        DredgeError::Configuration(format!("TOML parse error: {err}"))
    }
}
