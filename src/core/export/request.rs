//! Export request definition

use crate::config::schema::MAX_BATCH_SIZE;
use crate::config::ExportConfig;
use crate::domain::errors::DredgeError;
use crate::domain::ids::IndexName;
use crate::domain::Result;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

/// Default number of documents per page request
pub const DEFAULT_BATCH_SIZE: usize = 1000;

/// Where exported records go
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputTarget {
    /// A file created (or resumed) by the exporter
    File(PathBuf),
    /// A writer supplied by the caller
    Writer,
}

impl OutputTarget {
    /// File path, when the output is a file
    pub fn path(&self) -> Option<&Path> {
        match self {
            OutputTarget::File(path) => Some(path),
            OutputTarget::Writer => None,
        }
    }
}

impl std::fmt::Display for OutputTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputTarget::File(path) => write!(f, "{}", path.display()),
            OutputTarget::Writer => f.write_str("<writer>"),
        }
    }
}

/// Parameters of one export run
///
/// # Examples
///
/// ```
/// use dredge::core::export::{ExportRequest, OutputTarget};
/// use dredge::domain::IndexName;
///
/// let request = ExportRequest::new(
///     IndexName::new("inventory").unwrap(),
///     OutputTarget::File("inventory_data.jsonl".into()),
/// )
/// .with_batch_size(500)
/// .unwrap();
///
/// assert_eq!(request.batch_size.get(), 500);
/// assert_eq!(request.sort_field, "_id");
/// ```
#[derive(Debug, Clone)]
pub struct ExportRequest {
    /// Index to export
    pub index: IndexName,

    /// Output destination
    pub output: OutputTarget,

    /// Documents per page request
    pub batch_size: NonZeroUsize,

    /// Field the pages are sorted by
    pub sort_field: String,

    /// Continue from an existing checkpoint instead of truncating
    pub resume: bool,
}

impl ExportRequest {
    /// Creates a request with default batch size and sort field
    pub fn new(index: IndexName, output: OutputTarget) -> Self {
        Self {
            index,
            output,
            batch_size: NonZeroUsize::new(DEFAULT_BATCH_SIZE).unwrap_or(NonZeroUsize::MIN),
            sort_field: crate::domain::DEFAULT_SORT_FIELD.to_string(),
            resume: false,
        }
    }

    /// Creates a request using the `[export]` settings
    pub fn from_config(index: IndexName, output: OutputTarget, config: &ExportConfig) -> Result<Self> {
        Self::new(index, output)
            .with_batch_size(config.batch_size)?
            .with_sort_field(config.sort_field.clone())
    }

    /// Sets the batch size
    ///
    /// # Errors
    ///
    /// Returns a validation error for zero or sizes above the search
    /// service's result window.
    pub fn with_batch_size(mut self, batch_size: usize) -> Result<Self> {
        if batch_size > MAX_BATCH_SIZE {
            return Err(DredgeError::Validation(format!(
                "batch_size must be <= {MAX_BATCH_SIZE}, got {batch_size}"
            )));
        }
        self.batch_size = NonZeroUsize::new(batch_size)
            .ok_or_else(|| DredgeError::Validation("batch_size must be > 0".to_string()))?;
        Ok(self)
    }

    /// Sets the sort field
    pub fn with_sort_field(mut self, sort_field: impl Into<String>) -> Result<Self> {
        let sort_field = sort_field.into();
        if sort_field.trim().is_empty() {
            return Err(DredgeError::Validation(
                "sort_field cannot be empty".to_string(),
            ));
        }
        self.sort_field = sort_field;
        Ok(self)
    }

    /// Enables or disables resume mode
    pub fn with_resume(mut self, resume: bool) -> Self {
        self.resume = resume;
        self
    }
}
