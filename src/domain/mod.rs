//! Domain models and types for Dredge.
//!
//! # Overview
//!
//! The domain layer provides:
//! - **Validated names** ([`IndexName`], [`BucketName`])
//! - **Pagination types** ([`Cursor`], [`PageQuery`], [`SearchHit`])
//! - **Error types** ([`DredgeError`], [`SearchError`], [`UploadError`])
//! - **Result type alias** ([`Result`])
//!
//! # Error Handling
//!
//! All fallible operations return [`Result<T, DredgeError>`]:
//!
//! ```rust
//! use dredge::domain::{IndexName, DredgeError, Result};
//!
//! fn parse(name: &str) -> Result<IndexName> {
//!     IndexName::new(name).map_err(DredgeError::Validation)
//! }
//! # assert!(parse("inventory").is_ok());
//! ```

pub mod cursor;
pub mod document;
pub mod errors;
pub mod ids;
pub mod result;

pub use cursor::Cursor;
pub use document::{PageQuery, SearchHit, DEFAULT_SORT_FIELD};
pub use errors::{DredgeError, FetchFailure, SearchError, UploadError};
pub use ids::{BucketName, IndexName};
pub use result::Result;
