//! Search service integration
//!
//! [`SearchBackend`] is the seam the exporter depends on;
//! [`OpenSearchBackend`] implements it for OpenSearch domains and
//! serverless collections.

pub mod client;
pub mod models;
pub mod traits;

pub use client::OpenSearchBackend;
pub use traits::{SearchBackend, SearchResult};
