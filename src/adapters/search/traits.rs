//! Search backend abstraction
//!
//! The exporter only needs three capabilities from a search service: an
//! existence check, an advisory document count and a single sorted page
//! request. Anything that provides them can be exported.

use crate::domain::errors::SearchError;
use crate::domain::ids::IndexName;
use crate::domain::{PageQuery, SearchHit};
use async_trait::async_trait;

/// Result type for search backend calls
pub type SearchResult<T> = std::result::Result<T, SearchError>;

/// Search backend trait for cursor-paginated full scans
///
/// Implementations must return hits sorted ascending by
/// `query.sort_field`, strictly after `query.cursor` when one is given, and
/// at most `query.limit` of them. Each hit carries its sort tuple.
#[async_trait]
pub trait SearchBackend: Send + Sync {
    /// Short name for log output
    fn backend_name(&self) -> &str;

    /// Whether the index exists
    ///
    /// # Errors
    ///
    /// Returns an error if the service cannot be reached or rejects the request.
    async fn index_exists(&self, index: &IndexName) -> SearchResult<bool>;

    /// Document count as reported by the service
    ///
    /// Advisory only; it may lag behind the documents a scan returns.
    async fn approximate_count(&self, index: &IndexName) -> SearchResult<u64>;

    /// Requests one page of a `match_all` scan
    ///
    /// # Errors
    ///
    /// Returns an error for transport failures, non-success statuses and
    /// responses that cannot be parsed.
    async fn search_page(&self, index: &IndexName, query: &PageQuery)
        -> SearchResult<Vec<SearchHit>>;
}
