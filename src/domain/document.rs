//! Page request and result records
//!
//! Types exchanged between the exporter and a search backend.

use crate::domain::cursor::Cursor;
use serde_json::{Map, Value};

/// Default tie-breaking sort key: the document's own identifier
pub const DEFAULT_SORT_FIELD: &str = "_id";

/// One page request of a full-scan export
#[derive(Debug, Clone, PartialEq)]
pub struct PageQuery {
    /// Field sorted ascending; must be unique and stable
    pub sort_field: String,

    /// Resume after this sort tuple (absent on the first request)
    pub cursor: Option<Cursor>,

    /// Maximum number of hits to return
    pub limit: usize,
}

impl PageQuery {
    /// Creates a first-page query
    pub fn first(sort_field: impl Into<String>, limit: usize) -> Self {
        Self {
            sort_field: sort_field.into(),
            cursor: None,
            limit,
        }
    }

    /// Returns the same query positioned after `cursor`
    pub fn after(&self, cursor: Cursor) -> Self {
        Self {
            sort_field: self.sort_field.clone(),
            cursor: Some(cursor),
            limit: self.limit,
        }
    }
}

/// A single record returned by a page request
#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit {
    /// Backend document identifier, when reported
    pub id: Option<String>,

    /// Source payload written to the export
    pub source: Map<String, Value>,

    /// Sort tuple used as the next cursor
    pub sort: Option<Cursor>,
}

impl SearchHit {
    /// Creates a hit with a source payload and sort tuple
    pub fn new(id: impl Into<String>, source: Map<String, Value>, sort: Option<Cursor>) -> Self {
        Self {
            id: Some(id.into()),
            source,
            sort,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_first_page_has_no_cursor() {
        let query = PageQuery::first(DEFAULT_SORT_FIELD, 1000);
        assert_eq!(query.sort_field, "_id");
        assert!(query.cursor.is_none());
        assert_eq!(query.limit, 1000);
    }

    #[test]
    fn test_after_keeps_sort_and_limit() {
        let query = PageQuery::first("_id", 50);
        let cursor = Cursor::new(vec![json!("doc-50")]).unwrap();
        let next = query.after(cursor.clone());

        assert_eq!(next.sort_field, "_id");
        assert_eq!(next.limit, 50);
        assert_eq!(next.cursor, Some(cursor));
    }
}
