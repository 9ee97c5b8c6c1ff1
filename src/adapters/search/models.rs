//! OpenSearch response models
//!
//! Only the fields the exporter reads are modelled; everything else in the
//! response is ignored.

use crate::domain::{Cursor, SearchHit};
use serde::Deserialize;
use serde_json::{Map, Value};

/// Body of a `_count` response
#[derive(Debug, Deserialize)]
pub struct CountResponse {
    pub count: u64,
}

/// Body of a `_search` response
#[derive(Debug, Deserialize)]
pub struct SearchResponse {
    pub hits: HitsEnvelope,

    #[serde(default)]
    pub timed_out: bool,
}

/// The `hits` object of a search response
#[derive(Debug, Deserialize)]
pub struct HitsEnvelope {
    #[serde(default)]
    pub hits: Vec<RawHit>,
}

/// One entry of `hits.hits`
#[derive(Debug, Deserialize)]
pub struct RawHit {
    #[serde(rename = "_id", default)]
    pub id: Option<String>,

    #[serde(rename = "_source", default)]
    pub source: Option<Map<String, Value>>,

    #[serde(default)]
    pub sort: Option<Vec<Value>>,
}

impl RawHit {
    /// Converts to a domain hit
    ///
    /// Returns an error message when the hit carries no `_source`, since the
    /// export would otherwise silently write empty records.
    pub fn into_hit(self) -> Result<SearchHit, String> {
        let source = self.source.ok_or_else(|| {
            format!(
                "hit {} has no _source; exports require _source to be enabled",
                self.id.as_deref().unwrap_or("<unknown>")
            )
        })?;

        Ok(SearchHit {
            id: self.id,
            source,
            sort: self.sort.and_then(Cursor::new),
        })
    }
}

/// Error object returned by OpenSearch on failed requests
#[derive(Debug, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

/// Inner error description
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ErrorDetail {
    Structured {
        #[serde(rename = "type")]
        kind: String,
        #[serde(default)]
        reason: Option<String>,
    },
    Message(String),
}

impl ErrorDetail {
    /// Whether the error reports a missing index
    pub fn is_index_not_found(&self) -> bool {
        match self {
            ErrorDetail::Structured { kind, .. } => kind == "index_not_found_exception",
            ErrorDetail::Message(message) => message.contains("index_not_found_exception"),
        }
    }

    /// Human-readable summary
    pub fn summary(&self) -> String {
        match self {
            ErrorDetail::Structured { kind, reason } => match reason {
                Some(reason) => format!("{kind}: {reason}"),
                None => kind.clone(),
            },
            ErrorDetail::Message(message) => message.clone(),
        }
    }
}
