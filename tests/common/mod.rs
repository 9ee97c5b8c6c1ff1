//! Shared fixtures for integration tests
//!
//! [`InMemoryBackend`] serves documents sorted by `_id` the way the search
//! service does for a `search_after` scan, and can inject failures or raise
//! the shutdown signal on chosen page requests.

#![allow(dead_code)]

use async_trait::async_trait;
use dredge::adapters::search::{SearchBackend, SearchResult};
use dredge::domain::{Cursor, IndexName, PageQuery, SearchError, SearchHit};
use fake::faker::internet::en::SafeEmail;
use fake::faker::name::en::Name;
use fake::Fake;
use serde_json::{json, Map, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use tokio::sync::watch;

/// Generates `count` documents with ids `doc-00000`, `doc-00001`, ...
pub fn generate_documents(count: usize) -> Vec<(String, Map<String, Value>)> {
    (0..count)
        .map(|i| {
            let id = format!("doc-{i:05}");
            let name: String = Name().fake();
            let email: String = SafeEmail().fake();
            let qty: u32 = (0..500).fake();
            let mut source = Map::new();
            source.insert("sku".to_string(), json!(format!("SKU-{i}")));
            source.insert("name".to_string(), json!(name));
            source.insert("email".to_string(), json!(email));
            source.insert("qty".to_string(), json!(qty));
            source.insert("id".to_string(), json!(id));
            (id, source)
        })
        .collect()
}

/// Search backend over an in-memory, id-sorted document set
pub struct InMemoryBackend {
    index: String,
    documents: Vec<(String, Map<String, Value>)>,
    advisory_total: Option<u64>,
    existence_error: bool,
    failures: Mutex<Vec<(usize, usize)>>,
    shutdown_after: Mutex<Option<(usize, watch::Sender<bool>)>>,
    requests: AtomicUsize,
    queries: Mutex<Vec<PageQuery>>,
}

impl InMemoryBackend {
    /// Backend holding `documents` under index `inventory`
    pub fn new(documents: Vec<(String, Map<String, Value>)>) -> Self {
        let mut documents = documents;
        documents.sort_by(|a, b| a.0.cmp(&b.0));
        let total = documents.len() as u64;
        Self {
            index: "inventory".to_string(),
            documents,
            advisory_total: Some(total),
            existence_error: false,
            failures: Mutex::new(Vec::new()),
            shutdown_after: Mutex::new(None),
            requests: AtomicUsize::new(0),
            queries: Mutex::new(Vec::new()),
        }
    }

    /// Backend with `count` generated documents
    pub fn with_documents(count: usize) -> Self {
        Self::new(generate_documents(count))
    }

    /// Reports a different advisory total (`None` makes the count fail)
    pub fn with_advisory_total(mut self, total: Option<u64>) -> Self {
        self.advisory_total = total;
        self
    }

    /// Makes the existence check fail the way a serverless collection
    /// refusing `HEAD` does
    pub fn with_existence_error(mut self) -> Self {
        self.existence_error = true;
        self
    }

    /// Fails page requests `request..request + times` (1-based)
    pub fn fail_on(self, request: usize, times: usize) -> Self {
        self.failures
            .lock()
            .unwrap()
            .push((request, request.saturating_add(times)));
        self
    }

    /// Raises `shutdown` after serving page request `request` (1-based)
    pub fn shutdown_after(self, request: usize, shutdown: watch::Sender<bool>) -> Self {
        *self.shutdown_after.lock().unwrap() = Some((request, shutdown));
        self
    }

    /// Page requests received so far
    pub fn request_count(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }

    /// Page queries received so far
    pub fn queries(&self) -> Vec<PageQuery> {
        self.queries.lock().unwrap().clone()
    }

    /// All document ids in sort order
    pub fn ids(&self) -> Vec<String> {
        self.documents.iter().map(|(id, _)| id.clone()).collect()
    }

    fn page(&self, query: &PageQuery) -> SearchResult<Vec<SearchHit>> {
        let after = match &query.cursor {
            Some(cursor) => match cursor.values().first() {
                Some(Value::String(id)) => Some(id.clone()),
                _ => {
                    return Err(SearchError::ClientError {
                        status: 400,
                        message: "search_after must hold the _id".to_string(),
                    })
                }
            },
            None => None,
        };

        Ok(self
            .documents
            .iter()
            .filter(|(id, _)| after.as_ref().map(|a| id > a).unwrap_or(true))
            .take(query.limit)
            .map(|(id, source)| {
                SearchHit::new(id.clone(), source.clone(), Cursor::new(vec![json!(id)]))
            })
            .collect())
    }
}

#[async_trait]
impl SearchBackend for InMemoryBackend {
    fn backend_name(&self) -> &str {
        "in-memory"
    }

    async fn index_exists(&self, index: &IndexName) -> SearchResult<bool> {
        if self.existence_error {
            return Err(SearchError::AuthenticationFailed(
                "403 Forbidden on HEAD".to_string(),
            ));
        }
        Ok(index.as_str() == self.index)
    }

    async fn approximate_count(&self, _index: &IndexName) -> SearchResult<u64> {
        self.advisory_total
            .ok_or_else(|| SearchError::Timeout("count timed out".to_string()))
    }

    async fn search_page(
        &self,
        _index: &IndexName,
        query: &PageQuery,
    ) -> SearchResult<Vec<SearchHit>> {
        let request = self.requests.fetch_add(1, Ordering::SeqCst) + 1;
        self.queries.lock().unwrap().push(query.clone());

        let failing = self
            .failures
            .lock()
            .unwrap()
            .iter()
            .any(|(from, until)| (*from..*until).contains(&request));
        if failing {
            return Err(SearchError::ConnectionFailed(format!(
                "connection reset on request {request}"
            )));
        }

        let page = self.page(query);

        if let Some((after, shutdown)) = self.shutdown_after.lock().unwrap().as_ref() {
            if *after == request {
                let _ = shutdown.send(true);
            }
        }

        page
    }
}

/// Reads a JSON lines file into its `id` fields
pub fn read_ids(path: &std::path::Path) -> Vec<String> {
    std::fs::read_to_string(path)
        .unwrap()
        .lines()
        .map(|line| {
            let value: Value = serde_json::from_str(line).unwrap();
            value["id"].as_str().unwrap().to_string()
        })
        .collect()
}
