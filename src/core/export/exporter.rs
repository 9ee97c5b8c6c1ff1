//! Deep-pagination export loop
//!
//! The [`Exporter`] walks an entire index one page at a time, ordering by a
//! stable key and resuming each request after the sort tuple of the previous
//! page's last hit. Only one page is held in memory at a time.

use crate::adapters::search::SearchBackend;
use crate::core::export::request::{ExportRequest, OutputTarget};
use crate::core::export::retry::RetryPolicy;
use crate::core::export::sink::{JsonLinesSink, RecordSink};
use crate::core::export::summary::{ExportResult, ExportStatus};
use crate::core::state::{Checkpoint, CheckpointStore};
use crate::core::verification::checksum::calculate_file_checksum;
use crate::domain::errors::{DredgeError, FetchFailure, SearchError};
use crate::domain::ids::IndexName;
use crate::domain::{Cursor, PageQuery, Result};
use crate::{log_batch_progress, log_export_start};
use chrono::Utc;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::watch;

/// Progress reported after each written batch
#[derive(Debug, Clone)]
pub struct Progress {
    /// Index being exported
    pub index: IndexName,
    /// Batches written so far
    pub batch: u64,
    /// Documents written so far
    pub documents_written: u64,
    /// Advisory document count, when known
    pub advisory_total: Option<u64>,
}

impl Progress {
    /// Completion percentage against the advisory total
    pub fn percent(&self) -> Option<f64> {
        match self.advisory_total {
            Some(total) if total > 0 => {
                Some((self.documents_written as f64 / total as f64 * 100.0).min(100.0))
            }
            _ => None,
        }
    }
}

/// Receives progress notifications from a running export
pub trait ProgressObserver: Send + Sync {
    /// Called after each batch has been flushed to the output
    fn on_batch(&self, progress: &Progress);
}

/// Exports an index to line-delimited JSON
///
/// # Examples
///
/// ```rust,no_run
/// use dredge::adapters::factory::create_search_backend;
/// use dredge::config::load_config;
/// use dredge::core::export::{ExportRequest, Exporter, OutputTarget};
/// use dredge::domain::IndexName;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = load_config("dredge.toml")?;
/// let backend = create_search_backend(&config).await?;
///
/// let request = ExportRequest::new(
///     IndexName::new("inventory")?,
///     OutputTarget::File("inventory_data.jsonl".into()),
/// );
/// let result = Exporter::new(backend).export_to_file(&request).await?;
/// println!("{} documents", result.documents_written);
/// # Ok(())
/// # }
/// ```
pub struct Exporter {
    backend: Arc<dyn SearchBackend>,
    retry: RetryPolicy,
    checkpointing: bool,
    observer: Option<Arc<dyn ProgressObserver>>,
    shutdown: Option<watch::Receiver<bool>>,
}

/// Per-run bookkeeping shared by file and writer exports
struct RunState {
    documents_written: u64,
    batches: u64,
    cursor: Option<Cursor>,
    checkpoint: Option<Checkpoint>,
    store: Option<CheckpointStore>,
    partial_output: Option<PathBuf>,
}

impl RunState {
    fn detached() -> Self {
        Self {
            documents_written: 0,
            batches: 0,
            cursor: None,
            checkpoint: None,
            store: None,
            partial_output: None,
        }
    }

    fn save_checkpoint(&self) -> Result<()> {
        if let (Some(store), Some(checkpoint)) = (&self.store, &self.checkpoint) {
            store.save(checkpoint)?;
        }
        Ok(())
    }

    fn failure(&self, index: &IndexName, message: impl Into<String>) -> FetchFailure {
        FetchFailure::new(index.as_str(), self.batches + 1, message)
            .with_documents_written(self.documents_written)
            .with_last_cursor(self.cursor.clone())
            .with_partial_output(self.partial_output.clone())
    }
}

impl Exporter {
    /// Creates an exporter with the default retry policy and checkpointing on
    pub fn new(backend: Arc<dyn SearchBackend>) -> Self {
        Self {
            backend,
            retry: RetryPolicy::default(),
            checkpointing: true,
            observer: None,
            shutdown: None,
        }
    }

    /// Sets the retry policy for search requests
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Enables or disables the checkpoint sidecar for file outputs
    pub fn with_checkpointing(mut self, enabled: bool) -> Self {
        self.checkpointing = enabled;
        self
    }

    /// Registers a progress observer
    pub fn with_observer(mut self, observer: Arc<dyn ProgressObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Stops the export between batches once the channel reads `true`
    pub fn with_shutdown(mut self, shutdown: watch::Receiver<bool>) -> Self {
        self.shutdown = Some(shutdown);
        self
    }

    /// Exports into a caller-supplied sink
    ///
    /// No checkpoint is written and `request.resume` is ignored; the caller
    /// owns the destination.
    ///
    /// # Errors
    ///
    /// - [`DredgeError::NotFound`] if the index does not exist
    /// - [`DredgeError::TransientFetch`] if a page request keeps failing
    /// - [`DredgeError::MalformedCursor`] if a page cannot be continued
    pub async fn export<S: RecordSink + ?Sized>(
        &self,
        request: &ExportRequest,
        sink: &mut S,
    ) -> Result<ExportResult> {
        self.ensure_index_exists(&request.index).await?;
        let advisory_total = self.advisory_count(&request.index).await;

        if request.resume {
            tracing::warn!(index = %request.index, "Resume ignored for caller-supplied output");
        }

        let state = RunState::detached();
        self.run(request, sink, advisory_total, state).await
    }

    /// Exports into the file named by `request.output`
    ///
    /// The file is created (or truncated) only after the index is known to
    /// exist. In resume mode a matching checkpoint continues the previous run
    /// instead.
    pub async fn export_to_file(&self, request: &ExportRequest) -> Result<ExportResult> {
        let path = match &request.output {
            OutputTarget::File(path) => path.clone(),
            OutputTarget::Writer => {
                return Err(DredgeError::Validation(
                    "export_to_file requires a file output".to_string(),
                ))
            }
        };

        self.ensure_index_exists(&request.index).await?;
        let advisory_total = self.advisory_count(&request.index).await;

        let (mut sink, state) = self.open_output(request, &path)?;
        self.run(request, &mut sink, advisory_total, state).await
    }

    /// Fails with [`DredgeError::NotFound`] when the backend reports the
    /// index absent
    ///
    /// A failing check (serverless collections may refuse `HEAD` on an
    /// index) is logged and the export goes ahead; a missing index then
    /// surfaces on the first page request.
    async fn ensure_index_exists(&self, index: &IndexName) -> Result<()> {
        match self.retry.run(|| self.backend.index_exists(index)).await {
            Ok(true) => Ok(()),
            Ok(false) => {
                tracing::error!(index = %index, "Index not found");
                Err(DredgeError::NotFound {
                    index: index.to_string(),
                })
            }
            Err(e) => {
                tracing::warn!(
                    index = %index,
                    error = %e,
                    "Index existence check failed, continuing with the export"
                );
                Ok(())
            }
        }
    }

    async fn advisory_count(&self, index: &IndexName) -> Option<u64> {
        match self.retry.run(|| self.backend.approximate_count(index)).await {
            Ok(count) => {
                tracing::info!(index = %index, advisory_total = count, "Resolved document count");
                Some(count)
            }
            Err(e) => {
                tracing::warn!(index = %index, error = %e, "Could not resolve document count");
                None
            }
        }
    }

    fn open_output(
        &self,
        request: &ExportRequest,
        path: &Path,
    ) -> Result<(JsonLinesSink<std::fs::File>, RunState)> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let store = CheckpointStore::for_output(path);

        if request.resume {
            match store.load()? {
                Some(mut checkpoint)
                    if checkpoint.is_resumable()
                        && checkpoint.matches(&request.index, &request.sort_field) =>
                {
                    let sink = JsonLinesSink::resume(path, checkpoint.bytes_written)?;
                    checkpoint.mark_resumed();
                    tracing::info!(
                        index = %request.index,
                        output = %path.display(),
                        documents_written = checkpoint.documents_written,
                        batches = checkpoint.batches,
                        "Resuming export from checkpoint"
                    );

                    let state = RunState {
                        documents_written: checkpoint.documents_written,
                        batches: checkpoint.batches,
                        cursor: checkpoint.cursor.clone(),
                        checkpoint: Some(checkpoint),
                        store: self.checkpointing.then_some(store),
                        partial_output: Some(path.to_path_buf()),
                    };
                    state.save_checkpoint()?;
                    return Ok((sink, state));
                }
                Some(checkpoint) => tracing::warn!(
                    index = %request.index,
                    status = %checkpoint.status,
                    "Checkpoint cannot be resumed, starting a fresh export"
                ),
                None => tracing::info!(
                    index = %request.index,
                    "No checkpoint found, starting a fresh export"
                ),
            }
        }

        let sink = JsonLinesSink::create(path)?;
        let mut checkpoint = Checkpoint::new(request.index.clone(), path, &request.sort_field);
        checkpoint.mark_started();

        let state = RunState {
            checkpoint: Some(checkpoint),
            store: self.checkpointing.then_some(store),
            partial_output: Some(path.to_path_buf()),
            ..RunState::detached()
        };
        state.save_checkpoint()?;
        Ok((sink, state))
    }

    async fn run<S: RecordSink + ?Sized>(
        &self,
        request: &ExportRequest,
        sink: &mut S,
        advisory_total: Option<u64>,
        mut state: RunState,
    ) -> Result<ExportResult> {
        let start = Instant::now();
        let started_at = Utc::now();
        let index = &request.index;
        let base_query = PageQuery::first(&request.sort_field, request.batch_size.get());

        log_export_start!(index, request.batch_size.get(), request.sort_field);

        let status = loop {
            if self.is_cancelled() {
                tracing::info!(
                    index = %index,
                    documents_written = state.documents_written,
                    "Shutdown requested, stopping export"
                );
                break ExportStatus::Interrupted;
            }

            let query = match &state.cursor {
                Some(cursor) => base_query.after(cursor.clone()),
                None => base_query.clone(),
            };

            let hits = match self
                .retry
                .run(|| self.backend.search_page(index, &query))
                .await
            {
                Ok(hits) => hits,
                Err(SearchError::IndexNotFound(message)) => {
                    tracing::error!(index = %index, reason = %message, "Index not found");
                    let error = DredgeError::NotFound {
                        index: index.to_string(),
                    };
                    return Err(self.abort(sink, &mut state, error));
                }
                Err(e) => {
                    let failure = state.failure(index, e.to_string());
                    return Err(self.abort(sink, &mut state, DredgeError::TransientFetch(failure)));
                }
            };

            if hits.is_empty() {
                break ExportStatus::Completed;
            }

            let next = match hits.last().and_then(|hit| hit.sort.clone()) {
                Some(next) => next,
                None => {
                    let failure = state.failure(index, "last hit of the batch has no sort values");
                    return Err(self.abort(sink, &mut state, DredgeError::MalformedCursor(failure)));
                }
            };

            if state.cursor.as_ref() == Some(&next) {
                let failure = state.failure(index, format!("cursor did not advance past {next}"));
                return Err(self.abort(sink, &mut state, DredgeError::MalformedCursor(failure)));
            }
            if let Some(previous) = state.cursor.as_ref().filter(|p| next.precedes(p)) {
                tracing::warn!(
                    index = %index,
                    previous = %previous,
                    next = %next,
                    "Cursor moved backwards; is the sort field unique?"
                );
            }

            if let Err(e) = Self::write_batch(sink, &hits) {
                return Err(self.abort(sink, &mut state, e));
            }

            state.documents_written += hits.len() as u64;
            state.batches += 1;
            state.cursor = Some(next);
            if let Some(checkpoint) = state.checkpoint.as_mut() {
                checkpoint.record_batch(
                    hits.len() as u64,
                    sink.bytes_written(),
                    state.cursor.clone(),
                );
            }
            state.save_checkpoint()?;

            log_batch_progress!(index, state.batches, state.documents_written, advisory_total);
            if let Some(observer) = &self.observer {
                observer.on_batch(&Progress {
                    index: index.clone(),
                    batch: state.batches,
                    documents_written: state.documents_written,
                    advisory_total,
                });
            }
        };

        sink.flush()?;
        if let Some(checkpoint) = state.checkpoint.as_mut() {
            match status {
                ExportStatus::Completed => checkpoint.mark_completed(),
                ExportStatus::Interrupted => checkpoint.mark_interrupted(),
            }
        }
        state.save_checkpoint()?;

        let checksum = match (&state.partial_output, status) {
            (Some(path), ExportStatus::Completed) => Some(calculate_file_checksum(path)?),
            _ => None,
        };

        let result = ExportResult {
            index: index.clone(),
            documents_written: state.documents_written,
            batches_fetched: state.batches,
            advisory_total,
            output: request.output.clone(),
            status,
            duration: start.elapsed(),
            started_at,
            final_cursor: state.cursor,
            checksum,
            bytes_written: sink.bytes_written(),
        };
        result.log_summary();
        Ok(result)
    }

    fn write_batch<S: RecordSink + ?Sized>(
        sink: &mut S,
        hits: &[crate::domain::SearchHit],
    ) -> Result<()> {
        for hit in hits {
            sink.write_record(&hit.source)?;
        }
        sink.flush()
    }

    /// Flushes what was written, flags the checkpoint failed and hands back `error`
    fn abort<S: RecordSink + ?Sized>(
        &self,
        sink: &mut S,
        state: &mut RunState,
        error: DredgeError,
    ) -> DredgeError {
        tracing::error!(
            documents_written = state.documents_written,
            batches = state.batches,
            error = %error,
            "Export aborted"
        );

        if let Err(e) = sink.flush() {
            tracing::warn!(error = %e, "Failed to flush partial output");
        }
        if let Some(checkpoint) = state.checkpoint.as_mut() {
            checkpoint.mark_failed(error.to_string());
        }
        if let Err(e) = state.save_checkpoint() {
            tracing::warn!(error = %e, "Failed to record failed checkpoint");
        }
        error
    }

    fn is_cancelled(&self) -> bool {
        self.shutdown
            .as_ref()
            .map(|rx| *rx.borrow())
            .unwrap_or(false)
    }
}
