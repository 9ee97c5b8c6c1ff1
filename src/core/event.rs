//! Event-driven export entry point
//!
//! Accepts `{ "index_name": .., "bucket_name": .. }`, runs a full export
//! with upload and answers with an HTTP-style `{ "statusCode", "body" }`
//! document. The body is itself a JSON-encoded string.

use crate::adapters::factory::{create_search_backend, create_uploader};
use crate::adapters::search::SearchBackend;
use crate::adapters::storage::ObjectUploader;
use crate::config::DredgeConfig;
use crate::core::export::{ExportJob, JobOptions};
use crate::domain::errors::DredgeError;
use crate::domain::ids::{BucketName, IndexName};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;

/// Index exported when the event names none
pub const DEFAULT_EVENT_INDEX: &str = "inventory";

fn default_index_name() -> String {
    DEFAULT_EVENT_INDEX.to_string()
}

/// Incoming export event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportEvent {
    /// Index to export
    #[serde(default = "default_index_name")]
    pub index_name: String,

    /// Destination bucket; `storage.bucket` is used when absent
    #[serde(default)]
    pub bucket_name: Option<String>,
}

impl Default for ExportEvent {
    fn default() -> Self {
        Self {
            index_name: default_index_name(),
            bucket_name: None,
        }
    }
}

/// Response to an export event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventResponse {
    /// HTTP-style status code
    #[serde(rename = "statusCode")]
    pub status_code: u16,

    /// JSON-encoded body
    pub body: String,
}

impl EventResponse {
    fn new(status_code: u16, body: &Value) -> Self {
        Self {
            status_code,
            body: body.to_string(),
        }
    }

    /// Error response carrying `message` as a JSON string
    pub fn error(status_code: u16, message: impl Into<String>) -> Self {
        Self::new(status_code, &Value::String(message.into()))
    }

    /// Success response pointing at the uploaded object
    pub fn success(location: &str) -> Self {
        Self::new(200, &json!({ "message": "Success", "s3_path": location }))
    }

    /// Whether the export and upload succeeded
    pub fn is_success(&self) -> bool {
        self.status_code == 200
    }
}

/// Builds the collaborators from `config` and handles `event`
///
/// Failure to construct the search client is answered with 500.
pub async fn handle_event_with_config(event: ExportEvent, config: &DredgeConfig) -> EventResponse {
    let backend = match create_search_backend(config).await {
        Ok(backend) => backend,
        Err(e) => {
            tracing::error!(error = %e, "Failed to create search client");
            return EventResponse::error(500, e.to_string());
        }
    };
    handle_event(event, config, backend, create_uploader(config)).await
}

/// Runs the export described by `event` and uploads the result
///
/// | Status | When |
/// |--------|------|
/// | 400 | no bucket in the event or configuration, or an invalid name |
/// | 404 | the index does not exist |
/// | 500 | any other export or upload failure |
/// | 200 | the file was uploaded |
pub async fn handle_event(
    event: ExportEvent,
    config: &DredgeConfig,
    backend: Arc<dyn SearchBackend>,
    uploader: Arc<dyn ObjectUploader>,
) -> EventResponse {
    tracing::info!(index = %event.index_name, bucket = ?event.bucket_name, "Handling export event");

    let bucket = match event.bucket_name.clone().or_else(|| config.storage.bucket.clone()) {
        Some(bucket) => bucket,
        None => {
            return EventResponse::error(
                400,
                "Error: OUTPUT_BUCKET not set and not provided in event.",
            )
        }
    };
    let bucket = match BucketName::new(bucket) {
        Ok(bucket) => bucket,
        Err(e) => return EventResponse::error(400, format!("Error: {e}")),
    };
    let index = match IndexName::new(event.index_name.clone()) {
        Ok(index) => index,
        Err(e) => return EventResponse::error(400, format!("Error: {e}")),
    };

    let options = JobOptions {
        bucket: Some(bucket),
        ..Default::default()
    };
    let job = ExportJob::new(config.clone(), backend).with_uploader(uploader);

    match job.run(&index, &options).await {
        Ok(outcome) => match outcome.upload {
            Some(receipt) => EventResponse::success(&receipt.location),
            None => EventResponse::error(
                500,
                format!("Export of '{index}' ended with status {}", outcome.export.status),
            ),
        },
        Err(DredgeError::NotFound { index }) => {
            EventResponse::error(404, format!("Index '{index}' not found."))
        }
        Err(e) => {
            tracing::error!(index = %index, error = %e, "Export event failed");
            EventResponse::error(500, e.to_string())
        }
    }
}
