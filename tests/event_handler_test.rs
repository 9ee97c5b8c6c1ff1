//! Integration tests for the event-driven export entry point

mod common;

use common::InMemoryBackend;
use dredge::adapters::storage::ObjectStoreUploader;
use dredge::config::{DredgeConfig, SearchConfig};
use dredge::core::event::{handle_event, ExportEvent};
use serde_json::Value;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

fn config(output_dir: &Path, bucket: Option<&str>) -> DredgeConfig {
    let mut config = DredgeConfig::new(SearchConfig::new("http://localhost:9200"));
    config.search.retry.max_retries = 0;
    config.export.output_dir = Some(output_dir.to_path_buf());
    config.storage.bucket = bucket.map(str::to_string);
    config
}

fn event(bucket: Option<&str>) -> ExportEvent {
    ExportEvent {
        bucket_name: bucket.map(str::to_string),
        ..Default::default()
    }
}

#[tokio::test]
async fn test_successful_event_returns_object_path() {
    let work = TempDir::new().unwrap();
    let store_root = TempDir::new().unwrap();

    let response = handle_event(
        event(Some("inventory-backups")),
        &config(work.path(), None),
        Arc::new(InMemoryBackend::with_documents(15)),
        Arc::new(ObjectStoreUploader::local(store_root.path())),
    )
    .await;

    assert_eq!(response.status_code, 200);
    let body: Value = serde_json::from_str(&response.body).unwrap();
    assert_eq!(body["message"], "Success");

    let location = body["s3_path"].as_str().unwrap();
    let object = Path::new(location.trim_start_matches("file://"));
    assert!(object.exists());
    assert!(object.starts_with(store_root.path().join("inventory-backups")));
    assert_eq!(std::fs::read_dir(work.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn test_configured_bucket_is_used_when_event_has_none() {
    let work = TempDir::new().unwrap();
    let store_root = TempDir::new().unwrap();

    let response = handle_event(
        event(None),
        &config(work.path(), Some("configured-bucket")),
        Arc::new(InMemoryBackend::with_documents(3)),
        Arc::new(ObjectStoreUploader::local(store_root.path())),
    )
    .await;

    assert!(response.is_success());
    assert!(store_root.path().join("configured-bucket").exists());
}

#[tokio::test]
async fn test_missing_bucket_is_bad_request() {
    let work = TempDir::new().unwrap();
    let backend = Arc::new(InMemoryBackend::with_documents(3));

    let response = handle_event(
        event(None),
        &config(work.path(), None),
        backend.clone(),
        Arc::new(ObjectStoreUploader::local(work.path())),
    )
    .await;

    assert_eq!(response.status_code, 400);
    let body: String = serde_json::from_str(&response.body).unwrap();
    assert!(body.contains("OUTPUT_BUCKET"));
    assert_eq!(backend.request_count(), 0);
}

#[tokio::test]
async fn test_unknown_index_is_not_found() {
    let work = TempDir::new().unwrap();

    let response = handle_event(
        ExportEvent {
            index_name: "orders".to_string(),
            bucket_name: Some("inventory-backups".to_string()),
        },
        &config(work.path(), None),
        Arc::new(InMemoryBackend::with_documents(3)),
        Arc::new(ObjectStoreUploader::local(work.path())),
    )
    .await;

    assert_eq!(response.status_code, 404);
    let body: String = serde_json::from_str(&response.body).unwrap();
    assert!(body.contains("orders"));
}

#[tokio::test]
async fn test_fetch_failure_is_server_error() {
    let work = TempDir::new().unwrap();
    let store_root = TempDir::new().unwrap();

    let response = handle_event(
        event(Some("inventory-backups")),
        &config(work.path(), None),
        Arc::new(InMemoryBackend::with_documents(3000).fail_on(2, usize::MAX)),
        Arc::new(ObjectStoreUploader::local(store_root.path())),
    )
    .await;

    assert_eq!(response.status_code, 500);
    assert!(!store_root.path().join("inventory-backups").exists());
}

#[tokio::test]
async fn test_failed_existence_check_still_exports() {
    let work = TempDir::new().unwrap();
    let store_root = TempDir::new().unwrap();

    let response = handle_event(
        event(Some("inventory-backups")),
        &config(work.path(), None),
        Arc::new(InMemoryBackend::with_documents(4).with_existence_error()),
        Arc::new(ObjectStoreUploader::local(store_root.path())),
    )
    .await;

    assert_eq!(response.status_code, 200);
}
