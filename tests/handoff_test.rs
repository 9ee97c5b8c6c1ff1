//! Integration tests for exporting and handing the file to object storage
//!
//! Uploads go to the local object_store backend under a temporary root,
//! laid out as `<root>/<bucket>/<key>`.

mod common;

use common::{read_ids, InMemoryBackend};
use dredge::adapters::storage::ObjectStoreUploader;
use dredge::config::{DredgeConfig, SearchConfig};
use dredge::core::export::{ExportJob, ExportStatus, JobOptions};
use dredge::core::state::CheckpointStore;
use dredge::domain::errors::DredgeError;
use dredge::domain::{BucketName, IndexName};
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

fn config(output_dir: &Path) -> DredgeConfig {
    let mut config = DredgeConfig::new(SearchConfig::new("http://localhost:9200"));
    config.search.retry.max_retries = 0;
    config.export.batch_size = 7;
    config.export.output_dir = Some(output_dir.to_path_buf());
    config
}

fn upload_options() -> JobOptions {
    JobOptions {
        bucket: Some(BucketName::new("inventory-backups").unwrap()),
        ..Default::default()
    }
}

fn inventory() -> IndexName {
    IndexName::new("inventory").unwrap()
}

#[tokio::test]
async fn test_export_is_uploaded_and_local_copy_removed() {
    let work = TempDir::new().unwrap();
    let store_root = TempDir::new().unwrap();
    let backend = Arc::new(InMemoryBackend::with_documents(30));

    let job = ExportJob::new(config(work.path()), backend.clone())
        .with_uploader(Arc::new(ObjectStoreUploader::local(store_root.path())));
    let outcome = job.run(&inventory(), &upload_options()).await.unwrap();

    assert_eq!(outcome.export.status, ExportStatus::Completed);
    assert_eq!(outcome.export.documents_written, 30);

    let receipt = outcome.upload.expect("upload receipt");
    assert!(receipt.key.starts_with("opensearch-backups/inventory/inventory_"));
    assert!(receipt.key.ends_with(".jsonl"));
    assert!(receipt.local_removed);
    assert_eq!(receipt.size, outcome.export.bytes_written);

    let file_name = receipt.key.rsplit('/').next().unwrap();
    let local = work.path().join(file_name);
    let uploaded = store_root.path().join("inventory-backups").join(&receipt.key);

    assert!(uploaded.exists(), "missing object at {}", uploaded.display());
    assert_eq!(read_ids(&uploaded), backend.ids());
    assert!(!local.exists());
    assert!(!CheckpointStore::for_output(&local).path().exists());
    assert!(receipt.location.starts_with("file://"));
}

#[tokio::test]
async fn test_keep_local_leaves_identical_copy() {
    let work = TempDir::new().unwrap();
    let store_root = TempDir::new().unwrap();
    let output = work.path().join("inventory.jsonl");

    let job = ExportJob::new(
        config(work.path()),
        Arc::new(InMemoryBackend::with_documents(12)),
    )
    .with_uploader(Arc::new(ObjectStoreUploader::local(store_root.path())));
    let options = JobOptions {
        output: Some(output.clone()),
        keep_local: Some(true),
        verify: Some(true),
        ..upload_options()
    };
    let outcome = job.run(&inventory(), &options).await.unwrap();

    let receipt = outcome.upload.unwrap();
    assert!(!receipt.local_removed);
    assert!(outcome.verification.unwrap().is_success());

    let uploaded = store_root.path().join("inventory-backups").join(&receipt.key);
    assert_eq!(
        std::fs::read(&output).unwrap(),
        std::fs::read(&uploaded).unwrap()
    );
}

#[tokio::test]
async fn test_custom_prefix_shapes_key() {
    let work = TempDir::new().unwrap();
    let store_root = TempDir::new().unwrap();
    let mut config = config(work.path());
    config.storage.prefix = "nightly".to_string();

    let job = ExportJob::new(config, Arc::new(InMemoryBackend::with_documents(3)))
        .with_uploader(Arc::new(ObjectStoreUploader::local(store_root.path())));
    let receipt = job
        .run(&inventory(), &upload_options())
        .await
        .unwrap()
        .upload
        .unwrap();

    assert!(receipt.key.starts_with("nightly/inventory/inventory_"));
}

#[tokio::test]
async fn test_failed_export_is_not_uploaded() {
    let work = TempDir::new().unwrap();
    let store_root = TempDir::new().unwrap();
    let output = work.path().join("inventory.jsonl");

    let job = ExportJob::new(
        config(work.path()),
        Arc::new(InMemoryBackend::with_documents(30).fail_on(2, usize::MAX)),
    )
    .with_uploader(Arc::new(ObjectStoreUploader::local(store_root.path())));
    let options = JobOptions {
        output: Some(output.clone()),
        ..upload_options()
    };

    let err = job.run(&inventory(), &options).await.unwrap_err();
    assert!(matches!(err, DredgeError::TransientFetch(_)));
    assert_eq!(read_ids(&output).len(), 7);
    assert!(!store_root.path().join("inventory-backups").exists());
}

#[tokio::test]
async fn test_bucket_without_uploader_is_configuration_error() {
    let work = TempDir::new().unwrap();
    let job = ExportJob::new(
        config(work.path()),
        Arc::new(InMemoryBackend::with_documents(3)),
    );

    let err = job.run(&inventory(), &upload_options()).await.unwrap_err();
    assert!(matches!(err, DredgeError::Configuration(_)));
}
