//! Adapter factory
//!
//! Builds the search backend and uploader from configuration so that callers
//! depend only on the traits.

use crate::adapters::search::{OpenSearchBackend, SearchBackend};
use crate::adapters::storage::{ObjectStoreUploader, ObjectUploader};
use crate::config::schema::DredgeConfig;
use crate::domain::Result;
use std::sync::Arc;

/// Create the search backend described by the `[search]` section
///
/// # Errors
///
/// Returns an error if the endpoint is invalid or credentials cannot be
/// resolved.
pub async fn create_search_backend(config: &DredgeConfig) -> Result<Arc<dyn SearchBackend>> {
    tracing::info!(
        endpoint = %config.search.endpoint,
        auth_type = ?config.search.auth_type,
        "Creating OpenSearch backend"
    );
    let backend = OpenSearchBackend::new(&config.search).await?;
    Ok(Arc::new(backend) as Arc<dyn SearchBackend>)
}

/// Create the uploader described by the `[storage]` section
///
/// The bucket region defaults to the search region.
pub fn create_uploader(config: &DredgeConfig) -> Arc<dyn ObjectUploader> {
    tracing::debug!(backend = ?config.storage.backend, "Creating object store uploader");
    Arc::new(ObjectStoreUploader::new(
        &config.storage,
        &config.search.region,
    )) as Arc<dyn ObjectUploader>
}
