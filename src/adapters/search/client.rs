//! OpenSearch backend implementation
//!
//! Talks to provisioned OpenSearch domains and OpenSearch Serverless
//! collections through the `opensearch` crate. Serverless collections are
//! signed for the `aoss` service, everything else for `es`.

use super::models::{CountResponse, ErrorResponse, SearchResponse};
use super::traits::{SearchBackend, SearchResult};
use crate::config::schema::{AuthType, SearchConfig};
use crate::domain::errors::{DredgeError, SearchError};
use crate::domain::ids::IndexName;
use crate::domain::{PageQuery, Result, SearchHit};
use async_trait::async_trait;
use opensearch::auth::Credentials;
use opensearch::cert::CertificateValidation;
use opensearch::http::response::Response;
use opensearch::http::transport::{SingleNodeConnectionPool, TransportBuilder};
use opensearch::indices::IndicesExistsParts;
use opensearch::{CountParts, OpenSearch, SearchParts};
use secrecy::ExposeSecret;
use serde_json::{json, Value};
use std::time::Duration;
use url::Url;

/// OpenSearch search backend
///
/// # Example
///
/// ```no_run
/// use dredge::adapters::search::{OpenSearchBackend, SearchBackend};
/// use dredge::config::{AuthType, SearchConfig};
/// use dredge::domain::IndexName;
///
/// # async fn example() -> dredge::domain::Result<()> {
/// let mut config = SearchConfig::new("http://localhost:9200");
/// config.auth_type = AuthType::None;
///
/// let backend = OpenSearchBackend::new(&config).await?;
/// let index = IndexName::new("inventory").map_err(dredge::domain::DredgeError::Validation)?;
/// let exists = backend.index_exists(&index).await?;
/// # Ok(())
/// # }
/// ```
pub struct OpenSearchBackend {
    client: OpenSearch,
    endpoint: Url,
}

impl OpenSearchBackend {
    /// Creates a backend from configuration
    ///
    /// SigV4 credentials are resolved from the default AWS provider chain
    /// (environment, profile, container or instance role).
    ///
    /// # Errors
    ///
    /// Returns [`DredgeError::Configuration`] if the endpoint is invalid,
    /// credentials cannot be resolved or the transport cannot be built.
    pub async fn new(config: &SearchConfig) -> Result<Self> {
        let endpoint = Url::parse(&config.endpoint).map_err(|e| {
            DredgeError::Configuration(format!(
                "Invalid search endpoint '{}': {}",
                config.endpoint, e
            ))
        })?;

        let pool = SingleNodeConnectionPool::new(endpoint.clone());
        let mut builder = TransportBuilder::new(pool)
            .disable_proxy()
            .timeout(Duration::from_secs(config.timeout_seconds));

        match config.auth_type {
            AuthType::Sigv4 => {
                let service = config.signing_service();
                let sdk_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
                    .region(aws_config::Region::new(config.region.clone()))
                    .load()
                    .await;
                let credentials = Credentials::try_from(&sdk_config).map_err(|e| {
                    DredgeError::Configuration(format!("Failed to resolve AWS credentials: {e}"))
                })?;

                tracing::info!(
                    region = %config.region,
                    service = %service,
                    "Using SigV4 request signing"
                );
                builder = builder.auth(credentials).service_name(&service);
            }
            AuthType::Basic => {
                let username = config.username.clone().unwrap_or_default();
                let password = config
                    .password
                    .as_ref()
                    .map(|p| p.expose_secret().to_string())
                    .unwrap_or_default();
                tracing::info!(username = %username, "Using basic authentication");
                builder = builder.auth(Credentials::Basic(username, password));
            }
            AuthType::None => {
                tracing::warn!("No authentication configured for the search service");
            }
        }

        if !config.tls_verify {
            tracing::warn!("TLS certificate verification is disabled for the search service");
            builder = builder.cert_validation(CertificateValidation::None);
        }

        let transport = builder.build().map_err(|e| {
            DredgeError::Configuration(format!("Failed to build search transport: {e}"))
        })?;

        tracing::info!(endpoint = %endpoint, "Created OpenSearch backend");

        Ok(Self {
            client: OpenSearch::new(transport),
            endpoint,
        })
    }

    /// Endpoint this backend talks to
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Request body for one page of a full scan
    pub fn page_body(query: &PageQuery) -> Value {
        let mut body = json!({
            "size": query.limit,
            "query": { "match_all": {} },
            "sort": [ { query.sort_field.as_str(): "asc" } ]
        });
        if let Some(cursor) = &query.cursor {
            body["search_after"] = Value::Array(cursor.values().to_vec());
        }
        body
    }
}

/// Maps a transport failure to a search error
fn transport_error(err: opensearch::Error) -> SearchError {
    if err.is_timeout() {
        SearchError::Timeout(err.to_string())
    } else {
        SearchError::ConnectionFailed(err.to_string())
    }
}

/// Turns a non-success response into a search error, preferring the
/// structured error reason when the body carries one
async fn status_error(response: Response) -> SearchError {
    let status = response.status_code().as_u16();
    let body = response.text().await.unwrap_or_default();
    match serde_json::from_str::<ErrorResponse>(&body) {
        Ok(e) if e.error.is_index_not_found() => SearchError::IndexNotFound(e.error.summary()),
        Ok(e) => SearchError::from_status(status, e.error.summary()),
        Err(_) => SearchError::from_status(status, body),
    }
}

#[async_trait]
impl SearchBackend for OpenSearchBackend {
    fn backend_name(&self) -> &str {
        "opensearch"
    }

    async fn index_exists(&self, index: &IndexName) -> SearchResult<bool> {
        let response = self
            .client
            .indices()
            .exists(IndicesExistsParts::Index(&[index.as_str()]))
            .send()
            .await
            .map_err(transport_error)?;

        match response.status_code().as_u16() {
            200 => Ok(true),
            404 => Ok(false),
            _ => Err(status_error(response).await),
        }
    }

    async fn approximate_count(&self, index: &IndexName) -> SearchResult<u64> {
        let response = self
            .client
            .count(CountParts::Index(&[index.as_str()]))
            .send()
            .await
            .map_err(transport_error)?;

        if !response.status_code().is_success() {
            return Err(status_error(response).await);
        }

        let body: CountResponse = response
            .json()
            .await
            .map_err(|e| SearchError::InvalidResponse(e.to_string()))?;
        Ok(body.count)
    }

    async fn search_page(
        &self,
        index: &IndexName,
        query: &PageQuery,
    ) -> SearchResult<Vec<SearchHit>> {
        tracing::debug!(
            index = %index,
            limit = query.limit,
            cursor = ?query.cursor.as_ref().map(|c| c.to_string()),
            "Requesting page"
        );

        let response = self
            .client
            .search(SearchParts::Index(&[index.as_str()]))
            .body(Self::page_body(query))
            .send()
            .await
            .map_err(transport_error)?;

        if !response.status_code().is_success() {
            return Err(status_error(response).await);
        }

        let body: SearchResponse = response
            .json()
            .await
            .map_err(|e| SearchError::InvalidResponse(e.to_string()))?;

        if body.timed_out {
            return Err(SearchError::Timeout(format!(
                "search on '{index}' timed out on the server"
            )));
        }

        body.hits
            .hits
            .into_iter()
            .map(|raw| raw.into_hit().map_err(SearchError::InvalidResponse))
            .collect()
    }
}
