//! Configuration schema types
//!
//! This module defines the configuration structure for Dredge. Every section
//! except `[search]` may be omitted from the TOML file.

use crate::config::SecretString;
use crate::domain::ids::BucketName;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;

/// Largest page size the exporter will request
pub const MAX_BATCH_SIZE: usize = 10_000;

/// Runtime environment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Development environment
    #[default]
    Development,
    /// Staging environment
    Staging,
    /// Production environment
    Production,
}

/// How requests to the search service are authenticated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AuthType {
    /// AWS SigV4 request signing from the default credential chain
    #[default]
    Sigv4,
    /// HTTP basic authentication
    Basic,
    /// No authentication (local clusters, test servers)
    None,
}

/// Object storage backend used for the upload handoff
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// Amazon S3 or an S3-compatible endpoint
    #[default]
    S3,
    /// Directory on the local filesystem, one subdirectory per bucket
    Local,
}

impl FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "development" => Ok(Environment::Development),
            "staging" => Ok(Environment::Staging),
            "production" => Ok(Environment::Production),
            other => Err(format!(
                "Invalid environment '{other}'. Must be one of: development, staging, production"
            )),
        }
    }
}

impl FromStr for AuthType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sigv4" => Ok(AuthType::Sigv4),
            "basic" => Ok(AuthType::Basic),
            "none" => Ok(AuthType::None),
            other => Err(format!(
                "Invalid auth_type '{other}'. Must be one of: sigv4, basic, none"
            )),
        }
    }
}

impl FromStr for StorageBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "s3" => Ok(StorageBackend::S3),
            "local" => Ok(StorageBackend::Local),
            other => Err(format!(
                "Invalid storage backend '{other}'. Must be one of: s3, local"
            )),
        }
    }
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Environment::Development => "development",
            Environment::Staging => "staging",
            Environment::Production => "production",
        })
    }
}

impl std::fmt::Display for AuthType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            AuthType::Sigv4 => "sigv4",
            AuthType::Basic => "basic",
            AuthType::None => "none",
        })
    }
}

impl std::fmt::Display for StorageBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            StorageBackend::S3 => "s3",
            StorageBackend::Local => "local",
        })
    }
}

/// Main Dredge configuration
///
/// This is the root configuration structure that maps to the TOML file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DredgeConfig {
    /// Application-level settings
    #[serde(default)]
    pub application: ApplicationConfig,

    /// Search service connection
    pub search: SearchConfig,

    /// Export settings
    #[serde(default)]
    pub export: ExportConfig,

    /// Upload handoff settings
    #[serde(default)]
    pub storage: StorageConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl DredgeConfig {
    /// Creates a configuration with defaults for everything but the search connection
    pub fn new(search: SearchConfig) -> Self {
        Self {
            application: ApplicationConfig::default(),
            search,
            export: ExportConfig::default(),
            storage: StorageConfig::default(),
            logging: LoggingConfig::default(),
        }
    }

    /// Validates the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid
    pub fn validate(&self) -> Result<(), String> {
        self.application.validate()?;
        self.search.validate(&self.application.environment)?;
        self.export.validate()?;
        self.storage.validate()?;
        self.logging.validate()?;
        Ok(())
    }
}

/// Application-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Runtime environment (development, staging, production)
    #[serde(default)]
    pub environment: Environment,
}

impl ApplicationConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.log_level.as_str()) {
            return Err(format!(
                "Invalid log_level '{}'. Must be one of: {}",
                self.log_level,
                valid_levels.join(", ")
            ));
        }
        Ok(())
    }
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            environment: Environment::default(),
        }
    }
}

/// Retry configuration for page requests
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum number of retry attempts after the first request
    #[serde(default = "default_max_retries")]
    pub max_retries: usize,

    /// Initial delay in milliseconds
    #[serde(default = "default_initial_delay_ms")]
    pub initial_delay_ms: u64,

    /// Maximum delay in milliseconds
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,

    /// Backoff multiplier
    #[serde(default = "default_backoff_multiplier")]
    pub backoff_multiplier: f64,
}

impl RetryConfig {
    fn validate(&self) -> Result<(), String> {
        if self.max_retries > 10 {
            return Err(format!(
                "search.retry.max_retries must be <= 10, got {}",
                self.max_retries
            ));
        }
        if self.initial_delay_ms > self.max_delay_ms {
            return Err(format!(
                "search.retry.initial_delay_ms ({}) cannot exceed max_delay_ms ({})",
                self.initial_delay_ms, self.max_delay_ms
            ));
        }
        if self.backoff_multiplier.is_nan() || self.backoff_multiplier < 1.0 {
            return Err(format!(
                "search.retry.backoff_multiplier must be >= 1.0, got {}",
                self.backoff_multiplier
            ));
        }
        Ok(())
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            initial_delay_ms: default_initial_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
            backoff_multiplier: default_backoff_multiplier(),
        }
    }
}

/// Search service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Service URL, e.g. `https://abc123.us-east-1.aoss.amazonaws.com`
    pub endpoint: String,

    /// AWS region used for request signing
    #[serde(default = "default_region")]
    pub region: String,

    /// Authentication type
    #[serde(default)]
    pub auth_type: AuthType,

    /// Signing service name override (`es` or `aoss`)
    ///
    /// Detected from the endpoint host when absent.
    #[serde(default)]
    pub service: Option<String>,

    /// Username for basic authentication
    #[serde(default)]
    pub username: Option<String>,

    /// Password for basic authentication
    /// Stored securely in memory and automatically zeroized on drop
    #[serde(default)]
    pub password: Option<SecretString>,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,

    /// TLS certificate verification enabled
    ///
    /// Cannot be disabled in production environments.
    #[serde(default = "default_true")]
    pub tls_verify: bool,

    /// Retry configuration
    #[serde(default)]
    pub retry: RetryConfig,
}

impl SearchConfig {
    /// Creates a search configuration for an endpoint with default settings
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            region: default_region(),
            auth_type: AuthType::default(),
            service: None,
            username: None,
            password: None,
            timeout_seconds: default_timeout_seconds(),
            tls_verify: true,
            retry: RetryConfig::default(),
        }
    }

    /// Host part of the endpoint, without scheme or port
    pub fn host(&self) -> Option<String> {
        url::Url::parse(&self.endpoint)
            .ok()
            .and_then(|url| url.host_str().map(str::to_string))
    }

    /// Signing service name: the explicit override, else `aoss` for
    /// serverless collection hosts and `es` otherwise
    pub fn signing_service(&self) -> String {
        if let Some(service) = &self.service {
            return service.clone();
        }
        match self.host() {
            Some(host) if host.contains("aoss") => "aoss".to_string(),
            _ => "es".to_string(),
        }
    }

    fn validate(&self, environment: &Environment) -> Result<(), String> {
        use secrecy::ExposeSecret;

        if self.endpoint.is_empty() {
            return Err("search.endpoint cannot be empty".to_string());
        }

        if !self.endpoint.starts_with("http://") && !self.endpoint.starts_with("https://") {
            return Err("search.endpoint must start with http:// or https://".to_string());
        }

        if self.host().is_none() {
            return Err(format!("search.endpoint '{}' is not a valid URL", self.endpoint));
        }

        if self.region.trim().is_empty() {
            return Err("search.region cannot be empty".to_string());
        }

        if let Some(service) = &self.service {
            let valid_services = ["es", "aoss"];
            if !valid_services.contains(&service.as_str()) {
                return Err(format!(
                    "Invalid search.service '{}'. Must be one of: {}",
                    service,
                    valid_services.join(", ")
                ));
            }
        }

        if self.auth_type == AuthType::Basic {
            if self.username.as_ref().map(|s| s.is_empty()).unwrap_or(true) {
                return Err(
                    "search.username cannot be empty when auth_type is 'basic'".to_string()
                );
            }

            if self
                .password
                .as_ref()
                .map(|s| s.expose_secret().is_empty())
                .unwrap_or(true)
            {
                return Err(
                    "search.password cannot be empty when auth_type is 'basic'".to_string()
                );
            }
        }

        if self.timeout_seconds == 0 {
            return Err("search.timeout_seconds must be > 0".to_string());
        }

        // Security: TLS verification stays on in production
        if *environment == Environment::Production && !self.tls_verify {
            return Err(
                "TLS certificate verification cannot be disabled in production environments. \
                Set 'tls_verify = true', or use environment = \"development\" or \"staging\" \
                for test clusters with self-signed certificates."
                    .to_string(),
            );
        }

        self.retry.validate()?;
        Ok(())
    }
}

/// Export configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Documents requested per page
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Field sorted ascending to page through the index
    ///
    /// Must be unique and stable for the export to be complete.
    #[serde(default = "default_sort_field")]
    pub sort_field: String,

    /// Directory for generated output files (system temp dir when unset)
    #[serde(default)]
    pub output_dir: Option<PathBuf>,

    /// Write a checkpoint sidecar next to the output after every batch
    #[serde(default = "default_true")]
    pub enable_checkpointing: bool,

    /// Re-read and check the output file after a completed export
    #[serde(default)]
    pub verify_output: bool,
}

impl ExportConfig {
    /// Directory where generated output files are placed
    pub fn output_dir(&self) -> PathBuf {
        self.output_dir.clone().unwrap_or_else(std::env::temp_dir)
    }

    fn validate(&self) -> Result<(), String> {
        if !(1..=MAX_BATCH_SIZE).contains(&self.batch_size) {
            return Err(format!(
                "export.batch_size must be between 1 and {}, got {}",
                MAX_BATCH_SIZE, self.batch_size
            ));
        }

        if self.sort_field.trim().is_empty() {
            return Err("export.sort_field cannot be empty".to_string());
        }

        Ok(())
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            sort_field: default_sort_field(),
            output_dir: None,
            enable_checkpointing: true,
            verify_output: false,
        }
    }
}

/// Upload handoff configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Storage backend (s3 or local)
    #[serde(default)]
    pub backend: StorageBackend,

    /// Default destination bucket; exports are not uploaded without one
    #[serde(default)]
    pub bucket: Option<String>,

    /// Key prefix placed before `<index>/<file name>`
    #[serde(default = "default_prefix")]
    pub prefix: String,

    /// Bucket region (defaults to the search region)
    #[serde(default)]
    pub region: Option<String>,

    /// Custom S3-compatible endpoint URL
    #[serde(default)]
    pub endpoint: Option<String>,

    /// Root directory for the local backend
    #[serde(default)]
    pub local_root: Option<PathBuf>,

    /// Keep the local export after a confirmed upload
    #[serde(default)]
    pub keep_local: bool,
}

impl StorageConfig {
    /// Parsed default bucket, if configured
    pub fn bucket_name(&self) -> Result<Option<BucketName>, String> {
        self.bucket
            .as_deref()
            .filter(|b| !b.is_empty())
            .map(BucketName::new)
            .transpose()
    }

    fn validate(&self) -> Result<(), String> {
        self.bucket_name()
            .map_err(|e| format!("storage.bucket: {e}"))?;

        if self.prefix.starts_with('/') || self.prefix.ends_with('/') {
            return Err(format!(
                "storage.prefix '{}' must not start or end with '/'",
                self.prefix
            ));
        }

        if let Some(endpoint) = &self.endpoint {
            if !endpoint.starts_with("http://") && !endpoint.starts_with("https://") {
                return Err("storage.endpoint must start with http:// or https://".to_string());
            }
        }

        if self.backend == StorageBackend::Local && self.local_root.is_none() {
            return Err("storage.local_root is required when backend is 'local'".to_string());
        }

        Ok(())
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::default(),
            bucket: None,
            prefix: default_prefix(),
            region: None,
            endpoint: None,
            local_root: None,
            keep_local: false,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Enable local JSON file logging
    #[serde(default)]
    pub local_enabled: bool,

    /// Local log directory
    #[serde(default = "default_local_path")]
    pub local_path: String,

    /// Log rotation strategy (daily or hourly)
    #[serde(default = "default_local_rotation")]
    pub local_rotation: String,

    /// Emit console logs as JSON lines instead of human-readable text
    #[serde(default)]
    pub json_console: bool,
}

impl LoggingConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_rotations = ["daily", "hourly"];
        if !valid_rotations.contains(&self.local_rotation.as_str()) {
            return Err(format!(
                "Invalid logging.local_rotation '{}'. Must be one of: {}",
                self.local_rotation,
                valid_rotations.join(", ")
            ));
        }

        if self.local_enabled && self.local_path.trim().is_empty() {
            return Err("logging.local_path cannot be empty when local logging is enabled".to_string());
        }

        Ok(())
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            local_enabled: false,
            local_path: default_local_path(),
            local_rotation: default_local_rotation(),
            json_console: false,
        }
    }
}

// Default value functions
fn default_log_level() -> String {
    "info".to_string()
}

pub(crate) fn default_region() -> String {
    "us-east-1".to_string()
}

fn default_true() -> bool {
    true
}

fn default_timeout_seconds() -> u64 {
    30
}

fn default_max_retries() -> usize {
    3
}

fn default_initial_delay_ms() -> u64 {
    500
}

fn default_max_delay_ms() -> u64 {
    10_000
}

fn default_backoff_multiplier() -> f64 {
    2.0
}

fn default_batch_size() -> usize {
    1000
}

fn default_sort_field() -> String {
    crate::domain::DEFAULT_SORT_FIELD.to_string()
}

fn default_prefix() -> String {
    "opensearch-backups".to_string()
}

fn default_local_path() -> String {
    "./logs".to_string()
}

fn default_local_rotation() -> String {
    "daily".to_string()
}
