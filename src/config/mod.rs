//! Configuration management for Dredge.
//!
//! # Overview
//!
//! Dredge reads a TOML configuration file with support for:
//! - Environment variable substitution (`${VAR_NAME}`)
//! - `DREDGE_<SECTION>_<KEY>` overrides
//! - An environment-only fallback when no file is present
//! - Default values for every optional setting
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use dredge::config::load_config;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("dredge.toml")?;
//!
//! println!("Search endpoint: {}", config.search.endpoint);
//! println!("Batch size: {}", config.export.batch_size);
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration Structure
//!
//! - [`ApplicationConfig`] - Log level and runtime environment
//! - [`SearchConfig`] - Search endpoint, authentication and retry policy
//! - [`ExportConfig`] - Page size, sort key, output placement, checkpointing
//! - [`StorageConfig`] - Upload backend, bucket and key prefix
//! - [`LoggingConfig`] - Local JSON log files
//!
//! # Example Configuration
//!
//! ```toml
//! [application]
//! log_level = "info"
//! environment = "production"
//!
//! [search]
//! endpoint = "https://abc123.us-east-1.aoss.amazonaws.com"
//! region = "us-east-1"
//! auth_type = "sigv4"
//!
//! [search.retry]
//! max_retries = 3
//!
//! [export]
//! batch_size = 1000
//! sort_field = "_id"
//!
//! [storage]
//! bucket = "${OUTPUT_BUCKET}"
//! prefix = "opensearch-backups"
//! ```

pub mod loader;
pub mod schema;
pub mod secret;

// Re-export commonly used types
pub use loader::{config_from_env, load_config, load_config_or_env};
pub use schema::{
    ApplicationConfig, AuthType, DredgeConfig, Environment, ExportConfig, LoggingConfig,
    RetryConfig, SearchConfig, StorageBackend, StorageConfig,
};
pub use secret::{secret_string, SecretString, SecretValue};
