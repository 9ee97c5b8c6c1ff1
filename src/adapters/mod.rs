//! External system integrations for Dredge.
//!
//! - [`search`] - Search service access ([`search::SearchBackend`], OpenSearch implementation)
//! - [`storage`] - Object storage uploads ([`storage::ObjectUploader`], `object_store` implementation)
//! - [`factory`] - Builds both from configuration
//!
//! # Design Pattern
//!
//! Adapters isolate third-party clients behind traits so the export core can
//! be driven by in-memory fakes in tests:
//!
//! ```rust,no_run
//! use dredge::adapters::factory::{create_search_backend, create_uploader};
//! use dredge::config::load_config;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("dredge.toml")?;
//! let backend = create_search_backend(&config).await?;
//! let uploader = create_uploader(&config);
//! # Ok(())
//! # }
//! ```

pub mod factory;
pub mod search;
pub mod storage;
