//! Validate config command implementation
//!
//! This module implements the `validate-config` command for validating
//! the Dredge configuration.

use crate::config::{load_config_or_env, AuthType};
use clap::Args;

/// Arguments for the validate-config command
#[derive(Args, Debug)]
pub struct ValidateArgs {}

impl ValidateArgs {
    /// Execute the validate-config command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(config_path = %config_path, "Validating configuration");

        println!("🔍 Validating configuration: {config_path}");
        println!();

        // Loading validates; environment-only configs are accepted too
        let config = match load_config_or_env(config_path) {
            Ok(c) => {
                println!("✅ Configuration is valid");
                c
            }
            Err(e) => {
                println!("❌ Configuration validation failed");
                println!("   Error: {e}");
                return Ok(2);
            }
        };

        println!();
        println!("Configuration Summary:");
        println!("  Environment: {}", config.application.environment);
        println!("  Log Level: {}", config.application.log_level);
        println!("  Search Endpoint: {}", config.search.endpoint);
        println!("  Region: {}", config.search.region);
        match config.search.auth_type {
            AuthType::Sigv4 => println!(
                "  Auth: sigv4 (service {})",
                config.search.signing_service()
            ),
            AuthType::Basic => println!(
                "  Auth: basic (user {})",
                config.search.username.as_deref().unwrap_or("-")
            ),
            AuthType::None => println!("  Auth: none"),
        }
        println!("  Batch Size: {}", config.export.batch_size);
        println!("  Sort Field: {}", config.export.sort_field);
        println!("  Checkpointing: {}", config.export.enable_checkpointing);
        println!("  Storage Backend: {}", config.storage.backend);
        println!(
            "  Bucket: {}",
            config.storage.bucket.as_deref().unwrap_or("(none)")
        );
        println!("  Prefix: {}", config.storage.prefix);
        println!();
        Ok(0)
    }
}
