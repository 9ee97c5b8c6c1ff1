//! Init command implementation
//!
//! This module implements the `init` command for generating a sample
//! configuration file.

use clap::Args;
use std::fs;
use std::path::Path;

/// Arguments for the init command
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Path where to create the configuration file
    #[arg(short, long, default_value = "dredge.toml")]
    pub output: String,

    /// Include example values and comments
    #[arg(long)]
    pub with_examples: bool,

    /// Overwrite existing file
    #[arg(long)]
    pub force: bool,
}

impl InitArgs {
    /// Execute the init command
    pub async fn execute(&self) -> anyhow::Result<i32> {
        tracing::info!(output = %self.output, "Initializing configuration file");

        println!("📝 Initializing Dredge configuration");
        println!();

        if Path::new(&self.output).exists() && !self.force {
            println!("❌ Configuration file already exists: {}", self.output);
            println!("   Use --force to overwrite");
            return Ok(2);
        }

        let config_content = if self.with_examples {
            Self::generate_config_with_examples()
        } else {
            Self::generate_minimal_config()
        };

        match fs::write(&self.output, config_content) {
            Ok(_) => {
                println!("✅ Configuration file created: {}", self.output);
                println!();
                println!("Next steps:");
                println!("  1. Edit {} with your search endpoint", self.output);
                println!("  2. Make AWS credentials available (profile, env or role) for sigv4");
                println!("  3. Validate configuration: dredge validate-config");
                println!("  4. Run export: dredge export <index>");
                println!();
                Ok(0)
            }
            Err(e) => {
                println!("❌ Failed to write configuration file");
                println!("   Error: {e}");
                Ok(5)
            }
        }
    }

    /// Generate minimal configuration
    fn generate_minimal_config() -> String {
        r#"# Dredge Configuration File
# OpenSearch index export tool

[application]
log_level = "info"
environment = "development"

[search]
endpoint = "${OPENSEARCH_URL}"
region = "us-east-1"
auth_type = "sigv4"

[export]
batch_size = 1000
sort_field = "_id"

[storage]
backend = "s3"
# bucket = "${OUTPUT_BUCKET}"
prefix = "opensearch-backups"

[logging]
local_enabled = false
"#
        .to_string()
    }

    /// Generate configuration with examples and comments
    fn generate_config_with_examples() -> String {
        r#"# Dredge Configuration File
# OpenSearch index export tool
#
# Every value may be overridden with DREDGE_<SECTION>_<KEY>, for example
# DREDGE_EXPORT_BATCH_SIZE=500. ${VAR} references are expanded on load.

# ============================================================================
# Application Settings
# ============================================================================
[application]
# Log level (trace, debug, info, warn, error)
log_level = "info"

# Environment (development, staging, production)
# Production refuses tls_verify = false
environment = "development"

# ============================================================================
# Search Service
# ============================================================================
[search]
# Domain or collection endpoint (https:// is added when missing)
endpoint = "${OPENSEARCH_URL}"

# AWS region used for request signing
region = "us-east-1"

# Authentication: sigv4 | basic | none
auth_type = "sigv4"

# Signing service: es (managed domains) or aoss (serverless)
# Detected from the endpoint host when omitted
# service = "aoss"

# Basic authentication credentials
# username = "admin"
# password = "${DREDGE_SEARCH_PASSWORD}"

# Request timeout in seconds
timeout_seconds = 30

# TLS certificate verification
tls_verify = true

[search.retry]
# Retries per request after the first attempt (0-10)
max_retries = 3
initial_delay_ms = 500
max_delay_ms = 10000
backoff_multiplier = 2.0

# ============================================================================
# Export
# ============================================================================
[export]
# Documents per page request (1-10000)
batch_size = 1000

# Sort field; must be unique and stable for a complete export
sort_field = "_id"

# Directory for files that are uploaded afterwards (system temp dir when unset)
# output_dir = "/tmp"

# Write <output>.checkpoint.json after every batch
enable_checkpointing = true

# Re-read the output and compare line counts after the export
verify_output = false

# ============================================================================
# Object Storage
# ============================================================================
[storage]
# Backend: s3 | local
backend = "s3"

# Destination bucket; exports are uploaded only when a bucket is set
# bucket = "${OUTPUT_BUCKET}"

# Key prefix: <prefix>/<index>/<index>_<timestamp>.jsonl
prefix = "opensearch-backups"

# S3 region (defaults to search.region)
# region = "us-east-1"

# S3-compatible endpoint such as MinIO
# endpoint = "http://localhost:9000"

# Root directory for the local backend
# local_root = "./backups"

# Keep the local file after a confirmed upload
keep_local = false

# ============================================================================
# Logging
# ============================================================================
[logging]
# JSON log files with rotation
local_enabled = false
local_path = "./logs"

# Rotation: daily | hourly
local_rotation = "daily"

# JSON console output
json_console = false
"#
        .to_string()
    }
}
