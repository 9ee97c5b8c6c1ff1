//! Status command implementation
//!
//! This module implements the `status` command: index existence, advisory
//! document count and the state of any local checkpoint.

use crate::adapters::factory::create_search_backend;
use crate::config::load_config_or_env;
use crate::core::state::CheckpointStore;
use crate::domain::ids::IndexName;
use clap::Args;
use std::path::PathBuf;

/// Arguments for the status command
#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Index to inspect
    #[arg(default_value = "inventory")]
    pub index: String,

    /// Output file whose checkpoint to show (default: ./<index>_data.jsonl)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

impl StatusArgs {
    fn output_path(&self, index: &IndexName) -> PathBuf {
        self.output
            .clone()
            .unwrap_or_else(|| PathBuf::from(format!("{index}_data.jsonl")))
    }

    /// Execute the status command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(index = %self.index, "Checking export status");

        println!("📊 Export Status");
        println!();

        let index = match IndexName::new(self.index.as_str()) {
            Ok(index) => index,
            Err(e) => {
                println!("❌ {e}");
                return Ok(2);
            }
        };

        let config = match load_config_or_env(config_path) {
            Ok(c) => c,
            Err(e) => {
                println!("❌ Failed to load configuration");
                println!("   Error: {e}");
                return Ok(2);
            }
        };

        let backend = match create_search_backend(&config).await {
            Ok(b) => b,
            Err(e) => {
                println!("❌ Failed to create search client");
                println!("   Error: {e}");
                return Ok(4);
            }
        };

        println!("Index: {index}");
        println!("  Endpoint: {}", config.search.endpoint);

        let mut exit_code = 0;
        match backend.index_exists(&index).await {
            Ok(true) => {
                println!("  Exists: yes");
                match backend.approximate_count(&index).await {
                    Ok(count) => println!("  Documents: {count}"),
                    Err(e) => println!("  Documents: unknown ({e})"),
                }
            }
            Ok(false) => {
                println!("  Exists: no");
                exit_code = 3;
            }
            Err(e) => {
                println!("❌ Failed to reach the search service");
                println!("   Error: {e}");
                exit_code = 4;
            }
        }
        println!();

        let output = self.output_path(&index);
        let store = CheckpointStore::for_output(&output);
        match store.load() {
            Ok(Some(checkpoint)) => {
                println!("Checkpoint: {}", store.path().display());
                println!("  Status: {}", checkpoint.status);
                println!("  Run: {}", checkpoint.run_id);
                println!("  Documents written: {}", checkpoint.documents_written);
                println!("  Batches: {}", checkpoint.batches);
                println!("  Bytes: {}", checkpoint.bytes_written);
                if let Some(cursor) = &checkpoint.cursor {
                    println!("  Cursor: {cursor}");
                }
                println!(
                    "  Updated: {}",
                    checkpoint.updated_at.format("%Y-%m-%d %H:%M:%S UTC")
                );
                if let Some(error) = &checkpoint.error {
                    println!("  Error: {error}");
                }
                if checkpoint.is_resumable() {
                    println!();
                    println!("Run 'dredge export {index} --resume' to continue.");
                }
            }
            Ok(None) => println!("No checkpoint found for {}", output.display()),
            Err(e) => {
                println!("⚠️  {e}");
                if exit_code == 0 {
                    exit_code = 5;
                }
            }
        }

        Ok(exit_code)
    }
}
