//! CLI interface and argument parsing
//!
//! This module provides the command-line interface for Dredge using clap.

pub mod commands;

use clap::{Parser, Subcommand};

/// Dredge - OpenSearch export tool
#[derive(Parser, Debug)]
#[command(name = "dredge")]
#[command(version, about, long_about = None)]
#[command(author = "Dredge Contributors")]
pub struct Cli {
    /// Path to configuration file (environment-only config when missing)
    #[arg(short, long, default_value = "dredge.toml", env = "DREDGE_CONFIG")]
    pub config: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "DREDGE_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Export every document of an index to a JSON lines file
    Export(commands::export::ExportArgs),

    /// Run one export from a JSON event and print the response
    HandleEvent(commands::handle_event::HandleEventArgs),

    /// Validate configuration
    ValidateConfig(commands::validate::ValidateArgs),

    /// Show index and checkpoint status
    Status(commands::status::StatusArgs),

    /// Initialize a new configuration file
    Init(commands::init::InitArgs),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_export() {
        let cli = Cli::parse_from(["dredge", "export", "orders"]);
        assert_eq!(cli.config, "dredge.toml");
        match cli.command {
            Commands::Export(args) => assert_eq!(args.index, "orders"),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_cli_parse_export_default_index() {
        let cli = Cli::parse_from(["dredge", "export"]);
        match cli.command {
            Commands::Export(args) => assert_eq!(args.index, "inventory"),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_cli_parse_export_flags() {
        let cli = Cli::parse_from([
            "dredge",
            "export",
            "inventory",
            "--output",
            "out.jsonl",
            "--bucket",
            "backups",
            "--batch-size",
            "500",
            "--resume",
        ]);
        match cli.command {
            Commands::Export(args) => {
                assert_eq!(args.output, Some("out.jsonl".into()));
                assert_eq!(args.bucket.as_deref(), Some("backups"));
                assert_eq!(args.batch_size, Some(500));
                assert!(args.resume);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_cli_parse_with_config() {
        let cli = Cli::parse_from(["dredge", "--config", "custom.toml", "export"]);
        assert_eq!(cli.config, "custom.toml");
    }

    #[test]
    fn test_cli_parse_with_log_level() {
        let cli = Cli::parse_from(["dredge", "--log-level", "debug", "export"]);
        assert_eq!(cli.log_level, Some("debug".to_string()));
    }

    #[test]
    fn test_cli_parse_handle_event() {
        let cli = Cli::parse_from(["dredge", "handle-event", r#"{"index_name":"orders"}"#]);
        assert!(matches!(cli.command, Commands::HandleEvent(_)));
    }

    #[test]
    fn test_cli_parse_validate_config() {
        let cli = Cli::parse_from(["dredge", "validate-config"]);
        assert!(matches!(cli.command, Commands::ValidateConfig(_)));
    }

    #[test]
    fn test_cli_parse_status() {
        let cli = Cli::parse_from(["dredge", "status", "orders"]);
        assert!(matches!(cli.command, Commands::Status(_)));
    }

    #[test]
    fn test_cli_parse_init() {
        let cli = Cli::parse_from(["dredge", "init"]);
        assert!(matches!(cli.command, Commands::Init(_)));
    }
}
