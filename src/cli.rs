//! Command-line interface for birdwatch
//!
//! Provides argument parsing using clap derive macros.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Continuous bird song detection and logging
#[derive(Parser, Debug)]
#[command(name = "birdwatch", version, about = "Continuous bird song detection and logging")]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Path to configuration file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Audio input device (e.g., hw:0)
    #[arg(long, value_name = "DEVICE")]
    pub device: Option<String>,

    /// Detection database path
    #[arg(long, value_name = "PATH")]
    pub database: Option<PathBuf>,

    /// Analyzer command invoked per chunk
    #[arg(long, value_name = "COMMAND")]
    pub classifier: Option<String>,

    /// Verbose output (-v: debug, -vv: trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List available audio input devices
    Devices,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_no_args() {
        let cli = Cli::parse_from(["birdwatch"]);
        assert!(cli.command.is_none());
        assert!(cli.config.is_none());
        assert!(cli.device.is_none());
        assert_eq!(cli.verbose, 0);
    }

    #[test]
    fn test_parse_devices_subcommand() {
        let cli = Cli::parse_from(["birdwatch", "devices"]);
        assert!(matches!(cli.command, Some(Commands::Devices)));
    }

    #[test]
    fn test_parse_overrides() {
        let cli = Cli::parse_from([
            "birdwatch",
            "--device",
            "hw:1",
            "--database",
            "/tmp/test.db",
            "--classifier",
            "birdnet-analyze",
        ]);
        assert_eq!(cli.device.as_deref(), Some("hw:1"));
        assert_eq!(cli.database, Some(PathBuf::from("/tmp/test.db")));
        assert_eq!(cli.classifier.as_deref(), Some("birdnet-analyze"));
    }

    #[test]
    fn test_parse_verbose_count() {
        let cli = Cli::parse_from(["birdwatch", "-vv"]);
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn test_cli_asserts() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
