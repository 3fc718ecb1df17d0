//! CLI module - Command-line interface for `TechTracker`
//!
//! This module provides a structured CLI using clap for argument parsing.

mod commands;

use clap::{Parser, Subcommand};

/// `TechTracker` - Office equipment inventory with an audit trail
#[derive(Parser)]
#[command(name = "techtracker")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP API
    #[command(alias = "daemon", alias = "web")]
    Serve,

    /// Create default config file
    #[command(alias = "--init")]
    Init,

    /// Check that the database is reachable and migrated
    #[command(alias = "-c", alias = "--check")]
    Check,

    /// Show recent equipment history
    #[command(alias = "h")]
    History {
        /// Number of entries to show
        #[arg(default_value = "10")]
        limit: u64,
    },

    /// List all equipment
    #[command(alias = "ls", alias = "l")]
    List,
}

pub use commands::*;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_history_with_limit() {
        let cli = Cli::try_parse_from(["techtracker", "history", "25"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::History { limit: 25 })));
    }

    #[test]
    fn test_history_default_limit() {
        let cli = Cli::try_parse_from(["techtracker", "h"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::History { limit: 10 })));
    }

    #[test]
    fn test_serve_aliases() {
        for alias in ["serve", "daemon", "web"] {
            let cli = Cli::try_parse_from(["techtracker", alias]).unwrap();
            assert!(matches!(cli.command, Some(Commands::Serve)));
        }
    }

    #[test]
    fn test_no_subcommand() {
        let cli = Cli::try_parse_from(["techtracker"]).unwrap();
        assert!(cli.command.is_none());
    }
}
