use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Cached BoardGameGeek lookups.
#[derive(Debug, Parser)]
#[command(name = "meeple", version, about)]
pub struct Cli {
    /// Path to the configuration file (defaults to $MEEPLE_CONFIG, then ./config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Print Prometheus metrics to stderr after the command finishes
    #[arg(long, global = true)]
    pub print_metrics: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Search BGG and backfill the cache
    Search {
        /// Free-text query
        query: String,
    },
    /// Look up a single thing by BGG id
    Get {
        /// BGG thing id
        id: String,
    },
    /// Remove a cached entry
    Remove {
        /// BGG thing id
        id: String,
    },
    /// Show cache statistics
    Stats,
    /// Drop every cached entry
    Clear,
    /// Print the effective configuration with secrets redacted
    Config,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_search() {
        let cli = Cli::try_parse_from(["meeple", "search", "Catan"]).unwrap();
        assert!(matches!(cli.command, Command::Search { ref query } if query == "Catan"));
        assert!(cli.config.is_none());
        assert!(!cli.print_metrics);
    }

    #[test]
    fn test_parse_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "meeple",
            "get",
            "13",
            "--config",
            "/etc/meeple.toml",
            "--print-metrics",
        ])
        .unwrap();
        assert!(matches!(cli.command, Command::Get { ref id } if id == "13"));
        assert_eq!(cli.config, Some(PathBuf::from("/etc/meeple.toml")));
        assert!(cli.print_metrics);
    }

    #[test]
    fn test_missing_subcommand_is_error() {
        assert!(Cli::try_parse_from(["meeple"]).is_err());
    }

    #[test]
    fn test_cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
