//! Command line argument definitions.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Plex Dupe Finder - Find and remove duplicate media in your Plex library
#[derive(Parser, Debug)]
#[command(name = "plex-dupefinder")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Skip preflight checks
    #[arg(long, global = true)]
    pub skip_preflight: bool,

    /// Path to config.json (overrides PLEX_DUPEFINDER_CONFIG)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Find duplicates in the configured libraries and resolve them
    Find {
        /// Dry run - log decisions without deleting anything
        #[arg(long)]
        dry_run: bool,

        /// Only process unavailable media and extra .ts copies
        #[arg(long)]
        skip_other_dupes: bool,

        /// Directory for decisions.log and activity.log
        #[arg(long, value_name = "DIR")]
        log_dir: Option<PathBuf>,
    },

    /// Remove files listed as deleted in a decision log
    Cleanup {
        /// Path to decisions.log (or a legacy activity.log)
        #[arg(value_name = "LOG_FILE")]
        log_file: PathBuf,

        /// Dry run - print paths without removing anything
        #[arg(long)]
        dry_run: bool,

        /// Only entries whose Plex deletion failed
        #[arg(long)]
        failed_only: bool,
    },

    /// Create a config file interactively
    Init,

    /// List the server's library sections
    Libraries,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_find_flags() {
        let cli = Cli::try_parse_from([
            "plex-dupefinder",
            "--config",
            "/tmp/config.json",
            "find",
            "--dry-run",
            "--skip-other-dupes",
        ])
        .unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/config.json")));
        match cli.command {
            Commands::Find {
                dry_run,
                skip_other_dupes,
                log_dir,
            } => {
                assert!(dry_run);
                assert!(skip_other_dupes);
                assert!(log_dir.is_none());
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_cleanup() {
        let cli = Cli::try_parse_from(["plex-dupefinder", "cleanup", "decisions.log", "--failed-only", "-v"]).unwrap();
        assert!(cli.verbose);
        match cli.command {
            Commands::Cleanup {
                log_file,
                dry_run,
                failed_only,
            } => {
                assert_eq!(log_file, PathBuf::from("decisions.log"));
                assert!(!dry_run);
                assert!(failed_only);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }
}
