//! Plex Dupe Finder CLI
//!
//! Finds duplicate media in a Plex library and removes the lower quality copies.

use clap::Parser;
use plex_dupefinder::cli::{
    args::{Cli, Commands},
    commands::{
        cleanup,
        find::{self, FindOptions},
        init, libraries,
    },
};
use plex_dupefinder::logging;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse command line arguments
    let cli = Cli::parse();
    let config = cli.config.as_deref();

    match cli.command {
        Commands::Find {
            dry_run,
            skip_other_dupes,
            log_dir,
        } => {
            // Logging needs the configured timezone, find sets it up itself
            find::find(FindOptions {
                config,
                verbose: cli.verbose,
                skip_preflight: cli.skip_preflight,
                dry_run,
                skip_other_dupes,
                log_dir: log_dir.as_deref(),
            })
            .await?;
        }

        Commands::Cleanup {
            log_file,
            dry_run,
            failed_only,
        } => {
            logging::init(cli.verbose, None)?;
            cleanup::cleanup(&log_file, dry_run, failed_only).await?;
        }

        Commands::Init => {
            logging::init(cli.verbose, None)?;
            init::init(config).await?;
        }

        Commands::Libraries => {
            logging::init(cli.verbose, None)?;
            libraries::list_libraries(config).await?;
        }
    }

    Ok(())
}
