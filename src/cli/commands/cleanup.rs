//! Cleanup command implementation.
//!
//! Removes from disk the files of copies a previous `find` run marked for
//! deletion, typically ones Plex failed to delete itself.

use crate::core::cleanup::{self, CleanupOptions};
use crate::Result;
use colored::Colorize;
use std::path::Path;

/// Run cleanup over a decision log.
pub async fn cleanup(log_file: &Path, dry_run: bool, failed_only: bool) -> Result<()> {
    println!("{}", "[CLEANUP] Log-based cleanup".bold().cyan());
    println!();

    if !log_file.exists() {
        return Err(crate::Error::other(format!(
            "Log file not found: {}",
            log_file.display()
        )));
    }

    println!("[INFO] Reading log: {}", log_file.display());
    if failed_only {
        println!("[INFO] Only entries whose Plex deletion failed");
    }
    if dry_run {
        println!("{}", "[DRY-RUN] Showing what would be removed:".bold().yellow());
    }
    println!();

    let result = cleanup::run_cleanup(
        log_file,
        CleanupOptions {
            dry_run,
            failed_only,
        },
    )?;

    result.print_summary(dry_run);
    println!();

    if result.failed > 0 {
        println!("{}", "[WARNING] Some files could not be removed".bold().yellow());
    } else if dry_run {
        println!("{}", "[OK] Dry run complete - no changes were made".green());
    } else {
        println!("{}", "[OK] Cleanup complete".green());
    }

    Ok(())
}
