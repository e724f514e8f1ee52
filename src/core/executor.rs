//! Deletion executor module.
//!
//! Applies decisions for a duplicate group:
//! - keep / skip: recorded only
//! - delete: Plex API request (or nothing in dry-run), with an optional
//!   local filesystem fallback when Plex refuses

use crate::core::activity::ActivityLog;
use crate::models::activity::Outcome;
use crate::models::config::Config;
use crate::models::decision::{Decision, Verdict};
use crate::models::media::{DuplicateGroup, MediaItem};
use crate::services::plex::PlexClient;
use crate::utils::format::{bytes_to_gb, bytes_to_string, format_thousands};
use crate::utils::fs::remove_file_if_exists;
use crate::Result;
use colored::Colorize;
use std::path::Path;
use std::time::Duration;

/// Pause after each real deletion so Plex can settle.
///
/// Taken only after the decision is in the log.
const DEFAULT_PAUSE: Duration = Duration::from_secs(2);

/// Something that can delete a media copy.
#[allow(async_fn_in_trait)]
pub trait MediaDeleter {
    /// Delete one copy; returns whether the server accepted the request.
    async fn delete_media(&self, show_key: &str, media_id: u64) -> Result<bool>;
}

impl MediaDeleter for PlexClient {
    async fn delete_media(&self, show_key: &str, media_id: u64) -> Result<bool> {
        PlexClient::delete_media(self, show_key, media_id).await
    }
}

/// Executor configuration.
#[derive(Debug, Clone)]
pub struct ExecutorConfig {
    /// Record deletions without performing them.
    pub dry_run: bool,
    /// Remove files from disk when Plex refuses a deletion.
    pub local_fallback: bool,
    /// Pause after each real deletion.
    pub pause: Duration,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            dry_run: false,
            local_fallback: false,
            pause: DEFAULT_PAUSE,
        }
    }
}

impl ExecutorConfig {
    /// Executor settings derived from the application config.
    pub fn from_config(config: &Config) -> Self {
        Self {
            dry_run: config.runtime.dry_run,
            local_fallback: config.runtime.delete_local_fallback,
            ..Default::default()
        }
    }
}

/// Counters for the run summary.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunStats {
    /// Copies deleted (or that would be, in dry-run).
    pub deleted_files: usize,
    /// Bytes freed (or that would be).
    pub deleted_size: u64,
    pub failed: usize,
    pub kept: usize,
    pub skipped: usize,
}

impl RunStats {
    /// Print summary.
    pub fn print_summary(&self) {
        println!("Total Deleted Files: {}", self.deleted_files);
        println!("Total Deleted Size (GB): {:.2}", bytes_to_gb(self.deleted_size));
        if self.failed > 0 {
            println!("{} {}", "Failed deletions:".bold().red(), self.failed);
        }
        tracing::info!("Total Deleted Files: {}", self.deleted_files);
        tracing::info!("Total Deleted Size (GB): {:.2}", bytes_to_gb(self.deleted_size));
    }
}

/// Deletion executor.
pub struct Executor<'a, D: MediaDeleter> {
    config: ExecutorConfig,
    deleter: &'a D,
    log: ActivityLog,
    stats: RunStats,
}

impl<'a, D: MediaDeleter> Executor<'a, D> {
    /// Create a new executor.
    pub fn new(config: ExecutorConfig, deleter: &'a D, log: ActivityLog) -> Self {
        Self {
            config,
            deleter,
            log,
            stats: RunStats::default(),
        }
    }

    pub fn stats(&self) -> &RunStats {
        &self.stats
    }

    pub fn log(&self) -> &ActivityLog {
        &self.log
    }

    /// Apply decisions to a group, in order.
    pub async fn apply(&mut self, group: &DuplicateGroup, decisions: &[Decision]) -> Result<()> {
        for decision in decisions {
            let Some(media) = group.get(decision.media_id) else {
                tracing::warn!(
                    "Decision for unknown media {} in {:?}, ignoring",
                    decision.media_id,
                    group.title
                );
                continue;
            };

            let outcome = match decision.verdict {
                Verdict::Keep(reason) => {
                    println!(
                        "{} {} {} (id {}, {:?})",
                        "[KEEP]".green(),
                        format_score(media),
                        media.display_path(),
                        media.id,
                        reason
                    );
                    tracing::info!("Keeping {} ({:?}) for {:?}", media.id, reason, group.title);
                    self.stats.kept += 1;
                    Outcome::Kept
                }
                Verdict::Skip(reason) => {
                    println!(
                        "\t{} {} {} (id {}, {:?})",
                        "[SKIP]".yellow(),
                        format_score(media),
                        media.display_path(),
                        media.id,
                        reason
                    );
                    tracing::info!("Skipping removal of {} ({:?}) for {:?}", media.id, reason, group.title);
                    self.stats.skipped += 1;
                    Outcome::Skipped
                }
                Verdict::Delete(reason) => {
                    println!("\tRemoving : {} - {:?} ({:?})", media.id, media.files, reason);
                    tracing::info!(
                        "Removing : {} - {:?} (reason: {:?}, size: {})",
                        media.id,
                        media.files_short,
                        reason,
                        media.file_size
                    );
                    self.delete(media).await
                }
            };

            let record = self.log.record(&group.title, media, decision, outcome);
            self.log.append(&record)?;

            let attempted = !matches!(outcome, Outcome::DryRun | Outcome::Kept | Outcome::Skipped);
            if attempted && !self.config.pause.is_zero() {
                tokio::time::sleep(self.config.pause).await;
            }
        }

        Ok(())
    }

    /// Delete one copy, honouring dry-run and the local fallback.
    async fn delete(&mut self, media: &MediaItem) -> Outcome {
        let size = bytes_to_string(media.file_size);

        if self.config.dry_run {
            self.track(media);
            println!(
                "\t\t{} Would've deleted media item: {}, Size: {}",
                "[DRY RUN]".yellow(),
                media.display_path(),
                size
            );
            tracing::info!("DRY RUN -- Would've deleted media item: {:?}, Size: {}", media.files_short, size);
            return Outcome::DryRun;
        }

        let accepted = match self.deleter.delete_media(&media.show_key, media.id).await {
            Ok(accepted) => accepted,
            Err(e) => {
                tracing::error!("Delete request for {} failed: {}", media.id, e);
                false
            }
        };

        if accepted {
            self.track(media);
            println!("\t\t{} Successfully deleted {}, Size: {}", "[OK]".green(), media.display_path(), size);
            tracing::info!("Successfully deleted file: {:?}, Size: {}", media.files_short, size);
            Outcome::Deleted
        } else if self.config.local_fallback && remove_locally(media) {
            self.track(media);
            println!(
                "\t\t{} Plex refused, removed from disk: {}, Size: {}",
                "[OK]".green(),
                media.display_path(),
                size
            );
            tracing::info!("Plex refused deletion, removed locally: {:?}", media.files);
            Outcome::DeletedLocally
        } else {
            self.stats.failed += 1;
            println!("\t\t{} Deletion failed {}, Size: {}", "[FAILED]".red(), media.display_path(), size);
            tracing::warn!("Deletion failed file: {:?}, Size: {}", media.files_short, size);
            Outcome::Failed
        }
    }

    fn track(&mut self, media: &MediaItem) {
        self.stats.deleted_files += 1;
        self.stats.deleted_size += media.file_size;
    }
}

/// Remove every part file; already missing files count as removed.
fn remove_locally(media: &MediaItem) -> bool {
    let mut ok = true;
    for file in &media.files {
        match remove_file_if_exists(Path::new(file)) {
            Ok(true) => tracing::debug!("Removed {}", file),
            Ok(false) => tracing::debug!("Already gone: {}", file),
            Err(e) => {
                tracing::error!("Failed to remove {}: {}", file, e);
                ok = false;
            }
        }
    }
    ok
}

fn format_score(media: &MediaItem) -> String {
    match media.score {
        Some(score) => format_thousands(score),
        None => "N/A".to_string(),
    }
}
