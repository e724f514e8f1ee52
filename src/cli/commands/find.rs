//! Find command implementation.
//!
//! Scans every configured library for duplicates, decides which copies to
//! keep and applies the decisions. Every decision is appended to the
//! decision log so `cleanup` can act on it later.

use crate::core::activity::ActivityLog;
use crate::core::decision::{self, Choice};
use crate::core::executor::{Executor, ExecutorConfig};
use crate::core::scanner;
use crate::core::scorer::Scorer;
use crate::logging::{self, FileLog};
use crate::models::config::Config;
use crate::models::decision::Decision;
use crate::models::media::{DuplicateGroup, MediaItem, MediaKind};
use crate::preflight;
use crate::services::arr::{ArrClient, ArrKind};
use crate::services::plex::PlexClient;
use crate::utils::format::{bytes_to_string, format_thousands, kbps_to_string, millis_to_string};
use crate::{Error, Result};
use colored::Colorize;
use dialoguer::Input;
use std::path::{Path, PathBuf};

/// Decision log file name.
pub const DECISION_LOG_FILE: &str = "decisions.log";

/// Options for the find command.
#[derive(Debug, Clone, Copy, Default)]
pub struct FindOptions<'a> {
    pub config: Option<&'a Path>,
    pub verbose: bool,
    pub skip_preflight: bool,
    pub dry_run: bool,
    pub skip_other_dupes: bool,
    pub log_dir: Option<&'a Path>,
}

/// Radarr / Sonarr clients for enabled services.
struct ArrClients {
    radarr: Option<ArrClient>,
    sonarr: Option<ArrClient>,
}

impl ArrClients {
    fn from_config(config: &Config) -> Self {
        let radarr = &config.scoring.radarr;
        let sonarr = &config.scoring.sonarr;
        Self {
            radarr: radarr.enabled.then(|| ArrClient::new(ArrKind::Radarr, radarr)),
            sonarr: sonarr.enabled.then(|| ArrClient::new(ArrKind::Sonarr, sonarr)),
        }
    }

    /// Media id of the copy the *arr service tracks, if any.
    async fn preferred(&self, group: &DuplicateGroup) -> Option<u64> {
        let first = group.items.first()?;
        let (client, id) = match group.kind {
            MediaKind::Movie => (self.radarr.as_ref()?, first.ids.tmdb_id?),
            MediaKind::Episode => (self.sonarr.as_ref()?, first.ids.tvdb_id?),
            MediaKind::Unknown => return None,
        };

        let files = match client.preferred_files(id).await {
            Ok(files) => files,
            Err(e) => {
                tracing::warn!("{} lookup failed for {:?}: {}", client.kind(), group.title, e);
                return None;
            }
        };

        let preferred = decision::arr_preferred_media(group, &files);
        match preferred {
            Some(media_id) => tracing::info!("{} prefers media {} for {:?}", client.kind(), media_id, group.title),
            None => tracing::debug!("{} tracks none of the copies of {:?}", client.kind(), group.title),
        }
        preferred
    }
}

/// Run the find command.
pub async fn find(options: FindOptions<'_>) -> Result<()> {
    let Some((config, config_path)) = super::load_config(options.config)? else {
        return Ok(());
    };
    let config = config.with_cli_overrides(options.dry_run, options.skip_other_dupes);
    config.validate()?;
    let timezone = config.timezone()?;

    let log_dir = match options.log_dir {
        Some(dir) => dir.to_path_buf(),
        None => config_dir_of(&config_path),
    };
    let _guard = logging::init(
        options.verbose,
        Some(FileLog {
            dir: &log_dir,
            timezone,
        }),
    )?;

    println!("{}", "[FIND] Plex Dupe Finder".bold().cyan());
    if config.runtime.dry_run {
        println!("{}", "[DRY-RUN] Nothing will be deleted".bold().yellow());
    }
    println!();

    let client = PlexClient::new(&config.plex)?;
    if !options.skip_preflight {
        run_preflight_checks(&config, &client).await?;
    }

    let scorer = Scorer::new(&config)?;
    let arr = ArrClients::from_config(&config);
    let log = ActivityLog::new(log_dir.join(DECISION_LOG_FILE), timezone);
    println!("[INFO] Decision log: {}", log.path().display());
    tracing::info!("Run {} started (dry run: {})", log.run_id(), config.runtime.dry_run);

    let mut executor = Executor::new(ExecutorConfig::from_config(&config), &client, log);

    let outcome = tokio::select! {
        res = process_libraries(&config, &client, &scorer, &arr, &mut executor) => res,
        _ = tokio::signal::ctrl_c() => Err(Error::Interrupted),
    };

    println!();
    executor.stats().print_summary();

    match outcome {
        Err(Error::Interrupted) => {
            println!("{}", "[INTERRUPTED] Stopped before all groups were processed".yellow());
            tracing::warn!("Run interrupted");
            Ok(())
        }
        other => other,
    }
}

fn config_dir_of(config_path: &Path) -> PathBuf {
    match config_path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// Run preflight checks and stop if any fail.
async fn run_preflight_checks(config: &Config, client: &PlexClient) -> Result<()> {
    println!("{}", "Running preflight checks...".bold());
    println!();

    let results = preflight::run_preflight_checks(config, client).await?;
    preflight::print_results(&results);
    println!();

    if !preflight::all_passed(&results) {
        return Err(Error::other(
            "Preflight checks failed. Fix the issues above and try again.",
        ));
    }

    Ok(())
}

async fn process_libraries(
    config: &Config,
    client: &PlexClient,
    scorer: &Scorer<'_>,
    arr: &ArrClients,
    executor: &mut Executor<'_, PlexClient>,
) -> Result<()> {
    for library in &config.plex.libraries {
        let scan = match scanner::scan_library(client, library, config, scorer).await {
            Ok(scan) => scan,
            Err(e) => {
                println!("{} {:?}: {}", "[ERROR]".red(), library, e);
                tracing::error!("Failed to scan library {:?}: {}", library, e);
                continue;
            }
        };

        println!(
            "  {} {} groups to process ({} flagged, {} dropped)",
            "[INFO]".cyan(),
            scan.groups.len(),
            scan.flagged,
            scan.dropped
        );

        for mut group in scan.groups {
            process_group(&mut group, config, arr, executor).await?;
        }
    }

    Ok(())
}

/// Run every decision pass over one group.
async fn process_group(
    group: &mut DuplicateGroup,
    config: &Config,
    arr: &ArrClients,
    executor: &mut Executor<'_, PlexClient>,
) -> Result<()> {
    println!();
    println!("{}", group.title.bold());

    let passes: [fn(&DuplicateGroup, &Config) -> Vec<Decision>; 2] =
        [decision::unavailable_decisions, decision::extra_ts_decisions];
    for pass in passes {
        let decisions = pass(group, config);
        if !decisions.is_empty() {
            executor.apply(group, &decisions).await?;
            decision::remove_deleted(group, &decisions);
        }
    }

    if config.runtime.skip_other_dupes {
        return Ok(());
    }
    if group.items.len() < 2 {
        tracing::info!("No duplicates left for {:?}", group.title);
        return Ok(());
    }

    let arr_override = arr.preferred(group).await;

    let decisions = if config.runtime.auto_delete {
        match decision::auto_decisions(group, config, arr_override) {
            Some(decisions) => decisions,
            None => {
                println!("{} Unable to determine best media for {:?}", "[WARN]".yellow(), group.title);
                tracing::warn!("Unable to determine best media for {:?}", group.title);
                return Ok(());
            }
        }
    } else {
        choose_interactively(group, config, arr_override)?
    };

    executor.apply(group, &decisions).await
}

fn choose_interactively(
    group: &DuplicateGroup,
    config: &Config,
    arr_override: Option<u64>,
) -> Result<Vec<Decision>> {
    let ranked = decision::ranked(group, config);
    print_table(&ranked, arr_override);

    let ids: Vec<u64> = ranked.iter().map(|m| m.id).collect();
    let prompt = if arr_override.is_some() {
        "Choose item to keep (0 or s = skip | 1 or b = best | r = *arr preferred)"
    } else {
        "Choose item to keep (0 or s = skip | 1 or b = best)"
    };
    let answer: String = Input::new().with_prompt(prompt).allow_empty(true).interact_text()?;

    let choice = decision::parse_choice(&answer, ids.len(), arr_override.is_some());
    match choice {
        Choice::Invalid => println!("Unexpected response {:?}, skipping {:?}", answer.trim(), group.title),
        Choice::Skip => println!("Skipping deletion(s) for {:?}", group.title),
        _ => {}
    }

    Ok(decision::interactive_decisions(group, config, &ids, choice, arr_override))
}

/// Print the candidate table for the interactive prompt.
fn print_table(ranked: &[&MediaItem], arr_override: Option<u64>) {
    println!(
        "  {:<6} {:>12} {:>9}  {:<48} {:>10} {:>9} {:>10} {:>6}  {}",
        "choice", "score", "id", "file", "size", "duration", "bitrate", "res", "codecs"
    );
    for (row, media) in ranked.iter().enumerate() {
        let marker = if Some(media.id) == arr_override { "*" } else { "" };
        let score = media
            .score
            .map(format_thousands)
            .unwrap_or_else(|| "N/A".to_string());
        println!(
            "  {:<6} {:>12} {:>9}  {:<48} {:>10} {:>9} {:>10} {:>6}  {}",
            format!("{}{}", row + 1, marker),
            score,
            media.id,
            media.files_short.join(", "),
            bytes_to_string(media.file_size),
            millis_to_string(media.video_duration),
            kbps_to_string(media.video_bitrate),
            media.video_resolution,
            format!("{}, {}", media.video_codec, media.audio_codec)
        );
    }
}
