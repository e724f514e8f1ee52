//! Library scanner module.
//!
//! Asks Plex for items flagged as duplicates, re-fetches each one in full
//! and turns every remaining copy into a scored [`MediaItem`].

use crate::core::scorer::Scorer;
use crate::models::config::Config;
use crate::models::media::{DuplicateGroup, ExternalIds, MediaItem, MediaKind};
use crate::services::plex::{PlexClient, PlexItem, PlexMedia, STREAM_TYPE_AUDIO};
use crate::utils::format::shorten_path;
use crate::utils::fs::{get_extension, is_in_plex_versions};
use crate::Result;
use futures::stream::{self, StreamExt};
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::HashMap;

/// Concurrent metadata requests per library.
const FETCH_CONCURRENCY: usize = 4;

/// Result of scanning one library.
#[derive(Debug, Default)]
pub struct ScanResult {
    /// Groups with at least two candidates.
    pub groups: Vec<DuplicateGroup>,
    /// Items Plex flagged as duplicates.
    pub flagged: usize,
    /// Items dropped because fewer than two candidates remained.
    pub dropped: usize,
}

/// Scan a library section for duplicate groups.
pub async fn scan_library(
    client: &PlexClient,
    library: &str,
    config: &Config,
    scorer: &Scorer<'_>,
) -> Result<ScanResult> {
    let section = client.section_by_title(library).await?;
    let mut dupes = client.duplicates(&section).await?;

    if config.runtime.find_duplicate_filepaths_only {
        dupes.retain(has_identical_paths);
    }

    tracing::info!("Plex Dupe Finder Start - {} Library", library);
    println!("Found {} dupes for section {:?}", dupes.len(), library);

    let items = fetch_full_metadata(client, dupes, config.runtime.find_unavailable).await;

    let mut show_ids: HashMap<String, ExternalIds> = HashMap::new();
    let mut result = ScanResult {
        flagged: items.len(),
        ..Default::default()
    };

    for item in &items {
        let ids = match MediaKind::from_plex(&item.item_type) {
            MediaKind::Episode if config.scoring.sonarr.enabled => {
                show_external_ids(client, item, &mut show_ids).await
            }
            _ => ExternalIds {
                tmdb_id: item.guid_id("tmdb"),
                tvdb_id: None,
            },
        };

        match build_group(item, config, scorer, ids) {
            Some(group) => result.groups.push(group),
            None => {
                tracing::info!("No duplicates after ignoring optimized versions for : {:?}", item.title);
                println!("No duplicates after ignoring optimized versions for : {:?}", item.title);
                result.dropped += 1;
            }
        }
    }

    Ok(result)
}

/// Re-fetch every item with streams and GUIDs, keeping the original order.
///
/// Falls back to the search result when a fetch fails.
async fn fetch_full_metadata(client: &PlexClient, items: Vec<PlexItem>, check_files: bool) -> Vec<PlexItem> {
    let pb = ProgressBar::new(items.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=>-"),
    );

    let fetched: Vec<PlexItem> = stream::iter(items)
        .map(|item| {
            let pb = pb.clone();
            async move {
                if check_files && !all_parts_available(&item) {
                    tracing::debug!("Reloading {}", item.title);
                }
                let full = match client.metadata(&item.rating_key, check_files).await {
                    Ok(full) => full,
                    Err(e) => {
                        tracing::warn!("Failed to load metadata for {:?}: {}", item.title, e);
                        item
                    }
                };
                pb.set_message(full.title.clone());
                pb.inc(1);
                full
            }
        })
        .buffered(FETCH_CONCURRENCY)
        .collect()
        .await;

    pb.finish_and_clear();

    if check_files {
        for item in &fetched {
            for media in &item.media {
                for part in &media.parts {
                    tracing::debug!(
                        "{:?},{:?} -- {} exists = {:?}; size = {:?}",
                        media.id,
                        part.id,
                        part.file,
                        part.exists,
                        part.size
                    );
                }
            }
        }
    }

    fetched
}

/// Look up (and cache) the TVDB id of an episode's show.
async fn show_external_ids(
    client: &PlexClient,
    item: &PlexItem,
    cache: &mut HashMap<String, ExternalIds>,
) -> ExternalIds {
    let Some(show_key) = item.grandparent_rating_key.as_deref() else {
        return ExternalIds::default();
    };
    if let Some(ids) = cache.get(show_key) {
        return *ids;
    }

    let ids = match client.metadata(show_key, false).await {
        Ok(show) => ExternalIds {
            tmdb_id: None,
            tvdb_id: show.guid_id("tvdb"),
        },
        Err(e) => {
            tracing::warn!("Failed to load show metadata for {:?}: {}", item.grandparent_title, e);
            ExternalIds::default()
        }
    };
    cache.insert(show_key.to_string(), ids);
    ids
}

fn all_parts_available(item: &PlexItem) -> bool {
    item.media
        .iter()
        .flat_map(|m| m.parts.iter())
        .all(|p| p.exists != Some(false))
}

/// Whether every part of every copy points at the same file.
pub fn has_identical_paths(item: &PlexItem) -> bool {
    let mut locations = item.locations();
    match locations.next() {
        Some(first) => locations.all(|l| l == first),
        None => false,
    }
}

/// Friendly title used in logs and prompts.
pub fn group_title(item: &PlexItem) -> String {
    match MediaKind::from_plex(&item.item_type) {
        MediaKind::Movie => item.title.clone(),
        MediaKind::Episode => {
            let show = item.grandparent_title.as_deref().unwrap_or("Unknown");
            match (item.parent_index, item.index) {
                (Some(season), Some(episode)) => {
                    format!("{} - {:02}x{:02} - {}", show, season, episode, item.title)
                }
                _ => format!("{} - {}", show, item.title),
            }
        }
        MediaKind::Unknown => "Unknown".to_string(),
    }
}

/// Turn a Plex item into a duplicate group, dropping excluded copies.
///
/// Returns `None` when fewer than two candidates remain.
pub fn build_group(
    item: &PlexItem,
    config: &Config,
    scorer: &Scorer<'_>,
    ids: ExternalIds,
) -> Option<DuplicateGroup> {
    let title = group_title(item);
    tracing::info!("Processing: {:?}", title);

    let mut items = Vec::new();
    for media in &item.media {
        let mut info = media_item(item, media, ids);

        if info.optimized {
            tracing::info!("ID: {} ({:?}) -- Skipping optimized version", info.id, info.files_short);
            println!("ID: {} ({:?}) -- Skipping optimized version", info.id, info.files_short);
            continue;
        }
        if config.runtime.skip_plex_versions_folder
            && info.files.iter().any(|f| is_in_plex_versions(f))
        {
            tracing::info!("ID: {} ({:?}) -- Skipping Plex Versions", info.id, info.files_short);
            println!("ID: {} ({:?}) -- Skipping Plex Versions", info.id, info.files_short);
            continue;
        }

        tracing::debug!("ID: {} ({:?}) -- Including", info.id, info.files_short);

        if !config.runtime.find_duplicate_filepaths_only {
            info.score = Some(scorer.score(&info));
        }

        tracing::info!(
            "ID: {} - Score: {} - Meta:\n{:?}",
            info.id,
            info.score.map(|s| s.to_string()).unwrap_or_else(|| "N/A".to_string()),
            info
        );
        items.push(info);
    }

    if items.len() < 2 {
        return None;
    }

    Some(DuplicateGroup {
        title,
        rating_key: item.rating_key.clone(),
        kind: MediaKind::from_plex(&item.item_type),
        items,
    })
}

/// Extract the attributes of one copy.
pub fn media_item(item: &PlexItem, media: &PlexMedia, ids: ExternalIds) -> MediaItem {
    let mut info = MediaItem {
        id: media.id,
        show_key: item.key.clone(),
        video_bitrate: media.bitrate.unwrap_or(0),
        video_codec: media.video_codec.clone().unwrap_or_else(|| "Unknown".to_string()),
        video_resolution: media
            .video_resolution
            .clone()
            .unwrap_or_else(|| "Unknown".to_string()),
        video_width: media.width.unwrap_or(0),
        video_height: media.height.unwrap_or(0),
        video_duration: media.duration.unwrap_or(0),
        audio_codec: media.audio_codec.clone().unwrap_or_else(|| "Unknown".to_string()),
        multipart: media.parts.len() > 1,
        optimized: media.is_optimized_version.unwrap_or(false),
        file_exists: true,
        kind: MediaKind::from_plex(&item.item_type),
        ids,
        ..Default::default()
    };

    for part in &media.parts {
        for stream in part.streams.iter().filter(|s| s.stream_type == STREAM_TYPE_AUDIO) {
            if let Some(channels) = stream.channels {
                tracing::debug!(
                    "Added {} channels for {} audioStream",
                    channels,
                    stream.title.as_deref().unwrap_or("Unknown")
                );
                info.audio_channels += channels;
            }
        }
    }
    if info.audio_channels == 0 {
        info.audio_channels = media.audio_channels.unwrap_or(0);
    }

    for part in &media.parts {
        info.files.push(part.file.clone());
        info.files_short.push(shorten_path(&part.file));
        info.file_size += part.size.unwrap_or(0);

        if part.exists == Some(false) {
            info.file_exists = false;
        }

        *info.file_exts.entry(get_extension(&part.file)).or_insert(0) += 1;
    }

    info
}
