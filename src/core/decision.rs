//! Decision engine.
//!
//! Pure functions that turn a [`DuplicateGroup`] into per-copy
//! [`Decision`]s. Nothing here talks to Plex or the filesystem, so every
//! rule can be exercised directly.
//!
//! Passes run in this order for each group:
//! 1. unavailable media (`FIND_UNAVAILABLE`)
//! 2. extra `.ts` copies (`FIND_EXTRA_TS`)
//! 3. score based resolution, automatic or interactive (unless `SKIP_OTHER_DUPES`)
//!
//! Copies deleted by an earlier pass are removed from the group with
//! [`remove_deleted`] before the next pass.

use crate::models::config::Config;
use crate::models::decision::{Decision, DeleteReason, KeepReason, SkipReason};
use crate::models::media::{DuplicateGroup, MediaItem};
use crate::utils::fs::file_name;
use std::collections::BTreeMap;

const TS_EXTENSION: &str = ".ts";

/// Whether any skip list entry appears in any of the copy's paths.
pub fn on_skip_list(media: &MediaItem, skip_list: &[String]) -> bool {
    media
        .files
        .iter()
        .any(|file| skip_list.iter().any(|skip| !skip.is_empty() && file.contains(skip.as_str())))
}

/// Decisions for copies Plex reports as unavailable.
pub fn unavailable_decisions(group: &DuplicateGroup, config: &Config) -> Vec<Decision> {
    if !config.runtime.find_unavailable {
        return Vec::new();
    }

    group
        .items
        .iter()
        .filter(|m| !m.file_exists)
        .map(|m| {
            if m.file_size > 0 {
                // Plex still knows a size, the "missing" flag is likely stale.
                Decision::skip(m.id, SkipReason::NonzeroSize)
            } else if on_skip_list(m, &config.skip_list) {
                Decision::skip(m.id, SkipReason::SkipList)
            } else {
                Decision::delete(m.id, DeleteReason::Unavailable)
            }
        })
        .collect()
}

/// Decisions for `.ts` copies when another container exists in the group.
pub fn extra_ts_decisions(group: &DuplicateGroup, config: &Config) -> Vec<Decision> {
    if !config.runtime.find_extra_ts {
        return Vec::new();
    }

    let mut exts: BTreeMap<&str, usize> = BTreeMap::new();
    for media in &group.items {
        for (ext, count) in &media.file_exts {
            *exts.entry(ext.as_str()).or_insert(0) += count;
        }
    }
    if exts.len() < 2 || !exts.contains_key(TS_EXTENSION) {
        return Vec::new();
    }

    group
        .items
        .iter()
        .filter(|m| m.file_exts.contains_key(TS_EXTENSION))
        .map(|m| {
            if m.file_exts.len() != 1 {
                Decision::skip(m.id, SkipReason::MixedFileTypes)
            } else if on_skip_list(m, &config.skip_list) {
                Decision::skip(m.id, SkipReason::SkipList)
            } else {
                Decision::delete(m.id, DeleteReason::ExtraTs)
            }
        })
        .collect()
}

/// The copy whose first part has the same file name as a file the *arr
/// service tracks.
pub fn arr_preferred_media(group: &DuplicateGroup, preferred: &[String]) -> Option<u64> {
    let names: Vec<&str> = preferred.iter().map(|p| file_name(p)).collect();
    group
        .items
        .iter()
        .find(|m| {
            m.files
                .first()
                .map(|f| names.contains(&file_name(f)))
                .unwrap_or(false)
        })
        .map(|m| m.id)
}

/// Pick the copy to keep in automatic mode.
///
/// Filepath-only mode keeps the lowest media id. Otherwise the *arr
/// preferred copy wins, then the first copy with the highest positive score.
pub fn pick_keeper(
    group: &DuplicateGroup,
    config: &Config,
    arr_override: Option<u64>,
) -> Option<(u64, KeepReason)> {
    if config.runtime.find_duplicate_filepaths_only {
        return group
            .items
            .iter()
            .map(|m| m.id)
            .min()
            .map(|id| (id, KeepReason::LowestId));
    }

    if let Some(id) = arr_override {
        if group.get(id).is_some() {
            return Some((id, KeepReason::ArrPreferred));
        }
    }

    let mut best: Option<(u64, i64)> = None;
    for media in &group.items {
        let score = media.score_or_zero();
        if score > best.map(|(_, s)| s).unwrap_or(0) {
            best = Some((media.id, score));
        }
    }
    best.map(|(id, _)| (id, KeepReason::BestScore))
}

/// Automatic resolution: keep one copy, delete the rest.
///
/// Returns `None` when no keeper can be determined.
pub fn auto_decisions(
    group: &DuplicateGroup,
    config: &Config,
    arr_override: Option<u64>,
) -> Option<Vec<Decision>> {
    let (keep_id, reason) = pick_keeper(group, config, arr_override)?;
    Some(resolve_with_keeper(group, config, keep_id, reason, DeleteReason::LowerScore))
}

fn resolve_with_keeper(
    group: &DuplicateGroup,
    config: &Config,
    keep_id: u64,
    keep_reason: KeepReason,
    delete_reason: DeleteReason,
) -> Vec<Decision> {
    group
        .items
        .iter()
        .map(|m| {
            if m.id == keep_id {
                Decision::keep(m.id, keep_reason)
            } else if on_skip_list(m, &config.skip_list) {
                Decision::skip(m.id, SkipReason::SkipList)
            } else {
                Decision::delete(m.id, delete_reason)
            }
        })
        .collect()
}

/// Copies in the order shown to the user: best score first, or lowest id
/// first in filepath-only mode.
pub fn ranked<'a>(group: &'a DuplicateGroup, config: &Config) -> Vec<&'a MediaItem> {
    let mut items: Vec<&MediaItem> = group.items.iter().collect();
    if config.runtime.find_duplicate_filepaths_only {
        items.sort_by_key(|m| m.id);
    } else {
        // Stable sort keeps Plex order among equal scores.
        items.sort_by(|a, b| b.score_or_zero().cmp(&a.score_or_zero()));
    }
    items
}

/// Answer to the interactive "which copy do you keep" prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Choice {
    /// Leave the group alone.
    Skip,
    /// Keep the first ranked copy.
    Best,
    /// Keep the *arr preferred copy.
    Arr,
    /// Keep the copy on this 1-based row.
    Row(usize),
    /// Not understood; treated as skip.
    Invalid,
}

/// Parse the prompt answer.
pub fn parse_choice(input: &str, rows: usize, arr_available: bool) -> Choice {
    let answer = input.trim().to_lowercase();
    match answer.as_str() {
        "s" | "0" => Choice::Skip,
        "b" => Choice::Best,
        "r" if arr_available => Choice::Arr,
        _ => match answer.parse::<usize>() {
            Ok(n) if n >= 1 && n <= rows => Choice::Row(n),
            _ => Choice::Invalid,
        },
    }
}

/// Decisions for an interactive answer.
///
/// `ranked_ids` is the order the rows were displayed in.
pub fn interactive_decisions(
    group: &DuplicateGroup,
    config: &Config,
    ranked_ids: &[u64],
    choice: Choice,
    arr_override: Option<u64>,
) -> Vec<Decision> {
    let best_reason = if config.runtime.find_duplicate_filepaths_only {
        KeepReason::LowestId
    } else {
        KeepReason::BestScore
    };

    let keeper = match choice {
        Choice::Best => ranked_ids.first().map(|id| (*id, best_reason)),
        Choice::Arr => arr_override.map(|id| (id, KeepReason::ArrPreferred)),
        Choice::Row(n) => ranked_ids.get(n - 1).map(|id| (*id, KeepReason::Manual)),
        Choice::Skip | Choice::Invalid => None,
    };

    match keeper {
        Some((keep_id, reason)) if group.get(keep_id).is_some() => {
            resolve_with_keeper(group, config, keep_id, reason, DeleteReason::NotChosen)
        }
        _ => group
            .items
            .iter()
            .map(|m| Decision::skip(m.id, SkipReason::UserSkipped))
            .collect(),
    }
}

/// Drop copies a pass decided to delete so later passes ignore them.
pub fn remove_deleted(group: &mut DuplicateGroup, decisions: &[Decision]) {
    let removed: Vec<u64> = decisions
        .iter()
        .filter(|d| d.verdict.is_delete())
        .map(|d| d.media_id)
        .collect();
    group.retain_except(&removed);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_choice() {
        assert_eq!(parse_choice(" S ", 3, false), Choice::Skip);
        assert_eq!(parse_choice("0", 3, false), Choice::Skip);
        assert_eq!(parse_choice("b", 3, false), Choice::Best);
        assert_eq!(parse_choice("r", 3, true), Choice::Arr);
        assert_eq!(parse_choice("r", 3, false), Choice::Invalid);
        assert_eq!(parse_choice("2", 3, false), Choice::Row(2));
        assert_eq!(parse_choice("4", 3, false), Choice::Invalid);
        assert_eq!(parse_choice("keep", 3, false), Choice::Invalid);
    }
}
