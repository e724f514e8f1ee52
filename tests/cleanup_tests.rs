//! Integration tests for log-based cleanup.
//!
//! Tests cover:
//! - Legacy `Removing : {...}` lines, including bracketed file names
//! - Structured decision log records, with and without `--failed-only`
//! - Missing files and re-runs
//! - Dry run

use plex_dupefinder::core::activity::ActivityLog;
use plex_dupefinder::core::cleanup::{legacy_paths, parse_line, run_cleanup, CleanupOptions, LineEntry};
use plex_dupefinder::models::activity::Outcome;
use plex_dupefinder::models::decision::{Decision, DeleteReason, KeepReason};
use plex_dupefinder::models::media::MediaItem;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn touch(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, "fake video content").unwrap();
    path
}

#[test]
fn test_extracts_single_legacy_path() {
    assert_eq!(
        legacy_paths("Removing : {'file': ['/a/b/c.mkv']}"),
        Some(vec!["/a/b/c.mkv".to_string()])
    );
}

#[test]
fn test_marker_without_file_list_yields_nothing() {
    assert_eq!(legacy_paths("Removing : {'id': 1, 'score': 10}"), None);
    assert_eq!(parse_line("Removing : {'id': 1, 'score': 10}", false), LineEntry::Malformed);
}

#[test]
fn test_lines_without_marker_are_ignored() {
    assert_eq!(
        parse_line("2023-01-01 Keeping : {'file': ['/media/movie.mkv']}", false),
        LineEntry::Ignored
    );
    assert_eq!(parse_line("random text 'file': ['/x.mkv']", false), LineEntry::Ignored);
}

#[test]
fn test_end_to_end_legacy_log() {
    let temp_dir = TempDir::new().unwrap();
    let removed = touch(temp_dir.path(), "movie (1).mkv");
    let kept = touch(temp_dir.path(), "movie.mkv");

    let log_file = temp_dir.path().join("activity.log");
    fs::write(
        &log_file,
        format!(
            "2023-01-01 Removing : {{'file': ['{}']}}\n2023-01-01 Keeping : {{'file': ['{}']}}\n",
            removed.display(),
            kept.display()
        ),
    )
    .unwrap();

    let result = run_cleanup(&log_file, CleanupOptions::default()).unwrap();

    assert_eq!(result.paths, vec![removed.to_string_lossy().to_string()]);
    assert_eq!(result.removed, 1);
    assert!(!removed.exists());
    assert!(kept.exists());
}

#[test]
fn test_legacy_path_with_brackets_is_removed() {
    let temp_dir = TempDir::new().unwrap();
    let removed = touch(temp_dir.path(), "Heat (1995) [1080p].mkv");
    let log_file = temp_dir.path().join("activity.log");
    fs::write(
        &log_file,
        format!("Removing : {{'file': ['{}'], 'id': 7}}\n", removed.display()),
    )
    .unwrap();

    let result = run_cleanup(&log_file, CleanupOptions::default()).unwrap();

    assert_eq!(result.paths, vec![removed.to_string_lossy().to_string()]);
    assert_eq!(result.removed, 1);
    assert_eq!(result.malformed, 0);
    assert!(!removed.exists());
}

#[test]
fn test_missing_file_does_not_abort() {
    let temp_dir = TempDir::new().unwrap();
    let present = touch(temp_dir.path(), "b.mkv");
    let log_file = temp_dir.path().join("activity.log");
    fs::write(
        &log_file,
        format!(
            "Removing : {{'file': ['{}']}}\nRemoving : {{'id': 3}}\nRemoving : {{'file': ['{}']}}\n",
            temp_dir.path().join("gone.mkv").display(),
            present.display()
        ),
    )
    .unwrap();

    let first = run_cleanup(&log_file, CleanupOptions::default()).unwrap();
    assert_eq!(first.missing, 1);
    assert_eq!(first.malformed, 1);
    assert_eq!(first.removed, 1);
    assert!(!present.exists());

    // Re-running is harmless.
    let second = run_cleanup(&log_file, CleanupOptions::default()).unwrap();
    assert_eq!(second.removed, 0);
    assert_eq!(second.missing, 2);
    assert_eq!(second.failed, 0);
}

#[test]
fn test_structured_records() {
    let temp_dir = TempDir::new().unwrap();
    let deleted = touch(temp_dir.path(), "deleted.mkv");
    let failed = touch(temp_dir.path(), "failed.mkv");
    let dry_run = touch(temp_dir.path(), "dry_run.mkv");
    let kept = touch(temp_dir.path(), "kept.mkv");

    let log = ActivityLog::new(temp_dir.path().join("decisions.log"), chrono_tz::UTC);
    let entries = [
        (1, &deleted, Decision::delete(1, DeleteReason::LowerScore), Outcome::Deleted),
        (2, &failed, Decision::delete(2, DeleteReason::Unavailable), Outcome::Failed),
        (3, &dry_run, Decision::delete(3, DeleteReason::ExtraTs), Outcome::DryRun),
        (4, &kept, Decision::keep(4, KeepReason::BestScore), Outcome::Kept),
    ];
    for (id, path, decision, outcome) in entries {
        let media = MediaItem {
            id,
            files: vec![path.to_string_lossy().to_string()],
            ..Default::default()
        };
        log.append(&log.record("Heat", &media, &decision, outcome)).unwrap();
    }

    let failed_only = run_cleanup(
        log.path(),
        CleanupOptions {
            dry_run: false,
            failed_only: true,
        },
    )
    .unwrap();
    assert_eq!(failed_only.removed, 1);
    assert!(!failed.exists());
    assert!(deleted.exists());

    let all = run_cleanup(log.path(), CleanupOptions::default()).unwrap();
    assert_eq!(all.removed, 1);
    assert_eq!(all.missing, 1);
    assert!(!deleted.exists());
    assert!(dry_run.exists());
    assert!(kept.exists());
}

#[test]
fn test_dry_run_removes_nothing() {
    let temp_dir = TempDir::new().unwrap();
    let target = touch(temp_dir.path(), "movie (1).mkv");
    let log_file = temp_dir.path().join("activity.log");
    fs::write(&log_file, format!("Removing : {{'file': ['{}']}}\n", target.display())).unwrap();

    let result = run_cleanup(
        &log_file,
        CleanupOptions {
            dry_run: true,
            failed_only: false,
        },
    )
    .unwrap();

    assert_eq!(result.removed, 1);
    assert!(target.exists());
}
