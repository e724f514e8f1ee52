//! Log-based cleanup module.
//!
//! Re-reads a decision log and removes from disk the files of copies that
//! were marked for deletion. Understands two line formats:
//! - structured [`ActivityRecord`] JSON lines
//! - legacy `Removing : {'file': [...], ...}` lines

use crate::models::activity::{ActivityRecord, Outcome};
use crate::utils::fs::remove_file_if_exists;
use crate::Result;
use colored::Colorize;
use regex::Regex;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::sync::LazyLock;

/// Marker of a legacy removal line.
pub const LEGACY_MARKER: &str = "Removing : {";

/// Opening of the `'file': [` list in a legacy line.
static FILE_LIST_START: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"'file':\s*\[").ok());

/// What a single log line contributes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineEntry {
    /// Paths to remove.
    Paths(Vec<String>),
    /// Removal marker present but no file list could be extracted.
    Malformed,
    /// Nothing to do for this line.
    Ignored,
}

/// Cleanup options.
#[derive(Debug, Clone, Copy, Default)]
pub struct CleanupOptions {
    /// Print paths without removing anything.
    pub dry_run: bool,
    /// Only structured records whose Plex deletion failed.
    pub failed_only: bool,
}

/// Cleanup counters.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CleanupResult {
    /// Files removed (or that would be, in dry-run).
    pub removed: usize,
    /// Paths that no longer existed.
    pub missing: usize,
    /// Paths that could not be removed.
    pub failed: usize,
    /// Removal lines without a usable file list.
    pub malformed: usize,
    /// Every path extracted, in log order.
    pub paths: Vec<String>,
}

impl CleanupResult {
    /// Print summary.
    pub fn print_summary(&self, dry_run: bool) {
        println!();
        let verb = if dry_run { "Would remove" } else { "Removed" };
        println!("{} {}", format!("{}:", verb).bold(), self.removed);
        println!("{} {}", "Already missing:".bold(), self.missing);
        if self.failed > 0 {
            println!("{} {}", "Failed:".bold().red(), self.failed);
        }
        if self.malformed > 0 {
            println!("{} {}", "Malformed lines:".bold().yellow(), self.malformed);
        }
    }
}

/// Classify one log line.
pub fn parse_line(line: &str, failed_only: bool) -> LineEntry {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return LineEntry::Ignored;
    }

    if trimmed.starts_with('{') {
        if let Ok(record) = serde_json::from_str::<ActivityRecord>(trimmed) {
            return if selects(&record, failed_only) {
                LineEntry::Paths(record.file)
            } else {
                LineEntry::Ignored
            };
        }
    }

    if !line.contains(LEGACY_MARKER) {
        return LineEntry::Ignored;
    }
    match legacy_paths(line) {
        Some(paths) if !paths.is_empty() => LineEntry::Paths(paths),
        _ => LineEntry::Malformed,
    }
}

fn selects(record: &ActivityRecord, failed_only: bool) -> bool {
    if !record.verdict.is_delete() {
        return false;
    }
    match record.outcome {
        Outcome::Failed => true,
        Outcome::Deleted | Outcome::DeletedLocally => !failed_only,
        Outcome::DryRun | Outcome::Kept | Outcome::Skipped => false,
    }
}

/// Extract the `'file': [...]` entries from a legacy line.
///
/// Returns `None` when the fragment is absent. Brackets inside quoted
/// entries do not end the list.
pub fn legacy_paths(line: &str) -> Option<Vec<String>> {
    let start = line.find(LEGACY_MARKER)?;
    let rest = &line[start..];
    let open = FILE_LIST_START.as_ref()?.find(rest)?;
    Some(parse_quoted_list(&rest[open.end()..]))
}

/// Parse a quoted string list such as `'a', "b"]`, up to the first unquoted `]`.
fn parse_quoted_list(list: &str) -> Vec<String> {
    let mut items = Vec::new();
    let mut chars = list.chars();

    while let Some(c) = chars.next() {
        if c == ']' {
            break;
        }
        if c != '\'' && c != '"' {
            continue;
        }
        let quote = c;
        let mut item = String::new();
        let mut closed = false;
        while let Some(c) = chars.next() {
            match c {
                '\\' => match chars.next() {
                    Some('n') => item.push('\n'),
                    Some('t') => item.push('\t'),
                    Some(other) => item.push(other),
                    None => break,
                },
                c if c == quote => {
                    closed = true;
                    break;
                }
                c => item.push(c),
            }
        }
        if closed && !item.is_empty() {
            items.push(item);
        }
    }

    items
}

/// Run cleanup over a log file.
pub fn run_cleanup(log_file: &Path, options: CleanupOptions) -> Result<CleanupResult> {
    let reader = BufReader::new(File::open(log_file)?);
    let mut result = CleanupResult::default();

    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        match parse_line(&line, options.failed_only) {
            LineEntry::Paths(paths) => {
                for path in paths {
                    remove_path(&path, options.dry_run, &mut result);
                    result.paths.push(path);
                }
            }
            LineEntry::Malformed => {
                println!(
                    "{} line {}: removal entry without a file list",
                    "[WARN]".yellow(),
                    index + 1
                );
                tracing::warn!("Malformed removal entry on line {}: {}", index + 1, line);
                result.malformed += 1;
            }
            LineEntry::Ignored => {}
        }
    }

    Ok(result)
}

fn remove_path(path: &str, dry_run: bool, result: &mut CleanupResult) {
    println!("{}", path);

    if dry_run {
        if Path::new(path).exists() {
            println!("  {} Would remove {}", "[DRY RUN]".yellow(), path);
            result.removed += 1;
        } else {
            println!("  {} Already missing", "[INFO]".cyan());
            result.missing += 1;
        }
        return;
    }

    match remove_file_if_exists(Path::new(path)) {
        Ok(true) => {
            tracing::info!("Removed {}", path);
            result.removed += 1;
        }
        Ok(false) => {
            println!("  {} Already missing", "[INFO]".cyan());
            tracing::info!("Already missing: {}", path);
            result.missing += 1;
        }
        Err(e) => {
            println!("  {} {}", "[FAILED]".red(), e);
            tracing::error!("Failed to remove {}: {}", path, e);
            result.failed += 1;
        }
    }
}
