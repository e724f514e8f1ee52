//! Decision log record model.
//!
//! One JSON object per line. The `cleanup` command reads these back, so the
//! layout is versioned.

use super::decision::Verdict;
use serde::{Deserialize, Serialize};

/// Current record format version.
pub const RECORD_VERSION: u32 = 1;

/// What actually happened to a copy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Kept,
    Skipped,
    /// Plex accepted the delete request.
    Deleted,
    /// Dry run; nothing was touched.
    DryRun,
    /// Plex refused or the request failed.
    Failed,
    /// Plex refused, files were removed from disk instead.
    DeletedLocally,
}

/// A single decision log line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityRecord {
    pub version: u32,
    /// RFC 3339 timestamp in the logging timezone.
    pub timestamp: String,
    /// Timezone abbreviation (e.g. "EST").
    pub timezone: String,
    /// Offset from UTC in whole hours.
    pub utc_offset: i32,
    pub run_id: String,
    pub title: String,
    pub media_id: u64,
    pub verdict: Verdict,
    pub outcome: Outcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<i64>,
    pub file: Vec<String>,
    pub file_size: u64,
}
