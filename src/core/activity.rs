//! Decision log writer.
//!
//! Appends one [`ActivityRecord`] per decision to a JSON Lines file. The
//! `cleanup` command reads the same file back.

use crate::models::activity::{ActivityRecord, Outcome, RECORD_VERSION};
use crate::models::decision::Decision;
use crate::models::media::MediaItem;
use crate::Result;
use chrono::{Offset, Utc};
use chrono_tz::Tz;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Timestamp parts in a given timezone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZonedStamp {
    /// RFC 3339 timestamp.
    pub timestamp: String,
    /// Abbreviation such as "UTC" or "EST".
    pub abbreviation: String,
    /// Offset from UTC in whole hours.
    pub utc_offset: i32,
}

/// Current time in `tz`.
pub fn zoned_now(tz: Tz) -> ZonedStamp {
    let now = Utc::now().with_timezone(&tz);
    ZonedStamp {
        timestamp: now.to_rfc3339(),
        abbreviation: now.format("%Z").to_string(),
        utc_offset: now.offset().fix().local_minus_utc() / 3600,
    }
}

/// Append-only decision log.
pub struct ActivityLog {
    path: PathBuf,
    tz: Tz,
    run_id: String,
}

impl ActivityLog {
    /// Create a log writing to `path`. Nothing is written until the first record.
    pub fn new(path: PathBuf, tz: Tz) -> Self {
        Self {
            path,
            tz,
            run_id: Uuid::new_v4().to_string(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    /// Build a record for a decision on `media`.
    pub fn record(&self, title: &str, media: &MediaItem, decision: &Decision, outcome: Outcome) -> ActivityRecord {
        let stamp = zoned_now(self.tz);
        ActivityRecord {
            version: RECORD_VERSION,
            timestamp: stamp.timestamp,
            timezone: stamp.abbreviation,
            utc_offset: stamp.utc_offset,
            run_id: self.run_id.clone(),
            title: title.to_string(),
            media_id: media.id,
            verdict: decision.verdict,
            outcome,
            score: media.score,
            file: media.files.clone(),
            file_size: media.file_size,
        }
    }

    /// Append a record as one JSON line.
    pub fn append(&self, record: &ActivityRecord) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        let mut line = serde_json::to_string(record)?;
        line.push('\n');

        let mut file = OpenOptions::new().create(true).append(true).open(&self.path)?;
        file.write_all(line.as_bytes())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::decision::DeleteReason;

    #[test]
    fn test_zoned_now_utc() {
        let stamp = zoned_now(chrono_tz::UTC);
        assert_eq!(stamp.abbreviation, "UTC");
        assert_eq!(stamp.utc_offset, 0);
        assert!(stamp.timestamp.ends_with("+00:00"));
    }

    #[test]
    fn test_append_writes_json_lines() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let log = ActivityLog::new(temp_dir.path().join("logs").join("decisions.log"), chrono_tz::UTC);
        let media = MediaItem {
            id: 7,
            files: vec!["/movies/a.mkv".to_string()],
            ..Default::default()
        };
        let decision = Decision::delete(7, DeleteReason::LowerScore);

        log.append(&log.record("A", &media, &decision, Outcome::DryRun)).unwrap();
        log.append(&log.record("A", &media, &decision, Outcome::Deleted)).unwrap();

        let content = fs::read_to_string(log.path()).unwrap();
        let records: Vec<ActivityRecord> = content
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].outcome, Outcome::Deleted);
        assert_eq!(records[0].run_id, log.run_id());
    }
}
