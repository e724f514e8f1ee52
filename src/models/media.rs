//! Media-related data models.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Kind of library entry a duplicate belongs to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Movie,
    Episode,
    #[default]
    Unknown,
}

impl MediaKind {
    /// Map a Plex metadata `type` attribute.
    pub fn from_plex(kind: &str) -> Self {
        match kind {
            "movie" => MediaKind::Movie,
            "episode" => MediaKind::Episode,
            _ => MediaKind::Unknown,
        }
    }
}

impl std::fmt::Display for MediaKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MediaKind::Movie => write!(f, "movie"),
            MediaKind::Episode => write!(f, "episode"),
            MediaKind::Unknown => write!(f, "unknown"),
        }
    }
}

/// External ids attached to a Plex item.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalIds {
    /// TMDB id (movies).
    pub tmdb_id: Option<u64>,
    /// TVDB id of the show (episodes).
    pub tvdb_id: Option<u64>,
}

/// A single copy (Plex "media") of a library entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MediaItem {
    /// Plex media id, used for deletion.
    pub id: u64,
    /// Key of the owning item (e.g. `/library/metadata/123`).
    pub show_key: String,
    /// Part file paths.
    pub files: Vec<String>,
    /// Part paths shortened to their last three components.
    pub files_short: Vec<String>,
    /// Sum of part sizes in bytes.
    pub file_size: u64,
    /// Plex resolution label (e.g. "1080", "4k", "sd").
    pub video_resolution: String,
    pub video_width: u32,
    pub video_height: u32,
    /// Duration in milliseconds.
    pub video_duration: u64,
    /// Bitrate in kbps.
    pub video_bitrate: u64,
    pub video_codec: String,
    pub audio_codec: String,
    pub audio_channels: u32,
    /// Lowercased extension (with dot) -> number of parts.
    pub file_exts: BTreeMap<String, usize>,
    /// Media consists of more than one part (CD1/CD2).
    pub multipart: bool,
    /// Plex generated optimized version.
    pub optimized: bool,
    /// False when Plex reports any part as missing.
    pub file_exists: bool,
    pub kind: MediaKind,
    pub ids: ExternalIds,
    /// Quality score, `None` in filepath-only mode.
    pub score: Option<i64>,
}

impl MediaItem {
    /// First shortened path, for display.
    pub fn display_path(&self) -> String {
        self.files_short
            .first()
            .cloned()
            .unwrap_or_else(|| format!("<media {}>", self.id))
    }

    /// Score or zero.
    pub fn score_or_zero(&self) -> i64 {
        self.score.unwrap_or(0)
    }
}

/// A library entry with more than one candidate copy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DuplicateGroup {
    /// Human readable title.
    pub title: String,
    /// Plex rating key of the item.
    pub rating_key: String,
    pub kind: MediaKind,
    /// Candidate copies in Plex order.
    pub items: Vec<MediaItem>,
}

impl DuplicateGroup {
    /// Find a candidate by media id.
    pub fn get(&self, media_id: u64) -> Option<&MediaItem> {
        self.items.iter().find(|m| m.id == media_id)
    }

    /// Drop candidates that were already removed.
    pub fn retain_except(&mut self, removed: &[u64]) {
        self.items.retain(|m| !removed.contains(&m.id));
    }
}
