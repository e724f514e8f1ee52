//! Decision data model.

use serde::{Deserialize, Serialize};

/// Why a copy was kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeepReason {
    BestScore,
    ArrPreferred,
    Manual,
    LowestId,
}

/// Why a copy is deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeleteReason {
    /// Plex reports the file missing.
    Unavailable,
    /// `.ts` copy next to another container.
    ExtraTs,
    /// Lost the automatic score comparison.
    LowerScore,
    /// Not picked in interactive mode.
    NotChosen,
}

/// Why a copy was left alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// Reported unavailable but with a nonzero size.
    NonzeroSize,
    SkipList,
    /// The copy mixes `.ts` with other containers.
    MixedFileTypes,
    UserSkipped,
}

/// Verdict for a single copy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", content = "reason", rename_all = "snake_case")]
pub enum Verdict {
    Keep(KeepReason),
    Delete(DeleteReason),
    Skip(SkipReason),
}

impl Verdict {
    pub fn is_delete(&self) -> bool {
        matches!(self, Verdict::Delete(_))
    }
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Verdict::Keep(reason) => write!(f, "keep ({:?})", reason),
            Verdict::Delete(reason) => write!(f, "delete ({:?})", reason),
            Verdict::Skip(reason) => write!(f, "skip ({:?})", reason),
        }
    }
}

/// Decision for one media id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Decision {
    pub media_id: u64,
    pub verdict: Verdict,
}

impl Decision {
    pub fn keep(media_id: u64, reason: KeepReason) -> Self {
        Self {
            media_id,
            verdict: Verdict::Keep(reason),
        }
    }

    pub fn delete(media_id: u64, reason: DeleteReason) -> Self {
        Self {
            media_id,
            verdict: Verdict::Delete(reason),
        }
    }

    pub fn skip(media_id: u64, reason: SkipReason) -> Self {
        Self {
            media_id,
            verdict: Verdict::Skip(reason),
        }
    }
}
