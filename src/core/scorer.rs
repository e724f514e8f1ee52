//! Duplicate scoring.
//!
//! The score is a plain sum of per-attribute contributions. Every
//! contribution is logged at debug level so a surprising choice can be
//! traced back in `activity.log`.

use crate::models::config::Config;
use crate::models::media::MediaItem;
use crate::utils::fs::file_name;
use crate::Result;
use glob::{MatchOptions, Pattern};

/// Compiled scoring rules.
pub struct Scorer<'a> {
    config: &'a Config,
    filename_patterns: Vec<(Pattern, String, i64)>,
}

impl<'a> Scorer<'a> {
    /// Compile the filename patterns of a config.
    pub fn new(config: &'a Config) -> Result<Self> {
        let filename_patterns = config
            .filename_scores
            .iter()
            .map(|(glob, score)| {
                Pattern::new(&glob.to_lowercase())
                    .map(|p| (p, glob.clone(), *score))
                    .map_err(|e| crate::Error::InvalidPattern {
                        pattern: glob.clone(),
                        message: e.to_string(),
                    })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            config,
            filename_patterns,
        })
    }

    /// Score a single copy.
    pub fn score(&self, media: &MediaItem) -> i64 {
        let scoring = &self.config.scoring;
        let mut score = 0f64;

        if let Some(s) = lookup(&self.config.audio_codec_scores, &media.audio_codec) {
            tracing::debug!("Added {} to score for audio_codec being {:?}", s, media.audio_codec);
            score += s as f64;
        }

        if let Some(s) = lookup(&self.config.video_codec_scores, &media.video_codec) {
            tracing::debug!("Added {} to score for video_codec being {:?}", s, media.video_codec);
            score += s as f64;
        }

        if let Some(s) = lookup(&self.config.video_resolution_scores, &media.video_resolution) {
            tracing::debug!(
                "Added {} to score for video_resolution being {:?}",
                s,
                media.video_resolution
            );
            score += s as f64;
        }

        let options = MatchOptions {
            case_sensitive: false,
            require_literal_separator: false,
            require_literal_leading_dot: false,
        };
        for (pattern, raw, keyword_score) in &self.filename_patterns {
            for file in &media.files {
                let name = file_name(file).to_lowercase();
                if pattern.matches_with(&name, options) {
                    tracing::debug!("Added {} to score for match filename_keyword {}", keyword_score, raw);
                    score += *keyword_score as f64;
                }
            }
        }

        if scoring.score_videobitrate.enabled {
            let s = media.video_bitrate as f64 * scoring.score_videobitrate.multiplier;
            tracing::debug!("Added {} to score for video bitrate being {}", s, media.video_bitrate);
            score += s;
        }

        let s = media.video_duration as f64 / 300.0;
        tracing::debug!("Added {} to score for video duration being {}", s, media.video_duration);
        score += s;

        let s = media.video_width as f64 * 2.0;
        tracing::debug!("Added {} to score for video width being {}", s, media.video_width);
        score += s;

        let s = media.video_height as f64 * scoring.video_height_multiplier;
        tracing::debug!("Added {} to score for video height being {}", s, media.video_height);
        score += s;

        if scoring.score_audiochannels {
            let s = media.audio_channels as f64 * 1000.0;
            tracing::debug!("Added {} to score for audio channels being {}", s, media.audio_channels);
            score += s;
        }

        if scoring.score_filesize {
            let s = media.file_size as f64 / 100_000.0;
            tracing::debug!("Added {} to score for total file size being {}", s, media.file_size);
            score += s;
        }

        score as i64
    }
}

/// Case-insensitive lookup in a score table.
fn lookup(table: &std::collections::BTreeMap<String, i64>, name: &str) -> Option<i64> {
    table
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(name))
        .map(|(_, score)| *score)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_is_case_insensitive() {
        let config = Config::default();
        assert_eq!(lookup(&config.video_codec_scores, "H264"), Some(10000));
        assert_eq!(lookup(&config.video_resolution_scores, "4K"), Some(20000));
        assert_eq!(lookup(&config.audio_codec_scores, "opus"), None);
    }

    #[test]
    fn test_invalid_pattern_is_rejected() {
        let mut config = Config::default();
        config.filename_scores.insert("[*".to_string(), 10);
        assert!(Scorer::new(&config).is_err());
    }
}
