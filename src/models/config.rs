//! Configuration model.
//!
//! The configuration lives in a JSON file (`config.json`). Missing keys are
//! filled from [`Config::default`] by [`upgrade_settings`], and a handful of
//! runtime keys can be overridden from the environment or the command line.

use crate::Result;
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV: &str = "PLEX_DUPEFINDER_CONFIG";

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE", default)]
pub struct Config {
    /// Settings that affect the run itself.
    pub runtime: RuntimeConfig,
    /// Plex server settings.
    pub plex: PlexConfig,
    /// Scoring toggles and multipliers.
    pub scoring: ScoringConfig,
    /// Audio codec name -> score.
    pub audio_codec_scores: BTreeMap<String, i64>,
    /// Video codec name -> score.
    pub video_codec_scores: BTreeMap<String, i64>,
    /// Plex resolution label -> score.
    pub video_resolution_scores: BTreeMap<String, i64>,
    /// Shell glob over the file name -> score.
    pub filename_scores: BTreeMap<String, i64>,
    /// Path fragments that are never deleted.
    pub skip_list: Vec<String>,
}

/// Runtime configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE", default)]
pub struct RuntimeConfig {
    /// Simulate deletions without applying them.
    pub dry_run: bool,
    /// Delete lower scored copies without asking.
    pub auto_delete: bool,
    /// Only treat media with identical file paths as duplicates.
    pub find_duplicate_filepaths_only: bool,
    /// Skip score based deletion of duplicates.
    pub skip_other_dupes: bool,
    /// Remove media Plex reports as unavailable.
    pub find_unavailable: bool,
    /// Remove `.ts` copies when another container exists.
    pub find_extra_ts: bool,
    /// Ignore media stored under a "Plex Versions" folder.
    pub skip_plex_versions_folder: bool,
    /// IANA timezone used for log timestamps.
    pub logging_timezone: String,
    /// Remove files from disk when the Plex API refuses to delete them.
    pub delete_local_fallback: bool,
}

/// Plex server configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE", default)]
pub struct PlexConfig {
    /// Library section titles to scan.
    pub libraries: Vec<String>,
    /// Server URL (http or https).
    pub server_url: String,
    /// Plex API token.
    pub auth_token: String,
}

/// Scoring configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE", default)]
pub struct ScoringConfig {
    /// Height in pixels is multiplied by this.
    pub video_height_multiplier: f64,
    /// Include file size in the score.
    pub score_filesize: bool,
    /// Include the audio channel count in the score.
    pub score_audiochannels: bool,
    /// Video bitrate toggle and multiplier.
    pub score_videobitrate: BitrateScoring,
    /// Prefer the file Radarr tracks for movies.
    pub radarr: ArrConfig,
    /// Prefer the file Sonarr tracks for episodes.
    pub sonarr: ArrConfig,
}

/// Video bitrate scoring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BitrateScoring {
    pub enabled: bool,
    pub multiplier: f64,
}

/// Radarr / Sonarr connection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArrConfig {
    pub enabled: bool,
    pub url: String,
    pub api_key: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            runtime: RuntimeConfig::default(),
            plex: PlexConfig::default(),
            scoring: ScoringConfig::default(),
            audio_codec_scores: score_map(&[
                ("Unknown", 0),
                ("wmapro", 200),
                ("mp2", 500),
                ("mp3", 1000),
                ("ac3", 1000),
                ("dca", 2000),
                ("pcm", 2500),
                ("flac", 2500),
                ("dca-ma", 4000),
                ("truehd", 4500),
                ("aac", 1000),
                ("eac3", 1250),
            ]),
            video_codec_scores: score_map(&[
                ("Unknown", 0),
                ("h264", 10000),
                ("h265", 5000),
                ("hevc", 5000),
                ("mpeg4", 500),
                ("vc1", 3000),
                ("vp9", 1000),
                ("mpeg1video", 250),
                ("mpeg2video", 250),
                ("wmv2", 250),
                ("wmv3", 250),
                ("msmpeg4", 100),
                ("msmpeg4v2", 100),
                ("msmpeg4v3", 100),
            ]),
            video_resolution_scores: score_map(&[
                ("Unknown", 0),
                ("4k", 20000),
                ("1080", 10000),
                ("720", 5000),
                ("480", 3000),
                ("sd", 1000),
            ]),
            filename_scores: BTreeMap::new(),
            skip_list: Vec::new(),
        }
    }
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            dry_run: false,
            auto_delete: false,
            find_duplicate_filepaths_only: false,
            skip_other_dupes: false,
            find_unavailable: false,
            find_extra_ts: false,
            skip_plex_versions_folder: true,
            logging_timezone: "UTC".to_string(),
            delete_local_fallback: false,
        }
    }
}

impl Default for PlexConfig {
    fn default() -> Self {
        Self {
            libraries: Vec::new(),
            server_url: "https://plex.your-server.com".to_string(),
            auth_token: String::new(),
        }
    }
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            video_height_multiplier: 2.0,
            score_filesize: true,
            score_audiochannels: true,
            score_videobitrate: BitrateScoring::default(),
            radarr: ArrConfig::default(),
            sonarr: ArrConfig::default(),
        }
    }
}

impl Default for BitrateScoring {
    fn default() -> Self {
        Self {
            enabled: true,
            multiplier: 2.0,
        }
    }
}

fn score_map(entries: &[(&str, i64)]) -> BTreeMap<String, i64> {
    entries
        .iter()
        .map(|(name, score)| (name.to_string(), *score))
        .collect()
}

impl Config {
    /// Defaults used by `init`, prefilled with the user's answers and a
    /// starter set of libraries and filename scores.
    pub fn prefilled(server_url: &str, auth_token: &str, auto_delete: bool) -> Self {
        let mut config = Config::default();
        config.plex.server_url = server_url.to_string();
        config.plex.auth_token = auth_token.to_string();
        config.plex.libraries = vec!["Movies".to_string(), "TV".to_string()];
        config.runtime.auto_delete = auto_delete;
        config.filename_scores = score_map(&[
            ("*Remux*", 20000),
            ("*1080p*BluRay*", 15000),
            ("*720p*BluRay*", 10000),
            ("*WEB*NTB*", 5000),
            ("*WEB*VISUM*", 5000),
            ("*WEB*KINGS*", 5000),
            ("*WEB*CasStudio*", 5000),
            ("*WEB*SiGMA*", 5000),
            ("*WEB*QOQ*", 5000),
            ("*WEB*TROLLHD*", 2500),
            ("*REPACK*", 1500),
            ("*PROPER*", 1500),
            ("*WEB*TBS*", -1000),
            ("*HDTV*", -1000),
            ("*dvd*", -1000),
            ("*.avi", -1000),
            ("*.ts", -1000),
            ("*.vob", -5000),
        ]);
        config
    }

    /// Apply overrides from the process environment.
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        self.apply_overrides_with(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary key lookup.
    pub fn apply_overrides_with<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let flags: [(&str, &mut bool); 6] = [
            ("DRY_RUN", &mut self.runtime.dry_run),
            ("AUTO_DELETE", &mut self.runtime.auto_delete),
            ("SKIP_OTHER_DUPES", &mut self.runtime.skip_other_dupes),
            ("FIND_UNAVAILABLE", &mut self.runtime.find_unavailable),
            ("FIND_EXTRA_TS", &mut self.runtime.find_extra_ts),
            (
                "SKIP_PLEX_VERSIONS_FOLDER",
                &mut self.runtime.skip_plex_versions_folder,
            ),
        ];
        for (key, slot) in flags {
            if let Some(value) = lookup(key) {
                *slot = parse_bool(key, &value)?;
                tracing::debug!("{} overridden from environment: {}", key, *slot);
            }
        }

        if let Some(tz) = lookup("LOGGING_TIMEZONE") {
            self.runtime.logging_timezone = tz;
        }
        if let Some(url) = lookup("PLEX_SERVER_URL") {
            self.plex.server_url = url;
        }
        if let Some(token) = lookup("PLEX_AUTH_TOKEN") {
            self.plex.auth_token = token;
        }

        Ok(())
    }

    /// Apply command line overrides. Flags only ever switch options on.
    pub fn with_cli_overrides(mut self, dry_run: bool, skip_other_dupes: bool) -> Self {
        if dry_run {
            self.runtime.dry_run = true;
        }
        if skip_other_dupes {
            self.runtime.skip_other_dupes = true;
        }
        self
    }

    /// Parsed logging timezone.
    pub fn timezone(&self) -> Result<Tz> {
        self.runtime
            .logging_timezone
            .parse::<Tz>()
            .map_err(|_| crate::Error::InvalidTimezone(self.runtime.logging_timezone.clone()))
    }

    /// Check values that serde cannot.
    pub fn validate(&self) -> Result<()> {
        self.timezone()?;

        let url = self.plex.server_url.trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(crate::Error::InvalidConfig(format!(
                "PLEX.SERVER_URL must start with http:// or https:// (got {:?})",
                url
            )));
        }

        for (name, arr) in [("RADARR", &self.scoring.radarr), ("SONARR", &self.scoring.sonarr)] {
            if arr.enabled && arr.url.trim().is_empty() {
                return Err(crate::Error::InvalidConfig(format!(
                    "SCORING.{}.url is required when enabled",
                    name
                )));
            }
        }

        Ok(())
    }

    /// Whether any *arr override is enabled.
    pub fn arr_enabled(&self) -> bool {
        self.scoring.radarr.enabled || self.scoring.sonarr.enabled
    }
}

/// Parse a boolean override value.
pub fn parse_bool(key: &str, value: &str) -> Result<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        _ => Err(crate::Error::InvalidOverride {
            key: key.to_string(),
            value: value.to_string(),
        }),
    }
}

/// Get the configuration directory path.
fn dirs_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("plex_dupefinder")
}

/// Resolve the config file location: explicit path, then the
/// `PLEX_DUPEFINDER_CONFIG` variable, then the user config directory.
pub fn resolve_config_path(explicit: Option<&Path>) -> PathBuf {
    if let Some(path) = explicit {
        return path.to_path_buf();
    }
    if let Ok(path) = std::env::var(CONFIG_ENV) {
        if !path.is_empty() {
            return PathBuf::from(path);
        }
    }
    dirs_config_path().join("config.json")
}

/// Outcome of loading the config file.
#[derive(Debug)]
pub enum ConfigLoad {
    /// Config is complete and ready to use.
    Ready(Config),
    /// New options were written to the file; the user should review them.
    Upgraded { added: Vec<String> },
}

/// Load configuration from file, upgrading it with any missing defaults.
pub fn load_config(path: &Path) -> Result<ConfigLoad> {
    if !path.exists() {
        return Err(crate::Error::ConfigNotFound(path.display().to_string()));
    }

    let content = fs::read_to_string(path)?;
    let mut current: Value = serde_json::from_str(&content)
        .map_err(|e| crate::Error::InvalidConfig(format!("{}: {}", path.display(), e)))?;

    let defaults = serde_json::to_value(Config::default())?;
    let added = upgrade_settings(&defaults, &mut current);
    if !added.is_empty() {
        write_json(&current, path)?;
        tracing::info!("Upgraded config {:?} with {} new options", path, added.len());
        return Ok(ConfigLoad::Upgraded { added });
    }

    let config: Config = serde_json::from_value(current)
        .map_err(|e| crate::Error::InvalidConfig(format!("{}: {}", path.display(), e)))?;
    Ok(ConfigLoad::Ready(config))
}

/// Write a new config file. Refuses to overwrite an existing one.
pub fn create_config(config: &Config, path: &Path) -> Result<()> {
    if path.exists() {
        return Err(crate::Error::ConfigExists(path.display().to_string()));
    }
    write_json(&serde_json::to_value(config)?, path)
}

fn write_json(value: &Value, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::write(path, serde_json::to_string_pretty(value)?)?;
    Ok(())
}

/// Recursively add keys from `defaults` that are missing in `current`.
///
/// Lists below a named key get missing default entries appended. Returns a
/// description of every addition.
pub fn upgrade_settings(defaults: &Value, current: &mut Value) -> Vec<String> {
    let mut added = Vec::new();
    merge_defaults(defaults, current, None, &mut added);
    added
}

fn merge_defaults(default: &Value, current: &mut Value, key: Option<&str>, added: &mut Vec<String>) {
    match (default, current) {
        (Value::Object(defaults), Value::Object(currents)) => {
            for (k, v) in defaults {
                match currents.get_mut(k) {
                    None => {
                        currents.insert(k.clone(), v.clone());
                        added.push(match key {
                            None => format!("Added {:?} config option: {}", k, v),
                            Some(parent) => {
                                format!("Added {:?} to config option {:?}: {}", k, parent, v)
                            }
                        });
                    }
                    Some(existing) if v.is_object() || v.is_array() => {
                        merge_defaults(v, existing, Some(k), added);
                    }
                    Some(_) => {}
                }
            }
        }
        (Value::Array(defaults), Value::Array(currents)) => {
            if let Some(parent) = key {
                for v in defaults {
                    if !currents.contains(v) {
                        currents.push(v.clone());
                        added.push(format!("Added to config option {:?}: {}", parent, v));
                    }
                }
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_default_config_keys() {
        let value = serde_json::to_value(Config::default()).unwrap();
        assert_eq!(value["RUNTIME"]["DRY_RUN"], json!(false));
        assert_eq!(value["RUNTIME"]["LOGGING_TIMEZONE"], json!("UTC"));
        assert_eq!(value["SCORING"]["SCORE_VIDEOBITRATE"]["multiplier"], json!(2.0));
        assert_eq!(value["VIDEO_RESOLUTION_SCORES"]["4k"], json!(20000));
    }

    #[test]
    fn test_parse_bool() {
        assert!(parse_bool("DRY_RUN", "yes").unwrap());
        assert!(parse_bool("DRY_RUN", "TRUE").unwrap());
        assert!(!parse_bool("DRY_RUN", "0").unwrap());
        assert!(parse_bool("DRY_RUN", "maybe").is_err());
    }

    #[test]
    fn test_upgrade_nested_and_lists() {
        let defaults = json!({"A": {"x": 1, "y": 2}, "L": ["one"]});
        let mut current = json!({"A": {"x": 5}, "L": []});
        let added = upgrade_settings(&defaults, &mut current);

        assert_eq!(added.len(), 2);
        assert_eq!(current, json!({"A": {"x": 5, "y": 2}, "L": ["one"]}));
    }

    #[test]
    fn test_validate_rejects_bad_timezone() {
        let mut config = Config::default();
        config.runtime.logging_timezone = "Mars/Olympus".to_string();
        assert!(matches!(
            config.validate(),
            Err(crate::Error::InvalidTimezone(_))
        ));
    }
}
