//! Integration tests for configuration loading.
//!
//! Tests cover:
//! - Missing config file
//! - Upgrading a partial config file
//! - Creating a config file
//! - Environment and command line overrides

use plex_dupefinder::models::config::{
    create_config, load_config, resolve_config_path, Config, ConfigLoad,
};
use plex_dupefinder::Error;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

#[test]
fn test_missing_config_suggests_init() {
    let temp_dir = TempDir::new().unwrap();
    let err = load_config(&temp_dir.path().join("config.json")).unwrap_err();
    assert!(matches!(err, Error::ConfigNotFound(_)));
    assert!(err.to_string().contains("plex-dupefinder init"));
}

#[test]
fn test_partial_config_is_upgraded_then_loaded() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("config.json");
    fs::write(
        &path,
        r#"{"PLEX": {"SERVER_URL": "http://localhost:32400", "AUTH_TOKEN": "abc", "LIBRARIES": ["Movies"]}}"#,
    )
    .unwrap();

    match load_config(&path).unwrap() {
        ConfigLoad::Upgraded { added } => {
            assert!(added.iter().any(|a| a.contains("RUNTIME")));
            assert!(!added.iter().any(|a| a.contains("AUTH_TOKEN")));
        }
        ConfigLoad::Ready(_) => panic!("expected an upgrade"),
    }

    match load_config(&path).unwrap() {
        ConfigLoad::Ready(config) => {
            assert_eq!(config.plex.server_url, "http://localhost:32400");
            assert_eq!(config.plex.auth_token, "abc");
            assert_eq!(config.plex.libraries, vec!["Movies"]);
            assert!(config.runtime.skip_plex_versions_folder);
            assert_eq!(config.runtime.logging_timezone, "UTC");
        }
        ConfigLoad::Upgraded { added } => panic!("unexpected second upgrade: {:?}", added),
    }
}

#[test]
fn test_invalid_json_is_reported() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("config.json");
    fs::write(&path, "{ not json").unwrap();
    assert!(matches!(load_config(&path), Err(Error::InvalidConfig(_))));
}

#[test]
fn test_create_config_refuses_to_overwrite() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("nested").join("config.json");
    let config = Config::prefilled("https://plex.example.com", "token", true);

    create_config(&config, &path).unwrap();
    assert!(matches!(create_config(&config, &path), Err(Error::ConfigExists(_))));

    match load_config(&path).unwrap() {
        ConfigLoad::Ready(loaded) => {
            assert_eq!(loaded, config);
            assert!(loaded.runtime.auto_delete);
            assert_eq!(loaded.plex.libraries, vec!["Movies", "TV"]);
            assert_eq!(loaded.filename_scores.get("*Remux*"), Some(&20000));
        }
        ConfigLoad::Upgraded { added } => panic!("unexpected upgrade: {:?}", added),
    }
}

#[test]
fn test_overrides() {
    let vars: HashMap<&str, &str> = HashMap::from([
        ("DRY_RUN", "true"),
        ("FIND_EXTRA_TS", "1"),
        ("SKIP_PLEX_VERSIONS_FOLDER", "off"),
        ("LOGGING_TIMEZONE", "America/New_York"),
        ("PLEX_AUTH_TOKEN", "from-env"),
    ]);
    let mut config = Config::default();
    config
        .apply_overrides_with(|key| vars.get(key).map(|v| v.to_string()))
        .unwrap();

    assert!(config.runtime.dry_run);
    assert!(config.runtime.find_extra_ts);
    assert!(!config.runtime.skip_plex_versions_folder);
    assert!(!config.runtime.auto_delete);
    assert_eq!(config.plex.auth_token, "from-env");
    assert_eq!(config.timezone().unwrap(), chrono_tz::America::New_York);

    let config = config.with_cli_overrides(false, true);
    assert!(config.runtime.dry_run);
    assert!(config.runtime.skip_other_dupes);
}

#[test]
fn test_bad_override_is_rejected() {
    let mut config = Config::default();
    let err = config
        .apply_overrides_with(|key| (key == "AUTO_DELETE").then(|| "sometimes".to_string()))
        .unwrap_err();
    assert!(matches!(err, Error::InvalidOverride { .. }));
}

#[test]
fn test_validate_server_url() {
    let mut config = Config::default();
    assert!(config.validate().is_ok());
    config.plex.server_url = "plex.local:32400".to_string();
    assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));
}

#[test]
fn test_explicit_config_path_wins() {
    let path = resolve_config_path(Some(Path::new("/tmp/custom.json")));
    assert_eq!(path, Path::new("/tmp/custom.json"));
}
