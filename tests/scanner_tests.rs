//! Integration tests for the scanner module.
//!
//! Tests cover:
//! - Building duplicate groups from Plex metadata
//! - Optimized versions and "Plex Versions" exclusions
//! - Episode titles and per-copy attributes
//! - Filepath-only detection

use plex_dupefinder::core::scanner::{build_group, group_title, has_identical_paths};
use plex_dupefinder::core::scorer::Scorer;
use plex_dupefinder::models::config::Config;
use plex_dupefinder::models::media::{ExternalIds, MediaKind};
use plex_dupefinder::services::plex::PlexItem;
use serde_json::json;

fn movie() -> PlexItem {
    serde_json::from_value(json!({
        "ratingKey": "100",
        "key": "/library/metadata/100",
        "type": "movie",
        "title": "Heat",
        "Guid": [{"id": "imdb://tt0113277"}, {"id": "tmdb://949"}],
        "Media": [
            {
                "id": 11, "duration": 10_200_000, "bitrate": 9000, "width": 1920, "height": 1080,
                "audioChannels": 6, "audioCodec": "dca", "videoCodec": "h264", "videoResolution": "1080",
                "Part": [{
                    "id": 111, "file": "/mnt/media/Movies/Heat (1995)/Heat.1995.1080p.mkv",
                    "size": 9_000_000_000_u64,
                    "Stream": [
                        {"streamType": 1},
                        {"streamType": 2, "channels": 6, "title": "DTS"},
                        {"streamType": 2, "channels": 2, "title": "Commentary"}
                    ]
                }]
            },
            {
                "id": 12, "duration": 10_200_000, "bitrate": 1500, "width": 720, "height": 480,
                "audioChannels": 2, "audioCodec": "mp3", "videoCodec": "mpeg4", "videoResolution": "480",
                "Part": [
                    {"id": 121, "file": "/mnt/media/Movies/Heat (1995)/Heat.CD1.avi", "size": 700_000_000, "exists": 0},
                    {"id": 122, "file": "/mnt/media/Movies/Heat (1995)/Heat.CD2.AVI", "size": 700_000_000}
                ]
            },
            {
                "id": 13, "videoResolution": "sd", "isOptimizedVersion": "1",
                "Part": [{"id": 131, "file": "/mnt/media/Movies/Heat (1995)/Heat.mp4", "size": 100}]
            },
            {
                "id": 14, "videoResolution": "720",
                "Part": [{"id": 141, "file": "/mnt/media/Movies/Heat (1995)/Plex Versions/Mobile/Heat.mp4", "size": 100}]
            }
        ]
    }))
    .unwrap()
}

#[test]
fn test_build_group_skips_optimized_and_plex_versions() {
    let config = Config::default();
    let scorer = Scorer::new(&config).unwrap();
    let item = movie();
    let ids = ExternalIds {
        tmdb_id: item.guid_id("tmdb"),
        tvdb_id: None,
    };

    let group = build_group(&item, &config, &scorer, ids).unwrap();
    assert_eq!(group.title, "Heat");
    assert_eq!(group.kind, MediaKind::Movie);
    let ids: Vec<u64> = group.items.iter().map(|m| m.id).collect();
    assert_eq!(ids, vec![11, 12]);

    let best = group.get(11).unwrap();
    assert_eq!(best.audio_channels, 8);
    assert_eq!(best.show_key, "/library/metadata/100");
    assert_eq!(best.files_short, vec!["/Movies/Heat (1995)/Heat.1995.1080p.mkv"]);
    assert_eq!(best.ids.tmdb_id, Some(949));
    assert!(best.file_exists);
    assert!(best.score.unwrap() > group.get(12).unwrap().score.unwrap());

    let multipart = group.get(12).unwrap();
    assert!(multipart.multipart);
    assert!(!multipart.file_exists);
    assert_eq!(multipart.file_size, 1_400_000_000);
    assert_eq!(multipart.audio_channels, 2);
    assert_eq!(multipart.file_exts.get(".avi"), Some(&2));
}

#[test]
fn test_plex_versions_kept_when_not_skipped() {
    let mut config = Config::default();
    config.runtime.skip_plex_versions_folder = false;
    let scorer = Scorer::new(&config).unwrap();

    let group = build_group(&movie(), &config, &scorer, ExternalIds::default()).unwrap();
    assert_eq!(group.items.len(), 3);
    assert!(group.get(14).is_some());
}

#[test]
fn test_single_candidate_is_dropped() {
    let config = Config::default();
    let scorer = Scorer::new(&config).unwrap();
    let mut item = movie();
    item.media.truncate(1);
    item.media.push(movie().media[2].clone());

    assert!(build_group(&item, &config, &scorer, ExternalIds::default()).is_none());
}

#[test]
fn test_filepaths_only_mode_leaves_scores_unset() {
    let mut config = Config::default();
    config.runtime.find_duplicate_filepaths_only = true;
    let scorer = Scorer::new(&config).unwrap();

    let group = build_group(&movie(), &config, &scorer, ExternalIds::default()).unwrap();
    assert!(group.items.iter().all(|m| m.score.is_none()));
}

#[test]
fn test_episode_title() {
    let item: PlexItem = serde_json::from_value(json!({
        "ratingKey": "200",
        "key": "/library/metadata/200",
        "type": "episode",
        "title": "Pilot",
        "grandparentTitle": "Lost",
        "parentIndex": 1,
        "index": 2
    }))
    .unwrap();
    assert_eq!(group_title(&item), "Lost - 01x02 - Pilot");
}

#[test]
fn test_identical_paths() {
    let mut item: PlexItem = serde_json::from_value(json!({
        "type": "movie",
        "title": "Heat",
        "Media": [
            {"id": 1, "Part": [{"id": 1, "file": "/m/Heat.mkv"}]},
            {"id": 2, "Part": [{"id": 2, "file": "/m/Heat.mkv"}]}
        ]
    }))
    .unwrap();
    assert!(has_identical_paths(&item));

    item.media[1].parts[0].file = "/m/Heat (1).mkv".to_string();
    assert!(!has_identical_paths(&item));
}
