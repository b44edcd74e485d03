//! Host integration tests
//!
//! Tests for the switcher glue: persistence through the JSON store,
//! cold-start imports from usage-stats dumps, and configuration.

use appswitch::config::Config;
use appswitch::switcher::AppSwitcher;
use appswitch::usage::{AppIdentity, JsonFileStore, JsonStatsSource, RecordStore};
use chrono::{Duration, TimeZone, Utc};
use std::fs;
use tempfile::TempDir;

/// Helper to create a switcher persisting into `dir`
fn create_switcher(dir: &TempDir, config: &Config) -> AppSwitcher<JsonFileStore> {
    let tracker = config.build_tracker().unwrap();
    let mut switcher = AppSwitcher::new(tracker, JsonFileStore::in_dir(dir.path()));
    switcher.load();
    switcher
}

const STATS_DUMP: &str = r#"[
    {"package": "org.example.mail", "component": ".Inbox",
     "launch_count": 9, "last_time_used": "2025-06-01T08:00:00Z"},
    {"package": "org.example.maps", "component": ".Map",
     "launch_count": 4, "last_time_used": "2025-06-01T09:00:00Z"},
    {"package": "org.example.notes", "component": ".Notes",
     "launch_count": 1, "last_time_used": "2025-06-01T10:00:00Z"}
]"#;

#[test]
fn test_import_stats_dump_and_persist() {
    let temp_dir = TempDir::new().unwrap();
    let dump = temp_dir.path().join("stats.json");
    fs::write(&dump, STATS_DUMP).unwrap();

    let mut switcher = create_switcher(&temp_dir, &Config::default());
    switcher
        .load_from_stats(&JsonStatsSource::new(&dump))
        .unwrap();

    let most_used: Vec<String> = switcher
        .tracker()
        .most_used()
        .iter()
        .map(|r| r.identity.to_string())
        .collect();
    assert_eq!(most_used, vec!["org.example.mail/.Inbox", "org.example.maps/.Map"]);
    assert_eq!(switcher.tracker().recent().len(), 1);

    let stored = JsonFileStore::in_dir(temp_dir.path()).load().unwrap();
    assert_eq!(stored.len(), 3);
}

#[test]
fn test_import_skips_entry_without_component() {
    let temp_dir = TempDir::new().unwrap();
    let dump = temp_dir.path().join("stats.json");
    fs::write(
        &dump,
        r#"[
            {"package": "org.example.mail", "component": ".Inbox",
             "launch_count": 9, "last_time_used": "2025-06-01T08:00:00Z"},
            {"package": "org.example.web", "component": "",
             "launch_count": 2, "last_time_used": "2025-06-01T09:00:00Z"}
        ]"#,
    )
    .unwrap();

    {
        let mut switcher = create_switcher(&temp_dir, &Config::default());
        switcher
            .load_from_stats(&JsonStatsSource::new(&dump))
            .unwrap();
    }

    // The saved set must load back cleanly on the next start
    let stored = JsonFileStore::in_dir(temp_dir.path()).load().unwrap();
    assert_eq!(stored.len(), 1);

    let switcher = create_switcher(&temp_dir, &Config::default());
    let mail = AppIdentity::new("org.example.mail", ".Inbox").unwrap();
    assert_eq!(switcher.tracker().len(), 1);
    assert_eq!(switcher.get(&mail).unwrap().record.use_count, 9);
}

#[test]
fn test_import_without_dump_clears_records() {
    let temp_dir = TempDir::new().unwrap();
    let mut switcher = create_switcher(&temp_dir, &Config::default());
    switcher
        .application_started(AppIdentity::new("org.example.mail", ".Inbox").unwrap(), Utc::now())
        .unwrap();

    let missing = temp_dir.path().join("no-such-dump.json");
    switcher
        .load_from_stats(&JsonStatsSource::new(missing))
        .unwrap();

    assert!(switcher.tracker().is_empty());
}

#[test]
fn test_config_limits_apply() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("config.json");
    fs::write(&config_path, r#"{"most_used_limit": 1, "recent_limit": 1}"#).unwrap();
    let config = Config::load_from(&config_path).unwrap();

    let dump = temp_dir.path().join("stats.json");
    fs::write(&dump, STATS_DUMP).unwrap();

    let mut switcher = create_switcher(&temp_dir, &config);
    switcher
        .load_from_stats(&JsonStatsSource::new(&dump))
        .unwrap();

    let tracker = switcher.tracker();
    assert_eq!(tracker.most_used().len(), 1);
    assert_eq!(tracker.most_used()[0].use_count, 9);
    // maps is bumped from most used and is the newest of the rest
    assert_eq!(tracker.recent()[0].identity.to_string(), "org.example.notes/.Notes");
}

#[test]
fn test_state_survives_restart() {
    let temp_dir = TempDir::new().unwrap();
    let mail = AppIdentity::new("org.example.mail", ".Inbox").unwrap();
    let start = Utc.with_ymd_and_hms(2025, 6, 1, 8, 0, 0).unwrap();

    {
        let mut switcher = create_switcher(&temp_dir, &Config::default());
        switcher.application_installed(&mail, start).unwrap();
        switcher.application_pinned(&mail).unwrap();
        for minute in 0..3 {
            switcher
                .application_started(mail.clone(), start + Duration::minutes(minute))
                .unwrap();
        }
    }

    let switcher = create_switcher(&temp_dir, &Config::default());
    let record = switcher.get(&mail).unwrap().record;
    assert_eq!(record.use_count, 3);
    assert!(record.is_pinned);
    assert!(!record.is_new);
    assert_eq!(switcher.tracker().most_used().len(), 1);
}

#[test]
fn test_reset_persists_empty_set() {
    let temp_dir = TempDir::new().unwrap();
    let mut switcher = create_switcher(&temp_dir, &Config::default());
    switcher
        .application_started(AppIdentity::new("org.example.mail", ".Inbox").unwrap(), Utc::now())
        .unwrap();

    switcher.reset().unwrap();

    assert!(JsonFileStore::in_dir(temp_dir.path())
        .load()
        .unwrap()
        .is_empty());
}
