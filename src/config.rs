//! # Configuration Persistence
//!
//! Manages host configuration stored in `~/.config/appswitch/config.json`.
//!
//! ## Overview
//!
//! The [`Config`] struct is serialized to / deserialized from a JSON file in
//! the user's XDG config directory. Every field has a default, so a partial
//! (or missing) file is fine.
//!
//! ```json
//! {
//!   "most_used_limit": 5,
//!   "recent_limit": 5,
//!   "min_use_count": 2,
//!   "frequent_use_hours": 72
//! }
//! ```
//!
//! The `directories` crate is used to resolve the platform-appropriate config
//! directory.

use crate::error::TrackerResult;
use crate::usage::{
    TrackerSettings, UsageTracker, DEFAULT_MIN_USE_COUNT, DEFAULT_MOST_USED_LIMIT,
    DEFAULT_RECENT_LIMIT,
};
use anyhow::{Context, Result};
use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Frequent-use window chosen by this host
pub const DEFAULT_FREQUENT_USE_HOURS: u32 = 72;

/// Persisted host configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Capacity of the most used list.
    #[serde(default = "default_most_used_limit")]
    pub most_used_limit: usize,
    /// Capacity of the recent list.
    #[serde(default = "default_recent_limit")]
    pub recent_limit: usize,
    /// Launches needed before an app can be listed as most used.
    #[serde(default = "default_min_use_count")]
    pub min_use_count: u64,
    /// Apps launched within this many hours are considered frequently used.
    #[serde(default = "default_frequent_use_hours")]
    pub frequent_use_hours: u32,
}

fn default_most_used_limit() -> usize {
    DEFAULT_MOST_USED_LIMIT
}

fn default_recent_limit() -> usize {
    DEFAULT_RECENT_LIMIT
}

fn default_min_use_count() -> u64 {
    DEFAULT_MIN_USE_COUNT
}

fn default_frequent_use_hours() -> u32 {
    DEFAULT_FREQUENT_USE_HOURS
}

impl Default for Config {
    fn default() -> Self {
        Self {
            most_used_limit: default_most_used_limit(),
            recent_limit: default_recent_limit(),
            min_use_count: default_min_use_count(),
            frequent_use_hours: default_frequent_use_hours(),
        }
    }
}

impl Config {
    /// Read view limits and the frequent-use window from `path`.
    ///
    /// Absent keys take their defaults; a missing file yields the default
    /// config.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Self = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        Ok(config)
    }

    /// Write these limits to `path` as pretty JSON, creating the config
    /// directory on first save
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let contents = serde_json::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(path, contents)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Tracker settings described by this configuration
    pub fn tracker_settings(&self) -> TrackerSettings {
        TrackerSettings::new(Duration::hours(i64::from(self.frequent_use_hours)))
            .with_limits(self.most_used_limit, self.recent_limit)
            .with_min_use_count(self.min_use_count)
    }

    /// Build a tracker from this configuration, rejecting zero capacities
    pub fn build_tracker(&self) -> TrackerResult<UsageTracker> {
        UsageTracker::new(self.tracker_settings())
    }

    /// Return the path to the config file.
    pub fn config_path() -> Result<PathBuf> {
        let dirs = directories::ProjectDirs::from("", "", "appswitch")
            .context("Could not determine config directory")?;
        Ok(dirs.config_dir().join("config.json"))
    }
}
