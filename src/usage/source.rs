//! # Usage-Stats Sources
//!
//! Cold-start data for [`UsageTracker::bulk_replace`](super::UsageTracker::bulk_replace)
//! comes from an external usage-statistics provider. Providers may require
//! permission; when access is not granted the tracker simply gets no data.

use super::record::{AppIdentity, UsageRecord};
use crate::error::TrackerError;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// A provider of per-application usage statistics
pub trait UsageStatsSource {
    /// Whether the provider may be queried at all
    fn has_permission(&self) -> bool;

    /// Fetch the current statistics
    fn usage_stats(&self) -> Result<Vec<UsageRecord>>;
}

/// Query `source`, treating missing permission as "no data".
///
/// Errors from a permitted source are propagated so the host can report them.
pub fn collect_stats(source: &dyn UsageStatsSource) -> Result<Vec<UsageRecord>> {
    if !source.has_permission() {
        warn!("Usage statistics access not granted; loading nothing");
        return Ok(Vec::new());
    }

    let records = source.usage_stats()?;
    info!("Collected usage statistics for {} application(s)", records.len());
    Ok(records)
}

/// One entry of a usage-stats dump
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct StatsEntry {
    package: String,
    component: String,
    #[serde(default)]
    launch_count: u64,
    last_time_used: DateTime<Utc>,
}

impl TryFrom<StatsEntry> for UsageRecord {
    type Error = TrackerError;

    fn try_from(entry: StatsEntry) -> Result<Self, Self::Error> {
        let identity = AppIdentity::new(&entry.package, &entry.component)?;
        Ok(UsageRecord::new(identity, entry.last_time_used).with_count(entry.launch_count))
    }
}

/// Reads a JSON array of usage-stats entries exported by the platform:
///
/// ```json
/// [
///   {
///     "package": "org.example.mail",
///     "component": ".Inbox",
///     "launch_count": 12,
///     "last_time_used": "2025-02-05T10:30:00Z"
///   }
/// ]
/// ```
///
/// Permission is granted when the dump exists and is a readable file.
#[derive(Debug, Clone)]
pub struct JsonStatsSource {
    path: PathBuf,
}

impl JsonStatsSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl UsageStatsSource for JsonStatsSource {
    fn has_permission(&self) -> bool {
        fs::File::open(&self.path)
            .and_then(|file| file.metadata())
            .is_ok_and(|meta| meta.is_file())
    }

    fn usage_stats(&self) -> Result<Vec<UsageRecord>> {
        let content = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read usage stats: {}", self.path.display()))?;

        let entries: Vec<StatsEntry> = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse usage stats: {}", self.path.display()))?;

        // Entries with an unusable identity are dropped, not fatal
        let records = entries
            .into_iter()
            .filter_map(|entry| match UsageRecord::try_from(entry) {
                Ok(record) => Some(record),
                Err(err) => {
                    warn!("Skipping usage stats entry in {}: {}", self.path.display(), err);
                    None
                }
            })
            .collect();
        Ok(records)
    }
}
