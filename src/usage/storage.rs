//! # Usage Storage
//!
//! Persists the tracker's canonical record set. The tracker itself has no
//! opinion on format; hosts plug in any [`RecordStore`]. The bundled
//! [`JsonFileStore`] keeps everything in one JSON file under the platform data
//! directory:
//!
//! ```text
//! ~/.local/share/appswitch/
//! └── records.json
//! ```
//!
//! ## Data Format
//!
//! ```json
//! {
//!   "records": [
//!     {
//!       "identity": "org.example.mail/.Inbox",
//!       "use_count": 42,
//!       "last_execution": "2025-02-05T10:30:00Z",
//!       "is_new": false,
//!       "is_updated": false,
//!       "is_pinned": true
//!     }
//!   ]
//! }
//! ```

use super::record::UsageRecord;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// File name used inside the data directory
pub const RECORDS_FILE_NAME: &str = "records.json";

/// Loads and saves the full canonical record set
pub trait RecordStore {
    /// Load every stored record. A store with nothing saved yet returns an
    /// empty list.
    fn load(&self) -> Result<Vec<UsageRecord>>;

    /// Replace the stored set with `records`
    fn save(&self, records: &[UsageRecord]) -> Result<()>;
}

#[derive(Debug, Serialize, Deserialize)]
struct StoredRecords {
    #[serde(default)]
    records: Vec<UsageRecord>,
}

/// [`RecordStore`] backed by a single JSON file
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    /// Store records in the platform data directory
    pub fn new() -> Result<Self> {
        Ok(Self::in_dir(&get_storage_dir()?))
    }

    /// Store records in `dir/records.json`
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            path: dir.join(RECORDS_FILE_NAME),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RecordStore for JsonFileStore {
    fn load(&self) -> Result<Vec<UsageRecord>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let content = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read records file: {}", self.path.display()))?;

        let stored: StoredRecords = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse records file: {}", self.path.display()))?;

        Ok(stored.records)
    }

    fn save(&self, records: &[UsageRecord]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create records directory: {}", parent.display())
            })?;
        }

        let stored = StoredRecords {
            records: records.to_vec(),
        };
        let json =
            serde_json::to_string_pretty(&stored).context("Failed to serialize usage records")?;

        fs::write(&self.path, json)
            .with_context(|| format!("Failed to write records file: {}", self.path.display()))?;

        Ok(())
    }
}

/// Get the XDG-compliant storage directory for usage data
fn get_storage_dir() -> Result<PathBuf> {
    let proj_dirs = directories::ProjectDirs::from("", "", "appswitch")
        .context("Failed to determine application data directory")?;

    Ok(proj_dirs.data_dir().to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::usage::record::AppIdentity;
    use chrono::Utc;
    use tempfile::TempDir;

    fn record(package: &str, count: u64) -> UsageRecord {
        UsageRecord::new(AppIdentity::new(package, ".Main").unwrap(), Utc::now()).with_count(count)
    }

    #[test]
    fn test_load_missing_file_is_empty() {
        let temp_dir = TempDir::new().unwrap();
        let store = JsonFileStore::in_dir(temp_dir.path());

        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn test_save_and_load_persists_records() {
        let temp_dir = TempDir::new().unwrap();
        let store = JsonFileStore::in_dir(&temp_dir.path().join("nested"));

        let mut pinned = record("org.example.mail", 7);
        pinned.is_pinned = true;
        store.save(&[pinned.clone(), record("org.example.maps", 1)]).unwrap();

        let loaded = store.load().unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[0], pinned);
        assert_eq!(loaded[1].use_count, 1);
    }

    #[test]
    fn test_corrupted_records_file() {
        let temp_dir = TempDir::new().unwrap();
        let store = JsonFileStore::in_dir(temp_dir.path());
        fs::write(store.path(), "not valid json").unwrap();

        let err = store.load().unwrap_err();
        assert!(err.to_string().contains("Failed to parse records file"));
    }

    #[test]
    fn test_records_key_may_be_missing() {
        let temp_dir = TempDir::new().unwrap();
        let store = JsonFileStore::in_dir(temp_dir.path());
        fs::write(store.path(), "{}").unwrap();

        assert!(store.load().unwrap().is_empty());
    }
}
