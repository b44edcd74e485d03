//! # App Switcher
//!
//! Host-side glue around one [`UsageTracker`]: every mutating call is
//! forwarded to the tracker, the canonical set is persisted through a
//! [`RecordStore`], and an optional [`RefreshListener`] is told to redraw.
//!
//! The switcher is an ordinary owned value. Hosts that share it between
//! threads wrap the whole thing in one `Mutex`.

use crate::usage::{
    collect_stats, AgedRecord, AppIdentity, Observation, RecordStore, UsageRecord,
    UsageStatsSource, UsageTracker,
};
use anyhow::Result;
use chrono::{DateTime, Utc};
use tracing::{debug, warn};

/// Notified after each mutating call so a display surface can redraw
pub trait RefreshListener {
    fn refresh(&mut self, tracker: &UsageTracker);
}

pub struct AppSwitcher<S: RecordStore> {
    tracker: UsageTracker,
    store: S,
    listener: Option<Box<dyn RefreshListener>>,
}

impl<S: RecordStore> AppSwitcher<S> {
    pub fn new(tracker: UsageTracker, store: S) -> Self {
        Self {
            tracker,
            store,
            listener: None,
        }
    }

    pub fn with_listener(mut self, listener: Box<dyn RefreshListener>) -> Self {
        self.listener = Some(listener);
        self
    }

    pub fn tracker(&self) -> &UsageTracker {
        &self.tracker
    }

    /// Replace the tracker's records with whatever the store holds.
    ///
    /// A store that cannot be read is treated as empty.
    pub fn load(&mut self) {
        let records = self.store.load().unwrap_or_else(|err| {
            warn!("Ignoring unreadable usage records: {:#}", err);
            Vec::new()
        });
        self.tracker.bulk_replace(records);
    }

    /// Reload from a usage-stats source and persist the result
    pub fn load_from_stats(&mut self, source: &dyn UsageStatsSource) -> Result<()> {
        let records = collect_stats(source)?;
        self.tracker.bulk_replace(records);
        self.commit()
    }

    pub fn application_started(&mut self, identity: AppIdentity, at: DateTime<Utc>) -> Result<u64> {
        // Launches keep whatever pin state the app already has
        let pinned = self
            .tracker
            .get(&identity)
            .is_some_and(|aged| aged.record.is_pinned);

        let count = self
            .tracker
            .record_start(Observation::launch(identity, at).pinned(pinned));
        self.commit()?;
        Ok(count)
    }

    pub fn application_installed(&mut self, identity: &AppIdentity, at: DateTime<Utc>) -> Result<()> {
        self.tracker.record_install(identity, at);
        self.commit()
    }

    pub fn application_updated(&mut self, identity: &AppIdentity, at: DateTime<Utc>) -> Result<()> {
        self.tracker.record_update(identity, at);
        self.commit()
    }

    pub fn application_pinned(&mut self, identity: &AppIdentity) -> Result<bool> {
        let pinned = self.tracker.toggle_pin(identity);
        self.commit()?;
        Ok(pinned)
    }

    /// Returns the removed record, if the application was known
    pub fn application_removed(&mut self, identity: &AppIdentity) -> Result<Option<UsageRecord>> {
        let removed = self.tracker.remove(identity);
        self.commit()?;
        Ok(removed)
    }

    /// Drop every component of the given packages
    pub fn packages_removed<P: AsRef<str>>(&mut self, packages: &[P]) -> Result<Vec<AppIdentity>> {
        let removed = self.tracker.remove_packages(packages);
        self.commit()?;
        Ok(removed)
    }

    pub fn reset(&mut self) -> Result<()> {
        self.tracker.reset();
        self.commit()
    }

    pub fn get(&self, identity: &AppIdentity) -> Option<AgedRecord<'_>> {
        self.tracker.get(identity)
    }

    fn commit(&mut self) -> Result<()> {
        let records: Vec<UsageRecord> = self.tracker.records().cloned().collect();
        debug!("Saving {} usage record(s)", records.len());
        self.store.save(&records)?;

        if let Some(listener) = self.listener.as_mut() {
            listener.refresh(&self.tracker);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::usage::{JsonFileStore, TrackerSettings};
    use chrono::{Duration, TimeZone};
    use std::sync::{Arc, Mutex};
    use tempfile::TempDir;

    struct CountingListener(Arc<Mutex<Vec<usize>>>);

    impl RefreshListener for CountingListener {
        fn refresh(&mut self, tracker: &UsageTracker) {
            if let Ok(mut seen) = self.0.lock() {
                seen.push(tracker.recent().len() + tracker.most_used().len());
            }
        }
    }

    fn t(minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, 9, minute, 0).unwrap()
    }

    fn switcher(dir: &TempDir) -> AppSwitcher<JsonFileStore> {
        let tracker = UsageTracker::new(TrackerSettings::new(Duration::hours(1))).unwrap();
        AppSwitcher::new(tracker, JsonFileStore::in_dir(dir.path()))
    }

    #[test]
    fn test_mutations_persist_across_instances() {
        let temp_dir = TempDir::new().unwrap();
        let mail = AppIdentity::new("org.example.mail", ".Inbox").unwrap();

        {
            let mut first = switcher(&temp_dir);
            first.application_started(mail.clone(), t(0)).unwrap();
            first.application_started(mail.clone(), t(1)).unwrap();
        }

        let mut second = switcher(&temp_dir);
        second.load();
        assert_eq!(second.get(&mail).unwrap().record.use_count, 2);
        assert_eq!(second.tracker().most_used().len(), 1);
    }

    #[test]
    fn test_start_keeps_pin() {
        let temp_dir = TempDir::new().unwrap();
        let mut switcher = switcher(&temp_dir);
        let mail = AppIdentity::new("org.example.mail", ".Inbox").unwrap();

        assert!(switcher.application_pinned(&mail).unwrap());
        switcher.application_started(mail.clone(), t(0)).unwrap();

        assert!(switcher.get(&mail).unwrap().record.is_pinned);
    }

    #[test]
    fn test_corrupt_store_loads_empty() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join("records.json"), "{").unwrap();

        let mut switcher = switcher(&temp_dir);
        switcher.load();
        assert!(switcher.tracker().is_empty());
    }

    #[test]
    fn test_listener_notified_on_each_mutation() {
        let temp_dir = TempDir::new().unwrap();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut switcher =
            switcher(&temp_dir).with_listener(Box::new(CountingListener(Arc::clone(&seen))));

        let maps = AppIdentity::new("org.example.maps", ".Map").unwrap();
        switcher.application_started(maps.clone(), t(0)).unwrap();
        switcher.application_removed(&maps).unwrap();

        assert_eq!(*seen.lock().unwrap(), vec![1, 0]);
    }

    #[test]
    fn test_packages_removed() {
        let temp_dir = TempDir::new().unwrap();
        let mut switcher = switcher(&temp_dir);
        switcher
            .application_installed(&AppIdentity::new("org.example.mail", ".Inbox").unwrap(), t(0))
            .unwrap();
        switcher
            .application_updated(&AppIdentity::new("org.example.maps", ".Map").unwrap(), t(1))
            .unwrap();

        let removed = switcher.packages_removed(&["org.example.mail"]).unwrap();
        assert_eq!(removed.len(), 1);
        assert_eq!(switcher.tracker().len(), 1);
    }
}
