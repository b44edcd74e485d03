//! # Usage Tracker
//!
//! Owns the canonical set of [`UsageRecord`]s (one per [`AppIdentity`]) and
//! two ranked projections of it:
//!
//! - **most used**: records launched at least `min_use_count` times, ranked
//!   by launch count
//! - **recent**: every other record, ranked by last execution
//!
//! The views only hold identities and are rebuilt from scratch whenever a
//! change can affect ranking, so they can never disagree with the canonical
//! set or outlive a removed record.

use super::ranked::BoundedRankedList;
use super::record::{AppAge, AppIdentity, Observation, UsageRecord};
use crate::error::{TrackerResult, ViewKind};
use chrono::{DateTime, Duration, Utc};
use std::collections::btree_map::{BTreeMap, Entry};
use tracing::{debug, info, trace};

/// Default capacity of the most used view
pub const DEFAULT_MOST_USED_LIMIT: usize = 5;

/// Default capacity of the recent view
pub const DEFAULT_RECENT_LIMIT: usize = 5;

/// Launches needed before an application can appear in the most used view
pub const DEFAULT_MIN_USE_COUNT: u64 = 2;

/// Tunables for a [`UsageTracker`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackerSettings {
    pub most_used_limit: usize,
    pub recent_limit: usize,
    pub min_use_count: u64,
    /// How long after its last run an application still counts as frequently used
    pub frequent_window: Duration,
}

impl TrackerSettings {
    /// Default limits with the host-chosen frequent-use window
    pub fn new(frequent_window: Duration) -> Self {
        Self {
            most_used_limit: DEFAULT_MOST_USED_LIMIT,
            recent_limit: DEFAULT_RECENT_LIMIT,
            min_use_count: DEFAULT_MIN_USE_COUNT,
            frequent_window,
        }
    }

    pub fn with_limits(mut self, most_used_limit: usize, recent_limit: usize) -> Self {
        self.most_used_limit = most_used_limit;
        self.recent_limit = recent_limit;
        self
    }

    pub fn with_min_use_count(mut self, min_use_count: u64) -> Self {
        self.min_use_count = min_use_count;
        self
    }
}

/// A canonical record paired with its age at the time it was read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AgedRecord<'a> {
    pub record: &'a UsageRecord,
    pub age: AppAge,
}

#[derive(Debug, Clone)]
struct RankedViews {
    most_used: BoundedRankedList<AppIdentity>,
    recent: BoundedRankedList<AppIdentity>,
}

impl RankedViews {
    fn new(most_used_limit: usize, recent_limit: usize) -> TrackerResult<Self> {
        Ok(Self {
            most_used: BoundedRankedList::new(most_used_limit, ViewKind::MostUsed)?,
            recent: BoundedRankedList::new(recent_limit, ViewKind::Recent)?,
        })
    }

    fn contains(&self, identity: &AppIdentity) -> bool {
        self.most_used.contains(identity) || self.recent.contains(identity)
    }
}

/// Tracks launches, installs and removals and keeps the ranked views current
#[derive(Debug, Clone)]
pub struct UsageTracker {
    records: BTreeMap<AppIdentity, UsageRecord>,
    /// `None` in record-only mode
    views: Option<RankedViews>,
    settings: TrackerSettings,
}

impl UsageTracker {
    /// Create a tracker that maintains both ranked views
    pub fn new(settings: TrackerSettings) -> TrackerResult<Self> {
        let views = RankedViews::new(settings.most_used_limit, settings.recent_limit)?;

        Ok(Self {
            records: BTreeMap::new(),
            views: Some(views),
            settings,
        })
    }

    /// Create a tracker that only keeps the canonical records; both views stay empty
    pub fn record_only(settings: TrackerSettings) -> TrackerResult<Self> {
        // Validate the limits even though no views are built
        RankedViews::new(settings.most_used_limit, settings.recent_limit)?;

        Ok(Self {
            records: BTreeMap::new(),
            views: None,
            settings,
        })
    }

    /// Record a launch. Returns the new launch count.
    pub fn record_start(&mut self, observation: Observation) -> u64 {
        let record = ensure_record(&mut self.records, &observation.identity, observation.at);

        record.use_count = record.use_count.saturating_add(1);
        record.last_execution = observation.at;
        record.is_new = false;
        record.is_updated = false;
        record.is_pinned = observation.pinned;

        let count = record.use_count;
        debug!("Application started: {} (count {})", observation.identity, count);

        self.rebuild();
        count
    }

    /// Record a fresh install: the application is flagged new and unpinned,
    /// and an existing launch count is kept.
    pub fn record_install(&mut self, identity: &AppIdentity, at: DateTime<Utc>) {
        let record = ensure_record(&mut self.records, identity, at);

        record.last_execution = at;
        record.is_new = true;
        record.is_updated = false;
        record.is_pinned = false;
        debug!("Application installed: {} (count {})", identity, record.use_count);

        // Rebuild so the recent view stays sorted by the new last execution
        if self.is_surfaced(identity) {
            self.rebuild();
        }
    }

    /// Record an update. Count, pin state and last execution are left alone.
    pub fn record_update(&mut self, identity: &AppIdentity, at: DateTime<Utc>) {
        let record = ensure_record(&mut self.records, identity, at);

        record.is_new = false;
        record.is_updated = true;
        debug!("Application updated: {} (count {})", identity, record.use_count);
    }

    /// Flip the pin flag and return the new state. Pinning only affects the
    /// age classification, never ranking.
    pub fn toggle_pin(&mut self, identity: &AppIdentity) -> bool {
        let record = ensure_record(&mut self.records, identity, Utc::now());

        record.is_pinned = !record.is_pinned;
        debug!("Application pin toggled: {} (pinned {})", identity, record.is_pinned);
        record.is_pinned
    }

    /// Forget an application. Unknown identities are ignored.
    pub fn remove(&mut self, identity: &AppIdentity) -> Option<UsageRecord> {
        let removed = self.records.remove(identity)?;
        debug!("Application removed: {}", identity);

        if self.is_surfaced(identity) {
            self.rebuild();
        }

        Some(removed)
    }

    /// Forget every component belonging to one of `packages`. Returns the
    /// removed identities.
    pub fn remove_packages<S: AsRef<str>>(&mut self, packages: &[S]) -> Vec<AppIdentity> {
        let doomed: Vec<AppIdentity> = self
            .records
            .keys()
            .filter(|id| packages.iter().any(|p| p.as_ref() == id.package()))
            .cloned()
            .collect();

        for identity in &doomed {
            self.records.remove(identity);
        }

        if doomed.iter().any(|id| self.is_surfaced(id)) {
            self.rebuild();
        }

        if !doomed.is_empty() {
            info!("Removed {} application(s) for uninstalled packages", doomed.len());
        }
        doomed
    }

    /// Replace the canonical set wholesale and rebuild both views. A later
    /// record wins when the input repeats an identity.
    pub fn bulk_replace<I>(&mut self, records: I)
    where
        I: IntoIterator<Item = UsageRecord>,
    {
        self.reset();

        for record in records {
            self.records.insert(record.identity.clone(), record);
        }
        info!("Loaded {} application record(s)", self.records.len());

        self.rebuild();
    }

    /// Drop every record and empty both views
    pub fn reset(&mut self) {
        self.records.clear();
        if let Some(views) = self.views.as_mut() {
            views.most_used.clear();
            views.recent.clear();
        }
    }

    /// Change both view capacities and rebuild
    pub fn set_limits(&mut self, most_used_limit: usize, recent_limit: usize) -> TrackerResult<()> {
        let fresh = RankedViews::new(most_used_limit, recent_limit)?;

        self.settings.most_used_limit = most_used_limit;
        self.settings.recent_limit = recent_limit;
        if self.views.is_some() {
            self.views = Some(fresh);
            self.rebuild();
        }
        Ok(())
    }

    /// Look up a record and classify its age against the current time
    pub fn get(&self, identity: &AppIdentity) -> Option<AgedRecord<'_>> {
        self.get_at(identity, Utc::now())
    }

    /// Look up a record and classify its age against `now`
    pub fn get_at(&self, identity: &AppIdentity, now: DateTime<Utc>) -> Option<AgedRecord<'_>> {
        self.records.get(identity).map(|record| AgedRecord {
            record,
            age: record.age_at(now, self.settings.frequent_window),
        })
    }

    /// The most used view, best first
    pub fn most_used(&self) -> Vec<&UsageRecord> {
        self.resolve(|views| &views.most_used)
    }

    /// The recent view, most recent first
    pub fn recent(&self) -> Vec<&UsageRecord> {
        self.resolve(|views| &views.recent)
    }

    /// Every canonical record, ordered by identity
    pub fn records(&self) -> impl Iterator<Item = &UsageRecord> {
        self.records.values()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn maintains_views(&self) -> bool {
        self.views.is_some()
    }

    pub fn settings(&self) -> &TrackerSettings {
        &self.settings
    }

    pub fn most_used_limit(&self) -> usize {
        self.settings.most_used_limit
    }

    pub fn recent_limit(&self) -> usize {
        self.settings.recent_limit
    }

    pub fn min_use_count(&self) -> u64 {
        self.settings.min_use_count
    }

    fn is_surfaced(&self, identity: &AppIdentity) -> bool {
        self.views
            .as_ref()
            .is_some_and(|views| views.contains(identity))
    }

    fn resolve<F>(&self, pick: F) -> Vec<&UsageRecord>
    where
        F: Fn(&RankedViews) -> &BoundedRankedList<AppIdentity>,
    {
        self.views
            .as_ref()
            .map(|views| {
                pick(views)
                    .iter()
                    .filter_map(|id| self.records.get(id))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Recompute both views from the canonical set.
    ///
    /// Pass one ranks eligible records by launch count; pass two ranks the
    /// remaining records by recency, so the views stay disjoint. Ties keep
    /// the first record seen, and records iterate in identity order.
    fn rebuild(&mut self) {
        let Some(views) = self.views.as_mut() else {
            return;
        };
        let records = &self.records;
        let min_use_count = self.settings.min_use_count;

        views.most_used.clear();
        views.recent.clear();

        for record in records
            .values()
            .filter(|r| r.use_count >= min_use_count)
        {
            views
                .most_used
                .insert_by(record.identity.clone(), |_, existing| {
                    record.use_count > use_count(records, existing)
                });
        }

        for record in records.values() {
            if views.most_used.contains(&record.identity) {
                continue;
            }
            views.recent.insert_by(record.identity.clone(), |_, existing| {
                Some(record.last_execution) > last_execution(records, existing)
            });
        }

        for id in &views.most_used {
            trace!("Most used - {} ({})", id, use_count(records, id));
        }
        for id in &views.recent {
            trace!("Recent - {}", id);
        }
        debug!(
            "Rebuilt views: {} most used, {} recent",
            views.most_used.len(),
            views.recent.len()
        );
    }
}

/// Fetch the record for `identity`, creating a never-launched one on first sight
fn ensure_record<'a>(
    records: &'a mut BTreeMap<AppIdentity, UsageRecord>,
    identity: &AppIdentity,
    at: DateTime<Utc>,
) -> &'a mut UsageRecord {
    match records.entry(identity.clone()) {
        Entry::Occupied(entry) => entry.into_mut(),
        Entry::Vacant(entry) => {
            debug!("No entry yet for {}", identity);
            entry.insert(UsageRecord::new(identity.clone(), at))
        }
    }
}

fn use_count(records: &BTreeMap<AppIdentity, UsageRecord>, identity: &AppIdentity) -> u64 {
    records.get(identity).map_or(0, |r| r.use_count)
}

fn last_execution(
    records: &BTreeMap<AppIdentity, UsageRecord>,
    identity: &AppIdentity,
) -> Option<DateTime<Utc>> {
    records.get(identity).map(|r| r.last_execution)
}
