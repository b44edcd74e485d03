//! # Usage Tracking Module
//!
//! This module keeps track of which applications get launched and surfaces
//! two short lists from that history.
//!
//! ## Overview
//!
//! Every launch, install, update, pin or removal mutates the canonical
//! [`UsageRecord`] of one application. From the full record set the
//! [`UsageTracker`] derives:
//!
//! - **Most used**: top applications by launch count (at least two launches)
//! - **Recent**: top applications by last launch, excluding anything already
//!   in the most used list
//!
//! Both lists are [`BoundedRankedList`]s with a small fixed capacity.
//!
//! ## Collaborators
//!
//! - [`RecordStore`] persists the canonical set ([`JsonFileStore`] by default)
//! - [`UsageStatsSource`] provides cold-start statistics for
//!   [`UsageTracker::bulk_replace`]

mod ranked;
mod record;
mod source;
mod storage;
mod tracker;

pub use ranked::BoundedRankedList;
pub use record::{AppAge, AppIdentity, Observation, UsageRecord};
pub use source::{collect_stats, JsonStatsSource, UsageStatsSource};
pub use storage::{JsonFileStore, RecordStore, RECORDS_FILE_NAME};
pub use tracker::{
    AgedRecord, TrackerSettings, UsageTracker, DEFAULT_MIN_USE_COUNT, DEFAULT_MOST_USED_LIMIT,
    DEFAULT_RECENT_LIMIT,
};
