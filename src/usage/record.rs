//! # Usage Records
//!
//! The per-application bookkeeping kept by the tracker: a stable identity,
//! how often and how recently the application ran, and its install state.

use crate::error::{TrackerError, TrackerResult};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Stable key for one launchable application component.
///
/// The flattened form is `package/component`, e.g.
/// `org.mozilla.firefox/org.mozilla.firefox.App`. A component starting with
/// `.` is shorthand for a class inside the package.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AppIdentity {
    package: String,
    component: String,
}

impl AppIdentity {
    /// Build an identity from its two halves.
    ///
    /// Surrounding whitespace is trimmed; an empty half or a `/` inside
    /// either half is rejected, so the flattened form always parses back to
    /// the same identity.
    pub fn new(package: impl AsRef<str>, component: impl AsRef<str>) -> TrackerResult<Self> {
        let (package, component) = (package.as_ref().trim(), component.as_ref().trim());
        let malformed = |half: &str| half.is_empty() || half.contains('/');
        if malformed(package) || malformed(component) {
            return Err(TrackerError::InvalidIdentity(format!("{package}/{component}")));
        }

        Ok(Self {
            package: package.to_string(),
            component: component.to_string(),
        })
    }

    pub fn package(&self) -> &str {
        &self.package
    }

    pub fn component(&self) -> &str {
        &self.component
    }

    /// The component with a leading-dot shorthand expanded
    pub fn class_name(&self) -> String {
        if self.component.starts_with('.') {
            format!("{}{}", self.package, self.component)
        } else {
            self.component.clone()
        }
    }
}

impl fmt::Display for AppIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.package, self.component)
    }
}

impl FromStr for AppIdentity {
    type Err = TrackerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || TrackerError::InvalidIdentity(s.to_string());

        let (package, component) = s.split_once('/').ok_or_else(invalid)?;
        Self::new(package, component).map_err(|_| invalid())
    }
}

impl TryFrom<String> for AppIdentity {
    type Error = TrackerError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<AppIdentity> for String {
    fn from(identity: AppIdentity) -> Self {
        identity.to_string()
    }
}

/// Freshness classification derived from the last run and the pin flag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppAge {
    FrequentUse,
    RareUse,
}

impl AppAge {
    /// Pinned applications are always frequent; otherwise an application is
    /// frequent when it ran less than `window` before `now`.
    pub fn classify(
        last_execution: DateTime<Utc>,
        pinned: bool,
        now: DateTime<Utc>,
        window: Duration,
    ) -> Self {
        if pinned || now.signed_duration_since(last_execution) < window {
            AppAge::FrequentUse
        } else {
            AppAge::RareUse
        }
    }
}

impl fmt::Display for AppAge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppAge::FrequentUse => write!(f, "frequent"),
            AppAge::RareUse => write!(f, "rare"),
        }
    }
}

/// Everything the tracker knows about one application
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageRecord {
    pub identity: AppIdentity,
    /// Number of recorded launches
    #[serde(default)]
    pub use_count: u64,
    pub last_execution: DateTime<Utc>,
    /// Freshly installed and not launched since
    #[serde(default)]
    pub is_new: bool,
    /// Updated and not launched since
    #[serde(default)]
    pub is_updated: bool,
    #[serde(default)]
    pub is_pinned: bool,
}

impl UsageRecord {
    /// A record that has never been launched
    pub fn new(identity: AppIdentity, last_execution: DateTime<Utc>) -> Self {
        Self {
            identity,
            use_count: 0,
            last_execution,
            is_new: false,
            is_updated: false,
            is_pinned: false,
        }
    }

    /// Builder-style launch count, mostly for usage-stats imports
    pub fn with_count(mut self, use_count: u64) -> Self {
        self.use_count = use_count;
        self
    }

    pub fn age_at(&self, now: DateTime<Utc>, window: Duration) -> AppAge {
        AppAge::classify(self.last_execution, self.is_pinned, now, window)
    }
}

/// A launch as reported by the host: who ran, when, and the pin state the
/// host observed for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Observation {
    pub identity: AppIdentity,
    pub at: DateTime<Utc>,
    pub pinned: bool,
}

impl Observation {
    /// An unpinned launch observation
    pub fn launch(identity: AppIdentity, at: DateTime<Utc>) -> Self {
        Self {
            identity,
            at,
            pinned: false,
        }
    }

    pub fn pinned(mut self, pinned: bool) -> Self {
        self.pinned = pinned;
        self
    }
}
