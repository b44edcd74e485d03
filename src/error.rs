//! # Tracker Errors
//!
//! The tracker core is total over its inputs: unknown identities are created
//! on first sight, and removing an unknown identity is a silent no-op. The only
//! failures left are configuration mistakes, which are reported here.
//!
//! Collaborators that perform I/O (storage, usage-stats sources, the CLI) use
//! `anyhow::Result` instead.

use thiserror::Error;

/// Which ranked view a capacity applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewKind {
    MostUsed,
    Recent,
}

impl std::fmt::Display for ViewKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ViewKind::MostUsed => write!(f, "most used"),
            ViewKind::Recent => write!(f, "recent"),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TrackerError {
    #[error("Invalid {view} capacity: {limit} (must be at least 1)")]
    InvalidCapacity { view: ViewKind, limit: usize },

    #[error("Invalid application identity: {0:?} (expected \"package/component\")")]
    InvalidIdentity(String),
}

pub type TrackerResult<T> = Result<T, TrackerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_capacity_message() {
        let err = TrackerError::InvalidCapacity {
            view: ViewKind::Recent,
            limit: 0,
        };
        assert_eq!(
            err.to_string(),
            "Invalid recent capacity: 0 (must be at least 1)"
        );
    }

    #[test]
    fn test_invalid_identity_message() {
        let err = TrackerError::InvalidIdentity("nonsense".to_string());
        assert!(err.to_string().contains("\"nonsense\""));
    }
}
