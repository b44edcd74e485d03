//! App Switcher - most used and recently used application tracking
//!
//! This library records application launches, installs and removals, and
//! keeps two bounded lists derived from that history: the most used
//! applications and the most recently used ones.

pub mod config;
pub mod error;
pub mod switcher;
pub mod usage;
