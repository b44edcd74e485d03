//! # Bounded Ranked List
//!
//! A fixed-capacity sequence kept in rank order (best first) under
//! single-element insertion. Capacities are small, so a linear insertion sort
//! with tail eviction is all that is needed.

use crate::error::{TrackerError, TrackerResult, ViewKind};

/// A rank-ordered sequence that never holds more than `limit` entries
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundedRankedList<T> {
    items: Vec<T>,
    limit: usize,
}

impl<T> BoundedRankedList<T> {
    /// Create an empty list. A zero `limit` is rejected.
    pub fn new(limit: usize, view: ViewKind) -> TrackerResult<Self> {
        if limit == 0 {
            return Err(TrackerError::InvalidCapacity { view, limit });
        }

        Ok(Self {
            items: Vec::new(),
            limit,
        })
    }

    /// Insert `entry` before the first incumbent it strictly outranks.
    ///
    /// `outranks(new, existing)` must return `true` only when `new` is
    /// strictly better, so equal-ranked incumbents keep their place. When no
    /// such incumbent exists the entry is appended if there is room and
    /// dropped otherwise. Returns whether the entry ended up in the list.
    pub fn insert_by<F>(&mut self, entry: T, mut outranks: F) -> bool
    where
        F: FnMut(&T, &T) -> bool,
    {
        let position = self
            .items
            .iter()
            .position(|existing| outranks(&entry, existing));

        match position {
            Some(idx) => {
                self.items.insert(idx, entry);
                // Only the tail can fall off; idx < limit so the new entry stays.
                self.items.truncate(self.limit);
                true
            }
            None if self.items.len() < self.limit => {
                self.items.push(entry);
                true
            }
            None => false,
        }
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn get(&self, idx: usize) -> Option<&T> {
        self.items.get(idx)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.items
    }
}

impl<T: PartialEq> BoundedRankedList<T> {
    pub fn contains(&self, entry: &T) -> bool {
        self.items.contains(entry)
    }
}

impl<T: Ord> BoundedRankedList<T> {
    /// Insert using the natural order, larger values ranking higher
    pub fn insert(&mut self, entry: T) -> bool {
        self.insert_by(entry, |new, existing| new > existing)
    }
}

impl<'a, T> IntoIterator for &'a BoundedRankedList<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl<T> std::ops::Index<usize> for BoundedRankedList<T> {
    type Output = T;

    fn index(&self, idx: usize) -> &T {
        &self.items[idx]
    }
}
