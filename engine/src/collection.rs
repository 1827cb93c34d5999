//! The ordered, key-unique record cache.

use crate::Resource;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// An ordered sequence of records with unique ids.
///
/// Order is whatever the server returned, except that created records are
/// prepended. Every mutator preserves key uniqueness.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Collection<R> {
    records: Vec<R>,
}

impl<R> Default for Collection<R> {
    fn default() -> Self {
        Self {
            records: Vec::new(),
        }
    }
}

impl<R: Resource> Collection<R> {
    /// Create an empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a collection from a server list.
    ///
    /// If the list repeats a key, the first occurrence wins.
    pub fn from_records(records: Vec<R>) -> Self {
        let mut seen = HashSet::with_capacity(records.len());
        let records = records
            .into_iter()
            .filter(|r| seen.insert(r.id().to_owned()))
            .collect();
        Self { records }
    }

    /// Replace every record with a server list.
    pub fn replace_all(&mut self, records: Vec<R>) {
        *self = Self::from_records(records);
    }

    /// Get a record by ID.
    pub fn get(&self, id: &str) -> Option<&R> {
        self.records.iter().find(|r| r.id() == id)
    }

    /// Get a mutable record by ID.
    pub fn get_mut(&mut self, id: &str) -> Option<&mut R> {
        self.records.iter_mut().find(|r| r.id() == id)
    }

    /// Index of a record by ID.
    pub fn position(&self, id: &str) -> Option<usize> {
        self.records.iter().position(|r| r.id() == id)
    }

    /// Check if a record exists.
    pub fn contains(&self, id: &str) -> bool {
        self.position(id).is_some()
    }

    /// Put a record at the front, dropping any older copy with the same key.
    pub fn prepend(&mut self, record: R) {
        self.records.retain(|r| r.id() != record.id());
        self.records.insert(0, record);
    }

    /// Overwrite the record stored under `id` in place.
    ///
    /// Returns the previous value, or `None` (and stores nothing) when `id`
    /// is not cached. If `record` carries a different key that is already
    /// cached elsewhere, that other copy is dropped.
    pub fn replace(&mut self, id: &str, record: R) -> Option<R> {
        self.position(id)?;
        if record.id() != id {
            if let Some(other) = self.position(record.id()) {
                self.records.remove(other);
            }
        }
        let index = self.position(id)?;
        Some(std::mem::replace(&mut self.records[index], record))
    }

    /// Remove a record, returning it together with the index it occupied.
    pub fn remove(&mut self, id: &str) -> Option<(usize, R)> {
        let index = self.position(id)?;
        Some((index, self.records.remove(index)))
    }

    /// Insert a record at `index`, or at the end if `index` is past it.
    ///
    /// Does nothing and returns `false` if the key is already cached.
    pub fn insert_at(&mut self, index: usize, record: R) -> bool {
        if self.contains(record.id()) {
            return false;
        }
        let index = index.min(self.records.len());
        self.records.insert(index, record);
        true
    }

    /// Drop every record.
    pub fn clear(&mut self) {
        self.records.clear();
    }

    /// All records in order.
    pub fn as_slice(&self) -> &[R] {
        &self.records
    }

    /// Iterate over records in order.
    pub fn iter(&self) -> std::slice::Iter<'_, R> {
        self.records.iter()
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Check if the collection is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Consume into the underlying list.
    pub fn into_vec(self) -> Vec<R> {
        self.records
    }
}

impl<'a, R: Resource> IntoIterator for &'a Collection<R> {
    type Item = &'a R;
    type IntoIter = std::slice::Iter<'a, R>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
