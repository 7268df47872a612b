//! Blame result cache keyed by (file, revision)
//!
//! Avoids reparsing a blame report that was already computed for a file at
//! the current revision. Revision identity is an opaque string compared for
//! equality only.
//!
//! Global invariants enforced:
//! - A hit requires exact revision equality; a stale entry is a miss and is
//!   left in place to be overwritten by the next `set`
//! - Eviction is by insertion order (FIFO), not access order
//! - Hit/miss counters are observability only and never affect behavior
//! - No clocks: insertion order uses a logical counter

use crate::blame::BlameReport;
use serde::Serialize;
use std::collections::hash_map::Entry;
use std::collections::HashMap;

/// Default number of (file, revision) entries kept warm.
///
/// Bounds memory while covering a typical multi-file editing session.
pub const DEFAULT_CACHE_CAPACITY: usize = 50;

#[derive(Debug, Clone)]
struct CacheEntry {
    revision: String,
    result: BlameReport,
    /// Logical insertion index used for FIFO eviction
    inserted_at: u64,
}

/// Hit/miss counters with a derived hit rate
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
}

impl CacheStats {
    /// Hits over total lookups; 0.0 before any lookup
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// In-memory cache of parsed blame reports
#[derive(Debug)]
pub struct BlameCache {
    entries: HashMap<String, CacheEntry>,
    capacity: usize,
    insertions: u64,
    stats: CacheStats,
}

impl Default for BlameCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_CAPACITY)
    }
}

impl BlameCache {
    /// Create a cache bounded to `capacity` entries (minimum 1)
    pub fn new(capacity: usize) -> Self {
        BlameCache {
            entries: HashMap::new(),
            capacity: capacity.max(1),
            insertions: 0,
            stats: CacheStats::default(),
        }
    }

    /// Case-insensitive file key with normalized path separators, so the same
    /// file reached via different path spellings maps to one entry
    fn normalize_key(file_key: &str) -> String {
        file_key.replace('\\', "/").to_lowercase()
    }

    /// Look up the report for `file_key` at exactly `current_revision`.
    ///
    /// A revision mismatch is a miss; the stale entry stays in place. Counts
    /// toward hit/miss statistics.
    pub fn get(&mut self, file_key: &str, current_revision: &str) -> Option<&BlameReport> {
        let key = Self::normalize_key(file_key);
        let hit = self
            .entries
            .get(&key)
            .is_some_and(|entry| entry.revision == current_revision);
        if hit {
            self.stats.hits += 1;
            self.entries.get(&key).map(|entry| &entry.result)
        } else {
            self.stats.misses += 1;
            None
        }
    }

    /// Look up without touching the hit/miss counters.
    ///
    /// Used by callers that already counted the lookup via `get`.
    pub fn lookup(&self, file_key: &str, current_revision: &str) -> Option<&BlameReport> {
        let key = Self::normalize_key(file_key);
        self.entries
            .get(&key)
            .filter(|entry| entry.revision == current_revision)
            .map(|entry| &entry.result)
    }

    /// Store `result` for `file_key` at `revision`, superseding any entry for
    /// the same key. Inserting a genuinely new key at capacity first evicts
    /// the single oldest-inserted entry.
    pub fn set(&mut self, file_key: &str, revision: &str, result: BlameReport) -> &BlameReport {
        let key = Self::normalize_key(file_key);

        if !self.entries.contains_key(&key) && self.entries.len() >= self.capacity {
            self.evict_oldest();
        }

        self.insertions += 1;
        let entry = CacheEntry {
            revision: revision.to_string(),
            result,
            inserted_at: self.insertions,
        };
        match self.entries.entry(key) {
            Entry::Occupied(mut occupied) => {
                occupied.insert(entry);
                &occupied.into_mut().result
            }
            Entry::Vacant(vacant) => &vacant.insert(entry).result,
        }
    }

    /// Remove the entry for one file key, regardless of revision.
    ///
    /// Used when the file's content changed independent of revision (save).
    pub fn delete(&mut self, file_key: &str) -> bool {
        self.entries
            .remove(&Self::normalize_key(file_key))
            .is_some()
    }

    /// Remove every entry whose revision differs from `new_revision`.
    ///
    /// Bulk sweep for when the repository's revision pointer moves (branch
    /// switch, new commit). Returns the number of entries removed.
    pub fn invalidate_for_revision_change(&mut self, new_revision: &str) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, entry| entry.revision == new_revision);
        before - self.entries.len()
    }

    /// Drop all entries; counters are preserved
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn stats(&self) -> CacheStats {
        self.stats
    }

    fn evict_oldest(&mut self) {
        let oldest = self
            .entries
            .iter()
            .min_by_key(|(_, entry)| entry.inserted_at)
            .map(|(key, _)| key.clone());
        if let Some(key) = oldest {
            self.entries.remove(&key);
        }
    }
}
