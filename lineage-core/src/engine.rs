//! Session engine: parse-through-cache orchestration
//!
//! Owns one result cache and one resolved configuration for the lifetime of
//! an editing session. Construct once per session, reset on demand; the cache
//! is never global state.

use crate::blame::{self, BlameReport};
use crate::cache::{BlameCache, CacheStats};
use crate::config::ResolvedConfig;
use crate::highlight::{self, Classification, HighlightMode};

/// One session's blame analysis state
#[derive(Debug)]
pub struct BlameEngine {
    cache: BlameCache,
    config: ResolvedConfig,
}

impl BlameEngine {
    /// Create an engine with a cache sized from the configuration
    pub fn new(config: ResolvedConfig) -> Self {
        BlameEngine {
            cache: BlameCache::new(config.cache_capacity),
            config,
        }
    }

    /// Create an engine with default configuration
    pub fn with_defaults() -> anyhow::Result<Self> {
        Ok(BlameEngine::new(ResolvedConfig::defaults()?))
    }

    pub fn config(&self) -> &ResolvedConfig {
        &self.config
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// Blame data for `file_key` at `revision`, parsing `raw_text` only when
    /// no current cache entry exists.
    ///
    /// The caller resolves `raw_text` before the call; on a hit it is unused.
    pub fn blame(&mut self, file_key: &str, revision: &str, raw_text: &str) -> &BlameReport {
        if self.cache.get(file_key, revision).is_none() {
            let report = blame::parse(raw_text);
            return self.cache.set(file_key, revision, report);
        }
        // Hit already counted by `get`; re-borrow without touching counters
        self.cache
            .lookup(file_key, revision)
            .expect("entry is current immediately after a cache hit")
    }

    /// Parse-through-cache, then classify under `mode`
    pub fn classify(
        &mut self,
        file_key: &str,
        revision: &str,
        raw_text: &str,
        mode: &HighlightMode,
    ) -> Classification {
        if self.cache.get(file_key, revision).is_none() {
            let report = blame::parse(raw_text);
            self.cache.set(file_key, revision, report);
        }
        match self.cache.lookup(file_key, revision) {
            Some(report) => highlight::classify(report, mode, &self.config),
            None => Classification::empty(),
        }
    }

    /// Drop the cache entry for one file (file content changed, e.g. on save)
    pub fn file_changed(&mut self, file_key: &str) {
        self.cache.delete(file_key);
    }

    /// Sweep all entries computed against a different revision (branch
    /// switch, new commit)
    pub fn revision_changed(&mut self, new_revision: &str) -> usize {
        self.cache.invalidate_for_revision_change(new_revision)
    }

    /// Clear all cached results, keeping configuration and counters
    pub fn reset(&mut self) {
        self.cache.clear();
    }
}
