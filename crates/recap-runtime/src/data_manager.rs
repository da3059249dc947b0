//! Memoizing cache in front of the load-and-project pipeline.
//!
//! Callers use [`DataManager::get_events`] to obtain the projected events for
//! a set of files and a date range. The first request for a key loads from
//! disk; later requests for the same key are served from memory. Failed loads
//! are never cached and never retried.

use std::collections::HashMap;
use std::path::PathBuf;

use recap_core::error::Result;
use recap_core::models::{DateRange, PlaybackEvent};
use recap_data::analysis::load_playback_events;

// ── LoadKey ───────────────────────────────────────────────────────────────────

/// Identity of one load: the files (order-insensitive) and the date range.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LoadKey {
    paths: Vec<PathBuf>,
    range: DateRange,
}

impl LoadKey {
    pub fn new(paths: &[PathBuf], range: DateRange) -> Self {
        let mut paths = paths.to_vec();
        paths.sort();
        Self { paths, range }
    }

    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }

    pub fn range(&self) -> DateRange {
        self.range
    }
}

// ── DataManager ───────────────────────────────────────────────────────────────

/// Cache of projected playback events keyed by [`LoadKey`].
///
/// # Example
/// ```no_run
/// use recap_core::models::DateRange;
/// use recap_runtime::data_manager::DataManager;
///
/// let mut mgr = DataManager::new();
/// let paths = vec!["Streaming_History_Audio_2025.json".into()];
/// let events = mgr.get_events(&paths, DateRange::for_year(2025)).unwrap();
/// println!("{} events", events.len());
/// ```
#[derive(Debug, Default)]
pub struct DataManager {
    cache: HashMap<LoadKey, Vec<PlaybackEvent>>,
    hits: u64,
    misses: u64,
}

impl DataManager {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Public API ────────────────────────────────────────────────────────

    /// Return the events for `paths` within `range`, loading them on the
    /// first request.
    pub fn get_events(&mut self, paths: &[PathBuf], range: DateRange) -> Result<&[PlaybackEvent]> {
        let key = LoadKey::new(paths, range);

        if self.cache.contains_key(&key) {
            self.hits += 1;
            tracing::debug!(files = key.paths.len(), "returning cached events");
        } else {
            self.misses += 1;
            let events = load_playback_events(&key.paths, range)?;
            tracing::debug!(
                files = key.paths.len(),
                events = events.len(),
                "event cache updated"
            );
            self.cache.insert(key.clone(), events);
        }

        Ok(self.cache.get(&key).map(Vec::as_slice).unwrap_or_default())
    }

    /// Drop every cached entry.
    pub fn invalidate_cache(&mut self) {
        self.cache.clear();
        tracing::debug!("cache invalidated");
    }

    /// Keys currently held in the cache.
    pub fn cached_keys(&self) -> impl Iterator<Item = &LoadKey> {
        self.cache.keys()
    }

    /// Number of requests served from the cache.
    pub fn hits(&self) -> u64 {
        self.hits
    }

    /// Number of requests that went to disk, successful or not.
    pub fn misses(&self) -> u64 {
        self.misses
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
