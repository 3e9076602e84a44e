use std::collections::HashMap;
use std::time::{Duration, Instant};

use blake3::{Hash, Hasher};

use crate::widget::Widget;

use super::{DisplayLayout, DisplayMode, project};

const DEFAULT_MAX_ENTRIES: usize = 16;

/// Fingerprint of the inputs of one projection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProjectionKey(Hash);

impl ProjectionKey {
    /// Hash everything `project` reads, including the widget payloads that
    /// are copied into the display.
    pub fn for_inputs(widgets: &[Widget], canonical_columns: u32, mode: DisplayMode) -> Option<Self> {
        let mut hasher = Hasher::new();
        hasher.update(&serde_json::to_vec(widgets).ok()?);
        hasher.update(&canonical_columns.to_le_bytes());
        hasher.update(&serde_json::to_vec(&mode).ok()?);
        Some(Self(hasher.finalize()))
    }
}

#[derive(Debug, Clone)]
struct CachedProjection {
    layout: DisplayLayout,
    created_at: Instant,
}

/// Result of a cache lookup.
#[derive(Debug, Clone)]
pub struct CachedLookup {
    pub layout: DisplayLayout,
    pub hit: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub entries: usize,
}

/// Memo of recent projections. Entries expire `ttl` after they were computed.
///
/// Owned by whoever drives the display, never shared globally.
#[derive(Debug)]
pub struct ProjectionCache {
    ttl: Duration,
    max_entries: usize,
    entries: HashMap<ProjectionKey, CachedProjection>,
    hits: u64,
    misses: u64,
}

impl ProjectionCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            max_entries: DEFAULT_MAX_ENTRIES,
            entries: HashMap::new(),
            hits: 0,
            misses: 0,
        }
    }

    pub fn with_max_entries(mut self, max_entries: usize) -> Self {
        self.max_entries = max_entries.max(1);
        self
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn project(
        &mut self,
        widgets: &[Widget],
        canonical_columns: u32,
        mode: DisplayMode,
    ) -> CachedLookup {
        self.project_at(widgets, canonical_columns, mode, Instant::now())
    }

    /// Like [`ProjectionCache::project`] with an explicit clock reading.
    pub fn project_at(
        &mut self,
        widgets: &[Widget],
        canonical_columns: u32,
        mode: DisplayMode,
        now: Instant,
    ) -> CachedLookup {
        let Some(key) = ProjectionKey::for_inputs(widgets, canonical_columns, mode) else {
            self.misses += 1;
            return CachedLookup {
                layout: project(widgets, canonical_columns, mode),
                hit: false,
            };
        };

        if let Some(entry) = self.entries.get(&key) {
            if !self.is_expired(entry, now) {
                self.hits += 1;
                return CachedLookup {
                    layout: entry.layout.clone(),
                    hit: true,
                };
            }
        }

        self.misses += 1;
        let layout = project(widgets, canonical_columns, mode);
        self.make_room(now);
        self.entries.insert(
            key,
            CachedProjection {
                layout: layout.clone(),
                created_at: now,
            },
        );
        CachedLookup { layout, hit: false }
    }

    /// Drop every entry older than the TTL.
    pub fn purge_expired(&mut self, now: Instant) {
        let ttl = self.ttl;
        self.entries
            .retain(|_, entry| now.saturating_duration_since(entry.created_at) < ttl);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits,
            misses: self.misses,
            entries: self.entries.len(),
        }
    }

    fn is_expired(&self, entry: &CachedProjection, now: Instant) -> bool {
        now.saturating_duration_since(entry.created_at) >= self.ttl
    }

    fn make_room(&mut self, now: Instant) {
        self.purge_expired(now);
        while self.entries.len() >= self.max_entries {
            let oldest = self
                .entries
                .iter()
                .min_by_key(|(_, entry)| entry.created_at)
                .map(|(key, _)| *key);
            match oldest {
                Some(key) => {
                    self.entries.remove(&key);
                }
                None => break,
            }
        }
    }
}

impl Default for ProjectionCache {
    fn default() -> Self {
        Self::new(Duration::from_secs(30))
    }
}
