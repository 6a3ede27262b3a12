//! Per-(page, row) value cache with expiry, persisted as JSON under
//! [`keys::CONTENT_CACHE`].

use crate::Result;
use livedisplay_types::{KeyValueStore, keys};
use serde::{Deserialize, Serialize};

/// Lifetime of a cached clock reading
pub const CLOCK_TTL_MS: i64 = 60_000;

/// Lifetime of every other cached value
pub const DEFAULT_TTL_MS: i64 = 600_000;

pub fn ttl_ms(is_clock: bool) -> i64 {
    if is_clock {
        CLOCK_TTL_MS
    } else {
        DEFAULT_TTL_MS
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheEntry {
    /// Epoch milliseconds after which the entry is stale
    #[serde(rename = "timeout")]
    pub expires_at: i64,
    pub value: String,
}

impl CacheEntry {
    pub fn is_fresh(&self, now_ms: i64) -> bool {
        now_ms < self.expires_at
    }
}

type Table = Vec<Option<Vec<Option<CacheEntry>>>>;

/// Sparse two-level table; holes serialize as `null`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetricCache {
    table: Table,
}

impl MetricCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rehydrate from the store. Stale entries are kept; malformed JSON
    /// yields an empty cache.
    pub fn load(store: &dyn KeyValueStore) -> Self {
        let Some(raw) = store.get(keys::CONTENT_CACHE) else {
            return Self::new();
        };

        match Self::from_json(&raw) {
            Ok(cache) => cache,
            Err(err) => {
                tracing::warn!(error = %err, "discarding malformed content cache");
                Self::new()
            }
        }
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        let table: Table = serde_json::from_str(raw)?;
        Ok(Self { table })
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.table)?)
    }

    pub fn persist(&self, store: &mut dyn KeyValueStore) -> Result<()> {
        store.set(keys::CONTENT_CACHE, &self.to_json()?)?;
        Ok(())
    }

    pub fn get(&self, page: usize, row: usize) -> Option<&CacheEntry> {
        self.table.get(page)?.as_ref()?.get(row)?.as_ref()
    }

    /// Cached value for the slot if it has not expired at `now_ms`
    pub fn fresh(&self, page: usize, row: usize, now_ms: i64) -> Option<&str> {
        self.get(page, row)
            .filter(|entry| entry.is_fresh(now_ms))
            .map(|entry| entry.value.as_str())
    }

    pub fn insert(
        &mut self,
        page: usize,
        row: usize,
        value: impl Into<String>,
        now_ms: i64,
        is_clock: bool,
    ) -> &CacheEntry {
        if self.table.len() <= page {
            self.table.resize(page + 1, None);
        }
        let rows = self.table[page].get_or_insert_with(Vec::new);
        if rows.len() <= row {
            rows.resize(row + 1, None);
        }
        rows[row].insert(CacheEntry {
            expires_at: now_ms + ttl_ms(is_clock),
            value: value.into(),
        })
    }

    pub fn clear(&mut self) {
        self.table.clear();
    }

    /// Populated slots as `(page, row, entry)`
    pub fn entries(&self) -> impl Iterator<Item = (usize, usize, &CacheEntry)> {
        self.table.iter().enumerate().flat_map(|(page, rows)| {
            let rows = rows.iter().flatten().enumerate();
            rows.filter_map(move |(row, e)| Some((page, row, e.as_ref()?)))
        })
    }

    pub fn len(&self) -> usize {
        self.entries().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
