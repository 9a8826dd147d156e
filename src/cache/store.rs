//! Cache Store Module
//!
//! Synchronous entry map with TTL expiration. The memory tier wraps one of
//! these behind a single lock.

use std::collections::HashMap;

use chrono::{Duration, Utc};

use crate::cache::{CacheEntry, CacheStats};
use crate::error::{CacheError, Result};

// == Cache Store ==
/// Key to entry map plus running statistics.
#[derive(Debug, Default)]
pub struct CacheStore {
    entries: HashMap<String, CacheEntry>,
    stats: CacheStats,
}

impl CacheStore {
    pub fn new() -> Self {
        Self::default()
    }

    // == Set ==
    /// Stores `value` under `key` for `ttl`, overwriting any prior entry.
    ///
    /// A non-positive TTL is a no-op.
    pub fn set(&mut self, key: String, value: Vec<u8>, ttl: Duration) {
        let Some(entry) = CacheEntry::with_ttl(value, ttl) else {
            return;
        };
        self.entries.insert(key, entry);
        self.stats.set_total_entries(self.entries.len());
    }

    // == Get ==
    /// Returns a copy of the entry if it has not expired.
    ///
    /// An expired entry is removed before the miss is reported.
    pub fn get(&mut self, key: &str) -> Result<CacheEntry> {
        let now = Utc::now();
        match self.entries.get(key) {
            Some(entry) if !entry.is_expired_at(now) => {
                let entry = entry.clone();
                self.stats.record_hit();
                Ok(entry)
            }
            Some(_) => {
                self.entries.remove(key);
                self.stats.record_expired(1);
                self.stats.set_total_entries(self.entries.len());
                self.stats.record_miss();
                Err(CacheError::Miss(key.to_string()))
            }
            None => {
                self.stats.record_miss();
                Err(CacheError::Miss(key.to_string()))
            }
        }
    }

    // == Delete ==
    /// Removes an entry by key. Returns whether something was removed.
    pub fn delete(&mut self, key: &str) -> bool {
        let removed = self.entries.remove(key).is_some();
        self.stats.set_total_entries(self.entries.len());
        removed
    }

    /// Drops every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.stats.set_total_entries(0);
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.set_total_entries(self.entries.len());
        stats
    }

    // == Cleanup Expired ==
    /// Removes all entries whose expiration is at or before now.
    ///
    /// Returns the number of entries removed.
    pub fn cleanup_expired(&mut self) -> usize {
        let now = Utc::now();
        let before = self.entries.len();
        self.entries.retain(|_, entry| !entry.is_expired_at(now));
        let count = before - self.entries.len();

        self.stats.record_expired(count);
        self.stats.set_total_entries(self.entries.len());
        count
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
