//! Memory Tier Module
//!
//! In-process tier: a [`CacheStore`] behind one mutex.

use async_trait::async_trait;
use chrono::Duration;
use tokio::sync::Mutex;
use tracing::debug;

use crate::cache::{CacheEntry, CacheStats, CacheStore, Prunable, Tier};
use crate::error::Result;

// == Memory Tier ==
/// Thread-safe in-process tier.
///
/// Every operation holds the lock for its whole read-check-evict or write
/// sequence, so lazy eviction on read never interleaves with a concurrent set.
#[derive(Debug, Default)]
pub struct MemoryTier {
    store: Mutex<CacheStore>,
}

impl MemoryTier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries currently held, expired or not.
    pub async fn len(&self) -> usize {
        self.store.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.store.lock().await.is_empty()
    }

    pub async fn stats(&self) -> CacheStats {
        self.store.lock().await.stats()
    }
}

#[async_trait]
impl Tier for MemoryTier {
    fn name(&self) -> &str {
        "memory"
    }

    async fn set(&self, key: &str, value: Vec<u8>, ttl: Duration) -> Result<()> {
        if ttl <= Duration::zero() {
            debug!(key, "memory tier: dropping set with non-positive ttl");
            return Ok(());
        }
        self.store.lock().await.set(key.to_string(), value, ttl);
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<CacheEntry> {
        self.store.lock().await.get(key)
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.store.lock().await.delete(key);
        Ok(())
    }

    async fn flush(&self) -> Result<()> {
        self.store.lock().await.clear();
        Ok(())
    }

    fn prunable(&self) -> Option<&dyn Prunable> {
        Some(self)
    }
}

#[async_trait]
impl Prunable for MemoryTier {
    async fn prune(&self) -> Result<usize> {
        Ok(self.store.lock().await.cleanup_expired())
    }
}
