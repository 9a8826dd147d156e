//! Facade
//!
//! [`Cache`] is the handle callers use: a cloneable reference to a
//! [`TieredCache`] whose operations all run under a deadline. The free
//! functions at the bottom of this module forward to a process-wide default
//! instance (memory, then SQLite) set up by [`init`].

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::OnceCell;
use tokio::time::Instant;
use tracing::info;

use crate::cache::{CacheEntry, CacheStats, MemoryTier, SharedTier, SqliteTier, TieredCache};
use crate::config::{Config, RefillMode};
use crate::error::{CacheError, Result};
use crate::tasks::RefillCounters;

// == Cache ==
#[derive(Clone)]
pub struct Cache {
    tiered: Arc<TieredCache>,
    timeout: Duration,
    memory: Option<Arc<MemoryTier>>,
}

impl Cache {
    /// Wraps `tiered`, bounding every operation by `timeout`.
    pub fn new(tiered: TieredCache, timeout: Duration) -> Self {
        Self {
            tiered: Arc::new(tiered),
            timeout,
            memory: None,
        }
    }

    /// Builds the default ordering from configuration: an in-process memory
    /// tier in front of the SQLite tier at `config.database_path`.
    pub async fn open(config: &Config) -> Result<Self> {
        let memory = Arc::new(MemoryTier::new());
        let sqlite = Arc::new(SqliteTier::open(&config.database_path).await?);
        let tiers: Vec<SharedTier> = vec![memory.clone(), sqlite];

        let tiered = match config.refill_mode {
            RefillMode::Sync => TieredCache::new(tiers),
            RefillMode::Background => {
                TieredCache::with_background_refill(tiers, config.refill_queue_size)
            }
        };
        info!(
            "Tiered cache opened: memory -> sqlite ({}), refill={:?}",
            config.database_path, config.refill_mode
        );

        Ok(Self {
            tiered: Arc::new(tiered),
            timeout: config.operation_timeout(),
            memory: Some(memory),
        })
    }

    pub fn tiered(&self) -> &TieredCache {
        &self.tiered
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub async fn set(&self, key: &str, value: impl Into<Vec<u8>>, ttl: chrono::Duration) -> Result<()> {
        self.bounded(self.tiered.set(key, value.into(), ttl)).await
    }

    pub async fn get(&self, key: &str) -> Result<CacheEntry> {
        self.bounded(self.tiered.get(key)).await
    }

    /// Like [`get`](Self::get) but bounded by a caller-supplied deadline
    /// instead of the configured timeout.
    pub async fn get_before(&self, key: &str, deadline: Instant) -> Result<CacheEntry> {
        with_deadline(deadline, self.tiered.get(key)).await
    }

    pub async fn delete(&self, key: &str) -> Result<()> {
        self.bounded(self.tiered.delete(key)).await
    }

    pub async fn flush(&self) -> Result<()> {
        self.bounded(self.tiered.flush()).await
    }

    /// Sweeps expired entries from every tier. Returns the number removed.
    ///
    /// The timeout applies to each tier separately, so a stalled tier is
    /// reported in the aggregate error while the others are still pruned.
    pub async fn prune(&self) -> Result<usize> {
        self.tiered.prune_each_within(self.timeout).await
    }

    /// Statistics of the memory tier, when this cache was built by
    /// [`open`](Self::open).
    pub async fn memory_stats(&self) -> Option<CacheStats> {
        match &self.memory {
            Some(memory) => Some(memory.stats().await),
            None => None,
        }
    }

    pub fn refill_counters(&self) -> RefillCounters {
        self.tiered.refill_counters()
    }

    async fn bounded<T>(&self, fut: impl Future<Output = Result<T>>) -> Result<T> {
        with_deadline(Instant::now() + self.timeout, fut).await
    }
}

// == Deadline ==
/// Runs `fut`, failing with [`CacheError::Timeout`] if it is still pending
/// at `deadline`.
pub async fn with_deadline<T>(deadline: Instant, fut: impl Future<Output = Result<T>>) -> Result<T> {
    let budget = deadline.saturating_duration_since(Instant::now());
    match tokio::time::timeout_at(deadline, fut).await {
        Ok(result) => result,
        Err(_) => Err(CacheError::Timeout(budget)),
    }
}

// == Default Instance ==
static DEFAULT: OnceCell<Cache> = OnceCell::const_new();

/// Opens the default cache from `config`. Later calls return the instance
/// created by the first successful one.
pub async fn init(config: &Config) -> Result<&'static Cache> {
    DEFAULT.get_or_try_init(|| Cache::open(config)).await
}

/// The default cache, once [`init`] has succeeded.
pub fn default_cache() -> Result<&'static Cache> {
    DEFAULT
        .get()
        .ok_or_else(|| CacheError::Internal("default cache not initialized".to_string()))
}

pub async fn set(key: &str, value: impl Into<Vec<u8>>, ttl: chrono::Duration) -> Result<()> {
    default_cache()?.set(key, value, ttl).await
}

pub async fn get(key: &str) -> Result<CacheEntry> {
    default_cache()?.get(key).await
}

pub async fn delete(key: &str) -> Result<()> {
    default_cache()?.delete(key).await
}

pub async fn flush() -> Result<()> {
    default_cache()?.flush().await
}

pub async fn prune() -> Result<usize> {
    default_cache()?.prune().await
}
