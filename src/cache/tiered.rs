//! Tiered Cache Module
//!
//! Combines an ordered list of tiers, fastest first, into one read-through,
//! write-through cache.

use std::sync::Arc;
use std::time::Duration as StdDuration;

use async_trait::async_trait;
use chrono::Duration;
use tracing::{debug, warn};

use crate::cache::{CacheEntry, Prunable, Tier};
use crate::error::{CacheError, Result};
use crate::tasks::{RefillCounters, RefillJob, RefillStats, RefillWorker};

/// Shared handle to a tier.
pub type SharedTier = Arc<dyn Tier>;

// == Refill Mode ==
/// How values found in a slower tier are copied into the faster ones.
enum Refill {
    /// Written before `get` returns. A failed write fails the `get`.
    Sync,
    /// Handed to a background worker; failures are logged and counted.
    Background(RefillWorker),
}

// == Tiered Cache ==
/// Ordered combination of tiers, index 0 being the fastest.
///
/// Any suffix of the tier list behaves exactly like a `TieredCache` built
/// over that suffix: a lookup walks the tiers with a cursor, and only a
/// [`CacheError::Miss`] moves it forward.
pub struct TieredCache {
    tiers: Vec<SharedTier>,
    refill: Refill,
    refill_stats: Arc<RefillStats>,
}

impl TieredCache {
    // == Constructors ==
    /// Creates a combination that refills faster tiers synchronously.
    pub fn new(tiers: Vec<SharedTier>) -> Self {
        Self {
            tiers,
            refill: Refill::Sync,
            refill_stats: Arc::new(RefillStats::default()),
        }
    }

    /// Creates a combination whose refills run on a background worker with
    /// a queue of `queue_size` pending jobs.
    ///
    /// Must be called from within a tokio runtime.
    pub fn with_background_refill(tiers: Vec<SharedTier>, queue_size: usize) -> Self {
        let refill_stats = Arc::new(RefillStats::default());
        let worker = RefillWorker::spawn(queue_size, refill_stats.clone());
        Self {
            tiers,
            refill: Refill::Background(worker),
            refill_stats,
        }
    }

    pub fn tiers(&self) -> &[SharedTier] {
        &self.tiers
    }

    pub fn refill_counters(&self) -> RefillCounters {
        self.refill_stats.snapshot()
    }

    // == Set ==
    /// Writes to every tier, fastest to slowest.
    ///
    /// Stops at the first failing tier; tiers already written keep the value.
    pub async fn set(&self, key: &str, value: Vec<u8>, ttl: Duration) -> Result<()> {
        for tier in &self.tiers {
            tier.set(key, value.clone(), ttl).await?;
        }
        Ok(())
    }

    // == Get ==
    /// Looks the key up tier by tier.
    ///
    /// A miss falls through to the next tier; any other error is returned
    /// without consulting slower tiers. A hit below tier 0 is copied into
    /// every faster tier with its remaining TTL.
    pub async fn get(&self, key: &str) -> Result<CacheEntry> {
        for (depth, tier) in self.tiers.iter().enumerate() {
            match tier.get(key).await {
                Ok(entry) => {
                    if depth > 0 {
                        debug!(key, tier = tier.name(), depth, "hit below fastest tier");
                        self.refill(key, &entry, depth).await?;
                    }
                    return Ok(entry);
                }
                Err(err) if err.is_miss() => continue,
                Err(err) => {
                    warn!(key, tier = tier.name(), error = %err, "tier lookup failed");
                    return Err(err);
                }
            }
        }
        Err(CacheError::Miss(key.to_string()))
    }

    async fn refill(&self, key: &str, entry: &CacheEntry, depth: usize) -> Result<()> {
        let faster = &self.tiers[..depth];
        match &self.refill {
            Refill::Sync => match write_back(faster, key, entry).await {
                Ok(()) => {
                    self.refill_stats.record_completed();
                    Ok(())
                }
                Err(err) => {
                    self.refill_stats.record_failed();
                    Err(err)
                }
            },
            Refill::Background(worker) => {
                worker.dispatch(RefillJob {
                    key: key.to_string(),
                    source: self.tiers[depth].clone(),
                    tiers: faster.to_vec(),
                });
                Ok(())
            }
        }
    }

    // == Delete ==
    /// Removes `key` from every tier, fastest to slowest, stopping at the
    /// first failure.
    pub async fn delete(&self, key: &str) -> Result<()> {
        for tier in &self.tiers {
            tier.delete(key).await?;
        }
        Ok(())
    }

    // == Flush ==
    pub async fn flush(&self) -> Result<()> {
        for tier in &self.tiers {
            tier.flush().await?;
        }
        Ok(())
    }

    // == Prune ==
    /// Prunes every tier that supports it.
    ///
    /// Keeps going past failures and reports them together. Returns the
    /// total number of entries removed when every tier succeeds.
    pub async fn prune(&self) -> Result<usize> {
        self.prune_tiers(None).await
    }

    /// Like [`prune`](Self::prune), but each tier gets at most `per_tier` to
    /// finish. A tier that overruns counts as one failure and the sweep moves
    /// on to the next tier.
    pub async fn prune_each_within(&self, per_tier: StdDuration) -> Result<usize> {
        self.prune_tiers(Some(per_tier)).await
    }

    async fn prune_tiers(&self, per_tier: Option<StdDuration>) -> Result<usize> {
        let mut removed = 0;
        let mut messages = Vec::new();

        for tier in &self.tiers {
            let Some(prunable) = tier.prunable() else {
                debug!(tier = tier.name(), "tier does not support pruning");
                continue;
            };
            let outcome = match per_tier {
                Some(budget) => match tokio::time::timeout(budget, prunable.prune()).await {
                    Ok(result) => result,
                    Err(_) => Err(CacheError::Timeout(budget)),
                },
                None => prunable.prune().await,
            };
            match outcome {
                Ok(count) => removed += count,
                Err(err) => {
                    warn!(tier = tier.name(), error = %err, "prune failed");
                    messages.push(format!("{}: {}", tier.name(), err));
                }
            }
        }

        if messages.is_empty() {
            Ok(removed)
        } else {
            Err(CacheError::Aggregate {
                failures: messages.len(),
                messages,
            })
        }
    }
}

// == Write Back ==
/// Copies `entry` into `faster`, starting with the tier closest to where it
/// was found and ending at tier 0.
///
/// The TTL is recomputed from `entry.expires_at` before every write, so a
/// refill never extends an entry's lifetime. An already expired entry makes
/// each write a no-op.
pub(crate) async fn write_back(faster: &[SharedTier], key: &str, entry: &CacheEntry) -> Result<()> {
    for tier in faster.iter().rev() {
        tier.set(key, entry.value.clone(), entry.ttl_remaining()).await?;
    }
    Ok(())
}

#[async_trait]
impl Tier for TieredCache {
    fn name(&self) -> &str {
        "tiered"
    }

    async fn set(&self, key: &str, value: Vec<u8>, ttl: Duration) -> Result<()> {
        TieredCache::set(self, key, value, ttl).await
    }

    async fn get(&self, key: &str) -> Result<CacheEntry> {
        TieredCache::get(self, key).await
    }

    async fn delete(&self, key: &str) -> Result<()> {
        TieredCache::delete(self, key).await
    }

    async fn flush(&self) -> Result<()> {
        TieredCache::flush(self).await
    }

    fn prunable(&self) -> Option<&dyn Prunable> {
        Some(self)
    }
}

#[async_trait]
impl Prunable for TieredCache {
    async fn prune(&self) -> Result<usize> {
        TieredCache::prune(self).await
    }
}
