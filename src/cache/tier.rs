//! Tier Capability Module
//!
//! The contract every layer of the cache implements, plus the optional prune
//! capability.

use async_trait::async_trait;
use chrono::Duration;

use crate::cache::CacheEntry;
use crate::error::Result;

// == Tier ==
/// One layer of the cache chain.
///
/// `get` reports an absent or expired key as [`CacheError::Miss`]; any other
/// error is a real failure and stops a tiered lookup.
///
/// [`CacheError::Miss`]: crate::error::CacheError::Miss
#[async_trait]
pub trait Tier: Send + Sync {
    /// Short label used in logs.
    fn name(&self) -> &str;

    /// Stores `value` for `ttl`. A non-positive TTL is a successful no-op.
    async fn set(&self, key: &str, value: Vec<u8>, ttl: Duration) -> Result<()>;

    /// Returns the value and its absolute expiration.
    async fn get(&self, key: &str) -> Result<CacheEntry>;

    /// Removes `key` if present. Absent keys are not an error.
    async fn delete(&self, key: &str) -> Result<()>;

    /// Removes every entry held by this tier.
    async fn flush(&self) -> Result<()>;

    /// Returns the prune capability when this tier supports it.
    fn prunable(&self) -> Option<&dyn Prunable> {
        None
    }
}

// == Prunable ==
/// Tiers that can sweep their own expired entries.
#[async_trait]
pub trait Prunable: Send + Sync {
    /// Removes every expired entry and returns how many were removed.
    async fn prune(&self) -> Result<usize>;
}
