//! Cache Module
//!
//! Tiers and their combination: an in-process memory tier, a SQLite tier,
//! and the read-through [`TieredCache`] that chains them.

mod entry;
mod memory;
mod sqlite;
mod stats;
mod store;
mod tier;
mod tiered;


// Re-export public types
pub use entry::{expiry_after, CacheEntry};
pub use memory::MemoryTier;
pub use sqlite::{SqliteTier, PRUNE_BATCH_SIZE};
pub use stats::CacheStats;
pub use store::CacheStore;
pub use tier::{Prunable, Tier};
pub use tiered::{SharedTier, TieredCache};
pub(crate) use tiered::write_back;

// == Public Constants ==
/// Maximum allowed key length in bytes
pub const MAX_KEY_LENGTH: usize = 256;

/// Values this size or larger are rejected by the SQLite tier
pub const MAX_VALUE_SIZE: usize = 1024 * 1024; // 1 MiB
