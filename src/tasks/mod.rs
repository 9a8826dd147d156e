//! Background Tasks Module
//!
//! # Tasks
//! - Prune: sweeps expired entries from every tier at a fixed interval
//! - Refill: writes values found in slower tiers back into faster ones

mod cleanup;
mod refill;

pub use cleanup::{spawn_prune_task, MIN_PRUNE_INTERVAL_SECS};
pub use refill::{RefillCounters, RefillJob, RefillStats, RefillWorker};
