//! Prune Task
//!
//! Background task that periodically sweeps expired entries from every tier.

use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::facade::Cache;

/// Shortest accepted interval between two sweeps.
pub const MIN_PRUNE_INTERVAL_SECS: u64 = 1;

/// Spawns a background task that prunes `cache` every `interval_secs`
/// (at least [`MIN_PRUNE_INTERVAL_SECS`]).
///
/// Failures are logged and the loop carries on; the next sweep retries.
/// Abort the returned handle during shutdown.
pub fn spawn_prune_task(cache: Cache, interval_secs: u64) -> JoinHandle<()> {
    if interval_secs < MIN_PRUNE_INTERVAL_SECS {
        warn!(
            "Prune interval {}s raised to {}s",
            interval_secs, MIN_PRUNE_INTERVAL_SECS
        );
    }
    let interval_secs = interval_secs.max(MIN_PRUNE_INTERVAL_SECS);
    let interval = Duration::from_secs(interval_secs);

    tokio::spawn(async move {
        info!(
            "Starting prune task with interval of {} seconds",
            interval_secs
        );

        loop {
            tokio::time::sleep(interval).await;

            match cache.prune().await {
                Ok(0) => debug!("Prune: no expired entries found"),
                Ok(removed) => info!("Prune: removed {} expired entries", removed),
                Err(err) => warn!("Prune failed: {}", err),
            }
        }
    })
}
