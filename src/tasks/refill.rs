//! Refill Worker
//!
//! Background task that copies values found in slower tiers back into the
//! faster ones without making the reader wait.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::cache::{write_back, SharedTier};

/// A refill waiting to be written.
///
/// The value is read again from `source` when the job runs, so a key deleted
/// or rewritten after the lookup is not resurrected with stale data.
pub struct RefillJob {
    pub key: String,
    /// Tier the lookup hit.
    pub source: SharedTier,
    /// Tiers faster than `source`, fastest first.
    pub tiers: Vec<SharedTier>,
}

// == Refill Stats ==
/// Outcome counters shared between the cache and its worker.
#[derive(Debug, Default)]
pub struct RefillStats {
    completed: AtomicU64,
    failed: AtomicU64,
    dropped: AtomicU64,
    skipped: AtomicU64,
}

impl RefillStats {
    pub fn record_completed(&self) {
        self.completed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_failed(&self) {
        self.failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_dropped(&self) {
        self.dropped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_skipped(&self) {
        self.skipped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> RefillCounters {
        RefillCounters {
            completed: self.completed.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            dropped: self.dropped.load(Ordering::Relaxed),
            skipped: self.skipped.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time copy of [`RefillStats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RefillCounters {
    /// Refills written to every faster tier
    pub completed: u64,
    /// Refills that hit a tier error
    pub failed: u64,
    /// Refills discarded because the queue was full or the worker had stopped
    pub dropped: u64,
    /// Refills abandoned because the key had left the source tier
    pub skipped: u64,
}

// == Refill Worker ==
/// Bounded queue plus the task draining it.
pub struct RefillWorker {
    tx: mpsc::Sender<RefillJob>,
    stats: Arc<RefillStats>,
    handle: JoinHandle<()>,
}

impl RefillWorker {
    /// Spawns the worker task. It exits once every sender is dropped and the
    /// queue is drained.
    pub fn spawn(queue_size: usize, stats: Arc<RefillStats>) -> Self {
        let (tx, mut rx) = mpsc::channel::<RefillJob>(queue_size.max(1));
        let worker_stats = stats.clone();

        let handle = tokio::spawn(async move {
            info!("Refill worker started with queue size {}", queue_size);

            while let Some(job) = rx.recv().await {
                let entry = match job.source.get(&job.key).await {
                    Ok(entry) => entry,
                    Err(err) if err.is_miss() => {
                        debug!(key = %job.key, "refill skipped, key no longer in source tier");
                        worker_stats.record_skipped();
                        continue;
                    }
                    Err(err) => {
                        warn!(key = %job.key, error = %err, "refill source lookup failed");
                        worker_stats.record_failed();
                        continue;
                    }
                };
                match write_back(&job.tiers, &job.key, &entry).await {
                    Ok(()) => {
                        debug!(key = %job.key, "background refill written");
                        worker_stats.record_completed();
                    }
                    Err(err) => {
                        warn!(key = %job.key, error = %err, "background refill failed");
                        worker_stats.record_failed();
                    }
                }
            }

            debug!("Refill worker stopped");
        });

        Self { tx, stats, handle }
    }

    /// Queues a refill without waiting. A full queue drops the job.
    pub fn dispatch(&self, job: RefillJob) {
        if let Err(err) = self.tx.try_send(job) {
            let key = match &err {
                mpsc::error::TrySendError::Full(job) | mpsc::error::TrySendError::Closed(job) => {
                    job.key.clone()
                }
            };
            warn!(key = %key, "refill dropped: {}", err);
            self.stats.record_dropped();
        }
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}
