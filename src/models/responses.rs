//! Response DTOs for the cache API
//!
//! Defines the structure of outgoing HTTP response bodies.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::cache::CacheStats;
use crate::models::ValueEncoding;
use crate::tasks::RefillCounters;

/// Response body for the GET operation (GET /get/:key)
#[derive(Debug, Clone, Serialize)]
pub struct GetResponse {
    pub key: String,
    /// Stored bytes: text when they are valid UTF-8, base64 otherwise
    pub value: String,
    pub encoding: ValueEncoding,
    pub expires_at: DateTime<Utc>,
}

impl GetResponse {
    pub fn new(key: impl Into<String>, value: &[u8], expires_at: DateTime<Utc>) -> Self {
        let (encoding, value) = ValueEncoding::encode(value);
        Self {
            key: key.into(),
            value,
            encoding,
            expires_at,
        }
    }
}

/// Response body for the SET operation (PUT /set)
#[derive(Debug, Clone, Serialize)]
pub struct SetResponse {
    /// Success message
    pub message: String,
    /// The key that was set
    pub key: String,
    /// TTL applied, in seconds
    pub ttl: u64,
}

impl SetResponse {
    pub fn new(key: impl Into<String>, ttl: u64) -> Self {
        let key = key.into();
        Self {
            message: format!("Key '{}' set successfully", key),
            key,
            ttl,
        }
    }
}

/// Response body for the DELETE operation (DELETE /del/:key)
#[derive(Debug, Clone, Serialize)]
pub struct DeleteResponse {
    pub message: String,
    pub key: String,
}

impl DeleteResponse {
    pub fn new(key: impl Into<String>) -> Self {
        let key = key.into();
        Self {
            message: format!("Key '{}' deleted successfully", key),
            key,
        }
    }
}

/// Response body for POST /prune
#[derive(Debug, Clone, Serialize)]
pub struct PruneResponse {
    /// Expired entries removed across all tiers
    pub removed: usize,
}

/// Response body for POST /flush
#[derive(Debug, Clone, Serialize)]
pub struct FlushResponse {
    pub message: String,
}

impl FlushResponse {
    pub fn flushed() -> Self {
        Self {
            message: "All tiers flushed".to_string(),
        }
    }
}

/// Response body for the stats endpoint (GET /stats)
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    /// Memory tier hits
    pub hits: u64,
    /// Memory tier misses
    pub misses: u64,
    /// Entries dropped from memory after expiring
    pub expired: u64,
    /// Entries currently held in memory
    pub total_entries: usize,
    /// Hit rate (hits / (hits + misses))
    pub hit_rate: f64,
    /// Refill outcomes
    pub refill: RefillCounters,
}

impl StatsResponse {
    pub fn new(memory: CacheStats, refill: RefillCounters) -> Self {
        Self {
            hits: memory.hits,
            misses: memory.misses,
            expired: memory.expired,
            total_entries: memory.total_entries,
            hit_rate: memory.hit_rate(),
            refill,
        }
    }
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: Utc::now().to_rfc3339(),
        }
    }
}

/// Error response body for all error conditions
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}
