//! Configuration Module
//!
//! Handles loading and managing cache configuration from environment variables.

use std::env;
use std::str::FromStr;
use std::time::Duration;

/// How a value found in a slower tier is written back into faster ones.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RefillMode {
    /// Write before returning to the caller
    #[default]
    Sync,
    /// Queue the write on a background worker
    Background,
}

impl FromStr for RefillMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "sync" => Ok(RefillMode::Sync),
            "background" | "async" => Ok(RefillMode::Background),
            _ => Err(format!("Unknown refill mode: {}", s)),
        }
    }
}

/// Cache and server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// TTL in seconds for API writes that do not specify one
    pub default_ttl: u64,
    /// HTTP server port
    pub server_port: u16,
    /// Background prune interval in seconds
    pub prune_interval: u64,
    /// SQLite database file, or `:memory:`
    pub database_path: String,
    /// Upper bound on any single cache operation, in milliseconds
    pub operation_timeout_ms: u64,
    /// Refill strategy after a hit in a slower tier
    pub refill_mode: RefillMode,
    /// Pending background refills before new ones are dropped
    pub refill_queue_size: usize,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `DEFAULT_TTL` - Default TTL in seconds (default: 300)
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `PRUNE_INTERVAL` - Prune frequency in seconds (default: 60)
    /// - `DATABASE_PATH` - SQLite file (default: cache.db)
    /// - `OPERATION_TIMEOUT_MS` - Per-operation deadline (default: 5000)
    /// - `REFILL_MODE` - `sync` or `background` (default: sync)
    /// - `REFILL_QUEUE_SIZE` - Background refill queue length (default: 1024)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            default_ttl: parse_var("DEFAULT_TTL").unwrap_or(defaults.default_ttl),
            server_port: parse_var("SERVER_PORT").unwrap_or(defaults.server_port),
            prune_interval: parse_var("PRUNE_INTERVAL").unwrap_or(defaults.prune_interval),
            database_path: env::var("DATABASE_PATH").unwrap_or(defaults.database_path),
            operation_timeout_ms: parse_var("OPERATION_TIMEOUT_MS")
                .unwrap_or(defaults.operation_timeout_ms),
            refill_mode: parse_var("REFILL_MODE").unwrap_or(defaults.refill_mode),
            refill_queue_size: parse_var("REFILL_QUEUE_SIZE")
                .unwrap_or(defaults.refill_queue_size),
        }
    }

    pub fn operation_timeout(&self) -> Duration {
        Duration::from_millis(self.operation_timeout_ms)
    }
}

fn parse_var<T: FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.parse().ok())
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_ttl: 300,
            server_port: 3000,
            prune_interval: 60,
            database_path: "cache.db".to_string(),
            operation_timeout_ms: 5000,
            refill_mode: RefillMode::Sync,
            refill_queue_size: 1024,
        }
    }
}
