//! SQLite Tier Module
//!
//! Durable tier backed by a single SQLite table. Rows carry their expiration
//! as unix milliseconds.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use rusqlite::{params, OptionalExtension};
use tokio_rusqlite::Connection;
use tracing::{debug, info};

use crate::cache::{expiry_after, CacheEntry, Prunable, Tier, MAX_VALUE_SIZE};
use crate::error::{CacheError, Result};

const PRAGMAS: &str = r#"
PRAGMA journal_mode = WAL;
PRAGMA synchronous = NORMAL;
PRAGMA temp_store = MEMORY;
"#;

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS cache_items (
    key TEXT PRIMARY KEY,
    value BLOB NOT NULL,
    expires_at INTEGER NOT NULL
) WITHOUT ROWID;
CREATE INDEX IF NOT EXISTS idx_cache_items_expires ON cache_items(expires_at);
"#;

/// Maximum rows removed by one DELETE during a prune.
pub const PRUNE_BATCH_SIZE: usize = 500;

// == SQLite Tier ==
pub struct SqliteTier {
    conn: Connection,
}

impl SqliteTier {
    /// Opens (or creates) the database at `path`. `":memory:"` opens a
    /// private in-memory database.
    pub async fn open(path: &str) -> Result<Self> {
        let conn = if path == ":memory:" {
            Connection::open_in_memory().await?
        } else {
            Connection::open(path).await?
        };

        conn.call(|conn| {
            conn.execute_batch(PRAGMAS)?;
            conn.execute_batch(SCHEMA)?;
            Ok(())
        })
        .await?;

        info!(path, "SQLite tier ready");
        Ok(Self { conn })
    }

    pub async fn in_memory() -> Result<Self> {
        Self::open(":memory:").await
    }

    /// Number of stored rows, expired or not.
    pub async fn len(&self) -> Result<usize> {
        let count = self
            .conn
            .call(|conn| {
                let count: i64 =
                    conn.query_row("SELECT COUNT(*) FROM cache_items", [], |row| row.get(0))?;
                Ok(count)
            })
            .await?;
        Ok(count as usize)
    }

    /// Writes a row with an explicit expiration, bypassing TTL validation.
    #[cfg(test)]
    pub(crate) async fn insert_raw(&self, key: &str, value: &[u8], expires_at: DateTime<Utc>) {
        let key = key.to_string();
        let value = value.to_vec();
        self.conn
            .call(move |conn| {
                conn.execute(
                    "INSERT OR REPLACE INTO cache_items (key, value, expires_at) VALUES (?1, ?2, ?3)",
                    params![key, value, expires_at.timestamp_millis()],
                )?;
                Ok(())
            })
            .await
            .unwrap();
    }
}

#[async_trait]
impl Tier for SqliteTier {
    fn name(&self) -> &str {
        "sqlite"
    }

    async fn set(&self, key: &str, value: Vec<u8>, ttl: Duration) -> Result<()> {
        if ttl <= Duration::zero() {
            return Ok(());
        }
        if value.len() >= MAX_VALUE_SIZE {
            return Err(CacheError::TooLarge {
                size: value.len(),
                limit: MAX_VALUE_SIZE,
            });
        }

        let key = key.to_string();
        let expires_at = expiry_after(ttl).timestamp_millis();
        self.conn
            .call(move |conn| {
                conn.execute(
                    "INSERT INTO cache_items (key, value, expires_at) VALUES (?1, ?2, ?3)
                     ON CONFLICT(key) DO UPDATE SET value = excluded.value, expires_at = excluded.expires_at",
                    params![key, value, expires_at],
                )?;
                Ok(())
            })
            .await?;
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<CacheEntry> {
        let owned = key.to_string();
        let row = self
            .conn
            .call(move |conn| {
                let row = conn
                    .query_row(
                        "SELECT value, expires_at FROM cache_items WHERE key = ?1",
                        params![owned],
                        |row| Ok((row.get::<_, Vec<u8>>(0)?, row.get::<_, i64>(1)?)),
                    )
                    .optional()?;
                Ok(row)
            })
            .await?;

        let Some((value, expires_ms)) = row else {
            return Err(CacheError::Miss(key.to_string()));
        };
        let expires_at = DateTime::<Utc>::from_timestamp_millis(expires_ms).ok_or_else(|| {
            CacheError::Backend(format!("invalid expiration {} for key {}", expires_ms, key))
        })?;

        if expires_at <= Utc::now() {
            debug!(key, "sqlite tier: removing expired row on read");
            let owned = key.to_string();
            self.conn
                .call(move |conn| {
                    conn.execute(
                        "DELETE FROM cache_items WHERE key = ?1 AND expires_at = ?2",
                        params![owned, expires_ms],
                    )?;
                    Ok(())
                })
                .await?;
            return Err(CacheError::Miss(key.to_string()));
        }

        Ok(CacheEntry { value, expires_at })
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let key = key.to_string();
        self.conn
            .call(move |conn| {
                conn.execute("DELETE FROM cache_items WHERE key = ?1", params![key])?;
                Ok(())
            })
            .await?;
        Ok(())
    }

    async fn flush(&self) -> Result<()> {
        self.conn
            .call(|conn| {
                conn.execute("DELETE FROM cache_items", [])?;
                Ok(())
            })
            .await?;
        Ok(())
    }

    fn prunable(&self) -> Option<&dyn Prunable> {
        Some(self)
    }
}

#[async_trait]
impl Prunable for SqliteTier {
    async fn prune(&self) -> Result<usize> {
        let now = Utc::now().timestamp_millis();
        let removed = self
            .conn
            .call(move |conn| {
                let mut total = 0usize;
                loop {
                    let n = conn.execute(
                        "DELETE FROM cache_items WHERE key IN (
                             SELECT key FROM cache_items WHERE expires_at <= ?1 LIMIT ?2
                         )",
                        params![now, PRUNE_BATCH_SIZE as i64],
                    )?;
                    total += n;
                    if n < PRUNE_BATCH_SIZE {
                        break;
                    }
                }
                Ok(total)
            })
            .await?;
        Ok(removed)
    }
}
