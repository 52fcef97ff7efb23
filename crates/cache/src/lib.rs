//! Persistent SQLite-backed cache with per-entry TTL.
//!
//! Every external-call wrapper in the system reads through this cache, so the
//! contract is deliberately forgiving: a storage error on read is a miss, a
//! storage error on write is a no-op. Caching is a performance optimization,
//! never a correctness dependency.
//!
//! ## Concurrency
//!
//! Each operation opens its own connection to the backing database, so the
//! cache handle can be shared freely across tasks. Writes use
//! `INSERT OR REPLACE` keyed by the cache key.
//!
//! ## Value families
//!
//! Structured values go through [`SqliteCache::get_json`] /
//! [`SqliteCache::set_json`] and round-trip losslessly. Scalar values go
//! through [`SqliteCache::get_text`] / [`SqliteCache::set_text`] and come back
//! as text - there is no silent coercion back to number or bool.

use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use rusqlite::{Connection, OptionalExtension, params};
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

/// Default expiry for cached upstream responses (24 hours).
pub const DEFAULT_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Errors that can occur against the backing store.
///
/// These never escape the public `get`/`set` surface; they exist so the
/// internal read/write paths can use `?` and log the failure in one place.
#[derive(Error, Debug)]
pub enum CacheError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("value serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
}

type Result<T> = std::result::Result<T, CacheError>;

/// Key-value cache persisted in a single SQLite table.
///
/// Rows are `(key TEXT PRIMARY KEY, value TEXT, expiry INTEGER)`. A read past
/// the expiry deletes the stale row and reports a miss.
pub struct SqliteCache {
    path: PathBuf,
}

impl SqliteCache {
    /// Open (or create) the cache database at `path` and ensure the schema
    /// exists.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let cache = Self {
            path: path.as_ref().to_path_buf(),
        };
        let conn = cache.connection()?;
        conn.execute(
            "CREATE TABLE IF NOT EXISTS cache (
                key TEXT PRIMARY KEY,
                value TEXT,
                expiry INTEGER
            )",
            [],
        )?;
        Ok(cache)
    }

    fn connection(&self) -> rusqlite::Result<Connection> {
        let conn = Connection::open(&self.path)?;
        conn.busy_timeout(Duration::from_secs(2))?;
        Ok(conn)
    }

    fn read(&self, key: &str) -> Result<Option<String>> {
        let conn = self.connection()?;
        let row: Option<(String, i64)> = conn
            .query_row(
                "SELECT value, expiry FROM cache WHERE key = ?1",
                params![key],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;

        match row {
            Some((value, expiry)) if expiry > unix_now() => Ok(Some(value)),
            Some(_) => {
                // Expired: purge opportunistically and report a miss.
                conn.execute("DELETE FROM cache WHERE key = ?1", params![key])?;
                Ok(None)
            }
            None => Ok(None),
        }
    }

    fn write(&self, key: &str, value: &str, ttl: Duration) -> Result<()> {
        let expiry = unix_now() + ttl.as_secs() as i64;
        let conn = self.connection()?;
        conn.execute(
            "INSERT OR REPLACE INTO cache (key, value, expiry) VALUES (?1, ?2, ?3)",
            params![key, value, expiry],
        )?;
        Ok(())
    }

    /// Fetch a structured value. Expired, absent, or unreadable entries are
    /// all a miss.
    pub fn get_json(&self, key: &str) -> Option<Value> {
        match self.read(key) {
            Ok(Some(text)) => serde_json::from_str(&text).ok(),
            Ok(None) => None,
            Err(err) => {
                debug!(key, %err, "cache read failed, treating as miss");
                None
            }
        }
    }

    /// Store a structured value for `ttl`. Failures are logged and dropped.
    pub fn set_json(&self, key: &str, value: &Value, ttl: Duration) {
        let text = match serde_json::to_string(value) {
            Ok(text) => text,
            Err(err) => {
                debug!(key, %err, "cache value not serializable, skipping");
                return;
            }
        };
        if let Err(err) = self.write(key, &text, ttl) {
            debug!(key, %err, "cache write failed, skipping");
        }
    }

    /// Fetch a scalar value stored with [`SqliteCache::set_text`].
    pub fn get_text(&self, key: &str) -> Option<String> {
        match self.read(key) {
            Ok(row) => row,
            Err(err) => {
                debug!(key, %err, "cache read failed, treating as miss");
                None
            }
        }
    }

    /// Store a scalar value as text for `ttl`. Failures are logged and
    /// dropped.
    pub fn set_text(&self, key: &str, value: &str, ttl: Duration) {
        if let Err(err) = self.write(key, value, ttl) {
            debug!(key, %err, "cache write failed, skipping");
        }
    }

    /// Delete every entry whose key starts with `prefix`. Returns the number
    /// of rows removed; on storage failure reports zero.
    pub fn clear_by_prefix(&self, prefix: &str) -> usize {
        let pattern = format!("{prefix}%");
        let result = self
            .connection()
            .and_then(|conn| conn.execute("DELETE FROM cache WHERE key LIKE ?1", params![pattern]));
        match result {
            Ok(deleted) => deleted,
            Err(err) => {
                debug!(prefix, %err, "cache purge failed");
                0
            }
        }
    }
}

fn unix_now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs() as i64)
        .unwrap_or(0)
}
