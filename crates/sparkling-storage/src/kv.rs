// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Key/value store backed by SQLite.
//
// Schema:
//   kv(
//     key        TEXT PRIMARY KEY,
//     value      TEXT NOT NULL,   -- JSON-encoded
//     updated_at TEXT NOT NULL    -- RFC 3339
//   )
//
// Values are arbitrary JSON. Writes are last-write-wins upserts; removal of
// an absent key is a no-op.

use std::path::Path;

use chrono::Utc;
use rusqlite::{Connection, OptionalExtension, params};
use serde_json::Value;
use tracing::{debug, instrument};

use sparkling_core::error::{Result, SparklingError};

/// Convert a `rusqlite::Error` into a `SparklingError::Database`.
fn db_err(e: rusqlite::Error) -> SparklingError {
    SparklingError::Database(e.to_string())
}

const CREATE_TABLE: &str = "CREATE TABLE IF NOT EXISTS kv (
    key        TEXT PRIMARY KEY,
    value      TEXT NOT NULL,
    updated_at TEXT NOT NULL
);";

/// Persistent JSON key/value store for the `storage.*` method family.
pub struct KvStore {
    conn: Connection,
}

impl KvStore {
    /// Open (or create) the store at `path`.
    ///
    /// The `kv` table is created automatically if it does not already exist.
    /// WAL mode is enabled for better concurrent-read performance.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(path).map_err(db_err)?;

        // Enable WAL for concurrent readers.
        conn.execute_batch("PRAGMA journal_mode = WAL;")
            .map_err(db_err)?;
        conn.execute_batch(CREATE_TABLE).map_err(db_err)?;

        debug!("key/value store opened");
        Ok(Self { conn })
    }

    /// Open an in-memory store (useful for tests).
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(db_err)?;
        conn.execute_batch(CREATE_TABLE).map_err(db_err)?;

        debug!("in-memory key/value store opened");
        Ok(Self { conn })
    }

    /// Store `value` under `key`, replacing any earlier value.
    pub fn set(&self, key: &str, value: &Value) -> Result<()> {
        let encoded = serde_json::to_string(value)?;
        let updated_at = Utc::now().to_rfc3339();
        self.conn
            .execute(
                "INSERT INTO kv (key, value, updated_at) VALUES (?1, ?2, ?3)
                 ON CONFLICT(key) DO UPDATE SET
                     value = excluded.value,
                     updated_at = excluded.updated_at",
                params![key, encoded, updated_at],
            )
            .map_err(db_err)?;
        Ok(())
    }

    /// Look up `key`. Returns `None` when nothing is stored under it.
    pub fn get(&self, key: &str) -> Result<Option<Value>> {
        let encoded: Option<String> = self
            .conn
            .query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| {
                row.get(0)
            })
            .optional()
            .map_err(db_err)?;
        match encoded {
            Some(text) => Ok(Some(serde_json::from_str(&text)?)),
            None => Ok(None),
        }
    }

    /// Delete `key`. Removing an absent key is a no-op; returns whether a
    /// row was actually deleted.
    pub fn remove(&self, key: &str) -> Result<bool> {
        let affected = self
            .conn
            .execute("DELETE FROM kv WHERE key = ?1", params![key])
            .map_err(db_err)?;
        Ok(affected > 0)
    }

    /// All stored keys in sorted order.
    pub fn keys(&self) -> Result<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT key FROM kv ORDER BY key ASC")
            .map_err(db_err)?;
        let rows = stmt.query_map([], |row| row.get(0)).map_err(db_err)?;

        let mut keys = Vec::new();
        for row in rows {
            keys.push(row.map_err(db_err)?);
        }
        Ok(keys)
    }

    /// Number of stored keys.
    pub fn len(&self) -> Result<u64> {
        self.conn
            .query_row("SELECT COUNT(*) FROM kv", [], |row| row.get(0))
            .map_err(db_err)
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }
}
