use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::error::{CatalogError, Result};
use crate::storage::{KeyValueStore, ListEntry, ListKind, UserListStore};

/// SQLite-backed key-value slots and user lists
///
/// Schema:
/// ```sql
/// CREATE TABLE kv (
///     key TEXT PRIMARY KEY,
///     value TEXT NOT NULL,
///     updated_at TEXT NOT NULL
/// );
/// CREATE TABLE favorites (
///     user_id TEXT NOT NULL,
///     game_id INTEGER NOT NULL,
///     created_at TEXT NOT NULL,
///     UNIQUE (user_id, game_id)
/// );
/// -- wishlist: same shape as favorites
/// ```
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Open (or create) the database at `db_path`
    pub async fn new(db_path: &str) -> Result<Self> {
        let conn = Connection::open(db_path)?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS kv (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )",
            [],
        )?;

        for kind in [ListKind::Favorites, ListKind::Wishlist] {
            conn.execute(
                &format!(
                    "CREATE TABLE IF NOT EXISTS {} (
                        user_id TEXT NOT NULL,
                        game_id INTEGER NOT NULL,
                        created_at TEXT NOT NULL,
                        UNIQUE (user_id, game_id)
                    )",
                    kind.table()
                ),
                [],
            )?;

            conn.execute(
                &format!(
                    "CREATE INDEX IF NOT EXISTS idx_{0}_user ON {0}(user_id, created_at)",
                    kind.table()
                ),
                [],
            )?;
        }

        tracing::debug!(db_path, "sqlite store ready");

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| CatalogError::Storage("sqlite connection mutex poisoned".to_string()))
    }
}

/// Fixed-width so that lexical order matches chronological order
fn timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| CatalogError::Storage(format!("corrupt created_at {:?}: {}", raw, e)))
}

#[async_trait]
impl KeyValueStore for SqliteStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let conn = self.lock()?;

        let value = conn
            .query_row("SELECT value FROM kv WHERE key = ?", params![key], |row| {
                row.get::<_, String>(0)
            })
            .optional()?;

        Ok(value)
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        let conn = self.lock()?;

        conn.execute(
            "INSERT OR REPLACE INTO kv (key, value, updated_at) VALUES (?1, ?2, ?3)",
            params![key, value, timestamp(Utc::now())],
        )?;

        Ok(())
    }
}

#[async_trait]
impl UserListStore for SqliteStore {
    async fn add(&self, kind: ListKind, user_id: &str, game_id: u64) -> Result<ListEntry> {
        let conn = self.lock()?;
        let created_at = Utc::now();

        let inserted = conn.execute(
            &format!(
                "INSERT OR IGNORE INTO {} (user_id, game_id, created_at) VALUES (?1, ?2, ?3)",
                kind.table()
            ),
            params![user_id, game_id as i64, timestamp(created_at)],
        )?;

        if inserted == 0 {
            return Err(CatalogError::AlreadyListed {
                list: kind.to_string(),
                game_id,
            });
        }

        Ok(ListEntry {
            user_id: user_id.to_string(),
            game_id,
            kind,
            created_at,
        })
    }

    async fn remove(&self, kind: ListKind, user_id: &str, game_id: u64) -> Result<bool> {
        let conn = self.lock()?;

        let deleted = conn.execute(
            &format!("DELETE FROM {} WHERE user_id = ?1 AND game_id = ?2", kind.table()),
            params![user_id, game_id as i64],
        )?;

        Ok(deleted > 0)
    }

    async fn list(&self, kind: ListKind, user_id: &str) -> Result<Vec<ListEntry>> {
        let conn = self.lock()?;

        let mut stmt = conn.prepare(&format!(
            "SELECT game_id, created_at FROM {}
             WHERE user_id = ?
             ORDER BY created_at DESC, rowid DESC",
            kind.table()
        ))?;

        let rows = stmt
            .query_map(params![user_id], |row| {
                Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?))
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        rows.into_iter()
            .map(|(game_id, created_at)| {
                Ok(ListEntry {
                    user_id: user_id.to_string(),
                    game_id: game_id as u64,
                    kind,
                    created_at: parse_timestamp(&created_at)?,
                })
            })
            .collect()
    }

    async fn contains(&self, kind: ListKind, user_id: &str, game_id: u64) -> Result<bool> {
        let conn = self.lock()?;

        let found: Option<i64> = conn
            .query_row(
                &format!(
                    "SELECT 1 FROM {} WHERE user_id = ?1 AND game_id = ?2",
                    kind.table()
                ),
                params![user_id, game_id as i64],
                |row| row.get(0),
            )
            .optional()?;

        Ok(found.is_some())
    }
}
