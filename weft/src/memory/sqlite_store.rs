//! SQLite-backed Store. Persistent across process restarts.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, OptionalExtension};

use crate::memory::sqlite;
use crate::memory::store::{has_prefix, Item, Namespace, Store, StoreError};

fn storage(e: impl std::fmt::Display) -> StoreError {
    StoreError::Storage(e.to_string())
}

fn parse_ts(s: &str) -> Result<DateTime<Utc>, StoreError> {
    DateTime::parse_from_rfc3339(s)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| StoreError::Serialization(e.to_string()))
}

type Row = (String, String, String, String, String);

fn row_to_item(row: Row) -> Result<Item, StoreError> {
    let (ns, key, value, created_at, updated_at) = row;
    Ok(Item {
        namespace: serde_json::from_str(&ns)?,
        key,
        value: serde_json::from_str(&value)?,
        created_at: parse_ts(&created_at)?,
        updated_at: parse_ts(&updated_at)?,
    })
}

/// SQLite-backed Store. Key: (namespace, key).
///
/// The namespace is stored as a JSON array. `seq` is an autoincrement column
/// assigned on first insert and left alone by upserts, which gives `search`
/// its insertion order.
pub struct SqliteStore {
    db_path: PathBuf,
}

impl SqliteStore {
    /// Opens (or creates) the database file and ensures the table exists.
    pub fn new(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let db_path = path.as_ref().to_path_buf();
        let conn = sqlite::open(&db_path).map_err(storage)?;
        conn.execute(
            r#"
            CREATE TABLE IF NOT EXISTS store (
                seq INTEGER PRIMARY KEY AUTOINCREMENT,
                namespace TEXT NOT NULL,
                key TEXT NOT NULL,
                value TEXT NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                UNIQUE (namespace, key)
            )
            "#,
            [],
        )
        .map_err(storage)?;
        Ok(Self { db_path })
    }
}

#[async_trait]
impl Store for SqliteStore {
    async fn put(
        &self,
        namespace: &Namespace,
        key: &str,
        value: &serde_json::Value,
    ) -> Result<(), StoreError> {
        let ns = serde_json::to_string(namespace)?;
        let value = serde_json::to_string(value)?;
        let key = key.to_string();
        let now = Utc::now().to_rfc3339();
        let db_path = self.db_path.clone();

        tokio::task::spawn_blocking(move || {
            let conn = sqlite::open(&db_path).map_err(storage)?;
            conn.execute(
                r#"
                INSERT INTO store (namespace, key, value, created_at, updated_at)
                VALUES (?1, ?2, ?3, ?4, ?4)
                ON CONFLICT (namespace, key)
                DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at
                "#,
                params![ns, key, value, now],
            )
            .map_err(storage)?;
            Ok::<(), StoreError>(())
        })
        .await
        .map_err(storage)?
    }

    async fn get(&self, namespace: &Namespace, key: &str) -> Result<Option<Item>, StoreError> {
        let ns = serde_json::to_string(namespace)?;
        let key = key.to_string();
        let db_path = self.db_path.clone();

        let row: Option<Row> = tokio::task::spawn_blocking(move || {
            let conn = sqlite::open(&db_path).map_err(storage)?;
            conn.query_row(
                "SELECT namespace, key, value, created_at, updated_at FROM store
                 WHERE namespace = ?1 AND key = ?2",
                params![ns, key],
                |r| -> rusqlite::Result<Row> {
                    Ok((r.get(0)?, r.get(1)?, r.get(2)?, r.get(3)?, r.get(4)?))
                },
            )
            .optional()
            .map_err(storage)
        })
        .await
        .map_err(storage)??;

        row.map(row_to_item).transpose()
    }

    async fn delete(&self, namespace: &Namespace, key: &str) -> Result<(), StoreError> {
        let ns = serde_json::to_string(namespace)?;
        let key = key.to_string();
        let db_path = self.db_path.clone();

        tokio::task::spawn_blocking(move || {
            let conn = sqlite::open(&db_path).map_err(storage)?;
            conn.execute(
                "DELETE FROM store WHERE namespace = ?1 AND key = ?2",
                params![ns, key],
            )
            .map_err(storage)?;
            Ok::<(), StoreError>(())
        })
        .await
        .map_err(storage)?
    }

    async fn search(&self, prefix: &Namespace) -> Result<Vec<Item>, StoreError> {
        let db_path = self.db_path.clone();

        let rows: Vec<Row> = tokio::task::spawn_blocking(move || {
            let conn = sqlite::open(&db_path).map_err(storage)?;
            let mut stmt = conn
                .prepare(
                    "SELECT namespace, key, value, created_at, updated_at FROM store ORDER BY seq",
                )
                .map_err(storage)?;
            let mapped = stmt
                .query_map([], |r| -> rusqlite::Result<Row> {
                    Ok((r.get(0)?, r.get(1)?, r.get(2)?, r.get(3)?, r.get(4)?))
                })
                .map_err(storage)?;
            let mut out = Vec::new();
            for row in mapped {
                out.push(row.map_err(storage)?);
            }
            Ok::<_, StoreError>(out)
        })
        .await
        .map_err(storage)??;

        let mut items = Vec::new();
        for row in rows {
            let item = row_to_item(row)?;
            if has_prefix(&item.namespace, prefix) {
                items.push(item);
            }
        }
        Ok(items)
    }
}
