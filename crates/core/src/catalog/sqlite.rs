//! SQLite-backed catalog store implementation.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use tracing::debug;

use super::{CatalogEntry, CatalogError, CatalogStats, CatalogStore, ThingAttributes};

/// SQLite-backed catalog store.
pub struct SqliteCatalogStore {
    conn: Mutex<Connection>,
}

impl SqliteCatalogStore {
    /// Create a new SQLite store, creating the database file and tables if needed.
    pub fn new(path: &Path) -> Result<Self, CatalogError> {
        let conn = Connection::open(path).map_err(|e| CatalogError::Database(e.to_string()))?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory SQLite store (useful for testing).
    pub fn in_memory() -> Result<Self, CatalogError> {
        let conn =
            Connection::open_in_memory().map_err(|e| CatalogError::Database(e.to_string()))?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn initialize_schema(conn: &Connection) -> Result<(), CatalogError> {
        conn.execute_batch(
            r#"
            -- One row per BGG thing; attributes is a JSON document
            CREATE TABLE IF NOT EXISTS bgg_things (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                attributes TEXT NOT NULL,
                created_at TEXT NOT NULL,
                updated_at_ms INTEGER NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_bgg_things_updated ON bgg_things(updated_at_ms);
            "#,
        )
        .map_err(|e| CatalogError::Database(e.to_string()))?;

        Ok(())
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, CatalogError> {
        self.conn
            .lock()
            .map_err(|_| CatalogError::Internal("catalog connection lock poisoned".to_string()))
    }

    fn millis_to_datetime(ms: i64) -> Result<DateTime<Utc>, CatalogError> {
        DateTime::from_timestamp_millis(ms)
            .ok_or_else(|| CatalogError::Internal(format!("timestamp out of range: {}", ms)))
    }
}

impl CatalogStore for SqliteCatalogStore {
    fn get(&self, id: &str) -> Result<Option<CatalogEntry>, CatalogError> {
        let conn = self.lock()?;

        let row = conn
            .query_row(
                "SELECT id, name, attributes, updated_at_ms FROM bgg_things WHERE id = ?",
                params![id],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, i64>(3)?,
                    ))
                },
            )
            .optional()
            .map_err(|e| CatalogError::Database(e.to_string()))?;

        let Some((id, name, attributes_json, updated_at_ms)) = row else {
            return Ok(None);
        };

        let attributes: ThingAttributes = serde_json::from_str(&attributes_json).map_err(|e| {
            CatalogError::Database(format!("invalid attributes for '{}': {}", id, e))
        })?;

        Ok(Some(CatalogEntry {
            id,
            name,
            attributes,
            last_updated_at: Self::millis_to_datetime(updated_at_ms)?,
        }))
    }

    fn upsert(&self, entry: &CatalogEntry) -> Result<bool, CatalogError> {
        let attributes_json = serde_json::to_string(&entry.attributes)
            .map_err(|e| CatalogError::Internal(e.to_string()))?;
        let conn = self.lock()?;

        // Single statement so concurrent writers on one id cannot interleave.
        let rows_affected = conn
            .execute(
                "INSERT INTO bgg_things (id, name, attributes, created_at, updated_at_ms)
                 VALUES (?1, ?2, ?3, ?4, ?5)
                 ON CONFLICT(id) DO UPDATE SET
                    name = excluded.name,
                    attributes = excluded.attributes,
                    updated_at_ms = excluded.updated_at_ms
                 WHERE excluded.updated_at_ms >= bgg_things.updated_at_ms",
                params![
                    &entry.id,
                    &entry.name,
                    &attributes_json,
                    Utc::now().to_rfc3339(),
                    entry.last_updated_at.timestamp_millis(),
                ],
            )
            .map_err(|e| CatalogError::Database(e.to_string()))?;

        if rows_affected == 0 {
            debug!("Skipped older write for BGG thing {}", entry.id);
        }

        Ok(rows_affected > 0)
    }

    fn remove(&self, id: &str) -> Result<(), CatalogError> {
        let conn = self.lock()?;

        let rows_affected = conn
            .execute("DELETE FROM bgg_things WHERE id = ?", params![id])
            .map_err(|e| CatalogError::Database(e.to_string()))?;

        if rows_affected == 0 {
            return Err(CatalogError::NotFound(id.to_string()));
        }

        Ok(())
    }

    fn stats(&self) -> Result<CatalogStats, CatalogError> {
        let conn = self.lock()?;

        let (total_entries, oldest_ms, newest_ms): (u64, Option<i64>, Option<i64>) = conn
            .query_row(
                "SELECT COUNT(*), MIN(updated_at_ms), MAX(updated_at_ms) FROM bgg_things",
                [],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
            )
            .map_err(|e| CatalogError::Database(e.to_string()))?;

        Ok(CatalogStats {
            total_entries,
            oldest_update: oldest_ms.map(Self::millis_to_datetime).transpose()?,
            newest_update: newest_ms.map(Self::millis_to_datetime).transpose()?,
        })
    }

    fn clear(&self) -> Result<(), CatalogError> {
        let conn = self.lock()?;

        conn.execute("DELETE FROM bgg_things", [])
            .map_err(|e| CatalogError::Database(e.to_string()))?;

        Ok(())
    }
}
