//! SQLite-backed diagram repository.
//!
//! Connections come from an r2d2 pool and every statement runs on the
//! blocking thread pool. Timestamps are stored as integer milliseconds and the
//! architecture, diagram and options documents as JSON text.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::OptionalExtension;
use tracing::debug;

use super::{DiagramRecord, DiagramRepository};
use crate::core::{Error, Result};

/// Column order shared by every SELECT
const COLUMNS: &str = "id, name, description, architecture_json, diagram_json, \
                       output_path, options_json, created_at, updated_at";

type RawRow = (
    String,
    String,
    String,
    String,
    String,
    String,
    String,
    i64,
    i64,
);

pub struct SqliteDiagramRepository {
    pool: Pool<SqliteConnectionManager>,
}

impl SqliteDiagramRepository {
    /// Open (creating if needed) the database at `path`
    pub async fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| Error::filesystem(parent, e))?;
        }

        let pool = Pool::builder()
            .max_lifetime(Some(Duration::from_secs(300)))
            .build(SqliteConnectionManager::file(path))
            .map_err(|e| Error::repository(format!("Failed to create connection pool: {e}")))?;

        let repo = Self { pool };
        repo.init_schema(true).await?;
        debug!(path = %path.display(), "Opened diagram repository");
        Ok(repo)
    }

    /// Private in-memory database, for tests and throwaway runs.
    ///
    /// The pool holds a single connection that is never recycled, since each
    /// SQLite memory connection is its own database.
    pub async fn in_memory() -> Result<Self> {
        let pool = Pool::builder()
            .max_size(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .build(SqliteConnectionManager::memory())
            .map_err(|e| Error::repository(format!("Failed to create connection pool: {e}")))?;

        let repo = Self { pool };
        repo.init_schema(false).await?;
        Ok(repo)
    }

    /// Execute a function with a database connection from the pool
    async fn with_connection<F, R>(&self, f: F) -> Result<R>
    where
        F: FnOnce(&mut rusqlite::Connection) -> rusqlite::Result<R> + Send + 'static,
        R: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut conn = pool
                .get()
                .map_err(|e| Error::repository(format!("Failed to get pooled connection: {e}")))?;
            f(&mut conn).map_err(|e| Error::repository(format!("Database operation failed: {e}")))
        })
        .await
        .map_err(|e| Error::repository(format!("Task execution failed: {e}")))?
    }

    async fn init_schema(&self, wal: bool) -> Result<()> {
        self.with_connection(move |conn| {
            if wal {
                // Not supported for every filesystem; the default journal works too
                conn.pragma_update(None, "journal_mode", "WAL").ok();
            }
            conn.pragma_update(None, "synchronous", "NORMAL")?;

            let tx = conn.transaction()?;
            tx.execute(
                "CREATE TABLE IF NOT EXISTS diagrams (
                    id TEXT PRIMARY KEY,
                    name TEXT NOT NULL UNIQUE,
                    description TEXT NOT NULL,
                    architecture_json TEXT NOT NULL,
                    diagram_json TEXT NOT NULL,
                    output_path TEXT NOT NULL,
                    options_json TEXT NOT NULL,
                    created_at INTEGER NOT NULL,
                    updated_at INTEGER NOT NULL
                )",
                [],
            )?;
            tx.execute(
                "CREATE INDEX IF NOT EXISTS idx_diagrams_created_at ON diagrams(created_at)",
                [],
            )?;
            tx.commit()
        })
        .await
    }
}

#[async_trait]
impl DiagramRepository for SqliteDiagramRepository {
    async fn find_by_name(&self, name: &str) -> Result<Option<DiagramRecord>> {
        let name = name.to_string();
        let row = self
            .with_connection(move |conn| {
                conn.query_row(
                    &format!("SELECT {COLUMNS} FROM diagrams WHERE name = ?1"),
                    rusqlite::params![name],
                    read_row,
                )
                .optional()
            })
            .await?;
        row.map(into_record).transpose()
    }

    async fn save(&self, mut record: DiagramRecord) -> Result<DiagramRecord> {
        let architecture_json = serde_json::to_string(&record.architecture)?;
        let diagram_json = serde_json::to_string(&record.diagram)?;
        let options_json = serde_json::to_string(&record.options)?;
        let updated_at = Utc::now();

        let name = record.name.clone();
        let id = record.id.clone();
        let description = record.description.clone();
        let output_path = record.output_path.clone();
        let created_at = record.created_at.timestamp_millis();
        let updated_millis = updated_at.timestamp_millis();

        let (stored_id, stored_created) = self
            .with_connection(move |conn| {
                let tx = conn.transaction()?;
                let existing: Option<(String, i64)> = tx
                    .query_row(
                        "SELECT id, created_at FROM diagrams WHERE name = ?1",
                        rusqlite::params![name],
                        |row| Ok((row.get(0)?, row.get(1)?)),
                    )
                    .optional()?;

                let kept = match existing {
                    Some((existing_id, existing_created)) => {
                        tx.execute(
                            "UPDATE diagrams SET description = ?1, architecture_json = ?2,
                                diagram_json = ?3, output_path = ?4, options_json = ?5,
                                updated_at = ?6
                             WHERE id = ?7",
                            rusqlite::params![
                                description,
                                architecture_json,
                                diagram_json,
                                output_path,
                                options_json,
                                updated_millis,
                                existing_id,
                            ],
                        )?;
                        (existing_id, existing_created)
                    }
                    None => {
                        tx.execute(
                            &format!(
                                "INSERT INTO diagrams ({COLUMNS})
                                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)"
                            ),
                            rusqlite::params![
                                id,
                                name,
                                description,
                                architecture_json,
                                diagram_json,
                                output_path,
                                options_json,
                                created_at,
                                updated_millis,
                            ],
                        )?;
                        (id, created_at)
                    }
                };
                tx.commit()?;
                Ok(kept)
            })
            .await?;

        record.id = stored_id;
        record.created_at = millis_to_datetime(stored_created)?;
        record.updated_at = millis_to_datetime(updated_millis)?;
        debug!(name = %record.name, id = %record.id, "Saved diagram");
        Ok(record)
    }

    async fn find_recent(&self, limit: usize) -> Result<Vec<DiagramRecord>> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let rows = self
            .with_connection(move |conn| {
                let mut stmt = conn.prepare(&format!(
                    "SELECT {COLUMNS} FROM diagrams ORDER BY created_at DESC, rowid DESC LIMIT ?1"
                ))?;
                let rows = stmt
                    .query_map(rusqlite::params![limit], read_row)?
                    .collect::<rusqlite::Result<Vec<_>>>()?;
                Ok(rows)
            })
            .await?;
        rows.into_iter().map(into_record).collect()
    }

    async fn delete_by_id(&self, id: &str) -> Result<bool> {
        let id = id.to_string();
        let removed = self
            .with_connection(move |conn| {
                conn.execute("DELETE FROM diagrams WHERE id = ?1", rusqlite::params![id])
            })
            .await?;
        Ok(removed > 0)
    }
}

fn read_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawRow> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
        row.get(6)?,
        row.get(7)?,
        row.get(8)?,
    ))
}

fn into_record(row: RawRow) -> Result<DiagramRecord> {
    let (id, name, description, architecture, diagram, output_path, options, created, updated) =
        row;
    Ok(DiagramRecord {
        id,
        name,
        description,
        architecture: serde_json::from_str(&architecture)?,
        diagram: serde_json::from_str(&diagram)?,
        output_path,
        options: serde_json::from_str(&options)?,
        created_at: millis_to_datetime(created)?,
        updated_at: millis_to_datetime(updated)?,
    })
}

fn millis_to_datetime(millis: i64) -> Result<DateTime<Utc>> {
    DateTime::from_timestamp_millis(millis)
        .ok_or_else(|| Error::repository(format!("Invalid timestamp: {millis}")))
}
