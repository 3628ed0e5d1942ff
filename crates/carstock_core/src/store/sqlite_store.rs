//! Connection bootstrap for the SQLite `cars` table.
//!
//! # Responsibility
//! - Open one short-lived connection per repository operation.
//! - Create the `cars` table before handing a connection out.
//!
//! # Invariants
//! - Schema bootstrap is idempotent (`CREATE TABLE IF NOT EXISTS`).
//! - Returned connections always see the `cars` table.
//! - Returned connections carry `carstock_lower`, the Unicode lowercase used
//!   by text search so both backends fold case alike.

use super::StoreResult;
use log::{debug, error, info};
use rusqlite::functions::FunctionFlags;
use rusqlite::Connection;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// Name of the single relational table.
pub const CARS_TABLE: &str = "cars";

/// SQL function applying `str::to_lowercase`; NULL maps to NULL.
pub const LOWER_FN: &str = "carstock_lower";

const SCHEMA_SQL: &str = include_str!("schema.sql");
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Accessor for one SQLite database file.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    path: PathBuf,
}

impl SqliteStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Opens a connection with the schema in place.
    ///
    /// # Side effects
    /// - Creates the parent directory and database file when missing.
    /// - Emits `db_open` logging events with duration and status.
    pub fn connect(&self) -> StoreResult<Connection> {
        let started_at = Instant::now();

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let conn = match Connection::open(&self.path) {
            Ok(conn) => conn,
            Err(err) => {
                error!(
                    "event=db_open module=store status=error duration_ms={} error_code=db_open_failed error={}",
                    started_at.elapsed().as_millis(),
                    err
                );
                return Err(err.into());
            }
        };

        match bootstrap_connection(&conn) {
            Ok(()) => {
                debug!(
                    "event=db_open module=store status=ok duration_ms={}",
                    started_at.elapsed().as_millis()
                );
                Ok(conn)
            }
            Err(err) => {
                error!(
                    "event=db_open module=store status=error duration_ms={} error_code=db_bootstrap_failed error={}",
                    started_at.elapsed().as_millis(),
                    err
                );
                Err(err)
            }
        }
    }

    /// Creates the table ahead of first use.
    pub fn ensure_schema(&self) -> StoreResult<()> {
        self.connect()?;
        info!(
            "event=db_schema module=store status=ok path={}",
            self.path.display()
        );
        Ok(())
    }
}

fn bootstrap_connection(conn: &Connection) -> StoreResult<()> {
    conn.busy_timeout(BUSY_TIMEOUT)?;
    conn.create_scalar_function(
        LOWER_FN,
        1,
        FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
        |ctx| {
            let value = ctx.get::<Option<String>>(0)?;
            Ok(value.map(|text| text.to_lowercase()))
        },
    )?;
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{SqliteStore, CARS_TABLE, LOWER_FN};

    #[test]
    fn connect_creates_cars_table_idempotently() {
        let dir = tempfile::tempdir().unwrap();
        let store = SqliteStore::new(dir.path().join("db").join("cars.sqlite3"));

        store.ensure_schema().unwrap();
        let conn = store.connect().unwrap();

        let exists: i64 = conn
            .query_row(
                "SELECT EXISTS(
                    SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1
                );",
                [CARS_TABLE],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(exists, 1);
    }

    #[test]
    fn connections_fold_unicode_case() {
        let dir = tempfile::tempdir().unwrap();
        let conn = SqliteStore::new(dir.path().join("cars.sqlite3"))
            .connect()
            .unwrap();

        let lowered: String = conn
            .query_row(&format!("SELECT {LOWER_FN}(?1);"), ["ŠKODA Octavia"], |row| {
                row.get(0)
            })
            .unwrap();
        assert_eq!(lowered, "škoda octavia");

        let null: Option<String> = conn
            .query_row(&format!("SELECT {LOWER_FN}(NULL);"), [], |row| row.get(0))
            .unwrap();
        assert_eq!(null, None);
    }
}
