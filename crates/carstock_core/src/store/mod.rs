//! Record stores: raw accessors over one physical medium each.
//!
//! # Responsibility
//! - Load/save whole CSV tables.
//! - Open bootstrapped SQLite connections for the `cars` table.
//!
//! # Invariants
//! - Stores know nothing about the logical `Car` record beyond column names.
//! - Store errors are typed; converting them into empty results is the
//!   repository's job.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod csv_store;
pub mod sqlite_store;

pub use csv_store::{CsvStore, CsvTable};
pub use sqlite_store::{SqliteStore, CARS_TABLE, LOWER_FN};

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug)]
pub enum StoreError {
    Io(std::io::Error),
    Csv(csv::Error),
    Sqlite(rusqlite::Error),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(err) => write!(f, "{err}"),
            Self::Csv(err) => write!(f, "{err}"),
            Self::Sqlite(err) => write!(f, "{err}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Csv(err) => Some(err),
            Self::Sqlite(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for StoreError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<csv::Error> for StoreError {
    fn from(value: csv::Error) -> Self {
        Self::Csv(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}
