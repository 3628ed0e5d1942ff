//! Car repository contract and backend selection.
//!
//! # Responsibility
//! - Define one CRUD + search contract implemented per storage backend.
//! - Share search matching rules between backends.
//! - Convert storage failures into empty results plus a logged diagnostic.
//!
//! # Invariants
//! - Storage errors never escape `CarRepository` methods.
//! - Unknown search attributes produce an empty result, not an error.
//! - Integer search input that does not parse produces an empty result.

use crate::config::AppConfig;
use crate::model::car::{parse_integer_text, Car, CarFields, CarId, ColumnKind};
use crate::store::{CsvStore, SqliteStore, StoreError};
use log::{error, info};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

pub mod csv_repo;
pub mod sqlite_repo;

pub use csv_repo::CsvCarRepository;
pub use sqlite_repo::SqliteCarRepository;

pub type RepoResult<T> = Result<T, RepoError>;

/// Failure inside a repository operation before it is degraded.
#[derive(Debug)]
pub enum RepoError {
    Store(StoreError),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Store(err) => write!(f, "storage unavailable: {err}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Store(err) => Some(err),
        }
    }
}

impl From<StoreError> for RepoError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Store(StoreError::Sqlite(value))
    }
}

/// Storage backend behind a repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    Csv,
    Sqlite,
}

impl Backend {
    pub fn as_str(self) -> &'static str {
        match self {
            Backend::Csv => "csv",
            Backend::Sqlite => "sqlite",
        }
    }

    /// How the shells name a record identifier for this backend.
    pub fn identifier_label(self) -> &'static str {
        match self {
            Backend::Csv => "index",
            Backend::Sqlite => "ID",
        }
    }
}

impl Display for Backend {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Backend {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "csv" | "file" => Ok(Backend::Csv),
            "sqlite" | "db" | "sql" => Ok(Backend::Sqlite),
            other => Err(format!("unsupported backend `{other}`; expected csv|sqlite")),
        }
    }
}

/// Uniform CRUD + search contract over one storage backend.
///
/// Identifiers are row positions for CSV and surrogate keys for SQLite.
pub trait CarRepository {
    fn backend(&self) -> Backend;

    /// Appends one record and returns it with its assigned identifier.
    ///
    /// Completeness is not checked here; absent attributes are stored empty.
    fn create(&self, fields: &CarFields) -> Option<Car>;

    /// Returns every record in storage order.
    fn get_all(&self) -> Vec<Car>;

    fn get_by_id(&self, id: CarId) -> Option<Car>;

    /// Overwrites the attributes present in `fields`.
    ///
    /// Empty `fields` returns the current snapshot unchanged.
    fn update(&self, id: CarId, fields: &CarFields) -> Option<Car>;

    /// Removes a record and returns its pre-deletion snapshot.
    fn delete(&self, id: CarId) -> Option<Car>;

    fn search(&self, attribute: &str, value: &str) -> Vec<Car>;

    /// Attribute names `search` accepts for this backend.
    fn search_attributes(&self) -> Vec<String>;
}

impl<R: CarRepository + ?Sized> CarRepository for Box<R> {
    fn backend(&self) -> Backend {
        (**self).backend()
    }

    fn create(&self, fields: &CarFields) -> Option<Car> {
        (**self).create(fields)
    }

    fn get_all(&self) -> Vec<Car> {
        (**self).get_all()
    }

    fn get_by_id(&self, id: CarId) -> Option<Car> {
        (**self).get_by_id(id)
    }

    fn update(&self, id: CarId, fields: &CarFields) -> Option<Car> {
        (**self).update(id, fields)
    }

    fn delete(&self, id: CarId) -> Option<Car> {
        (**self).delete(id)
    }

    fn search(&self, attribute: &str, value: &str) -> Vec<Car> {
        (**self).search(attribute, value)
    }

    fn search_attributes(&self) -> Vec<String> {
        (**self).search_attributes()
    }
}

/// Repository handle selected at startup.
pub type DynCarRepository = Box<dyn CarRepository + Send + Sync>;

/// Builds the repository named by `config.backend`.
///
/// SQLite schema bootstrap failures are logged; later calls degrade to empty
/// results until the database becomes reachable.
pub fn open_repository(config: &AppConfig) -> DynCarRepository {
    match config.backend {
        Backend::Csv => {
            info!(
                "event=repo_open module=repo status=ok backend=csv path={}",
                config.csv_path.display()
            );
            Box::new(CsvCarRepository::new(CsvStore::new(&config.csv_path)))
        }
        Backend::Sqlite => {
            let store = SqliteStore::new(&config.db_path);
            if let Err(err) = store.ensure_schema() {
                error!(
                    "event=repo_open module=repo status=error backend=sqlite error={}",
                    err
                );
            }
            Box::new(SqliteCarRepository::new(store))
        }
    }
}

/// Logs a failed operation and substitutes `fallback`.
pub(crate) fn degrade<T>(backend: Backend, operation: &str, result: RepoResult<T>, fallback: T) -> T {
    match result {
        Ok(value) => value,
        Err(err) => {
            error!(
                "event=repo_{operation} module=repo status=error backend={backend} error={err}"
            );
            fallback
        }
    }
}

/// Search matching policy resolved from a column kind and raw input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum SearchPredicate {
    /// Integer equality.
    Equals(i64),
    /// Case-insensitive substring containment; the needle is lowercased.
    Contains(String),
    /// Exact text equality for columns with no known kind.
    Exact(String),
}

impl SearchPredicate {
    /// Returns `None` when an integer column receives non-numeric input.
    pub(crate) fn new(kind: Option<ColumnKind>, value: &str) -> Option<Self> {
        match kind {
            Some(ColumnKind::Integer) => parse_integer_text(value).map(Self::Equals),
            Some(ColumnKind::Text) => Some(Self::Contains(value.to_lowercase())),
            None => Some(Self::Exact(value.to_string())),
        }
    }

    pub(crate) fn matches(&self, cell: &str) -> bool {
        match self {
            Self::Equals(expected) => parse_integer_text(cell) == Some(*expected),
            Self::Contains(needle) => cell.to_lowercase().contains(needle.as_str()),
            Self::Exact(expected) => cell == expected,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Backend, SearchPredicate};
    use crate::model::car::ColumnKind;

    #[test]
    fn backend_parses_aliases() {
        assert_eq!("CSV".parse::<Backend>(), Ok(Backend::Csv));
        assert_eq!(" sqlite ".parse::<Backend>(), Ok(Backend::Sqlite));
        assert!("mongo".parse::<Backend>().is_err());
        assert_eq!(Backend::Csv.identifier_label(), "index");
    }

    #[test]
    fn text_predicate_is_case_insensitive_substring() {
        let predicate = SearchPredicate::new(Some(ColumnKind::Text), "SWIFT").unwrap();
        assert!(predicate.matches("Maruti Swift Dzire VDI"));
        assert!(!predicate.matches("Hyundai Verna"));
    }

    #[test]
    fn integer_predicate_rejects_non_numeric_input() {
        assert_eq!(SearchPredicate::new(Some(ColumnKind::Integer), "abc"), None);
        let predicate = SearchPredicate::new(Some(ColumnKind::Integer), "2017").unwrap();
        assert!(predicate.matches("2017"));
        assert!(predicate.matches("2017.0"));
        assert!(!predicate.matches("20171"));
    }

    #[test]
    fn unknown_kind_falls_back_to_exact_match() {
        let predicate = SearchPredicate::new(None, "Red").unwrap();
        assert!(predicate.matches("Red"));
        assert!(!predicate.matches("red"));
    }
}
