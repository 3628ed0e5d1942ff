//! Core domain logic for carstock.
//! Car records, the two record stores, and the repository contract shared by
//! the terminal and web shells.

pub mod config;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod store;

pub use config::{AppConfig, ConfigError};
pub use logging::{default_log_level, init_logging, init_logging_from, logging_status};
pub use model::car::{Car, CarFields, CarId, Column, ColumnKind, FieldValue, ValidationError};
pub use repo::{
    open_repository, Backend, CarRepository, CsvCarRepository, DynCarRepository, RepoError,
    RepoResult, SqliteCarRepository,
};
pub use service::car_service::{CarService, ServiceError, ServiceResult};
pub use store::{CsvStore, CsvTable, SqliteStore, StoreError, StoreResult};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
