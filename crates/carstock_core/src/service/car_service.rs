//! Car use-case service.
//!
//! # Responsibility
//! - Provide the entry points the terminal menu and web front end call.
//! - Enforce create completeness for both backends.
//!
//! # Invariants
//! - Service APIs never bypass the repository contract.
//! - Service layer remains storage-agnostic.

use crate::model::car::{Car, CarFields, CarId, ValidationError};
use crate::repo::{Backend, CarRepository};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Failure surfaced to the shells as a plain message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceError {
    Validation(ValidationError),
    StorageUnavailable,
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::StorageUnavailable => write!(f, "storage is unavailable; see logs for details"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::StorageUnavailable => None,
        }
    }
}

impl From<ValidationError> for ServiceError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

/// Use-case wrapper around one car repository.
pub struct CarService<R: CarRepository> {
    repo: R,
}

impl<R: CarRepository> CarService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub fn repo(&self) -> &R {
        &self.repo
    }

    pub fn backend(&self) -> Backend {
        self.repo.backend()
    }

    /// "index" for CSV, "ID" for SQLite.
    pub fn identifier_label(&self) -> &'static str {
        self.repo.backend().identifier_label()
    }

    /// Creates a car after checking every attribute is present.
    ///
    /// # Errors
    /// - `Validation` when a required attribute is missing.
    /// - `StorageUnavailable` when the repository could not persist.
    pub fn create(&self, fields: &CarFields) -> ServiceResult<Car> {
        fields.require_complete()?;
        self.repo
            .create(fields)
            .ok_or(ServiceError::StorageUnavailable)
    }

    pub fn list(&self) -> Vec<Car> {
        self.repo.get_all()
    }

    pub fn count(&self) -> usize {
        self.repo.get_all().len()
    }

    pub fn get(&self, id: CarId) -> Option<Car> {
        self.repo.get_by_id(id)
    }

    pub fn update(&self, id: CarId, fields: &CarFields) -> Option<Car> {
        self.repo.update(id, fields)
    }

    pub fn delete(&self, id: CarId) -> Option<Car> {
        self.repo.delete(id)
    }

    pub fn search(&self, attribute: &str, value: &str) -> Vec<Car> {
        self.repo.search(attribute, value)
    }

    pub fn search_attributes(&self) -> Vec<String> {
        self.repo.search_attributes()
    }
}
