//! Logical record shape shared by all backends.
//!
//! # Responsibility
//! - Define the `Car` record and its column allow-list.
//! - Keep a single record shape regardless of storage medium.
//!
//! # Invariants
//! - Identifiers are assigned by storage, never by callers.

pub mod car;
