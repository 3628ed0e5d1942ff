//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into use-case level APIs.
//! - Keep the terminal and web shells decoupled from storage details.

pub mod car_service;
