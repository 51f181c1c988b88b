//! # Storage Module
//!
//! Persistence behind the domain services. The services only see the traits
//! in [`traits`]; two implementations exist:
//!
//! - [`memory`]: in-process tables, used by tests and offline mode
//! - [`rest`]: the academia REST backend, reached through [`crate::io::ApiClient`]

pub mod memory;
pub mod rest;
pub mod traits;

pub use traits::*;

use thiserror::Error;

/// Typed failures raised by storage implementations that enforce rules
/// locally. Carried inside `anyhow::Error` and recovered by `DomainError`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorageError {
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    InvalidState(String),
}
