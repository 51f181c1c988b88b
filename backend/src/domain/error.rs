//! # Domain errors
//!
//! Every service returns [`DomainResult`]. Storage layers keep returning
//! `anyhow::Result`; the conversion below recovers the typed cause from the
//! HTTP layer ([`ApiError`]) or the in-memory store ([`StorageError`]) so the
//! UI can react to it (inline messages, blocking alerts, forced logout).

use std::fmt;

use rust_decimal::Decimal;
use thiserror::Error;

use crate::io::ApiError;
use crate::storage::StorageError;

pub type DomainResult<T> = Result<T, DomainError>;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum DomainError {
    #[error("validation failed: {0}")]
    Validation(ValidationErrors),
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("invalid state: {0}")]
    InvalidState(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("network error: {0}")]
    Network(String),
    #[error("authentication error: {0}")]
    Auth(String),
    #[error("storage error: {0}")]
    Storage(String),
}

impl DomainError {
    /// Shorthand for a validation error on a single field
    pub fn validation(field: impl Into<String>, kind: FieldErrorKind) -> Self {
        DomainError::Validation(ValidationErrors::single(field, kind))
    }

    /// The session is no longer usable and the UI should log out
    pub fn is_auth(&self) -> bool {
        matches!(self, DomainError::Auth(_))
    }

    pub fn validation_errors(&self) -> Option<&ValidationErrors> {
        match self {
            DomainError::Validation(errors) => Some(errors),
            _ => None,
        }
    }
}

impl From<ApiError> for DomainError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::Network(msg) => DomainError::Network(msg),
            ApiError::Unauthorized(msg) | ApiError::Forbidden(msg) => DomainError::Auth(msg),
            ApiError::NotFound(msg) => DomainError::NotFound(msg),
            ApiError::Conflict(msg) => DomainError::Conflict(msg),
            ApiError::UnprocessableEntity(msg) => DomainError::InvalidState(msg),
            ApiError::Server { status, message } => {
                DomainError::Network(format!("server returned {}: {}", status, message))
            }
            ApiError::Decode(msg) => DomainError::Storage(msg),
        }
    }
}

impl From<StorageError> for DomainError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::Conflict(msg) => DomainError::Conflict(msg),
            StorageError::NotFound(msg) => DomainError::NotFound(msg),
            StorageError::InvalidState(msg) => DomainError::InvalidState(msg),
        }
    }
}

impl From<anyhow::Error> for DomainError {
    fn from(err: anyhow::Error) -> Self {
        if let Some(api) = err.downcast_ref::<ApiError>() {
            return DomainError::from(api.clone());
        }
        if let Some(storage) = err.downcast_ref::<StorageError>() {
            return DomainError::from(storage.clone());
        }
        DomainError::Storage(format!("{:#}", err))
    }
}

/// Why a single field was rejected
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FieldErrorKind {
    #[error("is required")]
    Required,
    #[error("must have at least {0} characters")]
    TooShort(usize),
    #[error("must have at most {0} characters")]
    TooLong(usize),
    #[error("must be a number")]
    NotANumber,
    #[error("must be greater than zero")]
    NotPositive,
    #[error("must not be negative")]
    Negative,
    #[error("must be between {min} and {max}")]
    OutOfRange { min: String, max: String },
    #[error("is not a valid {0}")]
    InvalidFormat(&'static str),
    #[error("is required when creating a record")]
    PasswordRequired,
    #[error("does not match")]
    Mismatch,
    #[error("must be later than the entry time")]
    NotAfterEntry,
    #[error("counted {entered} differs from computed {computed}")]
    BalanceMismatch { computed: Decimal, entered: Decimal },
    #[error("must be an image")]
    NotAnImage,
    #[error("must be at most {max_bytes} bytes")]
    FileTooLarge { max_bytes: usize },
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldError {
    /// Dotted path of the offending input, e.g. `schedules[0].exit_time`
    pub field: String,
    pub kind: FieldErrorKind,
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.field, self.kind)
    }
}

/// Ordered collection of field errors. Empty means valid.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidationErrors {
    errors: Vec<FieldError>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(field: impl Into<String>, kind: FieldErrorKind) -> Self {
        let mut errors = Self::new();
        errors.push(field, kind);
        errors
    }

    pub fn push(&mut self, field: impl Into<String>, kind: FieldErrorKind) {
        self.errors.push(FieldError {
            field: field.into(),
            kind,
        });
    }

    pub fn extend(&mut self, other: ValidationErrors) {
        self.errors.extend(other.errors);
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    pub fn has(&self, field: &str) -> bool {
        self.errors.iter().any(|e| e.field == field)
    }

    /// First error reported for `field`
    pub fn kind_of(&self, field: &str) -> Option<&FieldErrorKind> {
        self.errors.iter().find(|e| e.field == field).map(|e| &e.kind)
    }

    pub fn into_result(self) -> DomainResult<()> {
        if self.is_valid() {
            Ok(())
        } else {
            Err(DomainError::Validation(self))
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let messages: Vec<String> = self.errors.iter().map(|e| e.to_string()).collect();
        write!(f, "{}", messages.join("; "))
    }
}
