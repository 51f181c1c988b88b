//! # Domain Module
//!
//! Business rules of the academia admin back office, independent of any UI
//! and of the storage behind it.
//!
//! ## Module Organization
//!
//! - **cash_register_service**: the till ledger (open, movements, close, reports)
//! - **student_service**: the multi-part student record, its validation and
//!   the person-then-student save workflow
//! - **enrollment_service**: enrollment lifecycle (active, inactive, pending)
//! - **plan_service**, **user_service**, **exercise_service**: supporting registries
//! - **session**: the logged-in user, permissions, license and login flow
//! - **navigation**: menu catalog, permission filtering and open tabs
//! - **mappers**: conversions between wire DTOs and domain types
//!
//! ## Business Rules
//!
//! - At most one OPEN cash register per operational context
//! - Register balances are always recomputed from the movements
//! - Closed registers never change
//! - A student is saved as a person first; a failed student step deletes it again
//! - Passwords are never read back, only whether one is set

pub mod cash_register_service;
pub mod commands;
pub mod enrollment_service;
pub mod error;
pub mod exercise_service;
pub mod mappers;
pub mod models;
pub mod navigation;
pub mod plan_service;
pub mod session;
pub mod student_service;
pub mod user_service;

pub use cash_register_service::CashRegisterService;
pub use enrollment_service::EnrollmentService;
pub use error::{DomainError, DomainResult, FieldError, FieldErrorKind, ValidationErrors};
pub use exercise_service::ExerciseService;
pub use plan_service::PlanService;
pub use session::{AuthService, SessionContext};
pub use student_service::StudentRecordService;
pub use user_service::UserAdminService;
