//! # Storage Traits
//!
//! This module defines the storage abstraction traits that allow different
//! storage backends to be used interchangeably in the domain layer.

use anyhow::Result;
use async_trait::async_trait;
use shared::ListPage;

use crate::domain::commands::enrollment::EnrollmentListQuery;
use crate::domain::commands::student::StudentListQuery;
use crate::domain::models::cash_register::{
    CashRegister, Movement, NewCashRegister, NewMovement, RegisterClosing,
};
use crate::domain::models::enrollment::{Enrollment, NewEnrollment};
use crate::domain::models::exercise::{Exercise, ExerciseDraft, ImageUpload};
use crate::domain::models::plan::{Plan, PlanPayload};
use crate::domain::models::student::{Person, PersonPayload, StudentRecord, StudentSavePayload};
use crate::domain::models::user::{SystemUser, UserPayload};
use crate::domain::session::SessionUser;

/// Trait defining the interface for cash register storage operations
#[async_trait]
pub trait CashRegisterStorage: Send + Sync {
    /// The register currently open in `context`, if any
    async fn get_open_register(&self, context: &str) -> Result<Option<CashRegister>>;

    /// Highest register number ever issued for `context`
    async fn last_register_number(&self, context: &str) -> Result<Option<u32>>;

    /// Create a register in the OPEN state
    async fn open_register(&self, register: &NewCashRegister) -> Result<CashRegister>;

    async fn get_register(&self, register_id: &str) -> Result<Option<CashRegister>>;

    /// Append a movement to an open register
    async fn append_movement(&self, register_id: &str, movement: &NewMovement) -> Result<Movement>;

    /// Freeze the register as CLOSED with the counted balance
    async fn close_register(&self, register_id: &str, closing: &RegisterClosing) -> Result<CashRegister>;

    /// Registers of `context`, most recently opened first
    async fn list_registers(&self, context: &str, limit: usize) -> Result<Vec<CashRegister>>;
}

/// Trait defining the interface for student record storage operations.
///
/// A student is stored as two resources: the person (identity, addresses,
/// contacts) and the student record that references it.
#[async_trait]
pub trait StudentStorage: Send + Sync {
    async fn create_person(&self, person: &PersonPayload) -> Result<Person>;

    async fn update_person(&self, person_id: &str, person: &PersonPayload) -> Result<Person>;

    /// Returns true if the person was found and deleted
    async fn delete_person(&self, person_id: &str) -> Result<bool>;

    /// Look up a person by primary document within the tenant
    async fn find_person_by_document(&self, document1: &str) -> Result<Option<Person>>;

    async fn create_student(&self, person_id: &str, student: &StudentSavePayload) -> Result<StudentRecord>;

    async fn update_student(&self, student_id: &str, student: &StudentSavePayload) -> Result<StudentRecord>;

    /// Delete the student and its owned sub-entities.
    /// Returns true if the student was found and deleted.
    async fn delete_student(&self, student_id: &str) -> Result<bool>;

    async fn get_student(&self, student_id: &str) -> Result<Option<StudentRecord>>;

    async fn list_students(&self, query: &StudentListQuery) -> Result<ListPage<StudentRecord>>;
}

/// Trait defining the interface for enrollment storage operations
#[async_trait]
pub trait EnrollmentStorage: Send + Sync {
    async fn create_enrollment(&self, enrollment: &NewEnrollment) -> Result<Enrollment>;

    async fn get_enrollment(&self, enrollment_id: &str) -> Result<Option<Enrollment>>;

    async fn deactivate_enrollment(&self, enrollment_id: &str, reason: &str) -> Result<Enrollment>;

    async fn reactivate_enrollment(&self, enrollment_id: &str) -> Result<Enrollment>;

    /// Move a pending enrollment to active
    async fn activate_enrollment(&self, enrollment_id: &str) -> Result<Enrollment>;

    /// Returns true if the enrollment was found and deleted
    async fn delete_enrollment(&self, enrollment_id: &str) -> Result<bool>;

    async fn list_enrollments(&self, query: &EnrollmentListQuery) -> Result<Vec<Enrollment>>;
}

/// Trait defining the interface for plan storage operations
#[async_trait]
pub trait PlanStorage: Send + Sync {
    async fn create_plan(&self, plan: &PlanPayload) -> Result<Plan>;

    async fn update_plan(&self, plan_id: &str, plan: &PlanPayload) -> Result<Plan>;

    async fn get_plan(&self, plan_id: &str) -> Result<Option<Plan>>;

    /// All plans ordered by name
    async fn list_plans(&self) -> Result<Vec<Plan>>;
}

/// Trait defining the interface for system user storage operations
#[async_trait]
pub trait UserStorage: Send + Sync {
    async fn create_user(&self, user: &UserPayload) -> Result<SystemUser>;

    async fn update_user(&self, user_id: &str, user: &UserPayload) -> Result<SystemUser>;

    async fn delete_user(&self, user_id: &str) -> Result<bool>;

    async fn get_user(&self, user_id: &str) -> Result<Option<SystemUser>>;

    async fn list_users(&self) -> Result<Vec<SystemUser>>;
}

/// Trait defining the interface for exercise storage operations
#[async_trait]
pub trait ExerciseStorage: Send + Sync {
    async fn create_exercise(&self, exercise: &ExerciseDraft) -> Result<Exercise>;

    async fn update_exercise(&self, exercise_id: &str, exercise: &ExerciseDraft) -> Result<Exercise>;

    async fn delete_exercise(&self, exercise_id: &str) -> Result<bool>;

    async fn get_exercise(&self, exercise_id: &str) -> Result<Option<Exercise>>;

    async fn list_exercises(&self) -> Result<Vec<Exercise>>;

    /// Store the image and return its public URL
    async fn upload_image(&self, exercise_id: &str, image: &ImageUpload) -> Result<String>;
}

/// Trait defining the authentication backend
#[async_trait]
pub trait AuthGateway: Send + Sync {
    /// `None` when the credentials are rejected
    async fn login(&self, username: &str, password: &str) -> Result<Option<SessionUser>>;

    /// Whether the backend still accepts the session
    async fn validate(&self, user: &SessionUser) -> Result<bool>;

    async fn logout(&self) -> Result<()>;
}
