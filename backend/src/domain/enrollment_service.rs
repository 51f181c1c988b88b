//! Enrollment (matrícula) lifecycle: create, deactivate with a reason,
//! reactivate, confirm a pending one, delete.

use std::sync::Arc;

use log::{debug, info};
use rust_decimal::Decimal;

use crate::domain::commands::enrollment::{CreateEnrollmentCommand, EnrollmentListQuery};
use crate::domain::error::{DomainError, DomainResult, FieldErrorKind, ValidationErrors};
use crate::domain::models::enrollment::{Enrollment, EnrollmentStatus, NewEnrollment};
use crate::storage::EnrollmentStorage;

#[derive(Clone)]
pub struct EnrollmentService {
    storage: Arc<dyn EnrollmentStorage>,
}

impl EnrollmentService {
    pub fn new(storage: Arc<dyn EnrollmentStorage>) -> Self {
        Self { storage }
    }

    pub fn validate(command: &CreateEnrollmentCommand) -> ValidationErrors {
        let mut errors = ValidationErrors::new();
        if command.student_id.trim().is_empty() {
            errors.push("student_id", FieldErrorKind::Required);
        }
        if command.plan_id.trim().is_empty() {
            errors.push("plan_id", FieldErrorKind::Required);
        }
        if !(1..=31).contains(&command.due_day) {
            errors.push(
                "due_day",
                FieldErrorKind::OutOfRange {
                    min: "1".to_string(),
                    max: "31".to_string(),
                },
            );
        }
        if command.final_value < Decimal::ZERO {
            errors.push("final_value", FieldErrorKind::Negative);
        }
        errors
    }

    pub async fn create(&self, command: CreateEnrollmentCommand) -> DomainResult<Enrollment> {
        info!(
            "📝 Enrolling student {} in plan {}",
            command.student_id, command.plan_id
        );
        Self::validate(&command).into_result()?;

        let enrollment = self
            .storage
            .create_enrollment(&NewEnrollment {
                student_id: command.student_id.trim().to_string(),
                plan_id: command.plan_id.trim().to_string(),
                start_date: command.start_date,
                due_day: command.due_day,
                final_value: command.final_value,
            })
            .await?;

        info!("📝 Created enrollment {}", enrollment.id);
        Ok(enrollment)
    }

    pub async fn get(&self, enrollment_id: &str) -> DomainResult<Enrollment> {
        self.storage
            .get_enrollment(enrollment_id)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("enrollment {} not found", enrollment_id)))
    }

    async fn require_status(&self, enrollment_id: &str, expected: EnrollmentStatus) -> DomainResult<Enrollment> {
        let enrollment = self.get(enrollment_id).await?;
        if enrollment.status != expected {
            return Err(DomainError::InvalidState(format!(
                "enrollment {} is {}, expected {}",
                enrollment_id,
                enrollment.status.as_wire(),
                expected.as_wire()
            )));
        }
        Ok(enrollment)
    }

    /// Active → Inactive, keeping the reason
    pub async fn deactivate(&self, enrollment_id: &str, reason: &str) -> DomainResult<Enrollment> {
        let reason = reason.trim();
        if reason.is_empty() {
            return Err(DomainError::validation("reason", FieldErrorKind::Required));
        }
        self.require_status(enrollment_id, EnrollmentStatus::Active).await?;

        let enrollment = self.storage.deactivate_enrollment(enrollment_id, reason).await?;
        info!("📝 Deactivated enrollment {}: {}", enrollment_id, reason);
        Ok(enrollment)
    }

    /// Inactive → Active on the same record
    pub async fn reactivate(&self, enrollment_id: &str) -> DomainResult<Enrollment> {
        self.require_status(enrollment_id, EnrollmentStatus::Inactive).await?;

        let enrollment = self.storage.reactivate_enrollment(enrollment_id).await?;
        info!("📝 Reactivated enrollment {}", enrollment_id);
        Ok(enrollment)
    }

    /// Pending → Active, the confirmation step of the enrollment wizard
    pub async fn activate_pending(&self, enrollment_id: &str) -> DomainResult<Enrollment> {
        self.require_status(enrollment_id, EnrollmentStatus::Pending).await?;

        let enrollment = self.storage.activate_enrollment(enrollment_id).await?;
        info!("📝 Activated pending enrollment {}", enrollment_id);
        Ok(enrollment)
    }

    pub async fn delete(&self, enrollment_id: &str) -> DomainResult<()> {
        if !self.storage.delete_enrollment(enrollment_id).await? {
            return Err(DomainError::NotFound(format!("enrollment {} not found", enrollment_id)));
        }
        info!("📝 Deleted enrollment {}", enrollment_id);
        Ok(())
    }

    pub async fn list(&self, query: &EnrollmentListQuery) -> DomainResult<Vec<Enrollment>> {
        let enrollments = self.storage.list_enrollments(query).await?;
        debug!("Found {} enrollments", enrollments.len());
        Ok(enrollments)
    }
}
