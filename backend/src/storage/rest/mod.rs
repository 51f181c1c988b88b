//! Storage backed by the academia REST backend.
//!
//! Every repository shares one [`ApiClient`], so the bearer token set at
//! login is attached to all of their requests.

pub mod auth_gateway;
pub mod cash_register_repository;
pub mod enrollment_repository;
pub mod exercise_repository;
pub mod plan_repository;
pub mod student_repository;
pub mod user_repository;

pub use auth_gateway::RestAuthGateway;
pub use cash_register_repository::RestCashRegisterRepository;
pub use enrollment_repository::RestEnrollmentRepository;
pub use exercise_repository::RestExerciseRepository;
pub use plan_repository::RestPlanRepository;
pub use student_repository::RestStudentRepository;
pub use user_repository::RestUserRepository;

use crate::io::ApiError;

/// A 404 means "absent" for lookups
pub(crate) fn found<T>(result: Result<T, ApiError>) -> Result<Option<T>, ApiError> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(ApiError::NotFound(_)) => Ok(None),
        Err(e) => Err(e),
    }
}

/// A 404 on delete means there was nothing to delete
pub(crate) fn deleted(result: Result<(), ApiError>) -> Result<bool, ApiError> {
    found(result).map(|r| r.is_some())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_becomes_absent() {
        assert_eq!(found::<u8>(Err(ApiError::NotFound("x".into()))), Ok(None));
        assert_eq!(found(Ok(3)), Ok(Some(3)));
        assert!(found::<u8>(Err(ApiError::Conflict("x".into()))).is_err());
        assert_eq!(deleted(Err(ApiError::NotFound("x".into()))), Ok(false));
        assert_eq!(deleted(Ok(())), Ok(true));
    }
}
