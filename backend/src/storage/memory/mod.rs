//! In-process storage. All repositories share one [`MemoryConnection`].

pub mod auth_gateway;
pub mod cash_register_repository;
pub mod connection;
pub mod enrollment_repository;
pub mod exercise_repository;
pub mod plan_repository;
pub mod student_repository;
// Seeders for unit and integration tests, not part of the documented API
#[doc(hidden)]
pub mod test_utils;
pub mod user_repository;

pub use auth_gateway::MemoryAuthGateway;
pub use cash_register_repository::MemoryCashRegisterRepository;
pub use connection::{hash_secret, MemoryConnection};
pub use enrollment_repository::MemoryEnrollmentRepository;
pub use exercise_repository::MemoryExerciseRepository;
pub use plan_repository::MemoryPlanRepository;
pub use student_repository::MemoryStudentRepository;
pub use user_repository::MemoryUserRepository;
