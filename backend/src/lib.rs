//! # Academia Manager Backend
//!
//! UI-agnostic core of the academia admin back office. A front-end creates a
//! [`Backend`], logs in through [`Backend::auth`] and drives the services
//! with the resulting [`domain::SessionContext`].
//!
//! Two storage flavours are available:
//! - [`Backend::rest`] talks to the academia REST backend
//! - [`Backend::in_memory`] keeps everything in process (tests, offline demos)

use std::sync::Arc;

use anyhow::Result;
use log::info;

pub mod config;
pub mod domain;
pub mod io;
pub mod logging;
pub mod storage;

pub use config::AppConfig;
pub use io::ApiClient;
pub use storage::memory::MemoryConnection;

use domain::{
    AuthService, CashRegisterService, EnrollmentService, ExerciseService, PlanService, StudentRecordService,
    UserAdminService,
};
use storage::memory::{
    MemoryAuthGateway, MemoryCashRegisterRepository, MemoryEnrollmentRepository, MemoryExerciseRepository,
    MemoryPlanRepository, MemoryStudentRepository, MemoryUserRepository,
};
use storage::rest::{
    RestAuthGateway, RestCashRegisterRepository, RestEnrollmentRepository, RestExerciseRepository,
    RestPlanRepository, RestStudentRepository, RestUserRepository,
};

/// Main backend struct that wires every service over one storage
pub struct Backend {
    pub config: AppConfig,
    pub auth: AuthService,
    pub cash_register: CashRegisterService,
    pub students: StudentRecordService,
    pub enrollments: EnrollmentService,
    pub plans: PlanService,
    pub users: UserAdminService,
    pub exercises: ExerciseService,
}

impl Backend {
    /// Backend over the REST API described by `config.api`
    pub fn rest(config: AppConfig) -> Result<Self> {
        config.validate()?;
        let client = Arc::new(ApiClient::new(&config.api)?);
        info!("⚙️ Using REST backend at {}", client.base_url());

        Ok(Self {
            auth: AuthService::new(Arc::new(RestAuthGateway::new(client.clone()))),
            cash_register: CashRegisterService::new(
                Arc::new(RestCashRegisterRepository::new(client.clone())),
                config.cash_register.clone(),
            ),
            students: StudentRecordService::new(Arc::new(RestStudentRepository::new(client.clone()))),
            enrollments: EnrollmentService::new(Arc::new(RestEnrollmentRepository::new(client.clone()))),
            plans: PlanService::new(Arc::new(RestPlanRepository::new(client.clone()))),
            users: UserAdminService::new(Arc::new(RestUserRepository::new(client.clone()))),
            exercises: ExerciseService::new(Arc::new(RestExerciseRepository::new(client))),
            config,
        })
    }

    /// In-process backend with default settings and empty tables
    pub fn in_memory() -> Self {
        Self::with_memory(AppConfig::default(), Arc::new(MemoryConnection::new()))
    }

    /// In-process backend over an existing connection, so callers can seed it
    pub fn with_memory(config: AppConfig, conn: Arc<MemoryConnection>) -> Self {
        info!("⚙️ Using in-memory storage");
        Self {
            auth: AuthService::new(Arc::new(MemoryAuthGateway::new(conn.clone()))),
            cash_register: CashRegisterService::new(
                Arc::new(MemoryCashRegisterRepository::new(conn.clone())),
                config.cash_register.clone(),
            ),
            students: StudentRecordService::new(Arc::new(MemoryStudentRepository::new(conn.clone()))),
            enrollments: EnrollmentService::new(Arc::new(MemoryEnrollmentRepository::new(conn.clone()))),
            plans: PlanService::new(Arc::new(MemoryPlanRepository::new(conn.clone()))),
            users: UserAdminService::new(Arc::new(MemoryUserRepository::new(conn.clone()))),
            exercises: ExerciseService::new(Arc::new(MemoryExerciseRepository::new(conn))),
            config,
        }
    }

    /// Operational context of the cash register ledger
    pub fn location(&self) -> &str {
        &self.config.location
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rest_backend_rejects_invalid_config() {
        let mut config = AppConfig::default();
        config.api.base_url.clear();
        assert!(Backend::rest(config).is_err());
    }

    #[test]
    fn test_rest_backend_builds_with_defaults() {
        let backend = Backend::rest(AppConfig::default()).unwrap();
        assert_eq!(backend.location(), "principal");
    }
}
