//! Seeding helpers shared by unit and integration tests.
//!
//! Each helper writes through the memory repositories so seeded data goes
//! through the same code paths as data created by the services.

use std::sync::Arc;

use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::{MemoryConnection, MemoryPlanRepository, MemoryStudentRepository, MemoryUserRepository};
use crate::domain::models::enrollment::{Enrollment, EnrollmentStatus};
use crate::domain::models::generate_id;
use crate::domain::models::plan::{Periodicity, Plan, PlanPayload};
use crate::domain::models::student::{CredentialChange, PersonPayload, StudentRecord, StudentSavePayload};
use crate::domain::models::user::{Role, SystemUser, UserPayload};
use crate::domain::models::RecordStatus;
use crate::storage::{PlanStorage, StudentStorage, UserStorage};

/// Parse a decimal literal; panics on bad input
pub fn dec(value: &str) -> Decimal {
    value.parse().expect("valid decimal literal")
}

pub async fn seed_user(conn: &Arc<MemoryConnection>, username: &str, password: &str, role: Role) -> SystemUser {
    MemoryUserRepository::new(conn.clone())
        .create_user(&UserPayload {
            company_id: "empresa::teste".to_string(),
            username: username.to_string(),
            name: username.to_string(),
            email: format!("{}@academia.test", username),
            role,
            permissions: Vec::new(),
            phone: String::new(),
            status: RecordStatus::Active,
            password: Some(password.to_string()),
        })
        .await
        .expect("seed user")
}

pub async fn seed_plan(conn: &Arc<MemoryConnection>, name: &str, fee: &str) -> Plan {
    MemoryPlanRepository::new(conn.clone())
        .create_plan(&PlanPayload {
            code: generate_id("PL"),
            name: name.to_string(),
            periodicity: Periodicity::Monthly,
            months: None,
            days: None,
            monthly_fee: dec(fee),
            description: None,
            status: RecordStatus::Active,
        })
        .await
        .expect("seed plan")
}

/// A student with a password set
pub async fn seed_student(conn: &Arc<MemoryConnection>, name: &str, document1: &str) -> StudentRecord {
    let repo = MemoryStudentRepository::new(conn.clone());
    let person = repo
        .create_person(&PersonPayload {
            name: name.to_string(),
            document1: document1.to_string(),
            ..Default::default()
        })
        .await
        .expect("seed person");
    repo.create_student(
        &person.id,
        &StudentSavePayload {
            person: PersonPayload::default(),
            medical_exam_valid_until: None,
            assessment_valid_until: None,
            goal: String::new(),
            profession: String::new(),
            employer: String::new(),
            schedules: Vec::new(),
            credential: CredentialChange::Replace("1234".to_string()),
            fingerprint1: None,
            fingerprint2: None,
            physical_assessment: None,
        },
    )
    .await
    .expect("seed student")
}

/// Insert an enrollment directly with any status, e.g. a pending one
pub async fn seed_enrollment(
    conn: &Arc<MemoryConnection>,
    student: &StudentRecord,
    plan: &Plan,
    status: EnrollmentStatus,
) -> Enrollment {
    let enrollment = Enrollment {
        id: generate_id("matricula"),
        student_id: student.id.clone(),
        plan_id: plan.id.clone(),
        start_date: NaiveDate::from_ymd_opt(2026, 10, 1).expect("valid date"),
        due_day: 10,
        final_value: plan.monthly_fee,
        status,
        deactivation_reason: None,
        student_name: Some(student.person.name.clone()),
        student_document: Some(student.person.document1.clone()),
        plan_name: Some(plan.name.clone()),
    };
    conn.write().await.enrollments.push(enrollment.clone());
    enrollment
}
