use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;

use super::connection::{MemoryConnection, Tables};
use crate::domain::commands::enrollment::EnrollmentListQuery;
use crate::domain::models::enrollment::{Enrollment, EnrollmentStatus, NewEnrollment};
use crate::domain::models::generate_id;
use crate::storage::{EnrollmentStorage, StorageError};

#[derive(Clone)]
pub struct MemoryEnrollmentRepository {
    conn: Arc<MemoryConnection>,
}

impl MemoryEnrollmentRepository {
    pub fn new(conn: Arc<MemoryConnection>) -> Self {
        Self { conn }
    }
}

/// Refresh the student and plan names used by list screens
fn denormalise(tables: &Tables, enrollment: &mut Enrollment) {
    if let Some(student) = tables.students.get(&enrollment.student_id) {
        let person = tables.people.get(&student.person.id).unwrap_or(&student.person);
        enrollment.student_name = Some(person.name.clone());
        enrollment.student_document = Some(person.document1.clone());
    }
    if let Some(plan) = tables.plans.get(&enrollment.plan_id) {
        enrollment.plan_name = Some(plan.name.clone());
    }
}

/// Move an enrollment from `from` to `to`, applying `update` on success
fn transition(
    tables: &mut Tables,
    enrollment_id: &str,
    from: EnrollmentStatus,
    to: EnrollmentStatus,
    update: impl FnOnce(&mut Enrollment),
) -> Result<Enrollment> {
    let enrollment = tables
        .enrollments
        .iter_mut()
        .find(|e| e.id == enrollment_id)
        .ok_or_else(|| StorageError::NotFound(format!("enrollment {} not found", enrollment_id)))?;

    if enrollment.status != from {
        return Err(StorageError::InvalidState(format!(
            "enrollment {} is {}, expected {}",
            enrollment_id,
            enrollment.status.as_wire(),
            from.as_wire()
        ))
        .into());
    }
    enrollment.status = to;
    update(enrollment);
    Ok(enrollment.clone())
}

#[async_trait]
impl EnrollmentStorage for MemoryEnrollmentRepository {
    async fn create_enrollment(&self, enrollment: &NewEnrollment) -> Result<Enrollment> {
        let mut tables = self.conn.write().await;
        if !tables.students.contains_key(&enrollment.student_id) {
            return Err(StorageError::NotFound(format!("student {} not found", enrollment.student_id)).into());
        }
        if !tables.plans.contains_key(&enrollment.plan_id) {
            return Err(StorageError::NotFound(format!("plan {} not found", enrollment.plan_id)).into());
        }

        let mut created = Enrollment {
            id: generate_id("matricula"),
            student_id: enrollment.student_id.clone(),
            plan_id: enrollment.plan_id.clone(),
            start_date: enrollment.start_date,
            due_day: enrollment.due_day,
            final_value: enrollment.final_value,
            status: EnrollmentStatus::Active,
            deactivation_reason: None,
            student_name: None,
            student_document: None,
            plan_name: None,
        };
        denormalise(&tables, &mut created);
        tables.enrollments.push(created.clone());
        Ok(created)
    }

    async fn get_enrollment(&self, enrollment_id: &str) -> Result<Option<Enrollment>> {
        let tables = self.conn.read().await;
        Ok(tables.enrollments.iter().find(|e| e.id == enrollment_id).map(|e| {
            let mut e = e.clone();
            denormalise(&tables, &mut e);
            e
        }))
    }

    async fn deactivate_enrollment(&self, enrollment_id: &str, reason: &str) -> Result<Enrollment> {
        let mut tables = self.conn.write().await;
        let reason = reason.to_string();
        transition(
            &mut tables,
            enrollment_id,
            EnrollmentStatus::Active,
            EnrollmentStatus::Inactive,
            |e| e.deactivation_reason = Some(reason),
        )
    }

    async fn reactivate_enrollment(&self, enrollment_id: &str) -> Result<Enrollment> {
        let mut tables = self.conn.write().await;
        transition(
            &mut tables,
            enrollment_id,
            EnrollmentStatus::Inactive,
            EnrollmentStatus::Active,
            |e| e.deactivation_reason = None,
        )
    }

    async fn activate_enrollment(&self, enrollment_id: &str) -> Result<Enrollment> {
        let mut tables = self.conn.write().await;
        transition(
            &mut tables,
            enrollment_id,
            EnrollmentStatus::Pending,
            EnrollmentStatus::Active,
            |_| {},
        )
    }

    async fn delete_enrollment(&self, enrollment_id: &str) -> Result<bool> {
        let mut tables = self.conn.write().await;
        let before = tables.enrollments.len();
        tables.enrollments.retain(|e| e.id != enrollment_id);
        Ok(tables.enrollments.len() < before)
    }

    async fn list_enrollments(&self, query: &EnrollmentListQuery) -> Result<Vec<Enrollment>> {
        let tables = self.conn.read().await;
        let search = query.search.as_deref().unwrap_or_default();
        Ok(tables
            .enrollments
            .iter()
            .filter(|e| {
                query
                    .student_id
                    .as_deref()
                    .map_or(true, |student_id| e.student_id == student_id)
            })
            .map(|e| {
                let mut e = e.clone();
                denormalise(&tables, &mut e);
                e
            })
            .filter(|e| e.matches(search))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::memory::test_utils::{dec, seed_plan, seed_student};
    use chrono::NaiveDate;

    async fn setup() -> (Arc<MemoryConnection>, MemoryEnrollmentRepository, Enrollment) {
        let conn = Arc::new(MemoryConnection::new());
        let student = seed_student(&conn, "Pedro Alves", "555").await;
        let plan = seed_plan(&conn, "Natação", "150.00").await;
        let repo = MemoryEnrollmentRepository::new(conn.clone());
        let enrollment = repo
            .create_enrollment(&NewEnrollment {
                student_id: student.id,
                plan_id: plan.id,
                start_date: NaiveDate::from_ymd_opt(2026, 10, 1).unwrap(),
                due_day: 5,
                final_value: dec("150.00"),
            })
            .await
            .unwrap();
        (conn, repo, enrollment)
    }

    #[tokio::test]
    async fn test_create_denormalises_names() {
        let (_conn, _repo, enrollment) = setup().await;
        assert_eq!(enrollment.status, EnrollmentStatus::Active);
        assert_eq!(enrollment.student_name.as_deref(), Some("Pedro Alves"));
        assert_eq!(enrollment.plan_name.as_deref(), Some("Natação"));
    }

    #[tokio::test]
    async fn test_transitions_check_current_status() {
        let (_conn, repo, enrollment) = setup().await;

        let err = repo.reactivate_enrollment(&enrollment.id).await.unwrap_err();
        assert!(matches!(err.downcast_ref::<StorageError>(), Some(StorageError::InvalidState(_))));

        let inactive = repo.deactivate_enrollment(&enrollment.id, "Mudou de cidade").await.unwrap();
        assert_eq!(inactive.deactivation_reason.as_deref(), Some("Mudou de cidade"));

        let active = repo.reactivate_enrollment(&enrollment.id).await.unwrap();
        assert_eq!(active.status, EnrollmentStatus::Active);
        assert_eq!(active.deactivation_reason, None);
    }

    #[tokio::test]
    async fn test_unknown_student_is_rejected() {
        let (_conn, repo, enrollment) = setup().await;
        let err = repo
            .create_enrollment(&NewEnrollment {
                student_id: "aluno::missing".to_string(),
                plan_id: enrollment.plan_id.clone(),
                start_date: enrollment.start_date,
                due_day: 5,
                final_value: dec("10"),
            })
            .await
            .unwrap_err();
        assert!(matches!(err.downcast_ref::<StorageError>(), Some(StorageError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_list_filters_by_student_and_search() {
        let (conn, repo, enrollment) = setup().await;
        let other = seed_student(&conn, "Júlia Reis", "777").await;
        repo.create_enrollment(&NewEnrollment {
            student_id: other.id.clone(),
            plan_id: enrollment.plan_id.clone(),
            start_date: enrollment.start_date,
            due_day: 10,
            final_value: dec("150.00"),
        })
        .await
        .unwrap();

        let all = repo.list_enrollments(&EnrollmentListQuery::default()).await.unwrap();
        assert_eq!(all.len(), 2);

        let by_student = repo
            .list_enrollments(&EnrollmentListQuery {
                student_id: Some(other.id.clone()),
                search: None,
            })
            .await
            .unwrap();
        assert_eq!(by_student.len(), 1);

        let by_search = repo
            .list_enrollments(&EnrollmentListQuery {
                student_id: None,
                search: Some("pedro".to_string()),
            })
            .await
            .unwrap();
        assert_eq!(by_search.len(), 1);
        assert_eq!(by_search[0].id, enrollment.id);

        assert!(repo.delete_enrollment(&enrollment.id).await.unwrap());
        assert!(!repo.delete_enrollment(&enrollment.id).await.unwrap());
    }
}
