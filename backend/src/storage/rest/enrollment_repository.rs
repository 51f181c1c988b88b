use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use serde_json::json;
use shared::{DeactivateEnrollmentRequest, EnrollmentDto};

use super::{deleted, found};
use crate::domain::commands::enrollment::EnrollmentListQuery;
use crate::domain::mappers::EnrollmentMapper;
use crate::domain::models::enrollment::{Enrollment, NewEnrollment};
use crate::io::ApiClient;
use crate::storage::EnrollmentStorage;

#[derive(Clone)]
pub struct RestEnrollmentRepository {
    client: Arc<ApiClient>,
}

impl RestEnrollmentRepository {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }

    async fn transition(&self, enrollment_id: &str, action: &str, body: serde_json::Value) -> Result<Enrollment> {
        let path = format!("/matriculas/{}/{}", enrollment_id, action);
        let dto: EnrollmentDto = self.client.patch_json(&path, &body).await?;
        Ok(EnrollmentMapper::from_dto(dto)?)
    }
}

#[async_trait]
impl EnrollmentStorage for RestEnrollmentRepository {
    async fn create_enrollment(&self, enrollment: &NewEnrollment) -> Result<Enrollment> {
        let request = EnrollmentMapper::create_request(enrollment);
        let dto: EnrollmentDto = self.client.post_json("/matriculas", &request).await?;
        Ok(EnrollmentMapper::from_dto(dto)?)
    }

    async fn get_enrollment(&self, enrollment_id: &str) -> Result<Option<Enrollment>> {
        let path = format!("/matriculas/{}", enrollment_id);
        let dto = found(self.client.get_json::<EnrollmentDto>(&path, &[]).await)?;
        Ok(dto.map(EnrollmentMapper::from_dto).transpose()?)
    }

    async fn deactivate_enrollment(&self, enrollment_id: &str, reason: &str) -> Result<Enrollment> {
        let body = serde_json::to_value(DeactivateEnrollmentRequest {
            reason: reason.to_string(),
        })?;
        self.transition(enrollment_id, "inativar", body).await
    }

    async fn reactivate_enrollment(&self, enrollment_id: &str) -> Result<Enrollment> {
        self.transition(enrollment_id, "reativar", json!({})).await
    }

    async fn activate_enrollment(&self, enrollment_id: &str) -> Result<Enrollment> {
        self.transition(enrollment_id, "ativar", json!({})).await
    }

    async fn delete_enrollment(&self, enrollment_id: &str) -> Result<bool> {
        let path = format!("/matriculas/{}", enrollment_id);
        Ok(deleted(self.client.delete(&path).await)?)
    }

    async fn list_enrollments(&self, query: &EnrollmentListQuery) -> Result<Vec<Enrollment>> {
        let mut params = Vec::new();
        if let Some(student_id) = &query.student_id {
            params.push(("alunoId", student_id.clone()));
        }
        let page = self.client.get_list::<EnrollmentDto>("/matriculas", &params, "matriculas").await?;

        let search = query.search.as_deref().unwrap_or("");
        let mut enrollments = Vec::with_capacity(page.items.len());
        for dto in page.items {
            let enrollment = EnrollmentMapper::from_dto(dto)?;
            if enrollment.matches(search) {
                enrollments.push(enrollment);
            }
        }
        Ok(enrollments)
    }
}
