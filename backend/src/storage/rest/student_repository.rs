use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use log::debug;
use shared::{ListPage, PersonDto, StudentDto};

use super::{deleted, found};
use crate::domain::commands::student::StudentListQuery;
use crate::domain::mappers::StudentMapper;
use crate::domain::models::student::{Person, PersonPayload, StudentRecord, StudentSavePayload};
use crate::io::ApiClient;
use crate::storage::StudentStorage;

/// Students live in two resources: `/pessoas` and `/alunos`
#[derive(Clone)]
pub struct RestStudentRepository {
    client: Arc<ApiClient>,
}

impl RestStudentRepository {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }

    async fn load_person(&self, person_id: &str) -> Result<Option<Person>> {
        let path = format!("/pessoas/{}", person_id);
        let dto = found(self.client.get_json::<PersonDto>(&path, &[]).await)?;
        Ok(dto.map(StudentMapper::person_from_dto).transpose()?)
    }

    /// Decode a student, fetching its person when the response does not embed it
    async fn to_record(&self, dto: StudentDto) -> Result<StudentRecord> {
        let fallback = match dto.person {
            Some(_) => None,
            None => self.load_person(&dto.person_id).await?,
        };
        Ok(StudentMapper::student_from_dto(dto, fallback)?)
    }
}

#[async_trait]
impl StudentStorage for RestStudentRepository {
    async fn create_person(&self, person: &PersonPayload) -> Result<Person> {
        let dto: PersonDto = self.client.post_json("/pessoas", &StudentMapper::person_to_dto(person)).await?;
        Ok(StudentMapper::person_from_dto(dto)?)
    }

    async fn update_person(&self, person_id: &str, person: &PersonPayload) -> Result<Person> {
        let path = format!("/pessoas/{}", person_id);
        let mut dto: PersonDto = self.client.put_json(&path, &StudentMapper::person_to_dto(person)).await?;
        dto.id.get_or_insert_with(|| person_id.to_string());
        Ok(StudentMapper::person_from_dto(dto)?)
    }

    async fn delete_person(&self, person_id: &str) -> Result<bool> {
        let path = format!("/pessoas/{}", person_id);
        Ok(deleted(self.client.delete(&path).await)?)
    }

    async fn find_person_by_document(&self, document1: &str) -> Result<Option<Person>> {
        let document1 = document1.trim();
        let query = [("doc1", document1.to_string())];
        let page = self.client.get_list::<PersonDto>("/pessoas", &query, "pessoas").await?;
        let person = page
            .items
            .into_iter()
            .find(|p| p.document1.trim() == document1)
            .map(StudentMapper::person_from_dto)
            .transpose()?;
        Ok(person)
    }

    async fn create_student(&self, person_id: &str, student: &StudentSavePayload) -> Result<StudentRecord> {
        let payload = StudentMapper::student_payload(person_id, student);
        let dto: StudentDto = self.client.post_json("/alunos", &payload).await?;
        debug!("Backend created student {} for person {}", dto.id, person_id);
        self.to_record(dto).await
    }

    async fn update_student(&self, student_id: &str, student: &StudentSavePayload) -> Result<StudentRecord> {
        let path = format!("/alunos/{}", student_id);
        let current: StudentDto = self.client.get_json(&path, &[]).await?;
        let payload = StudentMapper::student_payload(&current.person_id, student);
        let dto: StudentDto = self.client.put_json(&path, &payload).await?;
        self.to_record(dto).await
    }

    async fn delete_student(&self, student_id: &str) -> Result<bool> {
        let path = format!("/alunos/{}", student_id);
        Ok(deleted(self.client.delete(&path).await)?)
    }

    async fn get_student(&self, student_id: &str) -> Result<Option<StudentRecord>> {
        let path = format!("/alunos/{}", student_id);
        match found(self.client.get_json::<StudentDto>(&path, &[]).await)? {
            Some(dto) => Ok(Some(self.to_record(dto).await?)),
            None => Ok(None),
        }
    }

    async fn list_students(&self, query: &StudentListQuery) -> Result<ListPage<StudentRecord>> {
        let mut params = Vec::new();
        if let Some(search) = query.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            params.push(("busca", search.to_string()));
        }
        if let Some(page) = query.page {
            params.push(("page", page.to_string()));
        }
        if let Some(limit) = query.limit {
            params.push(("limit", limit.to_string()));
        }

        let page = self.client.get_list::<StudentDto>("/alunos", &params, "alunos").await?;
        let items = page
            .items
            .into_iter()
            .map(|dto| StudentMapper::student_from_dto(dto, None))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(ListPage {
            items,
            pagination: page.pagination,
        })
    }
}
