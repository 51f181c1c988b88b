use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use log::debug;
use shared::{ListPage, PaginationInfo};

use super::connection::{hash_secret, MemoryConnection, Tables};
use crate::domain::commands::student::StudentListQuery;
use crate::domain::models::generate_id;
use crate::domain::models::student::{
    AccessControl, CredentialChange, Person, PersonPayload, StudentRecord, StudentSavePayload,
};
use crate::storage::{StorageError, StudentStorage};

#[derive(Clone)]
pub struct MemoryStudentRepository {
    conn: Arc<MemoryConnection>,
}

impl MemoryStudentRepository {
    pub fn new(conn: Arc<MemoryConnection>) -> Self {
        Self { conn }
    }
}

fn ensure_document_free(tables: &Tables, document1: &str, except_person: Option<&str>) -> Result<()> {
    let document1 = document1.trim();
    let clash = tables.people.values().any(|p| {
        p.document1.trim() == document1 && Some(p.id.as_str()) != except_person
    });
    if clash {
        return Err(StorageError::Conflict(format!("document {} is already registered", document1)).into());
    }
    Ok(())
}

fn apply_person(person: &mut Person, payload: &PersonPayload) {
    person.company_id = payload.company_id.clone();
    person.name = payload.name.clone();
    person.alternate_name = payload.alternate_name.clone();
    person.document1 = payload.document1.clone();
    person.document2 = payload.document2.clone();
    person.birth_date = payload.birth_date;
    person.status = payload.status;
    person.addresses = payload
        .addresses
        .iter()
        .cloned()
        .map(|mut a| {
            a.id.get_or_insert_with(|| generate_id("endereco"));
            a
        })
        .collect();
    person.contacts = payload
        .contacts
        .iter()
        .cloned()
        .map(|mut c| {
            c.id.get_or_insert_with(|| generate_id("contato"));
            c
        })
        .collect();
}

fn apply_student(record: &mut StudentRecord, payload: &StudentSavePayload) {
    record.medical_exam_valid_until = payload.medical_exam_valid_until;
    record.assessment_valid_until = payload.assessment_valid_until;
    record.goal = payload.goal.clone();
    record.profession = payload.profession.clone();
    record.employer = payload.employer.clone();
    record.schedules = payload
        .schedules
        .iter()
        .cloned()
        .map(|mut s| {
            s.id.get_or_insert_with(|| generate_id("horario"));
            s
        })
        .collect();
    record.access.fingerprint1 = payload.fingerprint1.clone();
    record.access.fingerprint2 = payload.fingerprint2.clone();
    record.physical_assessment = payload.physical_assessment.clone().map(|mut a| {
        a.id.get_or_insert_with(|| generate_id("avaliacao"));
        a
    });
}

fn apply_credential(tables: &mut Tables, student_id: &str, change: &CredentialChange) {
    match change {
        CredentialChange::Keep => {}
        CredentialChange::Remove => {
            tables.credentials.remove(student_id);
        }
        CredentialChange::Replace(secret) => {
            tables.credentials.insert(student_id.to_string(), hash_secret(secret));
        }
    }
}

/// Copy of the record with its person and password flag refreshed
fn hydrate(tables: &Tables, record: &StudentRecord) -> StudentRecord {
    let mut record = record.clone();
    if let Some(person) = tables.people.get(&record.person.id) {
        record.person = person.clone();
    }
    record.access.has_password = tables.credentials.contains_key(&record.id);
    record
}

#[async_trait]
impl StudentStorage for MemoryStudentRepository {
    async fn create_person(&self, person: &PersonPayload) -> Result<Person> {
        let mut tables = self.conn.write().await;
        ensure_document_free(&tables, &person.document1, None)?;

        let code = match &person.code {
            Some(code) => code.clone(),
            None => format!("{:06}", tables.next_sequence()),
        };
        let mut created = Person {
            id: generate_id("pessoa"),
            code: Some(code),
            ..Default::default()
        };
        apply_person(&mut created, person);
        tables.people.insert(created.id.clone(), created.clone());
        debug!("Stored person {} in memory", created.id);
        Ok(created)
    }

    async fn update_person(&self, person_id: &str, person: &PersonPayload) -> Result<Person> {
        let mut tables = self.conn.write().await;
        ensure_document_free(&tables, &person.document1, Some(person_id))?;

        let existing = tables
            .people
            .get_mut(person_id)
            .ok_or_else(|| StorageError::NotFound(format!("person {} not found", person_id)))?;
        apply_person(existing, person);
        Ok(existing.clone())
    }

    async fn delete_person(&self, person_id: &str) -> Result<bool> {
        let mut tables = self.conn.write().await;
        Ok(tables.people.remove(person_id).is_some())
    }

    async fn find_person_by_document(&self, document1: &str) -> Result<Option<Person>> {
        let tables = self.conn.read().await;
        let document1 = document1.trim();
        Ok(tables
            .people
            .values()
            .find(|p| p.document1.trim() == document1)
            .cloned())
    }

    async fn create_student(&self, person_id: &str, student: &StudentSavePayload) -> Result<StudentRecord> {
        let mut tables = self.conn.write().await;
        let person = tables
            .people
            .get(person_id)
            .cloned()
            .ok_or_else(|| StorageError::NotFound(format!("person {} not found", person_id)))?;

        let registration = format!("{:06}", tables.next_sequence());
        let mut record = StudentRecord {
            id: generate_id("aluno"),
            person,
            registration: Some(registration),
            medical_exam_valid_until: None,
            assessment_valid_until: None,
            goal: String::new(),
            profession: String::new(),
            employer: String::new(),
            schedules: Vec::new(),
            access: AccessControl::default(),
            physical_assessment: None,
        };
        apply_student(&mut record, student);
        apply_credential(&mut tables, &record.id, &student.credential);

        tables.students.insert(record.id.clone(), record.clone());
        debug!("Stored student {} in memory", record.id);
        Ok(hydrate(&tables, &record))
    }

    async fn update_student(&self, student_id: &str, student: &StudentSavePayload) -> Result<StudentRecord> {
        let mut tables = self.conn.write().await;
        let mut record = tables
            .students
            .get(student_id)
            .cloned()
            .ok_or_else(|| StorageError::NotFound(format!("student {} not found", student_id)))?;

        apply_student(&mut record, student);
        apply_credential(&mut tables, student_id, &student.credential);
        tables.students.insert(record.id.clone(), record.clone());
        Ok(hydrate(&tables, &record))
    }

    async fn delete_student(&self, student_id: &str) -> Result<bool> {
        let mut tables = self.conn.write().await;
        if tables.students.remove(student_id).is_none() {
            return Ok(false);
        }
        tables.credentials.remove(student_id);
        tables.enrollments.retain(|e| e.student_id != student_id);
        Ok(true)
    }

    async fn get_student(&self, student_id: &str) -> Result<Option<StudentRecord>> {
        let tables = self.conn.read().await;
        Ok(tables.students.get(student_id).map(|r| hydrate(&tables, r)))
    }

    async fn list_students(&self, query: &StudentListQuery) -> Result<ListPage<StudentRecord>> {
        let tables = self.conn.read().await;
        let needle = query
            .search
            .as_deref()
            .map(|s| s.trim().to_lowercase())
            .unwrap_or_default();

        let mut matching: Vec<StudentRecord> = tables
            .students
            .values()
            .map(|r| hydrate(&tables, r))
            .filter(|r| {
                needle.is_empty()
                    || r.person.name.to_lowercase().contains(&needle)
                    || r.person.document1.to_lowercase().contains(&needle)
                    || r.registration.as_deref().unwrap_or_default().contains(&needle)
            })
            .collect();
        matching.sort_by(|a, b| a.person.name.to_lowercase().cmp(&b.person.name.to_lowercase()));

        let total = matching.len();
        let limit = query.limit.map(|l| l.max(1) as usize).unwrap_or(total.max(1));
        let page = query.page.unwrap_or(1).max(1) as usize;
        let items: Vec<StudentRecord> = matching
            .into_iter()
            .skip((page - 1) * limit)
            .take(limit)
            .collect();

        Ok(ListPage {
            items,
            pagination: Some(PaginationInfo {
                page: page as u32,
                limit: limit as u32,
                total: total as u64,
                total_pages: total.div_ceil(limit) as u32,
            }),
        })
    }
}
