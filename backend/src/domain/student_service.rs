//! # Student record aggregate
//!
//! Validates the multi-tab student form, derives the computed assessment
//! fields, assembles the nested save payload and drives the two-step
//! person-then-student persistence.
//!
//! ## Password policy
//!
//! | mode   | input              | result                          |
//! |--------|--------------------|---------------------------------|
//! | create | `SetTo(non-empty)` | credential stored               |
//! | create | anything else      | `PasswordRequired` error        |
//! | edit   | `Unchanged`        | stored credential kept          |
//! | edit   | `SetTo(non-empty)` | stored credential replaced      |
//! | edit   | `Cleared`          | stored credential removed       |
//!
//! ## Two-step create
//!
//! The person is created first and the student second. If the second call
//! fails, the person just created is deleted again so no orphan is left.

use std::sync::Arc;

use chrono::NaiveTime;
use log::{debug, error, info, warn};
use rust_decimal::Decimal;
use shared::ListPage;

use crate::domain::commands::student::StudentListQuery;
use crate::domain::error::{DomainError, DomainResult, FieldErrorKind, ValidationErrors};
use crate::domain::models::physical_assessment::BmiClassification;
use crate::domain::models::student::{
    Address, Contact, ContactType, CredentialChange, FormMode, PasswordInput, PersonPayload, Schedule,
    ScheduleDraft, StudentDraft, StudentRecord, StudentSavePayload,
};
use crate::storage::StudentStorage;

pub const MIN_NAME_CHARS: usize = 3;

#[derive(Clone)]
pub struct StudentRecordService {
    storage: Arc<dyn StudentStorage>,
}

fn parse_time(raw: &str) -> Option<NaiveTime> {
    let raw = raw.trim();
    NaiveTime::parse_from_str(raw, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M:%S"))
        .ok()
}

fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

impl StudentRecordService {
    pub fn new(storage: Arc<dyn StudentStorage>) -> Self {
        Self { storage }
    }

    /// Check every field of the form and collect all problems at once.
    pub fn validate(draft: &StudentDraft, mode: FormMode) -> ValidationErrors {
        let mut errors = ValidationErrors::new();

        let name = draft.person.name.trim();
        if name.is_empty() {
            errors.push("person.name", FieldErrorKind::Required);
        } else if name.chars().count() < MIN_NAME_CHARS {
            errors.push("person.name", FieldErrorKind::TooShort(MIN_NAME_CHARS));
        }
        if draft.person.document1.trim().is_empty() {
            errors.push("person.document1", FieldErrorKind::Required);
        }

        for (i, address) in draft.addresses.iter().enumerate() {
            let state = address.state_code.trim();
            if !state.is_empty() && (state.chars().count() > 2 || !state.chars().all(char::is_alphabetic)) {
                errors.push(format!("addresses[{}].state_code", i), FieldErrorKind::InvalidFormat("state code"));
            }
        }

        for (i, contact) in draft.contacts.iter().enumerate() {
            let value = contact.value.trim();
            if contact.contact_type == ContactType::Email && !value.is_empty() && !value.contains('@') {
                errors.push(format!("contacts[{}].value", i), FieldErrorKind::InvalidFormat("e-mail"));
            }
        }

        for (i, schedule) in draft.schedules.iter().enumerate() {
            Self::validate_schedule(i, schedule, &mut errors);
        }

        draft.physical_assessment.validate_into(&mut errors);

        if mode == FormMode::Create {
            let has_password = matches!(&draft.access.password, PasswordInput::SetTo(p) if !p.is_empty());
            if !has_password {
                errors.push("access.password", FieldErrorKind::PasswordRequired);
            }
        }

        errors
    }

    fn validate_schedule(
        index: usize,
        schedule: &ScheduleDraft,
        errors: &mut ValidationErrors,
    ) {
        let entry_field = format!("schedules[{}].entry_time", index);
        let exit_field = format!("schedules[{}].exit_time", index);

        let mut check = |field: &str, raw: &str| -> Option<NaiveTime> {
            if raw.trim().is_empty() {
                if !schedule.days.is_empty() {
                    errors.push(field, FieldErrorKind::Required);
                }
                return None;
            }
            let parsed = parse_time(raw);
            if parsed.is_none() {
                errors.push(field, FieldErrorKind::InvalidFormat("time"));
            }
            parsed
        };

        let entry = check(&entry_field, &schedule.entry_time);
        let exit = check(&exit_field, &schedule.exit_time);
        if let (Some(entry), Some(exit)) = (entry, exit) {
            if exit <= entry {
                errors.push(exit_field, FieldErrorKind::NotAfterEntry);
            }
        }
    }

    /// Recompute BMI and body composition; derived values are never edited
    /// directly and repeated calls give the same result.
    pub fn derive_computed_fields(draft: &StudentDraft) -> StudentDraft {
        StudentDraft {
            physical_assessment: draft.physical_assessment.derive_computed_fields(),
            ..draft.clone()
        }
    }

    pub fn bmi_classification(bmi: Decimal) -> BmiClassification {
        BmiClassification::from_bmi(bmi)
    }

    /// Validate and assemble the normalised payload. Nothing is built for an
    /// invalid draft.
    pub fn build_save_payload(
        draft: &StudentDraft,
        mode: FormMode,
        company_id: Option<&str>,
    ) -> DomainResult<StudentSavePayload> {
        Self::validate(draft, mode).into_result()?;

        let addresses = draft
            .addresses
            .iter()
            .filter(|a| !a.is_blank())
            .map(|a| Address {
                id: a.id.clone(),
                postal_code: a.postal_code.trim().to_string(),
                street: a.street.trim().to_string(),
                city: a.city.trim().to_string(),
                state_code: a.state_code.trim().to_uppercase(),
            })
            .collect();

        let contacts = draft
            .contacts
            .iter()
            .filter(|c| !c.value.trim().is_empty())
            .map(|c| Contact {
                id: c.id.clone(),
                contact_type: c.contact_type,
                value: c.value.trim().to_string(),
            })
            .collect();

        let schedules = draft
            .schedules
            .iter()
            .filter(|s| !s.location.trim().is_empty())
            .filter_map(|s| {
                Some(Schedule {
                    id: s.id.clone(),
                    location: s.location.trim().to_string(),
                    days: s.days.clone(),
                    entry_time: parse_time(&s.entry_time)?,
                    exit_time: parse_time(&s.exit_time)?,
                })
            })
            .collect();

        let credential = match (&draft.access.password, mode) {
            (PasswordInput::SetTo(secret), _) if !secret.is_empty() => CredentialChange::Replace(secret.clone()),
            (PasswordInput::Cleared, FormMode::Edit) => CredentialChange::Remove,
            _ => CredentialChange::Keep,
        };

        let person = &draft.person;
        Ok(StudentSavePayload {
            person: PersonPayload {
                company_id: company_id.map(str::to_string),
                code: person.code.clone(),
                name: person.name.trim().to_string(),
                alternate_name: person.alternate_name.trim().to_string(),
                document1: person.document1.trim().to_string(),
                document2: person.document2.trim().to_string(),
                birth_date: person.birth_date,
                status: person.status,
                addresses,
                contacts,
            },
            medical_exam_valid_until: draft.medical_exam_valid_until,
            assessment_valid_until: draft.assessment_valid_until,
            goal: draft.goal.trim().to_string(),
            profession: draft.profession.trim().to_string(),
            employer: draft.employer.trim().to_string(),
            schedules,
            credential,
            fingerprint1: non_empty(&draft.access.fingerprint1),
            fingerprint2: non_empty(&draft.access.fingerprint2),
            physical_assessment: draft.physical_assessment.to_assessment(),
        })
    }

    async fn ensure_document_available(&self, document1: &str, owner_person_id: Option<&str>) -> DomainResult<()> {
        if let Some(existing) = self.storage.find_person_by_document(document1).await? {
            if Some(existing.id.as_str()) != owner_person_id {
                return Err(DomainError::Conflict(format!(
                    "document {} is already registered to {}",
                    document1, existing.name
                )));
            }
        }
        Ok(())
    }

    /// Create the person, then the student referencing it.
    pub async fn create(&self, draft: &StudentDraft, company_id: Option<&str>) -> DomainResult<StudentRecord> {
        info!("🎓 Creating student: {}", draft.person.name.trim());

        let payload = Self::build_save_payload(draft, FormMode::Create, company_id)?;
        self.ensure_document_available(&payload.person.document1, None).await?;

        let person = self.storage.create_person(&payload.person).await?;
        debug!("Created person {} for new student", person.id);

        match self.storage.create_student(&person.id, &payload).await {
            Ok(record) => {
                info!("🎓 Created student {} ({})", record.person.name, record.id);
                Ok(record)
            }
            Err(err) => {
                let err = DomainError::from(err);
                warn!("Student creation failed after person {} was created: {}", person.id, err);
                match self.storage.delete_person(&person.id).await {
                    Ok(true) => info!("↩️ Removed orphaned person {}", person.id),
                    Ok(false) => warn!("Orphaned person {} was already gone", person.id),
                    Err(cleanup) => error!("Failed to remove orphaned person {}: {:#}", person.id, cleanup),
                }
                Err(err)
            }
        }
    }

    pub async fn update(
        &self,
        student_id: &str,
        draft: &StudentDraft,
        company_id: Option<&str>,
    ) -> DomainResult<StudentRecord> {
        info!("🎓 Updating student {}", student_id);

        let existing = self.get(student_id).await?;
        let payload = Self::build_save_payload(draft, FormMode::Edit, company_id)?;
        self.ensure_document_available(&payload.person.document1, Some(&existing.person.id))
            .await?;

        self.storage.update_person(&existing.person.id, &payload.person).await?;
        let record = self.storage.update_student(student_id, &payload).await?;

        info!("🎓 Updated student {} ({})", record.person.name, record.id);
        Ok(record)
    }

    /// Delete the student (its sub-entities and enrollments go with it),
    /// then the person behind it.
    pub async fn delete(&self, student_id: &str) -> DomainResult<()> {
        info!("🎓 Deleting student {}", student_id);
        let existing = self.get(student_id).await?;

        if !self.storage.delete_student(student_id).await? {
            return Err(DomainError::NotFound(format!("student {} not found", student_id)));
        }
        self.storage.delete_person(&existing.person.id).await?;

        info!("🎓 Deleted student {} and person {}", student_id, existing.person.id);
        Ok(())
    }

    pub async fn get(&self, student_id: &str) -> DomainResult<StudentRecord> {
        self.storage
            .get_student(student_id)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("student {} not found", student_id)))
    }

    pub async fn list(&self, query: &StudentListQuery) -> DomainResult<ListPage<StudentRecord>> {
        let page = self.storage.list_students(query).await?;
        debug!("Found {} students", page.items.len());
        Ok(page)
    }
}
