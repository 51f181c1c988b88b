use std::collections::BTreeSet;

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use super::physical_assessment::{PhysicalAssessment, PhysicalAssessmentDraft};
use super::RecordStatus;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Weekday {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl Weekday {
    pub const ALL: [Weekday; 7] = [
        Weekday::Monday,
        Weekday::Tuesday,
        Weekday::Wednesday,
        Weekday::Thursday,
        Weekday::Friday,
        Weekday::Saturday,
        Weekday::Sunday,
    ];

    pub fn as_wire(&self) -> &'static str {
        match self {
            Weekday::Monday => "SEGUNDA",
            Weekday::Tuesday => "TERCA",
            Weekday::Wednesday => "QUARTA",
            Weekday::Thursday => "QUINTA",
            Weekday::Friday => "SEXTA",
            Weekday::Saturday => "SABADO",
            Weekday::Sunday => "DOMINGO",
        }
    }

    pub fn from_wire(value: &str) -> Option<Self> {
        let value = value.trim().to_uppercase();
        Weekday::ALL.into_iter().find(|day| day.as_wire() == value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ContactType {
    #[default]
    Cellphone,
    Landline,
    Email,
}

impl ContactType {
    pub fn as_wire(&self) -> &'static str {
        match self {
            ContactType::Cellphone => "CELULAR",
            ContactType::Landline => "TELEFONE_FIXO",
            ContactType::Email => "EMAIL",
        }
    }

    pub fn from_wire(value: &str) -> Option<Self> {
        match value.trim().to_uppercase().as_str() {
            "CELULAR" => Some(ContactType::Cellphone),
            "TELEFONE_FIXO" | "TELEFONE" => Some(ContactType::Landline),
            "EMAIL" => Some(ContactType::Email),
            _ => None,
        }
    }
}

/// Password field of an edit form, with the user's intent made explicit.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PasswordInput {
    /// Field left untouched
    #[default]
    Unchanged,
    /// User asked to remove the stored password
    Cleared,
    SetTo(String),
}

impl PasswordInput {
    /// Map a raw text box: empty stays `Unchanged`
    pub fn from_text(text: &str) -> Self {
        if text.is_empty() {
            PasswordInput::Unchanged
        } else {
            PasswordInput::SetTo(text.to_string())
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormMode {
    Create,
    Edit,
}

/// What the backend should do with the stored credential
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialChange {
    Keep,
    Remove,
    Replace(String),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Address {
    pub id: Option<String>,
    pub postal_code: String,
    pub street: String,
    pub city: String,
    pub state_code: String,
}

impl Address {
    pub fn is_blank(&self) -> bool {
        self.postal_code.trim().is_empty()
            && self.street.trim().is_empty()
            && self.city.trim().is_empty()
            && self.state_code.trim().is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Contact {
    pub id: Option<String>,
    pub contact_type: ContactType,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schedule {
    pub id: Option<String>,
    pub location: String,
    pub days: BTreeSet<Weekday>,
    pub entry_time: NaiveTime,
    pub exit_time: NaiveTime,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Person {
    pub id: String,
    pub code: Option<String>,
    pub company_id: Option<String>,
    pub name: String,
    pub alternate_name: String,
    pub document1: String,
    pub document2: String,
    pub birth_date: Option<NaiveDate>,
    pub status: RecordStatus,
    pub addresses: Vec<Address>,
    pub contacts: Vec<Contact>,
}

/// Access credentials as read back. The password itself never leaves storage.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AccessControl {
    pub has_password: bool,
    pub fingerprint1: Option<String>,
    pub fingerprint2: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentRecord {
    pub id: String,
    pub person: Person,
    pub registration: Option<String>,
    pub medical_exam_valid_until: Option<NaiveDate>,
    pub assessment_valid_until: Option<NaiveDate>,
    pub goal: String,
    pub profession: String,
    pub employer: String,
    pub schedules: Vec<Schedule>,
    pub access: AccessControl,
    pub physical_assessment: Option<PhysicalAssessment>,
}

// ---------------------------------------------------------------------------
// Form state
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PersonDraft {
    pub id: Option<String>,
    pub code: Option<String>,
    pub name: String,
    pub alternate_name: String,
    pub document1: String,
    pub document2: String,
    pub birth_date: Option<NaiveDate>,
    pub status: RecordStatus,
}

/// Schedule row as typed; times are `HH:MM`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScheduleDraft {
    pub id: Option<String>,
    pub location: String,
    pub days: BTreeSet<Weekday>,
    pub entry_time: String,
    pub exit_time: String,
}

impl ScheduleDraft {
    /// Select the day if absent, deselect it otherwise
    pub fn toggle_day(&mut self, day: Weekday) {
        if !self.days.remove(&day) {
            self.days.insert(day);
        }
    }

    pub fn from_schedule(schedule: &Schedule) -> Self {
        Self {
            id: schedule.id.clone(),
            location: schedule.location.clone(),
            days: schedule.days.clone(),
            entry_time: schedule.entry_time.format("%H:%M").to_string(),
            exit_time: schedule.exit_time.format("%H:%M").to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AccessControlDraft {
    pub password: PasswordInput,
    pub fingerprint1: String,
    pub fingerprint2: String,
    /// Shown instead of the password when editing
    pub has_password: bool,
}

/// Everything the multi-tab student form edits
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StudentDraft {
    pub person: PersonDraft,
    pub addresses: Vec<Address>,
    pub contacts: Vec<Contact>,
    pub medical_exam_valid_until: Option<NaiveDate>,
    pub assessment_valid_until: Option<NaiveDate>,
    pub goal: String,
    pub profession: String,
    pub employer: String,
    pub schedules: Vec<ScheduleDraft>,
    pub access: AccessControlDraft,
    pub physical_assessment: PhysicalAssessmentDraft,
}

impl StudentDraft {
    /// Prepare an edit form for an existing record
    pub fn from_record(record: &StudentRecord) -> Self {
        let person = &record.person;
        Self {
            person: PersonDraft {
                id: Some(person.id.clone()),
                code: person.code.clone(),
                name: person.name.clone(),
                alternate_name: person.alternate_name.clone(),
                document1: person.document1.clone(),
                document2: person.document2.clone(),
                birth_date: person.birth_date,
                status: person.status,
            },
            addresses: person.addresses.clone(),
            contacts: person.contacts.clone(),
            medical_exam_valid_until: record.medical_exam_valid_until,
            assessment_valid_until: record.assessment_valid_until,
            goal: record.goal.clone(),
            profession: record.profession.clone(),
            employer: record.employer.clone(),
            schedules: record.schedules.iter().map(ScheduleDraft::from_schedule).collect(),
            access: AccessControlDraft {
                password: PasswordInput::Unchanged,
                fingerprint1: record.access.fingerprint1.clone().unwrap_or_default(),
                fingerprint2: record.access.fingerprint2.clone().unwrap_or_default(),
                has_password: record.access.has_password,
            },
            physical_assessment: record
                .physical_assessment
                .as_ref()
                .map(PhysicalAssessmentDraft::from_assessment)
                .unwrap_or_default(),
        }
    }
}

// ---------------------------------------------------------------------------
// Save payloads
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PersonPayload {
    pub company_id: Option<String>,
    pub code: Option<String>,
    pub name: String,
    pub alternate_name: String,
    pub document1: String,
    pub document2: String,
    pub birth_date: Option<NaiveDate>,
    pub status: RecordStatus,
    pub addresses: Vec<Address>,
    pub contacts: Vec<Contact>,
}

/// Validated, normalised student data ready for storage
#[derive(Debug, Clone, PartialEq)]
pub struct StudentSavePayload {
    pub person: PersonPayload,
    pub medical_exam_valid_until: Option<NaiveDate>,
    pub assessment_valid_until: Option<NaiveDate>,
    pub goal: String,
    pub profession: String,
    pub employer: String,
    pub schedules: Vec<Schedule>,
    pub credential: CredentialChange,
    pub fingerprint1: Option<String>,
    pub fingerprint2: Option<String>,
    pub physical_assessment: Option<PhysicalAssessment>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle_day() {
        let mut schedule = ScheduleDraft::default();
        schedule.toggle_day(Weekday::Monday);
        schedule.toggle_day(Weekday::Friday);
        assert_eq!(schedule.days.len(), 2);

        schedule.toggle_day(Weekday::Monday);
        assert!(!schedule.days.contains(&Weekday::Monday));
        assert!(schedule.days.contains(&Weekday::Friday));
    }

    #[test]
    fn test_weekday_wire_names() {
        assert_eq!(Weekday::from_wire("sabado"), Some(Weekday::Saturday));
        assert_eq!(Weekday::from_wire("FERIADO"), None);
        assert_eq!(Weekday::Tuesday.as_wire(), "TERCA");
    }

    #[test]
    fn test_password_input_from_text() {
        assert_eq!(PasswordInput::from_text(""), PasswordInput::Unchanged);
        assert_eq!(
            PasswordInput::from_text("1234"),
            PasswordInput::SetTo("1234".to_string())
        );
    }

    #[test]
    fn test_blank_address() {
        assert!(Address::default().is_blank());
        let address = Address {
            city: "Campinas".to_string(),
            ..Default::default()
        };
        assert!(!address.is_blank());
    }

    #[test]
    fn test_from_record_never_carries_password() {
        let record = StudentRecord {
            id: "aluno::1".to_string(),
            person: Person {
                id: "pessoa::1".to_string(),
                name: "Maria Souza".to_string(),
                document1: "123".to_string(),
                ..Default::default()
            },
            registration: None,
            medical_exam_valid_until: None,
            assessment_valid_until: None,
            goal: String::new(),
            profession: String::new(),
            employer: String::new(),
            schedules: vec![Schedule {
                id: None,
                location: "Sala 1".to_string(),
                days: [Weekday::Monday].into_iter().collect(),
                entry_time: NaiveTime::from_hms_opt(7, 0, 0).unwrap(),
                exit_time: NaiveTime::from_hms_opt(8, 30, 0).unwrap(),
            }],
            access: AccessControl {
                has_password: true,
                fingerprint1: Some("fp".to_string()),
                fingerprint2: None,
            },
            physical_assessment: None,
        };

        let draft = StudentDraft::from_record(&record);
        assert_eq!(draft.access.password, PasswordInput::Unchanged);
        assert!(draft.access.has_password);
        assert_eq!(draft.access.fingerprint1, "fp");
        assert_eq!(draft.person.id.as_deref(), Some("pessoa::1"));
        assert_eq!(draft.schedules[0].entry_time, "07:00");
        assert_eq!(draft.schedules[0].exit_time, "08:30");
    }
}
