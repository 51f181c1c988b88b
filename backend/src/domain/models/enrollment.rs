use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EnrollmentStatus {
    Active,
    Inactive,
    Pending,
}

impl EnrollmentStatus {
    pub fn as_wire(&self) -> &'static str {
        match self {
            EnrollmentStatus::Active => "ATIVA",
            EnrollmentStatus::Inactive => "INATIVA",
            EnrollmentStatus::Pending => "PENDENTE",
        }
    }

    pub fn from_wire(value: &str) -> Option<Self> {
        match value.trim().to_uppercase().as_str() {
            "ATIVA" => Some(EnrollmentStatus::Active),
            "INATIVA" => Some(EnrollmentStatus::Inactive),
            "PENDENTE" => Some(EnrollmentStatus::Pending),
            _ => None,
        }
    }
}

/// Link between a student and a plan (matrícula)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Enrollment {
    pub id: String,
    pub student_id: String,
    pub plan_id: String,
    pub start_date: NaiveDate,
    pub due_day: u8,
    pub final_value: Decimal,
    pub status: EnrollmentStatus,
    pub deactivation_reason: Option<String>,
    /// Denormalised for list screens and search
    pub student_name: Option<String>,
    pub student_document: Option<String>,
    pub plan_name: Option<String>,
}

impl Enrollment {
    /// Case-insensitive match on student name, student document or plan name
    pub fn matches(&self, search: &str) -> bool {
        let needle = search.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }
        [&self.student_name, &self.student_document, &self.plan_name]
            .into_iter()
            .flatten()
            .any(|value| value.to_lowercase().contains(&needle))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewEnrollment {
    pub student_id: String,
    pub plan_id: String,
    pub start_date: NaiveDate,
    pub due_day: u8,
    pub final_value: Decimal,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn enrollment() -> Enrollment {
        Enrollment {
            id: "matricula::1".to_string(),
            student_id: "aluno::1".to_string(),
            plan_id: "plano::1".to_string(),
            start_date: NaiveDate::from_ymd_opt(2026, 10, 1).unwrap(),
            due_day: 10,
            final_value: Decimal::new(12990, 2),
            status: EnrollmentStatus::Active,
            deactivation_reason: None,
            student_name: Some("João da Silva".to_string()),
            student_document: Some("123.456.789-00".to_string()),
            plan_name: Some("Musculação Mensal".to_string()),
        }
    }

    #[test]
    fn test_matches_any_searchable_field() {
        let enrollment = enrollment();
        assert!(enrollment.matches("joão"));
        assert!(enrollment.matches("456.789"));
        assert!(enrollment.matches("MUSCULAÇÃO"));
        assert!(enrollment.matches("  "));
        assert!(!enrollment.matches("pilates"));
    }

    #[test]
    fn test_status_wire_names() {
        assert_eq!(EnrollmentStatus::from_wire("inativa"), Some(EnrollmentStatus::Inactive));
        assert_eq!(EnrollmentStatus::Pending.as_wire(), "PENDENTE");
        assert_eq!(EnrollmentStatus::from_wire("CANCELADA"), None);
    }
}
