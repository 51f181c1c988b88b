//! Plan catalogue: validation, payload normalisation and CRUD.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use log::{debug, info};
use rust_decimal::Decimal;

use crate::domain::error::{DomainError, DomainResult, FieldErrorKind, ValidationErrors};
use crate::domain::models::plan::{Periodicity, Plan, PlanDraft, PlanPayload};
use crate::storage::PlanStorage;

pub const MAX_MONTHS: u32 = 120;
pub const MAX_DAYS: u32 = 3650;

#[derive(Clone)]
pub struct PlanService {
    storage: Arc<dyn PlanStorage>,
}

fn check_count(errors: &mut ValidationErrors, field: &str, value: Option<u32>, max: u32) {
    match value {
        None => errors.push(field, FieldErrorKind::Required),
        Some(n) if n == 0 || n > max => errors.push(
            field,
            FieldErrorKind::OutOfRange {
                min: "1".to_string(),
                max: max.to_string(),
            },
        ),
        Some(_) => {}
    }
}

impl PlanService {
    pub fn new(storage: Arc<dyn PlanStorage>) -> Self {
        Self { storage }
    }

    pub fn validate(draft: &PlanDraft) -> ValidationErrors {
        let mut errors = ValidationErrors::new();
        if draft.code.trim().is_empty() {
            errors.push("code", FieldErrorKind::Required);
        }
        let name = draft.name.trim();
        if name.is_empty() {
            errors.push("name", FieldErrorKind::Required);
        } else if name.chars().count() < 3 {
            errors.push("name", FieldErrorKind::TooShort(3));
        }
        if draft.monthly_fee <= Decimal::ZERO {
            errors.push("monthly_fee", FieldErrorKind::NotPositive);
        }
        match draft.periodicity {
            Periodicity::Monthly => {}
            Periodicity::Months => check_count(&mut errors, "months", draft.months, MAX_MONTHS),
            Periodicity::Days => check_count(&mut errors, "days", draft.days, MAX_DAYS),
        }
        errors
    }

    /// Validated payload; counts that do not apply to the periodicity are dropped
    pub fn build_payload(draft: &PlanDraft) -> DomainResult<PlanPayload> {
        Self::validate(draft).into_result()?;
        let description = draft.description.trim();
        Ok(PlanPayload {
            code: draft.code.trim().to_string(),
            name: draft.name.trim().to_string(),
            periodicity: draft.periodicity,
            months: (draft.periodicity == Periodicity::Months).then_some(draft.months).flatten(),
            days: (draft.periodicity == Periodicity::Days).then_some(draft.days).flatten(),
            monthly_fee: draft.monthly_fee,
            description: (!description.is_empty()).then(|| description.to_string()),
            status: draft.status,
        })
    }

    /// `PL` followed by the last six digits of the millisecond timestamp
    pub fn generate_code(now: DateTime<Utc>) -> String {
        format!("PL{:06}", now.timestamp_millis().rem_euclid(1_000_000))
    }

    pub async fn create(&self, draft: &PlanDraft) -> DomainResult<Plan> {
        let payload = Self::build_payload(draft)?;
        let plan = self.storage.create_plan(&payload).await?;
        info!("📋 Created plan {} ({})", plan.name, plan.code);
        Ok(plan)
    }

    pub async fn update(&self, plan_id: &str, draft: &PlanDraft) -> DomainResult<Plan> {
        let payload = Self::build_payload(draft)?;
        let plan = self.storage.update_plan(plan_id, &payload).await?;
        info!("📋 Updated plan {} ({})", plan.name, plan.code);
        Ok(plan)
    }

    pub async fn get(&self, plan_id: &str) -> DomainResult<Plan> {
        self.storage
            .get_plan(plan_id)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("plan {} not found", plan_id)))
    }

    pub async fn list(&self) -> DomainResult<Vec<Plan>> {
        let plans = self.storage.list_plans().await?;
        debug!("Found {} plans", plans.len());
        Ok(plans)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::memory::test_utils::dec;
    use crate::storage::memory::{MemoryConnection, MemoryPlanRepository};
    use chrono::TimeZone;

    fn create_test_service() -> PlanService {
        let conn = Arc::new(MemoryConnection::new());
        PlanService::new(Arc::new(MemoryPlanRepository::new(conn)))
    }

    fn draft() -> PlanDraft {
        PlanDraft {
            code: "PL000001".to_string(),
            name: "Trimestral".to_string(),
            periodicity: Periodicity::Months,
            months: Some(3),
            days: Some(90),
            monthly_fee: dec("120.00"),
            description: "  ".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_validation() {
        let errors = PlanService::validate(&PlanDraft::default());
        assert!(errors.has("code"));
        assert_eq!(errors.kind_of("name"), Some(&FieldErrorKind::Required));
        assert_eq!(errors.kind_of("monthly_fee"), Some(&FieldErrorKind::NotPositive));
        assert!(!errors.has("months"));

        let mut by_days = draft();
        by_days.periodicity = Periodicity::Days;
        by_days.days = Some(4000);
        assert!(PlanService::validate(&by_days).has("days"));

        let mut by_months = draft();
        by_months.months = None;
        assert_eq!(
            PlanService::validate(&by_months).kind_of("months"),
            Some(&FieldErrorKind::Required)
        );
    }

    #[test]
    fn test_payload_drops_irrelevant_counts() {
        let payload = PlanService::build_payload(&draft()).unwrap();
        assert_eq!(payload.months, Some(3));
        assert_eq!(payload.days, None);
        assert_eq!(payload.description, None);

        let mut monthly = draft();
        monthly.periodicity = Periodicity::Monthly;
        let payload = PlanService::build_payload(&monthly).unwrap();
        assert_eq!(payload.months, None);
        assert_eq!(payload.days, None);
    }

    #[test]
    fn test_generate_code() {
        let now = Utc.timestamp_millis_opt(1_760_000_123_456).unwrap();
        assert_eq!(PlanService::generate_code(now), "PL123456");

        let now = Utc.timestamp_millis_opt(1_760_000_000_042).unwrap();
        assert_eq!(PlanService::generate_code(now), "PL000042");
    }

    #[tokio::test]
    async fn test_crud() {
        let service = create_test_service();
        let plan = service.create(&draft()).await.unwrap();

        let mut edit = PlanDraft::from_plan(&plan);
        edit.name = "Trimestral Plus".to_string();
        let updated = service.update(&plan.id, &edit).await.unwrap();
        assert_eq!(updated.name, "Trimestral Plus");
        assert_eq!(service.get(&plan.id).await.unwrap(), updated);

        let duplicate = service.create(&draft()).await.unwrap_err();
        assert!(matches!(duplicate, DomainError::Conflict(_)));
        assert_eq!(service.list().await.unwrap().len(), 1);
    }
}
