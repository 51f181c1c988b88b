use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::RecordStatus;

/// Billing period of a plan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Periodicity {
    #[default]
    Monthly,
    /// A fixed number of months
    Months,
    /// A fixed number of days
    Days,
}

impl Periodicity {
    pub fn as_wire(&self) -> &'static str {
        match self {
            Periodicity::Monthly => "MENSAL",
            Periodicity::Months => "MESES",
            Periodicity::Days => "DIAS",
        }
    }

    pub fn from_wire(value: &str) -> Option<Self> {
        match value.trim().to_uppercase().as_str() {
            "MENSAL" => Some(Periodicity::Monthly),
            "MESES" => Some(Periodicity::Months),
            "DIAS" => Some(Periodicity::Days),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plan {
    pub id: String,
    pub code: String,
    pub name: String,
    pub periodicity: Periodicity,
    pub months: Option<u32>,
    pub days: Option<u32>,
    pub monthly_fee: Decimal,
    pub description: Option<String>,
    pub status: RecordStatus,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlanDraft {
    pub code: String,
    pub name: String,
    pub periodicity: Periodicity,
    pub months: Option<u32>,
    pub days: Option<u32>,
    pub monthly_fee: Decimal,
    pub description: String,
    pub status: RecordStatus,
}

impl PlanDraft {
    pub fn from_plan(plan: &Plan) -> Self {
        Self {
            code: plan.code.clone(),
            name: plan.name.clone(),
            periodicity: plan.periodicity,
            months: plan.months,
            days: plan.days,
            monthly_fee: plan.monthly_fee,
            description: plan.description.clone().unwrap_or_default(),
            status: plan.status,
        }
    }
}

/// Normalised plan data; fields that do not apply to the periodicity are `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct PlanPayload {
    pub code: String,
    pub name: String,
    pub periodicity: Periodicity,
    pub months: Option<u32>,
    pub days: Option<u32>,
    pub monthly_fee: Decimal,
    pub description: Option<String>,
    pub status: RecordStatus,
}
