//! Domain entities. These are the types services reason about; the wire
//! shapes live in the `shared` crate and are converted in `domain::mappers`.

pub mod cash_register;
pub mod enrollment;
pub mod exercise;
pub mod physical_assessment;
pub mod plan;
pub mod student;
pub mod user;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Generate a storage id such as `caixa::3f2a...`
pub fn generate_id(prefix: &str) -> String {
    format!("{}::{}", prefix, Uuid::new_v4().simple())
}

/// Round to cents, half away from zero.
pub fn round2(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Active/inactive flag shared by people, users and plans
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RecordStatus {
    #[default]
    Active,
    Inactive,
}

impl RecordStatus {
    pub fn as_wire(&self) -> &'static str {
        match self {
            RecordStatus::Active => "ATIVO",
            RecordStatus::Inactive => "INATIVO",
        }
    }

    /// Unknown values are treated as active, the backend's default.
    pub fn from_wire(value: &str) -> Self {
        match value.trim().to_uppercase().as_str() {
            "INATIVO" | "INATIVA" => RecordStatus::Inactive,
            _ => RecordStatus::Active,
        }
    }
}
