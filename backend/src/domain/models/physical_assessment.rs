//! Physical assessment attached to a student record.
//!
//! The form keeps raw strings so partially typed input survives a re-render.
//! BMI and body composition are derived from weight, height and body-fat %
//! and are recomputed from scratch on every call.

use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::round2;
use crate::domain::error::{FieldErrorKind, ValidationErrors};

/// The nine body circumferences measured during an assessment
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Circumferences<T> {
    pub chest: T,
    pub waist: T,
    pub hip: T,
    pub right_arm: T,
    pub left_arm: T,
    pub right_thigh: T,
    pub left_thigh: T,
    pub right_calf: T,
    pub left_calf: T,
}

impl<T> Circumferences<T> {
    pub fn named(&self) -> [(&'static str, &T); 9] {
        [
            ("chest", &self.chest),
            ("waist", &self.waist),
            ("hip", &self.hip),
            ("right_arm", &self.right_arm),
            ("left_arm", &self.left_arm),
            ("right_thigh", &self.right_thigh),
            ("left_thigh", &self.left_thigh),
            ("right_calf", &self.right_calf),
            ("left_calf", &self.left_calf),
        ]
    }

    pub fn map<U>(&self, f: impl Fn(&T) -> U) -> Circumferences<U> {
        Circumferences {
            chest: f(&self.chest),
            waist: f(&self.waist),
            hip: f(&self.hip),
            right_arm: f(&self.right_arm),
            left_arm: f(&self.left_arm),
            right_thigh: f(&self.right_thigh),
            left_thigh: f(&self.left_thigh),
            right_calf: f(&self.right_calf),
            left_calf: f(&self.left_calf),
        }
    }
}

/// Assessment as stored by the backend
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PhysicalAssessment {
    pub id: Option<String>,
    pub weight: Option<Decimal>,
    pub height: Option<Decimal>,
    pub bmi: Option<Decimal>,
    pub body_fat_percent: Option<Decimal>,
    pub lean_mass: Option<Decimal>,
    pub fat_mass: Option<Decimal>,
    pub circumferences: Circumferences<Option<Decimal>>,
    pub notes: String,
    pub assessed_on: Option<NaiveDate>,
}

/// Assessment as edited in the form
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PhysicalAssessmentDraft {
    pub id: Option<String>,
    pub weight: String,
    pub height: String,
    pub body_fat_percent: String,
    pub circumferences: Circumferences<String>,
    pub notes: String,
    pub assessed_on: Option<NaiveDate>,
    /// Derived, read-only
    pub bmi: Option<Decimal>,
    /// Derived, read-only
    pub fat_mass: Option<Decimal>,
    /// Derived, read-only
    pub lean_mass: Option<Decimal>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BmiClassification {
    Underweight,
    Normal,
    Overweight,
    ObesityI,
    ObesityII,
    ObesityIII,
}

impl BmiClassification {
    pub fn from_bmi(bmi: Decimal) -> Self {
        if bmi < Decimal::new(185, 1) {
            BmiClassification::Underweight
        } else if bmi < Decimal::from(25) {
            BmiClassification::Normal
        } else if bmi < Decimal::from(30) {
            BmiClassification::Overweight
        } else if bmi < Decimal::from(35) {
            BmiClassification::ObesityI
        } else if bmi < Decimal::from(40) {
            BmiClassification::ObesityII
        } else {
            BmiClassification::ObesityIII
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            BmiClassification::Underweight => "Abaixo do peso",
            BmiClassification::Normal => "Peso normal",
            BmiClassification::Overweight => "Sobrepeso",
            BmiClassification::ObesityI => "Obesidade grau I",
            BmiClassification::ObesityII => "Obesidade grau II",
            BmiClassification::ObesityIII => "Obesidade grau III",
        }
    }
}

/// Parse a typed measurement. Blank input is `None`; a decimal comma is accepted.
pub fn parse_measure(input: &str) -> Result<Option<Decimal>, FieldErrorKind> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    Decimal::from_str(&trimmed.replace(',', "."))
        .map(Some)
        .map_err(|_| FieldErrorKind::NotANumber)
}

/// weight / height², rounded to cents. `None` unless both are positive
/// and the result is representable.
pub fn compute_bmi(weight: Decimal, height: Decimal) -> Option<Decimal> {
    if weight <= Decimal::ZERO || height <= Decimal::ZERO {
        return None;
    }
    let squared = height.checked_mul(height)?;
    weight.checked_div(squared).map(round2)
}

/// Returns `(fat_mass, lean_mass)` for a weight and body-fat percentage.
pub fn compute_body_composition(weight: Decimal, body_fat_percent: Decimal) -> Option<(Decimal, Decimal)> {
    if weight <= Decimal::ZERO
        || body_fat_percent < Decimal::ZERO
        || body_fat_percent > Decimal::ONE_HUNDRED
    {
        return None;
    }
    let fat = weight
        .checked_mul(body_fat_percent)?
        .checked_div(Decimal::ONE_HUNDRED)?;
    Some((round2(fat), round2(weight.checked_sub(fat)?)))
}

fn parsed(input: &str) -> Option<Decimal> {
    parse_measure(input).ok().flatten()
}

fn render(value: Option<Decimal>) -> String {
    value.map(|v| v.normalize().to_string()).unwrap_or_default()
}

impl PhysicalAssessmentDraft {
    pub fn from_assessment(assessment: &PhysicalAssessment) -> Self {
        let draft = Self {
            id: assessment.id.clone(),
            weight: render(assessment.weight),
            height: render(assessment.height),
            body_fat_percent: render(assessment.body_fat_percent),
            circumferences: assessment.circumferences.map(|v| render(*v)),
            notes: assessment.notes.clone(),
            assessed_on: assessment.assessed_on,
            bmi: None,
            fat_mass: None,
            lean_mass: None,
        };
        draft.derive_computed_fields()
    }

    /// Recompute BMI and body composition from the current inputs,
    /// overwriting whatever was derived before.
    pub fn derive_computed_fields(&self) -> Self {
        let weight = parsed(&self.weight);
        let height = parsed(&self.height);
        let body_fat = parsed(&self.body_fat_percent);

        let bmi = match (weight, height) {
            (Some(w), Some(h)) => compute_bmi(w, h),
            _ => None,
        };
        let composition = match (weight, body_fat) {
            (Some(w), Some(pct)) => compute_body_composition(w, pct),
            _ => None,
        };

        Self {
            bmi,
            fat_mass: composition.map(|(fat, _)| fat),
            lean_mass: composition.map(|(_, lean)| lean),
            ..self.clone()
        }
    }

    pub fn classification(&self) -> Option<BmiClassification> {
        self.bmi.map(BmiClassification::from_bmi)
    }

    /// Weight and height are what make an assessment worth saving
    pub fn is_present(&self) -> bool {
        !self.weight.trim().is_empty() && !self.height.trim().is_empty()
    }

    /// Append every problem with the typed numbers to `errors`
    pub fn validate_into(&self, errors: &mut ValidationErrors) {
        let positive_fields = [("weight", &self.weight), ("height", &self.height)]
            .into_iter()
            .chain(self.circumferences.named());

        for (name, raw) in positive_fields {
            let field = format!("physical_assessment.{}", name);
            match parse_measure(raw) {
                Ok(Some(value)) if value <= Decimal::ZERO => {
                    errors.push(field, FieldErrorKind::NotPositive)
                }
                Ok(_) => {}
                Err(kind) => errors.push(field, kind),
            }
        }

        match parse_measure(&self.body_fat_percent) {
            Ok(Some(pct)) if pct < Decimal::ZERO || pct > Decimal::ONE_HUNDRED => errors.push(
                "physical_assessment.body_fat_percent",
                FieldErrorKind::OutOfRange {
                    min: "0".to_string(),
                    max: "100".to_string(),
                },
            ),
            Ok(_) => {}
            Err(kind) => errors.push("physical_assessment.body_fat_percent", kind),
        }
    }

    /// Build the stored form of a valid draft. `None` when weight or height is missing.
    pub fn to_assessment(&self) -> Option<PhysicalAssessment> {
        if !self.is_present() {
            return None;
        }
        let derived = self.derive_computed_fields();
        Some(PhysicalAssessment {
            id: self.id.clone(),
            weight: parsed(&self.weight),
            height: parsed(&self.height),
            bmi: derived.bmi,
            body_fat_percent: parsed(&self.body_fat_percent),
            lean_mass: derived.lean_mass,
            fat_mass: derived.fat_mass,
            circumferences: self.circumferences.map(|raw| parsed(raw)),
            notes: self.notes.trim().to_string(),
            assessed_on: self.assessed_on,
        })
    }
}
