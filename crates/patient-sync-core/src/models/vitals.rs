//! Vitals and BMI classification.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// BMI at or above this value routes to the overweight assessment.
pub const OVERWEIGHT_BMI: f64 = 25.0;

/// BMI below this value is classified as underweight.
pub const UNDERWEIGHT_BMI: f64 = 18.5;

/// Physical measurements recorded for one patient visit.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Vitals {
    /// Local UUID
    pub local_id: String,
    /// Local ID of the owning patient
    pub patient_id: String,
    /// Visit date (one vitals row per patient per date)
    pub visit_date: NaiveDate,
    /// Height in centimeters
    pub height_cm: f64,
    /// Weight in kilograms
    pub weight_kg: f64,
    /// Body mass index, rounded to one decimal
    pub bmi: f64,
    /// Identifier assigned by the remote API once the vitals push succeeds
    pub remote_id: Option<i64>,
    /// Creation timestamp
    pub created_at: String,
}

/// Vitals form input. BMI is derived, never entered.
#[derive(Debug, Clone, PartialEq)]
pub struct NewVitals {
    pub patient_id: String,
    pub visit_date: NaiveDate,
    pub height_cm: f64,
    pub weight_kg: f64,
}

impl Vitals {
    /// Create a vitals record, computing BMI from height and weight.
    pub fn new(input: NewVitals) -> Self {
        Self {
            local_id: uuid::Uuid::new_v4().to_string(),
            bmi: calculate_bmi(input.weight_kg, input.height_cm),
            patient_id: input.patient_id,
            visit_date: input.visit_date,
            height_cm: input.height_cm,
            weight_kg: input.weight_kg,
            remote_id: None,
            created_at: chrono::Utc::now().to_rfc3339(),
        }
    }

    /// Check if the remote API has acknowledged these vitals.
    pub fn is_synced(&self) -> bool {
        self.remote_id.is_some()
    }

    pub fn status(&self) -> BmiStatus {
        BmiStatus::from_bmi(self.bmi)
    }

    /// Which assessment form follows these vitals.
    pub fn next_assessment(&self) -> AssessmentKind {
        AssessmentKind::for_bmi(self.bmi)
    }
}

/// Calculate BMI (kg / m²) rounded to one decimal place.
///
/// Returns 0.0 for a non-positive height.
pub fn calculate_bmi(weight_kg: f64, height_cm: f64) -> f64 {
    if height_cm <= 0.0 {
        return 0.0;
    }
    let height_m = height_cm / 100.0;
    round1(weight_kg / (height_m * height_m))
}

pub(crate) fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// WHO-style BMI category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BmiStatus {
    Underweight,
    Normal,
    Overweight,
}

impl BmiStatus {
    pub fn from_bmi(bmi: f64) -> Self {
        if bmi < UNDERWEIGHT_BMI {
            BmiStatus::Underweight
        } else if bmi < OVERWEIGHT_BMI {
            BmiStatus::Normal
        } else {
            BmiStatus::Overweight
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BmiStatus::Underweight => "Underweight",
            BmiStatus::Normal => "Normal",
            BmiStatus::Overweight => "Overweight",
        }
    }
}

/// Short summary such as `22.8 (Normal)`.
pub fn format_bmi_summary(bmi: f64) -> String {
    format!("{:.1} ({})", bmi, BmiStatus::from_bmi(bmi).as_str())
}

/// The assessment form captured after vitals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AssessmentKind {
    /// BMI below 25
    General,
    /// BMI 25 and above
    Overweight,
}

impl AssessmentKind {
    pub fn for_bmi(bmi: f64) -> Self {
        if bmi < OVERWEIGHT_BMI {
            AssessmentKind::General
        } else {
            AssessmentKind::Overweight
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_calculate_bmi() {
        assert_eq!(calculate_bmi(70.0, 175.0), 22.9);
        assert_eq!(calculate_bmi(90.0, 170.0), 31.1);
        assert_eq!(calculate_bmi(70.0, 0.0), 0.0);
        assert_eq!(calculate_bmi(70.0, -5.0), 0.0);
    }

    #[test]
    fn test_bmi_status_boundaries() {
        assert_eq!(BmiStatus::from_bmi(18.4), BmiStatus::Underweight);
        assert_eq!(BmiStatus::from_bmi(18.5), BmiStatus::Normal);
        assert_eq!(BmiStatus::from_bmi(24.9), BmiStatus::Normal);
        assert_eq!(BmiStatus::from_bmi(25.0), BmiStatus::Overweight);
    }

    #[test]
    fn test_assessment_routing() {
        assert_eq!(AssessmentKind::for_bmi(23.4), AssessmentKind::General);
        assert_eq!(AssessmentKind::for_bmi(25.0), AssessmentKind::Overweight);
    }

    #[test]
    fn test_new_vitals_derives_bmi() {
        let vitals = Vitals::new(NewVitals {
            patient_id: "p".into(),
            visit_date: NaiveDate::from_ymd_opt(2024, 5, 24).unwrap(),
            height_cm: 160.0,
            weight_kg: 60.0,
        });
        assert_eq!(vitals.bmi, 23.4);
        assert_eq!(vitals.status(), BmiStatus::Normal);
        assert_eq!(vitals.next_assessment(), AssessmentKind::General);
        assert!(!vitals.is_synced());
    }

    #[test]
    fn test_format_bmi_summary() {
        assert_eq!(format_bmi_summary(22.84), "22.8 (Normal)");
    }
}
