//! Visit assessments captured after vitals.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Self-reported general health.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GeneralHealth {
    Good,
    Poor,
}

impl GeneralHealth {
    pub fn as_str(&self) -> &'static str {
        match self {
            GeneralHealth::Good => "Good",
            GeneralHealth::Poor => "Poor",
        }
    }

    /// Parse the form value; case-insensitive.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "good" => Some(GeneralHealth::Good),
            "poor" => Some(GeneralHealth::Poor),
            _ => None,
        }
    }
}

/// Assessment captured when BMI is below 25.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GeneralAssessment {
    pub local_id: String,
    /// Local ID of the owning patient
    pub patient_id: String,
    pub visit_date: NaiveDate,
    pub general_health: GeneralHealth,
    /// Has the patient ever been on a diet to lose weight
    pub ever_on_diet: bool,
    /// Free-text notes (mandatory)
    pub comments: String,
    pub created_at: String,
}

/// Assessment captured when BMI is 25 or above.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OverweightAssessment {
    pub local_id: String,
    /// Local ID of the owning patient
    pub patient_id: String,
    pub visit_date: NaiveDate,
    pub general_health: GeneralHealth,
    /// Is the patient currently using any drugs
    pub using_drugs: bool,
    /// Free-text notes (mandatory)
    pub comments: String,
    pub created_at: String,
}

/// General assessment form input.
#[derive(Debug, Clone, PartialEq)]
pub struct NewGeneralAssessment {
    pub patient_id: String,
    pub visit_date: NaiveDate,
    pub general_health: GeneralHealth,
    pub ever_on_diet: bool,
    pub comments: String,
}

/// Overweight assessment form input.
#[derive(Debug, Clone, PartialEq)]
pub struct NewOverweightAssessment {
    pub patient_id: String,
    pub visit_date: NaiveDate,
    pub general_health: GeneralHealth,
    pub using_drugs: bool,
    pub comments: String,
}

impl GeneralAssessment {
    pub fn new(input: NewGeneralAssessment) -> Self {
        Self {
            local_id: uuid::Uuid::new_v4().to_string(),
            patient_id: input.patient_id,
            visit_date: input.visit_date,
            general_health: input.general_health,
            ever_on_diet: input.ever_on_diet,
            comments: input.comments.trim().to_string(),
            created_at: chrono::Utc::now().to_rfc3339(),
        }
    }
}

impl OverweightAssessment {
    pub fn new(input: NewOverweightAssessment) -> Self {
        Self {
            local_id: uuid::Uuid::new_v4().to_string(),
            patient_id: input.patient_id,
            visit_date: input.visit_date,
            general_health: input.general_health,
            using_drugs: input.using_drugs,
            comments: input.comments.trim().to_string(),
            created_at: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Either kind of assessment, as submitted to the visits endpoint.
#[derive(Debug, Clone, PartialEq)]
pub enum Assessment {
    General(GeneralAssessment),
    Overweight(OverweightAssessment),
}

impl Assessment {
    pub fn local_id(&self) -> &str {
        match self {
            Assessment::General(a) => &a.local_id,
            Assessment::Overweight(a) => &a.local_id,
        }
    }

    pub fn patient_id(&self) -> &str {
        match self {
            Assessment::General(a) => &a.patient_id,
            Assessment::Overweight(a) => &a.patient_id,
        }
    }

    pub fn visit_date(&self) -> NaiveDate {
        match self {
            Assessment::General(a) => a.visit_date,
            Assessment::Overweight(a) => a.visit_date,
        }
    }
}
