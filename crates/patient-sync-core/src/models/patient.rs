//! Patient models.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A registered patient.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Patient {
    /// Local UUID - always present, generated locally
    pub local_id: String,
    /// Clinic-assigned patient number, unique per device
    pub patient_number: String,
    /// First name
    pub first_name: String,
    /// Last name
    pub last_name: String,
    /// Date of birth
    pub date_of_birth: Option<NaiveDate>,
    /// Gender as captured on the registration form
    pub gender: Option<String>,
    /// Registration date
    pub registration_date: NaiveDate,
    /// Creation timestamp
    pub created_at: String,
}

/// Registration form input.
#[derive(Debug, Clone, PartialEq)]
pub struct NewPatient {
    pub patient_number: String,
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: Option<NaiveDate>,
    pub gender: Option<String>,
    pub registration_date: NaiveDate,
}

impl Patient {
    /// Create a patient record from registration input.
    pub fn new(input: NewPatient) -> Self {
        Self {
            local_id: uuid::Uuid::new_v4().to_string(),
            patient_number: input.patient_number.trim().to_string(),
            first_name: input.first_name.trim().to_string(),
            last_name: input.last_name.trim().to_string(),
            date_of_birth: input.date_of_birth,
            gender: input
                .gender
                .map(|g| g.trim().to_string())
                .filter(|g| !g.is_empty()),
            registration_date: input.registration_date,
            created_at: chrono::Utc::now().to_rfc3339(),
        }
    }

    /// Display name, last name first.
    pub fn full_name(&self) -> String {
        format!("{}, {}", self.last_name, self.first_name)
    }
}

/// A patient together with their most recent vitals, for list screens.
#[derive(Debug, Clone, PartialEq)]
pub struct PatientSummary {
    pub patient: Patient,
    pub last_bmi: Option<f64>,
    pub last_visit_date: Option<NaiveDate>,
}
