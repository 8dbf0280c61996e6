//! Request bodies, using the remote API's field names.

use serde::{Deserialize, Serialize};

/// Body for `patients/register`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterPatientRequest {
    pub firstname: String,
    pub lastname: String,
    /// Clinic patient number
    pub unique: String,
    /// `YYYY-MM-DD`, or empty when unknown
    pub dob: String,
    pub gender: String,
    /// `YYYY-MM-DD`
    pub reg_date: String,
}

/// Body for `vital/add`. Measurements travel as strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VitalsRequest {
    pub visit_date: String,
    pub height: String,
    pub weight: String,
    pub bmi: String,
    /// Clinic patient number, not the local ID
    pub patient_id: String,
}

/// Body for `visits/add`.
///
/// `on_diet` is filled for general assessments and `on_drugs` for overweight
/// ones; the other is left empty. `vital_id` is empty when the paired vitals
/// have not been acknowledged yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisitRequest {
    pub general_health: String,
    pub on_diet: String,
    pub on_drugs: String,
    pub comments: String,
    pub visit_date: String,
    /// Clinic patient number, not the local ID
    pub patient_id: String,
    pub vital_id: String,
}

/// "Yes"/"No" as the API expects.
pub fn yes_no(flag: bool) -> String {
    if flag { "Yes" } else { "No" }.to_string()
}
