//! Request construction from committed records.
//!
//! This is where records are joined: the clinic patient number replaces the
//! local patient ID, and an assessment picks up the remote ID of the vitals
//! taken on the same visit, if known.

use crate::gateway::{
    yes_no, PushOutcome, RegisterPatientRequest, RemoteGateway, VisitRequest, VitalsRequest,
};
use crate::models::{format_date, Assessment, Endpoint, Patient, Vitals};

/// A request ready to push, or to store as a queue payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutboundRequest {
    RegisterPatient(RegisterPatientRequest),
    AddVitals(VitalsRequest),
    AddVisit(VisitRequest),
}

impl OutboundRequest {
    pub fn endpoint(&self) -> Endpoint {
        match self {
            OutboundRequest::RegisterPatient(_) => Endpoint::RegisterPatient,
            OutboundRequest::AddVitals(_) => Endpoint::AddVitals,
            OutboundRequest::AddVisit(_) => Endpoint::AddVisit,
        }
    }

    /// Serialize the request body for the queue.
    pub fn to_payload(&self) -> serde_json::Result<String> {
        match self {
            OutboundRequest::RegisterPatient(r) => serde_json::to_string(r),
            OutboundRequest::AddVitals(r) => serde_json::to_string(r),
            OutboundRequest::AddVisit(r) => serde_json::to_string(r),
        }
    }

    /// Rebuild a request from a stored queue payload.
    pub fn decode(endpoint: Endpoint, payload: &str) -> serde_json::Result<Self> {
        Ok(match endpoint {
            Endpoint::RegisterPatient => {
                OutboundRequest::RegisterPatient(serde_json::from_str(payload)?)
            }
            Endpoint::AddVitals => OutboundRequest::AddVitals(serde_json::from_str(payload)?),
            Endpoint::AddVisit => OutboundRequest::AddVisit(serde_json::from_str(payload)?),
        })
    }

    /// Send through the matching gateway operation.
    pub async fn push<G>(&self, gateway: &G) -> PushOutcome
    where
        G: RemoteGateway + ?Sized,
    {
        match self {
            OutboundRequest::RegisterPatient(r) => gateway.register_patient(r).await,
            OutboundRequest::AddVitals(r) => gateway.add_vitals(r).await,
            OutboundRequest::AddVisit(r) => gateway.add_visit(r).await,
        }
    }
}

pub fn register_request(patient: &Patient) -> RegisterPatientRequest {
    RegisterPatientRequest {
        firstname: patient.first_name.clone(),
        lastname: patient.last_name.clone(),
        unique: patient.patient_number.clone(),
        dob: patient.date_of_birth.map(format_date).unwrap_or_default(),
        gender: patient.gender.clone().unwrap_or_default(),
        reg_date: format_date(patient.registration_date),
    }
}

pub fn vitals_request(vitals: &Vitals, patient: &Patient) -> VitalsRequest {
    VitalsRequest {
        visit_date: format_date(vitals.visit_date),
        height: format_measure(vitals.height_cm),
        weight: format_measure(vitals.weight_kg),
        bmi: format!("{:.1}", vitals.bmi),
        patient_id: patient.patient_number.clone(),
    }
}

/// Build a visit body; `vital_id` is empty while the vitals are unacknowledged.
pub fn visit_request(
    assessment: &Assessment,
    patient: &Patient,
    vitals_remote_id: Option<i64>,
) -> VisitRequest {
    let (general_health, on_diet, on_drugs, comments) = match assessment {
        Assessment::General(a) => (
            a.general_health.as_str(),
            yes_no(a.ever_on_diet),
            String::new(),
            &a.comments,
        ),
        Assessment::Overweight(a) => (
            a.general_health.as_str(),
            String::new(),
            yes_no(a.using_drugs),
            &a.comments,
        ),
    };

    VisitRequest {
        general_health: general_health.to_string(),
        on_diet,
        on_drugs,
        comments: comments.clone(),
        visit_date: format_date(assessment.visit_date()),
        patient_id: patient.patient_number.clone(),
        vital_id: vitals_remote_id.map(|id| id.to_string()).unwrap_or_default(),
    }
}

/// Whole numbers without a fraction, anything else as-is.
fn format_measure(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{:.0}", value)
    } else {
        value.to_string()
    }
}
