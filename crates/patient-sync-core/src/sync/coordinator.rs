//! Local commit followed by one opportunistic push.

use std::sync::Arc;

use tracing::{debug, info, warn};

use super::payload::{self, OutboundRequest};
use super::{with_db, SharedDatabase, SyncError, SyncResult};
use crate::db::{DbError, RemoteIdUpdate};
use crate::gateway::{PushOutcome, RemoteGateway};
use crate::models::{
    Assessment, AssessmentKind, BmiStatus, GeneralAssessment, NewGeneralAssessment,
    NewOverweightAssessment, NewPatient, NewVitals, OverweightAssessment, Patient, Vitals,
};

/// How a committed record reached (or will reach) the remote API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// Accepted by the remote API right away.
    Pushed,
    /// Stored in the pending queue for a later sync run.
    Queued { operation_id: i64 },
}

/// Result of a successful local write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteReceipt {
    pub local_id: String,
    pub delivery: Delivery,
}

/// Result of saving vitals, with the classification the UI needs next.
#[derive(Debug, Clone, PartialEq)]
pub struct VitalsReceipt {
    pub local_id: String,
    pub delivery: Delivery,
    pub bmi: f64,
    pub status: BmiStatus,
    pub next_assessment: AssessmentKind,
}

/// Entry point for record-creation flows.
///
/// A write succeeds once the local commit succeeds. Remote failures only
/// change [`Delivery`]; validation and storage faults are returned as errors.
pub struct WriteCoordinator<G> {
    db: SharedDatabase,
    gateway: Arc<G>,
}

impl<G: RemoteGateway + 'static> WriteCoordinator<G> {
    pub fn new(db: SharedDatabase, gateway: Arc<G>) -> Self {
        Self { db, gateway }
    }

    /// Register a patient. The patient number must be unique.
    pub async fn register_patient(&self, input: NewPatient) -> SyncResult<WriteReceipt> {
        require("patient number", &input.patient_number)?;
        require("first name", &input.first_name)?;
        require("last name", &input.last_name)?;

        let patient = Patient::new(input);
        let record = patient.clone();
        with_db(&self.db, move |db| {
            if db.count_patients_with_number(&record.patient_number)? > 0 {
                return Err(SyncError::Duplicate(format!(
                    "Patient number {} already exists",
                    record.patient_number
                )));
            }
            db.insert_patient(&record).map_err(|e| match e {
                DbError::Constraint(msg) => SyncError::Duplicate(msg),
                other => other.into(),
            })
        })
        .await?;

        info!(patient_id = %patient.local_id, "Patient registered locally");

        let request = OutboundRequest::RegisterPatient(payload::register_request(&patient));
        let delivery = self.deliver(request, None).await?;

        Ok(WriteReceipt {
            local_id: patient.local_id,
            delivery,
        })
    }

    /// Save vitals for a visit. One vitals record per patient per date.
    pub async fn save_vitals(&self, input: NewVitals) -> SyncResult<VitalsReceipt> {
        require_positive("height", input.height_cm)?;
        require_positive("weight", input.weight_kg)?;

        let vitals = Vitals::new(input);
        let record = vitals.clone();
        let patient = with_db(&self.db, move |db| {
            let patient = db
                .get_patient(&record.patient_id)?
                .ok_or_else(|| SyncError::NotFound(format!("Patient {}", record.patient_id)))?;
            if db.vitals_exist_for_visit(&record.patient_id, record.visit_date)? {
                return Err(SyncError::Duplicate(format!(
                    "Vitals already recorded for {} on {}",
                    patient.patient_number, record.visit_date
                )));
            }
            db.insert_vitals(&record).map_err(|e| match e {
                DbError::Constraint(msg) => SyncError::Duplicate(msg),
                other => other.into(),
            })?;
            Ok(patient)
        })
        .await?;

        info!(vitals_id = %vitals.local_id, bmi = vitals.bmi, "Vitals saved locally");

        let request = OutboundRequest::AddVitals(payload::vitals_request(&vitals, &patient));
        let delivery = self
            .deliver(request, Some(vitals.local_id.clone()))
            .await?;

        Ok(VitalsReceipt {
            local_id: vitals.local_id.clone(),
            delivery,
            bmi: vitals.bmi,
            status: vitals.status(),
            next_assessment: vitals.next_assessment(),
        })
    }

    pub async fn save_general_assessment(
        &self,
        input: NewGeneralAssessment,
    ) -> SyncResult<WriteReceipt> {
        require("comments", &input.comments)?;
        self.save_assessment(Assessment::General(GeneralAssessment::new(input)))
            .await
    }

    pub async fn save_overweight_assessment(
        &self,
        input: NewOverweightAssessment,
    ) -> SyncResult<WriteReceipt> {
        require("comments", &input.comments)?;
        self.save_assessment(Assessment::Overweight(OverweightAssessment::new(input)))
            .await
    }

    async fn save_assessment(&self, assessment: Assessment) -> SyncResult<WriteReceipt> {
        let record = assessment.clone();
        let (patient, vitals_remote_id) = with_db(&self.db, move |db| {
            let patient = db.get_patient(record.patient_id())?.ok_or_else(|| {
                SyncError::NotFound(format!("Patient {}", record.patient_id()))
            })?;

            match &record {
                Assessment::General(a) => db.insert_general_assessment(a)?,
                Assessment::Overweight(a) => db.insert_overweight_assessment(a)?,
            }

            let remote_id = db
                .find_vitals_for_visit(record.patient_id(), record.visit_date())?
                .and_then(|v| v.remote_id);
            Ok((patient, remote_id))
        })
        .await?;

        if vitals_remote_id.is_none() {
            debug!(
                assessment_id = %assessment.local_id(),
                "Vitals for this visit not acknowledged yet; sending without vital_id"
            );
        }

        let request = OutboundRequest::AddVisit(payload::visit_request(
            &assessment,
            &patient,
            vitals_remote_id,
        ));
        let delivery = self.deliver(request, None).await?;

        Ok(WriteReceipt {
            local_id: assessment.local_id().to_string(),
            delivery,
        })
    }

    /// Push once; queue the request if it does not go through.
    async fn deliver(
        &self,
        request: OutboundRequest,
        vitals_local_id: Option<String>,
    ) -> SyncResult<Delivery> {
        let endpoint = request.endpoint();
        let outcome = request.push(self.gateway.as_ref()).await;

        let failure = match outcome {
            PushOutcome::Ok(data) => {
                if let (Some(local_id), Some(remote_id)) = (vitals_local_id, data.id) {
                    self.apply_vitals_id(local_id, remote_id).await?;
                }
                debug!(endpoint = %endpoint, "Immediate push accepted");
                return Ok(Delivery::Pushed);
            }
            PushOutcome::Rejected(reason) => format!("rejected: {}", reason),
            PushOutcome::Unreachable(error) => format!("unreachable: {}", error),
        };

        let body = request.to_payload()?;
        let message = failure.clone();
        let operation_id = with_db(&self.db, move |db| {
            Ok(db.enqueue_operation(endpoint, &body, Some(&message))?)
        })
        .await?;

        info!(op_id = operation_id, endpoint = %endpoint, error = %failure, "Push failed, queued for sync");
        Ok(Delivery::Queued { operation_id })
    }

    async fn apply_vitals_id(&self, local_id: String, remote_id: i64) -> SyncResult<()> {
        let id = local_id.clone();
        let update = with_db(&self.db, move |db| {
            Ok(db.update_vitals_remote_id(&id, remote_id)?)
        })
        .await?;

        match update {
            RemoteIdUpdate::Applied | RemoteIdUpdate::Unchanged => {
                debug!(vitals_id = %local_id, remote_id, "Vitals linked to remote record");
            }
            RemoteIdUpdate::Conflict { existing } => {
                warn!(vitals_id = %local_id, remote_id, existing, "Vitals already linked to a different remote record");
            }
            RemoteIdUpdate::Missing => {
                warn!(vitals_id = %local_id, remote_id, "Vitals disappeared before remote ID could be stored");
            }
        }
        Ok(())
    }
}

fn require(field: &str, value: &str) -> SyncResult<()> {
    if value.trim().is_empty() {
        return Err(SyncError::InvalidInput(format!("{} is required", field)));
    }
    Ok(())
}

fn require_positive(field: &str, value: f64) -> SyncResult<()> {
    if !value.is_finite() || value <= 0.0 {
        return Err(SyncError::InvalidInput(format!(
            "{} must be greater than zero",
            field
        )));
    }
    Ok(())
}
