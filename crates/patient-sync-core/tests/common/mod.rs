//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::NaiveDate;
use patient_sync_core::gateway::{
    PushOutcome, RegisterPatientRequest, RemoteGateway, ServerData, VisitRequest, VitalsRequest,
};
use patient_sync_core::models::{Endpoint, NewPatient};

/// A request as the gateway saw it.
#[derive(Debug, Clone, PartialEq)]
pub enum Sent {
    Register(RegisterPatientRequest),
    Vitals(VitalsRequest),
    Visit(VisitRequest),
}

impl Sent {
    pub fn endpoint(&self) -> Endpoint {
        match self {
            Sent::Register(_) => Endpoint::RegisterPatient,
            Sent::Vitals(_) => Endpoint::AddVitals,
            Sent::Visit(_) => Endpoint::AddVisit,
        }
    }
}

/// In-process gateway that answers from a script and records every request.
///
/// Once the script runs out it falls back to `default`.
pub struct ScriptedGateway {
    script: Mutex<VecDeque<PushOutcome>>,
    default: Mutex<PushOutcome>,
    sent: Mutex<Vec<Sent>>,
}

impl ScriptedGateway {
    pub fn new(default: PushOutcome) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(VecDeque::new()),
            default: Mutex::new(default),
            sent: Mutex::new(Vec::new()),
        })
    }

    pub fn ok() -> Arc<Self> {
        Self::new(PushOutcome::Ok(ServerData::default()))
    }

    pub fn unreachable() -> Arc<Self> {
        Self::new(PushOutcome::Unreachable("connection refused".into()))
    }

    pub fn push_script(&self, outcomes: impl IntoIterator<Item = PushOutcome>) {
        self.script.lock().unwrap().extend(outcomes);
    }

    pub fn set_default(&self, outcome: PushOutcome) {
        *self.default.lock().unwrap() = outcome;
    }

    pub fn sent(&self) -> Vec<Sent> {
        self.sent.lock().unwrap().clone()
    }

    fn answer(&self, sent: Sent) -> PushOutcome {
        self.sent.lock().unwrap().push(sent);
        let scripted = self.script.lock().unwrap().pop_front();
        scripted.unwrap_or_else(|| self.default.lock().unwrap().clone())
    }
}

#[async_trait]
impl RemoteGateway for ScriptedGateway {
    async fn register_patient(&self, request: &RegisterPatientRequest) -> PushOutcome {
        self.answer(Sent::Register(request.clone()))
    }

    async fn add_vitals(&self, request: &VitalsRequest) -> PushOutcome {
        self.answer(Sent::Vitals(request.clone()))
    }

    async fn add_visit(&self, request: &VisitRequest) -> PushOutcome {
        self.answer(Sent::Visit(request.clone()))
    }
}

pub fn ok_with_id(id: i64) -> PushOutcome {
    PushOutcome::Ok(ServerData {
        id: Some(id),
        message: None,
    })
}

pub fn visit_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 5, 24).unwrap()
}

pub fn new_patient(number: &str) -> NewPatient {
    NewPatient {
        patient_number: number.into(),
        first_name: "Achieng".into(),
        last_name: "Odhiambo".into(),
        date_of_birth: NaiveDate::from_ymd_opt(1990, 3, 14),
        gender: Some("Female".into()),
        registration_date: visit_date(),
    }
}

pub fn register_payload(number: &str) -> String {
    serde_json::to_string(&RegisterPatientRequest {
        firstname: "Test".into(),
        lastname: "Patient".into(),
        unique: number.into(),
        dob: String::new(),
        gender: String::new(),
        reg_date: "2024-05-24".into(),
    })
    .unwrap()
}
