//! Patient Sync Core Library
//!
//! Offline-first patient capture: every write lands in local SQLite first and
//! reaches the remote clinic API either immediately or through a durable
//! replay queue.
//!
//! # Architecture
//!
//! ```text
//!   register / vitals / assessment
//!                 │
//!         [WriteCoordinator]
//!                 │
//!        local commit (SQLite) ──────────► always succeeds first
//!                 │
//!        one immediate push ──── Ok ─────► remote id applied, done
//!                 │
//!       Rejected / Unreachable
//!                 │
//!   ┌─────────────▼─────────────┐
//!   │  pending_operations (FIFO) │◄──── recordFailure (attempt + 1)
//!   └─────────────┬─────────────┘
//!                 │
//!         [SyncOrchestrator] ◄──── sync now / SyncScheduler
//!                 │                 (periodic while online, on reconnect)
//!                 ▼
//!          [RemoteGateway] ──► patients/register, vital/add, visits/add
//! ```
//!
//! # Modules
//!
//! - [`db`]: SQLite store for records and the pending operation queue
//! - [`models`]: Domain types (Patient, Vitals, assessments, PendingOperation)
//! - [`gateway`]: Remote API contract and its HTTP implementation
//! - [`sync`]: Write coordinator, queue orchestrator and scheduler
//! - [`config`]: Runtime configuration
//! - [`logging`]: Tracing subscriber setup

pub mod config;
pub mod db;
pub mod gateway;
pub mod logging;
pub mod models;
pub mod sync;

// Re-export commonly used types
pub use config::{ConfigError, CoreConfig};
pub use db::{Database, DbError};
pub use gateway::{HttpGateway, PushOutcome, RemoteGateway, ServerData};
pub use models::{
    AssessmentKind, BmiStatus, Endpoint, GeneralHealth, NewPatient, NewVitals, Patient,
    PendingOperation, Vitals,
};
pub use sync::{
    ConnectivityState, Delivery, SyncError, SyncOrchestrator, SyncRunOutcome, SyncScheduler,
    SyncState, WriteCoordinator, WriteReceipt,
};

// UniFFI setup - using proc macros
uniffi::setup_scaffolding!();

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::watch;

use crate::db::{LAST_SYNC_AT, LAST_SYNC_OUTCOME};
use crate::models::{
    format_date, parse_date, NewGeneralAssessment, NewOverweightAssessment, PatientSummary,
};
use crate::sync::{SchedulerHandle, SharedDatabase, VitalsReceipt};

// =========================================================================
// FFI Error Type
// =========================================================================

#[derive(Debug, thiserror::Error, uniffi::Error)]
pub enum PatientSyncError {
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Duplicate: {0}")]
    Duplicate(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Sync error: {0}")]
    SyncError(String),
}

impl From<db::DbError> for PatientSyncError {
    fn from(e: db::DbError) -> Self {
        PatientSyncError::DatabaseError(e.to_string())
    }
}

impl From<sync::SyncError> for PatientSyncError {
    fn from(e: sync::SyncError) -> Self {
        match e {
            sync::SyncError::Database(e) => PatientSyncError::DatabaseError(e.to_string()),
            sync::SyncError::InvalidInput(msg) => PatientSyncError::InvalidInput(msg),
            sync::SyncError::Duplicate(msg) => PatientSyncError::Duplicate(msg),
            sync::SyncError::NotFound(msg) => PatientSyncError::NotFound(msg),
            sync::SyncError::Serialization(e) => {
                PatientSyncError::SerializationError(e.to_string())
            }
            sync::SyncError::Task(msg) => PatientSyncError::SyncError(msg),
        }
    }
}

impl From<config::ConfigError> for PatientSyncError {
    fn from(e: config::ConfigError) -> Self {
        PatientSyncError::ConfigError(e.to_string())
    }
}

impl From<reqwest::Error> for PatientSyncError {
    fn from(e: reqwest::Error) -> Self {
        PatientSyncError::ConfigError(format!("HTTP client: {}", e))
    }
}

impl From<std::io::Error> for PatientSyncError {
    fn from(e: std::io::Error) -> Self {
        PatientSyncError::SyncError(format!("Runtime: {}", e))
    }
}

impl<T> From<std::sync::PoisonError<T>> for PatientSyncError {
    fn from(e: std::sync::PoisonError<T>) -> Self {
        PatientSyncError::DatabaseError(format!("Lock poisoned: {}", e))
    }
}

fn ffi_date(field: &str, value: &str) -> Result<chrono::NaiveDate, PatientSyncError> {
    parse_date(value).map_err(|_| {
        PatientSyncError::InvalidInput(format!("{} must be YYYY-MM-DD, got {:?}", field, value))
    })
}

// =========================================================================
// Factory Functions (exported to FFI)
// =========================================================================

/// Open the core from a JSON configuration document.
///
/// `PATIENT_SYNC_BASE_URL` and `PATIENT_SYNC_AUTH_TOKEN` override the
/// corresponding fields.
#[uniffi::export]
pub fn open_core(config_json: String) -> Result<Arc<PatientSyncCore>, PatientSyncError> {
    let config = CoreConfig::from_json(&config_json)?.with_env_overrides();
    config.validate()?;
    let db = match &config.database_path {
        Some(path) => Database::open(path)?,
        None => Database::open_in_memory()?,
    };
    Ok(Arc::new(PatientSyncCore::new(db, &config)?))
}

/// Open the core with an in-memory database (for testing).
#[uniffi::export]
pub fn open_core_in_memory(base_url: String) -> Result<Arc<PatientSyncCore>, PatientSyncError> {
    let config = CoreConfig {
        base_url,
        ..CoreConfig::default()
    };
    config.validate()?;
    let db = Database::open_in_memory()?;
    Ok(Arc::new(PatientSyncCore::new(db, &config)?))
}

/// Install the log subscriber. Returns false if one was already installed.
#[uniffi::export]
pub fn init_logging(filter: String) -> bool {
    logging::init(&filter)
}

// =========================================================================
// Main API Object
// =========================================================================

/// Thread-safe facade for the host application.
///
/// Calls block the calling thread until the work completes on the core's own
/// runtime; hosts should call from a background thread.
#[derive(uniffi::Object)]
pub struct PatientSyncCore {
    runtime: tokio::runtime::Runtime,
    db: SharedDatabase,
    coordinator: WriteCoordinator<HttpGateway>,
    orchestrator: Arc<SyncOrchestrator<HttpGateway>>,
    connectivity: watch::Sender<ConnectivityState>,
    scheduler: Mutex<Option<SchedulerHandle>>,
    sync_interval: Duration,
}

impl PatientSyncCore {
    fn new(db: Database, config: &CoreConfig) -> Result<Self, PatientSyncError> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .thread_name("patient-sync")
            .enable_all()
            .build()?;

        let db = sync::share(db);
        let gateway = Arc::new(HttpGateway::new(config.gateway_settings())?);
        let (connectivity, _) = watch::channel(ConnectivityState::Offline);

        Ok(Self {
            runtime,
            coordinator: WriteCoordinator::new(db.clone(), gateway.clone()),
            orchestrator: Arc::new(SyncOrchestrator::new(db.clone(), gateway)),
            db,
            connectivity,
            scheduler: Mutex::new(None),
            sync_interval: config.sync_interval(),
        })
    }
}

#[uniffi::export]
impl PatientSyncCore {
    // =========================================================================
    // Write Operations
    // =========================================================================

    /// Register a patient locally and push it (or queue it).
    pub fn register_patient(
        &self,
        input: FfiNewPatient,
    ) -> Result<FfiWriteReceipt, PatientSyncError> {
        let new_patient = NewPatient {
            date_of_birth: input
                .date_of_birth
                .as_deref()
                .filter(|d| !d.trim().is_empty())
                .map(|d| ffi_date("date_of_birth", d))
                .transpose()?,
            registration_date: ffi_date("registration_date", &input.registration_date)?,
            patient_number: input.patient_number,
            first_name: input.first_name,
            last_name: input.last_name,
            gender: input.gender,
        };
        let receipt = self
            .runtime
            .block_on(self.coordinator.register_patient(new_patient))?;
        Ok(receipt.into())
    }

    /// Save vitals; the receipt says which assessment form comes next.
    pub fn save_vitals(&self, input: FfiNewVitals) -> Result<FfiVitalsReceipt, PatientSyncError> {
        let new_vitals = NewVitals {
            patient_id: input.patient_id,
            visit_date: ffi_date("visit_date", &input.visit_date)?,
            height_cm: input.height_cm,
            weight_kg: input.weight_kg,
        };
        let receipt = self.runtime.block_on(self.coordinator.save_vitals(new_vitals))?;
        Ok(receipt.into())
    }

    pub fn save_general_assessment(
        &self,
        input: FfiGeneralAssessmentInput,
    ) -> Result<FfiWriteReceipt, PatientSyncError> {
        let assessment = NewGeneralAssessment {
            visit_date: ffi_date("visit_date", &input.visit_date)?,
            general_health: parse_health(&input.general_health)?,
            patient_id: input.patient_id,
            ever_on_diet: input.ever_on_diet,
            comments: input.comments,
        };
        let receipt = self
            .runtime
            .block_on(self.coordinator.save_general_assessment(assessment))?;
        Ok(receipt.into())
    }

    pub fn save_overweight_assessment(
        &self,
        input: FfiOverweightAssessmentInput,
    ) -> Result<FfiWriteReceipt, PatientSyncError> {
        let assessment = NewOverweightAssessment {
            visit_date: ffi_date("visit_date", &input.visit_date)?,
            general_health: parse_health(&input.general_health)?,
            patient_id: input.patient_id,
            using_drugs: input.using_drugs,
            comments: input.comments,
        };
        let receipt = self
            .runtime
            .block_on(self.coordinator.save_overweight_assessment(assessment))?;
        Ok(receipt.into())
    }

    // =========================================================================
    // Read Operations
    // =========================================================================

    /// Get a patient by local ID.
    pub fn get_patient(&self, local_id: String) -> Result<Option<FfiPatient>, PatientSyncError> {
        let db = self.db.lock()?;
        let patient = db.get_patient(&local_id)?;
        Ok(patient.map(|p| p.into()))
    }

    /// All patients with their latest BMI, ordered by name.
    pub fn list_patients(&self) -> Result<Vec<FfiPatientSummary>, PatientSyncError> {
        let db = self.db.lock()?;
        let summaries = db.list_patients_with_last_vitals()?;
        Ok(summaries.into_iter().map(|s| s.into()).collect())
    }

    /// Patients seen on a visit date (`YYYY-MM-DD`).
    pub fn list_patients_by_visit_date(
        &self,
        visit_date: String,
    ) -> Result<Vec<FfiPatientSummary>, PatientSyncError> {
        let date = ffi_date("visit_date", &visit_date)?;
        let db = self.db.lock()?;
        let summaries = db.list_patients_by_visit_date(date)?;
        Ok(summaries.into_iter().map(|s| s.into()).collect())
    }

    // =========================================================================
    // Sync Operations
    // =========================================================================

    pub fn pending_count(&self) -> Result<u32, PatientSyncError> {
        Ok(self.runtime.block_on(self.orchestrator.pending_count())?)
    }

    /// Queued operations, oldest first.
    pub fn list_pending(&self) -> Result<Vec<FfiPendingOperation>, PatientSyncError> {
        let ops = self.runtime.block_on(self.orchestrator.list_pending())?;
        Ok(ops.into_iter().map(|op| op.into()).collect())
    }

    /// Replay the queue now, whatever the reported connectivity.
    pub fn request_sync_now(&self) -> Result<FfiSyncRunOutcome, PatientSyncError> {
        let outcome = self.runtime.block_on(self.orchestrator.request_sync_now())?;
        Ok(outcome.into())
    }

    /// Report network availability. Coming back online triggers a sync when
    /// the periodic scheduler is running.
    pub fn set_network_available(&self, available: bool) {
        let state = if available {
            ConnectivityState::Online
        } else {
            ConnectivityState::Offline
        };
        self.connectivity.send_replace(state);
    }

    /// Start background sync. No-op if already running.
    pub fn start_periodic_sync(&self) -> Result<(), PatientSyncError> {
        let mut scheduler = self.scheduler.lock()?;
        if scheduler.as_ref().is_some_and(|h| !h.is_finished()) {
            return Ok(());
        }

        let _guard = self.runtime.enter();
        let handle = SyncScheduler::new(
            self.orchestrator.clone(),
            self.connectivity.subscribe(),
            self.sync_interval,
        )
        .spawn();
        *scheduler = Some(handle);
        Ok(())
    }

    /// Stop background sync, waiting for an in-flight run to finish.
    pub fn stop_periodic_sync(&self) -> Result<(), PatientSyncError> {
        let handle = self.scheduler.lock()?.take();
        if let Some(handle) = handle {
            self.runtime.block_on(handle.shutdown());
        }
        Ok(())
    }

    /// Current run state plus the record of the last completed run.
    pub fn sync_state(&self) -> Result<FfiSyncStatus, PatientSyncError> {
        let (state, total, processed) = match self.orchestrator.state() {
            SyncState::Idle => ("idle", 0, 0),
            SyncState::Draining { total, processed } => ("draining", total, processed),
            SyncState::Finished(_) => ("finished", 0, 0),
        };

        let db = self.db.lock()?;
        let non_empty = |v: Option<String>| v.filter(|s| !s.is_empty());
        Ok(FfiSyncStatus {
            state: state.to_string(),
            total,
            processed,
            last_sync_at: non_empty(db.get_sync_state(LAST_SYNC_AT)?),
            last_sync_outcome: non_empty(db.get_sync_state(LAST_SYNC_OUTCOME)?),
        })
    }

    /// Maintenance: drop operations with at least `max_attempts` failures
    /// that were queued more than `older_than_days` ago.
    pub fn purge_stale_operations(
        &self,
        max_attempts: u32,
        older_than_days: u32,
    ) -> Result<u64, PatientSyncError> {
        let cutoff = chrono::Utc::now() - chrono::Duration::days(i64::from(older_than_days));
        let removed = self
            .runtime
            .block_on(self.orchestrator.purge_stale(max_attempts, cutoff))?;
        Ok(removed as u64)
    }
}

fn parse_health(value: &str) -> Result<GeneralHealth, PatientSyncError> {
    GeneralHealth::parse(value).ok_or_else(|| {
        PatientSyncError::InvalidInput(format!("general_health must be Good or Poor, got {:?}", value))
    })
}

// =========================================================================
// FFI Types
// =========================================================================

/// FFI-safe registration input. Dates are `YYYY-MM-DD`.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiNewPatient {
    pub patient_number: String,
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: Option<String>,
    pub gender: Option<String>,
    pub registration_date: String,
}

/// FFI-safe vitals input.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiNewVitals {
    pub patient_id: String,
    pub visit_date: String,
    pub height_cm: f64,
    pub weight_kg: f64,
}

#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiGeneralAssessmentInput {
    pub patient_id: String,
    pub visit_date: String,
    /// "Good" or "Poor"
    pub general_health: String,
    pub ever_on_diet: bool,
    pub comments: String,
}

#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiOverweightAssessmentInput {
    pub patient_id: String,
    pub visit_date: String,
    /// "Good" or "Poor"
    pub general_health: String,
    pub using_drugs: bool,
    pub comments: String,
}

/// FFI-safe delivery status.
#[derive(Debug, Clone, PartialEq, Eq, uniffi::Enum)]
pub enum FfiDelivery {
    Pushed,
    Queued { operation_id: i64 },
}

impl From<Delivery> for FfiDelivery {
    fn from(delivery: Delivery) -> Self {
        match delivery {
            Delivery::Pushed => FfiDelivery::Pushed,
            Delivery::Queued { operation_id } => FfiDelivery::Queued { operation_id },
        }
    }
}

#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiWriteReceipt {
    pub local_id: String,
    pub delivery: FfiDelivery,
}

impl From<WriteReceipt> for FfiWriteReceipt {
    fn from(receipt: WriteReceipt) -> Self {
        Self {
            local_id: receipt.local_id,
            delivery: receipt.delivery.into(),
        }
    }
}

#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiVitalsReceipt {
    pub local_id: String,
    pub delivery: FfiDelivery,
    pub bmi: f64,
    /// "Underweight", "Normal" or "Overweight"
    pub bmi_status: String,
    /// True when the overweight assessment should follow
    pub needs_overweight_assessment: bool,
}

impl From<VitalsReceipt> for FfiVitalsReceipt {
    fn from(receipt: VitalsReceipt) -> Self {
        Self {
            local_id: receipt.local_id,
            delivery: receipt.delivery.into(),
            bmi: receipt.bmi,
            bmi_status: receipt.status.as_str().to_string(),
            needs_overweight_assessment: receipt.next_assessment == AssessmentKind::Overweight,
        }
    }
}

/// FFI-safe patient.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiPatient {
    pub local_id: String,
    pub patient_number: String,
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: Option<String>,
    pub gender: Option<String>,
    pub registration_date: String,
}

impl From<Patient> for FfiPatient {
    fn from(patient: Patient) -> Self {
        Self {
            local_id: patient.local_id,
            patient_number: patient.patient_number,
            first_name: patient.first_name,
            last_name: patient.last_name,
            date_of_birth: patient.date_of_birth.map(format_date),
            gender: patient.gender,
            registration_date: format_date(patient.registration_date),
        }
    }
}

/// FFI-safe patient list row.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiPatientSummary {
    pub patient: FfiPatient,
    pub last_bmi: Option<f64>,
    pub last_bmi_status: Option<String>,
    pub last_visit_date: Option<String>,
}

impl From<PatientSummary> for FfiPatientSummary {
    fn from(summary: PatientSummary) -> Self {
        Self {
            patient: summary.patient.into(),
            last_bmi: summary.last_bmi,
            last_bmi_status: summary
                .last_bmi
                .map(|bmi| BmiStatus::from_bmi(bmi).as_str().to_string()),
            last_visit_date: summary.last_visit_date.map(format_date),
        }
    }
}

/// FFI-safe queued operation.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiPendingOperation {
    pub id: i64,
    pub endpoint: String,
    pub payload: String,
    pub created_at: i64,
    pub attempt_count: u32,
    pub last_error: Option<String>,
    pub enqueued_at: String,
}

impl From<PendingOperation> for FfiPendingOperation {
    fn from(op: PendingOperation) -> Self {
        Self {
            id: op.id,
            endpoint: op.endpoint.path().to_string(),
            payload: op.payload,
            created_at: op.created_at,
            attempt_count: op.attempt_count,
            last_error: op.last_error,
            enqueued_at: op.enqueued_at,
        }
    }
}

#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiSyncRunOutcome {
    pub succeeded: bool,
    pub synced: u32,
    pub remaining: u32,
}

impl From<SyncRunOutcome> for FfiSyncRunOutcome {
    fn from(outcome: SyncRunOutcome) -> Self {
        match outcome {
            SyncRunOutcome::Succeeded { synced } => Self {
                succeeded: true,
                synced,
                remaining: 0,
            },
            SyncRunOutcome::PartiallyFailed { synced, remaining } => Self {
                succeeded: false,
                synced,
                remaining,
            },
        }
    }
}

#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiSyncStatus {
    /// "idle", "draining" or "finished"
    pub state: String,
    pub total: u32,
    pub processed: u32,
    pub last_sync_at: Option<String>,
    pub last_sync_outcome: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn core() -> Arc<PatientSyncCore> {
        // Nothing listens here, so every push is Unreachable
        open_core_in_memory("http://127.0.0.1:9/api".into()).unwrap()
    }

    fn new_patient(number: &str) -> FfiNewPatient {
        FfiNewPatient {
            patient_number: number.into(),
            first_name: "Achieng".into(),
            last_name: "Odhiambo".into(),
            date_of_birth: Some("1990-03-14".into()),
            gender: Some("Female".into()),
            registration_date: "2024-05-24".into(),
        }
    }

    #[test]
    fn test_offline_writes_are_queued() {
        let core = core();

        let patient = core.register_patient(new_patient("P-001")).unwrap();
        assert!(matches!(patient.delivery, FfiDelivery::Queued { .. }));

        let vitals = core
            .save_vitals(FfiNewVitals {
                patient_id: patient.local_id.clone(),
                visit_date: "2024-05-24".into(),
                height_cm: 170.0,
                weight_kg: 90.0,
            })
            .unwrap();
        assert_eq!(vitals.bmi, 31.1);
        assert_eq!(vitals.bmi_status, "Overweight");
        assert!(vitals.needs_overweight_assessment);

        core.save_overweight_assessment(FfiOverweightAssessmentInput {
            patient_id: patient.local_id.clone(),
            visit_date: "2024-05-24".into(),
            general_health: "poor".into(),
            using_drugs: true,
            comments: "Refer to nutritionist".into(),
        })
        .unwrap();

        assert_eq!(core.pending_count().unwrap(), 3);
        let endpoints: Vec<String> = core
            .list_pending()
            .unwrap()
            .into_iter()
            .map(|op| op.endpoint)
            .collect();
        assert_eq!(endpoints, vec!["patients/register", "vital/add", "visits/add"]);

        let summaries = core.list_patients().unwrap();
        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].last_bmi_status.as_deref(), Some("Overweight"));
        assert_eq!(
            core.list_patients_by_visit_date("2024-05-24".into()).unwrap().len(),
            1
        );
    }

    #[test]
    fn test_invalid_input_surfaces_as_error() {
        let core = core();

        let mut bad_date = new_patient("P-001");
        bad_date.registration_date = "24/05/2024".into();
        assert!(matches!(
            core.register_patient(bad_date),
            Err(PatientSyncError::InvalidInput(_))
        ));

        core.register_patient(new_patient("P-001")).unwrap();
        assert!(matches!(
            core.register_patient(new_patient("P-001")),
            Err(PatientSyncError::Duplicate(_))
        ));

        assert!(matches!(
            core.save_general_assessment(FfiGeneralAssessmentInput {
                patient_id: "x".into(),
                visit_date: "2024-05-24".into(),
                general_health: "fine".into(),
                ever_on_diet: false,
                comments: "c".into(),
            }),
            Err(PatientSyncError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_sync_now_records_outcome() {
        let core = core();
        core.register_patient(new_patient("P-001")).unwrap();

        let outcome = core.request_sync_now().unwrap();
        assert!(!outcome.succeeded);
        assert_eq!(outcome.remaining, 1);

        let status = core.sync_state().unwrap();
        assert_eq!(status.state, "finished");
        assert!(status.last_sync_at.is_some());
        assert_eq!(
            status.last_sync_outcome.as_deref(),
            Some("partially failed: 0 synced, 1 remaining")
        );

        let pending = core.list_pending().unwrap();
        assert_eq!(pending[0].attempt_count, 1);
    }

    #[test]
    fn test_scheduler_start_stop() {
        let core = core();
        core.start_periodic_sync().unwrap();
        core.start_periodic_sync().unwrap();
        core.set_network_available(false);
        core.stop_periodic_sync().unwrap();
        core.stop_periodic_sync().unwrap();
    }

    #[test]
    fn test_open_core_from_json() {
        let core = open_core(r#"{"base_url":"http://127.0.0.1:9"}"#.into()).unwrap();
        assert_eq!(core.pending_count().unwrap(), 0);
        assert!(matches!(
            open_core(r#"{"base_url":"not a url"}"#.into()),
            Err(PatientSyncError::ConfigError(_))
        ));
    }
}
