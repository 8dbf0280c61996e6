//! Queue replay.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, SecondsFormat, Utc};
use tokio::sync::{watch, Mutex as TokioMutex};
use tracing::{debug, error, info, warn};

use super::payload::OutboundRequest;
use super::{with_db, SharedDatabase, SyncError, SyncResult};
use crate::db::{RemoteIdUpdate, LAST_SYNC_AT, LAST_SYNC_OUTCOME};
use crate::gateway::{PushOutcome, RemoteGateway, VitalsRequest};
use crate::models::{parse_date, PendingOperation};

/// Result of one pass over the queue snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncRunOutcome {
    /// Every operation in the snapshot was delivered.
    Succeeded { synced: u32 },
    /// Some operations are still queued.
    PartiallyFailed { synced: u32, remaining: u32 },
}

impl fmt::Display for SyncRunOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncRunOutcome::Succeeded { synced } => write!(f, "succeeded: {} synced", synced),
            SyncRunOutcome::PartiallyFailed { synced, remaining } => {
                write!(f, "partially failed: {} synced, {} remaining", synced, remaining)
            }
        }
    }
}

/// Observable run state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncState {
    Idle,
    Draining { total: u32, processed: u32 },
    Finished(SyncRunOutcome),
}

/// Drains the pending queue through a [`RemoteGateway`].
///
/// Runs are serialized: a request made while a run is in flight waits for it
/// and then works from a fresh snapshot.
pub struct SyncOrchestrator<G> {
    db: SharedDatabase,
    gateway: Arc<G>,
    run_lock: TokioMutex<()>,
    state: watch::Sender<SyncState>,
}

impl<G: RemoteGateway + 'static> SyncOrchestrator<G> {
    pub fn new(db: SharedDatabase, gateway: Arc<G>) -> Self {
        let (state, _) = watch::channel(SyncState::Idle);
        Self {
            db,
            gateway,
            run_lock: TokioMutex::new(()),
            state,
        }
    }

    /// Subscribe to run state changes.
    pub fn subscribe(&self) -> watch::Receiver<SyncState> {
        self.state.subscribe()
    }

    pub fn state(&self) -> SyncState {
        *self.state.borrow()
    }

    pub async fn pending_count(&self) -> SyncResult<u32> {
        with_db(&self.db, |db| Ok(db.count_pending_operations()?)).await
    }

    pub async fn list_pending(&self) -> SyncResult<Vec<PendingOperation>> {
        with_db(&self.db, |db| Ok(db.list_pending_operations()?)).await
    }

    /// User-initiated sync. Runs regardless of connectivity.
    pub async fn request_sync_now(&self) -> SyncResult<SyncRunOutcome> {
        info!("Sync requested");
        self.run_once().await
    }

    /// Drop operations that have failed at least `max_attempts` times and
    /// were queued before `older_than`.
    pub async fn purge_stale(
        &self,
        max_attempts: u32,
        older_than: DateTime<Utc>,
    ) -> SyncResult<usize> {
        let removed = with_db(&self.db, move |db| {
            Ok(db.purge_pending_operations(max_attempts, older_than)?)
        })
        .await?;
        if removed > 0 {
            warn!(removed, max_attempts, "Purged stale pending operations");
        }
        Ok(removed)
    }

    /// Replay a snapshot of the queue in FIFO order.
    ///
    /// Only a failure to read the snapshot is returned as an error. Per-item
    /// failures are recorded on the item and the run moves on.
    pub async fn run_once(&self) -> SyncResult<SyncRunOutcome> {
        let _guard = self.run_lock.lock().await;

        let snapshot = with_db(&self.db, |db| Ok(db.list_pending_operations()?)).await?;
        let total = snapshot.len() as u32;
        self.state.send_replace(SyncState::Draining { total, processed: 0 });
        debug!(total, "Sync run started");

        let mut synced = 0u32;
        for (index, op) in snapshot.iter().enumerate() {
            if self.replay(op).await {
                synced += 1;
            }
            self.state.send_replace(SyncState::Draining {
                total,
                processed: index as u32 + 1,
            });
        }

        let remaining = total - synced;
        let outcome = if remaining == 0 {
            SyncRunOutcome::Succeeded { synced }
        } else {
            SyncRunOutcome::PartiallyFailed { synced, remaining }
        };

        let finished_at = Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true);
        let summary = outcome.to_string();
        if let Err(e) = with_db(&self.db, move |db| {
            Ok(db.record_sync_run(&finished_at, &summary)?)
        })
        .await
        {
            warn!(error = %e, "Failed to record sync run");
        }

        info!(synced, remaining, "Sync run finished");
        self.state.send_replace(SyncState::Finished(outcome));
        Ok(outcome)
    }

    /// Replay one operation. Returns true once it is off the queue.
    async fn replay(&self, op: &PendingOperation) -> bool {
        let request = match OutboundRequest::decode(op.endpoint, &op.payload) {
            Ok(request) => request,
            Err(e) => {
                error!(op_id = op.id, endpoint = %op.endpoint, error = %e, "Undecodable payload");
                self.record_failure(op, format!("undecodable payload: {}", e))
                    .await;
                return false;
            }
        };

        let outcome = request.push(self.gateway.as_ref()).await;
        let data = match outcome {
            PushOutcome::Ok(data) => data,
            other => {
                let message = other.failure_message().unwrap_or_default();
                self.record_failure(op, message).await;
                return false;
            }
        };

        // The vitals link must land before the queue entry goes away
        if let (OutboundRequest::AddVitals(vitals), Some(remote_id)) = (&request, data.id) {
            if let Err(e) = self.apply_vitals_id(op, vitals.clone(), remote_id).await {
                error!(op_id = op.id, error = %e, "Failed to store vitals remote ID");
                self.record_failure(op, format!("local update failed: {}", e))
                    .await;
                return false;
            }
        }

        let id = op.id;
        match with_db(&self.db, move |db| Ok(db.remove_pending_operation(id)?)).await {
            Ok(_) => {
                debug!(op_id = op.id, endpoint = %op.endpoint, attempt = op.attempt_count + 1, "Operation delivered");
                true
            }
            Err(e) => {
                // Delivered but still queued; the next run replays it harmlessly
                error!(op_id = op.id, error = %e, "Failed to remove delivered operation");
                false
            }
        }
    }

    async fn apply_vitals_id(
        &self,
        op: &PendingOperation,
        request: VitalsRequest,
        remote_id: i64,
    ) -> SyncResult<()> {
        let visit_date = parse_date(&request.visit_date).map_err(|_| {
            SyncError::InvalidInput(format!("Invalid visit date: {}", request.visit_date))
        })?;

        let update = with_db(&self.db, move |db| {
            let Some(patient) = db.get_patient_by_number(&request.patient_id)? else {
                return Ok(None);
            };
            let Some(vitals) = db.find_vitals_for_visit(&patient.local_id, visit_date)? else {
                return Ok(None);
            };
            Ok(Some(db.update_vitals_remote_id(&vitals.local_id, remote_id)?))
        })
        .await?;

        match update {
            Some(RemoteIdUpdate::Applied) | Some(RemoteIdUpdate::Unchanged) => {
                debug!(op_id = op.id, remote_id, "Vitals linked to remote record");
            }
            Some(RemoteIdUpdate::Conflict { existing }) => {
                warn!(op_id = op.id, remote_id, existing, "Vitals already linked to a different remote record");
            }
            Some(RemoteIdUpdate::Missing) | None => {
                warn!(op_id = op.id, remote_id, "No local vitals for delivered operation");
            }
        }
        Ok(())
    }

    async fn record_failure(&self, op: &PendingOperation, message: String) {
        let id = op.id;
        let stored = message.clone();
        let result =
            with_db(&self.db, move |db| Ok(db.record_operation_failure(id, &stored)?)).await;

        match result {
            Ok(_) => warn!(
                op_id = op.id,
                endpoint = %op.endpoint,
                attempt = op.attempt_count + 1,
                error = %message,
                "Replay failed"
            ),
            Err(e) => error!(op_id = op.id, error = %e, "Failed to record replay failure"),
        }
    }
}
