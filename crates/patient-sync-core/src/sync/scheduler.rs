//! Background sync driven by a timer and by connectivity changes.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info};

use super::SyncOrchestrator;
use crate::gateway::RemoteGateway;

/// Default period between background runs (15 minutes).
pub const DEFAULT_SYNC_INTERVAL: Duration = Duration::from_secs(15 * 60);

/// Network availability as reported by the host platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectivityState {
    Online,
    Offline,
}

/// Runs the orchestrator on a timer while online, and immediately when the
/// network comes back.
pub struct SyncScheduler<G> {
    orchestrator: Arc<SyncOrchestrator<G>>,
    connectivity: watch::Receiver<ConnectivityState>,
    interval: Duration,
}

/// Handle to a running scheduler. Dropping it also stops the loop.
pub struct SchedulerHandle {
    shutdown: oneshot::Sender<()>,
    task: JoinHandle<()>,
}

impl SchedulerHandle {
    /// Stop the loop and wait for it to exit. An in-flight run completes first.
    pub async fn shutdown(self) {
        let _ = self.shutdown.send(());
        if let Err(e) = self.task.await {
            error!(error = %e, "Sync scheduler task failed");
        }
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl<G: RemoteGateway + 'static> SyncScheduler<G> {
    pub fn new(
        orchestrator: Arc<SyncOrchestrator<G>>,
        connectivity: watch::Receiver<ConnectivityState>,
        interval: Duration,
    ) -> Self {
        Self {
            orchestrator,
            connectivity,
            interval,
        }
    }

    /// Spawn the loop on the current tokio runtime.
    pub fn spawn(self) -> SchedulerHandle {
        let (shutdown, shutdown_rx) = oneshot::channel();
        let task = tokio::spawn(self.run(shutdown_rx));
        SchedulerHandle { shutdown, task }
    }

    async fn run(mut self, mut shutdown: oneshot::Receiver<()>) {
        info!(interval_secs = self.interval.as_secs(), "Sync scheduler started");

        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut last = *self.connectivity.borrow_and_update();

        loop {
            tokio::select! {
                _ = &mut shutdown => break,
                _ = ticker.tick() => {
                    if last == ConnectivityState::Online {
                        self.run_if_pending("periodic").await;
                    }
                }
                changed = self.connectivity.changed() => {
                    if changed.is_err() {
                        debug!("Connectivity source closed");
                        break;
                    }
                    let now = *self.connectivity.borrow_and_update();
                    if last == ConnectivityState::Offline && now == ConnectivityState::Online {
                        self.run_if_pending("reconnect").await;
                    }
                    last = now;
                }
            }
        }

        info!("Sync scheduler stopped");
    }

    async fn run_if_pending(&self, trigger: &'static str) {
        match self.orchestrator.pending_count().await {
            Ok(0) => debug!(trigger, "Queue empty, skipping sync"),
            Ok(pending) => {
                debug!(trigger, pending, "Starting background sync");
                if let Err(e) = self.orchestrator.run_once().await {
                    error!(trigger, error = %e, "Background sync failed");
                }
            }
            Err(e) => error!(trigger, error = %e, "Failed to read queue depth"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;
    use crate::gateway::{
        PushOutcome, RegisterPatientRequest, ServerData, VisitRequest, VitalsRequest,
    };
    use crate::models::Endpoint;
    use crate::sync::share;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::time::{sleep, timeout, Instant};

    #[derive(Default)]
    struct CountingGateway {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl RemoteGateway for CountingGateway {
        async fn register_patient(&self, _: &RegisterPatientRequest) -> PushOutcome {
            self.calls.fetch_add(1, Ordering::SeqCst);
            PushOutcome::Ok(ServerData::default())
        }

        async fn add_vitals(&self, _: &VitalsRequest) -> PushOutcome {
            self.calls.fetch_add(1, Ordering::SeqCst);
            PushOutcome::Ok(ServerData::default())
        }

        async fn add_visit(&self, _: &VisitRequest) -> PushOutcome {
            self.calls.fetch_add(1, Ordering::SeqCst);
            PushOutcome::Ok(ServerData::default())
        }
    }

    fn orchestrator_with_one_queued() -> (Arc<SyncOrchestrator<CountingGateway>>, Arc<CountingGateway>) {
        let db = share(Database::open_in_memory().unwrap());
        let payload = serde_json::to_string(&RegisterPatientRequest {
            firstname: "A".into(),
            lastname: "B".into(),
            unique: "P-1".into(),
            dob: String::new(),
            gender: String::new(),
            reg_date: "2024-05-24".into(),
        })
        .unwrap();
        db.lock()
            .unwrap()
            .enqueue_operation(Endpoint::RegisterPatient, &payload, None)
            .unwrap();

        let gateway = Arc::new(CountingGateway::default());
        (Arc::new(SyncOrchestrator::new(db, gateway.clone())), gateway)
    }

    async fn wait_for_drain(orchestrator: &SyncOrchestrator<CountingGateway>) {
        let deadline = Instant::now() + Duration::from_secs(5);
        while orchestrator.pending_count().await.unwrap() > 0 {
            assert!(Instant::now() < deadline, "queue was not drained");
            sleep(Duration::from_millis(10)).await;
        }
    }

    #[tokio::test]
    async fn test_periodic_run_while_online() {
        let (orchestrator, gateway) = orchestrator_with_one_queued();
        let (_tx, rx) = watch::channel(ConnectivityState::Online);

        let handle = SyncScheduler::new(orchestrator.clone(), rx, Duration::from_millis(20)).spawn();
        wait_for_drain(&orchestrator).await;
        handle.shutdown().await;

        assert_eq!(gateway.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_offline_does_not_sync() {
        let (orchestrator, gateway) = orchestrator_with_one_queued();
        let (_tx, rx) = watch::channel(ConnectivityState::Offline);

        let handle = SyncScheduler::new(orchestrator.clone(), rx, Duration::from_millis(10)).spawn();
        sleep(Duration::from_millis(100)).await;
        handle.shutdown().await;

        assert_eq!(gateway.calls.load(Ordering::SeqCst), 0);
        assert_eq!(orchestrator.pending_count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_reconnect_triggers_immediate_run() {
        let (orchestrator, gateway) = orchestrator_with_one_queued();
        let (tx, rx) = watch::channel(ConnectivityState::Offline);

        // Interval long enough that only the reconnect can trigger a run
        let handle = SyncScheduler::new(orchestrator.clone(), rx, Duration::from_secs(3600)).spawn();
        sleep(Duration::from_millis(20)).await;
        tx.send(ConnectivityState::Online).unwrap();

        timeout(Duration::from_secs(5), wait_for_drain(&orchestrator))
            .await
            .unwrap();
        handle.shutdown().await;

        assert_eq!(gateway.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_shutdown_stops_loop() {
        let (orchestrator, _) = orchestrator_with_one_queued();
        let (_tx, rx) = watch::channel(ConnectivityState::Offline);

        let handle = SyncScheduler::new(orchestrator, rx, Duration::from_millis(10)).spawn();
        assert!(!handle.is_finished());
        timeout(Duration::from_secs(1), handle.shutdown()).await.unwrap();
    }
}
