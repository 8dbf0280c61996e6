//! Offline-first delivery of local writes to the remote API.
//!
//! - [`WriteCoordinator`] commits a record locally, pushes it once and queues
//!   it on failure.
//! - [`SyncOrchestrator`] replays the queue in FIFO order.
//! - [`SyncScheduler`] drives the orchestrator periodically and on
//!   reconnect.

mod coordinator;
mod orchestrator;
pub mod payload;
mod scheduler;

pub use coordinator::*;
pub use orchestrator::*;
pub use scheduler::*;

use std::sync::{Arc, Mutex};

use thiserror::Error;

use crate::db::{Database, DbError};

/// Database handle shared by the coordinator, orchestrator and FFI layer.
pub type SharedDatabase = Arc<Mutex<Database>>;

/// Sync engine errors.
///
/// Remote failures are never reported here; they end up in the queue.
#[derive(Error, Debug)]
pub enum SyncError {
    #[error("Database error: {0}")]
    Database(#[from] DbError),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Duplicate: {0}")]
    Duplicate(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Background task failed: {0}")]
    Task(String),
}

pub type SyncResult<T> = Result<T, SyncError>;

/// Wrap a database in a [`SharedDatabase`].
pub fn share(db: Database) -> SharedDatabase {
    Arc::new(Mutex::new(db))
}

/// Run `f` against the database on the blocking pool.
///
/// The lock is held only for the duration of `f`.
pub(crate) async fn with_db<T, F>(db: &SharedDatabase, f: F) -> SyncResult<T>
where
    T: Send + 'static,
    F: FnOnce(&Database) -> SyncResult<T> + Send + 'static,
{
    let db = Arc::clone(db);
    tokio::task::spawn_blocking(move || {
        let guard = db
            .lock()
            .map_err(|e| SyncError::Task(format!("Lock poisoned: {}", e)))?;
        f(&guard)
    })
    .await
    .map_err(|e| SyncError::Task(e.to_string()))?
}
