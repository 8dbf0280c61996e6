//! Pending operation queue.
//!
//! Operations are replayed in ascending `created_at` order. `created_at` is a
//! logical clock value drawn from `queue_clock` in the same transaction as the
//! insert, so it never repeats, even after the queue drains or the app
//! restarts.

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, OptionalExtension, Row};

use super::{Database, DbError, DbResult};
use crate::models::{Endpoint, PendingOperation};

const PENDING_COLUMNS: &str =
    "id, endpoint, payload, created_at, attempt_count, last_error, enqueued_at";

fn wall_clock(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Secs, true)
}

impl Database {
    /// Append an operation to the queue and return its ID.
    pub fn enqueue_operation(
        &self,
        endpoint: Endpoint,
        payload: &str,
        last_error: Option<&str>,
    ) -> DbResult<i64> {
        let tx = self.conn.unchecked_transaction()?;

        tx.execute("UPDATE queue_clock SET value = value + 1 WHERE id = 1", [])?;
        let created_at: i64 =
            tx.query_row("SELECT value FROM queue_clock WHERE id = 1", [], |row| row.get(0))?;

        tx.execute(
            r#"
            INSERT INTO pending_operations (
                endpoint, payload, created_at, attempt_count, last_error, enqueued_at
            ) VALUES (?1, ?2, ?3, 0, ?4, ?5)
            "#,
            params![
                endpoint.as_str(),
                payload,
                created_at,
                last_error,
                wall_clock(Utc::now()),
            ],
        )?;
        let id = tx.last_insert_rowid();

        tx.commit()?;
        Ok(id)
    }

    /// All queued operations, oldest first.
    pub fn list_pending_operations(&self) -> DbResult<Vec<PendingOperation>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {PENDING_COLUMNS} FROM pending_operations ORDER BY created_at ASC"
        ))?;

        let rows = stmt.query_map([], PendingRow::from_row)?;

        let mut operations = Vec::new();
        for row in rows {
            operations.push(row?.try_into()?);
        }
        Ok(operations)
    }

    pub fn get_pending_operation(&self, id: i64) -> DbResult<Option<PendingOperation>> {
        self.conn
            .query_row(
                &format!("SELECT {PENDING_COLUMNS} FROM pending_operations WHERE id = ?"),
                [id],
                PendingRow::from_row,
            )
            .optional()?
            .map(PendingOperation::try_from)
            .transpose()
    }

    /// Remove an acknowledged operation. Removing an unknown ID is a no-op.
    pub fn remove_pending_operation(&self, id: i64) -> DbResult<bool> {
        let rows_affected = self
            .conn
            .execute("DELETE FROM pending_operations WHERE id = ?", [id])?;
        Ok(rows_affected > 0)
    }

    /// Bump the attempt count and store the latest failure message.
    ///
    /// Returns false when the operation no longer exists.
    pub fn record_operation_failure(&self, id: i64, error: &str) -> DbResult<bool> {
        let rows_affected = self.conn.execute(
            r#"
            UPDATE pending_operations
            SET attempt_count = attempt_count + 1, last_error = ?1
            WHERE id = ?2
            "#,
            params![error, id],
        )?;
        Ok(rows_affected > 0)
    }

    pub fn count_pending_operations(&self) -> DbResult<u32> {
        let count: i64 =
            self.conn
                .query_row("SELECT COUNT(*) FROM pending_operations", [], |row| row.get(0))?;
        Ok(count as u32)
    }

    /// Delete operations that have failed at least `max_attempts` times and
    /// were enqueued before `older_than`. Returns the number removed.
    ///
    /// Maintenance only; replay never calls this.
    pub fn purge_pending_operations(
        &self,
        max_attempts: u32,
        older_than: DateTime<Utc>,
    ) -> DbResult<usize> {
        let removed = self.conn.execute(
            "DELETE FROM pending_operations WHERE attempt_count >= ?1 AND enqueued_at < ?2",
            params![max_attempts, wall_clock(older_than)],
        )?;
        Ok(removed)
    }
}

/// Intermediate row struct for database mapping.
struct PendingRow {
    id: i64,
    endpoint: String,
    payload: String,
    created_at: i64,
    attempt_count: u32,
    last_error: Option<String>,
    enqueued_at: String,
}

impl PendingRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(PendingRow {
            id: row.get(0)?,
            endpoint: row.get(1)?,
            payload: row.get(2)?,
            created_at: row.get(3)?,
            attempt_count: row.get(4)?,
            last_error: row.get(5)?,
            enqueued_at: row.get(6)?,
        })
    }
}

impl TryFrom<PendingRow> for PendingOperation {
    type Error = DbError;

    fn try_from(row: PendingRow) -> Result<Self, Self::Error> {
        let endpoint = Endpoint::from_tag(&row.endpoint)
            .ok_or_else(|| DbError::Constraint(format!("Unknown endpoint: {}", row.endpoint)))?;

        Ok(PendingOperation {
            id: row.id,
            endpoint,
            payload: row.payload,
            created_at: row.created_at,
            attempt_count: row.attempt_count,
            last_error: row.last_error,
            enqueued_at: row.enqueued_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn setup_db() -> Database {
        Database::open_in_memory().unwrap()
    }

    #[test]
    fn test_enqueue_assigns_increasing_created_at() {
        let db = setup_db();
        let a = db.enqueue_operation(Endpoint::RegisterPatient, r#"{"a":1}"#, None).unwrap();
        let b = db.enqueue_operation(Endpoint::AddVitals, r#"{"b":2}"#, Some("offline")).unwrap();

        let ops = db.list_pending_operations().unwrap();
        assert_eq!(ops.len(), 2);
        assert_eq!(ops[0].id, a);
        assert_eq!(ops[1].id, b);
        assert!(ops[0].created_at < ops[1].created_at);
        assert_eq!(ops[0].attempt_count, 0);
        assert_eq!(ops[1].last_error.as_deref(), Some("offline"));
        assert_eq!(ops[1].endpoint, Endpoint::AddVitals);
    }

    #[test]
    fn test_clock_not_reused_after_drain() {
        let db = setup_db();
        let first = db.enqueue_operation(Endpoint::AddVisit, "{}", None).unwrap();
        let first_created = db.get_pending_operation(first).unwrap().unwrap().created_at;
        assert!(db.remove_pending_operation(first).unwrap());
        assert_eq!(db.count_pending_operations().unwrap(), 0);

        let second = db.enqueue_operation(Endpoint::AddVisit, "{}", None).unwrap();
        let second_created = db.get_pending_operation(second).unwrap().unwrap().created_at;
        assert!(second_created > first_created);
    }

    #[test]
    fn test_remove_is_idempotent() {
        let db = setup_db();
        let id = db.enqueue_operation(Endpoint::AddVisit, "{}", None).unwrap();

        assert!(db.remove_pending_operation(id).unwrap());
        assert!(!db.remove_pending_operation(id).unwrap());
        assert!(!db.remove_pending_operation(9999).unwrap());
    }

    #[test]
    fn test_record_failure_keeps_payload_and_order() {
        let db = setup_db();
        let a = db.enqueue_operation(Endpoint::RegisterPatient, "{\"n\":1}", None).unwrap();
        let b = db.enqueue_operation(Endpoint::RegisterPatient, "{\"n\":2}", None).unwrap();

        assert!(db.record_operation_failure(a, "HTTP 500").unwrap());
        assert!(db.record_operation_failure(a, "timed out").unwrap());
        assert!(!db.record_operation_failure(9999, "gone").unwrap());

        let ops = db.list_pending_operations().unwrap();
        assert_eq!(ops[0].id, a);
        assert_eq!(ops[0].attempt_count, 2);
        assert_eq!(ops[0].last_error.as_deref(), Some("timed out"));
        assert_eq!(ops[0].payload, "{\"n\":1}");
        assert_eq!(ops[1].id, b);
        assert_eq!(ops[1].attempt_count, 0);
    }

    #[test]
    fn test_purge_requires_both_thresholds() {
        let db = setup_db();
        let stale = db.enqueue_operation(Endpoint::AddVitals, "{}", None).unwrap();
        let fresh = db.enqueue_operation(Endpoint::AddVitals, "{}", None).unwrap();
        for _ in 0..3 {
            db.record_operation_failure(stale, "rejected").unwrap();
        }

        // Nothing is old enough yet
        let removed = db
            .purge_pending_operations(3, Utc::now() - Duration::hours(1))
            .unwrap();
        assert_eq!(removed, 0);

        let removed = db
            .purge_pending_operations(3, Utc::now() + Duration::hours(1))
            .unwrap();
        assert_eq!(removed, 1);

        let remaining: Vec<i64> = db
            .list_pending_operations()
            .unwrap()
            .iter()
            .map(|op| op.id)
            .collect();
        assert_eq!(remaining, vec![fresh]);
    }
}
