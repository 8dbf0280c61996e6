//! Key/value bookkeeping for sync runs.

use rusqlite::{params, OptionalExtension};

use super::{Database, DbResult};

/// RFC 3339 time of the last completed sync run.
pub const LAST_SYNC_AT: &str = "last_sync_at";

/// Short description of the last completed sync run.
pub const LAST_SYNC_OUTCOME: &str = "last_sync_outcome";

impl Database {
    /// Get sync state value.
    pub fn get_sync_state(&self, key: &str) -> DbResult<Option<String>> {
        self.conn
            .query_row(
                "SELECT value FROM sync_state WHERE key = ?",
                [key],
                |row| row.get(0),
            )
            .optional()
            .map_err(Into::into)
    }

    /// Set sync state value.
    pub fn set_sync_state(&self, key: &str, value: &str) -> DbResult<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO sync_state (key, value, updated_at) VALUES (?, ?, datetime('now'))",
            params![key, value],
        )?;
        Ok(())
    }

    /// Record the end of a sync run.
    pub fn record_sync_run(&self, finished_at: &str, outcome: &str) -> DbResult<()> {
        let tx = self.conn.unchecked_transaction()?;
        tx.execute(
            "INSERT OR REPLACE INTO sync_state (key, value, updated_at) VALUES (?, ?, datetime('now'))",
            params![LAST_SYNC_AT, finished_at],
        )?;
        tx.execute(
            "INSERT OR REPLACE INTO sync_state (key, value, updated_at) VALUES (?, ?, datetime('now'))",
            params![LAST_SYNC_OUTCOME, outcome],
        )?;
        tx.commit()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sync_state() {
        let db = Database::open_in_memory().unwrap();

        // Default values from schema
        assert_eq!(db.get_sync_state(LAST_SYNC_AT).unwrap(), Some("".to_string()));
        assert_eq!(db.get_sync_state("unknown").unwrap(), None);

        db.record_sync_run("2024-05-24T10:00:00Z", "succeeded: 3 synced")
            .unwrap();
        assert_eq!(
            db.get_sync_state(LAST_SYNC_AT).unwrap().as_deref(),
            Some("2024-05-24T10:00:00Z")
        );
        assert_eq!(
            db.get_sync_state(LAST_SYNC_OUTCOME).unwrap().as_deref(),
            Some("succeeded: 3 synced")
        );

        db.set_sync_state(LAST_SYNC_OUTCOME, "").unwrap();
        assert_eq!(db.get_sync_state(LAST_SYNC_OUTCOME).unwrap().as_deref(), Some(""));
    }
}
