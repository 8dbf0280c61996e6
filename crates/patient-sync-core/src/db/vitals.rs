//! Vitals database operations.

use chrono::NaiveDate;
use rusqlite::{params, OptionalExtension, Row};

use super::patients::column_date;
use super::{map_constraint, Database, DbError, DbResult};
use crate::models::{format_date, Vitals};

const VITALS_COLUMNS: &str =
    "local_id, patient_id, visit_date, height_cm, weight_kg, bmi, remote_id, created_at";

/// Result of linking a vitals row to its remote identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteIdUpdate {
    /// The identifier was stored.
    Applied,
    /// The row already carried this identifier.
    Unchanged,
    /// The row already carries a different identifier; left untouched.
    Conflict { existing: i64 },
    /// No such vitals row.
    Missing,
}

impl Database {
    /// Insert a vitals record.
    pub fn insert_vitals(&self, vitals: &Vitals) -> DbResult<()> {
        self.conn
            .execute(
                r#"
                INSERT INTO vitals (
                    local_id, patient_id, visit_date, height_cm, weight_kg,
                    bmi, remote_id, created_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                "#,
                params![
                    vitals.local_id,
                    vitals.patient_id,
                    format_date(vitals.visit_date),
                    vitals.height_cm,
                    vitals.weight_kg,
                    vitals.bmi,
                    vitals.remote_id,
                    vitals.created_at,
                ],
            )
            .map_err(|e| map_constraint(e, "vitals"))?;
        Ok(())
    }

    /// Get vitals by local ID.
    pub fn get_vitals(&self, local_id: &str) -> DbResult<Option<Vitals>> {
        self.conn
            .query_row(
                &format!("SELECT {VITALS_COLUMNS} FROM vitals WHERE local_id = ?"),
                [local_id],
                VitalsRow::from_row,
            )
            .optional()?
            .map(Vitals::try_from)
            .transpose()
    }

    /// Find the vitals recorded for a patient on a visit date.
    pub fn find_vitals_for_visit(
        &self,
        patient_id: &str,
        visit_date: NaiveDate,
    ) -> DbResult<Option<Vitals>> {
        self.conn
            .query_row(
                &format!(
                    "SELECT {VITALS_COLUMNS} FROM vitals WHERE patient_id = ?1 AND visit_date = ?2"
                ),
                params![patient_id, format_date(visit_date)],
                VitalsRow::from_row,
            )
            .optional()?
            .map(Vitals::try_from)
            .transpose()
    }

    /// Check whether vitals already exist for a patient on a visit date.
    pub fn vitals_exist_for_visit(&self, patient_id: &str, visit_date: NaiveDate) -> DbResult<bool> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM vitals WHERE patient_id = ?1 AND visit_date = ?2",
            params![patient_id, format_date(visit_date)],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    /// Most recent vitals for a patient.
    pub fn latest_vitals_for_patient(&self, patient_id: &str) -> DbResult<Option<Vitals>> {
        self.conn
            .query_row(
                &format!(
                    "SELECT {VITALS_COLUMNS} FROM vitals WHERE patient_id = ? \
                     ORDER BY visit_date DESC LIMIT 1"
                ),
                [patient_id],
                VitalsRow::from_row,
            )
            .optional()?
            .map(Vitals::try_from)
            .transpose()
    }

    /// All vitals for a patient, newest first.
    pub fn list_vitals_for_patient(&self, patient_id: &str) -> DbResult<Vec<Vitals>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {VITALS_COLUMNS} FROM vitals WHERE patient_id = ? ORDER BY visit_date DESC"
        ))?;

        let rows = stmt.query_map([patient_id], VitalsRow::from_row)?;

        let mut vitals = Vec::new();
        for row in rows {
            vitals.push(row?.try_into()?);
        }
        Ok(vitals)
    }

    /// Link a vitals row to the identifier assigned by the remote API.
    ///
    /// The identifier is written at most once. Writing the same value again
    /// is a no-op; a different value is refused.
    pub fn update_vitals_remote_id(&self, local_id: &str, remote_id: i64) -> DbResult<RemoteIdUpdate> {
        let rows_affected = self.conn.execute(
            "UPDATE vitals SET remote_id = ?1 WHERE local_id = ?2 AND remote_id IS NULL",
            params![remote_id, local_id],
        )?;
        if rows_affected > 0 {
            return Ok(RemoteIdUpdate::Applied);
        }

        let existing: Option<Option<i64>> = self
            .conn
            .query_row(
                "SELECT remote_id FROM vitals WHERE local_id = ?",
                [local_id],
                |row| row.get(0),
            )
            .optional()?;

        Ok(match existing {
            None => RemoteIdUpdate::Missing,
            Some(Some(id)) if id == remote_id => RemoteIdUpdate::Unchanged,
            Some(Some(id)) => RemoteIdUpdate::Conflict { existing: id },
            // Cleared between the two statements; nothing sensible to report
            Some(None) => RemoteIdUpdate::Missing,
        })
    }
}

/// Intermediate row struct for database mapping.
struct VitalsRow {
    local_id: String,
    patient_id: String,
    visit_date: String,
    height_cm: f64,
    weight_kg: f64,
    bmi: f64,
    remote_id: Option<i64>,
    created_at: String,
}

impl VitalsRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(VitalsRow {
            local_id: row.get(0)?,
            patient_id: row.get(1)?,
            visit_date: row.get(2)?,
            height_cm: row.get(3)?,
            weight_kg: row.get(4)?,
            bmi: row.get(5)?,
            remote_id: row.get(6)?,
            created_at: row.get(7)?,
        })
    }
}

impl TryFrom<VitalsRow> for Vitals {
    type Error = DbError;

    fn try_from(row: VitalsRow) -> Result<Self, Self::Error> {
        Ok(Vitals {
            local_id: row.local_id,
            patient_id: row.patient_id,
            visit_date: column_date(&row.visit_date)?,
            height_cm: row.height_cm,
            weight_kg: row.weight_kg,
            bmi: row.bmi,
            remote_id: row.remote_id,
            created_at: row.created_at,
        })
    }
}
