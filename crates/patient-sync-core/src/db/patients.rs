//! Patient database operations.

use rusqlite::{params, OptionalExtension, Row};

use super::{map_constraint, Database, DbError, DbResult};
use crate::models::{format_date, parse_date, Patient, PatientSummary};

const PATIENT_COLUMNS: &str = "local_id, patient_number, first_name, last_name, \
     date_of_birth, gender, registration_date, created_at";

impl Database {
    /// Insert a new patient.
    pub fn insert_patient(&self, patient: &Patient) -> DbResult<()> {
        self.conn
            .execute(
                r#"
                INSERT INTO patients (
                    local_id, patient_number, first_name, last_name,
                    date_of_birth, gender, registration_date, created_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                "#,
                params![
                    patient.local_id,
                    patient.patient_number,
                    patient.first_name,
                    patient.last_name,
                    patient.date_of_birth.map(format_date),
                    patient.gender,
                    format_date(patient.registration_date),
                    patient.created_at,
                ],
            )
            .map_err(|e| map_constraint(e, "patient"))?;
        Ok(())
    }

    /// Get a patient by local ID.
    pub fn get_patient(&self, local_id: &str) -> DbResult<Option<Patient>> {
        self.conn
            .query_row(
                &format!("SELECT {PATIENT_COLUMNS} FROM patients WHERE local_id = ?"),
                [local_id],
                PatientRow::from_row,
            )
            .optional()?
            .map(Patient::try_from)
            .transpose()
    }

    /// Get a patient by clinic patient number.
    pub fn get_patient_by_number(&self, patient_number: &str) -> DbResult<Option<Patient>> {
        self.conn
            .query_row(
                &format!("SELECT {PATIENT_COLUMNS} FROM patients WHERE patient_number = ?"),
                [patient_number],
                PatientRow::from_row,
            )
            .optional()?
            .map(Patient::try_from)
            .transpose()
    }

    /// Count patients sharing a patient number (uniqueness check).
    pub fn count_patients_with_number(&self, patient_number: &str) -> DbResult<u32> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM patients WHERE patient_number = ?",
            [patient_number],
            |row| row.get(0),
        )?;
        Ok(count as u32)
    }

    /// List all patients ordered by last name, first name.
    pub fn list_patients(&self) -> DbResult<Vec<Patient>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {PATIENT_COLUMNS} FROM patients ORDER BY last_name, first_name"
        ))?;

        let rows = stmt.query_map([], PatientRow::from_row)?;

        let mut patients = Vec::new();
        for row in rows {
            patients.push(row?.try_into()?);
        }
        Ok(patients)
    }

    /// List patients with the BMI and date of their latest vitals, if any.
    pub fn list_patients_with_last_vitals(&self) -> DbResult<Vec<PatientSummary>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT p.local_id, p.patient_number, p.first_name, p.last_name,
                   p.date_of_birth, p.gender, p.registration_date, p.created_at,
                   v.bmi, v.visit_date
            FROM patients p
            LEFT JOIN vitals v ON v.local_id = (
                SELECT v2.local_id FROM vitals v2
                WHERE v2.patient_id = p.local_id
                ORDER BY v2.visit_date DESC
                LIMIT 1
            )
            ORDER BY p.last_name, p.first_name
            "#,
        )?;

        let rows = stmt.query_map([], SummaryRow::from_row)?;

        let mut summaries = Vec::new();
        for row in rows {
            summaries.push(row?.try_into()?);
        }
        Ok(summaries)
    }

    /// List patients seen on a visit date, with that visit's BMI.
    pub fn list_patients_by_visit_date(
        &self,
        visit_date: chrono::NaiveDate,
    ) -> DbResult<Vec<PatientSummary>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT p.local_id, p.patient_number, p.first_name, p.last_name,
                   p.date_of_birth, p.gender, p.registration_date, p.created_at,
                   v.bmi, v.visit_date
            FROM patients p
            JOIN vitals v ON v.patient_id = p.local_id
            WHERE v.visit_date = ?
            ORDER BY p.last_name, p.first_name
            "#,
        )?;

        let rows = stmt.query_map([format_date(visit_date)], SummaryRow::from_row)?;

        let mut summaries = Vec::new();
        for row in rows {
            summaries.push(row?.try_into()?);
        }
        Ok(summaries)
    }
}

/// Intermediate row struct for database mapping.
struct PatientRow {
    local_id: String,
    patient_number: String,
    first_name: String,
    last_name: String,
    date_of_birth: Option<String>,
    gender: Option<String>,
    registration_date: String,
    created_at: String,
}

impl PatientRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(PatientRow {
            local_id: row.get(0)?,
            patient_number: row.get(1)?,
            first_name: row.get(2)?,
            last_name: row.get(3)?,
            date_of_birth: row.get(4)?,
            gender: row.get(5)?,
            registration_date: row.get(6)?,
            created_at: row.get(7)?,
        })
    }
}

impl TryFrom<PatientRow> for Patient {
    type Error = DbError;

    fn try_from(row: PatientRow) -> Result<Self, Self::Error> {
        let date_of_birth = match row.date_of_birth {
            Some(dob) if !dob.is_empty() => Some(column_date(&dob)?),
            _ => None,
        };

        Ok(Patient {
            local_id: row.local_id,
            patient_number: row.patient_number,
            first_name: row.first_name,
            last_name: row.last_name,
            date_of_birth,
            gender: row.gender,
            registration_date: column_date(&row.registration_date)?,
            created_at: row.created_at,
        })
    }
}

struct SummaryRow {
    patient: PatientRow,
    last_bmi: Option<f64>,
    last_visit_date: Option<String>,
}

impl SummaryRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(SummaryRow {
            patient: PatientRow::from_row(row)?,
            last_bmi: row.get(8)?,
            last_visit_date: row.get(9)?,
        })
    }
}

impl TryFrom<SummaryRow> for PatientSummary {
    type Error = DbError;

    fn try_from(row: SummaryRow) -> Result<Self, Self::Error> {
        Ok(PatientSummary {
            patient: row.patient.try_into()?,
            last_bmi: row.last_bmi,
            last_visit_date: row.last_visit_date.as_deref().map(column_date).transpose()?,
        })
    }
}

/// Parse a stored `YYYY-MM-DD` column.
pub(crate) fn column_date(value: &str) -> DbResult<chrono::NaiveDate> {
    parse_date(value).map_err(|_| DbError::Constraint(format!("Invalid stored date: {}", value)))
}
