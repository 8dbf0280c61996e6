//! Assessment database operations.

use rusqlite::{params, OptionalExtension, Row};

use super::patients::column_date;
use super::{Database, DbError, DbResult};
use crate::models::{format_date, GeneralAssessment, GeneralHealth, OverweightAssessment};

impl Database {
    /// Insert a general assessment.
    pub fn insert_general_assessment(&self, assessment: &GeneralAssessment) -> DbResult<()> {
        self.conn.execute(
            r#"
            INSERT INTO general_assessments (
                local_id, patient_id, visit_date, general_health,
                ever_on_diet, comments, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
            params![
                assessment.local_id,
                assessment.patient_id,
                format_date(assessment.visit_date),
                assessment.general_health.as_str(),
                assessment.ever_on_diet,
                assessment.comments,
                assessment.created_at,
            ],
        )?;
        Ok(())
    }

    /// Insert an overweight assessment.
    pub fn insert_overweight_assessment(&self, assessment: &OverweightAssessment) -> DbResult<()> {
        self.conn.execute(
            r#"
            INSERT INTO overweight_assessments (
                local_id, patient_id, visit_date, general_health,
                using_drugs, comments, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
            params![
                assessment.local_id,
                assessment.patient_id,
                format_date(assessment.visit_date),
                assessment.general_health.as_str(),
                assessment.using_drugs,
                assessment.comments,
                assessment.created_at,
            ],
        )?;
        Ok(())
    }

    pub fn get_general_assessment(&self, local_id: &str) -> DbResult<Option<GeneralAssessment>> {
        self.conn
            .query_row(
                "SELECT local_id, patient_id, visit_date, general_health, ever_on_diet, \
                 comments, created_at FROM general_assessments WHERE local_id = ?",
                [local_id],
                AssessmentRow::from_row,
            )
            .optional()?
            .map(GeneralAssessment::try_from)
            .transpose()
    }

    pub fn get_overweight_assessment(&self, local_id: &str) -> DbResult<Option<OverweightAssessment>> {
        self.conn
            .query_row(
                "SELECT local_id, patient_id, visit_date, general_health, using_drugs, \
                 comments, created_at FROM overweight_assessments WHERE local_id = ?",
                [local_id],
                AssessmentRow::from_row,
            )
            .optional()?
            .map(OverweightAssessment::try_from)
            .transpose()
    }

    /// General assessments for a patient, newest visit first.
    pub fn list_general_assessments(&self, patient_id: &str) -> DbResult<Vec<GeneralAssessment>> {
        let mut stmt = self.conn.prepare(
            "SELECT local_id, patient_id, visit_date, general_health, ever_on_diet, \
             comments, created_at FROM general_assessments \
             WHERE patient_id = ? ORDER BY visit_date DESC",
        )?;

        let rows = stmt.query_map([patient_id], AssessmentRow::from_row)?;

        let mut assessments = Vec::new();
        for row in rows {
            assessments.push(row?.try_into()?);
        }
        Ok(assessments)
    }

    /// Overweight assessments for a patient, newest visit first.
    pub fn list_overweight_assessments(&self, patient_id: &str) -> DbResult<Vec<OverweightAssessment>> {
        let mut stmt = self.conn.prepare(
            "SELECT local_id, patient_id, visit_date, general_health, using_drugs, \
             comments, created_at FROM overweight_assessments \
             WHERE patient_id = ? ORDER BY visit_date DESC",
        )?;

        let rows = stmt.query_map([patient_id], AssessmentRow::from_row)?;

        let mut assessments = Vec::new();
        for row in rows {
            assessments.push(row?.try_into()?);
        }
        Ok(assessments)
    }
}

/// Shared row shape for both assessment tables; `answer` is the
/// diet or drugs flag depending on the table.
struct AssessmentRow {
    local_id: String,
    patient_id: String,
    visit_date: String,
    general_health: String,
    answer: bool,
    comments: String,
    created_at: String,
}

impl AssessmentRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(AssessmentRow {
            local_id: row.get(0)?,
            patient_id: row.get(1)?,
            visit_date: row.get(2)?,
            general_health: row.get(3)?,
            answer: row.get(4)?,
            comments: row.get(5)?,
            created_at: row.get(6)?,
        })
    }

    fn health(&self) -> DbResult<GeneralHealth> {
        GeneralHealth::parse(&self.general_health).ok_or_else(|| {
            DbError::Constraint(format!("Invalid general health: {}", self.general_health))
        })
    }
}

impl TryFrom<AssessmentRow> for GeneralAssessment {
    type Error = DbError;

    fn try_from(row: AssessmentRow) -> Result<Self, Self::Error> {
        Ok(GeneralAssessment {
            general_health: row.health()?,
            visit_date: column_date(&row.visit_date)?,
            local_id: row.local_id,
            patient_id: row.patient_id,
            ever_on_diet: row.answer,
            comments: row.comments,
            created_at: row.created_at,
        })
    }
}

impl TryFrom<AssessmentRow> for OverweightAssessment {
    type Error = DbError;

    fn try_from(row: AssessmentRow) -> Result<Self, Self::Error> {
        Ok(OverweightAssessment {
            general_health: row.health()?,
            visit_date: column_date(&row.visit_date)?,
            local_id: row.local_id,
            patient_id: row.patient_id,
            using_drugs: row.answer,
            comments: row.comments,
            created_at: row.created_at,
        })
    }
}
