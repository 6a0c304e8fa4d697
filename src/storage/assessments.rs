//! Assessment storage: intake, listing, and status changes.

use rusqlite::{Connection, OptionalExtension, params};

use crate::model::{Assessment, AssessmentStatus, LocalityType};

use super::{Result, Storage, StorageError, corrupt, exists};

impl Storage {
    /// Records a new assessment.
    ///
    /// The requirement manifest is validated here, before the allocator
    /// can ever see it.
    pub fn add_assessment(&self, assessment: &Assessment) -> Result<()> {
        insert_assessment(&self.conn, assessment)
    }

    /// Loads one assessment.
    pub fn load_assessment(&self, id: &str) -> Result<Assessment> {
        let row = self
            .conn
            .query_row(
                "SELECT id, status, locality_type, location, issue_type, resources
                 FROM assessments WHERE id = ?1",
                [id],
                read_row,
            )
            .optional()?;
        row.ok_or_else(|| StorageError::AssessmentNotFound(id.to_string()))
            .and_then(decode)
    }

    /// Lists all assessments in intake order.
    pub fn list_assessments(&self) -> Result<Vec<Assessment>> {
        list_assessments(&self.conn)
    }

    /// Marks an assessment's work as finished.
    ///
    /// This is the external completion signal; its resources are returned
    /// by the next sweep.
    pub fn complete_assessment(&self, id: &str) -> Result<()> {
        set_status(&self.conn, id, AssessmentStatus::Completed)
    }
}

type Row = (
    String,
    String,
    String,
    Option<String>,
    Option<String>,
    String,
);

fn read_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Row> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
    ))
}

fn decode((id, status, locality, location, issue_type, resources): Row) -> Result<Assessment> {
    let status = status
        .parse()
        .map_err(|e| corrupt(&format!("assessment {id}"), e))?;
    let resources = serde_json::from_str(&resources)
        .map_err(|e| corrupt(&format!("assessment {id} resources"), e))?;
    Ok(Assessment {
        id,
        status,
        locality_type: LocalityType::parse(&locality),
        location,
        issue_type,
        resources,
    })
}

pub(super) fn insert_assessment(conn: &Connection, assessment: &Assessment) -> Result<()> {
    assessment
        .resources
        .validate()
        .map_err(|source| StorageError::InvalidManifest {
            id: assessment.id.clone(),
            source,
        })?;
    if exists(conn, "assessments", "id", &assessment.id)? {
        return Err(StorageError::AssessmentAlreadyExists(
            assessment.id.clone(),
        ));
    }
    conn.execute(
        "INSERT INTO assessments (id, status, locality_type, location, issue_type, resources)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            assessment.id,
            assessment.status.as_str(),
            assessment.locality_type.as_str(),
            assessment.location,
            assessment.issue_type,
            serde_json::to_string(&assessment.resources)?,
        ],
    )?;
    Ok(())
}

pub(super) fn list_assessments(conn: &Connection) -> Result<Vec<Assessment>> {
    let mut stmt = conn.prepare(
        "SELECT id, status, locality_type, location, issue_type, resources
         FROM assessments ORDER BY rowid",
    )?;
    let rows = stmt.query_map([], read_row)?;
    let mut assessments = Vec::new();
    for row in rows {
        assessments.push(decode(row?)?);
    }
    Ok(assessments)
}

pub(super) fn set_status(conn: &Connection, id: &str, status: AssessmentStatus) -> Result<()> {
    let rows = conn.execute(
        "UPDATE assessments SET status = ?1 WHERE id = ?2",
        params![status.as_str(), id],
    )?;
    if rows == 0 {
        return Err(StorageError::AssessmentNotFound(id.to_string()));
    }
    Ok(())
}
