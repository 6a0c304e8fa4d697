//! Ledger storage: assignment entries keyed by job name.

use rusqlite::{Connection, params};

use crate::{
    ledger::Ledger,
    model::{Assignment, LocalityType},
};

use super::{Result, Storage, StorageError, corrupt, exists};

impl Storage {
    /// Loads every active ledger entry.
    pub fn load_ledger(&self) -> Result<Ledger> {
        load_ledger(&self.conn)
    }
}

pub(super) fn insert_assignment(conn: &Connection, assignment: &Assignment) -> Result<()> {
    if exists(conn, "assignments", "job", &assignment.job)? {
        return Err(StorageError::AssignmentAlreadyExists(
            assignment.job.clone(),
        ));
    }
    conn.execute(
        "INSERT INTO assignments
            (job, assessment_id, personnel, equipment, materials, status, created_at, locality_type)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            assignment.job,
            assignment.assessment_id,
            serde_json::to_string(&assignment.personnel)?,
            serde_json::to_string(&assignment.equipment)?,
            serde_json::to_string(&assignment.materials)?,
            assignment.status.as_str(),
            assignment.created_at.to_string(),
            assignment.locality_type.as_str(),
        ],
    )?;
    Ok(())
}

/// Deletes an entry. Deleting an entry that is already gone is not an error.
pub(super) fn delete_assignment(conn: &Connection, job: &str) -> Result<()> {
    conn.execute("DELETE FROM assignments WHERE job = ?1", [job])?;
    Ok(())
}

pub(super) fn load_ledger(conn: &Connection) -> Result<Ledger> {
    let mut stmt = conn.prepare(
        "SELECT job, assessment_id, personnel, equipment, materials, status, created_at,
                locality_type
         FROM assignments",
    )?;
    let rows = stmt.query_map([], |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, String>(2)?,
            row.get::<_, String>(3)?,
            row.get::<_, String>(4)?,
            row.get::<_, String>(5)?,
            row.get::<_, String>(6)?,
            row.get::<_, String>(7)?,
        ))
    })?;

    let mut ledger = Ledger::new();
    for row in rows {
        let (job, assessment_id, personnel, equipment, materials, status, created_at, locality) =
            row?;
        let context = |field: &str| format!("assignment {job} {field}");
        let assignment = Assignment {
            personnel: serde_json::from_str(&personnel)
                .map_err(|e| corrupt(&context("personnel"), e))?,
            equipment: serde_json::from_str(&equipment)
                .map_err(|e| corrupt(&context("equipment"), e))?,
            materials: serde_json::from_str(&materials)
                .map_err(|e| corrupt(&context("materials"), e))?,
            status: status.parse().map_err(|e| corrupt(&context("status"), e))?,
            created_at: created_at
                .parse::<jiff::Timestamp>()
                .map_err(|e| corrupt(&context("created_at"), e))?,
            locality_type: LocalityType::parse(&locality),
            job,
            assessment_id,
        };
        ledger.insert(assignment);
    }
    Ok(ledger)
}
