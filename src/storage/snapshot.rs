//! Bulk export and import of the whole record set.

use rusqlite::TransactionBehavior;
use tracing::info;

use crate::model::Snapshot;

use super::{
    Result, Storage,
    assessments::{insert_assessment, list_assessments},
    ledger::{insert_assignment, load_ledger},
    resources::{insert_equipment, insert_material, insert_personnel, load_pool},
};

impl Storage {
    /// Reads every record into one snapshot.
    pub fn snapshot(&self) -> Result<Snapshot> {
        let pool = load_pool(&self.conn)?;
        Ok(Snapshot {
            personnel: pool.personnel,
            equipment: pool.equipment,
            materials: pool.materials,
            assessments: list_assessments(&self.conn)?,
            assignments: load_ledger(&self.conn)?.iter().cloned().collect(),
        })
    }

    /// Adds every record in `snapshot`, keeping its order as pool order.
    ///
    /// All or nothing: a duplicate ID or an invalid manifest anywhere
    /// leaves the database untouched.
    pub fn import(&mut self, snapshot: &Snapshot) -> Result<()> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        for person in &snapshot.personnel {
            insert_personnel(&tx, person)?;
        }
        for machine in &snapshot.equipment {
            insert_equipment(&tx, machine)?;
        }
        for material in &snapshot.materials {
            insert_material(&tx, material)?;
        }
        for assessment in &snapshot.assessments {
            insert_assessment(&tx, assessment)?;
        }
        for assignment in &snapshot.assignments {
            insert_assignment(&tx, assignment)?;
        }
        tx.commit()?;
        info!(
            personnel = snapshot.personnel.len(),
            equipment = snapshot.equipment.len(),
            materials = snapshot.materials.len(),
            assessments = snapshot.assessments.len(),
            assignments = snapshot.assignments.len(),
            "snapshot imported"
        );
        Ok(())
    }
}
