//! Allocation and sweep passes, each committed as one transaction.
//!
//! The pass opens an `IMMEDIATE` transaction, reads its snapshot under the
//! write lock, plans with the pure engine and writes the plan back. Any
//! error rolls the whole pass back; a dropped transaction never commits.

use jiff::Timestamp;
use rusqlite::{Connection, TransactionBehavior};
use tracing::{debug, info};

use crate::{
    allocate::{AllocationPlan, allocate},
    sweep::{SweepPlan, sweep},
};

use super::{
    Result, Storage,
    assessments::{list_assessments, set_status},
    ledger::{delete_assignment, insert_assignment, load_ledger},
    resources::{apply_mutation, load_pool},
};

impl Storage {
    /// Runs one allocation pass.
    ///
    /// With `dry_run` the plan is computed and returned but nothing is
    /// written.
    pub fn run_allocation(&mut self, now: Timestamp, dry_run: bool) -> Result<AllocationPlan> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;

        let pool = load_pool(&tx)?;
        let assessments = list_assessments(&tx)?;
        let ledger = load_ledger(&tx)?;
        let plan = allocate(&assessments, &pool, &ledger, now);

        if dry_run || plan.is_empty() {
            debug!(dry_run, "allocation plan not written");
            return Ok(plan);
        }
        write_allocation(&tx, &plan)?;
        tx.commit()?;
        info!(
            assignments = plan.assignments.len(),
            mutations = plan.pool_mutations.len(),
            "allocation committed"
        );
        Ok(plan)
    }

    /// Runs one release sweep.
    ///
    /// With `dry_run` the plan is computed and returned but nothing is
    /// written.
    pub fn run_sweep(&mut self, dry_run: bool) -> Result<SweepPlan> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;

        let pool = load_pool(&tx)?;
        let assessments = list_assessments(&tx)?;
        let ledger = load_ledger(&tx)?;
        let plan = sweep(&ledger, &assessments, &pool);

        if dry_run || plan.is_empty() {
            debug!(dry_run, "sweep plan not written");
            return Ok(plan);
        }
        write_sweep(&tx, &plan)?;
        tx.commit()?;
        info!(
            retired = plan.ledger_deletions.len(),
            released = plan.pool_mutations.len(),
            "sweep committed"
        );
        Ok(plan)
    }
}

fn write_allocation(conn: &Connection, plan: &AllocationPlan) -> Result<()> {
    for mutation in &plan.pool_mutations {
        apply_mutation(conn, mutation)?;
    }
    for assignment in &plan.assignments {
        insert_assignment(conn, assignment)?;
    }
    for (id, status) in &plan.status_updates {
        set_status(conn, id, *status)?;
    }
    Ok(())
}

fn write_sweep(conn: &Connection, plan: &SweepPlan) -> Result<()> {
    for job in &plan.ledger_deletions {
        delete_assignment(conn, job)?;
    }
    for mutation in &plan.pool_mutations {
        apply_mutation(conn, mutation)?;
    }
    Ok(())
}
