//! Engine passes: allocate and sweep.

use std::{thread, time::Duration};

use jiff::Timestamp;
use tracing::{error, info};

use crate::{allocate::AllocationPlan, storage::Storage, sweep::SweepPlan};

use super::format::{format_inconsistency, format_mutation, format_outcome};

pub(super) fn cmd_allocate(storage: &mut Storage, dry_run: bool, json: bool) -> Result<(), String> {
    let plan = storage
        .run_allocation(Timestamp::now(), dry_run)
        .map_err(|e| format!("failed to allocate: {e}"))?;

    if json {
        return print_json(&plan);
    }
    print_allocation(&plan);
    if dry_run {
        eprintln!("Dry run: nothing written");
    }
    Ok(())
}

pub(super) fn cmd_sweep(storage: &mut Storage, dry_run: bool, json: bool) -> Result<(), String> {
    let plan = storage
        .run_sweep(dry_run)
        .map_err(|e| format!("failed to sweep: {e}"))?;

    if json {
        return print_json(&plan);
    }
    print_sweep(&plan);
    if dry_run {
        eprintln!("Dry run: nothing written");
    }
    Ok(())
}

/// Sweep forever, pausing `interval` between passes.
///
/// A failed pass is logged and the loop carries on; the next pass
/// starts from whatever the database then holds.
pub(super) fn cmd_watch(
    storage: &mut Storage,
    interval: Duration,
    json: bool,
) -> Result<(), String> {
    info!(interval_secs = interval.as_secs(), "watching for completed jobs");
    loop {
        match storage.run_sweep(false) {
            Ok(plan) if json => {
                if let Err(e) = print_json(&plan) {
                    error!(error = %e, "could not print sweep");
                }
            }
            Ok(plan) => print_sweep(&plan),
            Err(e) => error!(error = %e, "sweep failed"),
        }
        thread::sleep(interval);
    }
}

fn print_allocation(plan: &AllocationPlan) {
    if plan.outcomes.is_empty() {
        println!("Nothing to allocate");
        return;
    }
    for outcome in &plan.outcomes {
        println!("{}", format_outcome(outcome));
    }
    println!("Assigned {}, on hold {}", plan.assigned(), plan.on_hold());
}

pub(super) fn print_sweep(plan: &SweepPlan) {
    for job in &plan.ledger_deletions {
        println!("retire {job}");
    }
    for mutation in &plan.pool_mutations {
        println!("{}", format_mutation(mutation));
    }
    for problem in &plan.inconsistencies {
        eprintln!("Warning: {}", format_inconsistency(problem));
    }
    if plan.is_empty() {
        println!("Nothing to release");
    }
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<(), String> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| format!("failed to serialize plan: {e}"))?;
    println!("{json}");
    Ok(())
}
