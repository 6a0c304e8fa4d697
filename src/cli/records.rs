//! Read-side and bulk commands: ledger, status, import, export.

use std::{fs, path::Path};

use crate::{model::Snapshot, report::sufficiency, storage::Storage};

use super::format::{format_assignment, format_resource_status};

pub(super) fn cmd_ledger(storage: &Storage, json: bool) -> Result<(), String> {
    let ledger = storage
        .load_ledger()
        .map_err(|e| format!("failed to load ledger: {e}"))?;

    if json {
        let entries: Vec<_> = ledger.iter().collect();
        let json = serde_json::to_string_pretty(&entries)
            .map_err(|e| format!("failed to serialize ledger: {e}"))?;
        println!("{json}");
        return Ok(());
    }

    if ledger.is_empty() {
        println!("No active jobs");
        return Ok(());
    }
    for entry in ledger.iter() {
        println!("{}", format_assignment(entry));
    }
    Ok(())
}

pub(super) fn cmd_status(storage: &Storage, json: bool) -> Result<(), String> {
    let pool = storage
        .load_pool()
        .map_err(|e| format!("failed to load resources: {e}"))?;
    let assessments = storage
        .list_assessments()
        .map_err(|e| format!("failed to list assessments: {e}"))?;
    let report = sufficiency(&pool, &assessments);

    if json {
        let json = serde_json::to_string_pretty(&report)
            .map_err(|e| format!("failed to serialize report: {e}"))?;
        println!("{json}");
        return Ok(());
    }

    if report.is_empty() {
        println!("No resources and no pending demand");
        return Ok(());
    }
    for row in &report {
        println!("{}", format_resource_status(row));
    }
    Ok(())
}

pub(super) fn cmd_import(storage: &mut Storage, file: &Path) -> Result<(), String> {
    let contents = fs::read_to_string(file)
        .map_err(|e| format!("failed to read {}: {e}", file.display()))?;
    let snapshot: Snapshot = serde_json::from_str(&contents)
        .map_err(|e| format!("invalid snapshot in {}: {e}", file.display()))?;

    storage
        .import(&snapshot)
        .map_err(|e| format!("failed to import {}: {e}", file.display()))?;

    eprintln!(
        "Imported {} personnel, {} equipment, {} materials, {} assessments, {} assignments",
        snapshot.personnel.len(),
        snapshot.equipment.len(),
        snapshot.materials.len(),
        snapshot.assessments.len(),
        snapshot.assignments.len(),
    );
    Ok(())
}

pub(super) fn cmd_export(storage: &Storage, out: Option<&Path>) -> Result<(), String> {
    let snapshot = storage
        .snapshot()
        .map_err(|e| format!("failed to read database: {e}"))?;
    let json = serde_json::to_string_pretty(&snapshot)
        .map_err(|e| format!("failed to serialize snapshot: {e}"))?;

    match out {
        Some(path) => {
            fs::write(path, &json)
                .map_err(|e| format!("failed to write {}: {e}", path.display()))?;
            eprintln!("Exported to {}", path.display());
        }
        None => println!("{json}"),
    }
    Ok(())
}
