//! Assessment commands: add, list, show, complete.

use std::collections::BTreeMap;

use clap::Subcommand;

use crate::{
    model::{Assessment, AssessmentStatus, LocalityType, Requirements},
    storage::Storage,
};

use super::{
    format::{format_assessment, format_requirements},
    pass::print_sweep,
};

#[derive(Debug, Subcommand)]
pub enum AssessmentCommand {
    /// Record a supervisor-confirmed assessment.
    Add {
        /// Assessment ID.
        id: String,

        /// Locality type: commercial, industrial, mixed, residential.
        /// Anything else is treated as unknown (lowest priority).
        #[arg(long, default_value = "unknown")]
        locality: String,

        /// Road or location name. Used as the job name when resourced.
        #[arg(long)]
        location: Option<String>,

        /// Kind of damage, e.g. "pothole".
        #[arg(long)]
        issue: Option<String>,

        /// Equipment needed, as `TYPE=COUNT`. Repeatable.
        #[arg(long, value_name = "TYPE=COUNT", value_parser = parse_requirement)]
        equipment: Vec<(String, u32)>,

        /// Crew needed, as `ROLE=COUNT`. Repeatable.
        #[arg(long, value_name = "ROLE=COUNT", value_parser = parse_requirement)]
        labour: Vec<(String, u32)>,

        /// Material needed, as `NAME=QUANTITY`. Repeatable.
        #[arg(long, value_name = "NAME=QUANTITY", value_parser = parse_requirement)]
        material: Vec<(String, u32)>,
    },

    /// List assessments in intake order.
    List {
        /// Print JSON instead of text.
        #[arg(long)]
        json: bool,
    },

    /// Show one assessment and its resource manifest.
    Show {
        id: String,

        #[arg(long)]
        json: bool,
    },

    /// Mark an assessment's work as finished.
    ///
    /// Runs a sweep afterwards so its resources return to the pool
    /// straight away.
    Complete {
        id: String,

        /// Leave the release to the next scheduled sweep.
        #[arg(long)]
        no_sweep: bool,
    },
}

pub(super) fn run(storage: &mut Storage, command: AssessmentCommand) -> Result<(), String> {
    match command {
        AssessmentCommand::Add {
            id,
            locality,
            location,
            issue,
            equipment,
            labour,
            material,
        } => {
            let assessment = Assessment {
                id,
                status: AssessmentStatus::Assessed,
                locality_type: LocalityType::parse(&locality),
                location,
                issue_type: issue,
                resources: Requirements {
                    equipment: collect_counts(equipment),
                    labour: collect_counts(labour),
                    materials: collect_counts(material),
                },
            };
            cmd_add(storage, &assessment)
        }
        AssessmentCommand::List { json } => cmd_list(storage, json),
        AssessmentCommand::Show { id, json } => cmd_show(storage, &id, json),
        AssessmentCommand::Complete { id, no_sweep } => cmd_complete(storage, &id, !no_sweep),
    }
}

fn cmd_add(storage: &Storage, assessment: &Assessment) -> Result<(), String> {
    storage
        .add_assessment(assessment)
        .map_err(|e| format!("failed to add assessment: {e}"))?;
    println!("{}", assessment.id);
    Ok(())
}

fn cmd_list(storage: &Storage, json: bool) -> Result<(), String> {
    let assessments = storage
        .list_assessments()
        .map_err(|e| format!("failed to list assessments: {e}"))?;

    if json {
        let json = serde_json::to_string_pretty(&assessments)
            .map_err(|e| format!("failed to serialize assessments: {e}"))?;
        println!("{json}");
        return Ok(());
    }

    if assessments.is_empty() {
        println!("No assessments");
        return Ok(());
    }
    for assessment in &assessments {
        println!("{}", format_assessment(assessment));
    }
    Ok(())
}

fn cmd_show(storage: &Storage, id: &str, json: bool) -> Result<(), String> {
    let assessment = storage
        .load_assessment(id)
        .map_err(|e| format!("failed to load assessment: {e}"))?;

    if json {
        let json = serde_json::to_string_pretty(&assessment)
            .map_err(|e| format!("failed to serialize assessment: {e}"))?;
        println!("{json}");
        return Ok(());
    }

    println!("{}", format_assessment(&assessment));
    let needs = format_requirements(&assessment.resources);
    if !needs.is_empty() {
        println!("  needs: {needs}");
    }
    Ok(())
}

fn cmd_complete(storage: &mut Storage, id: &str, sweep: bool) -> Result<(), String> {
    storage
        .complete_assessment(id)
        .map_err(|e| format!("failed to complete assessment: {e}"))?;
    eprintln!("Assessment {id} completed");

    if sweep {
        let plan = storage.run_sweep(false).map_err(|e| {
            format!(
                "assessment {id} is completed, but the sweep failed: {e}; \
                 the next sweep will release its resources"
            )
        })?;
        print_sweep(&plan);
    }
    Ok(())
}

/// Repeated names add up.
fn collect_counts(pairs: Vec<(String, u32)>) -> BTreeMap<String, u32> {
    let mut counts = BTreeMap::new();
    for (name, count) in pairs {
        let total: &mut u32 = counts.entry(name).or_default();
        *total = total.saturating_add(count);
    }
    counts
}

/// Parse `NAME=COUNT`.
fn parse_requirement(s: &str) -> Result<(String, u32), String> {
    let (name, count) = s
        .rsplit_once('=')
        .ok_or_else(|| format!("expected NAME=COUNT, got '{s}'"))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("missing name in '{s}'"));
    }
    let count = count
        .trim()
        .parse::<u32>()
        .map_err(|e| format!("invalid count in '{s}': {e}"))?;
    Ok((name.to_string(), count))
}
