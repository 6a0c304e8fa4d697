//! Output formatting for CLI display.

use crate::{
    allocate::{Outcome, Resolution, Shortfall},
    model::{Assessment, Assignment, Equipment, Material, Personnel, Requirements},
    pool::{PoolMutation, ResourceRef},
    report::ResourceStatus,
    sweep::Inconsistency,
};

/// One line per assessment considered by an allocation pass.
pub(super) fn format_outcome(outcome: &Outcome) -> String {
    let head = format!(
        "{}. {} [{}]",
        outcome.order, outcome.assessment_id, outcome.locality_type
    );
    match &outcome.resolution {
        Resolution::Assigned { job } => format!("{head} assigned as {job}"),
        Resolution::OnHold { shortfall } => {
            format!("{head} on hold: {}", format_shortfall(shortfall))
        }
    }
}

pub(super) fn format_shortfall(shortfall: &Shortfall) -> String {
    format!(
        "{} '{}' needs {}, {} available",
        shortfall.kind, shortfall.name, shortfall.requested, shortfall.available
    )
}

pub(super) fn format_mutation(mutation: &PoolMutation) -> String {
    match mutation {
        PoolMutation::Assign { kind, id, job } => format!("assign {kind} {id} to {job}"),
        PoolMutation::Release { kind, id } => format!("release {kind} {id}"),
        PoolMutation::Draw { id, remaining, .. } => {
            format!("draw material {id} ({remaining} left)")
        }
    }
}

pub(super) fn format_inconsistency(problem: &Inconsistency) -> String {
    match problem {
        Inconsistency::MissingResource { job, kind, id } => {
            format!("{job}: {kind} {id} is no longer in the pool")
        }
        Inconsistency::ForeignHolder {
            job,
            kind,
            id,
            holder,
        } => {
            let holder = holder.as_deref().unwrap_or("nobody");
            format!("{job}: {kind} {id} is held by {holder}, left in place")
        }
    }
}

pub(super) fn format_assignment(assignment: &Assignment) -> String {
    let materials = assignment
        .materials
        .iter()
        .map(|d| format!("{} x{}", d.material, d.quantity))
        .collect::<Vec<_>>();
    format!(
        "{}  [{}] {}  personnel: {}  equipment: {}  materials: {}",
        assignment.job,
        assignment.locality_type,
        assignment.assessment_id,
        list_or_dash(&assignment.personnel),
        list_or_dash(&assignment.equipment),
        list_or_dash(&materials),
    )
}

pub(super) fn format_assessment(assessment: &Assessment) -> String {
    format!(
        "{}  [{}] [{}]  {}",
        assessment.id,
        assessment.status,
        assessment.locality_type,
        assessment.location.as_deref().unwrap_or("-"),
    )
}

/// Every requested class with its count, equipment first.
pub(super) fn format_requirements(needs: &Requirements) -> String {
    needs
        .equipment
        .iter()
        .chain(&needs.labour)
        .chain(&needs.materials)
        .map(|(name, count)| format!("{name} x{count}"))
        .collect::<Vec<_>>()
        .join(", ")
}

pub(super) fn format_resource(record: ResourceRef<'_>) -> String {
    match record {
        ResourceRef::Personnel(person) => format_personnel(person),
        ResourceRef::Equipment(machine) => format_equipment(machine),
        ResourceRef::Material(material) => format_material(material),
    }
}

fn format_personnel(person: &Personnel) -> String {
    format!(
        "{}  {}  [{}]  {}",
        person.id,
        person.role,
        person.status.as_str(),
        holder(person.assigned_to.as_deref()),
    )
}

fn format_equipment(machine: &Equipment) -> String {
    format!(
        "{}  {}  [{}]  {}",
        machine.id,
        machine.equipment_type,
        machine.status.as_str(),
        holder(machine.assigned_to.as_deref()),
    )
}

fn format_material(material: &Material) -> String {
    format!(
        "{}  {} x{}  [{}]",
        material.id,
        material.material,
        material.quantity,
        material.status.as_str(),
    )
}

pub(super) fn format_resource_status(status: &ResourceStatus) -> String {
    format!(
        "{:<10} {:<20} required {:>5}  available {:>5}  {:>+6}  {}",
        status.kind.as_str(),
        status.name,
        status.required,
        status.available,
        status.difference,
        status.status.as_str(),
    )
}

fn holder(job: Option<&str>) -> String {
    job.map_or_else(|| "free".to_string(), |j| format!("-> {j}"))
}

fn list_or_dash(items: &[String]) -> String {
    if items.is_empty() {
        "-".to_string()
    } else {
        items.join(", ")
    }
}
