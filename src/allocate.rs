//! Allocation: match pending assessments to free resources.
//!
//! A pass is a pure function of its inputs. It works on a private copy of
//! the pool, serves assessments in locality priority order, and either
//! resources an assessment completely or puts it on hold. The caller
//! commits the returned plan as one unit.

use std::collections::{BTreeMap, BTreeSet};

use jiff::Timestamp;
use serde::Serialize;
use tracing::{debug, info};

use crate::{
    ledger::Ledger,
    model::{
        Assessment, AssessmentStatus, Assignment, AssignmentStatus, LocalityType, MaterialDraw,
        MaterialStatus, Requirements, ResourceKind, Unit,
    },
    pool::{PoolMutation, ResourcePool},
};

/// Everything one allocation pass decided, ready to be committed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AllocationPlan {
    /// New ledger entries, one per resourced assessment.
    pub assignments: Vec<Assignment>,

    /// Resource record changes, in the order they were decided.
    pub pool_mutations: Vec<PoolMutation>,

    /// Assessment ID → new status. Unchanged statuses are omitted.
    pub status_updates: BTreeMap<String, AssessmentStatus>,

    /// Per-assessment result, in processing order.
    pub outcomes: Vec<Outcome>,
}

impl AllocationPlan {
    /// True when the pass changes nothing.
    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
            && self.pool_mutations.is_empty()
            && self.status_updates.is_empty()
    }

    pub fn assigned(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o.resolution, Resolution::Assigned { .. }))
            .count()
    }

    pub fn on_hold(&self) -> usize {
        self.outcomes.len() - self.assigned()
    }
}

/// What happened to one assessment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Outcome {
    /// 1-based position in the priority queue.
    pub order: usize,
    pub assessment_id: String,
    pub locality_type: LocalityType,
    pub resolution: Resolution,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "result", rename_all = "camelCase")]
pub enum Resolution {
    /// Fully resourced under this job name.
    Assigned { job: String },

    /// The first requirement that could not be met.
    OnHold { shortfall: Shortfall },
}

/// A requirement the pool could not cover.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Shortfall {
    pub kind: ResourceKind,
    pub name: String,
    pub requested: u32,

    /// Free units of that class. For materials, the largest single
    /// available record, since one record must cover the whole request.
    pub available: u32,
}

/// Resources picked for one assessment, not yet applied to the pool.
struct Reservation {
    equipment: Vec<String>,
    personnel: Vec<String>,
    draws: Vec<Draw>,
}

struct Draw {
    id: String,
    material: String,
    quantity: u32,
    remaining: u32,
    status: MaterialStatus,
}

/// Run one allocation pass.
///
/// Considers assessments that are `assessed` or `on_hold` and request at
/// least one resource. Commercial sites are served first; assessments of
/// equal priority keep their input order. Resources taken by an earlier
/// assessment are unavailable to later ones in the same pass.
pub fn allocate(
    assessments: &[Assessment],
    pool: &ResourcePool,
    ledger: &Ledger,
    now: Timestamp,
) -> AllocationPlan {
    let mut queue: Vec<&Assessment> = assessments
        .iter()
        .filter(|a| a.status.is_pending() && !a.resources.is_empty())
        .collect();
    // `sort_by_key` is stable, so equal priorities keep input order.
    queue.sort_by_key(|a| a.locality_type.priority());

    let mut working = pool.clone();
    let mut jobs = BTreeSet::new();
    let mut plan = AllocationPlan::default();

    for (index, assessment) in queue.into_iter().enumerate() {
        let resolution = match reserve(&working, &assessment.resources) {
            Ok(reservation) => {
                let job = ledger.job_name_for(assessment, &jobs);
                let mutations = reservation.mutations(&job);
                for mutation in &mutations {
                    working.apply(mutation);
                }
                plan.pool_mutations.extend(mutations);
                plan.assignments
                    .push(reservation.into_assignment(&job, assessment, now));
                plan.status_updates
                    .insert(assessment.id.clone(), AssessmentStatus::InProgress);
                jobs.insert(job.clone());

                debug!(
                    assessment = %assessment.id,
                    locality = %assessment.locality_type,
                    job = %job,
                    "assessment resourced"
                );
                Resolution::Assigned { job }
            }
            Err(shortfall) => {
                if assessment.status != AssessmentStatus::OnHold {
                    plan.status_updates
                        .insert(assessment.id.clone(), AssessmentStatus::OnHold);
                }

                debug!(
                    assessment = %assessment.id,
                    locality = %assessment.locality_type,
                    kind = %shortfall.kind,
                    name = %shortfall.name,
                    requested = shortfall.requested,
                    available = shortfall.available,
                    "assessment on hold"
                );
                Resolution::OnHold { shortfall }
            }
        };

        plan.outcomes.push(Outcome {
            order: index + 1,
            assessment_id: assessment.id.clone(),
            locality_type: assessment.locality_type,
            resolution,
        });
    }

    info!(
        considered = plan.outcomes.len(),
        assigned = plan.assigned(),
        on_hold = plan.on_hold(),
        "allocation pass complete"
    );
    plan
}

/// Try to cover a whole manifest: equipment, then personnel, then materials.
///
/// Nothing is taken from the pool here; a failure part-way through simply
/// drops what was picked so far.
fn reserve(pool: &ResourcePool, requirements: &Requirements) -> Result<Reservation, Shortfall> {
    let equipment = pick_units(&pool.equipment, &requirements.equipment)?;
    let personnel = pick_units(&pool.personnel, &requirements.labour)?;
    let draws = pick_materials(pool, &requirements.materials)?;
    Ok(Reservation {
        equipment,
        personnel,
        draws,
    })
}

/// Exactly `count` free units per class, first in pool order.
fn pick_units<U: Unit>(
    units: &[U],
    wanted: &BTreeMap<String, u32>,
) -> Result<Vec<String>, Shortfall> {
    let mut picked = Vec::new();
    for (class, &count) in wanted {
        let free: Vec<&U> = units
            .iter()
            .filter(|u| u.is_available() && u.class() == class)
            .collect();
        let needed = usize::try_from(count).unwrap_or(usize::MAX);
        if free.len() < needed {
            return Err(Shortfall {
                kind: U::KIND,
                name: class.clone(),
                requested: count,
                available: u32::try_from(free.len()).unwrap_or(u32::MAX),
            });
        }
        picked.extend(free.into_iter().take(needed).map(|u| u.id().to_string()));
    }
    Ok(picked)
}

/// One available record per material that covers the full quantity.
fn pick_materials(
    pool: &ResourcePool,
    wanted: &BTreeMap<String, u32>,
) -> Result<Vec<Draw>, Shortfall> {
    let mut draws = Vec::new();
    for (name, &count) in wanted {
        let Some(record) = pool.available_materials(name).find(|m| m.quantity >= count) else {
            let largest = pool
                .available_materials(name)
                .map(|m| m.quantity)
                .max()
                .unwrap_or(0);
            return Err(Shortfall {
                kind: ResourceKind::Material,
                name: name.clone(),
                requested: count,
                available: largest,
            });
        };

        let remaining = record.quantity - count;
        draws.push(Draw {
            id: record.id.clone(),
            material: name.clone(),
            quantity: count,
            remaining,
            status: if remaining == 0 {
                MaterialStatus::Unavailable
            } else {
                record.status
            },
        });
    }
    Ok(draws)
}

impl Reservation {
    fn mutations(&self, job: &str) -> Vec<PoolMutation> {
        let assign = |kind, id: &String| PoolMutation::Assign {
            kind,
            id: id.clone(),
            job: job.to_string(),
        };
        self.equipment
            .iter()
            .map(|id| assign(ResourceKind::Equipment, id))
            .chain(
                self.personnel
                    .iter()
                    .map(|id| assign(ResourceKind::Personnel, id)),
            )
            .chain(self.draws.iter().map(|d| PoolMutation::Draw {
                id: d.id.clone(),
                remaining: d.remaining,
                status: d.status,
            }))
            .collect()
    }

    fn into_assignment(self, job: &str, assessment: &Assessment, now: Timestamp) -> Assignment {
        Assignment {
            job: job.to_string(),
            assessment_id: assessment.id.clone(),
            personnel: self.personnel,
            equipment: self.equipment,
            materials: self
                .draws
                .into_iter()
                .map(|d| MaterialDraw {
                    material: d.material,
                    quantity: d.quantity,
                })
                .collect(),
            status: AssignmentStatus::Active,
            created_at: now,
            locality_type: assessment.locality_type,
        }
    }
}
