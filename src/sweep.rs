//! Release sweeping: return resources held by finished jobs.
//!
//! Two passes over the same snapshot. The first retires ledger entries
//! whose assessment is completed (or gone) and frees the units they list.
//! The second frees any unit still pointing at a job that no longer
//! exists after the first pass. Running a sweep over its own result
//! yields an empty plan.

use std::collections::{BTreeSet, HashMap};

use serde::Serialize;
use tracing::{info, warn};

use crate::{
    ledger::Ledger,
    model::{Assessment, AssessmentStatus, ResourceKind, Unit},
    pool::{PoolMutation, ResourcePool},
};

/// Everything one sweep decided, ready to be committed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SweepPlan {
    /// Job names whose ledger entries are deleted.
    pub ledger_deletions: Vec<String>,

    /// `Release` mutations only.
    pub pool_mutations: Vec<PoolMutation>,

    /// Problems found and skipped. Never fatal.
    pub inconsistencies: Vec<Inconsistency>,
}

impl SweepPlan {
    pub fn is_empty(&self) -> bool {
        self.ledger_deletions.is_empty() && self.pool_mutations.is_empty()
    }
}

/// Ledger and pool disagree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "problem", rename_all = "camelCase")]
pub enum Inconsistency {
    /// A ledger entry lists a unit the pool no longer has.
    MissingResource {
        job: String,
        kind: ResourceKind,
        id: String,
    },

    /// A ledger entry lists a unit that is bound to some other job
    /// (or to none). Left as it is.
    ForeignHolder {
        job: String,
        kind: ResourceKind,
        id: String,
        holder: Option<String>,
    },
}

/// Why a ledger entry is retired.
#[derive(Debug, Clone, Copy)]
enum Retire {
    Completed,
    AssessmentMissing,
}

/// Plan the release of everything held by finished or orphaned jobs.
pub fn sweep(ledger: &Ledger, assessments: &[Assessment], pool: &ResourcePool) -> SweepPlan {
    let statuses: HashMap<&str, AssessmentStatus> = assessments
        .iter()
        .map(|a| (a.id.as_str(), a.status))
        .collect();

    let mut plan = SweepPlan::default();
    let mut released: BTreeSet<(ResourceKind, String)> = BTreeSet::new();

    for entry in ledger.iter() {
        let reason = match statuses.get(entry.assessment_id.as_str()) {
            Some(AssessmentStatus::Completed) => Retire::Completed,
            Some(_) => continue,
            None => Retire::AssessmentMissing,
        };

        let listed = entry
            .personnel
            .iter()
            .map(|id| (ResourceKind::Personnel, id))
            .chain(entry.equipment.iter().map(|id| (ResourceKind::Equipment, id)));

        for (kind, id) in listed {
            if pool.find(kind, id).is_none() {
                warn!(
                    job = %entry.job, %kind, %id,
                    "ledger lists a resource missing from the pool"
                );
                plan.inconsistencies.push(Inconsistency::MissingResource {
                    job: entry.job.clone(),
                    kind,
                    id: id.clone(),
                });
                continue;
            }

            let holder = pool.holder(kind, id);
            if holder != Some(entry.job.as_str()) {
                warn!(
                    job = %entry.job, %kind, %id, ?holder,
                    "resource is not held by its job"
                );
                plan.inconsistencies.push(Inconsistency::ForeignHolder {
                    job: entry.job.clone(),
                    kind,
                    id: id.clone(),
                    holder: holder.map(String::from),
                });
                continue;
            }

            if released.insert((kind, id.clone())) {
                plan.pool_mutations.push(PoolMutation::Release {
                    kind,
                    id: id.clone(),
                });
            }
        }

        info!(
            job = %entry.job, assessment = %entry.assessment_id, ?reason,
            "retiring ledger entry"
        );
        plan.ledger_deletions.push(entry.job.clone());
    }

    let surviving: BTreeSet<&str> = ledger
        .iter()
        .map(|a| a.job.as_str())
        .filter(|job| !plan.ledger_deletions.iter().any(|d| d == job))
        .collect();

    let orphans = orphaned(&pool.personnel, &surviving)
        .chain(orphaned(&pool.equipment, &surviving))
        .filter(|(kind, id)| !released.contains(&(*kind, id.to_string())))
        .map(|(kind, id)| PoolMutation::Release {
            kind,
            id: id.to_string(),
        })
        .collect::<Vec<_>>();
    if !orphans.is_empty() {
        info!(count = orphans.len(), "releasing units bound to vanished jobs");
    }
    plan.pool_mutations.extend(orphans);

    plan
}

/// Units bound to a job that is not in `jobs`.
fn orphaned<'a, U: Unit>(
    units: &'a [U],
    jobs: &'a BTreeSet<&str>,
) -> impl Iterator<Item = (ResourceKind, &'a str)> {
    units
        .iter()
        .filter(move |u| u.assigned_to().is_some_and(|job| !jobs.contains(job)))
        .map(|u| (U::KIND, u.id()))
}

#[cfg(test)]
mod tests {
    use super::*;

    use jiff::Timestamp;

    use crate::{
        allocate::allocate,
        model::{Assignment, AssignmentStatus, LocalityType, MaterialDraw, Requirements},
        pool::tests::{machine, person, stock},
    };

    fn assessment(id: &str, status: AssessmentStatus) -> Assessment {
        Assessment {
            id: id.into(),
            status,
            locality_type: LocalityType::Residential,
            location: None,
            issue_type: None,
            resources: Requirements::default(),
        }
    }

    fn entry(job: &str, assessment_id: &str, personnel: &[&str], equipment: &[&str]) -> Assignment {
        Assignment {
            job: job.into(),
            assessment_id: assessment_id.into(),
            personnel: personnel.iter().map(|s| s.to_string()).collect(),
            equipment: equipment.iter().map(|s| s.to_string()).collect(),
            materials: vec![MaterialDraw {
                material: "Asphalt".into(),
                quantity: 20,
            }],
            status: AssignmentStatus::Active,
            created_at: Timestamp::UNIX_EPOCH,
            locality_type: LocalityType::Residential,
        }
    }

    fn bound<U: Unit>(mut unit: U, job: &str) -> U {
        unit.set_assigned_to(Some(job.into()));
        unit
    }

    fn applied(pool: &ResourcePool, plan: &SweepPlan) -> ResourcePool {
        let mut pool = pool.clone();
        for m in &plan.pool_mutations {
            assert!(pool.apply(m));
        }
        pool
    }

    fn remaining(ledger: &Ledger, plan: &SweepPlan) -> Ledger {
        let mut ledger = ledger.clone();
        for job in &plan.ledger_deletions {
            ledger.remove(job);
        }
        ledger
    }

    #[test]
    fn completed_job_releases_its_crew() {
        let pool = ResourcePool {
            personnel: vec![bound(person("EMP-1234", "RoadCrew"), "Main Street")],
            equipment: vec![bound(machine("EQ-1", "Asphalt Paver"), "Main Street")],
            materials: vec![stock("MAT-1", "Asphalt", 10)],
        };
        let ledger: Ledger = [entry("Main Street", "a-1", &["EMP-1234"], &["EQ-1"])]
            .into_iter()
            .collect();
        let assessments = [assessment("a-1", AssessmentStatus::Completed)];

        let plan = sweep(&ledger, &assessments, &pool);

        assert_eq!(plan.ledger_deletions, ["Main Street"]);
        assert_eq!(
            plan.pool_mutations,
            [
                PoolMutation::Release {
                    kind: ResourceKind::Personnel,
                    id: "EMP-1234".into()
                },
                PoolMutation::Release {
                    kind: ResourceKind::Equipment,
                    id: "EQ-1".into()
                },
            ]
        );
        assert!(plan.inconsistencies.is_empty());

        let after = applied(&pool, &plan);
        let crew = after.list_available(ResourceKind::Personnel, Some("RoadCrew"));
        assert_eq!(crew.len(), 1);
        // Materials are consumed, not returned.
        assert_eq!(after.materials[0].quantity, 10);
    }

    #[test]
    fn active_jobs_are_left_alone() {
        let pool = ResourcePool {
            personnel: vec![bound(person("EMP-1", "RoadCrew"), "Main Street")],
            ..ResourcePool::default()
        };
        let ledger: Ledger = [entry("Main Street", "a-1", &["EMP-1"], &[])]
            .into_iter()
            .collect();

        for status in [
            AssessmentStatus::Assessed,
            AssessmentStatus::OnHold,
            AssessmentStatus::InProgress,
        ] {
            let plan = sweep(&ledger, &[assessment("a-1", status)], &pool);
            assert!(plan.is_empty(), "{status} should not be swept");
        }
    }

    #[test]
    fn entry_for_vanished_assessment_is_retired() {
        let pool = ResourcePool {
            personnel: vec![bound(person("EMP-1", "RoadCrew"), "job-a-9")],
            ..ResourcePool::default()
        };
        let ledger: Ledger = [entry("job-a-9", "a-9", &["EMP-1"], &[])]
            .into_iter()
            .collect();

        let plan = sweep(&ledger, &[], &pool);

        assert_eq!(plan.ledger_deletions, ["job-a-9"]);
        assert_eq!(plan.pool_mutations.len(), 1);
    }

    #[test]
    fn missing_resource_is_skipped_not_fatal() {
        let pool = ResourcePool {
            personnel: vec![bound(person("EMP-1", "RoadCrew"), "Main Street")],
            ..ResourcePool::default()
        };
        let ledger: Ledger = [entry("Main Street", "a-1", &["EMP-1", "EMP-GONE"], &[])]
            .into_iter()
            .collect();

        let plan = sweep(&ledger, &[assessment("a-1", AssessmentStatus::Completed)], &pool);

        assert_eq!(plan.ledger_deletions, ["Main Street"]);
        assert_eq!(plan.pool_mutations.len(), 1);
        assert_eq!(
            plan.inconsistencies,
            [Inconsistency::MissingResource {
                job: "Main Street".into(),
                kind: ResourceKind::Personnel,
                id: "EMP-GONE".into(),
            }]
        );
    }

    #[test]
    fn unit_rebound_elsewhere_is_not_released() {
        let pool = ResourcePool {
            personnel: vec![bound(person("EMP-1", "RoadCrew"), "Elm Road")],
            ..ResourcePool::default()
        };
        let ledger: Ledger = [
            entry("Main Street", "a-1", &["EMP-1"], &[]),
            entry("Elm Road", "a-2", &["EMP-1"], &[]),
        ]
        .into_iter()
        .collect();
        let assessments = [
            assessment("a-1", AssessmentStatus::Completed),
            assessment("a-2", AssessmentStatus::InProgress),
        ];

        let plan = sweep(&ledger, &assessments, &pool);

        assert_eq!(plan.ledger_deletions, ["Main Street"]);
        assert!(plan.pool_mutations.is_empty());
        assert!(matches!(
            &plan.inconsistencies[..],
            [Inconsistency::ForeignHolder { holder: Some(h), .. }] if h == "Elm Road"
        ));
    }

    #[test]
    fn orphaned_references_are_repaired() {
        let pool = ResourcePool {
            personnel: vec![
                bound(person("EMP-1", "RoadCrew"), "Deleted Job"),
                bound(person("EMP-2", "RoadCrew"), "Main Street"),
            ],
            equipment: vec![bound(machine("EQ-1", "Roller"), "Deleted Job")],
            materials: vec![],
        };
        let ledger: Ledger = [entry("Main Street", "a-1", &["EMP-2"], &[])]
            .into_iter()
            .collect();

        let plan = sweep(&ledger, &[assessment("a-1", AssessmentStatus::InProgress)], &pool);

        assert!(plan.ledger_deletions.is_empty());
        assert_eq!(
            plan.pool_mutations,
            [
                PoolMutation::Release {
                    kind: ResourceKind::Personnel,
                    id: "EMP-1".into()
                },
                PoolMutation::Release {
                    kind: ResourceKind::Equipment,
                    id: "EQ-1".into()
                },
            ]
        );
    }

    #[test]
    fn unlisted_unit_of_retired_job_is_freed_once() {
        // EQ-2 was bound out of band: the entry does not list it.
        let pool = ResourcePool {
            equipment: vec![
                bound(machine("EQ-1", "Roller"), "Main Street"),
                bound(machine("EQ-2", "Roller"), "Main Street"),
            ],
            ..ResourcePool::default()
        };
        let ledger: Ledger = [entry("Main Street", "a-1", &[], &["EQ-1"])]
            .into_iter()
            .collect();

        let plan = sweep(&ledger, &[assessment("a-1", AssessmentStatus::Completed)], &pool);

        let ids: Vec<&str> = plan.pool_mutations.iter().map(PoolMutation::id).collect();
        assert_eq!(ids, ["EQ-1", "EQ-2"]);
    }

    #[test]
    fn second_sweep_is_empty() {
        let pool = ResourcePool {
            personnel: vec![
                bound(person("EMP-1", "RoadCrew"), "Main Street"),
                bound(person("EMP-2", "RoadCrew"), "Nowhere"),
            ],
            ..ResourcePool::default()
        };
        let ledger: Ledger = [entry("Main Street", "a-1", &["EMP-1", "EMP-GONE"], &[])]
            .into_iter()
            .collect();
        let assessments = [assessment("a-1", AssessmentStatus::Completed)];

        let first = sweep(&ledger, &assessments, &pool);
        assert!(!first.is_empty());

        let pool = applied(&pool, &first);
        let ledger = remaining(&ledger, &first);
        let second = sweep(&ledger, &assessments, &pool);

        assert!(second.is_empty());
        assert!(second.inconsistencies.is_empty());
    }

    #[test]
    fn released_unit_is_selectable_again() {
        let pool = ResourcePool {
            personnel: vec![person("EMP-1234", "RoadCrew")],
            ..ResourcePool::default()
        };
        let mut first = assessment("a-1", AssessmentStatus::Assessed);
        first.resources.labour.insert("RoadCrew".into(), 1);
        let mut second = assessment("a-2", AssessmentStatus::Assessed);
        second.resources.labour.insert("RoadCrew".into(), 1);

        let plan = allocate(&[first.clone()], &pool, &Ledger::new(), Timestamp::UNIX_EPOCH);
        let mut pool = pool.clone();
        for m in &plan.pool_mutations {
            pool.apply(m);
        }
        let ledger: Ledger = plan.assignments.into_iter().collect();
        let free = pool.list_available(ResourceKind::Personnel, None);
        assert!(free.is_empty());

        first.status = AssessmentStatus::Completed;
        let swept = sweep(&ledger, &[first.clone()], &pool);
        let pool = applied(&pool, &swept);
        let ledger = remaining(&ledger, &swept);
        assert!(ledger.is_empty());
        assert_eq!(pool.personnel[0].assigned_to, None);

        let plan = allocate(&[first, second], &pool, &ledger, Timestamp::UNIX_EPOCH);
        assert_eq!(plan.status_updates["a-2"], AssessmentStatus::InProgress);
        assert_eq!(plan.assignments[0].personnel, ["EMP-1234"]);
    }
}
