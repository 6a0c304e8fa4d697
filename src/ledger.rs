//! The assignment ledger: active jobs keyed by job name.

use std::collections::{BTreeMap, BTreeSet};

use crate::model::{Assessment, Assignment};

/// Active assignments, ordered by job name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Ledger {
    entries: BTreeMap<String, Assignment>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, job: &str) -> Option<&Assignment> {
        self.entries.get(job)
    }

    pub fn contains(&self, job: &str) -> bool {
        self.entries.contains_key(job)
    }

    /// Insert an entry, replacing any entry with the same job name.
    pub fn insert(&mut self, assignment: Assignment) -> Option<Assignment> {
        self.entries.insert(assignment.job.clone(), assignment)
    }

    pub fn remove(&mut self, job: &str) -> Option<Assignment> {
        self.entries.remove(job)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Assignment> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Pick a job name for a newly resourced assessment.
    ///
    /// Prefers the assessment's location name. Falls back to `job-<id>`
    /// when there is no location or the location is already a job, in
    /// this ledger or in `pending` (names handed out earlier in the same
    /// pass). A numeric suffix breaks any remaining collision.
    pub fn job_name_for(&self, assessment: &Assessment, pending: &BTreeSet<String>) -> String {
        let taken = |name: &str| self.contains(name) || pending.contains(name);

        if let Some(location) = assessment
            .location
            .as_deref()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            && !taken(location)
        {
            return location.to_string();
        }

        let fallback = format!("job-{}", assessment.id);
        if !taken(&fallback) {
            return fallback;
        }

        let mut n = 2u32;
        loop {
            let name = format!("{fallback}-{n}");
            if !taken(&name) {
                return name;
            }
            n += 1;
        }
    }
}

impl FromIterator<Assignment> for Ledger {
    fn from_iter<I: IntoIterator<Item = Assignment>>(iter: I) -> Self {
        let mut ledger = Self::new();
        for assignment in iter {
            ledger.insert(assignment);
        }
        ledger
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use jiff::Timestamp;

    use crate::model::{AssessmentStatus, AssignmentStatus, LocalityType, Requirements};

    fn assessment(id: &str, location: Option<&str>) -> Assessment {
        Assessment {
            id: id.into(),
            status: AssessmentStatus::Assessed,
            locality_type: LocalityType::Mixed,
            location: location.map(String::from),
            issue_type: None,
            resources: Requirements::default(),
        }
    }

    fn entry(job: &str) -> Assignment {
        Assignment {
            job: job.into(),
            assessment_id: "a-1".into(),
            personnel: vec![],
            equipment: vec![],
            materials: vec![],
            status: AssignmentStatus::Active,
            created_at: Timestamp::UNIX_EPOCH,
            locality_type: LocalityType::Mixed,
        }
    }

    #[test]
    fn job_name_prefers_location() {
        let ledger = Ledger::new();
        let a = assessment("7", Some("Main Street"));
        assert_eq!(ledger.job_name_for(&a, &BTreeSet::new()), "Main Street");
    }

    #[test]
    fn job_name_falls_back_without_location() {
        let ledger = Ledger::new();
        assert_eq!(
            ledger.job_name_for(&assessment("7", None), &BTreeSet::new()),
            "job-7"
        );
        assert_eq!(
            ledger.job_name_for(&assessment("8", Some("   ")), &BTreeSet::new()),
            "job-8"
        );
    }

    #[test]
    fn job_name_avoids_existing_and_pending_names() {
        let ledger: Ledger = [entry("Main Street")].into_iter().collect();
        let a = assessment("7", Some("Main Street"));
        assert_eq!(ledger.job_name_for(&a, &BTreeSet::new()), "job-7");

        let pending = BTreeSet::from(["job-7".to_string()]);
        assert_eq!(ledger.job_name_for(&a, &pending), "job-7-2");
    }

    #[test]
    fn job_name_suffix_skips_every_taken_name() {
        let ledger: Ledger = [entry("Main Street"), entry("job-7")].into_iter().collect();
        let pending = BTreeSet::from(["job-7-2".to_string()]);

        let a = assessment("7", Some("Main Street"));
        assert_eq!(ledger.job_name_for(&a, &pending), "job-7-3");
    }
}
