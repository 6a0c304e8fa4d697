//! Core data model for roadworks.
//!
//! These types are the records the engine operates on:
//! resource pools, assessments and their requirement manifests,
//! and the ledger entries that bind resources to jobs.

mod assessment;
mod assignment;
mod resource;
mod snapshot;

pub use assessment::{Assessment, AssessmentStatus, LocalityType, ManifestError, Requirements};
pub use assignment::{Assignment, AssignmentStatus, MaterialDraw};
pub use resource::{Equipment, Material, MaterialStatus, Personnel, ResourceKind, Unit, UnitStatus};
pub use snapshot::Snapshot;

pub(crate) use resource::normalize_assignment;

/// A stored or typed status string that names no known variant.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {what}: {value}")]
pub struct ParseStatusError {
    what: &'static str,
    value: String,
}

impl ParseStatusError {
    pub(crate) fn new(what: &'static str, value: &str) -> Self {
        Self {
            what,
            value: value.to_string(),
        }
    }
}
