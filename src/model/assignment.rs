//! Ledger entries: which resources are bound to which job.

use std::{fmt, str::FromStr};

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use super::{LocalityType, ParseStatusError};

/// Lifecycle of a ledger entry. Entries are deleted rather than closed,
/// so `Active` is the only state a stored entry has.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssignmentStatus {
    #[default]
    Active,
}

impl AssignmentStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
        }
    }
}

impl fmt::Display for AssignmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AssignmentStatus {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(Self::Active),
            other => Err(ParseStatusError::new("assignment status", other)),
        }
    }
}

/// Quantity of a material consumed by a job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaterialDraw {
    pub material: String,
    pub quantity: u32,
}

/// Binding of specific resource instances to one assessment, keyed by job name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assignment {
    pub job: String,
    pub assessment_id: String,

    #[serde(default)]
    pub personnel: Vec<String>,

    #[serde(default)]
    pub equipment: Vec<String>,

    #[serde(default)]
    pub materials: Vec<MaterialDraw>,

    #[serde(default)]
    pub status: AssignmentStatus,

    pub created_at: Timestamp,

    #[serde(default)]
    pub locality_type: LocalityType,
}
