//! Assessments: supervisor-confirmed repair jobs and what they need.

use std::{collections::BTreeMap, fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use super::ParseStatusError;

/// Where an assessment stands in the repair workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssessmentStatus {
    /// Confirmed by a supervisor, waiting for resources.
    Assessed,

    /// A previous allocation pass could not resource it.
    OnHold,

    /// Fully resourced; work has started.
    InProgress,

    /// Work finished. Set externally, never by the allocator.
    Completed,
}

impl AssessmentStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Assessed => "assessed",
            Self::OnHold => "on_hold",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
        }
    }

    /// Waiting for resources: the statuses the allocator picks up.
    pub fn is_pending(self) -> bool {
        matches!(self, Self::Assessed | Self::OnHold)
    }
}

impl fmt::Display for AssessmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AssessmentStatus {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "assessed" => Ok(Self::Assessed),
            "on_hold" => Ok(Self::OnHold),
            "in_progress" => Ok(Self::InProgress),
            "completed" => Ok(Self::Completed),
            other => Err(ParseStatusError::new("assessment status", other)),
        }
    }
}

/// Locality classification of the repair site. Drives allocation priority.
///
/// Parsing never fails: anything unrecognised is `Unknown`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum LocalityType {
    Commercial,
    Industrial,
    Mixed,
    Residential,
    #[default]
    Unknown,
}

impl LocalityType {
    /// Allocation rank, lower is served first.
    ///
    /// `Unknown` ties with `Residential` at the bottom.
    pub fn priority(self) -> u8 {
        match self {
            Self::Commercial => 1,
            Self::Industrial => 2,
            Self::Mixed => 3,
            Self::Residential | Self::Unknown => 4,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Commercial => "commercial",
            Self::Industrial => "industrial",
            Self::Mixed => "mixed",
            Self::Residential => "residential",
            Self::Unknown => "unknown",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "commercial" => Self::Commercial,
            "industrial" => Self::Industrial,
            "mixed" => Self::Mixed,
            "residential" => Self::Residential,
            _ => Self::Unknown,
        }
    }
}

impl fmt::Display for LocalityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for LocalityType {
    fn from(value: String) -> Self {
        Self::parse(&value)
    }
}

impl From<LocalityType> for String {
    fn from(value: LocalityType) -> Self {
        value.as_str().to_string()
    }
}

/// Boundary validation failures for a requirement manifest.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ManifestError {
    #[error("{section} requirement has an empty name")]
    EmptyName { section: &'static str },

    #[error("{section} requirement '{name}' has a zero count")]
    ZeroCount { section: &'static str, name: String },
}

/// What an assessment needs: name → count, per resource kind.
///
/// Read-only once the assessment is assessed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Requirements {
    /// Equipment type → number of machines.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub equipment: BTreeMap<String, u32>,

    /// Personnel role → head count.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub labour: BTreeMap<String, u32>,

    /// Material name → quantity.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub materials: BTreeMap<String, u32>,
}

impl Requirements {
    /// True when nothing at all is requested.
    pub fn is_empty(&self) -> bool {
        self.equipment.is_empty() && self.labour.is_empty() && self.materials.is_empty()
    }

    /// Reject blank names and zero counts.
    pub fn validate(&self) -> Result<(), ManifestError> {
        let sections = [
            ("equipment", &self.equipment),
            ("labour", &self.labour),
            ("materials", &self.materials),
        ];
        for (section, map) in sections {
            for (name, count) in map {
                if name.trim().is_empty() {
                    return Err(ManifestError::EmptyName { section });
                }
                if *count == 0 {
                    return Err(ManifestError::ZeroCount {
                        section,
                        name: name.clone(),
                    });
                }
            }
        }
        Ok(())
    }
}

/// A repair job confirmed by a supervisor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assessment {
    pub id: String,
    pub status: AssessmentStatus,

    #[serde(default)]
    pub locality_type: LocalityType,

    /// Road or location name. Becomes the job name when resourced.
    #[serde(default, alias = "roadName", skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issue_type: Option<String>,

    #[serde(default)]
    pub resources: Requirements,
}
