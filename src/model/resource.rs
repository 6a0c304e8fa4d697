//! Resource records: the personnel, equipment and material pools.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Deserializer, Serialize};

use super::ParseStatusError;

/// The three kinds of resource an assessment can ask for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Personnel,
    Equipment,
    Material,
}

impl ResourceKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Personnel => "personnel",
            Self::Equipment => "equipment",
            Self::Material => "material",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle status shared by personnel and equipment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitStatus {
    Active,
    Inactive,
    Maintenance,
    OnLeave,
}

impl UnitStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
            Self::Maintenance => "maintenance",
            Self::OnLeave => "on_leave",
        }
    }
}

impl FromStr for UnitStatus {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(Self::Active),
            "inactive" => Ok(Self::Inactive),
            "maintenance" => Ok(Self::Maintenance),
            "on_leave" => Ok(Self::OnLeave),
            other => Err(ParseStatusError::new("unit status", other)),
        }
    }
}

/// Stock status of a material record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaterialStatus {
    Available,
    Ordered,
    Unavailable,
}

impl MaterialStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Available => "available",
            Self::Ordered => "ordered",
            Self::Unavailable => "unavailable",
        }
    }
}

impl FromStr for MaterialStatus {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "available" => Ok(Self::Available),
            "ordered" => Ok(Self::Ordered),
            "unavailable" => Ok(Self::Unavailable),
            other => Err(ParseStatusError::new("material status", other)),
        }
    }
}

/// A member of a road crew.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Personnel {
    pub id: String,
    pub role: String,
    pub status: UnitStatus,

    /// Job name this person is bound to. `None` means free.
    #[serde(default, deserialize_with = "free_as_none")]
    pub assigned_to: Option<String>,
}

/// A machine: pavers, rollers, trucks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Equipment {
    pub id: String,
    #[serde(rename = "type")]
    pub equipment_type: String,
    pub status: UnitStatus,
    #[serde(default, deserialize_with = "free_as_none")]
    pub assigned_to: Option<String>,
}

/// A stock of consumable material.
///
/// Materials are drawn down rather than bound to a job: the allocator
/// decrements `quantity` and never sets `assigned_to`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Material {
    pub id: String,
    pub material: String,
    pub status: MaterialStatus,
    pub quantity: u32,
    #[serde(default, deserialize_with = "free_as_none")]
    pub assigned_to: Option<String>,
}

/// Personnel and equipment are reserved whole, one job at a time.
///
/// Implemented by both so exact-count selection and release are written once.
pub trait Unit {
    const KIND: ResourceKind;

    fn id(&self) -> &str;

    /// The role or type an assessment asks for.
    fn class(&self) -> &str;

    fn status(&self) -> UnitStatus;

    fn assigned_to(&self) -> Option<&str>;

    fn set_assigned_to(&mut self, job: Option<String>);

    /// Active and not bound to any job.
    fn is_available(&self) -> bool {
        self.status() == UnitStatus::Active && self.assigned_to().is_none()
    }
}

impl Unit for Personnel {
    const KIND: ResourceKind = ResourceKind::Personnel;

    fn id(&self) -> &str {
        &self.id
    }

    fn class(&self) -> &str {
        &self.role
    }

    fn status(&self) -> UnitStatus {
        self.status
    }

    fn assigned_to(&self) -> Option<&str> {
        self.assigned_to.as_deref()
    }

    fn set_assigned_to(&mut self, job: Option<String>) {
        self.assigned_to = job;
    }
}

impl Unit for Equipment {
    const KIND: ResourceKind = ResourceKind::Equipment;

    fn id(&self) -> &str {
        &self.id
    }

    fn class(&self) -> &str {
        &self.equipment_type
    }

    fn status(&self) -> UnitStatus {
        self.status
    }

    fn assigned_to(&self) -> Option<&str> {
        self.assigned_to.as_deref()
    }

    fn set_assigned_to(&mut self, job: Option<String>) {
        self.assigned_to = job;
    }
}

impl Material {
    /// Usable stock that no job has claimed.
    pub fn is_available(&self) -> bool {
        self.status == MaterialStatus::Available && self.assigned_to.is_none()
    }
}

/// Normalise the "free" encodings found in imported records.
///
/// Older records mark a free unit with an empty string or the literal
/// `Unassigned`; both mean the same thing as a missing field.
pub(crate) fn normalize_assignment(value: Option<String>) -> Option<String> {
    value.filter(|s| {
        let s = s.trim();
        !s.is_empty() && !s.eq_ignore_ascii_case("unassigned")
    })
}

fn free_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(normalize_assignment)
}
