//! Sufficiency report: free stock against outstanding demand.
//!
//! A planning view only. Allocation never consults it.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::{
    model::{Assessment, ResourceKind},
    pool::{ResourcePool, ResourceRef},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Sufficiency {
    Sufficient,
    Insufficient,
    /// Available but not asked for by any pending assessment.
    Excess,
}

impl Sufficiency {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Sufficient => "sufficient",
            Self::Insufficient => "insufficient",
            Self::Excess => "excess",
        }
    }
}

/// Demand and supply for one role, equipment type, or material.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceStatus {
    pub kind: ResourceKind,
    pub name: String,
    pub required: u64,
    pub available: u64,
    pub difference: i64,
    pub status: Sufficiency,
}

#[derive(Default)]
struct Tally {
    required: u64,
    available: u64,
}

/// Compare free stock with the combined demand of pending assessments.
///
/// Units count when active and free; materials count their summed
/// quantity across available records. Sorted by kind, then name.
pub fn sufficiency(pool: &ResourcePool, assessments: &[Assessment]) -> Vec<ResourceStatus> {
    let mut tallies: BTreeMap<(ResourceKind, String), Tally> = BTreeMap::new();

    let kinds = [
        ResourceKind::Personnel,
        ResourceKind::Equipment,
        ResourceKind::Material,
    ];
    for kind in kinds {
        for record in pool.list_available(kind, None) {
            let amount = match record {
                ResourceRef::Material(m) => u64::from(m.quantity),
                ResourceRef::Personnel(_) | ResourceRef::Equipment(_) => 1,
            };
            tally(&mut tallies, kind, record.class()).available += amount;
        }
    }

    for assessment in assessments.iter().filter(|a| a.status.is_pending()) {
        let r = &assessment.resources;
        let demand = r
            .labour
            .iter()
            .map(|(n, c)| (ResourceKind::Personnel, n, c))
            .chain(r.equipment.iter().map(|(n, c)| (ResourceKind::Equipment, n, c)))
            .chain(r.materials.iter().map(|(n, c)| (ResourceKind::Material, n, c)));
        for (kind, name, count) in demand {
            tally(&mut tallies, kind, name).required += u64::from(*count);
        }
    }

    tallies
        .into_iter()
        .map(|((kind, name), t)| {
            let difference = i64::try_from(t.available).unwrap_or(i64::MAX)
                - i64::try_from(t.required).unwrap_or(i64::MAX);
            let status = if difference < 0 {
                Sufficiency::Insufficient
            } else if t.required == 0 {
                Sufficiency::Excess
            } else {
                Sufficiency::Sufficient
            };
            ResourceStatus {
                kind,
                name,
                required: t.required,
                available: t.available,
                difference,
                status,
            }
        })
        .collect()
}

fn tally<'a>(
    tallies: &'a mut BTreeMap<(ResourceKind, String), Tally>,
    kind: ResourceKind,
    name: &str,
) -> &'a mut Tally {
    tallies.entry((kind, name.to_string())).or_default()
}
