//! The resource pool: personnel, equipment and materials in pool order.
//!
//! Pool order is the order records were added to the store. Allocation
//! takes the first matching records in this order, so it is part of the
//! contract rather than an accident of storage.

use serde::{Deserialize, Serialize};

use crate::model::{Equipment, Material, MaterialStatus, Personnel, ResourceKind, Unit};

/// Snapshot of every resource record, by kind.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourcePool {
    pub personnel: Vec<Personnel>,
    pub equipment: Vec<Equipment>,
    pub materials: Vec<Material>,
}

/// Borrowed view of a record of any kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceRef<'a> {
    Personnel(&'a Personnel),
    Equipment(&'a Equipment),
    Material(&'a Material),
}

impl ResourceRef<'_> {
    pub fn id(&self) -> &str {
        match self {
            Self::Personnel(p) => &p.id,
            Self::Equipment(e) => &e.id,
            Self::Material(m) => &m.id,
        }
    }

    /// Role, equipment type, or material name.
    pub fn class(&self) -> &str {
        match self {
            Self::Personnel(p) => &p.role,
            Self::Equipment(e) => &e.equipment_type,
            Self::Material(m) => &m.material,
        }
    }

    /// Usable and free: an allocation pass could pick it.
    pub fn is_available(&self) -> bool {
        match self {
            Self::Personnel(p) => p.is_available(),
            Self::Equipment(e) => e.is_available(),
            Self::Material(m) => m.is_available(),
        }
    }
}

/// A change to one resource record, produced by allocation or sweeping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum PoolMutation {
    /// Bind a unit to a job.
    Assign {
        kind: ResourceKind,
        id: String,
        job: String,
    },

    /// Return a unit to the pool.
    Release { kind: ResourceKind, id: String },

    /// Draw stock from a material record, leaving `remaining`.
    Draw {
        id: String,
        remaining: u32,
        status: MaterialStatus,
    },
}

impl PoolMutation {
    pub fn id(&self) -> &str {
        match self {
            Self::Assign { id, .. } | Self::Release { id, .. } | Self::Draw { id, .. } => id,
        }
    }
}

impl ResourcePool {
    /// Every record of `kind`, in pool order.
    pub fn records(&self, kind: ResourceKind) -> Vec<ResourceRef<'_>> {
        match kind {
            ResourceKind::Personnel => self.personnel.iter().map(ResourceRef::Personnel).collect(),
            ResourceKind::Equipment => self.equipment.iter().map(ResourceRef::Equipment).collect(),
            ResourceKind::Material => self.materials.iter().map(ResourceRef::Material).collect(),
        }
    }

    /// Records of `kind` that are usable and free, optionally restricted
    /// to one role, equipment type, or material name.
    pub fn list_available(&self, kind: ResourceKind, filter: Option<&str>) -> Vec<ResourceRef<'_>> {
        self.records(kind)
            .into_iter()
            .filter(|r| r.is_available() && filter.is_none_or(|f| f == r.class()))
            .collect()
    }

    pub fn available_materials<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Material> {
        self.materials
            .iter()
            .filter(move |m| m.is_available() && m.material == name)
    }

    /// Look up any record by kind and ID.
    pub fn find(&self, kind: ResourceKind, id: &str) -> Option<ResourceRef<'_>> {
        match kind {
            ResourceKind::Personnel => self
                .personnel
                .iter()
                .find(|p| p.id == id)
                .map(ResourceRef::Personnel),
            ResourceKind::Equipment => self
                .equipment
                .iter()
                .find(|e| e.id == id)
                .map(ResourceRef::Equipment),
            ResourceKind::Material => self
                .materials
                .iter()
                .find(|m| m.id == id)
                .map(ResourceRef::Material),
        }
    }

    /// Job a unit is bound to. `None` if the unit is free or does not exist.
    pub fn holder(&self, kind: ResourceKind, id: &str) -> Option<&str> {
        match self.find(kind, id)? {
            ResourceRef::Personnel(p) => p.assigned_to.as_deref(),
            ResourceRef::Equipment(e) => e.assigned_to.as_deref(),
            ResourceRef::Material(m) => m.assigned_to.as_deref(),
        }
    }

    /// Apply one mutation in place.
    ///
    /// Returns `false` if the target record does not exist.
    pub fn apply(&mut self, mutation: &PoolMutation) -> bool {
        match mutation {
            PoolMutation::Assign { kind, id, job } => {
                self.set_assigned_to(*kind, id, Some(job.clone()))
            }
            PoolMutation::Release { kind, id } => self.set_assigned_to(*kind, id, None),
            PoolMutation::Draw {
                id,
                remaining,
                status,
            } => match self.materials.iter_mut().find(|m| &m.id == id) {
                Some(m) => {
                    m.quantity = *remaining;
                    m.status = *status;
                    true
                }
                None => false,
            },
        }
    }

    fn set_assigned_to(&mut self, kind: ResourceKind, id: &str, job: Option<String>) -> bool {
        match kind {
            ResourceKind::Personnel => set_unit(&mut self.personnel, id, job),
            ResourceKind::Equipment => set_unit(&mut self.equipment, id, job),
            ResourceKind::Material => match self.materials.iter_mut().find(|m| m.id == id) {
                Some(m) => {
                    m.assigned_to = job;
                    true
                }
                None => false,
            },
        }
    }
}

fn set_unit<U: Unit>(units: &mut [U], id: &str, job: Option<String>) -> bool {
    match units.iter_mut().find(|u| u.id() == id) {
        Some(u) => {
            u.set_assigned_to(job);
            true
        }
        None => false,
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    use crate::model::UnitStatus;

    pub(crate) fn person(id: &str, role: &str) -> Personnel {
        Personnel {
            id: id.into(),
            role: role.into(),
            status: UnitStatus::Active,
            assigned_to: None,
        }
    }

    pub(crate) fn machine(id: &str, equipment_type: &str) -> Equipment {
        Equipment {
            id: id.into(),
            equipment_type: equipment_type.into(),
            status: UnitStatus::Active,
            assigned_to: None,
        }
    }

    pub(crate) fn stock(id: &str, material: &str, quantity: u32) -> Material {
        Material {
            id: id.into(),
            material: material.into(),
            status: MaterialStatus::Available,
            quantity,
            assigned_to: None,
        }
    }

    fn sample_pool() -> ResourcePool {
        let mut busy = person("EMP-3", "RoadCrew");
        busy.assigned_to = Some("Main Street".into());
        let mut resting = person("EMP-4", "RoadCrew");
        resting.status = UnitStatus::OnLeave;
        let mut broken = machine("EQ-2", "Roller");
        broken.status = UnitStatus::Maintenance;
        let mut ordered = stock("MAT-2", "Gravel", 40);
        ordered.status = MaterialStatus::Ordered;

        ResourcePool {
            personnel: vec![
                person("EMP-1", "RoadCrew"),
                person("EMP-2", "Foreman"),
                busy,
                resting,
                person("EMP-5", "RoadCrew"),
            ],
            equipment: vec![machine("EQ-1", "Asphalt Paver"), broken],
            materials: vec![stock("MAT-1", "Asphalt", 30), ordered],
        }
    }

    #[test]
    fn list_available_filters_status_and_assignment() {
        let pool = sample_pool();

        let crew = pool.list_available(ResourceKind::Personnel, Some("RoadCrew"));
        let ids: Vec<&str> = crew.iter().map(ResourceRef::id).collect();
        assert_eq!(ids, ["EMP-1", "EMP-5"]);

        let everyone = pool.list_available(ResourceKind::Personnel, None);
        assert_eq!(everyone.len(), 3);

        let rollers = pool.list_available(ResourceKind::Equipment, Some("Roller"));
        assert!(rollers.is_empty());

        let materials = pool.list_available(ResourceKind::Material, None);
        assert_eq!(materials.len(), 1);
        assert_eq!(materials[0].class(), "Asphalt");
    }

    #[test]
    fn records_keep_pool_order_regardless_of_availability() {
        let pool = sample_pool();
        let all = pool.records(ResourceKind::Personnel);
        let ids: Vec<&str> = all.iter().map(ResourceRef::id).collect();
        assert_eq!(ids, ["EMP-1", "EMP-2", "EMP-3", "EMP-4", "EMP-5"]);

        let free: Vec<bool> = all.iter().map(ResourceRef::is_available).collect();
        assert_eq!(free, [true, true, false, false, true]);

        assert_eq!(pool.records(ResourceKind::Equipment).len(), 2);
        assert_eq!(pool.available_materials("Gravel").count(), 0);
    }

    #[test]
    fn assign_then_release_restores_record() {
        let mut pool = sample_pool();
        let before = pool.personnel[0].clone();

        assert!(pool.apply(&PoolMutation::Assign {
            kind: ResourceKind::Personnel,
            id: "EMP-1".into(),
            job: "Elm Road".into(),
        }));
        assert_eq!(pool.holder(ResourceKind::Personnel, "EMP-1"), Some("Elm Road"));
        let crew = pool.list_available(ResourceKind::Personnel, Some("RoadCrew"));
        assert_eq!(crew.len(), 1);

        assert!(pool.apply(&PoolMutation::Release {
            kind: ResourceKind::Personnel,
            id: "EMP-1".into(),
        }));
        assert_eq!(pool.personnel[0], before);
    }

    #[test]
    fn apply_to_missing_record_reports_false() {
        let mut pool = sample_pool();
        assert!(!pool.apply(&PoolMutation::Release {
            kind: ResourceKind::Equipment,
            id: "EQ-404".into(),
        }));
        assert!(!pool.apply(&PoolMutation::Draw {
            id: "MAT-404".into(),
            remaining: 0,
            status: MaterialStatus::Unavailable,
        }));
    }

    #[test]
    fn draw_sets_quantity_and_status() {
        let mut pool = sample_pool();
        pool.apply(&PoolMutation::Draw {
            id: "MAT-1".into(),
            remaining: 0,
            status: MaterialStatus::Unavailable,
        });
        assert_eq!(pool.materials[0].quantity, 0);
        assert!(pool.available_materials("Asphalt").next().is_none());
    }
}
