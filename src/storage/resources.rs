//! Resource storage: personnel, equipment and materials.

use rusqlite::{Connection, params};

use crate::{
    model::{Equipment, Material, Personnel, ResourceKind, normalize_assignment},
    pool::{PoolMutation, ResourcePool},
};

use super::{Result, Storage, StorageError, corrupt, exists};

impl Storage {
    /// Adds a person to the pool. The ID must be new.
    pub fn add_personnel(&self, person: &Personnel) -> Result<()> {
        insert_personnel(&self.conn, person)
    }

    /// Adds a machine to the pool. The ID must be new.
    pub fn add_equipment(&self, machine: &Equipment) -> Result<()> {
        insert_equipment(&self.conn, machine)
    }

    /// Adds a material record to the pool. The ID must be new.
    pub fn add_material(&self, material: &Material) -> Result<()> {
        insert_material(&self.conn, material)
    }

    /// Removes a resource record.
    ///
    /// Any ledger entry still listing it is left for the sweeper to repair.
    pub fn remove_resource(&self, kind: ResourceKind, id: &str) -> Result<()> {
        let rows = self
            .conn
            .execute(&format!("DELETE FROM {} WHERE id = ?1", table(kind)), [id])?;
        if rows == 0 {
            return Err(StorageError::ResourceNotFound {
                kind,
                id: id.to_string(),
            });
        }
        Ok(())
    }

    /// Loads the whole pool in pool order.
    pub fn load_pool(&self) -> Result<ResourcePool> {
        load_pool(&self.conn)
    }
}

fn table(kind: ResourceKind) -> &'static str {
    match kind {
        ResourceKind::Personnel => "personnel",
        ResourceKind::Equipment => "equipment",
        ResourceKind::Material => "materials",
    }
}

fn ensure_new(conn: &Connection, kind: ResourceKind, id: &str) -> Result<()> {
    if exists(conn, table(kind), "id", id)? {
        return Err(StorageError::ResourceAlreadyExists {
            kind,
            id: id.to_string(),
        });
    }
    Ok(())
}

pub(super) fn insert_personnel(conn: &Connection, person: &Personnel) -> Result<()> {
    ensure_new(conn, ResourceKind::Personnel, &person.id)?;
    conn.execute(
        "INSERT INTO personnel (id, role, status, assigned_to) VALUES (?1, ?2, ?3, ?4)",
        params![
            person.id,
            person.role,
            person.status.as_str(),
            person.assigned_to
        ],
    )?;
    Ok(())
}

pub(super) fn insert_equipment(conn: &Connection, machine: &Equipment) -> Result<()> {
    ensure_new(conn, ResourceKind::Equipment, &machine.id)?;
    conn.execute(
        "INSERT INTO equipment (id, equipment_type, status, assigned_to) VALUES (?1, ?2, ?3, ?4)",
        params![
            machine.id,
            machine.equipment_type,
            machine.status.as_str(),
            machine.assigned_to
        ],
    )?;
    Ok(())
}

pub(super) fn insert_material(conn: &Connection, material: &Material) -> Result<()> {
    ensure_new(conn, ResourceKind::Material, &material.id)?;
    conn.execute(
        "INSERT INTO materials (id, material, status, quantity, assigned_to)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            material.id,
            material.material,
            material.status.as_str(),
            material.quantity,
            material.assigned_to
        ],
    )?;
    Ok(())
}

pub(super) fn load_pool(conn: &Connection) -> Result<ResourcePool> {
    Ok(ResourcePool {
        personnel: load_personnel(conn)?,
        equipment: load_equipment(conn)?,
        materials: load_materials(conn)?,
    })
}

fn load_personnel(conn: &Connection) -> Result<Vec<Personnel>> {
    let mut stmt =
        conn.prepare("SELECT id, role, status, assigned_to FROM personnel ORDER BY rowid")?;
    let rows = stmt.query_map([], |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, String>(2)?,
            row.get::<_, Option<String>>(3)?,
        ))
    })?;

    let mut personnel = Vec::new();
    for row in rows {
        let (id, role, status, assigned_to) = row?;
        personnel.push(Personnel {
            status: status
                .parse()
                .map_err(|e| corrupt(&format!("personnel {id}"), e))?,
            id,
            role,
            assigned_to: normalize_assignment(assigned_to),
        });
    }
    Ok(personnel)
}

fn load_equipment(conn: &Connection) -> Result<Vec<Equipment>> {
    let mut stmt = conn
        .prepare("SELECT id, equipment_type, status, assigned_to FROM equipment ORDER BY rowid")?;
    let rows = stmt.query_map([], |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, String>(2)?,
            row.get::<_, Option<String>>(3)?,
        ))
    })?;

    let mut equipment = Vec::new();
    for row in rows {
        let (id, equipment_type, status, assigned_to) = row?;
        equipment.push(Equipment {
            status: status
                .parse()
                .map_err(|e| corrupt(&format!("equipment {id}"), e))?,
            id,
            equipment_type,
            assigned_to: normalize_assignment(assigned_to),
        });
    }
    Ok(equipment)
}

fn load_materials(conn: &Connection) -> Result<Vec<Material>> {
    let mut stmt = conn.prepare(
        "SELECT id, material, status, quantity, assigned_to FROM materials ORDER BY rowid",
    )?;
    let rows = stmt.query_map([], |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, String>(2)?,
            row.get::<_, i64>(3)?,
            row.get::<_, Option<String>>(4)?,
        ))
    })?;

    let mut materials = Vec::new();
    for row in rows {
        let (id, material, status, quantity, assigned_to) = row?;
        materials.push(Material {
            status: status
                .parse()
                .map_err(|e| corrupt(&format!("material {id}"), e))?,
            quantity: u32::try_from(quantity)
                .map_err(|e| corrupt(&format!("material {id} quantity"), e))?,
            id,
            material,
            assigned_to: normalize_assignment(assigned_to),
        });
    }
    Ok(materials)
}

/// Writes one pool mutation. A missing record is an error: the caller's
/// transaction must not commit.
pub(super) fn apply_mutation(conn: &Connection, mutation: &PoolMutation) -> Result<()> {
    let (kind, rows) = match mutation {
        PoolMutation::Assign { kind, id, job } => (
            *kind,
            conn.execute(
                &format!("UPDATE {} SET assigned_to = ?1 WHERE id = ?2", table(*kind)),
                params![job, id],
            )?,
        ),
        PoolMutation::Release { kind, id } => (
            *kind,
            conn.execute(
                &format!("UPDATE {} SET assigned_to = NULL WHERE id = ?1", table(*kind)),
                [id],
            )?,
        ),
        PoolMutation::Draw {
            id,
            remaining,
            status,
        } => (
            ResourceKind::Material,
            conn.execute(
                "UPDATE materials SET quantity = ?1, status = ?2 WHERE id = ?3",
                params![remaining, status.as_str(), id],
            )?,
        ),
    };
    if rows == 0 {
        return Err(StorageError::ResourceNotFound {
            kind,
            id: mutation.id().to_string(),
        });
    }
    Ok(())
}
