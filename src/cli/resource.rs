//! Resource pool commands: add, list, remove.

use clap::{Subcommand, ValueEnum};
use uuid::Uuid;

use crate::{
    model::{Equipment, Material, MaterialStatus, Personnel, ResourceKind, UnitStatus},
    storage::Storage,
};

use super::format::format_resource;

#[derive(Debug, Subcommand)]
pub enum ResourceCommand {
    /// Add a person, machine, or material record. Prints the ID.
    Add {
        #[command(subcommand)]
        record: NewResource,
    },

    /// List resource records in pool order.
    List {
        /// Only this kind.
        #[arg(long, value_enum)]
        kind: Option<KindArg>,

        /// Only records an allocation pass could pick.
        #[arg(long)]
        available: bool,
    },

    /// Remove a resource record.
    Remove {
        #[arg(value_enum)]
        kind: KindArg,
        id: String,
    },
}

#[derive(Debug, Subcommand)]
pub enum NewResource {
    /// A crew member.
    Personnel {
        /// Role, e.g. "RoadCrew".
        role: String,

        /// Record ID. Generated (`EMP-xxxxxxxx`) when omitted.
        #[arg(long)]
        id: Option<String>,

        #[arg(long, value_enum, default_value = "active")]
        status: UnitStatusArg,
    },

    /// A machine.
    Equipment {
        /// Equipment type, e.g. "Asphalt Paver".
        equipment_type: String,

        /// Record ID. Generated (`EQ-xxxxxxxx`) when omitted.
        #[arg(long)]
        id: Option<String>,

        #[arg(long, value_enum, default_value = "active")]
        status: UnitStatusArg,
    },

    /// A stock of material.
    Material {
        /// Material name, e.g. "Asphalt".
        material: String,

        quantity: u32,

        /// Record ID. Generated (`MAT-xxxxxxxx`) when omitted.
        #[arg(long)]
        id: Option<String>,

        #[arg(long, value_enum, default_value = "available")]
        status: MaterialStatusArg,
    },
}

/// CLI-facing resource kind, mapped to the domain `ResourceKind`.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum KindArg {
    Personnel,
    Equipment,
    Material,
}

impl KindArg {
    fn to_domain(self) -> ResourceKind {
        match self {
            Self::Personnel => ResourceKind::Personnel,
            Self::Equipment => ResourceKind::Equipment,
            Self::Material => ResourceKind::Material,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum UnitStatusArg {
    Active,
    Inactive,
    Maintenance,
    OnLeave,
}

impl UnitStatusArg {
    fn to_domain(self) -> UnitStatus {
        match self {
            Self::Active => UnitStatus::Active,
            Self::Inactive => UnitStatus::Inactive,
            Self::Maintenance => UnitStatus::Maintenance,
            Self::OnLeave => UnitStatus::OnLeave,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum MaterialStatusArg {
    Available,
    Ordered,
    Unavailable,
}

impl MaterialStatusArg {
    fn to_domain(self) -> MaterialStatus {
        match self {
            Self::Available => MaterialStatus::Available,
            Self::Ordered => MaterialStatus::Ordered,
            Self::Unavailable => MaterialStatus::Unavailable,
        }
    }
}

pub(super) fn run(storage: &Storage, command: ResourceCommand) -> Result<(), String> {
    match command {
        ResourceCommand::Add { record } => cmd_add(storage, record),
        ResourceCommand::List { kind, available } => {
            cmd_list(storage, kind.map(KindArg::to_domain), available)
        }
        ResourceCommand::Remove { kind, id } => cmd_remove(storage, kind.to_domain(), &id),
    }
}

fn cmd_add(storage: &Storage, record: NewResource) -> Result<(), String> {
    let id = match record {
        NewResource::Personnel { role, id, status } => {
            let person = Personnel {
                id: id.unwrap_or_else(|| generate_id("EMP")),
                role,
                status: status.to_domain(),
                assigned_to: None,
            };
            storage
                .add_personnel(&person)
                .map_err(|e| format!("failed to add personnel: {e}"))?;
            person.id
        }
        NewResource::Equipment {
            equipment_type,
            id,
            status,
        } => {
            let machine = Equipment {
                id: id.unwrap_or_else(|| generate_id("EQ")),
                equipment_type,
                status: status.to_domain(),
                assigned_to: None,
            };
            storage
                .add_equipment(&machine)
                .map_err(|e| format!("failed to add equipment: {e}"))?;
            machine.id
        }
        NewResource::Material {
            material,
            quantity,
            id,
            status,
        } => {
            let stock = Material {
                id: id.unwrap_or_else(|| generate_id("MAT")),
                material,
                status: status.to_domain(),
                quantity,
                assigned_to: None,
            };
            storage
                .add_material(&stock)
                .map_err(|e| format!("failed to add material: {e}"))?;
            stock.id
        }
    };

    println!("{id}");
    Ok(())
}

fn cmd_list(storage: &Storage, kind: Option<ResourceKind>, available: bool) -> Result<(), String> {
    let pool = storage
        .load_pool()
        .map_err(|e| format!("failed to load resources: {e}"))?;
    let kinds = match kind {
        Some(kind) => vec![kind],
        None => vec![
            ResourceKind::Personnel,
            ResourceKind::Equipment,
            ResourceKind::Material,
        ],
    };

    let lines: Vec<String> = kinds
        .into_iter()
        .flat_map(|k| {
            if available {
                pool.list_available(k, None)
            } else {
                pool.records(k)
            }
        })
        .map(format_resource)
        .collect();

    if lines.is_empty() {
        println!("No resources");
        return Ok(());
    }
    for line in &lines {
        println!("{line}");
    }
    Ok(())
}

fn cmd_remove(storage: &Storage, kind: ResourceKind, id: &str) -> Result<(), String> {
    storage
        .remove_resource(kind, id)
        .map_err(|e| format!("failed to remove {kind}: {e}"))?;
    eprintln!("Removed {kind} {id}");
    Ok(())
}

/// `PREFIX-` followed by 8 upper-case hex digits.
fn generate_id(prefix: &str) -> String {
    let hex = Uuid::new_v4().simple().to_string();
    format!("{prefix}-{}", hex[..8].to_ascii_uppercase())
}
