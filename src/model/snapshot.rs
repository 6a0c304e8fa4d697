//! Snapshot: the full record set, as exchanged with the outside world.

use serde::{Deserialize, Serialize};

use super::{Assessment, Assignment, Equipment, Material, Personnel};

/// Every record the engine reads or writes, in one JSON document.
///
/// Used by `import` and `export`. Missing sections are empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    #[serde(default)]
    pub personnel: Vec<Personnel>,

    #[serde(default)]
    pub equipment: Vec<Equipment>,

    #[serde(default)]
    pub materials: Vec<Material>,

    #[serde(default)]
    pub assessments: Vec<Assessment>,

    #[serde(default)]
    pub assignments: Vec<Assignment>,
}
