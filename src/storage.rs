//! Local persistence for resources, assessments and the assignment ledger.
//!
//! Everything lives in one `SQLite` database:
//!
//! ```text
//! personnel     id, role, status, assigned_to
//! equipment     id, equipment_type, status, assigned_to
//! materials     id, material, status, quantity, assigned_to
//! assessments   id, status, locality_type, location, issue_type, resources (JSON)
//! assignments   job, assessment_id, personnel/equipment/materials (JSON),
//!               status, created_at, locality_type
//! ```
//!
//! Pool order is insertion order (`rowid`). Allocation and sweep passes
//! each run inside one `IMMEDIATE` transaction, which takes the database
//! write lock before reading the snapshot: two passes can never plan
//! against the same free resource.

mod assessments;
mod ledger;
mod pass;
mod resources;
mod snapshot;

use std::{fmt, fs, io, path::PathBuf, time::Duration};

use rusqlite::Connection;

use crate::model::{ManifestError, ResourceKind};

/// How long a pass waits for another writer before giving up.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS personnel (
    id          TEXT PRIMARY KEY,
    role        TEXT NOT NULL,
    status      TEXT NOT NULL,
    assigned_to TEXT
);
CREATE TABLE IF NOT EXISTS equipment (
    id             TEXT PRIMARY KEY,
    equipment_type TEXT NOT NULL,
    status         TEXT NOT NULL,
    assigned_to    TEXT
);
CREATE TABLE IF NOT EXISTS materials (
    id          TEXT PRIMARY KEY,
    material    TEXT NOT NULL,
    status      TEXT NOT NULL,
    quantity    INTEGER NOT NULL CHECK (quantity >= 0),
    assigned_to TEXT
);
CREATE TABLE IF NOT EXISTS assessments (
    id            TEXT PRIMARY KEY,
    status        TEXT NOT NULL,
    locality_type TEXT NOT NULL,
    location      TEXT,
    issue_type    TEXT,
    resources     TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS assignments (
    job           TEXT PRIMARY KEY,
    assessment_id TEXT NOT NULL,
    personnel     TEXT NOT NULL,
    equipment     TEXT NOT NULL,
    materials     TEXT NOT NULL,
    status        TEXT NOT NULL,
    created_at    TEXT NOT NULL,
    locality_type TEXT NOT NULL
);
";

/// Errors that can occur during storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("{kind} not found: {id}")]
    ResourceNotFound { kind: ResourceKind, id: String },

    #[error("{kind} already exists: {id}")]
    ResourceAlreadyExists { kind: ResourceKind, id: String },

    #[error("assessment not found: {0}")]
    AssessmentNotFound(String),

    #[error("assessment already exists: {0}")]
    AssessmentAlreadyExists(String),

    #[error("assignment already exists: {0}")]
    AssignmentAlreadyExists(String),

    #[error("invalid requirements for assessment {id}: {source}")]
    InvalidManifest {
        id: String,
        #[source]
        source: ManifestError,
    },

    #[error("corrupt data: {0}")]
    Corrupt(String),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = core::result::Result<T, StorageError>;

/// `SQLite`-backed store for every record the engine reads or writes.
pub struct Storage {
    conn: Connection,
}

impl Storage {
    /// Opens (or creates) the database at `path`.
    ///
    /// The parent directory is created if it doesn't exist.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(&path)?;
        tracing::debug!(path = %path.display(), "opened database");
        Self::init(conn)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.busy_timeout(BUSY_TIMEOUT)?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self { conn })
    }

    /// Returns the default database path: `~/.roadworks/roadworks.sqlite`.
    pub fn default_path() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(".roadworks").join("roadworks.sqlite"))
    }
}

fn corrupt(what: &str, err: impl fmt::Display) -> StorageError {
    StorageError::Corrupt(format!("{what}: {err}"))
}

/// Whether a row with this primary key exists.
fn exists(conn: &Connection, table: &str, key_column: &str, key: &str) -> Result<bool> {
    let sql = format!("SELECT EXISTS(SELECT 1 FROM {table} WHERE {key_column} = ?1)");
    Ok(conn.query_row(&sql, [key], |row| row.get(0))?)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    use tempfile::TempDir;

    pub(crate) fn test_storage() -> (TempDir, Storage) {
        let dir = TempDir::new().unwrap();
        let storage = Storage::open(dir.path().join("db").join("roadworks.sqlite")).unwrap();
        (dir, storage)
    }

    #[test]
    fn open_creates_parent_directory_and_schema() {
        let (dir, storage) = test_storage();
        assert!(dir.path().join("db").join("roadworks.sqlite").is_file());
        assert!(!exists(&storage.conn, "personnel", "id", "EMP-1").unwrap());
    }

    #[test]
    fn reopen_keeps_data() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("roadworks.sqlite");
        {
            let storage = Storage::open(&path).unwrap();
            storage
                .conn
                .execute(
                    "INSERT INTO personnel (id, role, status)
                     VALUES ('EMP-1', 'RoadCrew', 'active')",
                    [],
                )
                .unwrap();
        }
        let storage = Storage::open(&path).unwrap();
        assert!(exists(&storage.conn, "personnel", "id", "EMP-1").unwrap());
    }
}
