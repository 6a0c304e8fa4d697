//! Roadworks configuration.
//!
//! Loaded from `~/.roadworks/config.toml`. A missing file means defaults.
//!
//! The database path is resolved through a chain:
//!
//! 1. `--db <path>`: explicit per-command override
//! 2. `ROADWORKS_DB` env var: process or session level
//! 3. `database = "..."` in the config file
//! 4. `~/.roadworks/roadworks.sqlite`

use std::{env, fs, io, path::PathBuf};

use serde::{Deserialize, Serialize};

use crate::storage::Storage;

/// Seconds between sweeps in `sweep --watch`: hourly.
const DEFAULT_SWEEP_INTERVAL_SECS: u64 = 3600;

/// Roadworks configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct Config {
    /// Database file. Overridden by `ROADWORKS_DB` and `--db`.
    pub database: Option<PathBuf>,

    /// Pause between sweeps in `sweep --watch`.
    pub sweep_interval_secs: u64,

    /// Default log filter, e.g. `"roadworks=debug"`. `RUST_LOG` wins.
    pub log: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: None,
            sweep_interval_secs: DEFAULT_SWEEP_INTERVAL_SECS,
            log: None,
        }
    }
}

impl Config {
    /// Load config from `~/.roadworks/config.toml`.
    ///
    /// Returns defaults when the file (or the home directory) is missing,
    /// and an error when the file exists but cannot be read or parsed.
    pub fn load() -> Result<Self, String> {
        let Some(path) = Self::path() else {
            return Ok(Self::default());
        };

        let contents = match fs::read_to_string(&path) {
            Ok(s) => s,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => return Err(format!("failed to read {}: {e}", path.display())),
        };

        Self::parse(&contents).map_err(|e| format!("invalid config at {}: {e}", path.display()))
    }

    fn parse(contents: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }

    /// The config file path: `~/.roadworks/config.toml`.
    pub fn path() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(".roadworks").join("config.toml"))
    }

    /// Resolve the database path from the chain above.
    pub fn resolve_database(&self, explicit: Option<PathBuf>) -> Result<PathBuf, String> {
        let from_env = env::var_os("ROADWORKS_DB").map(PathBuf::from);
        self.resolve_database_from(explicit, from_env)
    }

    fn resolve_database_from(
        &self,
        explicit: Option<PathBuf>,
        from_env: Option<PathBuf>,
    ) -> Result<PathBuf, String> {
        // 1. Explicit --db flag.
        if let Some(path) = explicit {
            return Ok(path);
        }

        // 2. ROADWORKS_DB environment variable.
        if let Some(path) = from_env
            && !path.as_os_str().is_empty()
        {
            return Ok(path);
        }

        // 3. Config file.
        if let Some(path) = &self.database {
            return Ok(path.clone());
        }

        // 4. Default location.
        Storage::default_path().ok_or_else(|| {
            "could not determine home directory: pass --db <path> or set ROADWORKS_DB".to_string()
        })
    }
}
