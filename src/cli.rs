//! CLI interface for Roadworks.
//!
//! Every subcommand is non-interactive: arguments in, text out. Passes
//! that compute a plan (`allocate`, `sweep`) accept `--json` for
//! machine-readable output and `--dry-run` to compute without writing.
//!
//! Results go to stdout; confirmations, warnings and logs go to stderr.

mod assessment;
mod format;
mod pass;
mod records;
mod resource;

use std::{path::PathBuf, time::Duration};

use clap::{Parser, Subcommand};

use crate::{config::Config, storage::Storage};

use assessment::AssessmentCommand;
use resource::ResourceCommand;

/// Roadworks: allocate crews, machines and materials to road repairs.
#[derive(Debug, Parser)]
#[command(name = "roadworks", after_long_help = WORKFLOW_HELP)]
pub struct Cli {
    /// Database file. Overrides `ROADWORKS_DB` and the config file.
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

const WORKFLOW_HELP: &str = r#"Workflow: from assessment to released crew
  1. roadworks resource add equipment "Asphalt Paver"
  2. roadworks resource add personnel RoadCrew --id EMP-1234
  3. roadworks assessment add a-17 --locality commercial --location "High Street" \
       --equipment "Asphalt Paver=1" --labour RoadCrew=1
  4. roadworks allocate
  5. roadworks assessment complete a-17
     → sweeps immediately; EMP-1234 is free again

Scheduling:
  roadworks sweep --watch          release finished jobs every interval
  roadworks status                 supply against pending demand"#;

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Manage the resource pool.
    Resource {
        #[command(subcommand)]
        command: ResourceCommand,
    },

    /// Manage assessments.
    Assessment {
        #[command(subcommand)]
        command: AssessmentCommand,
    },

    /// Run one allocation pass over pending assessments.
    ///
    /// Commercial sites are served first, then industrial, mixed, and
    /// residential. An assessment is either fully resourced or put on hold.
    Allocate {
        /// Compute and print the plan without writing it.
        #[arg(long)]
        dry_run: bool,

        /// Print the plan as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Release resources held by completed jobs.
    Sweep {
        /// Compute and print the plan without writing it.
        #[arg(long)]
        dry_run: bool,

        /// Print the plan as JSON.
        #[arg(long)]
        json: bool,

        /// Keep sweeping every `sweep-interval-secs` (from the config).
        #[arg(long, conflicts_with = "dry_run")]
        watch: bool,
    },

    /// Show active jobs and what they hold.
    Ledger {
        #[arg(long)]
        json: bool,
    },

    /// Compare free resources with pending demand.
    Status {
        #[arg(long)]
        json: bool,
    },

    /// Load records from a JSON snapshot. All or nothing.
    Import {
        file: PathBuf,
    },

    /// Write every record as a JSON snapshot.
    Export {
        /// Write to this file instead of stdout.
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

/// Run the CLI, returning an error message on failure.
pub fn run(config: &Config) -> Result<(), String> {
    execute(Cli::parse(), config)
}

/// Run an already parsed command line.
pub fn execute(cli: Cli, config: &Config) -> Result<(), String> {
    let path = config.resolve_database(cli.db)?;
    let mut storage = Storage::open(&path)
        .map_err(|e| format!("failed to open database {}: {e}", path.display()))?;

    match cli.command {
        Command::Resource { command } => resource::run(&storage, command),
        Command::Assessment { command } => assessment::run(&mut storage, command),
        Command::Allocate { dry_run, json } => pass::cmd_allocate(&mut storage, dry_run, json),
        Command::Sweep {
            watch: true, json, ..
        } => {
            let interval = Duration::from_secs(config.sweep_interval_secs);
            pass::cmd_watch(&mut storage, interval, json)
        }
        Command::Sweep { dry_run, json, .. } => pass::cmd_sweep(&mut storage, dry_run, json),
        Command::Ledger { json } => records::cmd_ledger(&storage, json),
        Command::Status { json } => records::cmd_status(&storage, json),
        Command::Import { file } => records::cmd_import(&mut storage, &file),
        Command::Export { out } => records::cmd_export(&storage, out.as_deref()),
    }
}
