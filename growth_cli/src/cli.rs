//! CLI argument definitions and shared statics.

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::OnceLock;

pub static FILE_GUARD: OnceLock<tracing_appender::non_blocking::WorkerGuard> = OnceLock::new();
/// Whether the user asked for JSON output (controls structured error output).
pub static JSON_MODE: OnceLock<bool> = OnceLock::new();

/// Config file used when `--config` is not given. Missing is fine.
pub const DEFAULT_CONFIG: &str = "etc/growth.toml";

#[derive(Parser, Debug)]
#[command(
    name = "growth",
    version,
    about = "Growth-phase detection and mixing-parameter optimization"
)]
pub struct Cli {
    /// Path to config TOML (defaults to etc/growth.toml when present)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Log as JSON lines and print errors as JSON
    #[arg(long, action = ArgAction::SetTrue)]
    pub json: bool,

    /// Console log level (error|warn|info|debug|trace); RUST_LOG wins when set
    #[arg(long = "log-level", value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Command to execute
    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Analyze a plate: detect growth phases, correlate and optimize parameters
    Analyze {
        /// Directory with well_<ID>_absorbance.csv files (overrides data.wells_dir)
        #[arg(long, value_name = "DIR")]
        wells_dir: Option<PathBuf>,
        /// Parameter sheet for one batch, e.g. `--batch 1=params_batch1.csv`
        /// (repeatable; replaces data.batches when given)
        #[arg(long = "batch", value_name = "ID=FILE", value_parser = parse_batch)]
        batches: Vec<(u32, PathBuf)>,
        /// Write the JSON report here instead of printing it
        #[arg(long, value_name = "FILE")]
        output: Option<PathBuf>,
    },
    /// Detect the growth phase of a single well export
    Detect {
        /// Absorbance CSV with timestamp,absorbance_od600 columns
        #[arg(long, value_name = "FILE")]
        well: PathBuf,
    },
    /// Schedule absorbance monitoring for a plate (dry run)
    Schedule {
        /// Plate barcode
        #[arg(long, value_name = "BARCODE")]
        plate: String,
        /// Workflow definition to instantiate
        #[arg(long, value_name = "N", default_value_t = growth_core::scheduling::ABSORBANCE_MONITORING_DEFINITION)]
        definition_id: u32,
        /// Delay after approval before the workflow starts
        #[arg(long, value_name = "MINUTES", default_value_t = 0)]
        start_after_minutes: u32,
    },
}

fn parse_batch(s: &str) -> Result<(u32, PathBuf), String> {
    let (id, path) = s
        .split_once('=')
        .ok_or_else(|| format!("expected ID=FILE, got '{s}'"))?;
    let id: u32 = id
        .trim()
        .parse()
        .map_err(|_| format!("batch id must be a non-negative integer, got '{id}'"))?;
    let path = path.trim();
    if path.is_empty() {
        return Err(format!("batch {id} has an empty file path"));
    }
    Ok((id, PathBuf::from(path)))
}
