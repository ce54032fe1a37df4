pub mod extract;
pub mod join;
pub mod moran;
pub mod score;
pub mod vif;

use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::cli::Cli;
use crate::pipeline::RunConfig;

/// Load the run configuration named on the command line, or defaults.
pub(crate) fn load_config(cli: &Cli) -> Result<RunConfig> {
    match &cli.config {
        Some(path) => RunConfig::from_path(path),
        None => Ok(RunConfig::default()),
    }
}

/// Write a stage report as pretty JSON when a path was requested.
pub(crate) fn write_report<T: Serialize>(path: Option<&Path>, report: &T) -> Result<()> {
    let Some(path) = path else { return Ok(()) };
    let file = std::fs::File::create(path)
        .with_context(|| format!("Failed to create report: {}", path.display()))?;
    serde_json::to_writer_pretty(file, report)?;
    Ok(())
}
