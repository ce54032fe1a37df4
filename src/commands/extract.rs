use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result, ensure};

use crate::cli::{Cli, ExtractArgs};
use crate::commands::{load_config, write_report};
use crate::common::{read_ascii_grid, read_from_csv, write_to_csv};
use crate::pipeline::build_covariates;
use crate::raster::RasterGrid;

pub fn run(cli: &Cli, args: &ExtractArgs) -> Result<()> {
    let config = load_config(cli)?;

    let observations = read_from_csv(&args.observations)?;
    let landcover = read_landcover_layers(&args.landcover)?;
    let elevation = read_ascii_grid(&args.elevation)?;

    if cli.verbose > 0 {
        eprintln!(
            "[extract] {} observation rows, {} land-cover years, elevation {}x{}",
            observations.height(), landcover.len(), elevation.rows(), elevation.cols()
        );
    }

    let covariates = build_covariates(&observations, &landcover, &elevation, &config)?;
    if cli.verbose > 0 {
        eprintln!(
            "[extract] {} rows; {} empty land-cover, {} empty elevation, {} substituted years",
            covariates.report.rows_extracted,
            covariates.report.landcover_empty,
            covariates.report.elevation_empty,
            covariates.report.substituted_years,
        );
    }

    write_to_csv(covariates.table, &args.output)?;
    write_report(args.report.as_deref(), &covariates.report)?;

    println!("Wrote covariates -> {}", args.output.display());
    Ok(())
}

/// Load every `<year>.asc` grid in a directory, keyed by year. The year is
/// the trailing digit run of the file stem, so `landcover_2016.asc` works.
fn read_landcover_layers(dir: &Path) -> Result<BTreeMap<i32, RasterGrid>> {
    let mut layers = BTreeMap::new();
    for entry in std::fs::read_dir(dir)
        .with_context(|| format!("Failed to read land-cover directory: {}", dir.display()))?
    {
        let path = entry?.path();
        if path.extension().and_then(|e| e.to_str()) != Some("asc") { continue; }
        let Some(year) = year_of(&path) else { continue; };
        let grid = read_ascii_grid(&path)?;
        ensure!(
            layers.insert(year, grid).is_none(),
            "two land-cover files claim year {year}"
        );
    }
    ensure!(!layers.is_empty(), "no <year>.asc land-cover files in {}", dir.display());
    Ok(layers)
}

/// Trailing digit run of the file stem, e.g. "umd_landcover_2016" -> 2016.
fn year_of(path: &Path) -> Option<i32> {
    let stem = path.file_stem()?.to_str()?;
    let digits: String = stem.chars().rev()
        .take_while(|c| c.is_ascii_digit())
        .collect::<Vec<_>>().into_iter().rev().collect();
    digits.parse().ok()
}
