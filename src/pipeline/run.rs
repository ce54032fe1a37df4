use std::collections::BTreeMap;

use anyhow::{Context, Result, ensure};
use polars::frame::DataFrame;
use serde::Serialize;

use crate::covariate::{ElevationAggregator, LandCoverAggregator, LandCoverOutcome, merge_covariates};
use crate::geom::{GeometryIndex, Projector, neighborhood_radius};
use crate::pipeline::RunConfig;
use crate::raster::RasterGrid;
use crate::survey::{ModelInput, join_observations, observation};
use crate::validate::{CovariateMatrix, VifResolution, VifResolver};

/// Row accounting for one covariate-extraction run. Per-location failures
/// never abort the batch; they land here so the run is reproducible: the
/// same inputs always yield the same drop set.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ExtractionReport {
    /// Distinct observation locations.
    pub locations: usize,
    /// Distinct (location, year) pairs requested.
    pub location_years: usize,
    /// Covariate rows in the output table.
    pub rows_extracted: usize,
    /// Pairs whose observation year no land-cover layer covers.
    pub landcover_no_layer: usize,
    /// Pairs whose neighborhood held no valid land-cover cells.
    pub landcover_empty: usize,
    /// Locations whose neighborhood held no valid elevation cells
    /// (their covariate rows carry null elevation columns).
    pub elevation_empty: usize,
    /// Locations whose neighborhood misses the elevation raster entirely.
    pub outside_elevation_extent: usize,
    /// Pairs served by a substituted (latest available) land-cover year.
    pub substituted_years: usize,
    /// Samples whose reconstructed class came out negative beyond tolerance.
    pub negative_reconstructions: usize,
    /// Land-cover rows dropped by the merge for lack of an elevation row.
    pub dropped_landcover: usize,
    /// Elevation rows dropped by the merge for lack of a land-cover row.
    pub dropped_elevation: usize,
}

/// The covariate table plus its extraction accounting.
#[derive(Debug)]
pub struct CovariateTable {
    pub table: DataFrame,
    pub report: ExtractionReport,
}

/// Build the covariate table for every (location, year) pair in an
/// observation table: one shared neighborhood geometry per location,
/// land-cover proportions per pair, elevation statistics per location,
/// merged into one row per pair.
pub fn build_covariates(
    observations: &DataFrame,
    landcover: &BTreeMap<i32, RasterGrid>,
    elevation: &RasterGrid,
    config: &RunConfig,
) -> Result<CovariateTable> {
    observation::validate_observations(observations)?;
    ensure!(!landcover.is_empty(), "at least one land-cover layer is required");

    let projector = Projector::new(&config.target_crs)?;
    let coarsest = landcover.values()
        .map(|grid| grid.cell_size())
        .fold(f64::NEG_INFINITY, f64::max);
    let radius = config.radius.unwrap_or_else(|| neighborhood_radius(coarsest));

    let index = GeometryIndex::build(
        observation::locations(observations)?,
        &projector,
        radius,
    ).context("building neighborhood geometry")?;

    let mut report = ExtractionReport {
        locations: index.len(),
        ..Default::default()
    };

    // Land cover per (location, year).
    let aggregator = LandCoverAggregator::new(
        landcover,
        config.extend_landcover_years,
        config.reconstruct_class()?,
    )?;
    let pairs = observation::location_years(observations)?;
    report.location_years = pairs.len();

    let mut samples = Vec::with_capacity(pairs.len());
    for (locality, year) in &pairs {
        let neighborhood = index.neighborhood(locality).unwrap();
        match aggregator.sample(locality, *year, neighborhood) {
            LandCoverOutcome::Sample(sample) => {
                if sample.substituted() { report.substituted_years += 1; }
                if sample.negative_reconstruction { report.negative_reconstructions += 1; }
                samples.push(sample);
            }
            LandCoverOutcome::NoLayer => report.landcover_no_layer += 1,
            LandCoverOutcome::Empty => report.landcover_empty += 1,
        }
    }

    // Elevation once per distinct location.
    let in_extent = index.within_extent(&elevation.extent());
    report.outside_elevation_extent = index.len() - in_extent.len();

    let elevations = ElevationAggregator::new(elevation);
    let summaries: Vec<_> = index.iter()
        .map(|(locality, neighborhood)| elevations.summarize(locality, neighborhood))
        .collect();
    report.elevation_empty = summaries.iter().filter(|s| s.stats.is_none()).count();

    let merged = merge_covariates(&samples, &summaries)?;
    report.rows_extracted = merged.table.height();
    report.dropped_landcover = merged.dropped_landcover;
    report.dropped_elevation = merged.dropped_elevation;

    Ok(CovariateTable { table: merged.table, report })
}

/// Model-ready input for one species against the shared covariate table.
///
/// Each species run is a fresh invocation of the same parameterized
/// pipeline; no state is carried from one species to the next.
pub fn species_model_input(
    species_observations: &DataFrame,
    covariates: &DataFrame,
    config: &RunConfig,
) -> Result<ModelInput> {
    join_observations(species_observations, covariates, &config.test_years)
}

/// Run inflation resolution over named covariate columns of a model-input
/// table, honoring the configured threshold and protected covariates.
pub fn resolve_collinearity(
    model_input: &DataFrame,
    covariates: &[&str],
    config: &RunConfig,
) -> Result<VifResolution> {
    let matrix = CovariateMatrix::from_dataframe(model_input, covariates)?;
    VifResolver::new(config.vif_threshold)
        .protect(config.protected_covariates.iter().cloned())
        .resolve(&matrix)
}
