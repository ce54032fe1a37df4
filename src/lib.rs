#![doc = "RangeKit public API"]
mod common;
mod covariate;
mod error;
mod geom;
mod graph;
mod pipeline;
mod raster;
mod survey;
mod types;
mod validate;

pub mod cli;
pub mod commands;

#[doc(inline)]
pub use common::{read_ascii_grid, read_from_csv, write_to_csv};

#[doc(inline)]
pub use covariate::{
    ElevationAggregator, ElevationStats, ElevationSummary, LandCoverAggregator, LandCoverOutcome,
    LandCoverSample, MergedCovariates, WeightedCell, merge_covariates, weighted_cells,
};

#[doc(inline)]
pub use error::PipelineError;

#[doc(inline)]
pub use geom::{GeometryIndex, Projector, SINUSOIDAL_CRS, disk, neighborhood_radius};

#[doc(inline)]
pub use graph::{NeighborGraph, delaunay_edges, sphere_of_influence};

#[doc(inline)]
pub use pipeline::{
    CovariateTable, ExtractionReport, RunConfig, build_covariates, resolve_collinearity,
    species_model_input,
};

#[doc(inline)]
pub use raster::RasterGrid;

#[doc(inline)]
pub use survey::{JoinReport, ModelInput, join_observations, observation};

#[doc(inline)]
pub use types::{LandClass, LocalityId};

#[doc(inline)]
pub use validate::{
    AutocorrelationReport, CovariateMatrix, MadScores, MoranPermutationTest, MoranTest,
    ResidualPoint, VIF_THRESHOLD, VariantScore, Vif, VifResolution, VifResolver, VifStep,
    dedupe_residuals, mad_scores, moran_permutation_test, moran_test, score_variants,
    test_deduplicated, test_residual_autocorrelation, variance_inflation,
};
