mod elevation;
mod extract;
mod landcover;
mod merge;

pub use elevation::{ElevationAggregator, ElevationStats, ElevationSummary};
pub use extract::{WeightedCell, weighted_cells};
pub use landcover::{LandCoverAggregator, LandCoverOutcome, LandCoverSample};
pub use merge::{MergedCovariates, merge_covariates};
