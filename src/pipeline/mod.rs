mod config;
mod run;

pub use config::RunConfig;
pub use run::{
    CovariateTable, ExtractionReport, build_covariates, resolve_collinearity,
    species_model_input,
};
