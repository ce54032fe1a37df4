use clap::{Args, Parser, Subcommand, ValueHint};
use std::path::PathBuf;

/// Species-distribution pipeline CLI (argument schema only)
#[derive(Parser, Debug)]
#[command(name = "rangekit", version, about, propagate_version = true)]
pub struct Cli {
    /// Increase output verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// JSON run configuration (defaults applied when omitted)
    #[arg(short, long, global = true, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build the covariate table from observations and raster layers
    Extract(ExtractArgs),

    /// Join species observations to covariates and split train/test
    Join(JoinArgs),

    /// Rank covariates by variance inflation and resolve collinearity
    Vif(VifArgs),

    /// Test model residuals for spatial autocorrelation
    Moran(MoranArgs),

    /// Score held-out predictions against observed counts
    Score(ScoreArgs),
}

#[derive(Args, Debug)]
pub struct ExtractArgs {
    /// Observation table (CSV, one row per checklist)
    #[arg(value_hint = ValueHint::FilePath)]
    pub observations: PathBuf,

    /// Directory of land-cover grids, one `<year>.asc` per year
    #[arg(value_hint = ValueHint::DirPath)]
    pub landcover: PathBuf,

    /// Elevation grid (.asc)
    #[arg(value_hint = ValueHint::FilePath)]
    pub elevation: PathBuf,

    /// Output covariate table (CSV)
    #[arg(short, long, value_hint = ValueHint::FilePath)]
    pub output: PathBuf,

    /// Write the extraction report as JSON
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub report: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct JoinArgs {
    /// Per-species observation table (CSV)
    #[arg(value_hint = ValueHint::FilePath)]
    pub observations: PathBuf,

    /// Covariate table from `extract` (CSV)
    #[arg(value_hint = ValueHint::FilePath)]
    pub covariates: PathBuf,

    /// Output training table (CSV)
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub train: PathBuf,

    /// Output test table (CSV)
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub test: PathBuf,

    /// Write the join report as JSON
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub report: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct VifArgs {
    /// Model-input table (CSV)
    #[arg(value_hint = ValueHint::FilePath)]
    pub input: PathBuf,

    /// Covariate columns to analyze
    #[arg(long, value_delimiter = ',', required = true)]
    pub columns: Vec<String>,

    /// Write the resolution report as JSON
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub report: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct MoranArgs {
    /// Residual table (CSV with x, y, residual columns)
    #[arg(value_hint = ValueHint::FilePath)]
    pub residuals: PathBuf,

    /// Also run a permutation test with this many permutations
    #[arg(long)]
    pub permutations: Option<usize>,

    /// Seed for the permutation test
    #[arg(long, default_value_t = 1)]
    pub seed: u64,

    /// Write the autocorrelation report as JSON
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub report: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct ScoreArgs {
    /// Prediction table (CSV)
    #[arg(value_hint = ValueHint::FilePath)]
    pub input: PathBuf,

    /// Column of observed counts
    #[arg(long, default_value = "observation_count")]
    pub observed: String,

    /// Prediction columns, one per model variant
    #[arg(long, value_delimiter = ',', required = true)]
    pub predicted: Vec<String>,

    /// Write the score report as JSON
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub report: Option<PathBuf>,
}
