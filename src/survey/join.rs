use ahash::AHashSet;
use anyhow::{Result, ensure};
use polars::prelude::*;
use serde::Serialize;

use crate::survey::observation::{COL_COUNT, COL_LOCALITY, COL_YEAR};

/// Row accounting for one species join. A join miss (no covariates for the
/// location-year) and a missing response (joined but unreported count) are
/// different failure modes, counted separately.
#[derive(Debug, Clone, Serialize)]
pub struct JoinReport {
    pub observation_rows: usize,
    pub joined_rows: usize,
    pub join_misses: usize,
    pub missing_response: usize,
    pub train_rows: usize,
    pub test_rows: usize,
}

/// Model-ready tables for one species.
#[derive(Debug)]
pub struct ModelInput {
    pub train: DataFrame,
    pub test: DataFrame,
    pub report: JoinReport,
}

/// Inner-join species observations to the covariate table on
/// (locality, year), drop rows with an unreported count after the join, and
/// split by year into disjoint train/test sets. Years listed in `test_years`
/// go to the test set; every other year trains.
pub fn join_observations(
    observations: &DataFrame,
    covariates: &DataFrame,
    test_years: &[i32],
) -> Result<ModelInput> {
    let observation_rows = observations.height();

    // Align key dtypes before the join; CSV ingestion widens integers.
    let obs_year = observations.column(COL_YEAR)?.cast(&DataType::Int32)?;
    let mut obs = observations.clone();
    obs.with_column(obs_year)?;
    let cov_year = covariates.column(COL_YEAR)?.cast(&DataType::Int32)?;
    let mut cov = covariates.clone();
    cov.with_column(cov_year)?;

    // A duplicated covariate key would fan rows out through the join and
    // corrupt the miss count.
    let localities = cov.column(COL_LOCALITY)?.str()?;
    let years = cov.column(COL_YEAR)?.i32()?;
    let mut keys = AHashSet::new();
    for i in 0..cov.height() {
        ensure!(
            keys.insert((localities.get(i), years.get(i))),
            "covariate table has duplicate key ({:?}, {:?})",
            localities.get(i), years.get(i)
        );
    }

    let joined = obs.join(
        &cov,
        [COL_LOCALITY, COL_YEAR],
        [COL_LOCALITY, COL_YEAR],
        JoinArgs::new(JoinType::Inner),
        None,
    )?;
    let join_misses = observation_rows - joined.height();

    // Count column may arrive as text ("X" = present, count unreported);
    // a non-strict cast turns those into nulls alongside genuine blanks.
    let count = joined.column(COL_COUNT)?.cast(&DataType::Float64)?;
    let mut joined = joined;
    joined.with_column(count)?;
    let counts = joined.column(COL_COUNT)?.f64()?;
    let has_response: Vec<bool> = counts.into_iter().map(|v| v.is_some()).collect();
    let mask = BooleanChunked::from_slice("has_response".into(), &has_response);
    let usable = joined.filter(&mask)?;
    let missing_response = joined.height() - usable.height();

    let years = usable.column(COL_YEAR)?.i32()?;
    let in_test: Vec<bool> = years
        .into_iter()
        .map(|y| y.is_some_and(|y| test_years.contains(&y)))
        .collect();
    let in_train: Vec<bool> = in_test.iter().map(|t| !t).collect();
    let test_mask = BooleanChunked::from_slice("in_test".into(), &in_test);
    let train_mask = BooleanChunked::from_slice("in_train".into(), &in_train);

    let train = usable.filter(&train_mask)?;
    let test = usable.filter(&test_mask)?;

    let report = JoinReport {
        observation_rows,
        joined_rows: joined.height(),
        join_misses,
        missing_response,
        train_rows: train.height(),
        test_rows: test.height(),
    };

    Ok(ModelInput { train, test, report })
}
