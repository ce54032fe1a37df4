use ahash::{AHashMap, AHashSet};
use anyhow::{Result, ensure};
use polars::frame::DataFrame;
use polars::prelude::Column;

use crate::covariate::{ElevationStats, ElevationSummary, LandCoverSample};
use crate::types::LandClass;

/// Result of joining land-cover and elevation covariates: one row per
/// (location, year), plus counts of rows each side lost to the inner join.
#[derive(Debug)]
pub struct MergedCovariates {
    pub table: DataFrame,
    /// Land-cover samples whose locality had no elevation summary.
    pub dropped_landcover: usize,
    /// Elevation summaries whose locality had no land-cover sample.
    pub dropped_elevation: usize,
}

/// Inner-join land-cover samples with elevation summaries on locality.
///
/// A location present on only one side is dropped: a covariate row without
/// both land cover and elevation is not usable downstream. Elevation nulls
/// (empty neighborhoods) are kept; the location was measured, the
/// measurement was empty.
pub fn merge_covariates(
    landcover: &[LandCoverSample],
    elevation: &[ElevationSummary],
) -> Result<MergedCovariates> {
    let mut elevations: AHashMap<&str, &Option<ElevationStats>> = AHashMap::new();
    for summary in elevation {
        let replaced = elevations.insert(summary.locality.as_str(), &summary.stats);
        ensure!(replaced.is_none(), "duplicate elevation summary for locality {}", summary.locality);
    }

    let mut keys = AHashSet::new();
    let mut used = AHashSet::new();

    let mut locality_col = Vec::new();
    let mut year_col = Vec::new();
    let mut pland_cols: Vec<Vec<f64>> = vec![Vec::new(); LandClass::COUNT];
    let mut elev_mean = Vec::new();
    let mut elev_median = Vec::new();
    let mut elev_sd = Vec::new();
    let mut elev_iqr = Vec::new();

    let mut dropped_landcover = 0;
    for sample in landcover {
        ensure!(
            keys.insert((sample.locality.clone(), sample.year)),
            "duplicate land-cover sample for ({}, {})", sample.locality, sample.year
        );
        let Some(stats) = elevations.get(sample.locality.as_str()) else {
            dropped_landcover += 1;
            continue;
        };
        used.insert(sample.locality.as_str());

        locality_col.push(sample.locality.as_str().to_string());
        year_col.push(sample.year);
        for (class_col, value) in pland_cols.iter_mut().zip(sample.pland.iter()) {
            class_col.push(*value);
        }
        elev_mean.push(stats.map(|s| s.mean));
        elev_median.push(stats.map(|s| s.median));
        elev_sd.push(stats.map(|s| s.sd));
        elev_iqr.push(stats.map(|s| s.iqr));
    }
    let dropped_elevation = elevations.len() - used.len();

    let mut columns = vec![
        Column::new("locality_id".into(), locality_col),
        Column::new("year".into(), year_col),
    ];
    for (class, values) in LandClass::order().into_iter().zip(pland_cols) {
        columns.push(Column::new(class.column().into(), values));
    }
    columns.push(Column::new("elevation_mean".into(), elev_mean));
    columns.push(Column::new("elevation_median".into(), elev_median));
    columns.push(Column::new("elevation_sd".into(), elev_sd));
    columns.push(Column::new("elevation_iqr".into(), elev_iqr));

    Ok(MergedCovariates {
        table: DataFrame::new(columns)?,
        dropped_landcover,
        dropped_elevation,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::LocalityId;

    fn landcover_sample(locality: &str, year: i32) -> LandCoverSample {
        let mut pland = [0.0; LandClass::COUNT];
        pland[4] = 0.75;
        pland[0] = 0.25;
        LandCoverSample {
            locality: LocalityId::from(locality),
            year,
            source_year: year,
            pland,
            negative_reconstruction: false,
        }
    }

    fn elevation_summary(locality: &str, mean: Option<f64>) -> ElevationSummary {
        ElevationSummary {
            locality: LocalityId::from(locality),
            stats: mean.map(|m| ElevationStats { mean: m, median: m, sd: 1.0, iqr: 2.0 }),
        }
    }

    #[test]
    fn one_row_per_location_year() {
        let merged = merge_covariates(
            &[landcover_sample("L1", 2016), landcover_sample("L1", 2017)],
            &[elevation_summary("L1", Some(320.0))],
        ).unwrap();

        assert_eq!(merged.table.height(), 2);
        assert_eq!(merged.dropped_landcover, 0);
        assert_eq!(merged.dropped_elevation, 0);

        let pland_04 = merged.table.column("pland_04").unwrap().f64().unwrap();
        assert_eq!(pland_04.get(0), Some(0.75));
    }

    #[test]
    fn locations_missing_either_side_are_dropped() {
        let merged = merge_covariates(
            &[landcover_sample("L1", 2016), landcover_sample("L2", 2016)],
            &[elevation_summary("L1", Some(10.0)), elevation_summary("L3", Some(20.0))],
        ).unwrap();

        assert_eq!(merged.table.height(), 1);
        assert_eq!(merged.dropped_landcover, 1); // L2
        assert_eq!(merged.dropped_elevation, 1); // L3
    }

    #[test]
    fn null_elevation_rows_survive_the_join() {
        let merged = merge_covariates(
            &[landcover_sample("L1", 2016)],
            &[elevation_summary("L1", None)],
        ).unwrap();

        assert_eq!(merged.table.height(), 1);
        let mean = merged.table.column("elevation_mean").unwrap().f64().unwrap();
        assert_eq!(mean.get(0), None);
    }

    #[test]
    fn duplicate_location_year_keys_are_rejected() {
        let result = merge_covariates(
            &[landcover_sample("L1", 2016), landcover_sample("L1", 2016)],
            &[elevation_summary("L1", Some(10.0))],
        );
        assert!(result.is_err());
    }
}
