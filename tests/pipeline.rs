// End-to-end checks over the public API: raster extraction through joining,
// scoring, and the spatial diagnostics.

use std::collections::BTreeMap;

use polars::df;
use polars::frame::DataFrame;

use rangekit::{
    LandClass, RasterGrid, ResidualPoint, RunConfig, build_covariates, mad_scores,
    species_model_input, test_residual_autocorrelation,
};

/// 10x10 grid of 500 m cells centered on the projected origin.
fn grid(values: Vec<f64>) -> RasterGrid {
    RasterGrid::new(10, 10, -2500.0, -2500.0, 500.0, -9999.0, values).unwrap()
}

fn landcover_layers(year: i32, class: f64) -> BTreeMap<i32, RasterGrid> {
    let mut layers = BTreeMap::new();
    layers.insert(year, grid(vec![class; 100]));
    layers
}

/// Three counted checklists and one unreported count, all at one locality
/// near (0, 0) so the neighborhood lands inside the test rasters.
fn observations(year: i32) -> DataFrame {
    df![
        "checklist_id" => ["S1", "S2", "S3", "S4"],
        "locality_id" => ["L1", "L1", "L1", "L1"],
        "latitude" => [0.001, 0.001, 0.001, 0.001],
        "longitude" => [0.001, 0.001, 0.001, 0.001],
        "year" => [year, year, year, year],
        "observation_count" => [Some(0.0), Some(2.0), Some(5.0), None],
    ].unwrap()
}

#[test]
fn covariates_join_and_score_end_to_end() {
    let config = RunConfig::default();
    let landcover = landcover_layers(2016, LandClass::DeciduousBroadleaf.code() as f64);
    let elevation = grid(vec![300.0; 100]);

    let covariates = build_covariates(&observations(2016), &landcover, &elevation, &config).unwrap();
    assert_eq!(covariates.report.locations, 1);
    assert_eq!(covariates.report.rows_extracted, 1);
    assert_eq!(covariates.report.substituted_years, 0);

    // Full single-class coverage: pland_04 = 1, absent classes zero-filled
    // (0.0, not null), and the 16 proportions re-sum to exactly 1 after the
    // urban reconstruction.
    let table = &covariates.table;
    let pland_04 = table.column("pland_04").unwrap().f64().unwrap().get(0).unwrap();
    assert_eq!(pland_04, 1.0);
    let pland_09 = table.column("pland_09").unwrap().f64().unwrap().get(0).unwrap();
    assert_eq!(pland_09, 0.0);

    let total: f64 = LandClass::order().iter()
        .map(|c| table.column(&c.column()).unwrap().f64().unwrap().get(0).unwrap())
        .sum();
    assert_eq!(total, 1.0);

    let elevation_mean = table.column("elevation_mean").unwrap().f64().unwrap().get(0).unwrap();
    assert!((elevation_mean - 300.0).abs() < 1e-9);
    let elevation_sd = table.column("elevation_sd").unwrap().f64().unwrap().get(0).unwrap();
    assert!(elevation_sd.abs() < 1e-9);

    // Join: the unreported count drops after the join, not before.
    let input = species_model_input(&observations(2016), &covariates.table, &config).unwrap();
    assert_eq!(input.report.join_misses, 0);
    assert_eq!(input.report.missing_response, 1);
    assert_eq!(input.report.train_rows, 3);
    assert_eq!(input.report.test_rows, 0);

    // A mean-count model scores MAD = mean(|0-7/3|, |2-7/3|, |5-7/3|) = 16/9.
    let observed: Vec<Option<f64>> = input.train
        .column("observation_count").unwrap()
        .f64().unwrap()
        .into_iter().collect();
    let mean = 7.0 / 3.0;
    let predicted = vec![Some(mean); observed.len()];
    let scores = mad_scores(&observed, &predicted).unwrap();

    assert!((scores.all.unwrap() - 16.0 / 9.0).abs() < 1e-9);
    assert!((scores.all.unwrap() - 1.78).abs() < 0.01);
    assert!(scores.all.unwrap() >= 0.0);
}

#[test]
fn all_nodata_elevation_yields_null_not_zero() {
    let config = RunConfig::default();
    let landcover = landcover_layers(2016, 4.0);
    let elevation = grid(vec![-9999.0; 100]);

    let covariates = build_covariates(&observations(2016), &landcover, &elevation, &config).unwrap();
    assert_eq!(covariates.report.elevation_empty, 1);
    assert_eq!(covariates.report.rows_extracted, 1);

    let mean = covariates.table.column("elevation_mean").unwrap().f64().unwrap().get(0);
    assert_eq!(mean, None);
}

#[test]
fn future_observation_years_use_the_latest_layer_explicitly() {
    let config = RunConfig::default();
    let landcover = landcover_layers(2016, 4.0);
    let elevation = grid(vec![120.0; 100]);

    let covariates = build_covariates(&observations(2020), &landcover, &elevation, &config).unwrap();
    assert_eq!(covariates.report.substituted_years, 1);
    assert_eq!(covariates.report.rows_extracted, 1);

    let disabled = RunConfig { extend_landcover_years: false, ..RunConfig::default() };
    let covariates = build_covariates(&observations(2020), &landcover, &elevation, &disabled).unwrap();
    assert_eq!(covariates.report.landcover_no_layer, 1);
    assert_eq!(covariates.report.rows_extracted, 0);
}

#[test]
fn train_and_test_years_never_overlap() {
    let config = RunConfig { test_years: vec![2017], ..RunConfig::default() };
    let landcover = landcover_layers(2016, 4.0);
    let elevation = grid(vec![10.0; 100]);

    // Two years of observations at the same locality.
    let obs = df![
        "checklist_id" => ["S1", "S2", "S3"],
        "locality_id" => ["L1", "L1", "L1"],
        "latitude" => [0.001, 0.001, 0.001],
        "longitude" => [0.001, 0.001, 0.001],
        "year" => [2016, 2017, 2017],
        "observation_count" => [Some(1.0), Some(2.0), Some(3.0)],
    ].unwrap();

    let covariates = build_covariates(&obs, &landcover, &elevation, &config).unwrap();
    let input = species_model_input(&obs, &covariates.table, &config).unwrap();

    assert_eq!(input.report.train_rows, 1);
    assert_eq!(input.report.test_rows, 2);

    let train_years = input.train.column("year").unwrap().i32().unwrap();
    assert!(train_years.into_no_null_iter().all(|y| y != 2017));
    let test_years = input.test.column("year").unwrap().i32().unwrap();
    assert!(test_years.into_no_null_iter().all(|y| y == 2017));
}

#[test]
fn collinear_sites_produce_no_isolated_graph_nodes() {
    // Repeat visits at collinear sites: dedup takes the per-site median and
    // the triangulation still chains every site to a neighbor.
    let points = vec![
        ResidualPoint { x: 0.0, y: 0.0, residual: 1.0 },
        ResidualPoint { x: 0.0, y: 0.0, residual: 3.0 },
        ResidualPoint { x: 1.0, y: 0.0, residual: -2.0 },
        ResidualPoint { x: 2.0, y: 0.0, residual: 0.5 },
        ResidualPoint { x: 3.0, y: 0.0, residual: 1.5 },
        ResidualPoint { x: 4.0, y: 0.0, residual: -0.5 },
    ];

    let report = test_residual_autocorrelation(&points).unwrap();
    assert_eq!(report.input_points, 6);
    assert_eq!(report.distinct_points, 5);
    assert_eq!(report.isolated_points, 0);
    assert!(report.graph_edges >= 4);
    assert!(report.test.p_value > 0.0 && report.test.p_value < 1.0);
}
