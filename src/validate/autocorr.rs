use ahash::AHashMap;
use anyhow::{Result, ensure};
use geo::Point;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde::Serialize;

use crate::error::PipelineError;
use crate::graph::{NeighborGraph, delaunay_edges, sphere_of_influence};

/// A model residual at an observation coordinate.
#[derive(Debug, Clone, Copy)]
pub struct ResidualPoint {
    pub x: f64,
    pub y: f64,
    pub residual: f64,
}

/// Collapse repeated coordinates to one point per distinct (x, y) carrying
/// the median of the residuals observed there. The median resists outlier
/// checklists at heavily-birded sites. Output keeps first-seen order.
pub fn dedupe_residuals(points: &[ResidualPoint]) -> Vec<ResidualPoint> {
    let mut order: Vec<(f64, f64)> = Vec::new();
    let mut groups: AHashMap<(u64, u64), Vec<f64>> = AHashMap::new();

    for p in points {
        let key = (p.x.to_bits(), p.y.to_bits());
        groups.entry(key)
            .or_insert_with(|| { order.push((p.x, p.y)); Vec::new() })
            .push(p.residual);
    }

    order.into_iter()
        .map(|(x, y)| {
            let values = groups.get_mut(&(x.to_bits(), y.to_bits())).unwrap();
            ResidualPoint { x, y, residual: median(values) }
        })
        .collect()
}

/// Median by sorting in place; the input is a scratch group buffer.
fn median(values: &mut [f64]) -> f64 {
    debug_assert!(!values.is_empty());
    values.sort_by(|a, b| a.total_cmp(b));
    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        (values[mid - 1] + values[mid]) / 2.0
    } else {
        values[mid]
    }
}

/// Global Moran's I under the randomisation assumption, with binary
/// (unweighted) adjacency. The p-value is one-sided for positive
/// autocorrelation, the direction that inflates count-model confidence.
#[derive(Debug, Clone, Serialize)]
pub struct MoranTest {
    pub n: usize,
    pub statistic: f64,
    pub expectation: f64,
    pub variance: f64,
    pub z_score: f64,
    pub p_value: f64,
}

/// Moran's I statistic alone, without moments.
fn moran_statistic(values: &[f64], graph: &NeighborGraph) -> f64 {
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let z: Vec<f64> = values.iter().map(|v| v - mean).collect();
    let m2: f64 = z.iter().map(|v| v * v).sum();

    let mut cross = 0.0;
    for (i, &zi) in z.iter().enumerate() {
        for j in graph.neighbors(i) {
            cross += zi * z[j];
        }
    }
    let s0 = graph.link_count() as f64;
    (n / s0) * cross / m2
}

/// Run the analytic Moran test on one value per graph node.
///
/// Requires at least 4 nodes (the variance has an (n-3) factor), at least
/// one edge, and non-constant values.
pub fn moran_test(values: &[f64], graph: &NeighborGraph) -> Result<MoranTest> {
    let n = values.len();
    ensure!(n == graph.node_count(), "one value per graph node required");
    ensure!(n >= 4, "Moran's I needs at least 4 distinct locations, got {n}");
    ensure!(graph.link_count() > 0, "neighbor graph has no edges");

    let mean = values.iter().sum::<f64>() / n as f64;
    let z: Vec<f64> = values.iter().map(|v| v - mean).collect();
    let m2: f64 = z.iter().map(|v| v * v).sum();
    ensure!(m2 > 0.0, "residuals are constant; autocorrelation is undefined");

    let statistic = moran_statistic(values, graph);

    let nf = n as f64;
    let s0 = graph.link_count() as f64;
    let s1 = 2.0 * s0; // binary symmetric weights
    let s2 = 4.0 * (0..n).map(|i| (graph.degree(i) as f64).powi(2)).sum::<f64>();

    let b2 = nf * z.iter().map(|v| v.powi(4)).sum::<f64>() / (m2 * m2);
    let expectation = -1.0 / (nf - 1.0);
    let variance = (nf * ((nf * nf - 3.0 * nf + 3.0) * s1 - nf * s2 + 3.0 * s0 * s0)
        - b2 * ((nf * nf - nf) * s1 - 2.0 * nf * s2 + 6.0 * s0 * s0))
        / ((nf - 1.0) * (nf - 2.0) * (nf - 3.0) * s0 * s0)
        - expectation * expectation;

    ensure!(variance > 0.0, "degenerate null variance ({variance}); graph too small or too dense");

    let z_score = (statistic - expectation) / variance.sqrt();
    Ok(MoranTest {
        n,
        statistic,
        expectation,
        variance,
        z_score,
        p_value: normal_sf(z_score),
    })
}

/// Monte Carlo alternative to the analytic test: the observed statistic is
/// ranked against `permutations` random relabelings of the values over the
/// same graph. Deterministic for a given seed.
#[derive(Debug, Clone, Serialize)]
pub struct MoranPermutationTest {
    pub statistic: f64,
    pub permutations: usize,
    pub p_value: f64,
}

pub fn moran_permutation_test(
    values: &[f64],
    graph: &NeighborGraph,
    permutations: usize,
    seed: u64,
) -> Result<MoranPermutationTest> {
    ensure!(permutations > 0, "at least one permutation required");
    // Shares the analytic test's preconditions.
    let statistic = moran_test(values, graph)?.statistic;

    let mut rng = StdRng::seed_from_u64(seed);
    let mut shuffled = values.to_vec();
    let mut at_least_as_extreme = 0usize;
    for _ in 0..permutations {
        shuffled.shuffle(&mut rng);
        if moran_statistic(&shuffled, graph) >= statistic {
            at_least_as_extreme += 1;
        }
    }

    Ok(MoranPermutationTest {
        statistic,
        permutations,
        p_value: (at_least_as_extreme + 1) as f64 / (permutations + 1) as f64,
    })
}

/// Full diagnostic over per-observation residuals: deduplicate by
/// coordinate, build the Delaunay-then-sphere-of-influence graph, and test.
/// Descriptive only; elevated autocorrelation is a flag for the modeler,
/// not a trigger for corrective action here.
#[derive(Debug, Clone, Serialize)]
pub struct AutocorrelationReport {
    pub input_points: usize,
    pub distinct_points: usize,
    pub graph_edges: usize,
    pub isolated_points: usize,
    pub test: MoranTest,
}

pub fn test_residual_autocorrelation(points: &[ResidualPoint]) -> Result<AutocorrelationReport> {
    let deduped = dedupe_residuals(points);
    let mut report = test_deduplicated(&deduped)?;
    report.input_points = points.len();
    Ok(report)
}

/// Variant for callers that deduplicate themselves: repeated coordinates
/// here are a contract violation, fatal to the test (not the pipeline).
pub fn test_deduplicated(points: &[ResidualPoint]) -> Result<AutocorrelationReport> {
    let mut seen = AHashMap::new();
    for p in points {
        if seen.insert((p.x.to_bits(), p.y.to_bits()), ()).is_some() {
            return Err(PipelineError::DuplicateCoordinate { x: p.x, y: p.y }.into());
        }
    }

    let coords: Vec<Point<f64>> = points.iter().map(|p| Point::new(p.x, p.y)).collect();
    let edges = sphere_of_influence(&coords, &delaunay_edges(&coords));
    let graph = NeighborGraph::from_edges(coords.len(), &edges);

    let residuals: Vec<f64> = points.iter().map(|p| p.residual).collect();
    let test = moran_test(&residuals, &graph)?;

    Ok(AutocorrelationReport {
        input_points: points.len(),
        distinct_points: points.len(),
        graph_edges: graph.edge_count(),
        isolated_points: graph.isolated_nodes().len(),
        test,
    })
}

/// Standard normal survival function via the Abramowitz-Stegun 7.1.26
/// erfc approximation (absolute error < 1.5e-7).
fn normal_sf(z: f64) -> f64 {
    0.5 * erfc(z / std::f64::consts::SQRT_2)
}

fn erfc(x: f64) -> f64 {
    if x < 0.0 {
        return 2.0 - erfc(-x);
    }
    let t = 1.0 / (1.0 + 0.3275911 * x);
    let poly = t * (0.254829592
        + t * (-0.284496736
        + t * (1.421413741
        + t * (-1.453152027
        + t * 1.061405429))));
    poly * (-x * x).exp()
}
