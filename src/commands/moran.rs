use anyhow::{Context, Result};
use polars::prelude::DataType;

use crate::cli::{Cli, MoranArgs};
use crate::commands::write_report;
use crate::common::read_from_csv;
use crate::graph::{NeighborGraph, delaunay_edges, sphere_of_influence};
use crate::validate::{
    ResidualPoint, dedupe_residuals, moran_permutation_test, test_residual_autocorrelation,
};

pub fn run(cli: &Cli, args: &MoranArgs) -> Result<()> {
    let table = read_from_csv(&args.residuals)?;
    let points = residual_points(&table)?;

    let report = test_residual_autocorrelation(&points)?;
    if cli.verbose > 0 {
        eprintln!(
            "[moran] {} -> {} distinct sites, {} edges",
            report.input_points, report.distinct_points, report.graph_edges
        );
    }
    println!(
        "Moran's I = {:.4} (E = {:.4}, z = {:.2}, p = {:.4})",
        report.test.statistic, report.test.expectation,
        report.test.z_score, report.test.p_value
    );

    if let Some(permutations) = args.permutations {
        let deduped = dedupe_residuals(&points);
        let coords: Vec<geo::Point<f64>> =
            deduped.iter().map(|p| geo::Point::new(p.x, p.y)).collect();
        let edges = sphere_of_influence(&coords, &delaunay_edges(&coords));
        let graph = NeighborGraph::from_edges(coords.len(), &edges);
        let residuals: Vec<f64> = deduped.iter().map(|p| p.residual).collect();

        let mc = moran_permutation_test(&residuals, &graph, permutations, args.seed)?;
        println!("permutation p = {:.4} ({} sims)", mc.p_value, mc.permutations);
    }

    write_report(args.report.as_deref(), &report)?;
    Ok(())
}

fn residual_points(table: &polars::frame::DataFrame) -> Result<Vec<ResidualPoint>> {
    let x = table.column("x")?.cast(&DataType::Float64)?;
    let x = x.f64()?;
    let y = table.column("y")?.cast(&DataType::Float64)?;
    let y = y.f64()?;
    let residual = table.column("residual")?.cast(&DataType::Float64)?;
    let residual = residual.f64()?;

    (0..table.height())
        .map(|i| {
            Ok(ResidualPoint {
                x: x.get(i).context("null x in residual table")?,
                y: y.get(i).context("null y in residual table")?,
                residual: residual.get(i).context("null residual in residual table")?,
            })
        })
        .collect()
}
