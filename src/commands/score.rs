use anyhow::Result;
use polars::prelude::DataType;

use crate::cli::{Cli, ScoreArgs};
use crate::commands::write_report;
use crate::common::read_from_csv;
use crate::validate::score_variants;

pub fn run(cli: &Cli, args: &ScoreArgs) -> Result<()> {
    let table = read_from_csv(&args.input)?;

    let observed = float_column(&table, &args.observed)?;
    let variants = args.predicted.iter()
        .map(|name| Ok((name.clone(), float_column(&table, name)?)))
        .collect::<Result<Vec<_>>>()?;

    let scored = score_variants(&observed, &variants)?;
    if cli.verbose > 0 {
        eprintln!("[score] {} rows, {} variants", table.height(), scored.len());
    }
    for variant in &scored {
        println!(
            "{}: all={} zero={} nonzero={}",
            variant.model,
            format_mad(variant.scores.all),
            format_mad(variant.scores.zero_observed),
            format_mad(variant.scores.nonzero_observed),
        );
    }

    write_report(args.report.as_deref(), &scored)?;
    Ok(())
}

fn float_column(table: &polars::frame::DataFrame, name: &str) -> Result<Vec<Option<f64>>> {
    let col = table.column(name)?.cast(&DataType::Float64)?;
    Ok(col.f64()?.into_iter().collect())
}

fn format_mad(value: Option<f64>) -> String {
    value.map_or_else(|| "n/a".to_string(), |v| format!("{v:.4}"))
}
