use anyhow::Result;

use crate::cli::{Cli, VifArgs};
use crate::commands::{load_config, write_report};
use crate::common::read_from_csv;
use crate::pipeline::resolve_collinearity;

pub fn run(cli: &Cli, args: &VifArgs) -> Result<()> {
    let config = load_config(cli)?;
    let input = read_from_csv(&args.input)?;

    let columns: Vec<&str> = args.columns.iter().map(String::as_str).collect();
    let resolution = resolve_collinearity(&input, &columns, &config)?;

    for step in &resolution.steps {
        println!("dropped {} (VIF {:.2})", step.dropped, step.vif);
    }
    println!("retained:");
    for vif in &resolution.retained {
        println!("  {} {:.3}", vif.covariate, vif.value);
    }

    write_report(args.report.as_deref(), &resolution)?;
    Ok(())
}
