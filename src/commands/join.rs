use anyhow::Result;

use crate::cli::{Cli, JoinArgs};
use crate::commands::{load_config, write_report};
use crate::common::{read_from_csv, write_to_csv};
use crate::pipeline::species_model_input;

pub fn run(cli: &Cli, args: &JoinArgs) -> Result<()> {
    let config = load_config(cli)?;

    let observations = read_from_csv(&args.observations)?;
    let covariates = read_from_csv(&args.covariates)?;

    let input = species_model_input(&observations, &covariates, &config)?;
    if cli.verbose > 0 {
        eprintln!(
            "[join] {} rows joined ({} misses, {} missing counts) -> {} train / {} test",
            input.report.joined_rows,
            input.report.join_misses,
            input.report.missing_response,
            input.report.train_rows,
            input.report.test_rows,
        );
    }

    write_to_csv(input.train, &args.train)?;
    write_to_csv(input.test, &args.test)?;
    write_report(args.report.as_deref(), &input.report)?;

    println!("Wrote model input -> {} / {}", args.train.display(), args.test.display());
    Ok(())
}
