use anyhow::Result;
use clap::Parser;

use rangekit::cli::{Cli, Commands};
use rangekit::commands::{extract, join, moran, score, vif};

fn main() -> Result<()> {
    let cli = Cli::parse();
    match &cli.command {
        Commands::Extract(args) => extract::run(&cli, args),
        Commands::Join(args) => join::run(&cli, args),
        Commands::Vif(args) => vif::run(&cli, args),
        Commands::Moran(args) => moran::run(&cli, args),
        Commands::Score(args) => score::run(&cli, args),
    }
}
