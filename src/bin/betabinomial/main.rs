use anyhow::Result;
use clap::Parser;
use env_logger::Env;
use log::info;

mod cli;
mod commands;

fn main() -> Result<()> {
    let args = cli::Cli::parse();
    // Set up logging level
    match args.verbosity {
        cli::LogLevel::Silent => {
            env_logger::Builder::from_env(Env::default().default_filter_or("off")).init();
        }
        cli::LogLevel::Normal => {
            env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
        }
        cli::LogLevel::Verbose => {
            env_logger::Builder::from_env(Env::default().default_filter_or("debug")).init();
        }
    }

    info!("Running betabinomial {}", env!("CARGO_PKG_VERSION"));
    commands::run(&args.command)?;
    info!("Finished");
    Ok(())
}
