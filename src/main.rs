mod manager;

use crate::manager::Manager;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(version, about)]
struct CLI {
    /// TOML configuration file (defaults are used when omitted).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Random seed, overriding the configuration.
    #[arg(long)]
    seed: Option<u64>,

    /// Number of steps, overriding the configuration.
    #[arg(long)]
    steps: Option<usize>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the aggregate counts of every step.
    Run,

    /// Print summary statistics of the run.
    Analyze,

    /// Print the effective configuration.
    ShowConfig,
}

fn main() {
    env_logger::Builder::new()
        .format_timestamp_millis()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    if let Err(error) = run_cli() {
        log::error!("{error:#?}");
        std::process::exit(1);
    }
}

fn run_cli() -> Result<()> {
    let args = CLI::parse();
    log::info!("{args:#?}");

    let mgr = Manager::new(args.config.as_deref(), args.seed, args.steps)
        .context("failed to construct mgr")?;

    let output = match args.command {
        Command::Run => mgr.run_simulation()?,
        Command::Analyze => mgr.run_analysis()?,
        Command::ShowConfig => mgr.config_toml()?,
    };
    print!("{output}");

    Ok(())
}
