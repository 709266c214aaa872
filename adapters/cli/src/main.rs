#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs a Warden Defence scenario headlessly.

mod scenario;
mod simulation;

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::{
    scenario::Scenario,
    simulation::{report, Simulation},
};

/// Command line options for a headless run.
#[derive(Debug, Parser)]
#[command(name = "warden-defence", about = "Headless Warden Defence simulation")]
struct CliArgs {
    /// Scenario file describing the map, towers and scripted edits.
    #[arg(long, value_name = "PATH")]
    scenario: PathBuf,
    /// Number of ticks to simulate, overriding the scenario.
    #[arg(long, value_name = "COUNT")]
    ticks: Option<u64>,
    /// Seed for lane jitter, overriding the scenario.
    #[arg(long, value_name = "SEED")]
    seed: Option<u64>,
}

/// Entry point for the Warden Defence command-line interface.
fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let args = CliArgs::parse();
    let scenario = Scenario::load(&args.scenario)?;
    let ticks = args.ticks.unwrap_or(scenario.ticks);
    let seed = args.seed.unwrap_or(scenario.seed);
    info!(scenario = %args.scenario.display(), ticks, seed, "starting run");

    let mut simulation = Simulation::new(&scenario, seed)?;
    let summary = simulation.run(ticks);
    report(&summary, simulation.world());
    println!(
        "spawned={} killed={} reached_goal={} towers_built={} rejected={}",
        summary.spawned,
        summary.killed,
        summary.reached_goal,
        summary.towers_built,
        summary.edits_rejected
    );
    Ok(())
}
