use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;

use mes_engine::config::EngineConfig;
use mes_engine::scenario::{self, Report, Scenario};
use mes_engine::tracker::NoopTracker;
use mes_engine::facade;

#[derive(Parser)]
#[command(
    name = "mes",
    version,
    about = "Deterministic Method-of-Equal-Shares participatory budgeting engine"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a scenario and print its allocation/payment report.
    Compute {
        /// Path to a scenario JSON file.
        scenario: PathBuf,
        /// Print a human-readable table instead of JSON.
        #[arg(long)]
        pretty: bool,
        /// Path to an optional engine config TOML file.
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Validate a scenario's preconditions without running it.
    Check {
        /// Path to a scenario JSON file.
        scenario: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Compute {
            scenario,
            pretty,
            config,
        } => run_compute(&scenario, pretty, config.as_deref()),
        Commands::Check { scenario } => run_check(&scenario),
    }
}

fn run_compute(scenario_path: &std::path::Path, pretty: bool, config_path: Option<&std::path::Path>) -> Result<()> {
    let scenario = Scenario::load_from_file(scenario_path)?;
    let engine_config = match config_path {
        Some(path) => EngineConfig::load_from_file(path)?,
        None => EngineConfig::default(),
    };

    let (voters, project_ranges, bids, budget) = scenario.into_inputs();
    let mut tracker = NoopTracker;
    let (allocation, payments, stats) = facade::compute_with_tracker(
        &voters,
        &project_ranges,
        &bids,
        budget,
        &engine_config,
        &mut tracker,
    )
    .map_err(|err| anyhow::anyhow!("{err}"))
    .context("running compute over scenario")?;

    let report = Report::new(allocation, payments, stats);

    if pretty {
        print_pretty(&report);
    } else {
        println!("{}", serde_json::to_string_pretty(&report)?);
    }
    Ok(())
}

fn run_check(scenario_path: &std::path::Path) -> Result<()> {
    let scenario = Scenario::load_from_file(scenario_path)?;
    match scenario::validate(&scenario) {
        Ok(()) => {
            println!("{}", "scenario is valid".green());
            Ok(())
        }
        Err(err) => {
            eprintln!("{} {err}", "invalid scenario:".red().bold());
            std::process::exit(1);
        }
    }
}

fn print_pretty(report: &Report) {
    println!("{}", "Allocation".bold());
    for (project, amount) in &report.allocation {
        println!("  project {project:>6}  {amount}");
    }
    println!();
    println!("{}", "Payments".bold());
    for (project, per_voter) in &report.payments {
        for (voter, amount) in per_voter {
            println!("  project {project:>6}  voter {voter:>6}  {amount}");
        }
    }
    println!();
    println!(
        "{} rounds={} final_per_voter_budget={} hit_round_cap={}",
        "Run".bold(),
        report.rounds_run,
        report.final_per_voter_budget,
        report.hit_round_cap
    );
}
