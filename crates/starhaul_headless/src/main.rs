//! Headless Starhaul runner.
//!
//! Runs zones without graphics for balance testing and CI verification.
//!
//! # Usage
//!
//! ```bash
//! # Run one zone for ten game-minutes, print JSON metrics
//! cargo run -p starhaul_headless -- run --scenario frontier
//!
//! # Run a custom zone file
//! cargo run -p starhaul_headless -- run --scenario zones/rim.ron
//!
//! # Run a seed sweep in parallel
//! cargo run -p starhaul_headless -- batch --scenario trade_lanes --count 100
//! ```
//!
//! Output (stdout): JSON metrics. Logs (stderr): tracing output, enabled
//! with `--verbose` or `RUST_LOG`.

use clap::{Parser, Subcommand};
use rayon::prelude::*;
use tracing_subscriber::EnvFilter;

use starhaul_headless::runner::{run_zone, RunConfig};
use starhaul_headless::scenario;

#[derive(Parser)]
#[command(name = "starhaul_headless")]
#[command(about = "Headless Starhaul zone runner for balance testing and CI")]
#[command(version)]
struct Cli {
    /// Enable verbose logging to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a single zone and print its metrics
    Run {
        /// Scenario preset name or RON file path
        #[arg(short, long, default_value = "frontier")]
        scenario: String,

        /// Ticks to simulate
        #[arg(short, long, default_value = "12000")]
        ticks: u64,

        /// Real delta time per tick, seconds
        #[arg(long, default_value = "0.05")]
        dt: f32,

        /// Time-scale multiplier (0 pauses, >1 fast-forwards)
        #[arg(long, default_value = "1.0")]
        time_scale: f32,

        /// RNG seed
        #[arg(long, default_value = "0")]
        seed: u64,

        /// Pretty-print the JSON output
        #[arg(long)]
        pretty: bool,
    },

    /// Run a seed sweep of one scenario in parallel
    Batch {
        /// Scenario preset name or RON file path
        #[arg(short, long, default_value = "frontier")]
        scenario: String,

        /// Number of seeds to run
        #[arg(short, long, default_value = "20")]
        count: u64,

        /// Ticks per run
        #[arg(short, long, default_value = "12000")]
        ticks: u64,

        /// First seed of the sweep
        #[arg(long, default_value = "0")]
        seed: u64,
    },

    /// List built-in scenario presets
    Scenarios,
}

fn main() {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Run {
            scenario,
            ticks,
            dt,
            time_scale,
            seed,
            pretty,
        } => {
            let zone_config = match scenario::resolve(&scenario) {
                Ok(config) => config,
                Err(e) => {
                    tracing::error!(error = %e, "failed to resolve scenario");
                    std::process::exit(1);
                }
            };
            let run = RunConfig {
                ticks,
                dt,
                time_scale,
                seed,
            };
            let metrics = run_zone(&zone_config, &run);
            let json = if pretty {
                serde_json::to_string_pretty(&metrics)
            } else {
                serde_json::to_string(&metrics)
            };
            match json {
                Ok(json) => println!("{json}"),
                Err(e) => {
                    tracing::error!(error = %e, "failed to serialize metrics");
                    std::process::exit(1);
                }
            }
        }

        Commands::Batch {
            scenario,
            count,
            ticks,
            seed,
        } => {
            let zone_config = match scenario::resolve(&scenario) {
                Ok(config) => config,
                Err(e) => {
                    tracing::error!(error = %e, "failed to resolve scenario");
                    std::process::exit(1);
                }
            };

            let results: Vec<_> = (seed..seed + count)
                .into_par_iter()
                .map(|seed| {
                    let run = RunConfig {
                        ticks,
                        seed,
                        ..Default::default()
                    };
                    run_zone(&zone_config, &run)
                })
                .collect();

            match serde_json::to_string(&results) {
                Ok(json) => println!("{json}"),
                Err(e) => {
                    tracing::error!(error = %e, "failed to serialize batch results");
                    std::process::exit(1);
                }
            }
        }

        Commands::Scenarios => {
            for name in scenario::PRESETS {
                println!("{name}");
            }
        }
    }
}
