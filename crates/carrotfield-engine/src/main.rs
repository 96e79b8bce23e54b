//! Driver binary for the Carrotfield simulation.
//!
//! Loads configuration, builds the controller, optionally restores a saved
//! grid, and runs until Ctrl-C or the `--run-for` deadline. While running
//! it polls the grid at `refresh_interval_ms` and prints a character map.
//! On the way out it stops every unit, optionally saves the grid, and logs
//! the final census.
//!
//! # Startup Sequence
//!
//! 1. Initialize structured logging (tracing)
//! 2. Load configuration from `carrotfield-config.yaml` (or `--config`)
//! 3. Build the simulation and place the initial producers
//! 4. Load a saved grid if `--load` was given, otherwise start fresh
//! 5. Render until interrupted
//! 6. Stop, save if `--save` was given, log the result

mod error;
mod render;

use std::future;
use std::path::{Path, PathBuf};
use std::time::Duration;

use carrotfield_core::{Simulation, SimulationConfig};
use clap::Parser;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use crate::error::EngineError;

/// Default configuration file, read from the working directory.
const DEFAULT_CONFIG_PATH: &str = "carrotfield-config.yaml";

/// Command-line options.
#[derive(Debug, Parser)]
#[command(name = "carrotfield-engine", version, about = "Run the Carrotfield grid simulation")]
struct Cli {
    /// YAML configuration file. Missing files fall back to defaults.
    #[arg(
        long,
        value_name = "PATH",
        env = "CARROTFIELD_CONFIG",
        default_value = DEFAULT_CONFIG_PATH
    )]
    config: PathBuf,

    /// Restore cell state from a saved grid before running.
    #[arg(long, value_name = "FILE")]
    load: Option<PathBuf>,

    /// Save cell state to this file after stopping.
    #[arg(long, value_name = "FILE")]
    save: Option<PathBuf>,

    /// Stop after this many seconds instead of waiting for Ctrl-C.
    #[arg(
        long = "run-for",
        value_name = "SECONDS",
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    run_for: Option<u64>,

    /// Write the effective configuration to this file and exit.
    #[arg(long = "write-config", value_name = "PATH")]
    write_config: Option<PathBuf>,

    /// Do not print the character map.
    #[arg(long = "no-render")]
    no_render: bool,
}

/// Application entry point.
///
/// # Errors
///
/// Returns an error if configuration is invalid, a requested load or save
/// fails, or the Ctrl-C handler cannot be installed.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    let cli = Cli::parse();
    info!("carrotfield-engine starting");

    let config = load_config(&cli.config)?;
    info!(
        grid_size = config.grid_size,
        producer_count = config.producer_count,
        growth_interval_ms = config.growth_interval_ms,
        spawn_rate = config.spawn_rate,
        seed = ?config.seed,
        "Configuration loaded"
    );

    if let Some(path) = &cli.write_config {
        config.save_to_file(path).map_err(EngineError::from)?;
        info!(path = %path.display(), "Configuration written");
        return Ok(());
    }

    let mut simulation = Simulation::new(config).map_err(EngineError::from)?;

    if let Some(path) = &cli.load {
        simulation
            .load_from_path(path)
            .await
            .map_err(EngineError::from)?;
    } else {
        simulation.start();
    }

    run(&simulation, &cli).await?;

    let report = simulation.stop().await;
    if !report.is_clean() {
        warn!(
            timed_out = report.timed_out,
            failed = report.failed,
            "Shutdown was not clean"
        );
    }

    if let Some(path) = &cli.save {
        simulation.save_to_path(path).map_err(EngineError::from)?;
    }

    let cells = simulation.census();
    let actors = simulation.actor_counts();
    info!(
        empty = cells.empty,
        growing = cells.growing,
        ready = cells.ready,
        damaged = cells.damaged,
        producers = actors.producers,
        consumers = actors.consumers,
        protectors = actors.protectors,
        "carrotfield-engine finished"
    );
    Ok(())
}

/// Load configuration from `path`, falling back to defaults when the file
/// does not exist.
fn load_config(path: &Path) -> Result<SimulationConfig, EngineError> {
    if path.exists() {
        Ok(SimulationConfig::from_file(path)?)
    } else {
        info!(path = %path.display(), "Config file not found, using defaults");
        Ok(SimulationConfig::default())
    }
}

/// Poll and render until Ctrl-C or the deadline.
async fn run(simulation: &Simulation, cli: &Cli) -> Result<(), EngineError> {
    let mut refresh = tokio::time::interval(simulation.config().refresh_interval());
    refresh.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    let deadline = async {
        match cli.run_for {
            Some(secs) => tokio::time::sleep(Duration::from_secs(secs)).await,
            None => future::pending::<()>().await,
        }
    };
    tokio::pin!(deadline);

    let mut render = !cli.no_render;
    loop {
        tokio::select! {
            signal = tokio::signal::ctrl_c() => {
                signal.map_err(|source| EngineError::Signal { source })?;
                info!("Interrupted, stopping");
                return Ok(());
            }
            () = &mut deadline => {
                info!(run_for_secs = ?cli.run_for, "Run time elapsed, stopping");
                return Ok(());
            }
            _ = refresh.tick(), if render => {
                if let Err(e) = draw(simulation) {
                    debug!(error = %e, "Console output failed, rendering disabled");
                    render = false;
                }
            }
        }
    }
}

fn draw(simulation: &Simulation) -> std::io::Result<()> {
    let grid = simulation.grid();
    let mut stdout = std::io::stdout().lock();
    render::write_frame(&mut stdout, &grid.view(), &grid.census(), &grid.actor_counts())
}
