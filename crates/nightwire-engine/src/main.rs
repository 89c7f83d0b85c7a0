//! Engine binary for the Nightwire simulation.
//!
//! Loads configuration, initializes structured logging, and runs a headless
//! autopilot session against the simulation facade.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `nightwire-config.yaml` (or `NIGHTWIRE_CONFIG`)
//! 2. Initialize structured logging (tracing), `RUST_LOG` first
//! 3. Apply the autopilot seed override
//! 4. Create the simulation
//! 5. Run the autopilot for the configured number of days
//! 6. Log the result

mod autopilot;
mod error;

use nightwire_core::{Simulation, SimulationConfig};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::error::EngineError;

fn main() -> anyhow::Result<()> {
    let (mut config, path) = SimulationConfig::load().map_err(EngineError::from)?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level)),
        )
        .with_target(true)
        .init();

    info!(config_path = ?path, "nightwire-engine starting");

    if let Some(seed) = config.autopilot.seed {
        config.world.seed = Some(seed);
    }
    let days = config.autopilot.days;
    info!(
        seed = ?config.world.seed,
        days,
        jail_ends_run = config.world.jail_ends_run,
        "Configuration loaded"
    );

    let mut sim = Simulation::new(config).map_err(EngineError::from)?;
    let summary = autopilot::run(&mut sim, days)?;
    autopilot::log_summary(&sim, &summary)?;

    info!(end = ?summary.end, day = summary.day, "nightwire-engine shutdown complete");
    Ok(())
}
