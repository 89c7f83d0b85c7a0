//! World clock, tick pipeline, resolvers, and the simulation facade for
//! Nightwire.
//!
//! Every player-facing operation passes its elapsed hours through the tick
//! pipeline first, then resolves against the action resolver, the trace
//! engine, and the mission graph.
//!
//! # Modules
//!
//! - [`clock`] -- Simulated timestamp and world-day counter.
//! - [`config`] -- `nightwire-config.yaml` loading into typed structs.
//! - [`missions`] -- The reputation-gated mission unlock graph.
//! - [`resolver`] -- Hack chance and outcome resolution.
//! - [`trace`] -- Post-detection fine or incarceration.
//! - [`tick`] -- Meter decay, income, and the daily pipeline.
//! - [`events`] -- Random world events and their pending choices.
//! - [`actions`] -- Rest, jobs, study, travel, and provisioning.
//! - [`sim`] -- [`Simulation`], the host-facing facade.
//!
//! [`Simulation`]: sim::Simulation

pub mod actions;
pub mod clock;
pub mod config;
pub mod error;
pub mod events;
pub mod missions;
pub mod resolver;
pub mod sim;
pub mod tick;
pub mod trace;

pub use clock::{ClockAdvance, ClockError, WorldClock};
pub use config::{ConfigError, SimulationConfig};
pub use error::{Resource, SimError};
pub use events::{EventChoice, PendingEvent};
pub use missions::{MissionNode, MissionSync, MissionUnlockGraph};
pub use resolver::calc_hack_chance;
pub use sim::{
    AgentSighting, MissionListing, OperationReport, Probe, ScanReport, Simulation, StatusReport,
};
pub use tick::{AdvanceSummary, Notice, WorldState};
pub use trace::{TraceOutcome, TraceVerdict, capture_probability, recidivism_factor};
