//! Regions, target pool, scanning, and news for the Nightwire simulation.
//!
//! This crate models the world outside the player: five regions with
//! drifting pressure metrics and a day-gated unlock schedule, the daily pool
//! of hackable targets, the weighted sampler behind `scan`, and the regional
//! news feed.
//!
//! # Modules
//!
//! - [`error`] -- Error types for region and target lookups.
//! - [`regions`] -- [`RegionRegistry`]: unlock schedule, difficulty, drift.
//! - [`targets`] -- [`TargetPool`]: daily regeneration and honeypots.
//! - [`scan`] -- Weighted, capped sampling without replacement.
//! - [`news`] -- Headline generation from pressure, census, and notoriety.
//! - [`sampling`] -- Gaussian draws and cumulative-weight roulette.

pub mod error;
pub mod news;
pub mod regions;
pub mod sampling;
pub mod scan;
pub mod targets;

// Re-export primary types at crate root.
pub use error::WorldError;
pub use news::{AgentCensus, region_news};
pub use regions::{PRESSURE_MAX, Pressure, REGION_TABLE, RegionRegistry, RegionSpec, RegionState};
pub use sampling::{gauss, roulette_without_replacement};
pub use scan::{ScanSettings, scan_sample, scan_weight};
pub use targets::{HONEYPOT_CHANCE, MAX_SECURITY, TargetPool};
