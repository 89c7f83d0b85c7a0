//! Shared type definitions for the Nightwire simulation.
//!
//! This crate is the single source of truth for the data model used across
//! the Nightwire workspace. It holds no simulation logic beyond the clamping
//! helpers that keep meters and counters inside their ranges.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe identifiers for agents and targets
//! - [`enums`] -- Closed sets: reputation axes, agent kinds, regions, items
//! - [`reputation`] -- The player's clamped three-axis reputation ledger
//! - [`structs`] -- Player, target, asset, and trace-memory structs

pub mod enums;
pub mod ids;
pub mod reputation;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use enums::{
    AgentKind, AgentStatus, AssetKind, Item, ParseEnumError, RegionId, RemovalReason, RepAxis,
    Skill, TravelMode,
};
pub use ids::{AgentId, TargetId};
pub use reputation::ReputationLedger;
pub use structs::{
    Asset, AttackMemory, FingerprintRecord, HoneypotDisguise, METER_MAX, PlayerState, Skills,
    Target, TraceSubject, floor_u32, round2,
};
