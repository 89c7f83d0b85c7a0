//! Adversary agents for the Nightwire simulation.
//!
//! This crate owns every autonomous adversary hunting the player: identity
//! and fingerprints, the lifecycle (active, blocked, compromised), daily
//! behaviour per kind, spawn planning, and the reputation rewards paid on
//! removal. It operates on `nightwire-types` state and reads region data from
//! `nightwire-world`; it never advances time itself.
//!
//! # Modules
//!
//! - [`agent`] -- [`EnemyAgent`]: traits by kind, reveal, block, evolution
//! - [`behavior`] -- Daily action gate and per-kind resolvers
//! - [`directory`] -- [`EnemyAgentDirectory`]: spawn, remove, daily update
//! - [`error`] -- Error types for agent operations ([`AgentError`])
//! - [`fingerprint`] -- Permanent fingerprint derivation
//! - [`reward`] -- Removal rewards per kind
//! - [`spawn`] -- Regional and reactive spawn planning

pub mod agent;
pub mod behavior;
pub mod directory;
pub mod error;
pub mod fingerprint;
pub mod reward;
pub mod spawn;

// Re-export primary types at crate root for convenience.
pub use agent::{EVOLUTION_PERIOD_DAYS, EnemyAgent};
pub use behavior::try_action;
pub use directory::{
    AgentFailure, DailyAgentReport, EnemyAgentDirectory, RemovalReport, SpawnContext,
    record_fingerprint,
};
pub use error::AgentError;
pub use fingerprint::{UNRESOLVED, permanent_fingerprint};
pub use reward::{RemovalReward, roll_removal_reward};
pub use spawn::{
    REACTIVE_RULES, REGIONAL_RULES, ReactiveTrigger, RegionalRule, SpawnCause, SpawnRequest,
    pick_kind, plan_daily_spawns, provoking_axis, regional_base_chance, spawn_level,
};
