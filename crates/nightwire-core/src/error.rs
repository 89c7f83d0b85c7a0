//! Error types for the `nightwire-core` crate.
//!
//! [`SimError`] is what every player-facing operation on the
//! [`Simulation`](crate::sim::Simulation) returns. Lower-level errors from the
//! world and agent crates are folded into its taxonomy: unknown identifiers
//! become [`SimError::InvalidArgument`], state that forbids the operation
//! becomes [`SimError::PreconditionNotMet`]. Incarceration is not an error;
//! it is reported on the operation's outcome, and only calls made after the
//! run has ended fail with [`SimError::RunEnded`].

use core::fmt;

use nightwire_agents::AgentError;
use nightwire_world::WorldError;
use serde::Serialize;

use crate::clock::ClockError;
use crate::config::ConfigError;
use crate::missions::MissionTableError;

/// A resource an operation can run short of.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Resource {
    /// Cash on hand.
    Money,
    /// Unspent study points.
    Knowledge,
    /// The focus meter.
    Focus,
    /// Held stimulant doses.
    StimulantDoses,
    /// Free inventory slots.
    InventorySpace,
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Money => "money",
            Self::Knowledge => "knowledge",
            Self::Focus => "focus",
            Self::StimulantDoses => "stimulant doses",
            Self::InventorySpace => "inventory space",
        })
    }
}

/// Errors returned by simulation operations.
#[derive(Debug, thiserror::Error)]
pub enum SimError {
    /// An identifier does not name a known target, region, agent, or mission.
    #[error("invalid argument: {detail}")]
    InvalidArgument {
        /// What was rejected.
        detail: String,
    },

    /// The player lacks a resource the operation needs. Nothing was applied.
    #[error("insufficient {resource}: need {required}, have {available}")]
    InsufficientResource {
        /// Which resource.
        resource: Resource,
        /// Amount the operation needs.
        required: f64,
        /// Amount the player holds.
        available: f64,
    },

    /// Current state forbids the operation. Nothing was applied.
    #[error("precondition not met: {detail}")]
    PreconditionNotMet {
        /// Why the operation is not allowed now.
        detail: String,
    },

    /// The run has ended with the player incarcerated.
    #[error("the run has ended")]
    RunEnded,

    /// Simulated time could not be advanced.
    #[error("clock error: {source}")]
    Clock {
        /// The underlying clock error.
        #[from]
        source: ClockError,
    },

    /// An agent's state is unusable.
    #[error("agent error: {source}")]
    Agent {
        /// The underlying agent error.
        source: AgentError,
    },

    /// The static mission table failed validation.
    #[error("mission table error: {source}")]
    Missions {
        /// The underlying validation error.
        #[from]
        source: MissionTableError,
    },

    /// The configuration was rejected.
    #[error("configuration error: {source}")]
    Config {
        /// The underlying configuration error.
        #[from]
        source: ConfigError,
    },
}

impl SimError {
    /// Shorthand for [`SimError::InvalidArgument`].
    pub fn invalid(detail: impl Into<String>) -> Self {
        Self::InvalidArgument {
            detail: detail.into(),
        }
    }

    /// Shorthand for [`SimError::PreconditionNotMet`].
    pub fn precondition(detail: impl Into<String>) -> Self {
        Self::PreconditionNotMet {
            detail: detail.into(),
        }
    }

    /// Shorthand for [`SimError::InsufficientResource`].
    pub const fn insufficient(resource: Resource, required: f64, available: f64) -> Self {
        Self::InsufficientResource {
            resource,
            required,
            available,
        }
    }
}

impl From<WorldError> for SimError {
    fn from(source: WorldError) -> Self {
        match source {
            WorldError::UnknownRegion(_) | WorldError::TargetNotFound(_) => {
                Self::invalid(source.to_string())
            }
            WorldError::RegionLocked { .. } => Self::precondition(source.to_string()),
        }
    }
}

impl From<AgentError> for SimError {
    fn from(source: AgentError) -> Self {
        match source {
            AgentError::AgentNotFound(_) | AgentError::UnknownIdentifier(_) => {
                Self::invalid(source.to_string())
            }
            AgentError::AgentBlocked { .. } | AgentError::StaleCompromised(_) => {
                Self::precondition(source.to_string())
            }
            AgentError::World { source } => Self::from(source),
            AgentError::CorruptState { .. } => Self::Agent { source },
        }
    }
}
