//! Error types for the nightwire-agents crate.
//!
//! Directory operations and per-agent daily updates return typed errors
//! rather than panicking. A failure in one agent's update is reported as a
//! value so the daily loop can log it and move on to the next agent.

use nightwire_types::AgentId;
use nightwire_world::WorldError;

/// Errors that can occur during adversary-agent operations.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AgentError {
    /// No listed agent has the given id.
    #[error("agent not found: {0}")]
    AgentNotFound(AgentId),

    /// No listed agent matches the identifier the player typed.
    #[error("no agent matches identifier: {0}")]
    UnknownIdentifier(String),

    /// The agent is blocked and cannot be targeted or act.
    #[error("agent {agent} is blocked")]
    AgentBlocked {
        /// The blocked agent.
        agent: AgentId,
    },

    /// A compromised agent was still listed when it was visited.
    #[error("agent {0} is compromised but still listed")]
    StaleCompromised(AgentId),

    /// An agent's numeric state is not usable (for example a non-finite
    /// trace power).
    #[error("agent {agent} has corrupt state: {detail}")]
    CorruptState {
        /// The offending agent.
        agent: AgentId,
        /// What was wrong.
        detail: String,
    },

    /// A region lookup failed while spawning.
    #[error("world error: {source}")]
    World {
        /// The underlying world error.
        #[from]
        source: WorldError,
    },
}
