//! Error types for the Nightwire engine binary.
//!
//! [`EngineError`] wraps every failure mode of startup and the autopilot
//! session so `main` can propagate with `?`.

/// Top-level error for the engine binary.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: nightwire_core::ConfigError,
    },

    /// A simulation operation failed in a way the autopilot cannot recover
    /// from.
    #[error("simulation error: {source}")]
    Simulation {
        /// The underlying simulation error.
        #[from]
        source: nightwire_core::SimError,
    },

    /// The final status report could not be serialized.
    #[error("report error: {source}")]
    Report {
        /// The underlying serialization error.
        #[from]
        source: serde_json::Error,
    },
}
