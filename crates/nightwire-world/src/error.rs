//! Error types for the `nightwire-world` crate.
//!
//! All fallible operations in this crate return [`WorldError`] through the
//! standard [`Result`] type.

use nightwire_types::{RegionId, TargetId};

/// Errors that can occur during region and target-pool operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WorldError {
    /// The region is not in the registry.
    #[error("unknown region: {0}")]
    UnknownRegion(RegionId),

    /// The region exists but has not unlocked yet.
    #[error("region {region} is locked until day {unlock_day}")]
    RegionLocked {
        /// The locked region.
        region: RegionId,
        /// Day on which it unlocks.
        unlock_day: u32,
    },

    /// No target with this id is in the current pool.
    #[error("target not found: {0}")]
    TargetNotFound(TargetId),
}
