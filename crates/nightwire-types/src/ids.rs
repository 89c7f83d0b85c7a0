//! Type-safe identifier wrappers.
//!
//! Adversary agents carry a [`Uuid`]-backed [`AgentId`]. The bytes come from
//! the simulation's random source rather than the system clock, so a seeded
//! run produces the same identifiers every time. Targets are numbered from a
//! per-world counter and use the lighter [`TargetId`].

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Number of hex characters exposed as an agent's short uid.
const SHORT_UID_LEN: usize = 8;

/// Generates a newtype wrapper around [`Uuid`] with standard derives.
macro_rules! define_id {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub struct $name(pub Uuid);

        impl $name {
            /// Build an identifier from 16 random bytes (UUID v4 layout).
            pub fn from_random_bytes(bytes: [u8; 16]) -> Self {
                Self(uuid::Builder::from_random_bytes(bytes).into_uuid())
            }

            /// Return the inner [`Uuid`] value.
            pub const fn into_inner(self) -> Uuid {
                self.0
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<Uuid> for $name {
            fn from(id: Uuid) -> Self {
                Self(id)
            }
        }
    };
}

define_id! {
    /// Unique identifier for an adversary agent.
    AgentId
}

impl AgentId {
    /// The short uid shown to the player (`ai:<uid>`).
    ///
    /// This is the first eight hex characters of the hyphenated UUID and is
    /// also the input to the agent's permanent fingerprint hash.
    pub fn short(self) -> String {
        let simple = self.0.simple().to_string();
        simple.chars().take(SHORT_UID_LEN).collect()
    }
}

/// Identifier of a hackable target, unique within a world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TargetId(pub u32);

impl core::fmt::Display for TargetId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_bytes_same_id() {
        let a = AgentId::from_random_bytes([7; 16]);
        let b = AgentId::from_random_bytes([7; 16]);
        assert_eq!(a, b);
        assert_ne!(a.into_inner(), Uuid::nil());
    }

    #[test]
    fn short_uid_is_eight_hex_chars() {
        let id = AgentId::from_random_bytes([0xAB; 16]);
        let short = id.short();
        assert_eq!(short.len(), 8);
        assert!(short.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn target_id_displays_number() {
        assert_eq!(TargetId(42).to_string(), "42");
    }
}
