//! The player's three-axis reputation ledger.
//!
//! Counters are integers that never go below zero. Callers express intent as
//! signed deltas and the ledger clamps at the write site.

use serde::{Deserialize, Serialize};

use crate::enums::RepAxis;

/// Reputation counters for state, crime, and hacktivist standing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReputationLedger {
    state: u32,
    crime: u32,
    hacktivist: u32,
}

impl ReputationLedger {
    /// An empty ledger with every axis at zero.
    pub const fn new() -> Self {
        Self {
            state: 0,
            crime: 0,
            hacktivist: 0,
        }
    }

    /// Build a ledger with explicit starting values.
    pub const fn with_values(state: u32, crime: u32, hacktivist: u32) -> Self {
        Self {
            state,
            crime,
            hacktivist,
        }
    }

    /// Current value on one axis.
    pub const fn get(&self, axis: RepAxis) -> u32 {
        match axis {
            RepAxis::State => self.state,
            RepAxis::Crime => self.crime,
            RepAxis::Hacktivist => self.hacktivist,
        }
    }

    /// The largest value across all axes.
    pub fn max_axis(&self) -> u32 {
        self.state.max(self.crime).max(self.hacktivist)
    }

    /// Apply a signed delta to one axis, clamping at zero.
    ///
    /// Returns the new value.
    pub fn adjust(&mut self, axis: RepAxis, delta: i64) -> u32 {
        let slot = match axis {
            RepAxis::State => &mut self.state,
            RepAxis::Crime => &mut self.crime,
            RepAxis::Hacktivist => &mut self.hacktivist,
        };
        let target = i64::from(*slot).saturating_add(delta).clamp(0, i64::from(u32::MAX));
        *slot = u32::try_from(target).unwrap_or(u32::MAX);
        *slot
    }

    /// Overwrite one axis.
    pub fn set(&mut self, axis: RepAxis, value: u32) {
        let current = i64::from(self.get(axis));
        self.adjust(axis, i64::from(value).saturating_sub(current));
    }

    /// The fixed shift every intrusion applies: crime up one, state down one.
    pub fn criminal_shift(&mut self) {
        self.adjust(RepAxis::Crime, 1);
        self.adjust(RepAxis::State, -1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negative_intent_clamps_at_zero() {
        let mut rep = ReputationLedger::new();
        assert_eq!(rep.adjust(RepAxis::State, -5), 0);
    }

    #[test]
    fn criminal_shift_floors_state() {
        let mut rep = ReputationLedger::new();
        rep.adjust(RepAxis::Hacktivist, 3);
        rep.criminal_shift();
        assert_eq!(rep.get(RepAxis::Crime), 1);
        assert_eq!(rep.get(RepAxis::State), 0);
        assert_eq!(rep.get(RepAxis::Hacktivist), 3);
    }

    #[test]
    fn set_overwrites() {
        let mut rep = ReputationLedger::with_values(4, 4, 4);
        rep.set(RepAxis::Crime, 52);
        assert_eq!(rep.get(RepAxis::Crime), 52);
        assert_eq!(rep.max_axis(), 52);
    }
}
