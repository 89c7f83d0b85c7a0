//! Region registry: unlock schedule, difficulty, and drifting pressure.
//!
//! Every region carries three pressure metrics (state, crime, hacktivist),
//! each kept in `[0, 20]`. Once a day the metrics take a small random walk,
//! skewed by a fixed per-region trend. The pressures drive agent spawns,
//! regional asset events, and news.
//!
//! # Invariants
//!
//! - Pressure metrics stay within `[0, PRESSURE_MAX]` after every mutation.
//! - Unlocking is monotonic: a region never re-locks, and regions unlock in
//!   ascending order of their day thresholds.

use std::collections::BTreeMap;

use nightwire_types::{RegionId, RepAxis};
use rand::Rng;
use rand::seq::IndexedRandom;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::WorldError;

/// Upper bound of every pressure metric.
pub const PRESSURE_MAX: i32 = 20;

/// Chance per axis per day that the region trend nudges the walk.
const TREND_NUDGE_CHANCE: f64 = 0.15;

/// Chance per axis per day of a large jump.
const SHOCK_CHANCE: f64 = 0.02;

/// Three pressure values indexed by reputation axis.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pressure {
    /// State-aligned pressure.
    pub state: i32,
    /// Organised-crime pressure.
    pub crime: i32,
    /// Hacktivist pressure.
    pub hacktivist: i32,
}

impl Pressure {
    /// Build a pressure triple.
    pub const fn new(state: i32, crime: i32, hacktivist: i32) -> Self {
        Self {
            state,
            crime,
            hacktivist,
        }
    }

    /// Value on one axis.
    pub const fn get(&self, axis: RepAxis) -> i32 {
        match axis {
            RepAxis::State => self.state,
            RepAxis::Crime => self.crime,
            RepAxis::Hacktivist => self.hacktivist,
        }
    }

    fn slot(&mut self, axis: RepAxis) -> &mut i32 {
        match axis {
            RepAxis::State => &mut self.state,
            RepAxis::Crime => &mut self.crime,
            RepAxis::Hacktivist => &mut self.hacktivist,
        }
    }
}

/// Static definition of one region.
#[derive(Debug, Clone, Copy)]
pub struct RegionSpec {
    /// Which region.
    pub id: RegionId,
    /// World day at which the region unlocks.
    pub unlock_day: u32,
    /// Difficulty tier (spawn level bonus, pool size, travel cost).
    pub difficulty: u32,
    /// Pressure at world start.
    pub initial: Pressure,
    /// Direction each metric leans when the trend nudges the walk.
    pub trend: Pressure,
}

/// The fixed region table, in unlock order.
pub const REGION_TABLE: [RegionSpec; 5] = [
    RegionSpec {
        id: RegionId::Local,
        unlock_day: 0,
        difficulty: 1,
        initial: Pressure::new(2, 3, 1),
        trend: Pressure::new(0, 0, 0),
    },
    RegionSpec {
        id: RegionId::SouthAmerica,
        unlock_day: 7,
        difficulty: 2,
        initial: Pressure::new(3, 6, 2),
        trend: Pressure::new(1, 1, -1),
    },
    RegionSpec {
        id: RegionId::Europe,
        unlock_day: 15,
        difficulty: 3,
        initial: Pressure::new(6, 3, 4),
        trend: Pressure::new(1, -1, 1),
    },
    RegionSpec {
        id: RegionId::Asia,
        unlock_day: 30,
        difficulty: 4,
        initial: Pressure::new(4, 5, 5),
        trend: Pressure::new(-1, 1, 1),
    },
    RegionSpec {
        id: RegionId::Global,
        unlock_day: 90,
        difficulty: 6,
        initial: Pressure::new(5, 8, 6),
        trend: Pressure::new(0, 1, 1),
    },
];

/// Mutable runtime state of one region.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionState {
    /// Which region.
    pub id: RegionId,
    /// Whether the player can see and travel to it.
    pub unlocked: bool,
    /// World day at which it unlocks.
    pub unlock_day: u32,
    /// Difficulty tier.
    pub difficulty: u32,
    /// Current pressure metrics.
    pub pressure: Pressure,
    /// Drift bias.
    pub trend: Pressure,
}

impl RegionState {
    fn from_spec(spec: &RegionSpec) -> Self {
        Self {
            id: spec.id,
            unlocked: spec.unlock_day == 0,
            unlock_day: spec.unlock_day,
            difficulty: spec.difficulty,
            pressure: spec.initial,
            trend: spec.trend,
        }
    }

    /// One day of pressure drift on every axis.
    ///
    /// Each metric moves by a uniform step in `{-1, 0, 1}`. With 15% chance
    /// the trend adds itself (or nothing); with 2% chance a shock of
    /// `{-3, -2, 2, 3}` lands on top. The result is clamped to `[0, 20]`.
    pub fn drift(&mut self, rng: &mut impl Rng) {
        for axis in RepAxis::ALL {
            let mut step = [-1, 0, 1].choose(rng).copied().unwrap_or(0);
            if rng.random_bool(TREND_NUDGE_CHANCE) {
                let bias = self.trend.get(axis);
                step += if rng.random_bool(0.5) { bias } else { 0 };
            }
            if rng.random_bool(SHOCK_CHANCE) {
                step += [-3, -2, 2, 3].choose(rng).copied().unwrap_or(0);
            }
            let slot = self.pressure.slot(axis);
            *slot = (*slot + step).clamp(0, PRESSURE_MAX);
        }
    }
}

/// All regions, keyed by id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionRegistry {
    regions: BTreeMap<RegionId, RegionState>,
}

impl Default for RegionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl RegionRegistry {
    /// Build the registry from [`REGION_TABLE`]. Only `Local` starts unlocked.
    pub fn new() -> Self {
        let regions = REGION_TABLE
            .iter()
            .map(|spec| (spec.id, RegionState::from_spec(spec)))
            .collect();
        Self { regions }
    }

    /// Look up a region.
    pub fn get(&self, id: RegionId) -> Result<&RegionState, WorldError> {
        self.regions.get(&id).ok_or(WorldError::UnknownRegion(id))
    }

    /// Look up a region mutably.
    pub fn get_mut(&mut self, id: RegionId) -> Result<&mut RegionState, WorldError> {
        self.regions.get_mut(&id).ok_or(WorldError::UnknownRegion(id))
    }

    /// Whether a region is unlocked. Unknown regions count as locked.
    pub fn is_unlocked(&self, id: RegionId) -> bool {
        self.regions.get(&id).is_some_and(|r| r.unlocked)
    }

    /// Fail with [`WorldError::RegionLocked`] unless the region is unlocked.
    pub fn require_unlocked(&self, id: RegionId) -> Result<&RegionState, WorldError> {
        let region = self.get(id)?;
        if region.unlocked {
            Ok(region)
        } else {
            Err(WorldError::RegionLocked {
                region: id,
                unlock_day: region.unlock_day,
            })
        }
    }

    /// Difficulty of a region, or 1 for an unknown one.
    pub fn difficulty(&self, id: RegionId) -> u32 {
        self.regions.get(&id).map_or(1, |r| r.difficulty)
    }

    /// Iterate over every region in unlock order.
    pub fn iter(&self) -> impl Iterator<Item = &RegionState> {
        self.regions.values()
    }

    /// Iterate over unlocked regions.
    pub fn unlocked(&self) -> impl Iterator<Item = &RegionState> {
        self.regions.values().filter(|r| r.unlocked)
    }

    /// Unlock every region whose threshold `day` has reached.
    ///
    /// Returns the newly unlocked regions, in table order. Already unlocked
    /// regions are never reported twice.
    pub fn unlock_due(&mut self, day: u32) -> Vec<RegionId> {
        let mut newly = Vec::new();
        for region in self.regions.values_mut() {
            if !region.unlocked && day >= region.unlock_day {
                region.unlocked = true;
                info!(region = %region.id, day, "region unlocked");
                newly.push(region.id);
            }
        }
        newly
    }

    /// Apply one day of drift to every region, locked or not.
    pub fn drift_all(&mut self, rng: &mut impl Rng) {
        for region in self.regions.values_mut() {
            region.drift(rng);
            debug!(
                region = %region.id,
                state = region.pressure.state,
                crime = region.pressure.crime,
                hacktivist = region.pressure.hacktivist,
                "regional pressure drift"
            );
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn only_local_starts_unlocked() {
        let reg = RegionRegistry::new();
        assert!(reg.is_unlocked(RegionId::Local));
        assert_eq!(reg.unlocked().count(), 1);
    }

    #[test]
    fn unlocks_follow_thresholds_and_never_repeat() {
        let mut reg = RegionRegistry::new();
        assert!(reg.unlock_due(6).is_empty());
        assert_eq!(reg.unlock_due(7), vec![RegionId::SouthAmerica]);
        assert!(reg.unlock_due(8).is_empty());
        assert_eq!(reg.unlock_due(40), vec![RegionId::Europe, RegionId::Asia]);
        assert_eq!(reg.unlock_due(90), vec![RegionId::Global]);
        assert!(reg.unlock_due(1000).is_empty());
        assert_eq!(reg.unlocked().count(), 5);
    }

    #[test]
    fn locked_region_is_rejected() {
        let reg = RegionRegistry::new();
        let err = reg.require_unlocked(RegionId::Asia).unwrap_err();
        assert!(matches!(err, WorldError::RegionLocked { unlock_day: 30, .. }));
    }

    #[test]
    fn drift_stays_in_bounds() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut reg = RegionRegistry::new();
        for _ in 0..2_000 {
            reg.drift_all(&mut rng);
            for region in reg.iter() {
                for axis in RepAxis::ALL {
                    let v = region.pressure.get(axis);
                    assert!((0..=PRESSURE_MAX).contains(&v), "{v} out of range");
                }
            }
        }
    }
}
