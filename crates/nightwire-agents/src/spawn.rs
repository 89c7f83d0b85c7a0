//! Spawn evaluation: who appears, where, and how strong.
//!
//! Two sources feed the directory each day:
//!
//! - **Regional** spawns. For every unlocked region the base chance is
//!   `0.003 + 0.002*state + 0.003*crime + 0.001*hacktivist + min(0.03, day/1000)`.
//!   Each kind then rolls independently behind its own pressure gate and
//!   multiplier (see [`REGIONAL_RULES`]).
//! - **Reactive** spawns keyed to the player's reputation, always in the
//!   player's region (see [`REACTIVE_RULES`]).
//!
//! This module only plans spawns. The directory turns plans into agents.

use nightwire_types::{AgentKind, RegionId, RepAxis, ReputationLedger};
use nightwire_world::{Pressure, RegionRegistry, RegionState};
use rand::Rng;
use rand::seq::IndexedRandom;
use serde::{Deserialize, Serialize};

/// Why an agent was spawned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpawnCause {
    /// Regional pressure crossed a gate and the roll hit.
    Regional,
    /// The player's reputation provoked a response.
    Reactive,
    /// A random world event sent an agent after the player.
    Contact,
    /// Requested by the host.
    Manual,
}

/// A planned spawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpawnRequest {
    /// Forced kind, or `None` to pick from regional pressure.
    pub kind: Option<AgentKind>,
    /// Where to spawn, or `None` for a roaming agent on the global backbone.
    pub region: Option<RegionId>,
    /// Why.
    pub cause: SpawnCause,
}

/// A regional spawn rule: the kind, the pressure axis that gates it, the
/// minimum pressure, and the multiplier on the base chance.
#[derive(Debug, Clone, Copy)]
pub struct RegionalRule {
    /// Kind spawned.
    pub kind: AgentKind,
    /// Gating axis.
    pub axis: RepAxis,
    /// Minimum pressure on the gating axis.
    pub min_pressure: i32,
    /// Multiplier on the region's base chance.
    pub multiplier: f64,
}

/// Regional spawn rules, evaluated in order.
pub const REGIONAL_RULES: [RegionalRule; 3] = [
    RegionalRule {
        kind: AgentKind::Pirate,
        axis: RepAxis::State,
        min_pressure: 10,
        multiplier: 1.0,
    },
    RegionalRule {
        kind: AgentKind::Federal,
        axis: RepAxis::Crime,
        min_pressure: 10,
        multiplier: 0.7,
    },
    RegionalRule {
        kind: AgentKind::Hacktivist,
        axis: RepAxis::Hacktivist,
        min_pressure: 9,
        multiplier: 0.5,
    },
];

/// What provokes a reactive spawn.
#[derive(Debug, Clone, Copy)]
pub enum ReactiveTrigger {
    /// One axis at or above a threshold.
    AxisAtLeast(RepAxis, u32),
    /// Any axis strictly above a threshold.
    AnyAxisAbove(u32),
}

/// Reactive spawn rules: trigger, kind, and chance.
pub const REACTIVE_RULES: [(ReactiveTrigger, AgentKind, f64); 3] = [
    (ReactiveTrigger::AxisAtLeast(RepAxis::State, 18), AgentKind::Pirate, 0.10),
    (ReactiveTrigger::AxisAtLeast(RepAxis::Crime, 18), AgentKind::Federal, 0.10),
    (ReactiveTrigger::AnyAxisAbove(20), AgentKind::Hacktivist, 0.08),
];

impl ReactiveTrigger {
    /// Whether the ledger trips this trigger.
    pub fn tripped(self, reputation: &ReputationLedger) -> bool {
        match self {
            Self::AxisAtLeast(axis, threshold) => reputation.get(axis) >= threshold,
            Self::AnyAxisAbove(threshold) => reputation.max_axis() > threshold,
        }
    }
}

/// Base per-region spawn chance.
pub fn regional_base_chance(pressure: &Pressure, day: u32) -> f64 {
    let weighted = 0.001f64.mul_add(
        f64::from(pressure.hacktivist),
        0.002f64.mul_add(f64::from(pressure.state), 0.003 * f64::from(pressure.crime)),
    );
    0.003 + weighted + (f64::from(day) / 1000.0).min(0.03)
}

/// The reputation axis whose standing makes a kind stronger on spawn.
pub const fn provoking_axis(kind: AgentKind) -> Option<RepAxis> {
    match kind {
        AgentKind::Pirate => Some(RepAxis::State),
        AgentKind::Federal => Some(RepAxis::Crime),
        AgentKind::Hacktivist => Some(RepAxis::Hacktivist),
        AgentKind::Generic => None,
    }
}

/// Level for a new agent: `1 + day/30`, plus `difficulty - 1` when spawned
/// in a known region, plus `reputation/6` on the provoking axis for a forced
/// kind or `U{0..2}` otherwise. Never below 1.
pub fn spawn_level(
    day: u32,
    region: Option<&RegionState>,
    forced: Option<AgentKind>,
    reputation: &ReputationLedger,
    rng: &mut impl Rng,
) -> u32 {
    let mut level = 1u32.saturating_add(day / 30);
    if let Some(region) = region {
        level = level.saturating_add(region.difficulty.saturating_sub(1));
    }
    let bonus = match forced.and_then(provoking_axis) {
        Some(axis) => reputation.get(axis) / 6,
        None => rng.random_range(0..=2),
    };
    level.saturating_add(bonus).max(1)
}

/// Pick a kind for an untyped spawn from the region's pressure.
///
/// Each kind gets `pressure/2` tickets once its axis reaches the gate
/// (state 6 for Pirate, crime 6 for Federal, hacktivist 4 for Hacktivist).
/// With no tickets the agent is Generic. With no region every kind is
/// equally likely.
pub fn pick_kind(region: Option<&RegionState>, rng: &mut impl Rng) -> AgentKind {
    let Some(region) = region else {
        return AgentKind::ALL.choose(rng).copied().unwrap_or(AgentKind::Generic);
    };
    let p = region.pressure;
    let gates = [
        (AgentKind::Pirate, p.state, 6),
        (AgentKind::Federal, p.crime, 6),
        (AgentKind::Hacktivist, p.hacktivist, 4),
    ];
    let tickets: Vec<(AgentKind, u32)> = gates
        .into_iter()
        .filter(|&(_, value, gate)| value >= gate)
        .map(|(kind, value, _)| (kind, u32::try_from(value / 2).unwrap_or(0)))
        .filter(|&(_, t)| t > 0)
        .collect();
    let total: u32 = tickets.iter().map(|&(_, t)| t).sum();
    if total == 0 {
        return AgentKind::Generic;
    }
    let mut draw = rng.random_range(0..total);
    for (kind, t) in tickets {
        if draw < t {
            return kind;
        }
        draw -= t;
    }
    AgentKind::Generic
}

/// Plan one day's regional and reactive spawns.
pub fn plan_daily_spawns(
    regions: &RegionRegistry,
    reputation: &ReputationLedger,
    player_region: RegionId,
    day: u32,
    rng: &mut impl Rng,
) -> Vec<SpawnRequest> {
    let mut plans = Vec::new();
    for region in regions.unlocked() {
        let base = regional_base_chance(&region.pressure, day);
        for rule in &REGIONAL_RULES {
            if region.pressure.get(rule.axis) >= rule.min_pressure
                && rng.random::<f64>() < base * rule.multiplier
            {
                plans.push(SpawnRequest {
                    kind: Some(rule.kind),
                    region: Some(region.id),
                    cause: SpawnCause::Regional,
                });
            }
        }
    }
    for (trigger, kind, chance) in REACTIVE_RULES {
        if trigger.tripped(reputation) && rng.random::<f64>() < chance {
            plans.push(SpawnRequest {
                kind: Some(kind),
                region: Some(player_region),
                cause: SpawnCause::Reactive,
            });
        }
    }
    plans
}
