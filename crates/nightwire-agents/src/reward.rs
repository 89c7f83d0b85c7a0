//! Reputation rewards for removing an adversary.
//!
//! Each kind pays out on the axes of the factions that benefit from its
//! removal. A critical removal adds one more point on every axis the kind
//! rewards. An agent whose kind was never learned pays as Generic, but
//! removal always reveals the kind before the reward is computed, so in
//! practice the true kind decides.

use nightwire_types::{AgentKind, RepAxis, ReputationLedger};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Reputation deltas granted for one removal.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemovalReward {
    /// `(axis, points)` pairs in grant order.
    pub grants: Vec<(RepAxis, u32)>,
}

impl RemovalReward {
    /// Points granted on one axis.
    pub fn on(&self, axis: RepAxis) -> u32 {
        self.grants
            .iter()
            .filter(|(a, _)| *a == axis)
            .map(|&(_, v)| v)
            .sum()
    }

    /// Apply every grant to a ledger.
    pub fn apply(&self, ledger: &mut ReputationLedger) {
        for &(axis, points) in &self.grants {
            ledger.adjust(axis, i64::from(points));
        }
    }

    /// Human-readable summary, e.g. `state +2, hacktivists +1`.
    pub fn summary(&self) -> String {
        self.grants
            .iter()
            .map(|(axis, v)| format!("{axis} +{v}"))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Roll the reward for removing an agent of `kind`.
pub fn roll_removal_reward(kind: AgentKind, critical: bool, rng: &mut impl Rng) -> RemovalReward {
    let mut grants: Vec<(RepAxis, u32)> = match kind {
        AgentKind::Pirate => vec![
            (RepAxis::State, rng.random_range(1..=3)),
            (RepAxis::Hacktivist, rng.random_range(1..=2)),
        ],
        AgentKind::Federal => vec![
            (RepAxis::Crime, rng.random_range(1..=3)),
            (RepAxis::Hacktivist, rng.random_range(1..=2)),
        ],
        AgentKind::Hacktivist => vec![
            (RepAxis::Crime, rng.random_range(1..=3)),
            (RepAxis::State, rng.random_range(1..=3)),
            (RepAxis::Hacktivist, rng.random_range(2..=5)),
        ],
        AgentKind::Generic => vec![(RepAxis::Hacktivist, 1)],
    };
    if critical {
        for (_, points) in &mut grants {
            *points = points.saturating_add(1);
        }
    }
    RemovalReward { grants }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn ranges_per_kind() {
        let mut rng = StdRng::seed_from_u64(17);
        for _ in 0..200 {
            let p = roll_removal_reward(AgentKind::Pirate, false, &mut rng);
            assert!((1..=3).contains(&p.on(RepAxis::State)));
            assert!((1..=2).contains(&p.on(RepAxis::Hacktivist)));
            assert_eq!(p.on(RepAxis::Crime), 0);

            let f = roll_removal_reward(AgentKind::Federal, false, &mut rng);
            assert!((1..=3).contains(&f.on(RepAxis::Crime)));
            assert_eq!(f.on(RepAxis::State), 0);

            let h = roll_removal_reward(AgentKind::Hacktivist, false, &mut rng);
            assert!((2..=5).contains(&h.on(RepAxis::Hacktivist)));
        }
    }

    #[test]
    fn critical_adds_one_per_rewarded_axis() {
        let mut rng = StdRng::seed_from_u64(1);
        let g = roll_removal_reward(AgentKind::Generic, true, &mut rng);
        assert_eq!(g.on(RepAxis::Hacktivist), 2);
        assert_eq!(g.grants.len(), 1);

        let f = roll_removal_reward(AgentKind::Federal, true, &mut rng);
        assert!((2..=4).contains(&f.on(RepAxis::Crime)));
        assert!((2..=3).contains(&f.on(RepAxis::Hacktivist)));
    }

    #[test]
    fn apply_writes_ledger() {
        let mut rng = StdRng::seed_from_u64(2);
        let reward = roll_removal_reward(AgentKind::Hacktivist, false, &mut rng);
        let mut ledger = ReputationLedger::new();
        reward.apply(&mut ledger);
        for axis in RepAxis::ALL {
            assert_eq!(ledger.get(axis), reward.on(axis));
        }
        assert!(reward.summary().contains("hacktivists +"));
    }
}
