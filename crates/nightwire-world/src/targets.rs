//! The daily target pool.
//!
//! The pool is rebuilt from scratch once per world day: every unlocked
//! region contributes `1 + difficulty` freshly rolled targets, a quarter of
//! them honeypots, and the whole pool is shuffled. Random events may also
//! push a single target to the front between rebuilds.
//!
//! Target ids come from a world-wide counter and are never reused, so a
//! recidivism record keyed by id can never collide with a later target.

use nightwire_types::{HoneypotDisguise, RegionId, Target, TargetId, floor_u32};
use rand::Rng;
use rand::seq::{IndexedRandom, SliceRandom};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::WorldError;
use crate::regions::RegionRegistry;
use crate::sampling::gauss;

/// Chance that a generated target is a honeypot.
pub const HONEYPOT_CHANCE: f64 = 0.25;

/// Highest security a generated target can roll.
pub const MAX_SECURITY: u32 = 30;

const TARGET_NAMES: [&str; 8] = [
    "University server",
    "Mid-size company",
    "Small data center",
    "Local bank",
    "Mail provider",
    "Carrier",
    "Cloud node",
    "IoT node",
];

/// Connection hints by security tier.
fn hints_for(security: u32) -> Vec<String> {
    let hints: &[&str] = if security <= 2 {
        &["port 22 open", "weak login"]
    } else if security <= 5 {
        &["active firewall", "vpn", "moderate patching"]
    } else {
        &["IDS present", "24h monitoring", "physical security"]
    };
    hints.iter().map(|&h| h.to_owned()).collect()
}

/// The current set of hackable targets plus the id counter.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TargetPool {
    targets: Vec<Target>,
    next_id: u32,
}

impl TargetPool {
    /// An empty pool whose first id will be 1.
    pub const fn new() -> Self {
        Self {
            targets: Vec::new(),
            next_id: 1,
        }
    }

    /// Reserve a fresh target id.
    pub fn allocate_id(&mut self) -> TargetId {
        let id = TargetId(self.next_id.max(1));
        self.next_id = id.0.saturating_add(1);
        id
    }

    /// Roll one target for a region of the given difficulty.
    ///
    /// Security is `round(gauss(1.8 * difficulty, 1.5))` clamped to
    /// `[1, 30]`, the reward grows with `security^1.6`, and trace speed rises
    /// 8% per security level above 1 (never below 0.4).
    pub fn make_target(&mut self, region: RegionId, difficulty: u32, rng: &mut impl Rng) -> Target {
        let id = self.allocate_id();
        let rolled = gauss(rng, 1.8 * f64::from(difficulty), 1.5).round();
        let security = floor_u32(rolled).clamp(1, MAX_SECURITY);
        let sec = f64::from(security);
        let reward = (50.0 * sec.powf(1.6) * rng.random_range(0.6..1.4)).floor();
        let trace_speed = (rng.random_range(0.5..1.5) * (sec - 1.0).mul_add(0.08, 1.0)).max(0.4);
        let base = TARGET_NAMES.choose(rng).copied().unwrap_or("Host");
        Target {
            id,
            name: format!("{base} ({region})"),
            security,
            reward,
            trace_speed,
            region,
            hints: hints_for(security),
            disguise: None,
            mission: false,
        }
    }

    /// Discard the pool and roll a new one for every unlocked region.
    pub fn regenerate(&mut self, regions: &RegionRegistry, rng: &mut impl Rng) {
        let specs: Vec<(RegionId, u32)> = regions.unlocked().map(|r| (r.id, r.difficulty)).collect();
        let mut fresh = Vec::new();
        for (region, difficulty) in specs {
            for _ in 0..difficulty.saturating_add(1) {
                let mut target = self.make_target(region, difficulty, rng);
                if rng.random_bool(HONEYPOT_CHANCE) {
                    let security = rng.random_range(1..=4);
                    let reward = (target.reward * rng.random_range(0.6..0.9)).floor();
                    target.disguise = Some(HoneypotDisguise { security, reward });
                }
                fresh.push(target);
            }
        }
        fresh.shuffle(rng);
        debug!(
            targets = fresh.len(),
            honeypots = fresh.iter().filter(|t| t.is_honeypot()).count(),
            "target pool regenerated"
        );
        self.targets = fresh;
    }

    /// Put a target at the front of the pool.
    pub fn push_front(&mut self, target: Target) {
        self.targets.insert(0, target);
    }

    /// Look up a target by id.
    pub fn get(&self, id: TargetId) -> Result<&Target, WorldError> {
        self.targets
            .iter()
            .find(|t| t.id == id)
            .ok_or(WorldError::TargetNotFound(id))
    }

    /// All targets in pool order.
    pub fn targets(&self) -> &[Target] {
        &self.targets
    }

    /// Number of targets.
    pub fn len(&self) -> usize {
        self.targets.len()
    }

    /// Whether the pool is empty.
    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    /// Number of honeypots currently in the pool.
    pub fn honeypot_count(&self) -> usize {
        self.targets.iter().filter(|t| t.is_honeypot()).count()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn pool_size_matches_unlocked_difficulty() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut regions = RegionRegistry::new();
        let mut pool = TargetPool::new();
        pool.regenerate(&regions, &mut rng);
        assert_eq!(pool.len(), 2);

        regions.unlock_due(15);
        pool.regenerate(&regions, &mut rng);
        assert_eq!(pool.len(), 2 + 3 + 4);
    }

    #[test]
    fn generated_targets_respect_bounds() {
        let mut rng = StdRng::seed_from_u64(2);
        let mut pool = TargetPool::new();
        for _ in 0..500 {
            let t = pool.make_target(RegionId::Global, 6, &mut rng);
            assert!((1..=MAX_SECURITY).contains(&t.security));
            assert!(t.trace_speed >= 0.4);
            assert!(t.reward >= 0.0);
            assert_eq!(t.hints.len(), if t.security <= 2 { 2 } else { 3 });
        }
    }

    #[test]
    fn ids_are_never_reused() {
        let mut rng = StdRng::seed_from_u64(4);
        let regions = RegionRegistry::new();
        let mut pool = TargetPool::new();
        pool.regenerate(&regions, &mut rng);
        let first: Vec<_> = pool.targets().iter().map(|t| t.id).collect();
        pool.regenerate(&regions, &mut rng);
        assert!(pool.targets().iter().all(|t| !first.contains(&t.id)));
    }

    #[test]
    fn honeypot_disguise_is_in_range() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut regions = RegionRegistry::new();
        regions.unlock_due(90);
        let mut pool = TargetPool::new();
        for _ in 0..20 {
            pool.regenerate(&regions, &mut rng);
            for t in pool.targets() {
                if let Some(d) = t.disguise {
                    assert!((1..=4).contains(&d.security));
                    assert!(d.reward <= t.reward);
                }
            }
        }
        assert!(pool.honeypot_count() <= pool.len());
    }

    #[test]
    fn push_front_and_lookup() {
        let mut rng = StdRng::seed_from_u64(6);
        let mut pool = TargetPool::new();
        let tip = pool.make_target(RegionId::Local, 3, &mut rng);
        let id = tip.id;
        pool.push_front(tip);
        assert_eq!(pool.targets().first().unwrap().id, id);
        assert!(pool.get(id).is_ok());
        assert!(matches!(pool.get(TargetId(999)), Err(WorldError::TargetNotFound(_))));
    }
}
