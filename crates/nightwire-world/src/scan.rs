//! Weighted scan sampling over the target pool.
//!
//! A scan shows a capped, weighted sample of the pool. Targets in the
//! player's region or in any unlocked region are eligible; if that leaves
//! nothing, the whole pool is used so a scan is never empty while targets
//! exist. Easier targets relative to the player's recon are likelier to show.

use nightwire_types::{RegionId, Target};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::regions::RegionRegistry;
use crate::sampling::roulette_without_replacement;
use crate::targets::TargetPool;

const fn default_limit() -> usize {
    6
}

const fn default_home_bonus() -> f64 {
    0.3
}

/// Tunables for [`scan_sample`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScanSettings {
    /// Maximum number of targets a scan returns.
    #[serde(default = "default_limit")]
    pub limit: usize,
    /// Flat weight bonus for targets in the player's current region.
    #[serde(default = "default_home_bonus")]
    pub home_bonus: f64,
}

impl Default for ScanSettings {
    fn default() -> Self {
        Self {
            limit: default_limit(),
            home_bonus: default_home_bonus(),
        }
    }
}

/// Selection weight for one target, before normalisation.
///
/// `(0.2 + recon / (security + 1) + home) * jitter`, clamped to
/// `[0.02, 0.95]`, where `jitter` is uniform in `[0.7, 1.2)`.
pub fn scan_weight(
    target: &Target,
    recon: f64,
    player_region: RegionId,
    settings: &ScanSettings,
    rng: &mut impl Rng,
) -> f64 {
    let mut base = 0.2 + recon / (f64::from(target.security) + 1.0);
    if target.region == player_region {
        base += settings.home_bonus;
    }
    (base * rng.random_range(0.7..1.2)).clamp(0.02, 0.95)
}

/// Draw a scan sample from the pool.
pub fn scan_sample(
    pool: &TargetPool,
    regions: &RegionRegistry,
    player_region: RegionId,
    recon: f64,
    settings: &ScanSettings,
    rng: &mut impl Rng,
) -> Vec<Target> {
    let mut eligible: Vec<&Target> = pool
        .targets()
        .iter()
        .filter(|t| t.region == player_region || regions.is_unlocked(t.region))
        .collect();
    if eligible.is_empty() {
        eligible = pool.targets().iter().collect();
    }

    let weights: Vec<f64> = eligible
        .iter()
        .map(|t| scan_weight(t, recon, player_region, settings, rng))
        .collect();

    roulette_without_replacement(&weights, settings.limit, rng)
        .into_iter()
        .filter_map(|i| eligible.get(i).map(|&t| t.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn pool_with(regions: &RegionRegistry, seed: u64) -> TargetPool {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut pool = TargetPool::new();
        pool.regenerate(regions, &mut rng);
        pool
    }

    #[test]
    fn sample_is_capped_and_unique() {
        let mut regions = RegionRegistry::new();
        regions.unlock_due(90);
        let pool = pool_with(&regions, 12);
        let mut rng = StdRng::seed_from_u64(13);
        let settings = ScanSettings::default();
        let picks = scan_sample(&pool, &regions, RegionId::Local, 3.0, &settings, &mut rng);
        assert_eq!(picks.len(), settings.limit);
        let mut ids: Vec<_> = picks.iter().map(|t| t.id).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), settings.limit);
    }

    #[test]
    fn home_bonus_follows_the_current_region() {
        let mut pool = TargetPool::new();
        let mut rng = StdRng::seed_from_u64(15);
        let settings = ScanSettings::default();
        let mut t = pool.make_target(RegionId::Europe, 3, &mut rng);
        t.security = 20;

        let home = scan_weight(&t, 0.0, RegionId::Europe, &settings, &mut StdRng::seed_from_u64(16));
        let away = scan_weight(&t, 0.0, RegionId::Local, &settings, &mut StdRng::seed_from_u64(16));
        // Same jitter on both: 0.5 * j against 0.2 * j.
        assert!((home - away * 2.5).abs() < 1e-9);
    }

    #[test]
    fn weights_are_clamped() {
        let mut rng = StdRng::seed_from_u64(14);
        let mut pool = TargetPool::new();
        let settings = ScanSettings::default();
        for _ in 0..200 {
            let t = pool.make_target(RegionId::Asia, 4, &mut rng);
            let w = scan_weight(&t, 500.0, RegionId::Asia, &settings, &mut rng);
            assert!((0.02..=0.95).contains(&w));
            let w = scan_weight(&t, 0.0, RegionId::Local, &settings, &mut rng);
            assert!((0.02..=0.95).contains(&w));
        }
    }

    #[test]
    fn seeded_scans_replay() {
        let regions = RegionRegistry::new();
        let pool = pool_with(&regions, 15);
        let settings = ScanSettings::default();
        let a = scan_sample(&pool, &regions, RegionId::Local, 2.0, &settings, &mut StdRng::seed_from_u64(1));
        let b = scan_sample(&pool, &regions, RegionId::Local, 2.0, &settings, &mut StdRng::seed_from_u64(1));
        assert_eq!(a, b);
    }
}
