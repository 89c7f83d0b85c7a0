//! Random draws shared by target generation and scanning.
//!
//! Everything here takes the caller's generator so seeded runs replay
//! exactly.

use rand::Rng;

/// Draw from a normal distribution with the Box-Muller transform.
pub fn gauss(rng: &mut impl Rng, mean: f64, std_dev: f64) -> f64 {
    // random::<f64>() is in [0, 1); shift to (0, 1] so ln() stays finite.
    let u1 = 1.0 - rng.random::<f64>();
    let u2 = rng.random::<f64>();
    let z = (-2.0 * u1.ln()).sqrt() * (core::f64::consts::TAU * u2).cos();
    z.mul_add(std_dev, mean)
}

/// Pick up to `limit` indices by cumulative-weight roulette, without
/// replacement.
///
/// Each round draws `r` uniformly in `[0, total)` and takes the first entry
/// whose running sum reaches `r`. The chosen entry leaves the wheel before
/// the next round. Selection stops early if the remaining weight is not
/// positive.
pub fn roulette_without_replacement(
    weights: &[f64],
    limit: usize,
    rng: &mut impl Rng,
) -> Vec<usize> {
    let mut wheel: Vec<(usize, f64)> = weights.iter().copied().enumerate().collect();
    let mut chosen = Vec::with_capacity(limit.min(wheel.len()));

    while !wheel.is_empty() && chosen.len() < limit {
        let total: f64 = wheel.iter().map(|&(_, w)| w).sum();
        if total <= 0.0 {
            break;
        }
        let r = rng.random::<f64>() * total;
        let mut cumulative = 0.0;
        let mut pick = 0;
        for (slot, &(_, w)) in wheel.iter().enumerate() {
            cumulative += w;
            if r <= cumulative {
                pick = slot;
                break;
            }
        }
        if pick < wheel.len() {
            let (index, _) = wheel.remove(pick);
            chosen.push(index);
        }
    }
    chosen
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn roulette_never_repeats_and_respects_limit() {
        let mut rng = StdRng::seed_from_u64(3);
        let weights = [0.5, 0.1, 0.9, 0.3, 0.02, 0.7];
        let picks = roulette_without_replacement(&weights, 4, &mut rng);
        assert_eq!(picks.len(), 4);
        let mut sorted = picks.clone();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(sorted.len(), 4);
        assert!(picks.iter().all(|&i| i < weights.len()));
    }

    #[test]
    fn roulette_with_short_pool_returns_everything() {
        let mut rng = StdRng::seed_from_u64(9);
        let picks = roulette_without_replacement(&[0.4, 0.4], 6, &mut rng);
        assert_eq!(picks.len(), 2);
    }

    #[test]
    fn zero_weights_stop_selection() {
        let mut rng = StdRng::seed_from_u64(9);
        assert!(roulette_without_replacement(&[0.0, 0.0], 3, &mut rng).is_empty());
    }

    #[test]
    fn gauss_centres_on_mean() {
        let mut rng = StdRng::seed_from_u64(21);
        let n = 20_000;
        let sum: f64 = (0..n).map(|_| gauss(&mut rng, 5.4, 1.5)).sum();
        let mean = sum / f64::from(n);
        assert!((mean - 5.4).abs() < 0.1, "mean {mean}");
    }
}
