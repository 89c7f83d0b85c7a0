//! Daily adversary actions, one resolver per [`AgentKind`].
//!
//! [`try_action`] decides whether an agent acts today and dispatches to the
//! resolver for its kind. Resolvers only touch the player state they are
//! given and report what happened as a line of text, or `None` when the
//! chosen branch had nothing to act on.
//!
//! # Gate
//!
//! An active agent acts when a uniform draw falls below
//! `aggression + min(0.6, risk / 100)`. Blocked and compromised agents never
//! act.

use nightwire_types::{AgentKind, AgentStatus, PlayerState};
use rand::Rng;
use tracing::debug;

use crate::agent::EnemyAgent;
use crate::error::AgentError;

/// Cap on the risk contribution to the action gate.
const RISK_GATE_CAP: f64 = 0.6;

/// Multiplier from recent income lost to the cash cost of a destroyed asset.
const DESTROYED_ASSET_COST_FACTOR: f64 = 5.0;

/// Roll the action gate and run the kind resolver for one agent.
pub fn try_action(
    agent: &EnemyAgent,
    player: &mut PlayerState,
    rng: &mut impl Rng,
) -> Result<Option<String>, AgentError> {
    match agent.status {
        AgentStatus::Blocked { .. } => return Ok(None),
        AgentStatus::Compromised => return Err(AgentError::StaleCompromised(agent.id)),
        AgentStatus::Active => {}
    }
    if !agent.trace_power.is_finite() || !agent.aggression.is_finite() {
        return Err(AgentError::CorruptState {
            agent: agent.id,
            detail: format!(
                "aggression {} trace power {}",
                agent.aggression, agent.trace_power
            ),
        });
    }

    let threshold = agent.aggression + (player.risk() / 100.0).min(RISK_GATE_CAP);
    if rng.random::<f64>() >= threshold {
        return Ok(None);
    }

    let name = agent.display_name();
    let event = match agent.kind {
        AgentKind::Pirate => pirate_action(agent, &name, player, rng),
        AgentKind::Federal => federal_action(agent, &name, player, rng),
        AgentKind::Hacktivist => hacktivist_action(agent, &name, player, rng),
        AgentKind::Generic => generic_action(agent, &name, player, rng),
    };
    if let Some(text) = &event {
        debug!(agent = %agent.id, kind = %agent.kind, event = %text, "agent acted");
    }
    Ok(event)
}

fn pick_asset(player: &PlayerState, rng: &mut impl Rng) -> Option<usize> {
    if player.assets.is_empty() {
        None
    } else {
        Some(rng.random_range(0..player.assets.len()))
    }
}

/// Remove an asset and charge five times `income * U{1..=max_days}`.
fn destroy_asset(
    player: &mut PlayerState,
    index: usize,
    max_days: u32,
    rng: &mut impl Rng,
) -> Option<(String, f64)> {
    if index >= player.assets.len() {
        return None;
    }
    let asset = player.assets.remove(index);
    let loss = asset.income_per_day * f64::from(rng.random_range(1..=max_days));
    let cost = player.pay_capped(loss * DESTROYED_ASSET_COST_FACTOR);
    Some((asset.kind.to_string(), cost))
}

fn scale_asset_income(player: &mut PlayerState, index: usize, factor: f64) -> Option<String> {
    player.assets.get_mut(index).map(|asset| {
        asset.income_per_day *= factor;
        asset.kind.to_string()
    })
}

fn raise_risk(player: &mut PlayerState, amount: f64) -> f64 {
    player.adjust_risk(amount);
    amount
}

/// Pirates prey on assets: 70% of the time (when any exist) they destroy
/// one (60%) or halve its income; otherwise they make noise.
fn pirate_action(
    agent: &EnemyAgent,
    name: &str,
    player: &mut PlayerState,
    rng: &mut impl Rng,
) -> Option<String> {
    if rng.random_bool(0.7)
        && let Some(index) = pick_asset(player, rng)
    {
        if rng.random_bool(0.6) {
            return destroy_asset(player, index, 34, rng)
                .map(|(kind, cost)| format!("[{name}] Raided asset '{kind}' and exfiltrated resources. Loss: ${cost:.2}."));
        }
        return scale_asset_income(player, index, 0.5)
            .map(|kind| format!("[{name}] Cut the yield of '{kind}'."));
    }
    let inc = raise_risk(player, rng.random_range(5.0..16.0) * agent.trace_power);
    Some(format!("[{name}] Stirred up operational noise. Risk +{inc:.1}%."))
}

/// Federal units trace hard (60%), sometimes with a direct fine; otherwise
/// they degrade an asset's income.
fn federal_action(
    agent: &EnemyAgent,
    name: &str,
    player: &mut PlayerState,
    rng: &mut impl Rng,
) -> Option<String> {
    if rng.random_bool(0.6) {
        let inc = raise_risk(player, rng.random_range(10.0..28.0) * agent.trace_power);
        if rng.random_bool(0.25) {
            let fine = player.pay_capped(rng.random_range(100.0..1000.0));
            return Some(format!("[{name}] Trace operation. Risk +{inc:.1}%. Fine levied: ${fine:.2}."));
        }
        return Some(format!("[{name}] Trace operation. Risk +{inc:.1}%."));
    }
    let index = pick_asset(player, rng)?;
    scale_asset_income(player, index, 0.6)
        .map(|kind| format!("[{name}] Intervention. Yield of asset '{kind}' reduced."))
}

/// Hacktivists leak (40% of half the time, granting knowledge) or campaign;
/// otherwise they disrupt at a level-scaled intensity.
fn hacktivist_action(
    agent: &EnemyAgent,
    name: &str,
    player: &mut PlayerState,
    rng: &mut impl Rng,
) -> Option<String> {
    if rng.random_bool(0.5) {
        if rng.random_bool(0.4) {
            let gained = rng.random_range(1..=3);
            player.knowledge = player.knowledge.saturating_add(gained);
            return Some(format!("[{name}] Public leak reported. Knowledge +{gained}."));
        }
        return Some(format!("[{name}] Online pressure campaign detected."));
    }
    let scale = 0.05f64.mul_add(f64::from(agent.level), 0.6).max(1.0);
    let inc = raise_risk(player, rng.random_range(2.0..8.0) * scale);
    Some(format!("[{name}] Disruptive operation. Risk +{inc:.1}%."))
}

/// Generic agents trace half the time, attack an asset 30% of the time
/// (destroy or halve), and otherwise spread noise.
fn generic_action(
    agent: &EnemyAgent,
    name: &str,
    player: &mut PlayerState,
    rng: &mut impl Rng,
) -> Option<String> {
    let roll = rng.random::<f64>();
    if roll < 0.5 {
        let inc = raise_risk(player, rng.random_range(8.0..20.0) * agent.trace_power);
        return Some(format!("[{name}] Trace executed. Risk +{inc:.1}%."));
    }
    if roll < 0.8
        && let Some(index) = pick_asset(player, rng)
    {
        if rng.random_bool(0.5) {
            return destroy_asset(player, index, 14, rng)
                .map(|(kind, cost)| format!("[{name}] Attacked '{kind}'. Loss: ${cost:.2}."));
        }
        return scale_asset_income(player, index, 0.5)
            .map(|kind| format!("[{name}] Cut the yield of '{kind}'."));
    }
    let inc = raise_risk(player, rng.random_range(5.0..10.0) * agent.trace_power);
    Some(format!("[{name}] Spread noise (+{inc:.1}% exposure)."))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use nightwire_types::{AgentId, Asset, AssetKind, RegionId};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn player_with_assets(n: usize) -> PlayerState {
        let mut p = PlayerState::new(5_000.0, 6);
        let at = NaiveDate::from_ymd_opt(2095, 11, 1)
            .unwrap()
            .and_hms_opt(8, 0, 0)
            .unwrap();
        for _ in 0..n {
            p.assets.push(Asset {
                kind: AssetKind::Rack,
                income_per_day: 100.0,
                region: RegionId::Local,
                installed_at: at,
            });
        }
        p
    }

    fn agent(kind: AgentKind) -> EnemyAgent {
        let mut a = EnemyAgent::new(AgentId::from_random_bytes([5; 16]), 3, kind, RegionId::Local);
        a.aggression = 1.0;
        a
    }

    #[test]
    fn blocked_agent_never_acts() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut a = agent(AgentKind::Federal);
        let until = NaiveDate::from_ymd_opt(2096, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        a.block(until);
        let mut p = player_with_assets(0);
        for _ in 0..100 {
            assert!(try_action(&a, &mut p, &mut rng).unwrap().is_none());
        }
        assert!(p.risk().abs() < f64::EPSILON);
    }

    #[test]
    fn compromised_agent_is_an_error() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut a = agent(AgentKind::Generic);
        a.compromise();
        let mut p = player_with_assets(0);
        assert!(matches!(
            try_action(&a, &mut p, &mut rng),
            Err(AgentError::StaleCompromised(_))
        ));
    }

    #[test]
    fn corrupt_trace_power_is_reported() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut a = agent(AgentKind::Generic);
        a.trace_power = f64::NAN;
        let mut p = player_with_assets(0);
        assert!(matches!(
            try_action(&a, &mut p, &mut rng),
            Err(AgentError::CorruptState { .. })
        ));
    }

    #[test]
    fn every_kind_keeps_meters_in_range() {
        for kind in AgentKind::ALL {
            let mut rng = StdRng::seed_from_u64(42);
            let a = agent(kind);
            let mut p = player_with_assets(3);
            for _ in 0..300 {
                let _ = try_action(&a, &mut p, &mut rng).unwrap();
                assert!((0.0..=100.0).contains(&p.risk()));
                assert!(p.money >= 0.0);
            }
        }
    }

    #[test]
    fn pirates_eventually_hit_assets() {
        let mut rng = StdRng::seed_from_u64(7);
        let a = agent(AgentKind::Pirate);
        let mut p = player_with_assets(4);
        for _ in 0..200 {
            let _ = try_action(&a, &mut p, &mut rng).unwrap();
        }
        let untouched = p
            .assets
            .iter()
            .filter(|x| (x.income_per_day - 100.0).abs() < f64::EPSILON)
            .count();
        assert!(p.assets.len() < 4 || untouched < 4);
    }

    #[test]
    fn federal_without_assets_may_do_nothing() {
        let mut rng = StdRng::seed_from_u64(3);
        let a = agent(AgentKind::Federal);
        let mut p = player_with_assets(0);
        let mut quiet = 0;
        for _ in 0..200 {
            if try_action(&a, &mut p, &mut rng).unwrap().is_none() {
                quiet += 1;
            }
        }
        assert!(quiet > 0);
    }
}
