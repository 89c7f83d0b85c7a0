//! Everyday player actions: rest, jobs, study, travel, and provisioning.
//!
//! Each action validates first and fails without side effects, then passes
//! its elapsed hours through [`tick::advance`] before applying its own
//! effects. Host-side provisioning (items, doses, assets) stands in for the
//! shop and takes no time.

use nightwire_types::{
    Asset, AssetKind, Item, PlayerState, RegionId, RemovalReason, RepAxis, Skill, TravelMode, floor_u32,
};
use rand::Rng;
use serde::Serialize;
use tracing::info;

use crate::config::SimulationConfig;
use crate::error::{Resource, SimError};
use crate::resolver::player_hack_chance;
use crate::tick::{self, AdvanceSummary, WorldState};

/// State reputation a state contract requires.
pub const STATE_CONTRACT_MIN_STANDING: u32 = 25;

/// Base travel cost per difficulty tier.
const TRAVEL_COST_PER_TIER: f64 = 500.0;

/// Result of an action that took time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActionReport {
    /// Hours that passed.
    pub hours: f64,
    /// Player-facing summary.
    pub message: String,
    /// What the tick pipeline did while the hours passed.
    pub advance: AdvanceSummary,
}

fn pass(
    world: &mut WorldState,
    player: &mut PlayerState,
    config: &SimulationConfig,
    hours: u32,
    rng: &mut impl Rng,
) -> Result<AdvanceSummary, SimError> {
    Ok(tick::advance(world, player, f64::from(hours), &config.decay, rng)?)
}

fn require_focus(player: &PlayerState, min: f64) -> Result<(), SimError> {
    if player.focus() < min {
        return Err(SimError::insufficient(Resource::Focus, min, player.focus()));
    }
    Ok(())
}

/// Sleep 8 to 11 hours: focus `+1.8/h`, risk `-1.3/h`.
pub fn sleep(
    world: &mut WorldState,
    player: &mut PlayerState,
    config: &SimulationConfig,
    rng: &mut impl Rng,
) -> Result<ActionReport, SimError> {
    let hours: u32 = rng.random_range(8..=11);
    let advance = pass(world, player, config, hours, rng)?;
    let h = f64::from(hours);
    player.adjust_focus(1.8 * h);
    player.adjust_risk(-1.3 * h);
    Ok(ActionReport {
        hours: h,
        message: format!(
            "You slept {hours} hours. Focus {:.1}%, risk {:.1}%.",
            player.focus(),
            player.risk()
        ),
        advance,
    })
}

/// Take a legitimate day job.
pub fn work(
    world: &mut WorldState,
    player: &mut PlayerState,
    config: &SimulationConfig,
    rng: &mut impl Rng,
) -> Result<ActionReport, SimError> {
    require_focus(player, config.player.min_focus_work)?;
    let hours: u32 = rng.random_range(4..=8);
    let advance = pass(world, player, config, hours, rng)?;
    let h = f64::from(hours);
    let pay = f64::from(rng.random_range(60..=120));
    player.money += pay;
    player.adjust_focus(-6.0 * h);
    let standing: i64 = rng.random_range(1..=3);
    player.reputation.adjust(RepAxis::State, standing);
    player.reputation.adjust(RepAxis::Crime, -1);
    Ok(ActionReport {
        hours: h,
        message: format!("You worked {hours} hours and earned ${pay:.2}. State +{standing}, crime -1."),
        advance,
    })
}

/// A classified contract for the state, open once state standing is high.
pub fn state_contract(
    world: &mut WorldState,
    player: &mut PlayerState,
    config: &SimulationConfig,
    rng: &mut impl Rng,
) -> Result<ActionReport, SimError> {
    let standing = player.reputation.get(RepAxis::State);
    if standing < STATE_CONTRACT_MIN_STANDING {
        return Err(SimError::precondition(format!(
            "state contracts need state standing {STATE_CONTRACT_MIN_STANDING}, you have {standing}"
        )));
    }
    let hours: u32 = rng.random_range(4..=8);
    let advance = pass(world, player, config, hours, rng)?;

    let security = (standing / 4).saturating_add(7);
    let reward = 400.0f64.mul_add(f64::from(standing), 1000.0);
    let chance = player_hack_chance(player, security, &world.agents.active_levels());
    let message = if rng.random::<f64>() < chance {
        player.money += reward;
        player.skills.add(Skill::Recon, 1.5);
        player.skills.add(Skill::Exploit, 1.5);
        player.adjust_focus(4.0);
        player.reputation.adjust(RepAxis::State, 2);
        player.reputation.adjust(RepAxis::Crime, 1);
        info!(reward, "state contract delivered");
        format!("Success! The state paid ${reward:.2}. Surveillance thanks you for your cooperation.")
    } else {
        let increase = f64::from(security) * rng.random_range(0.8..1.8);
        player.adjust_risk(increase);
        format!("Failure. The internal firewalls flagged you. Risk +{increase:.1}%.")
    };
    Ok(ActionReport {
        hours: f64::from(hours),
        message,
        advance,
    })
}

/// Study for `hours`, turning time into knowledge.
pub fn study(
    world: &mut WorldState,
    player: &mut PlayerState,
    config: &SimulationConfig,
    hours: u32,
    rng: &mut impl Rng,
) -> Result<ActionReport, SimError> {
    if hours == 0 {
        return Err(SimError::invalid("study needs at least one hour"));
    }
    require_focus(player, config.player.min_focus_study)?;
    let advance = pass(world, player, config, hours, rng)?;
    let h = f64::from(hours);
    let skills = player.skills;
    let efficiency = (0.1 - (skills.recon + skills.exploit) / 2.0).mul_add(0.2, 1.0);
    let gained = floor_u32(h * efficiency).max(1);
    player.knowledge = player.knowledge.saturating_add(gained);
    player.adjust_focus(-6.0 * h);
    Ok(ActionReport {
        hours: h,
        message: format!("You studied {hours} hours. +{gained} knowledge."),
        advance,
    })
}

/// Spend knowledge on a skill: `+0.3` per point.
pub fn train(player: &mut PlayerState, skill: Skill, points: u32) -> Result<String, SimError> {
    if points == 0 {
        return Err(SimError::invalid("training needs at least one point"));
    }
    if player.knowledge < points {
        return Err(SimError::insufficient(
            Resource::Knowledge,
            f64::from(points),
            f64::from(player.knowledge),
        ));
    }
    player.knowledge = player.knowledge.saturating_sub(points);
    player.skills.add(skill, 0.3 * f64::from(points));
    Ok(format!(
        "Trained {skill}: now {:.2}. {} knowledge left.",
        player.skills.get(skill),
        player.knowledge
    ))
}

/// Cost, hours, and risk drop of a trip.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TravelPlan {
    /// Ticket price.
    pub cost: f64,
    /// Hours in transit.
    pub hours: u32,
    /// Risk shed on arrival.
    pub risk_drop: f64,
}

/// Plan a trip from a region of difficulty `from` to one of difficulty `to`.
pub fn plan_travel(from: u32, to: u32, mode: TravelMode) -> TravelPlan {
    let d = f64::from(to);
    let base_hours = to.saturating_mul(4).saturating_add(12);
    match mode {
        TravelMode::Normal => TravelPlan {
            cost: TRAVEL_COST_PER_TIER * d,
            hours: base_hours,
            risk_drop: (f64::from(to.abs_diff(from)) * 2.8).max(1.0),
        },
        TravelMode::Clandestine => TravelPlan {
            cost: (TRAVEL_COST_PER_TIER * d * 6.5).floor(),
            hours: floor_u32(f64::from(base_hours) * 1.6),
            risk_drop: 4.0f64.mul_add(d, 42.0),
        },
    }
}

/// Travel to another unlocked region.
///
/// Clandestine travel shakes off every tracking agent (no reward) and
/// invalidates the last scan.
pub fn travel(
    world: &mut WorldState,
    player: &mut PlayerState,
    config: &SimulationConfig,
    region: RegionId,
    mode: TravelMode,
    rng: &mut impl Rng,
) -> Result<ActionReport, SimError> {
    if region == player.region {
        return Err(SimError::precondition(format!("you are already in {region}")));
    }
    let to = world.regions.require_unlocked(region)?.difficulty;
    let from = world.regions.difficulty(player.region);
    let plan = plan_travel(from, to, mode);
    if !player.can_afford(plan.cost) {
        return Err(SimError::insufficient(Resource::Money, plan.cost, player.money));
    }

    player.money -= plan.cost;
    let advance = pass(world, player, config, plan.hours, rng)?;
    player.region = region;
    player.adjust_risk(-plan.risk_drop);

    let mut message = format!(
        "You travelled to {region} in {} hours for ${:.2}. Risk -{:.1}%.",
        plan.hours, plan.cost, plan.risk_drop
    );
    if mode == TravelMode::Clandestine {
        player.skills.add(Skill::Stealth, 2.0);
        if rng.random_bool(0.25) {
            player.reputation.adjust(RepAxis::Crime, 1);
        }
        let now = world.clock.now();
        let dropped = world.agents.remove_all(RemovalReason::LostTrack, player, now, rng);
        for removal in &dropped {
            world.notify(removal.message.clone());
        }
        world.last_scan.clear();
        message.push_str(&format!(" {} trackers lost your trail.", dropped.len()));
    }
    info!(%region, ?mode, "player travelled");
    Ok(ActionReport {
        hours: f64::from(plan.hours),
        message,
        advance,
    })
}

/// Swallow `doses` stimulant doses.
pub fn take_stimulant(player: &mut PlayerState, doses: u32, rng: &mut impl Rng) -> Result<String, SimError> {
    if doses == 0 {
        return Err(SimError::invalid("dose count must be positive"));
    }
    if player.stimulant_doses < doses {
        return Err(SimError::insufficient(
            Resource::StimulantDoses,
            f64::from(doses),
            f64::from(player.stimulant_doses),
        ));
    }
    player.stimulant_doses = player.stimulant_doses.saturating_sub(doses);
    let q = f64::from(doses);
    let boost = 12.5 * q;
    player.adjust_focus(boost);
    player.adjust_addiction(q * rng.random_range(6.0..16.0));
    let mut message = format!("You took {doses} dose(s). Focus +{boost:.1}%.");
    if !player.addicted && rng.random::<f64>() < player.addiction() / 140.0 {
        player.addicted = true;
        player.set_addiction(100.0);
        info!("stimulant dependence set in");
        message.push_str(" You are now addicted: focus decays twice as fast.");
    }
    Ok(message)
}

/// Put an item in the inventory.
pub fn grant_item(player: &mut PlayerState, item: Item) -> Result<(), SimError> {
    if player.has_item(item) {
        return Err(SimError::precondition(format!("{item} is already held")));
    }
    if player.inventory.len() >= player.inventory_limit {
        return Err(SimError::insufficient(Resource::InventorySpace, 1.0, 0.0));
    }
    player.inventory.push(item);
    Ok(())
}

/// Add stimulant doses.
pub const fn grant_stimulant_doses(player: &mut PlayerState, doses: u32) {
    player.stimulant_doses = player.stimulant_doses.saturating_add(doses);
}

/// Install an asset in an unlocked region at its base income.
pub fn install_asset(world: &WorldState, player: &mut PlayerState, kind: AssetKind, region: RegionId) -> Result<(), SimError> {
    world.regions.require_unlocked(region)?;
    player.assets.push(Asset {
        kind,
        income_per_day: kind.base_income(),
        region,
        installed_at: world.clock.now(),
    });
    info!(%kind, %region, "asset installed");
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::arithmetic_side_effects)]
mod tests {
    use super::*;
    use crate::missions::MissionUnlockGraph;
    use chrono::NaiveDate;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn setup(seed: u64) -> (WorldState, PlayerState, SimulationConfig, StdRng) {
        let mut rng = StdRng::seed_from_u64(seed);
        let start = NaiveDate::from_ymd_opt(2095, 11, 1)
            .unwrap()
            .and_hms_opt(8, 0, 0)
            .unwrap();
        let world = WorldState::new(start, MissionUnlockGraph::new().unwrap(), &mut rng);
        (world, PlayerState::new(75.0, 6), SimulationConfig::default(), rng)
    }

    #[test]
    fn sleep_restores_focus() {
        let (mut w, mut p, cfg, mut rng) = setup(1);
        p.adjust_focus(-60.0);
        let report = sleep(&mut w, &mut p, &cfg, &mut rng).unwrap();
        assert!((8.0..=11.0).contains(&report.hours));
        assert!(p.focus() > 40.0);
    }

    #[test]
    fn study_ignores_item_buffs() {
        let (mut w, mut p, cfg, mut rng) = setup(9);
        let (mut w2, mut p2, _, mut rng2) = setup(9);
        grant_item(&mut p2, Item::Raspberry).unwrap();

        study(&mut w, &mut p, &cfg, 10, &mut rng).unwrap();
        study(&mut w2, &mut p2, &cfg, 10, &mut rng2).unwrap();

        let skills = PlayerState::new(75.0, 6).skills;
        let efficiency = (0.1 - (skills.recon + skills.exploit) / 2.0).mul_add(0.2, 1.0);
        let expected = floor_u32(10.0 * efficiency).max(1);
        assert_eq!(p.knowledge, expected);
        assert_eq!(p2.knowledge, expected);
    }

    #[test]
    fn work_rejects_when_exhausted() {
        let (mut w, mut p, cfg, mut rng) = setup(2);
        p.adjust_focus(-90.0);
        let before = w.clock.now();
        let err = work(&mut w, &mut p, &cfg, &mut rng).unwrap_err();
        assert!(matches!(
            err,
            SimError::InsufficientResource {
                resource: Resource::Focus,
                ..
            }
        ));
        assert_eq!(w.clock.now(), before);
    }

    #[test]
    fn state_contract_needs_standing() {
        let (mut w, mut p, cfg, mut rng) = setup(3);
        assert!(matches!(
            state_contract(&mut w, &mut p, &cfg, &mut rng),
            Err(SimError::PreconditionNotMet { .. })
        ));
    }

    #[test]
    fn train_spends_knowledge() {
        let mut p = PlayerState::new(0.0, 6);
        p.knowledge = 10;
        train(&mut p, Skill::Stealth, 4).unwrap();
        assert_eq!(p.knowledge, 6);
        assert!((p.skills.stealth - 2.2).abs() < 1e-9);
        assert!(train(&mut p, Skill::Stealth, 7).is_err());
        assert!(train(&mut p, Skill::Stealth, 0).is_err());
    }

    #[test]
    fn travel_plans_match_tiers() {
        let normal = plan_travel(1, 3, TravelMode::Normal);
        assert!((normal.cost - 1500.0).abs() < f64::EPSILON);
        assert_eq!(normal.hours, 24);
        assert!((normal.risk_drop - 5.6).abs() < 1e-9);
        let sneaky = plan_travel(1, 3, TravelMode::Clandestine);
        assert!((sneaky.cost - 9750.0).abs() < f64::EPSILON);
        assert_eq!(sneaky.hours, 38);
        assert!((sneaky.risk_drop - 54.0).abs() < 1e-9);
    }

    #[test]
    fn travel_checks_money_before_time() {
        let (mut w, mut p, cfg, mut rng) = setup(4);
        w.regions.unlock_due(7);
        let before = w.clock.now();
        let err = travel(&mut w, &mut p, &cfg, RegionId::SouthAmerica, TravelMode::Normal, &mut rng).unwrap_err();
        assert!(matches!(err, SimError::InsufficientResource { .. }));
        assert_eq!(w.clock.now(), before);
        assert_eq!(p.region, RegionId::Local);
    }

    #[test]
    fn locked_region_is_a_precondition() {
        let (mut w, mut p, cfg, mut rng) = setup(5);
        p.money = 100_000.0;
        assert!(matches!(
            travel(&mut w, &mut p, &cfg, RegionId::Asia, TravelMode::Normal, &mut rng),
            Err(SimError::PreconditionNotMet { .. })
        ));
    }

    #[test]
    fn stimulant_requires_doses() {
        let mut rng = StdRng::seed_from_u64(6);
        let mut p = PlayerState::new(0.0, 6);
        assert!(take_stimulant(&mut p, 1, &mut rng).is_err());
        grant_stimulant_doses(&mut p, 4);
        p.adjust_focus(-50.0);
        take_stimulant(&mut p, 2, &mut rng).unwrap();
        assert_eq!(p.stimulant_doses, 2);
        assert!((p.focus() - 75.0).abs() < 1e-9);
        assert!(p.addiction() > 0.0);
    }

    #[test]
    fn inventory_is_bounded() {
        let mut p = PlayerState::new(0.0, 2);
        grant_item(&mut p, Item::Raspberry).unwrap();
        assert!(grant_item(&mut p, Item::Raspberry).is_err());
        grant_item(&mut p, Item::ProxyPack).unwrap();
        assert!(matches!(
            grant_item(&mut p, Item::CrawlerPack),
            Err(SimError::InsufficientResource {
                resource: Resource::InventorySpace,
                ..
            })
        ));
    }
}
