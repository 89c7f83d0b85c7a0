//! Tick pipeline: decay, passive income, and the daily world update.
//!
//! Every player-facing operation passes its elapsed hours through
//! [`advance`]. Meters decay linearly with the hours, the clock moves, assets
//! pay out for every calendar day crossed, and then the daily pipeline runs
//! once per crossed day boundary, in this order:
//!
//! 1. **Unlock** -- regions whose threshold day has come unlock.
//! 2. **Agents** -- every agent ages, may act, and compromised agents are
//!    removed after the pass.
//! 3. **Periodic assets** -- every 30th day, botnet worms sharpen exploit and
//!    honeypot APIs report the pool.
//! 4. **Targets** -- the pool is rebuilt from scratch.
//! 5. **Regional events** -- each asset rolls against its region's pressure.
//! 6. **Drift** -- regional pressure takes its daily random walk.
//! 7. **Spawns** -- regional and reactive spawn rolls.
//!
//! After the last day, blocks that expired during the advance are released
//! and mission availability is re-synced.

use std::collections::VecDeque;

use chrono::{Days, NaiveDateTime, NaiveTime};
use nightwire_agents::{EnemyAgentDirectory, SpawnContext, plan_daily_spawns};
use nightwire_types::{AssetKind, PlayerState, Skill, Target};
use nightwire_world::{RegionRegistry, TargetPool};
use rand::Rng;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::clock::{ClockError, WorldClock};
use crate::config::DecayConfig;
use crate::events::PendingEvent;
use crate::missions::{MissionSync, MissionUnlockGraph};

/// Oldest notices are dropped once the queue holds this many.
pub const NOTIFICATION_CAP: usize = 500;

/// Days between periodic asset effects.
const ASSET_EFFECT_PERIOD: u32 = 30;

/// Exploit granted by each botnet worm asset on a periodic day.
const BOTNET_EXPLOIT_BOOST: f64 = 10.0;

/// Chance per crossed day that maintenance is charged.
const MAINTENANCE_CHANCE_PER_DAY: f64 = 0.05;

/// Maintenance charged per crossed day.
const MAINTENANCE_COST_PER_DAY: f64 = 30.0;

/// A queued message for the host, stamped with the world day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    /// World day the notice was raised on.
    pub day: u32,
    /// Message text.
    pub text: String,
}

/// All mutable world state apart from the player.
#[derive(Debug)]
pub struct WorldState {
    /// Simulated time.
    pub clock: WorldClock,
    /// Regions and their pressure.
    pub regions: RegionRegistry,
    /// Today's target pool.
    pub targets: TargetPool,
    /// Listed adversaries.
    pub agents: EnemyAgentDirectory,
    /// Static mission table.
    pub missions: MissionUnlockGraph,
    /// Undelivered notices, oldest first.
    pub notifications: VecDeque<Notice>,
    /// Per-day log of agent actions.
    pub activity_log: Vec<String>,
    /// The most recent scan sample.
    pub last_scan: Vec<Target>,
    /// A choice event awaiting the host's answer.
    pub pending_event: Option<PendingEvent>,
}

impl WorldState {
    /// A fresh world at `start` with the first target pool rolled.
    pub fn new(start: NaiveDateTime, missions: MissionUnlockGraph, rng: &mut impl Rng) -> Self {
        let regions = RegionRegistry::new();
        let mut targets = TargetPool::new();
        targets.regenerate(&regions, rng);
        Self {
            clock: WorldClock::new(start),
            regions,
            targets,
            agents: EnemyAgentDirectory::new(),
            missions,
            notifications: VecDeque::new(),
            activity_log: Vec::new(),
            last_scan: Vec::new(),
            pending_event: None,
        }
    }

    /// Queue a notice for the host.
    pub fn notify(&mut self, text: impl Into<String>) {
        self.notifications.push_back(Notice {
            day: self.clock.day(),
            text: text.into(),
        });
        while self.notifications.len() > NOTIFICATION_CAP {
            self.notifications.pop_front();
        }
    }

    /// Queue notices for a mission availability change.
    pub fn notify_missions(&mut self, sync: &MissionSync) {
        for id in &sync.unlocked {
            self.notify(format!("Special mission available: {id}"));
        }
        for id in &sync.removed {
            self.notify(format!("Special mission withdrawn: {id}"));
        }
    }

    /// Look up a target in the last scan, then in the pool.
    pub fn find_target(&self, id: nightwire_types::TargetId) -> Option<&Target> {
        self.last_scan
            .iter()
            .find(|t| t.id == id)
            .or_else(|| self.targets.get(id).ok())
    }
}

/// What one day of the pipeline did.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DaySummary {
    /// The world day that was opened.
    pub day: u32,
    /// Agents that acted.
    pub agent_events: usize,
    /// Agents removed after the pass.
    pub removals: usize,
    /// Agents whose update failed.
    pub failures: usize,
    /// Agents spawned at the end of the day.
    pub spawned: usize,
}

/// What one call to [`advance`] did.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AdvanceSummary {
    /// Hours advanced.
    pub hours: f64,
    /// Passive income credited.
    pub income: f64,
    /// Maintenance charged.
    pub maintenance: f64,
    /// One entry per crossed day.
    pub days: Vec<DaySummary>,
}

/// Advance the world by `hours`, running the daily pipeline once per
/// crossed calendar day.
pub fn advance(
    world: &mut WorldState,
    player: &mut PlayerState,
    hours: f64,
    decay: &DecayConfig,
    rng: &mut impl Rng,
) -> Result<AdvanceSummary, ClockError> {
    let step = world.clock.advance(hours)?;

    phase_decay(world, player, hours, decay);
    let (income, maintenance) = phase_income(player, step.days_crossed, rng);

    let mut days = Vec::new();
    for offset in 1..=step.days_crossed {
        let boundary = step
            .from
            .date()
            .checked_add_days(Days::new(u64::from(offset)))
            .map_or(step.to, |d| d.and_time(NaiveTime::MIN));
        days.push(run_day(world, player, boundary, rng));
    }

    let released = world.agents.release_expired_blocks(step.to);
    if !released.is_empty() {
        debug!(count = released.len(), "blocks expired");
    }
    let sync = world.missions.sync(player);
    world.notify_missions(&sync);

    Ok(AdvanceSummary {
        hours,
        income,
        maintenance,
        days,
    })
}

fn phase_decay(world: &mut WorldState, player: &mut PlayerState, hours: f64, decay: &DecayConfig) {
    let focus_rate = if player.addicted {
        decay.focus_per_hour * 2.0
    } else {
        decay.focus_per_hour
    };
    player.adjust_focus(-focus_rate * hours);
    player.adjust_risk(-decay.risk_per_hour * hours);
    player.adjust_addiction(-decay.addiction_per_hour * hours);
    if player.addicted && player.addiction() <= 0.0 {
        player.addicted = false;
        info!("stimulant dependence cleared");
        world.notify("Your addiction is behind you. Focus decays normally again.");
    }
}

fn phase_income(player: &mut PlayerState, days: u32, rng: &mut impl Rng) -> (f64, f64) {
    if days == 0 {
        return (0.0, 0.0);
    }
    let d = f64::from(days);
    let income = player.daily_income() * d;
    if income <= 0.0 {
        return (0.0, 0.0);
    }
    player.money += income;
    let maintenance = if rng.random::<f64>() < MAINTENANCE_CHANCE_PER_DAY * d {
        player.pay_capped(MAINTENANCE_COST_PER_DAY * d)
    } else {
        0.0
    };
    (income, maintenance)
}

fn run_day(
    world: &mut WorldState,
    player: &mut PlayerState,
    now: NaiveDateTime,
    rng: &mut impl Rng,
) -> DaySummary {
    let day = world.clock.begin_day();
    let mut summary = DaySummary {
        day,
        ..DaySummary::default()
    };

    for region in world.regions.unlock_due(day) {
        world.notify(format!("{region} has been unlocked."));
    }

    phase_agents(world, player, now, rng, &mut summary);
    if day % ASSET_EFFECT_PERIOD == 0 {
        phase_periodic_assets(world, player);
    }
    world.targets.regenerate(&world.regions, rng);
    phase_regional_events(world, player, rng);
    world.regions.drift_all(rng);
    summary.spawned = phase_spawns(world, player, rng);

    debug!(
        day,
        agents = world.agents.len(),
        targets = world.targets.len(),
        "day complete"
    );
    summary
}

fn phase_agents(
    world: &mut WorldState,
    player: &mut PlayerState,
    now: NaiveDateTime,
    rng: &mut impl Rng,
    summary: &mut DaySummary,
) {
    let report = world.agents.daily_update(player, now, rng);
    let day = world.clock.day();
    for (id, text) in &report.events {
        let name = world
            .agents
            .get(*id)
            .map_or_else(|_| id.short(), |a| a.display_name());
        world.activity_log.push(format!("Day {day} - {name}: {text}"));
        world.notify(text.clone());
    }
    for removal in &report.removals {
        world.notify(removal.message.clone());
    }
    summary.agent_events = report.events.len();
    summary.removals = report.removals.len();
    summary.failures = report.failures.len();
}

fn phase_periodic_assets(world: &mut WorldState, player: &mut PlayerState) {
    let kinds: Vec<AssetKind> = player.assets.iter().map(|a| a.kind).collect();
    for kind in kinds {
        match kind {
            AssetKind::BotnetWorm => {
                player.skills.add(Skill::Exploit, BOTNET_EXPLOIT_BOOST);
                world.notify("Botnet worm delivered a temporary exploit boost.");
            }
            AssetKind::HoneypotApi => {
                let detected = world.targets.honeypot_count();
                if detected > 0 {
                    world.notify(format!("Honeypot API detected {detected} honeypots on the mesh."));
                }
            }
            AssetKind::Vpn | AssetKind::Rack | AssetKind::Datacenter => {}
        }
    }
}

fn phase_regional_events(world: &mut WorldState, player: &mut PlayerState, rng: &mut impl Rng) {
    for index in 0..player.assets.len() {
        let Some(asset) = player.assets.get(index) else {
            continue;
        };
        let (kind, region) = (asset.kind, asset.region);
        let Ok(meta) = world.regions.get(region) else {
            continue;
        };
        let pressure = meta.pressure;

        if rng.random::<f64>() < f64::from(pressure.crime) * 0.01 {
            if let Some(asset) = player.assets.get_mut(index) {
                asset.income_per_day *= 0.7;
            }
            world.notify(format!("Regional event: asset '{kind}' hit by crime in {region}."));
        }
        if rng.random::<f64>() < f64::from(pressure.state) * 0.01 {
            player.adjust_risk(3.0);
            world.notify(format!(
                "Administrative inspection in {region}: your risk rose slightly."
            ));
        }
        if rng.random::<f64>() < f64::from(pressure.hacktivist) * 0.008 {
            player.knowledge = player.knowledge.saturating_add(1);
            world.notify(format!("A collective in {region} shared intel. +1 knowledge."));
        }
    }
}

fn phase_spawns(world: &mut WorldState, player: &PlayerState, rng: &mut impl Rng) -> usize {
    let day = world.clock.day();
    let plans = plan_daily_spawns(&world.regions, &player.reputation, player.region, day, rng);
    let mut spawned: usize = 0;
    for request in plans {
        let ctx = SpawnContext {
            day,
            regions: &world.regions,
        };
        match world.agents.spawn(request, ctx, player, rng) {
            Ok(agent) => {
                let text = format!("New adversary activity detected in {}.", agent.region);
                spawned = spawned.saturating_add(1);
                world.notify(text);
            }
            Err(error) => warn!(%error, ?request, "spawn failed"),
        }
    }
    spawned
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::arithmetic_side_effects)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};
    use nightwire_types::{AgentKind, Asset, RegionId};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn start() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2095, 11, 1)
            .unwrap()
            .and_hms_opt(8, 0, 0)
            .unwrap()
    }

    fn world(rng: &mut StdRng) -> WorldState {
        WorldState::new(start(), MissionUnlockGraph::new().unwrap(), rng)
    }

    #[test]
    fn meters_stay_in_range_for_any_advance() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut w = world(&mut rng);
        let mut p = PlayerState::new(75.0, 6);
        p.addicted = true;
        p.set_addiction(3.0);
        for hours in [0.0, 0.5, 7.0, 26.0, 200.0, 1000.0] {
            advance(&mut w, &mut p, hours, &DecayConfig::default(), &mut rng).unwrap();
            for value in [p.focus(), p.risk(), p.addiction()] {
                assert!((0.0..=100.0).contains(&value));
            }
        }
        assert!(!p.addicted);
    }

    #[test]
    fn pipeline_runs_once_per_crossed_day() {
        let mut rng = StdRng::seed_from_u64(2);
        let mut w = world(&mut rng);
        let mut p = PlayerState::new(75.0, 6);
        let s = advance(&mut w, &mut p, 3.0, &DecayConfig::default(), &mut rng).unwrap();
        assert!(s.days.is_empty());
        let s = advance(&mut w, &mut p, 72.0, &DecayConfig::default(), &mut rng).unwrap();
        assert_eq!(s.days.len(), 3);
        assert_eq!(w.clock.day(), 3);
        assert_eq!(s.days.iter().map(|d| d.day).collect::<Vec<_>>(), vec![1, 2, 3]);
    }

    #[test]
    fn regions_unlock_on_schedule() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut w = world(&mut rng);
        let mut p = PlayerState::new(75.0, 6);
        advance(&mut w, &mut p, 24.0 * 6.0, &DecayConfig::default(), &mut rng).unwrap();
        assert!(!w.regions.is_unlocked(RegionId::SouthAmerica));
        advance(&mut w, &mut p, 24.0, &DecayConfig::default(), &mut rng).unwrap();
        assert!(w.regions.is_unlocked(RegionId::SouthAmerica));
        assert!(
            w.notifications
                .iter()
                .any(|n| n.text.contains("SouthAmerica") && n.day == 7)
        );
    }

    #[test]
    fn income_pays_per_crossed_day() {
        let mut rng = StdRng::seed_from_u64(4);
        let mut w = world(&mut rng);
        let mut p = PlayerState::new(0.0, 6);
        p.assets.push(Asset {
            kind: AssetKind::Datacenter,
            income_per_day: 400.0,
            region: RegionId::Local,
            installed_at: start(),
        });
        let s = advance(&mut w, &mut p, 48.0, &DecayConfig::default(), &mut rng).unwrap();
        assert!((s.income - 800.0).abs() < f64::EPSILON);
    }

    #[test]
    fn blocked_agent_released_only_at_expiry() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut w = world(&mut rng);
        let mut p = PlayerState::new(75.0, 6);
        let ctx = SpawnContext {
            day: 0,
            regions: &w.regions,
        };
        let id = w
            .agents
            .spawn_kind(Some(AgentKind::Hacktivist), Some(RegionId::Local), ctx, &p, &mut rng)
            .unwrap();
        let until = start() + Duration::hours(10);
        w.agents.get_mut(id).unwrap().block(until);

        advance(&mut w, &mut p, 9.5, &DecayConfig::default(), &mut rng).unwrap();
        assert!(!w.agents.get(id).unwrap().is_active());
        advance(&mut w, &mut p, 0.5, &DecayConfig::default(), &mut rng).unwrap();
        assert!(w.agents.get(id).unwrap().is_active());
    }

    #[test]
    fn notification_queue_is_capped() {
        let mut rng = StdRng::seed_from_u64(6);
        let mut w = world(&mut rng);
        for i in 0..(NOTIFICATION_CAP + 20) {
            w.notify(format!("n{i}"));
        }
        assert_eq!(w.notifications.len(), NOTIFICATION_CAP);
        assert_eq!(w.notifications.front().unwrap().text, "n20");
    }
}
