//! The simulation facade: one player, one world, one random source.
//!
//! [`Simulation`] is what a host (the engine binary, a CLI, a test) drives.
//! Every operation validates before mutating, passes its elapsed hours
//! through the tick pipeline, resolves, re-syncs mission availability, and
//! reports. Operations after a terminal incarceration fail with
//! [`SimError::RunEnded`].

use chrono::NaiveDateTime;
use nightwire_agents::{AgentError, EnemyAgent};
use nightwire_types::{
    AgentId, AgentKind, AgentStatus, Asset, AssetKind, Item, PlayerState, RegionId, RemovalReason,
    ReputationLedger, Skill, Skills, Target, TargetId, TraceSubject, TravelMode,
};
use nightwire_world::{region_news, scan_sample};
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::Serialize;
use tracing::{debug, info};

use crate::actions::{self, ActionReport};
use crate::config::SimulationConfig;
use crate::error::{Resource, SimError};
use crate::events::{self, EventChoice, PendingEvent};
use crate::missions::MissionUnlockGraph;
use crate::resolver::{
    AgentVerdict, HackContext, HackOutcome, agent_hack_hours, hack_hours, operation_cost,
    resolve_agent_hack, resolve_hack,
};
use crate::tick::{self, AdvanceSummary, Notice, WorldState};

/// Hours a scan takes.
const SCAN_HOURS: f64 = 1.0;
/// Risk a scan adds.
const SCAN_RISK: f64 = 0.6;
/// Hours a connect probe takes.
const CONNECT_HOURS: f64 = 0.5;
/// Hours spent hiding a threatened asset.
const HIDE_HOURS: f64 = 6.0;

/// Outcome of a mutating operation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OperationReport {
    /// Whether the operation's roll (if any) succeeded.
    pub success: bool,
    /// Player-facing text.
    pub message: String,
    /// Simulated hours the operation took.
    pub hours: f64,
    /// The player was incarcerated and the run is over.
    pub terminal: bool,
    /// A random world event that fired afterwards.
    pub event: Option<String>,
}

/// One adversary as a scan lists it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AgentSighting {
    /// `ai:<uid>` handle, always accepted by [`Simulation::attempt_hack_agent`].
    pub handle: String,
    /// Player-visible fingerprint.
    pub fingerprint: String,
    /// Current level.
    pub level: u32,
    /// Lifecycle status.
    pub status: AgentStatus,
    /// Whole hours until a block lifts.
    pub block_hours_remaining: Option<i64>,
    /// Operating region.
    pub region: RegionId,
}

impl AgentSighting {
    fn of(agent: &EnemyAgent, now: NaiveDateTime) -> Self {
        Self {
            handle: format!("ai:{}", agent.short_uid),
            fingerprint: agent.visible_fingerprint().to_owned(),
            level: agent.level,
            status: agent.status,
            block_hours_remaining: agent.block_hours_remaining(now),
            region: agent.region,
        }
    }
}

/// Result of a scan.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScanReport {
    /// Sampled targets in draw order.
    pub targets: Vec<Target>,
    /// Every listed agent.
    pub sightings: Vec<AgentSighting>,
    /// Fingerprints resolved by this scan.
    pub resolved: Vec<String>,
    /// A random world event that fired afterwards.
    pub event: Option<String>,
}

/// What a connect probe shows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Probe {
    /// Probed target.
    pub target: TargetId,
    /// Host name.
    pub name: String,
    /// Region.
    pub region: RegionId,
    /// Service banners.
    pub hints: Vec<String>,
    /// Security as it appears; the fake value on a honeypot.
    pub apparent_security: u32,
    /// Anomalous behaviour gave the honeypot away.
    pub honeypot_warning: bool,
    /// A random world event that fired afterwards.
    pub event: Option<String>,
}

/// An available mission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MissionListing {
    /// Mission id.
    pub id: String,
    /// Display title.
    pub title: String,
}

/// Read-only snapshot of the player.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusReport {
    /// Simulated time.
    pub time: NaiveDateTime,
    /// World day.
    pub day: u32,
    /// Current region.
    pub region: RegionId,
    /// Cash on hand.
    pub money: f64,
    /// Base skills.
    pub skills: Skills,
    /// Skills with item buffs applied.
    pub effective_skills: Skills,
    /// Focus meter.
    pub focus: f64,
    /// Risk meter.
    pub risk: f64,
    /// Unspent knowledge.
    pub knowledge: u32,
    /// Reputation axes.
    pub reputation: ReputationLedger,
    /// Addiction meter.
    pub addiction: f64,
    /// Addicted flag.
    pub addicted: bool,
    /// Held stimulant doses.
    pub stimulant_doses: u32,
    /// Held items.
    pub inventory: Vec<Item>,
    /// Installed assets.
    pub assets: Vec<Asset>,
    /// Listed adversaries.
    pub agent_count: usize,
    /// Release time while incarcerated.
    pub jailed_until: Option<NaiveDateTime>,
    /// Prompt of the event awaiting an answer.
    pub pending_event: Option<String>,
    /// The run is over.
    pub run_ended: bool,
}

impl StatusReport {
    /// Serialize the report as JSON.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// A single-player Nightwire run.
#[derive(Debug)]
pub struct Simulation {
    config: SimulationConfig,
    world: WorldState,
    player: PlayerState,
    rng: StdRng,
    ended: bool,
}

impl Simulation {
    /// Start a run. Seeds the random source from `config.world.seed`, or
    /// from OS entropy when unset.
    pub fn new(config: SimulationConfig) -> Result<Self, SimError> {
        let rng = config
            .world
            .seed
            .map_or_else(StdRng::from_os_rng, StdRng::seed_from_u64);
        Self::with_rng(config, rng)
    }

    /// Start a run with an explicit random source.
    pub fn with_rng(config: SimulationConfig, mut rng: StdRng) -> Result<Self, SimError> {
        config.validate()?;
        let missions = MissionUnlockGraph::new()?;
        let mut world = WorldState::new(config.world.start, missions, &mut rng);
        let mut player = PlayerState::new(config.player.starting_money, config.player.inventory_limit);
        let sync = world.missions.sync(&mut player);
        world.notify_missions(&sync);
        info!(start = %config.world.start, seed = ?config.world.seed, "simulation started");
        Ok(Self {
            config,
            world,
            player,
            rng,
            ended: false,
        })
    }

    /// The active configuration.
    pub const fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// The player.
    pub const fn player(&self) -> &PlayerState {
        &self.player
    }

    /// Mutable player access for hosts that stage scenarios.
    pub const fn player_mut(&mut self) -> &mut PlayerState {
        &mut self.player
    }

    /// The world.
    pub const fn world(&self) -> &WorldState {
        &self.world
    }

    /// Mutable world access for hosts that stage scenarios.
    pub const fn world_mut(&mut self) -> &mut WorldState {
        &mut self.world
    }

    /// Whether the run has ended.
    pub const fn is_ended(&self) -> bool {
        self.ended
    }

    /// The event awaiting an answer, if any.
    pub const fn pending_event(&self) -> Option<&PendingEvent> {
        self.world.pending_event.as_ref()
    }

    // -------------------------------------------------------------------
    // Guards and plumbing
    // -------------------------------------------------------------------

    const fn ensure_running(&self) -> Result<(), SimError> {
        if self.ended {
            return Err(SimError::RunEnded);
        }
        Ok(())
    }

    fn ensure_free(&self) -> Result<(), SimError> {
        self.ensure_running()?;
        if let Some(until) = self.player.jailed_until
            && self.player.is_jailed(self.world.clock.now())
        {
            return Err(SimError::precondition(format!("you are in jail until {until}")));
        }
        Ok(())
    }

    fn pass(&mut self, hours: f64) -> Result<AdvanceSummary, SimError> {
        Ok(tick::advance(
            &mut self.world,
            &mut self.player,
            hours,
            &self.config.decay,
            &mut self.rng,
        )?)
    }

    /// Re-sync missions, check for a terminal jail, and optionally roll a
    /// random event.
    fn finish(&mut self, success: bool, message: String, hours: f64, roll_event: bool) -> OperationReport {
        let sync = self.world.missions.sync(&mut self.player);
        self.world.notify_missions(&sync);

        let terminal = self.config.world.jail_ends_run && self.player.is_jailed(self.world.clock.now());
        if terminal {
            self.ended = true;
            info!(until = ?self.player.jailed_until, "run ended in jail");
        }
        let event = if roll_event && !terminal {
            events::roll_random_event(&mut self.world, &self.player, &mut self.rng)
        } else {
            None
        };
        OperationReport {
            success,
            message,
            hours,
            terminal,
            event,
        }
    }

    fn finish_action(&mut self, report: ActionReport, roll_event: bool) -> OperationReport {
        self.finish(true, report.message, report.hours, roll_event)
    }

    /// Check cash, pass the hack's hours, and resolve it.
    fn hack(&mut self, target: &Target, subject: TraceSubject) -> Result<(HackOutcome, u32), SimError> {
        let cost = operation_cost(target.security);
        if !self.player.can_afford(cost) {
            return Err(SimError::insufficient(Resource::Money, cost, self.player.money));
        }
        let hours = hack_hours(target.security);
        self.pass(f64::from(hours))?;
        let levels = self.world.agents.active_levels();
        let ctx = HackContext {
            active_levels: &levels,
            now: self.world.clock.now(),
        };
        let outcome = resolve_hack(&mut self.player, target, subject, ctx, &mut self.rng);
        Ok((outcome, hours))
    }

    // -------------------------------------------------------------------
    // Intrusion
    // -------------------------------------------------------------------

    /// Scan the network: one hour, a little risk, a weighted target sample
    /// and a listing of every agent.
    pub fn scan(&mut self) -> Result<ScanReport, SimError> {
        self.ensure_free()?;
        self.pass(SCAN_HOURS)?;
        self.player.adjust_risk(SCAN_RISK);

        let recon = self.player.effective_skills().recon;
        let targets = scan_sample(
            &self.world.targets,
            &self.world.regions,
            self.player.region,
            recon,
            &self.config.scan,
            &mut self.rng,
        );
        let now = self.world.clock.now();
        let resolved = self.world.agents.recon_sweep(&mut self.player, now, &mut self.rng);
        let sightings = self
            .world
            .agents
            .agents()
            .iter()
            .map(|a| AgentSighting::of(a, now))
            .collect();
        self.world.last_scan.clone_from(&targets);
        debug!(targets = targets.len(), resolved = resolved.len(), "scan complete");

        let report = self.finish(true, String::new(), SCAN_HOURS, true);
        Ok(ScanReport {
            targets,
            sightings,
            resolved,
            event: report.event,
        })
    }

    /// Probe a target for half an hour.
    pub fn connect(&mut self, id: TargetId) -> Result<Probe, SimError> {
        self.ensure_free()?;
        let target = self
            .world
            .find_target(id)
            .cloned()
            .ok_or_else(|| SimError::invalid(format!("unknown target {id}")))?;
        self.pass(CONNECT_HOURS)?;
        let report = self.finish(true, String::new(), CONNECT_HOURS, true);
        Ok(Probe {
            target: target.id,
            apparent_security: target.apparent_security(),
            honeypot_warning: target.is_honeypot(),
            name: target.name,
            region: target.region,
            hints: target.hints,
            event: report.event,
        })
    }

    /// Hack a target from the last scan or the pool.
    pub fn attempt_hack(&mut self, id: TargetId) -> Result<OperationReport, SimError> {
        self.ensure_free()?;
        let target = self
            .world
            .find_target(id)
            .cloned()
            .ok_or_else(|| SimError::invalid(format!("unknown target {id}; run a scan first")))?;
        let (outcome, hours) = self.hack(&target, TraceSubject::Target(target.id))?;
        Ok(self.finish(outcome.success, outcome.message, f64::from(hours), true))
    }

    /// Hack an agent by `fp:<hex>`, `ai:<uid>`, or bare fingerprint.
    pub fn attempt_hack_agent(&mut self, identifier: &str) -> Result<OperationReport, SimError> {
        self.ensure_free()?;
        let id = self.world.agents.find_by_identifier(identifier)?;
        let level = {
            let agent = self.world.agents.get(id)?;
            if !agent.is_active() {
                return Err(AgentError::AgentBlocked { agent: id }.into());
            }
            agent.level
        };

        let hours = agent_hack_hours(level);
        self.pass(f64::from(hours))?;
        let Ok(agent) = self.world.agents.get(id).cloned() else {
            let message = "The agent dropped off the network before the attack landed.".to_owned();
            return Ok(self.finish(false, message, f64::from(hours), true));
        };

        let levels = self.world.agents.active_levels();
        let now = self.world.clock.now();
        let ctx = HackContext {
            active_levels: &levels,
            now,
        };
        let outcome = resolve_agent_hack(&mut self.player, &agent, ctx, &mut self.rng);
        let mut message = outcome.message;
        match outcome.verdict {
            Some(AgentVerdict::Critical | AgentVerdict::Neutralized) => {
                let reason = if outcome.verdict == Some(AgentVerdict::Critical) {
                    RemovalReason::CriticallyCompromised
                } else {
                    RemovalReason::Compromised
                };
                let removal = self
                    .world
                    .agents
                    .remove(id, reason, &mut self.player, now, &mut self.rng)?;
                message.push(' ');
                message.push_str(&removal.message);
            }
            Some(AgentVerdict::Blocked { until, .. }) => {
                self.world.agents.get_mut(id)?.block(until);
                info!(agent = %id, %until, "agent blocked");
            }
            None => {}
        }
        Ok(self.finish(outcome.success, message, f64::from(hours), true))
    }

    /// Attempt an available story mission.
    pub fn attempt_mission(&mut self, id: &str) -> Result<OperationReport, SimError> {
        self.ensure_free()?;
        let sync = self.world.missions.sync(&mut self.player);
        self.world.notify_missions(&sync);

        let node = *self
            .world
            .missions
            .get(id)
            .ok_or_else(|| SimError::invalid(format!("unknown mission {id}")))?;
        if !self.player.missions_available.contains(id) {
            return Err(SimError::precondition(format!("mission {id} is not available")));
        }
        let payload = node.payload;
        let stand_in = Target {
            id: self.world.targets.allocate_id(),
            name: payload.title.to_owned(),
            security: payload.base_security,
            reward: payload.money,
            trace_speed: payload.trace_speed,
            region: self.player.region,
            hints: Vec::new(),
            disguise: None,
            mission: true,
        };

        let (outcome, hack_hrs) = self.hack(&stand_in, TraceSubject::Mission(id.to_owned()))?;
        let mut hours = f64::from(hack_hrs);
        let remaining = payload.hours.saturating_sub(hack_hrs);
        if remaining > 0 && !outcome.jailed() {
            self.pass(f64::from(remaining))?;
            hours += f64::from(remaining);
        }

        let mut message = outcome.message;
        if outcome.success {
            if !MissionUnlockGraph::settle(&mut self.player, &node) {
                return Err(SimError::precondition(format!(
                    "mission {id} was withdrawn before it could be completed"
                )));
            }
            message.push_str(&format!(" Mission complete: {}. +${:.2}.", payload.title, payload.money));
            if let Some(next) = node.next {
                message.push_str(&format!(" Next mission: {next}."));
            }
        } else {
            self.player.adjust_focus(payload.focus);
            message.push_str(&format!(" Mission failed: {}.", payload.title));
        }
        Ok(self.finish(outcome.success, message, hours, false))
    }

    /// Answer the pending event.
    pub fn resolve_event(&mut self, choice: EventChoice) -> Result<OperationReport, SimError> {
        self.ensure_free()?;
        let pending = self
            .world
            .pending_event
            .ok_or_else(|| SimError::precondition("no event is waiting for an answer"))?;
        if !pending.choices().contains(&choice) {
            return Err(SimError::invalid(format!("'{choice}' does not answer: {}", pending.prompt())));
        }

        let report = match (pending, choice) {
            (PendingEvent::ClientOffer { pay, difficulty }, EventChoice::Accept) => {
                let target = events::contract_target(
                    &mut self.world.targets,
                    self.player.region,
                    pay,
                    difficulty,
                    &mut self.rng,
                );
                let (outcome, hours) = self.hack(&target, TraceSubject::Target(target.id))?;
                self.world.pending_event = None;
                self.finish(outcome.success, outcome.message, f64::from(hours), false)
            }
            (PendingEvent::AssetSeizure { asset }, EventChoice::Hide) => {
                self.world.pending_event = None;
                self.pass(HIDE_HOURS)?;
                let text = events::hide_asset(&mut self.player, &asset, &mut self.rng);
                self.finish(true, text, HIDE_HOURS, false)
            }
            (PendingEvent::AssetSeizure { asset }, _) => {
                self.world.pending_event = None;
                let text = events::surrender_asset(&mut self.player, &asset);
                self.finish(true, text, 0.0, false)
            }
            (PendingEvent::StateCheck, choice) => {
                self.world.pending_event = None;
                let now = self.world.clock.now();
                let outcome = events::resolve_state_check(
                    &mut self.player,
                    choice == EventChoice::Bribe,
                    now,
                    &mut self.rng,
                );
                self.finish(outcome.jailed_until.is_none(), outcome.text, 0.0, false)
            }
            (PendingEvent::ClientOffer { .. }, _) => {
                self.world.pending_event = None;
                self.finish(true, "You turned the client down.".to_owned(), 0.0, false)
            }
        };
        Ok(report)
    }

    // -------------------------------------------------------------------
    // Everyday actions
    // -------------------------------------------------------------------

    /// Sleep. Allowed in jail.
    pub fn sleep(&mut self) -> Result<OperationReport, SimError> {
        self.ensure_running()?;
        let report = actions::sleep(&mut self.world, &mut self.player, &self.config, &mut self.rng)?;
        Ok(self.finish_action(report, true))
    }

    /// Work a day job.
    pub fn work(&mut self) -> Result<OperationReport, SimError> {
        self.ensure_free()?;
        let report = actions::work(&mut self.world, &mut self.player, &self.config, &mut self.rng)?;
        Ok(self.finish_action(report, false))
    }

    /// Take a state contract.
    pub fn state_contract(&mut self) -> Result<OperationReport, SimError> {
        self.ensure_free()?;
        let report = actions::state_contract(&mut self.world, &mut self.player, &self.config, &mut self.rng)?;
        Ok(self.finish_action(report, false))
    }

    /// Study for `hours`.
    pub fn study(&mut self, hours: u32) -> Result<OperationReport, SimError> {
        self.ensure_free()?;
        let report = actions::study(&mut self.world, &mut self.player, &self.config, hours, &mut self.rng)?;
        Ok(self.finish_action(report, false))
    }

    /// Spend knowledge on a skill.
    pub fn train(&mut self, skill: Skill, points: u32) -> Result<OperationReport, SimError> {
        self.ensure_running()?;
        let message = actions::train(&mut self.player, skill, points)?;
        Ok(self.finish(true, message, 0.0, false))
    }

    /// Travel to another region.
    pub fn travel(&mut self, region: RegionId, mode: TravelMode) -> Result<OperationReport, SimError> {
        self.ensure_free()?;
        let report = actions::travel(
            &mut self.world,
            &mut self.player,
            &self.config,
            region,
            mode,
            &mut self.rng,
        )?;
        Ok(self.finish_action(report, false))
    }

    /// Take stimulant doses.
    pub fn take_stimulant(&mut self, doses: u32) -> Result<OperationReport, SimError> {
        self.ensure_running()?;
        let was_addicted = self.player.addicted;
        let message = actions::take_stimulant(&mut self.player, doses, &mut self.rng)?;
        if self.player.addicted && !was_addicted {
            self.world.notify("Stimulant dependence: focus now decays twice as fast.");
        }
        Ok(self.finish(true, message, 0.0, false))
    }

    /// Give the player an item.
    pub fn grant_item(&mut self, item: Item) -> Result<(), SimError> {
        self.ensure_running()?;
        actions::grant_item(&mut self.player, item)
    }

    /// Give the player stimulant doses.
    pub fn grant_stimulant_doses(&mut self, doses: u32) -> Result<(), SimError> {
        self.ensure_running()?;
        actions::grant_stimulant_doses(&mut self.player, doses);
        Ok(())
    }

    /// Install an asset in an unlocked region.
    pub fn install_asset(&mut self, kind: AssetKind, region: RegionId) -> Result<(), SimError> {
        self.ensure_running()?;
        actions::install_asset(&self.world, &mut self.player, kind, region)
    }

    /// Let `hours` pass with no action.
    pub fn advance_time(&mut self, hours: f64) -> Result<AdvanceSummary, SimError> {
        self.ensure_running()?;
        if !hours.is_finite() || hours < 0.0 {
            return Err(SimError::invalid(format!("cannot advance by {hours} hours")));
        }
        self.pass(hours)
    }

    /// Spawn an adversary directly, as a host-side scenario hook.
    pub fn spawn_agent(
        &mut self,
        kind: Option<AgentKind>,
        region: Option<RegionId>,
    ) -> Result<AgentId, SimError> {
        self.ensure_running()?;
        let ctx = nightwire_agents::SpawnContext {
            day: self.world.clock.day(),
            regions: &self.world.regions,
        };
        Ok(self
            .world
            .agents
            .spawn_kind(kind, region, ctx, &self.player, &mut self.rng)?)
    }

    // -------------------------------------------------------------------
    // Projections
    // -------------------------------------------------------------------

    /// Snapshot of the player.
    pub fn query_status(&self) -> StatusReport {
        let p = &self.player;
        StatusReport {
            time: self.world.clock.now(),
            day: self.world.clock.day(),
            region: p.region,
            money: p.money,
            skills: p.skills,
            effective_skills: p.effective_skills(),
            focus: p.focus(),
            risk: p.risk(),
            knowledge: p.knowledge,
            reputation: p.reputation.clone(),
            addiction: p.addiction(),
            addicted: p.addicted,
            stimulant_doses: p.stimulant_doses,
            inventory: p.inventory.clone(),
            assets: p.assets.clone(),
            agent_count: self.world.agents.len(),
            jailed_until: p.jailed_until.filter(|_| p.is_jailed(self.world.clock.now())),
            pending_event: self.world.pending_event.map(|e| e.prompt()),
            run_ended: self.ended,
        }
    }

    /// Headlines for a region.
    pub fn query_news(&self, region: RegionId) -> Result<Vec<String>, SimError> {
        Ok(region_news(
            &self.world.regions,
            region,
            &self.world.agents.census(),
            &self.player.reputation,
            self.world.clock.day(),
        )?)
    }

    /// Available missions, sorted by id.
    pub fn query_available_missions(&self) -> Vec<MissionListing> {
        self.player
            .missions_available
            .iter()
            .map(|id| MissionListing {
                id: id.clone(),
                title: self
                    .world
                    .missions
                    .get(id)
                    .map_or_else(String::new, |n| n.payload.title.to_owned()),
            })
            .collect()
    }

    /// Take every queued notice, oldest first.
    pub fn drain_notifications(&mut self) -> Vec<Notice> {
        self.world.notifications.drain(..).collect()
    }

    /// Per-day log of agent actions.
    pub fn agent_activity_log(&self) -> &[String] {
        &self.world.activity_log
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::arithmetic_side_effects)]
mod tests {
    use super::*;
    use nightwire_types::RepAxis;

    fn sim(seed: u64) -> Simulation {
        let mut config = SimulationConfig::default();
        config.world.seed = Some(seed);
        Simulation::new(config).unwrap()
    }

    #[test]
    fn scan_costs_an_hour_and_lists_targets() {
        let mut s = sim(1);
        let before = s.world().clock.now();
        let report = s.scan().unwrap();
        assert!(!report.targets.is_empty());
        assert!(report.targets.len() <= s.config().scan.limit);
        assert_eq!(
            s.world().clock.now().signed_duration_since(before).num_minutes(),
            60
        );
        assert_eq!(s.world().last_scan.len(), report.targets.len());
    }

    #[test]
    fn unknown_target_is_invalid() {
        let mut s = sim(2);
        assert!(matches!(
            s.attempt_hack(TargetId(9_999)),
            Err(SimError::InvalidArgument { .. })
        ));
        assert!(matches!(
            s.connect(TargetId(9_999)),
            Err(SimError::InvalidArgument { .. })
        ));
    }

    #[test]
    fn hack_without_cash_changes_nothing() {
        let mut s = sim(3);
        let id = s.scan().unwrap().targets.first().unwrap().id;
        s.player_mut().money = 0.0;
        let before = s.world().clock.now();
        let err = s.attempt_hack(id).unwrap_err();
        assert!(matches!(
            err,
            SimError::InsufficientResource {
                resource: Resource::Money,
                ..
            }
        ));
        assert_eq!(s.world().clock.now(), before);
    }

    #[test]
    fn connect_reveals_apparent_security() {
        let mut s = sim(4);
        let target = s.world().targets.targets().first().cloned().unwrap();
        let probe = s.connect(target.id).unwrap();
        assert_eq!(probe.apparent_security, target.apparent_security());
        assert_eq!(probe.honeypot_warning, target.is_honeypot());
    }

    #[test]
    fn unavailable_mission_is_a_precondition() {
        let mut s = sim(5);
        assert!(matches!(
            s.attempt_mission("hx_m1"),
            Err(SimError::PreconditionNotMet { .. })
        ));
        assert!(matches!(
            s.attempt_mission("nope"),
            Err(SimError::InvalidArgument { .. })
        ));
    }

    #[test]
    fn mission_completion_is_final() {
        let mut s = sim(6);
        s.player_mut().reputation.set(RepAxis::Hacktivist, 6);
        s.player_mut().money = 1_000_000.0;
        s.player_mut().skills.exploit = 400.0;
        let mut report = s.attempt_mission("hx_m1").unwrap();
        for _ in 0..30 {
            if report.success {
                break;
            }
            s.player_mut().money = 1_000_000.0;
            report = s.attempt_mission("hx_m1").unwrap();
        }
        assert!(report.success);
        assert!(s.player().missions_completed.contains("hx_m1"));
        assert!(!s.player().missions_available.contains("hx_m1"));
        assert!(report.message.contains("Next mission: hx_m2"));

        let money = s.player().money;
        let reputation = s.player().reputation.clone();
        let now = s.world().clock.now();
        assert!(matches!(
            s.attempt_mission("hx_m1"),
            Err(SimError::PreconditionNotMet { .. })
        ));
        assert!((s.player().money - money).abs() < f64::EPSILON);
        assert_eq!(s.player().reputation, reputation);
        assert_eq!(s.world().clock.now(), now);
        assert!(s.player().missions_completed.contains("hx_m1"));
    }

    #[test]
    fn blocked_agent_cannot_be_hacked() {
        let mut s = sim(7);
        let id = s.spawn_agent(Some(AgentKind::Pirate), Some(RegionId::Local)).unwrap();
        let handle = format!("ai:{}", s.world().agents.get(id).unwrap().short_uid);
        let until = s.world().clock.after_hours(48).unwrap();
        s.world_mut().agents.get_mut(id).unwrap().block(until);
        assert!(matches!(
            s.attempt_hack_agent(&handle),
            Err(SimError::PreconditionNotMet { .. })
        ));
    }

    #[test]
    fn jail_ends_the_run() {
        let mut s = sim(8);
        let until = s.world().clock.after_hours(48).unwrap();
        s.player_mut().jailed_until = Some(until);
        let report = s.train(Skill::Recon, 0);
        assert!(report.is_err());
        s.player_mut().knowledge = 1;
        let report = s.train(Skill::Recon, 1).unwrap();
        assert!(report.terminal);
        assert!(s.is_ended());
        assert!(matches!(s.scan(), Err(SimError::RunEnded)));
        assert!(matches!(s.advance_time(1.0), Err(SimError::RunEnded)));
    }

    #[test]
    fn jail_without_run_end_blocks_operations() {
        let mut config = SimulationConfig::default();
        config.world.seed = Some(9);
        config.world.jail_ends_run = false;
        let mut s = Simulation::new(config).unwrap();
        let until = s.world().clock.after_hours(30).unwrap();
        s.player_mut().jailed_until = Some(until);
        assert!(matches!(s.scan(), Err(SimError::PreconditionNotMet { .. })));
        s.advance_time(31.0).unwrap();
        assert!(s.scan().is_ok());
    }

    #[test]
    fn no_pending_event_is_a_precondition() {
        let mut s = sim(10);
        s.world_mut().pending_event = None;
        assert!(matches!(
            s.resolve_event(EventChoice::Accept),
            Err(SimError::PreconditionNotMet { .. })
        ));
    }

    #[test]
    fn wrong_choice_keeps_event_pending() {
        let mut s = sim(11);
        s.world_mut().pending_event = Some(PendingEvent::StateCheck);
        assert!(matches!(
            s.resolve_event(EventChoice::Accept),
            Err(SimError::InvalidArgument { .. })
        ));
        assert!(s.pending_event().is_some());
        s.player_mut().money = 10_000.0;
        s.resolve_event(EventChoice::Bribe).unwrap();
        assert!(s.pending_event().is_none());
    }

    #[test]
    fn status_serializes() {
        let s = sim(12);
        let json = s.query_status().to_json().unwrap();
        assert!(json.contains("\"money\""));
        assert!(json.contains("\"reputation\""));
    }

    #[test]
    fn negative_advance_is_invalid() {
        let mut s = sim(13);
        assert!(matches!(
            s.advance_time(-1.0),
            Err(SimError::InvalidArgument { .. })
        ));
        assert!(s.advance_time(f64::NAN).is_err());
    }

    #[test]
    fn news_names_the_region() {
        let s = sim(14);
        let news = s.query_news(RegionId::Local).unwrap();
        assert!(news.iter().all(|line| line.starts_with("[Local]")));
    }
}
