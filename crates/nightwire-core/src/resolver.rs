//! Hack resolution against pool targets and adversary agents.
//!
//! The resolver owns the success formula and the per-outcome effects on the
//! player. It never advances time or touches the agent directory: the
//! [`Simulation`](crate::sim::Simulation) passes elapsed hours through the
//! tick pipeline first and applies agent verdicts afterwards.
//!
//! # Chance
//!
//! 1. `clamp(exploit / security * 0.65, 0.01, 0.45)`
//! 2. `+ exploit * 0.004`, then `+ 0.08` (capped at 0.7) with a botnet worm held
//! 3. `/ (1 + sum(level * 0.02))` over active agents
//! 4. `* (1 + (focus - 50) / 200)`
//! 5. clamp to `[0.01, 0.99]`

use chrono::{Duration, NaiveDateTime};
use nightwire_agents::EnemyAgent;
use nightwire_types::{Item, PlayerState, Target, TraceSubject, floor_u32};
use rand::Rng;
use serde::Serialize;
use tracing::debug;

use crate::trace::{TraceOutcome, TraceSource, apply_trace};

/// Lower bound of every hack chance.
pub const MIN_CHANCE: f64 = 0.01;
/// Upper bound of every hack chance.
pub const MAX_CHANCE: f64 = 0.99;
/// Dampening applied to hacks against agents.
const AGENT_CHANCE_FACTOR: f64 = 0.62;
/// Risk shed by a held proxy pack after each target hack.
const PROXY_PACK_RISK_DROP: f64 = 3.0;

/// Inputs that do not belong to the player or the target.
#[derive(Debug, Clone, Copy)]
pub struct HackContext<'a> {
    /// Levels of every active agent in the directory.
    pub active_levels: &'a [u32],
    /// Simulated time after the hack's hours have passed.
    pub now: NaiveDateTime,
}

/// Success probability for a hack.
pub fn calc_hack_chance(
    exploit: f64,
    security: u32,
    active_levels: &[u32],
    focus: f64,
    botnet: bool,
) -> f64 {
    let security = f64::from(security.max(1));
    let mut base = (exploit / security * 0.65).clamp(MIN_CHANCE, 0.45);
    base += exploit * 0.004;
    if botnet {
        base = (base + 0.08).min(0.7);
    }
    let interference: f64 = 1.0 + active_levels.iter().map(|&l| f64::from(l) * 0.02).sum::<f64>();
    base = (base / interference).min(MAX_CHANCE);
    base *= 1.0 + (focus - 50.0) / 200.0;
    (base.clamp(MIN_CHANCE, MAX_CHANCE) * 10_000.0).round() / 10_000.0
}

/// The chance the player currently has against `security`.
pub fn player_hack_chance(player: &PlayerState, security: u32, active_levels: &[u32]) -> f64 {
    calc_hack_chance(
        player.effective_skills().exploit,
        security,
        active_levels,
        player.focus(),
        player.has_item(Item::BotnetWorm),
    )
}

/// Hours a target hack takes: `max(1, floor(2 + 1.5 * security))`.
pub fn hack_hours(security: u32) -> u32 {
    floor_u32(1.5f64.mul_add(f64::from(security), 2.0)).max(1)
}

/// Operation cost of a target hack: `10 * security`.
pub fn operation_cost(security: u32) -> f64 {
    10.0 * f64::from(security)
}

/// Hours an agent hack takes: `2 + floor(1.1 * level)`.
pub fn agent_hack_hours(level: u32) -> u32 {
    floor_u32(1.1 * f64::from(level)).saturating_add(2)
}

/// Security and trace speed of the synthetic target standing in for an
/// agent of the given level.
pub fn agent_proxy(level: u32) -> (u32, f64) {
    let security = level.saturating_mul(2).saturating_add(8);
    let trace_speed = 0.2f64.mul_add(f64::from(level), 1.2);
    (security, trace_speed)
}

/// Result of one target hack.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HackOutcome {
    /// Whether the success roll passed.
    pub success: bool,
    /// The chance that was rolled against.
    pub chance: f64,
    /// Operation cost actually charged.
    pub cost: f64,
    /// Reward paid out (zero for mission stand-ins and failures).
    pub reward: f64,
    /// Knowledge gained.
    pub knowledge: u32,
    /// Trace resolution, when detection fired.
    pub trace: Option<TraceOutcome>,
    /// Player-facing summary.
    pub message: String,
}

impl HackOutcome {
    /// Whether the hack ended with the player in jail.
    pub fn jailed(&self) -> bool {
        self.trace.as_ref().is_some_and(TraceOutcome::jailed)
    }
}

/// Resolve a hack against a target whose hours have already passed.
///
/// Charges the operation cost (capped at cash on hand), rolls success, applies
/// rewards or penalties, and rolls detection. `subject` keys the recidivism
/// memory; missions pass their id so repeated attempts accumulate.
pub fn resolve_hack(
    player: &mut PlayerState,
    target: &Target,
    subject: TraceSubject,
    ctx: HackContext<'_>,
    rng: &mut impl Rng,
) -> HackOutcome {
    let cost = player.pay_capped(operation_cost(target.security));
    let chance = player_hack_chance(player, target.security, ctx.active_levels);
    let success = rng.random::<f64>() < chance;
    let security = f64::from(target.security);
    debug!(target = %target.id, chance, success, "hack rolled");

    let (reward, knowledge, detect_p, mut message) = if success {
        let reward = if target.mission { 0.0 } else { target.reward };
        player.money += reward;
        let knowledge = (target.security / 2).max(1);
        player.skills.add_all(0.03 * security);
        player.adjust_risk(-0.45 * security);
        let message = if target.mission {
            format!("Intrusion into {} complete.", target.name)
        } else {
            format!("Hack successful! +${reward:.2}, +{knowledge} knowledge.")
        };
        (reward, knowledge, 0.22 * target.trace_speed, message)
    } else {
        player.adjust_risk(security * rng.random_range(0.9..1.9));
        let knowledge = floor_u32((0.15 * security).round());
        let message = format!(
            "Hack failed. Risk now {:.1}%. You learned {knowledge} knowledge from the attempt.",
            player.risk()
        );
        (0.0, knowledge, 0.45 * target.trace_speed, message)
    };
    player.knowledge = player.knowledge.saturating_add(knowledge);
    player.reputation.criminal_shift();

    let trace = (rng.random::<f64>() < detect_p).then(|| {
        let source = TraceSource {
            subject,
            security: target.security,
        };
        apply_trace(player, &source, target.trace_speed, ctx.now, rng)
    });
    if let Some(trace) = &trace {
        message.push(' ');
        message.push_str(&trace.message);
    }
    if player.has_item(Item::ProxyPack) {
        player.adjust_risk(-PROXY_PACK_RISK_DROP);
    }

    HackOutcome {
        success,
        chance,
        cost,
        reward,
        knowledge,
        trace,
        message,
    }
}

/// What a successful agent hack does to the agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AgentVerdict {
    /// Permanent removal on the higher reward path.
    Critical,
    /// Permanent removal on the lower reward path.
    Neutralized,
    /// Knocked offline until the given time.
    Blocked {
        /// Expiry.
        until: NaiveDateTime,
        /// Block length in hours.
        hours: u32,
    },
}

/// Result of one agent hack.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AgentHackOutcome {
    /// Whether the success roll passed.
    pub success: bool,
    /// The dampened chance that was rolled against.
    pub chance: f64,
    /// What happens to the agent on success.
    pub verdict: Option<AgentVerdict>,
    /// Knowledge gained.
    pub knowledge: u32,
    /// Trace resolution, when detection fired on failure.
    pub trace: Option<TraceOutcome>,
    /// Player-facing summary.
    pub message: String,
}

impl AgentHackOutcome {
    /// Whether the hack ended with the player in jail.
    pub fn jailed(&self) -> bool {
        self.trace.as_ref().is_some_and(TraceOutcome::jailed)
    }
}

/// Resolve a hack against an agent whose hours have already passed.
pub fn resolve_agent_hack(
    player: &mut PlayerState,
    agent: &EnemyAgent,
    ctx: HackContext<'_>,
    rng: &mut impl Rng,
) -> AgentHackOutcome {
    let (security, trace_speed) = agent_proxy(agent.level);
    let chance =
        (player_hack_chance(player, security, ctx.active_levels) * AGENT_CHANCE_FACTOR).max(MIN_CHANCE);
    let success = rng.random::<f64>() < chance;
    let sec = f64::from(security);
    let name = agent.display_name();
    debug!(agent = %agent.id, chance, success, "agent hack rolled");

    if success {
        let knowledge = (security / 2).max(1);
        player.knowledge = player.knowledge.saturating_add(knowledge);
        player.skills.add_all(0.02 * sec);
        player.adjust_risk(-0.25 * sec);

        let roll = rng.random::<f64>();
        let verdict = if roll < 0.15 {
            AgentVerdict::Critical
        } else if roll < 0.50 {
            AgentVerdict::Neutralized
        } else {
            let hours: u32 = rng.random_range(24..=72);
            let until = ctx
                .now
                .checked_add_signed(Duration::hours(i64::from(hours)))
                .unwrap_or(NaiveDateTime::MAX);
            AgentVerdict::Blocked { until, hours }
        };
        let message = match verdict {
            AgentVerdict::Critical => format!("Critical breach on {name}. +{knowledge} knowledge."),
            AgentVerdict::Neutralized => format!("{name} compromised. +{knowledge} knowledge."),
            AgentVerdict::Blocked { hours, .. } => {
                format!("{name} knocked offline for {hours} hours. +{knowledge} knowledge.")
            }
        };
        return AgentHackOutcome {
            success,
            chance,
            verdict: Some(verdict),
            knowledge,
            trace: None,
            message,
        };
    }

    player.adjust_risk(sec * rng.random_range(0.6..1.6));
    let knowledge = floor_u32((0.1 * sec).round());
    player.knowledge = player.knowledge.saturating_add(knowledge);
    let mut message = format!(
        "Attack on {name} failed. Risk now {:.1}%. +{knowledge} knowledge.",
        player.risk()
    );
    let trace = (rng.random::<f64>() < 0.30 * trace_speed).then(|| {
        let source = TraceSource {
            subject: TraceSubject::Agent(agent.id),
            security,
        };
        apply_trace(player, &source, trace_speed, ctx.now, rng)
    });
    if let Some(trace) = &trace {
        message.push(' ');
        message.push_str(&trace.message);
    }
    AgentHackOutcome {
        success,
        chance,
        verdict: None,
        knowledge,
        trace,
        message,
    }
}
