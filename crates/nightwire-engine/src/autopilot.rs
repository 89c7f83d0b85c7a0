//! Headless autopilot session.
//!
//! A simple greedy policy plays the run through the [`Simulation`] facade
//! for a configured number of world days, logging every operation. It
//! stands in for an interactive host and exercises the whole surface:
//! scans, hacks, agent hacks, missions, events, rest, jobs, and training.

use nightwire_core::resolver::{operation_cost, player_hack_chance};
use nightwire_core::{EventChoice, PendingEvent, SimError, Simulation};
use nightwire_types::{AgentStatus, Skill, TargetId};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::EngineError;

/// Focus below which the autopilot rests.
const REST_FOCUS: f64 = 30.0;
/// Risk above which the autopilot lies low.
const LIE_LOW_RISK: f64 = 60.0;
/// Knowledge banked before training.
const TRAIN_BATCH: u32 = 5;
/// Cash floor below which the autopilot takes a day job.
const WORK_FLOOR: f64 = 50.0;
/// Hours waited when nothing else is possible.
const IDLE_HOURS: f64 = 2.0;
/// Operations allowed per configured day before the session gives up.
const OPS_PER_DAY: u32 = 60;

/// One autopilot decision.
#[derive(Debug, Clone, PartialEq)]
pub enum Move {
    /// Answer the pending event.
    Answer(EventChoice),
    /// Sit out a jail term.
    Wait(f64),
    /// Sleep.
    Sleep,
    /// Work a day job.
    Work,
    /// Spend knowledge on a skill.
    Train(Skill, u32),
    /// Attempt a story mission.
    Mission(String),
    /// Attack a listed agent by handle.
    HackAgent(String),
    /// Hack a target from the last scan.
    Hack(TargetId),
    /// Scan the network.
    Scan,
}

/// How the session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum EndReason {
    /// The configured number of days passed.
    DaysElapsed,
    /// The player was incarcerated.
    Jailed,
    /// The operation cap was hit.
    OperationCap,
}

/// Tally of a finished session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AutopilotSummary {
    /// World day at the end.
    pub day: u32,
    /// Operations issued.
    pub operations: u32,
    /// Successful target hacks.
    pub hacks_won: u32,
    /// Failed target hacks.
    pub hacks_lost: u32,
    /// Missions completed.
    pub missions_completed: usize,
    /// Operations rejected by a precondition or resource check.
    pub rejected: u32,
    /// Why the session stopped.
    pub end: EndReason,
}

fn answer(event: PendingEvent, money: f64) -> EventChoice {
    match event {
        PendingEvent::ClientOffer { difficulty, .. } => {
            if money > 10.0 * f64::from(difficulty) * 4.0 {
                EventChoice::Accept
            } else {
                EventChoice::Decline
            }
        }
        PendingEvent::AssetSeizure { .. } => EventChoice::Hide,
        PendingEvent::StateCheck => {
            if money > 750.0 {
                EventChoice::Bribe
            } else {
                EventChoice::Deny
            }
        }
    }
}

fn weakest_skill(sim: &Simulation) -> Skill {
    let skills = sim.player().skills;
    [Skill::Recon, Skill::Stealth]
        .into_iter()
        .fold(Skill::Exploit, |best, s| {
            if skills.get(s) < skills.get(best) {
                s
            } else {
                best
            }
        })
}

fn best_target(sim: &Simulation) -> Option<TargetId> {
    let player = sim.player();
    let levels = sim.world().agents.active_levels();
    sim.world()
        .last_scan
        .iter()
        .filter(|t| player.can_afford(operation_cost(t.security)))
        .map(|t| {
            let chance = player_hack_chance(player, t.apparent_security(), &levels);
            (t.id, chance * t.apparent_reward())
        })
        .max_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(id, _)| id)
}

/// Pick the next move from the current state.
pub fn next_move(sim: &Simulation, scanned: bool) -> Move {
    let player = sim.player();
    let now = sim.world().clock.now();

    if let Some(&event) = sim.pending_event() {
        return Move::Answer(answer(event, player.money));
    }
    if let Some(until) = player.jailed_until
        && player.is_jailed(now)
    {
        let hours = until.signed_duration_since(now).num_minutes() as f64 / 60.0;
        return Move::Wait(hours.max(IDLE_HOURS));
    }
    if player.focus() < REST_FOCUS || player.risk() > LIE_LOW_RISK {
        return Move::Sleep;
    }
    if player.knowledge >= TRAIN_BATCH {
        return Move::Train(weakest_skill(sim), player.knowledge);
    }
    let affordable_mission = player.missions_available.iter().find(|id| {
        sim.world()
            .missions
            .get(id)
            .is_some_and(|n| player.can_afford(operation_cost(n.payload.base_security)))
    });
    if let Some(id) = affordable_mission {
        return Move::Mission(id.clone());
    }
    if player.money < WORK_FLOOR {
        return Move::Work;
    }
    if !scanned {
        return Move::Scan;
    }
    let exploit = player.effective_skills().exploit;
    let prey = sim.world().agents.agents().iter().find(|a| {
        a.status == AgentStatus::Active && exploit >= f64::from(a.level.saturating_mul(4))
    });
    if let Some(agent) = prey {
        return Move::HackAgent(format!("ai:{}", agent.short_uid));
    }
    best_target(sim).map_or(Move::Work, Move::Hack)
}

fn apply(sim: &mut Simulation, action: &Move, summary: &mut AutopilotSummary) -> Result<String, SimError> {
    Ok(match action {
        Move::Answer(choice) => sim.resolve_event(*choice)?.message,
        Move::Wait(hours) => {
            let advance = sim.advance_time(*hours)?;
            format!("waited {:.1} hours", advance.hours)
        }
        Move::Sleep => sim.sleep()?.message,
        Move::Work => sim.work()?.message,
        Move::Train(skill, points) => sim.train(*skill, *points)?.message,
        Move::Mission(id) => sim.attempt_mission(id)?.message,
        Move::HackAgent(handle) => sim.attempt_hack_agent(handle)?.message,
        Move::Hack(id) => {
            let report = sim.attempt_hack(*id)?;
            if report.success {
                summary.hacks_won = summary.hacks_won.saturating_add(1);
            } else {
                summary.hacks_lost = summary.hacks_lost.saturating_add(1);
            }
            report.message
        }
        Move::Scan => {
            let report = sim.scan()?;
            format!(
                "{} targets, {} agents listed",
                report.targets.len(),
                report.sightings.len()
            )
        }
    })
}

/// Play until `days` world days have passed or the run ends.
pub fn run(sim: &mut Simulation, days: u32) -> Result<AutopilotSummary, EngineError> {
    let mut summary = AutopilotSummary {
        day: 0,
        operations: 0,
        hacks_won: 0,
        hacks_lost: 0,
        missions_completed: 0,
        rejected: 0,
        end: EndReason::DaysElapsed,
    };
    let cap = days.saturating_mul(OPS_PER_DAY).max(OPS_PER_DAY);
    let mut scanned = false;

    while sim.world().clock.day() < days {
        if sim.is_ended() {
            summary.end = EndReason::Jailed;
            break;
        }
        if summary.operations >= cap {
            summary.end = EndReason::OperationCap;
            break;
        }
        let action = next_move(sim, scanned);
        summary.operations = summary.operations.saturating_add(1);
        match apply(sim, &action, &mut summary) {
            Ok(message) => {
                info!(day = sim.world().clock.day(), ?action, %message, "operation");
                scanned = matches!(action, Move::Scan);
            }
            Err(
                error @ (SimError::InsufficientResource { .. }
                | SimError::PreconditionNotMet { .. }
                | SimError::InvalidArgument { .. }),
            ) => {
                warn!(?action, %error, "operation rejected");
                summary.rejected = summary.rejected.saturating_add(1);
                scanned = false;
                sim.advance_time(IDLE_HOURS)?;
            }
            Err(SimError::RunEnded) => {
                summary.end = EndReason::Jailed;
                break;
            }
            Err(other) => return Err(other.into()),
        }
        for notice in sim.drain_notifications() {
            debug!(day = notice.day, text = %notice.text, "notice");
        }
    }

    if sim.is_ended() {
        summary.end = EndReason::Jailed;
    }
    summary.day = sim.world().clock.day();
    summary.missions_completed = sim.player().missions_completed.len();
    Ok(summary)
}

/// Log the session tally and the final status.
pub fn log_summary(sim: &Simulation, summary: &AutopilotSummary) -> Result<(), EngineError> {
    info!(
        day = summary.day,
        operations = summary.operations,
        hacks_won = summary.hacks_won,
        hacks_lost = summary.hacks_lost,
        missions = summary.missions_completed,
        rejected = summary.rejected,
        end = ?summary.end,
        "autopilot session finished"
    );
    let status = sim.query_status().to_json()?;
    info!(%status, "final status");
    for line in sim.agent_activity_log().iter().rev().take(10) {
        debug!(%line, "agent activity");
    }
    Ok(())
}
