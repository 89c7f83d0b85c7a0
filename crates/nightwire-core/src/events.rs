//! Random world events rolled after scan, connect, hack, and sleep.
//!
//! The roll chance grows with risk and with the age of the world. Tips and
//! agent contacts resolve on the spot. Client offers, asset seizures, and
//! state checks need an answer from the host, so they are parked as a single
//! [`PendingEvent`] until [`Simulation::resolve_event`] is called. While one
//! is parked, no new event is rolled.
//!
//! [`Simulation::resolve_event`]: crate::sim::Simulation::resolve_event

use core::fmt;
use core::str::FromStr;

use chrono::{Duration, NaiveDateTime};
use nightwire_agents::{SpawnCause, SpawnContext, SpawnRequest};
use nightwire_types::{AgentKind, Asset, AssetKind, ParseEnumError, PlayerState, RegionId, RepAxis, Target};
use nightwire_world::TargetPool;
use rand::Rng;
use rand::seq::IndexedRandom;
use serde::Serialize;
use tracing::{info, warn};

use crate::tick::WorldState;

/// Risk above which state checks join the event pool.
const STATE_CHECK_RISK_GATE: f64 = 15.0;
/// Crime reputation above which state checks join the event pool.
const STATE_CHECK_CRIME_GATE: u32 = 8;

/// Probability that a random event fires at this risk and world day.
pub fn event_probability(risk: f64, day: u32) -> f64 {
    0.003 + (risk / 100.0).min(0.25) + (f64::from(day) / 200.0).min(0.1)
}

/// Which event the roll picked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    /// A client offers a contract.
    ClientOffer,
    /// An asset is about to be seized.
    AssetSeizure,
    /// An anonymous tip adds a target.
    MysteriousTip,
    /// An unknown agent starts tracking the player.
    AgentContact,
    /// A state inspection knocks on the door.
    StateCheck,
}

/// Identifies one installed asset across time advances.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AssetRef {
    /// Asset kind.
    pub kind: AssetKind,
    /// Region it was installed in.
    pub region: RegionId,
    /// Installation time.
    pub installed_at: NaiveDateTime,
}

impl AssetRef {
    fn of(asset: &Asset) -> Self {
        Self {
            kind: asset.kind,
            region: asset.region,
            installed_at: asset.installed_at,
        }
    }

    /// Index of the referenced asset, if the player still holds it.
    pub fn locate(&self, player: &PlayerState) -> Option<usize> {
        player
            .assets
            .iter()
            .position(|a| a.kind == self.kind && a.region == self.region && a.installed_at == self.installed_at)
    }
}

/// An event waiting for the host's choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PendingEvent {
    /// Accept or decline a contract.
    ClientOffer {
        /// Promised pay.
        pay: u32,
        /// Contract difficulty.
        difficulty: u32,
    },
    /// Hide or surrender an asset.
    AssetSeizure {
        /// The threatened asset.
        asset: AssetRef,
    },
    /// Bribe or deny.
    StateCheck,
}

impl PendingEvent {
    /// The choices this event accepts.
    pub const fn choices(&self) -> [EventChoice; 2] {
        match self {
            Self::ClientOffer { .. } => [EventChoice::Accept, EventChoice::Decline],
            Self::AssetSeizure { .. } => [EventChoice::Hide, EventChoice::Surrender],
            Self::StateCheck => [EventChoice::Bribe, EventChoice::Deny],
        }
    }

    /// Prompt text for the host.
    pub fn prompt(&self) -> String {
        match self {
            Self::ClientOffer { pay, difficulty } => format!(
                "A client offers a job: promised reward ${pay}, difficulty {difficulty}. (accept / decline)"
            ),
            Self::AssetSeizure { asset } => format!(
                "Seizure risk for your '{}' asset in {}. (hide / surrender)",
                asset.kind, asset.region
            ),
            Self::StateCheck => {
                "Inspection operation: someone drew attention to you. (bribe / deny)".to_owned()
            }
        }
    }
}

/// The host's answer to a [`PendingEvent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum EventChoice {
    /// Take the contract.
    Accept,
    /// Turn the contract down.
    Decline,
    /// Try to hide the asset (costs six hours).
    Hide,
    /// Give the asset up.
    Surrender,
    /// Pay the inspectors off.
    Bribe,
    /// Deny everything.
    Deny,
}

impl EventChoice {
    const ALL: [Self; 6] = [
        Self::Accept,
        Self::Decline,
        Self::Hide,
        Self::Surrender,
        Self::Bribe,
        Self::Deny,
    ];

    /// Lowercase label.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Accept => "accept",
            Self::Decline => "decline",
            Self::Hide => "hide",
            Self::Surrender => "surrender",
            Self::Bribe => "bribe",
            Self::Deny => "deny",
        }
    }
}

impl fmt::Display for EventChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for EventChoice {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.label().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ParseEnumError {
                kind: "event choice",
                value: s.to_owned(),
            })
    }
}

/// Pick an event kind from the pool the player's standing allows.
pub fn pick_event(player: &PlayerState, rng: &mut impl Rng) -> EventKind {
    let mut pool = vec![
        EventKind::ClientOffer,
        EventKind::AssetSeizure,
        EventKind::MysteriousTip,
        EventKind::AgentContact,
    ];
    if player.risk() > STATE_CHECK_RISK_GATE || player.reputation.get(RepAxis::Crime) > STATE_CHECK_CRIME_GATE {
        pool.push(EventKind::StateCheck);
    }
    pool.choose(rng).copied().unwrap_or(EventKind::MysteriousTip)
}

/// Roll for a random event and apply it.
///
/// Returns the event's text, or `None` when nothing fired. Choice events
/// are parked in `world.pending_event`.
pub fn roll_random_event(world: &mut WorldState, player: &PlayerState, rng: &mut impl Rng) -> Option<String> {
    if world.pending_event.is_some() {
        return None;
    }
    if rng.random::<f64>() > event_probability(player.risk(), world.clock.day()) {
        return None;
    }
    let kind = pick_event(player, rng);
    info!(?kind, "random event");
    let text = match kind {
        EventKind::ClientOffer => {
            let pending = PendingEvent::ClientOffer {
                pay: rng.random_range(200..=30_000),
                difficulty: rng.random_range(1..=18),
            };
            world.pending_event = Some(pending);
            pending.prompt()
        }
        EventKind::AssetSeizure => {
            let Some(asset) = player.assets.choose(rng) else {
                return Some("Local operations under way, but you hold no assets.".to_owned());
            };
            let pending = PendingEvent::AssetSeizure {
                asset: AssetRef::of(asset),
            };
            world.pending_event = Some(pending);
            pending.prompt()
        }
        EventKind::StateCheck => {
            world.pending_event = Some(PendingEvent::StateCheck);
            PendingEvent::StateCheck.prompt()
        }
        EventKind::MysteriousTip => {
            let difficulty = rng.random_range(2..=6);
            let target = world.targets.make_target(player.region, difficulty, rng);
            let text = format!(
                "Anonymous tip: a potential target will surface soon -> {} - {} (security {}).",
                target.name, target.region, target.security
            );
            world.targets.push_front(target);
            text
        }
        EventKind::AgentContact => {
            let kind = [
                Some(AgentKind::Pirate),
                Some(AgentKind::Federal),
                Some(AgentKind::Hacktivist),
                None,
            ]
            .choose(rng)
            .copied()
            .flatten();
            let request = SpawnRequest {
                kind,
                region: Some(player.region),
                cause: SpawnCause::Contact,
            };
            let ctx = SpawnContext {
                day: world.clock.day(),
                regions: &world.regions,
            };
            match world.agents.spawn(request, ctx, player, rng) {
                Ok(agent) => format!(
                    "An unknown agent (level {}, kind hidden) started monitoring you: ai:{}.",
                    agent.level, agent.short_uid
                ),
                Err(error) => {
                    warn!(%error, "contact spawn failed");
                    return None;
                }
            }
        }
    };
    world.notify(text.clone());
    Some(text)
}

/// The stand-in target for an accepted client contract.
pub fn contract_target(pool: &mut TargetPool, region: RegionId, pay: u32, difficulty: u32, rng: &mut impl Rng) -> Target {
    let mut target = pool.make_target(region, difficulty, rng);
    target.name = format!("Client contract ({region})");
    target.reward = f64::from(pay);
    target
}

/// Try to hide a threatened asset once the six hours have passed.
pub fn hide_asset(player: &mut PlayerState, asset: &AssetRef, rng: &mut impl Rng) -> String {
    let Some(index) = asset.locate(player) else {
        return format!("Your '{}' asset is already gone.", asset.kind);
    };
    let stealth = player.effective_skills().stealth;
    if rng.random::<f64>() < 0.05f64.mul_add(stealth, 0.5) {
        if let Some(held) = player.assets.get_mut(index) {
            held.income_per_day *= 0.6;
        }
        "Hiding worked. The asset's income is reduced for now.".to_owned()
    } else {
        player.assets.remove(index);
        format!("Hiding failed. Asset '{}' seized.", asset.kind)
    }
}

/// Give up a threatened asset.
pub fn surrender_asset(player: &mut PlayerState, asset: &AssetRef) -> String {
    if let Some(index) = asset.locate(player) {
        player.assets.remove(index);
    }
    format!("You lost the '{}' asset.", asset.kind)
}

/// Outcome of a state check answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateCheckOutcome {
    /// Player-facing text.
    pub text: String,
    /// Release time when the answer ended in jail.
    pub jailed_until: Option<NaiveDateTime>,
}

fn jail(player: &mut PlayerState, now: NaiveDateTime, rng: &mut impl Rng) -> NaiveDateTime {
    let hours: i64 = rng.random_range(24..=120);
    let until = now
        .checked_add_signed(Duration::hours(hours))
        .unwrap_or(NaiveDateTime::MAX);
    player.jailed_until = Some(until);
    player.set_risk(0.0);
    info!(%until, "player incarcerated by inspection");
    until
}

/// Answer a state check with a bribe (`bribe = true`) or a denial.
pub fn resolve_state_check(player: &mut PlayerState, bribe: bool, now: NaiveDateTime, rng: &mut impl Rng) -> StateCheckOutcome {
    if bribe {
        let cost = f64::from(rng.random_range(150..=750));
        if !player.can_afford(cost) {
            let until = jail(player, now, rng);
            return StateCheckOutcome {
                text: "You tried to bribe without the cash. The agents noticed: immediate arrest.".to_owned(),
                jailed_until: Some(until),
            };
        }
        player.money -= cost;
        player.adjust_risk(-rng.random_range(5.0..20.0));
        return StateCheckOutcome {
            text: format!("You bribed the agents for ${cost:.2}. Risk reduced."),
            jailed_until: None,
        };
    }

    if rng.random::<f64>() < 0.2 + player.risk() / 100.0 {
        let fine = f64::from(rng.random_range(100..=10_000));
        if !player.can_afford(fine) {
            let until = jail(player, now, rng);
            return StateCheckOutcome {
                text: "The inspectors levied a fine you cannot pay.".to_owned(),
                jailed_until: Some(until),
            };
        }
        player.money -= fine;
        player.adjust_risk(rng.random_range(2.0..8.0));
        return StateCheckOutcome {
            text: format!("The denials did not convince anyone. Fine paid: ${fine:.2}."),
            jailed_until: None,
        };
    }
    StateCheckOutcome {
        text: "No further action. You walked away clean.".to_owned(),
        jailed_until: None,
    }
}
