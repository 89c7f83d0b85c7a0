//! Core entity structs for the Nightwire simulation.
//!
//! # Invariants
//!
//! - `PlayerState::risk`, `focus`, and `addiction` stay within `[0, 100]`.
//!   All writes go through the clamping helpers on [`PlayerState`].
//! - `PlayerState::missions_completed` is write-once. Once an id is there, it
//!   is never added back to `missions_available`.
//! - `PlayerState::inventory` never holds more than `inventory_limit` items.

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::enums::{AgentKind, AssetKind, Item, RegionId, Skill};
use crate::ids::{AgentId, TargetId};
use crate::reputation::ReputationLedger;

/// Upper bound of every percentage meter.
pub const METER_MAX: f64 = 100.0;

/// Round to two decimal places, the precision skills are kept at.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Floor a real value into a `u32`, saturating at both ends. NaN maps to 0.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn floor_u32(value: f64) -> u32 {
    if value.is_nan() {
        return 0;
    }
    value.floor().clamp(0.0, f64::from(u32::MAX)) as u32
}

// ---------------------------------------------------------------------------
// Skills
// ---------------------------------------------------------------------------

/// The player's three skill levels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Skills {
    /// Finding and profiling targets.
    pub recon: f64,
    /// Breaking in.
    pub exploit: f64,
    /// Evading traces.
    pub stealth: f64,
}

impl Default for Skills {
    fn default() -> Self {
        Self {
            recon: 1.0,
            exploit: 1.0,
            stealth: 1.0,
        }
    }
}

impl Skills {
    /// Value of one skill.
    pub const fn get(&self, skill: Skill) -> f64 {
        match skill {
            Skill::Recon => self.recon,
            Skill::Exploit => self.exploit,
            Skill::Stealth => self.stealth,
        }
    }

    /// Add to one skill, never dropping below zero, rounded to two decimals.
    pub fn add(&mut self, skill: Skill, delta: f64) {
        let slot = match skill {
            Skill::Recon => &mut self.recon,
            Skill::Exploit => &mut self.exploit,
            Skill::Stealth => &mut self.stealth,
        };
        *slot = round2((*slot + delta).max(0.0));
    }

    /// Add the same amount to all three skills.
    pub fn add_all(&mut self, delta: f64) {
        for skill in Skill::ALL {
            self.add(skill, delta);
        }
    }
}

// ---------------------------------------------------------------------------
// World entities
// ---------------------------------------------------------------------------

/// False values a honeypot target shows to the player.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HoneypotDisguise {
    /// Displayed security level.
    pub security: u32,
    /// Displayed reward.
    pub reward: f64,
}

/// A hackable system in the daily target pool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Target {
    /// Identifier, unique within the world.
    pub id: TargetId,
    /// Display name.
    pub name: String,
    /// Real security level (at least 1).
    pub security: u32,
    /// Real payout on success.
    pub reward: f64,
    /// Multiplier on detection probability and trace severity.
    pub trace_speed: f64,
    /// Region the target lives in.
    pub region: RegionId,
    /// Flavor hints revealed on connect.
    pub hints: Vec<String>,
    /// Present when the target is a honeypot.
    pub disguise: Option<HoneypotDisguise>,
    /// A narrative stand-in whose payout is handled by the caller.
    pub mission: bool,
}

impl Target {
    /// Whether the target is a honeypot.
    pub const fn is_honeypot(&self) -> bool {
        self.disguise.is_some()
    }

    /// The security level the player sees.
    pub fn apparent_security(&self) -> u32 {
        self.disguise.map_or(self.security, |d| d.security)
    }

    /// The reward the player sees.
    pub fn apparent_reward(&self) -> f64 {
        self.disguise.map_or(self.reward, |d| d.reward)
    }
}

/// An income-producing installation owned by the player.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Asset {
    /// What was installed.
    pub kind: AssetKind,
    /// Current income per simulated day.
    pub income_per_day: f64,
    /// Where it was installed.
    pub region: RegionId,
    /// When it was installed.
    pub installed_at: NaiveDateTime,
}

/// Who a trace was opened against, for recidivism bookkeeping.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TraceSubject {
    /// A pool, tip, or contract target.
    Target(TargetId),
    /// An adversary agent.
    Agent(AgentId),
    /// A story mission, keyed by mission id so repeat attempts accumulate.
    Mission(String),
}

/// Per-subject detection history.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttackMemory {
    /// Number of traces opened against this subject.
    pub detections: u32,
}

/// A journal entry for an adversary whose fingerprint the player has seen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FingerprintRecord {
    /// The agent's short uid.
    pub agent_uid: String,
    /// When the fingerprint was first recorded.
    pub first_seen: NaiveDateTime,
    /// Agent level at first sighting.
    pub level: u32,
    /// Known kind, when it had been revealed at the time.
    pub kind: Option<AgentKind>,
}

// ---------------------------------------------------------------------------
// Player
// ---------------------------------------------------------------------------

/// Everything the simulation knows about the player.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerState {
    /// Cash on hand.
    pub money: f64,
    /// Stamina meter in `[0, 100]`.
    focus: f64,
    /// Suspicion meter in `[0, 100]`.
    risk: f64,
    /// Trained skills (item buffs excluded).
    pub skills: Skills,
    /// Three-axis standing.
    pub reputation: ReputationLedger,
    /// Unspent study points.
    pub knowledge: u32,
    /// Stimulant dependence in `[0, 100]`.
    addiction: f64,
    /// Whether dependence has set in (focus decays twice as fast).
    pub addicted: bool,
    /// Stimulant doses held.
    pub stimulant_doses: u32,
    /// Where the player is based.
    pub region: RegionId,
    /// Release time when incarcerated.
    pub jailed_until: Option<NaiveDateTime>,
    /// Carried items.
    pub inventory: Vec<Item>,
    /// Maximum number of carried items.
    pub inventory_limit: usize,
    /// Installed assets.
    pub assets: Vec<Asset>,
    /// Recidivism memory per trace subject.
    #[serde(skip)]
    pub attack_memory: BTreeMap<TraceSubject, AttackMemory>,
    /// Missions whose reputation predicate currently holds.
    pub missions_available: BTreeSet<String>,
    /// Missions already completed.
    pub missions_completed: BTreeSet<String>,
    /// Fingerprints the player has recorded, keyed by fingerprint.
    pub known_fingerprints: BTreeMap<String, FingerprintRecord>,
}

impl PlayerState {
    /// A fresh player with full focus and default skills.
    pub fn new(starting_money: f64, inventory_limit: usize) -> Self {
        Self {
            money: starting_money,
            focus: METER_MAX,
            risk: 0.0,
            skills: Skills::default(),
            reputation: ReputationLedger::new(),
            knowledge: 0,
            addiction: 0.0,
            addicted: false,
            stimulant_doses: 0,
            region: RegionId::Local,
            jailed_until: None,
            inventory: Vec::new(),
            inventory_limit,
            assets: Vec::new(),
            attack_memory: BTreeMap::new(),
            missions_available: BTreeSet::new(),
            missions_completed: BTreeSet::new(),
            known_fingerprints: BTreeMap::new(),
        }
    }

    // ----- Meters -----

    /// Current focus.
    pub const fn focus(&self) -> f64 {
        self.focus
    }

    /// Current risk.
    pub const fn risk(&self) -> f64 {
        self.risk
    }

    /// Current addiction level.
    pub const fn addiction(&self) -> f64 {
        self.addiction
    }

    /// Add a signed amount to focus, clamped to `[0, 100]`.
    pub fn adjust_focus(&mut self, delta: f64) {
        self.focus = (self.focus + delta).clamp(0.0, METER_MAX);
    }

    /// Add a signed amount to risk, clamped to `[0, 100]`.
    pub fn adjust_risk(&mut self, delta: f64) {
        self.risk = (self.risk + delta).clamp(0.0, METER_MAX);
    }

    /// Overwrite risk, clamped to `[0, 100]`.
    pub fn set_risk(&mut self, value: f64) {
        self.risk = value.clamp(0.0, METER_MAX);
    }

    /// Add a signed amount to addiction, clamped to `[0, 100]`.
    pub fn adjust_addiction(&mut self, delta: f64) {
        self.addiction = (self.addiction + delta).clamp(0.0, METER_MAX);
    }

    /// Overwrite addiction, clamped to `[0, 100]`.
    pub fn set_addiction(&mut self, value: f64) {
        self.addiction = value.clamp(0.0, METER_MAX);
    }

    // ----- Money -----

    /// Whether the player holds at least `amount`.
    pub fn can_afford(&self, amount: f64) -> bool {
        self.money >= amount
    }

    /// Deduct up to `amount`, never below zero. Returns what was taken.
    pub fn pay_capped(&mut self, amount: f64) -> f64 {
        let taken = amount.max(0.0).min(self.money.max(0.0));
        self.money -= taken;
        taken
    }

    // ----- Inventory and assets -----

    /// Whether an item is held.
    pub fn has_item(&self, item: Item) -> bool {
        self.inventory.contains(&item)
    }

    /// Trained skills plus the buffs of every held item.
    pub fn effective_skills(&self) -> Skills {
        let mut skills = self.skills;
        for (skill, bonus) in self.inventory.iter().filter_map(|i| i.buff()) {
            match skill {
                Skill::Recon => skills.recon += bonus,
                Skill::Exploit => skills.exploit += bonus,
                Skill::Stealth => skills.stealth += bonus,
            }
        }
        skills
    }

    /// Sum of all asset incomes per day.
    pub fn daily_income(&self) -> f64 {
        self.assets.iter().map(|a| a.income_per_day).sum()
    }

    // ----- Status -----

    /// Whether the player is incarcerated at `now`.
    pub fn is_jailed(&self, now: NaiveDateTime) -> bool {
        self.jailed_until.is_some_and(|until| now < until)
    }

    /// Detection count recorded against a subject.
    pub fn detections(&self, subject: &TraceSubject) -> u32 {
        self.attack_memory.get(subject).map_or(0, |m| m.detections)
    }
}
