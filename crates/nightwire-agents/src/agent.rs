//! A single adversary agent and its lifecycle.
//!
//! # Lifecycle
//!
//! ```text
//! Active --block(until)--> Blocked{until} --now >= until--> Active
//! Active --compromise()--> Compromised (terminal, detached by the directory)
//! ```
//!
//! # Invariants
//!
//! - The permanent fingerprint is computed once at construction and never
//!   changes. Revealing only copies it into the visible slot.
//! - Aggression stays within `[0, 1]`.
//! - Level is at least 1.

use chrono::NaiveDateTime;
use nightwire_types::{AgentId, AgentKind, AgentStatus, RegionId};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::fingerprint::{UNRESOLVED, permanent_fingerprint};

/// Days between evolution steps.
pub const EVOLUTION_PERIOD_DAYS: u32 = 30;

/// An autonomous adversary hunting the player.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnemyAgent {
    /// Unique identifier.
    pub id: AgentId,
    /// Short uid shown as `ai:<uid>`.
    pub short_uid: String,
    permanent_fingerprint: String,
    visible_fingerprint: Option<String>,
    /// Threat level, at least 1.
    pub level: u32,
    /// Chance component of acting each day, in `[0, 1]`.
    pub aggression: f64,
    /// Multiplier on the risk this agent inflicts.
    pub trace_power: f64,
    /// Days since spawn.
    pub age_days: u32,
    /// Lifecycle state.
    pub status: AgentStatus,
    /// Behaviour family.
    pub kind: AgentKind,
    /// Whether the player knows the kind.
    pub kind_revealed: bool,
    /// Where the agent operates.
    pub region: RegionId,
}

impl EnemyAgent {
    /// Create an agent of the given level and kind, applying kind traits.
    ///
    /// Base aggression is `0.10 + 0.03 * level` and base trace power is
    /// `1 + 0.2 * (level - 1)`. Kind traits adjust both.
    pub fn new(id: AgentId, level: u32, kind: AgentKind, region: RegionId) -> Self {
        let level = level.max(1);
        let lvl = f64::from(level);
        let short_uid = id.short();
        let mut agent = Self {
            id,
            permanent_fingerprint: permanent_fingerprint(&short_uid),
            short_uid,
            visible_fingerprint: None,
            level,
            aggression: 0.03f64.mul_add(lvl, 0.10),
            trace_power: 0.2f64.mul_add(lvl - 1.0, 1.0),
            age_days: 0,
            status: AgentStatus::Active,
            kind,
            kind_revealed: false,
            region,
        };
        agent.apply_kind_traits();
        agent
    }

    fn apply_kind_traits(&mut self) {
        match self.kind {
            AgentKind::Pirate => {
                self.aggression += 0.10;
                self.trace_power = (self.trace_power - 0.5).max(1.0);
            }
            AgentKind::Federal => {
                self.aggression += 0.08;
                self.trace_power += 1.5;
            }
            AgentKind::Hacktivist => {
                self.aggression += 0.15;
                self.trace_power = (self.trace_power - 0.2).max(1.5);
            }
            AgentKind::Generic => {}
        }
        self.aggression = self.aggression.clamp(0.0, 1.0);
    }

    // ----- Identity -----

    /// The permanent fingerprint.
    pub fn permanent_fingerprint(&self) -> &str {
        &self.permanent_fingerprint
    }

    /// The fingerprint as the player sees it.
    pub fn visible_fingerprint(&self) -> &str {
        self.visible_fingerprint.as_deref().unwrap_or(UNRESOLVED)
    }

    /// Whether the visible fingerprint is resolved.
    pub const fn fingerprint_revealed(&self) -> bool {
        self.visible_fingerprint.is_some()
    }

    /// Resolve the visible fingerprint. Idempotent.
    pub fn reveal_fingerprint(&mut self) {
        if self.visible_fingerprint.is_none() {
            self.visible_fingerprint = Some(self.permanent_fingerprint.clone());
        }
    }

    /// Attempt a recon reveal: succeeds when `recon >= level * U(1.1, 2.5)`.
    ///
    /// Returns `true` only when this call resolved the fingerprint.
    pub fn try_recon_reveal(&mut self, recon: f64, rng: &mut impl Rng) -> bool {
        if self.fingerprint_revealed() {
            return false;
        }
        let bar = f64::from(self.level) * rng.random_range(1.1..2.5);
        if recon >= bar {
            self.reveal_fingerprint();
            true
        } else {
            false
        }
    }

    /// The kind as the player sees it.
    pub const fn visible_kind(&self) -> AgentKind {
        if self.kind_revealed {
            self.kind
        } else {
            AgentKind::Generic
        }
    }

    /// Label used in activity lines: the visible fingerprint when known,
    /// otherwise the short uid.
    pub fn display_name(&self) -> String {
        self.visible_fingerprint
            .clone()
            .unwrap_or_else(|| format!("ai:{}", self.short_uid))
    }

    /// Whether an identifier (`fp:<hex>`, `ai:<uid>`, or a bare fingerprint)
    /// names this agent. Fingerprints match case-insensitively.
    pub fn matches_identifier(&self, identifier: &str) -> bool {
        let key = identifier.trim();
        if let Some(uid) = key.strip_prefix("ai:") {
            return uid.eq_ignore_ascii_case(&self.short_uid);
        }
        let fp = key.strip_prefix("fp:").unwrap_or(key);
        !fp.is_empty()
            && (fp.eq_ignore_ascii_case(&self.permanent_fingerprint)
                || self
                    .visible_fingerprint
                    .as_deref()
                    .is_some_and(|v| fp.eq_ignore_ascii_case(v)))
    }

    // ----- Lifecycle -----

    /// Whether the agent is active (may act and interferes with hacks).
    pub const fn is_active(&self) -> bool {
        self.status.is_active()
    }

    /// Take the agent offline until `until`.
    pub const fn block(&mut self, until: NaiveDateTime) {
        self.status = AgentStatus::Blocked { until };
    }

    /// Mark the agent compromised. The directory detaches it right after.
    pub const fn compromise(&mut self) {
        self.status = AgentStatus::Compromised;
    }

    /// Return a blocked agent to active once `now` reaches its expiry.
    ///
    /// Returns `true` when the agent was released.
    pub fn release_if_due(&mut self, now: NaiveDateTime) -> bool {
        if let AgentStatus::Blocked { until } = self.status
            && now >= until
        {
            self.status = AgentStatus::Active;
            return true;
        }
        false
    }

    /// Hours left on a block, rounded down; `None` when not blocked.
    pub fn block_hours_remaining(&self, now: NaiveDateTime) -> Option<i64> {
        match self.status {
            AgentStatus::Blocked { until } => Some(until.signed_duration_since(now).num_hours().max(0)),
            AgentStatus::Active | AgentStatus::Compromised => None,
        }
    }

    /// One day of aging: release an expired block, then evolve every
    /// thirtieth day (level +1, aggression +0.03 capped at 1, trace +0.1).
    ///
    /// Returns `true` when the agent evolved.
    pub fn age_one_day(&mut self, now: NaiveDateTime) -> bool {
        self.age_days = self.age_days.saturating_add(1);
        self.release_if_due(now);
        if self.age_days % EVOLUTION_PERIOD_DAYS == 0 {
            self.level = self.level.saturating_add(1);
            self.aggression = (self.aggression + 0.03).min(1.0);
            self.trace_power += 0.1;
            return true;
        }
        false
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn t0() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2095, 11, 1)
            .unwrap()
            .and_hms_opt(8, 0, 0)
            .unwrap()
    }

    fn agent(kind: AgentKind, level: u32) -> EnemyAgent {
        EnemyAgent::new(AgentId::from_random_bytes([3; 16]), level, kind, RegionId::Local)
    }

    #[test]
    fn kind_traits_apply() {
        let g = agent(AgentKind::Generic, 1);
        assert!((g.aggression - 0.13).abs() < 1e-9);
        assert!((g.trace_power - 1.0).abs() < 1e-9);

        let f = agent(AgentKind::Federal, 1);
        assert!((f.aggression - 0.21).abs() < 1e-9);
        assert!((f.trace_power - 2.5).abs() < 1e-9);

        let h = agent(AgentKind::Hacktivist, 1);
        assert!((h.trace_power - 1.5).abs() < 1e-9);

        let p = agent(AgentKind::Pirate, 4);
        assert!((p.trace_power - 1.1).abs() < 1e-9);
    }

    #[test]
    fn reveal_copies_permanent_fingerprint() {
        let mut a = agent(AgentKind::Pirate, 2);
        let permanent = a.permanent_fingerprint().to_owned();
        assert_eq!(a.visible_fingerprint(), UNRESOLVED);
        a.reveal_fingerprint();
        assert_eq!(a.visible_fingerprint(), permanent);
        a.reveal_fingerprint();
        assert_eq!(a.permanent_fingerprint(), permanent);
    }

    #[test]
    fn recon_reveal_needs_enough_skill() {
        let mut rng = StdRng::seed_from_u64(8);
        let mut a = agent(AgentKind::Generic, 5);
        assert!(!a.try_recon_reveal(1.0, &mut rng));
        assert!(a.try_recon_reveal(13.0, &mut rng));
        assert!(!a.try_recon_reveal(13.0, &mut rng));
    }

    #[test]
    fn block_releases_exactly_at_expiry() {
        let mut a = agent(AgentKind::Generic, 1);
        let until = t0() + Duration::hours(30);
        a.block(until);
        assert!(!a.release_if_due(until - Duration::seconds(1)));
        assert!(!a.is_active());
        assert!(a.release_if_due(until));
        assert!(a.is_active());
    }

    #[test]
    fn evolves_every_thirty_days() {
        let mut a = agent(AgentKind::Hacktivist, 1);
        let mut evolved = 0;
        for day in 1..=60 {
            if a.age_one_day(t0() + Duration::days(day)) {
                evolved += 1;
            }
        }
        assert_eq!(evolved, 2);
        assert_eq!(a.level, 3);
        assert!(a.aggression <= 1.0);
    }

    #[test]
    fn identifiers_match() {
        let mut a = agent(AgentKind::Generic, 1);
        let fp = a.permanent_fingerprint().to_owned();
        assert!(a.matches_identifier(&format!("ai:{}", a.short_uid)));
        assert!(a.matches_identifier(&format!("fp:{}", fp.to_lowercase())));
        assert!(!a.matches_identifier("fp:"));
        a.reveal_fingerprint();
        assert!(a.matches_identifier(&fp));
    }
}
