//! The set of live adversary agents.
//!
//! # Architecture
//!
//! The directory is the only owner of [`EnemyAgent`] values. Structural
//! changes go through exactly two doors: [`EnemyAgentDirectory::spawn`]
//! appends, [`EnemyAgentDirectory::remove`] detaches. The daily update never
//! mutates the list while walking it; it collects ids to remove and applies
//! them afterwards.
//!
//! # Invariants
//!
//! - A removed agent is gone from the directory before its reward is paid,
//!   so a reward can only ever be paid once per agent.
//! - No listed agent is in [`AgentStatus::Compromised`] once a public
//!   operation returns.
//! - One agent's failing daily update never stops the others.

use chrono::NaiveDateTime;
use nightwire_types::{
    AgentId, AgentKind, AgentStatus, FingerprintRecord, PlayerState, RegionId, RemovalReason,
};
use nightwire_world::{AgentCensus, RegionRegistry};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::agent::EnemyAgent;
use crate::behavior::try_action;
use crate::error::AgentError;
use crate::reward::{RemovalReward, roll_removal_reward};
use crate::spawn::{SpawnCause, SpawnRequest, pick_kind, spawn_level};

/// Everything a spawn needs to know about the world.
#[derive(Debug, Clone, Copy)]
pub struct SpawnContext<'a> {
    /// Current world day.
    pub day: u32,
    /// Region table for difficulty and pressure.
    pub regions: &'a RegionRegistry,
}

/// Result of removing an agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemovalReport {
    /// The removed agent, with fingerprint and kind revealed.
    pub agent: EnemyAgent,
    /// Why it left.
    pub reason: RemovalReason,
    /// Reputation granted; `None` when the reason pays nothing.
    pub reward: Option<RemovalReward>,
    /// One-line description for the notification queue.
    pub message: String,
}

/// A per-agent failure captured during the daily update.
#[derive(Debug, Clone, PartialEq)]
pub struct AgentFailure {
    /// Which agent failed.
    pub agent: AgentId,
    /// What went wrong.
    pub error: AgentError,
}

/// Outcome of one day of agent activity.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DailyAgentReport {
    /// `(agent, text)` for every agent that acted.
    pub events: Vec<(AgentId, String)>,
    /// Agents that failed their update.
    pub failures: Vec<AgentFailure>,
    /// Agents removed at the end of the day.
    pub removals: Vec<RemovalReport>,
    /// Agents that evolved today.
    pub evolved: Vec<AgentId>,
}

/// Owner of every live adversary agent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EnemyAgentDirectory {
    agents: Vec<EnemyAgent>,
}

impl EnemyAgentDirectory {
    /// An empty directory.
    pub const fn new() -> Self {
        Self { agents: Vec::new() }
    }

    // -------------------------------------------------------------------
    // Queries
    // -------------------------------------------------------------------

    /// Number of listed agents.
    pub fn len(&self) -> usize {
        self.agents.len()
    }

    /// Whether no agents are listed.
    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    /// All listed agents in spawn order.
    pub fn agents(&self) -> &[EnemyAgent] {
        &self.agents
    }

    /// Look up an agent by id.
    pub fn get(&self, id: AgentId) -> Result<&EnemyAgent, AgentError> {
        self.agents
            .iter()
            .find(|a| a.id == id)
            .ok_or(AgentError::AgentNotFound(id))
    }

    /// Look up an agent mutably by id.
    pub fn get_mut(&mut self, id: AgentId) -> Result<&mut EnemyAgent, AgentError> {
        self.agents
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or(AgentError::AgentNotFound(id))
    }

    /// Resolve a player-typed identifier (`fp:<hex>`, `ai:<uid>`, or a bare
    /// fingerprint) to an agent id.
    pub fn find_by_identifier(&self, identifier: &str) -> Result<AgentId, AgentError> {
        self.agents
            .iter()
            .find(|a| a.matches_identifier(identifier))
            .map(|a| a.id)
            .ok_or_else(|| AgentError::UnknownIdentifier(identifier.to_owned()))
    }

    /// Levels of every active agent (blocked agents excluded).
    pub fn active_levels(&self) -> Vec<u32> {
        self.agents
            .iter()
            .filter(|a| a.is_active())
            .map(|a| a.level)
            .collect()
    }

    /// Agent counts by the kind the public sees.
    pub fn census(&self) -> AgentCensus {
        let mut census = AgentCensus::default();
        for agent in &self.agents {
            census.record(agent.visible_kind());
        }
        census
    }

    // -------------------------------------------------------------------
    // Structural mutation
    // -------------------------------------------------------------------

    /// Create an agent for a spawn request and append it.
    pub fn spawn(
        &mut self,
        request: SpawnRequest,
        ctx: SpawnContext<'_>,
        player: &PlayerState,
        rng: &mut impl Rng,
    ) -> Result<&EnemyAgent, AgentError> {
        let region_state = match request.region {
            Some(id) => Some(ctx.regions.get(id)?),
            None => None,
        };
        let level = spawn_level(ctx.day, region_state, request.kind, &player.reputation, rng);
        let kind = request.kind.unwrap_or_else(|| pick_kind(region_state, rng));
        let id = AgentId::from_random_bytes(rng.random());
        let region = request.region.unwrap_or(RegionId::Global);
        let agent = EnemyAgent::new(id, level, kind, region);
        info!(
            agent = %agent.id,
            uid = %agent.short_uid,
            kind = %agent.kind,
            level = agent.level,
            region = %agent.region,
            cause = ?request.cause,
            "agent spawned"
        );
        self.agents.push(agent);
        self.agents.last().ok_or(AgentError::AgentNotFound(id))
    }

    /// Detach an agent, reveal it, and pay the removal reward.
    ///
    /// The agent leaves the directory first; the reward (if the reason pays
    /// one) is rolled from its revealed kind and applied to the player's
    /// reputation. The revealed fingerprint is recorded in the player's
    /// journal.
    pub fn remove(
        &mut self,
        id: AgentId,
        reason: RemovalReason,
        player: &mut PlayerState,
        now: NaiveDateTime,
        rng: &mut impl Rng,
    ) -> Result<RemovalReport, AgentError> {
        let index = self
            .agents
            .iter()
            .position(|a| a.id == id)
            .ok_or(AgentError::AgentNotFound(id))?;
        let mut agent = self.agents.remove(index);
        if reason.is_rewarded() {
            agent.compromise();
        }
        agent.reveal_fingerprint();
        agent.kind_revealed = true;
        record_fingerprint(player, &agent, now);

        let reward = reason
            .is_rewarded()
            .then(|| roll_removal_reward(agent.kind, reason.is_critical(), rng));
        if let Some(reward) = &reward {
            reward.apply(&mut player.reputation);
        }

        let fp = agent.visible_fingerprint();
        let message = match (&reward, reason) {
            (Some(r), RemovalReason::CriticallyCompromised) => format!(
                "[{fp}] Severe leak complete. {} agent purged from the network. Reputation: {}.",
                agent.kind,
                r.summary()
            ),
            (Some(r), _) => format!(
                "[{fp}] {} agent neutralised permanently. Reputation: {}.",
                agent.kind,
                r.summary()
            ),
            (None, _) => format!("[{fp}] lost your trail."),
        };
        info!(agent = %agent.id, kind = %agent.kind, ?reason, "agent removed");
        Ok(RemovalReport {
            agent,
            reason,
            reward,
            message,
        })
    }

    /// Remove every listed agent for the same reason. Used when the player
    /// shakes all trackers at once.
    pub fn remove_all(
        &mut self,
        reason: RemovalReason,
        player: &mut PlayerState,
        now: NaiveDateTime,
        rng: &mut impl Rng,
    ) -> Vec<RemovalReport> {
        let ids: Vec<AgentId> = self.agents.iter().map(|a| a.id).collect();
        ids.into_iter()
            .filter_map(|id| self.remove(id, reason, player, now, rng).ok())
            .collect()
    }

    // -------------------------------------------------------------------
    // Lifecycle
    // -------------------------------------------------------------------

    /// Release every blocked agent whose expiry `now` has reached.
    ///
    /// Returns the released ids.
    pub fn release_expired_blocks(&mut self, now: NaiveDateTime) -> Vec<AgentId> {
        self.agents
            .iter_mut()
            .filter_map(|a| a.release_if_due(now).then_some(a.id))
            .collect()
    }

    /// Run one world day for every agent: age, act, then collect removals.
    ///
    /// A failing agent is logged and reported; the rest still run.
    pub fn daily_update(
        &mut self,
        player: &mut PlayerState,
        now: NaiveDateTime,
        rng: &mut impl Rng,
    ) -> DailyAgentReport {
        let mut report = DailyAgentReport::default();
        let mut doomed = Vec::new();

        for agent in &mut self.agents {
            if agent.age_one_day(now) {
                report.evolved.push(agent.id);
            }
            match try_action(agent, player, rng) {
                Ok(Some(text)) => report.events.push((agent.id, text)),
                Ok(None) => {}
                Err(error) => {
                    warn!(agent = %agent.id, %error, "agent daily update failed");
                    report.failures.push(AgentFailure {
                        agent: agent.id,
                        error,
                    });
                }
            }
            if matches!(agent.status, AgentStatus::Compromised) {
                doomed.push(agent.id);
            }
        }

        for id in doomed {
            match self.remove(id, RemovalReason::Compromised, player, now, rng) {
                Ok(removal) => report.removals.push(removal),
                Err(error) => report.failures.push(AgentFailure { agent: id, error }),
            }
        }
        report
    }

    /// Give every unresolved agent a recon reveal roll and journal the hits.
    ///
    /// Returns the fingerprints resolved by this call.
    pub fn recon_sweep(
        &mut self,
        player: &mut PlayerState,
        now: NaiveDateTime,
        rng: &mut impl Rng,
    ) -> Vec<String> {
        let recon = player.effective_skills().recon;
        let mut resolved = Vec::new();
        for agent in &mut self.agents {
            if agent.try_recon_reveal(recon, rng) {
                record_fingerprint(player, agent, now);
                resolved.push(agent.visible_fingerprint().to_owned());
            }
        }
        resolved
    }

    /// Spawn an agent of a given kind directly. Convenience over
    /// [`Self::spawn`] for hosts and tests.
    pub fn spawn_kind(
        &mut self,
        kind: Option<AgentKind>,
        region: Option<RegionId>,
        ctx: SpawnContext<'_>,
        player: &PlayerState,
        rng: &mut impl Rng,
    ) -> Result<AgentId, AgentError> {
        let request = SpawnRequest {
            kind,
            region,
            cause: SpawnCause::Manual,
        };
        self.spawn(request, ctx, player, rng).map(|a| a.id)
    }
}

/// Add an agent to the player's fingerprint journal once it is visible.
pub fn record_fingerprint(player: &mut PlayerState, agent: &EnemyAgent, now: NaiveDateTime) {
    if !agent.fingerprint_revealed() {
        return;
    }
    player
        .known_fingerprints
        .entry(agent.visible_fingerprint().to_owned())
        .or_insert_with(|| FingerprintRecord {
            agent_uid: agent.short_uid.clone(),
            first_seen: now,
            level: agent.level,
            kind: agent.kind_revealed.then_some(agent.kind),
        });
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};
    use nightwire_types::RepAxis;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn t0() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2095, 11, 1)
            .unwrap()
            .and_hms_opt(8, 0, 0)
            .unwrap()
    }

    fn setup() -> (EnemyAgentDirectory, RegionRegistry, PlayerState, StdRng) {
        (
            EnemyAgentDirectory::new(),
            RegionRegistry::new(),
            PlayerState::new(1_000.0, 6),
            StdRng::seed_from_u64(99),
        )
    }

    #[test]
    fn spawn_assigns_roaming_region() {
        let (mut dir, regions, player, mut rng) = setup();
        let ctx = SpawnContext { day: 0, regions: &regions };
        let id = dir.spawn_kind(Some(AgentKind::Pirate), None, ctx, &player, &mut rng).unwrap();
        let agent = dir.get(id).unwrap();
        assert_eq!(agent.region, RegionId::Global);
        assert_eq!(agent.kind, AgentKind::Pirate);
        assert!(!agent.kind_revealed);
        assert_eq!(dir.len(), 1);
    }

    #[test]
    fn removal_pays_once_and_detaches() {
        let (mut dir, regions, mut player, mut rng) = setup();
        let ctx = SpawnContext { day: 3, regions: &regions };
        let id = dir
            .spawn_kind(Some(AgentKind::Hacktivist), Some(RegionId::Local), ctx, &player, &mut rng)
            .unwrap();
        let report = dir
            .remove(id, RemovalReason::Compromised, &mut player, t0(), &mut rng)
            .unwrap();
        assert!(dir.get(id).is_err());
        assert!(report.agent.fingerprint_revealed());
        assert!(report.agent.kind_revealed);
        let hx = player.reputation.get(RepAxis::Hacktivist);
        assert!((2..=5).contains(&hx));
        assert!(player.known_fingerprints.contains_key(report.agent.permanent_fingerprint()));

        let again = dir.remove(id, RemovalReason::Compromised, &mut player, t0(), &mut rng);
        assert!(matches!(again, Err(AgentError::AgentNotFound(_))));
        assert_eq!(player.reputation.get(RepAxis::Hacktivist), hx);
    }

    #[test]
    fn lost_track_pays_nothing() {
        let (mut dir, regions, mut player, mut rng) = setup();
        let ctx = SpawnContext { day: 0, regions: &regions };
        for _ in 0..3 {
            dir.spawn_kind(None, Some(RegionId::Local), ctx, &player, &mut rng).unwrap();
        }
        let reports = dir.remove_all(RemovalReason::LostTrack, &mut player, t0(), &mut rng);
        assert_eq!(reports.len(), 3);
        assert!(dir.is_empty());
        assert!(reports.iter().all(|r| r.reward.is_none()));
        assert_eq!(player.reputation.max_axis(), 0);
    }

    #[test]
    fn blocked_agents_do_not_interfere() {
        let (mut dir, regions, player, mut rng) = setup();
        let ctx = SpawnContext { day: 0, regions: &regions };
        let a = dir.spawn_kind(None, None, ctx, &player, &mut rng).unwrap();
        let _b = dir.spawn_kind(None, None, ctx, &player, &mut rng).unwrap();
        dir.get_mut(a).unwrap().block(t0() + Duration::hours(24));
        assert_eq!(dir.active_levels().len(), 1);

        assert!(dir.release_expired_blocks(t0() + Duration::hours(23)).is_empty());
        assert_eq!(dir.release_expired_blocks(t0() + Duration::hours(24)), vec![a]);
        assert_eq!(dir.active_levels().len(), 2);
    }

    #[test]
    fn stale_compromised_agent_is_collected_after_iteration() {
        let (mut dir, regions, mut player, mut rng) = setup();
        let ctx = SpawnContext { day: 0, regions: &regions };
        let a = dir.spawn_kind(Some(AgentKind::Federal), None, ctx, &player, &mut rng).unwrap();
        let b = dir.spawn_kind(Some(AgentKind::Generic), None, ctx, &player, &mut rng).unwrap();
        dir.get_mut(a).unwrap().compromise();

        let report = dir.daily_update(&mut player, t0(), &mut rng);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.removals.len(), 1);
        assert!(dir.get(a).is_err());
        assert!(dir.get(b).is_ok());
        assert_eq!(dir.get(b).unwrap().age_days, 1);
    }

    #[test]
    fn census_counts_unrevealed_as_generic() {
        let (mut dir, regions, player, mut rng) = setup();
        let ctx = SpawnContext { day: 0, regions: &regions };
        let a = dir.spawn_kind(Some(AgentKind::Pirate), None, ctx, &player, &mut rng).unwrap();
        dir.spawn_kind(Some(AgentKind::Federal), None, ctx, &player, &mut rng).unwrap();
        dir.get_mut(a).unwrap().kind_revealed = true;
        let census = dir.census();
        assert_eq!(census.pirate, 1);
        assert_eq!(census.generic, 1);
        assert_eq!(census.total(), 2);
    }

    #[test]
    fn identifier_lookup() {
        let (mut dir, regions, player, mut rng) = setup();
        let ctx = SpawnContext { day: 0, regions: &regions };
        let id = dir.spawn_kind(None, None, ctx, &player, &mut rng).unwrap();
        let uid = dir.get(id).unwrap().short_uid.clone();
        assert_eq!(dir.find_by_identifier(&format!("ai:{uid}")).unwrap(), id);
        assert!(matches!(
            dir.find_by_identifier("fp:000000000000"),
            Err(AgentError::UnknownIdentifier(_))
        ));
    }
}
