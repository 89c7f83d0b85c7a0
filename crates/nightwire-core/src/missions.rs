//! Reputation-gated story missions.
//!
//! Missions form four chains (hacktivist, crime, state, singularity). A node
//! is eligible when every `all_of` requirement holds and, if it declares any
//! `any_of` blocks, at least one block holds in full. Availability is
//! recomputed from scratch against the player's reputation whenever it may
//! have changed.
//!
//! # Invariants
//!
//! - A completed mission is never available again.
//! - A successor link is informational only. It does not unlock anything;
//!   the successor still needs its own reputation predicate.
//! - The table is validated once at construction: ids are unique, every
//!   successor resolves, every `any_of` block is non-empty, and every
//!   threshold is positive.

use std::collections::BTreeSet;

use nightwire_types::{PlayerState, RepAxis, ReputationLedger, Skill};
use serde::Serialize;
use tracing::info;

/// Errors found while validating a mission table.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MissionTableError {
    /// Two nodes share an id.
    #[error("duplicate mission id: {0}")]
    DuplicateId(String),

    /// A successor id names no node.
    #[error("mission {id} links to unknown successor {next}")]
    DanglingSuccessor {
        /// The linking node.
        id: String,
        /// The missing successor.
        next: String,
    },

    /// An `any_of` block has no requirements.
    #[error("mission {id} has an empty alternative requirement block")]
    EmptyAlternative {
        /// The offending node.
        id: String,
    },

    /// A requirement threshold is zero.
    #[error("mission {id} has a zero threshold on {axis}")]
    ZeroThreshold {
        /// The offending node.
        id: String,
        /// The axis with the zero threshold.
        axis: RepAxis,
    },
}

/// One reputation requirement: `axis >= min`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Requirement {
    /// Axis checked.
    pub axis: RepAxis,
    /// Minimum standing.
    pub min: u32,
}

impl Requirement {
    /// Shorthand constructor for table literals.
    pub const fn new(axis: RepAxis, min: u32) -> Self {
        Self { axis, min }
    }

    /// Whether the ledger satisfies this requirement.
    pub const fn met(&self, reputation: &ReputationLedger) -> bool {
        reputation.get(self.axis) >= self.min
    }
}

/// What completing a mission pays and what attempting it costs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MissionPayload {
    /// Display title.
    pub title: &'static str,
    /// Cash paid on success.
    pub money: f64,
    /// Skill increments on success.
    pub skills: &'static [(Skill, f64)],
    /// Focus change: applied on success, and also on failure.
    pub focus: f64,
    /// Crime reputation delta.
    pub crime: i64,
    /// State reputation delta.
    pub state: i64,
    /// Hacktivist reputation delta.
    pub hacktivist: i64,
    /// Security of the stand-in target.
    pub base_security: u32,
    /// Trace speed of the stand-in target.
    pub trace_speed: f64,
    /// Total hours the operation is planned to take.
    pub hours: u32,
}

/// A node in the mission graph.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MissionNode {
    /// Stable id, e.g. `hx_m1`.
    pub id: &'static str,
    /// Requirements that must all hold.
    pub all_of: &'static [Requirement],
    /// Alternative blocks; when non-empty, at least one must hold in full.
    pub any_of: &'static [&'static [Requirement]],
    /// Next mission in the chain, for display.
    pub next: Option<&'static str>,
    /// Reward and stand-in target parameters.
    pub payload: MissionPayload,
}

impl MissionNode {
    /// Whether the node's reputation predicate holds.
    pub fn is_eligible(&self, reputation: &ReputationLedger) -> bool {
        let all = self.all_of.iter().all(|r| r.met(reputation));
        let any = self.any_of.is_empty()
            || self
                .any_of
                .iter()
                .any(|block| block.iter().all(|r| r.met(reputation)));
        all && any
    }
}

/// Changes produced by one availability sync.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MissionSync {
    /// Ids that became available.
    pub unlocked: Vec<String>,
    /// Ids that stopped being available.
    pub removed: Vec<String>,
}

impl MissionSync {
    /// Whether nothing changed.
    pub fn is_empty(&self) -> bool {
        self.unlocked.is_empty() && self.removed.is_empty()
    }
}

/// The validated mission table.
#[derive(Debug, Clone)]
pub struct MissionUnlockGraph {
    nodes: Vec<MissionNode>,
}

impl MissionUnlockGraph {
    /// Build the graph from [`MISSION_TABLE`].
    pub fn new() -> Result<Self, MissionTableError> {
        Self::from_nodes(MISSION_TABLE.to_vec())
    }

    /// Build a graph from arbitrary nodes, validating them.
    pub fn from_nodes(nodes: Vec<MissionNode>) -> Result<Self, MissionTableError> {
        let mut ids = BTreeSet::new();
        for node in &nodes {
            if !ids.insert(node.id) {
                return Err(MissionTableError::DuplicateId(node.id.to_owned()));
            }
        }
        for node in &nodes {
            if let Some(next) = node.next
                && !ids.contains(next)
            {
                return Err(MissionTableError::DanglingSuccessor {
                    id: node.id.to_owned(),
                    next: next.to_owned(),
                });
            }
            if node.any_of.iter().any(|block| block.is_empty()) {
                return Err(MissionTableError::EmptyAlternative {
                    id: node.id.to_owned(),
                });
            }
            let mut every = node.all_of.iter().chain(node.any_of.iter().flat_map(|b| b.iter()));
            if let Some(zero) = every.find(|r| r.min == 0) {
                return Err(MissionTableError::ZeroThreshold {
                    id: node.id.to_owned(),
                    axis: zero.axis,
                });
            }
        }
        Ok(Self { nodes })
    }

    /// Look up a node.
    pub fn get(&self, id: &str) -> Option<&MissionNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// All nodes in table order.
    pub fn nodes(&self) -> &[MissionNode] {
        &self.nodes
    }

    /// Ids eligible under `reputation`, completed ones excluded.
    pub fn eligible(&self, reputation: &ReputationLedger, completed: &BTreeSet<String>) -> BTreeSet<String> {
        self.nodes
            .iter()
            .filter(|n| !completed.contains(n.id) && n.is_eligible(reputation))
            .map(|n| n.id.to_owned())
            .collect()
    }

    /// Recompute the player's available set and report what changed.
    pub fn sync(&self, player: &mut PlayerState) -> MissionSync {
        let next = self.eligible(&player.reputation, &player.missions_completed);
        let unlocked: Vec<String> = next
            .difference(&player.missions_available)
            .cloned()
            .collect();
        let removed: Vec<String> = player
            .missions_available
            .difference(&next)
            .cloned()
            .collect();
        for id in &unlocked {
            info!(mission = %id, "mission available");
        }
        for id in &removed {
            info!(mission = %id, "mission withdrawn");
        }
        player.missions_available = next;
        MissionSync { unlocked, removed }
    }

    /// Move a mission from available to completed. Returns `false` when it
    /// was not available.
    pub fn complete(player: &mut PlayerState, id: &str) -> bool {
        if !player.missions_available.remove(id) {
            return false;
        }
        player.missions_completed.insert(id.to_owned());
        info!(mission = %id, "mission completed");
        true
    }

    /// Complete `node` and pay out its reward.
    ///
    /// The payload is applied only when the mission was still available, so
    /// a mission pays at most once per run. Returns whether it paid.
    pub fn settle(player: &mut PlayerState, node: &MissionNode) -> bool {
        if !Self::complete(player, node.id) {
            return false;
        }
        let payload = &node.payload;
        player.money += payload.money;
        for &(skill, delta) in payload.skills {
            player.skills.add(skill, delta);
        }
        player.adjust_focus(payload.focus);
        player.reputation.adjust(RepAxis::Crime, payload.crime);
        player.reputation.adjust(RepAxis::State, payload.state);
        player.reputation.adjust(RepAxis::Hacktivist, payload.hacktivist);
        true
    }
}

// ---------------------------------------------------------------------------
// Static table
// ---------------------------------------------------------------------------

use RepAxis::{Crime, Hacktivist, State};
use Skill::{Exploit, Recon, Stealth};

const fn hx(min: u32) -> Requirement {
    Requirement::new(Hacktivist, min)
}
const fn cr(min: u32) -> Requirement {
    Requirement::new(Crime, min)
}
const fn st(min: u32) -> Requirement {
    Requirement::new(State, min)
}

/// Build a payload literal. Deltas are `(crime, state, hacktivist)`.
#[allow(clippy::too_many_arguments)]
const fn payload(
    title: &'static str,
    money: f64,
    skills: &'static [(Skill, f64)],
    focus: f64,
    (crime, state, hacktivist): (i64, i64, i64),
    base_security: u32,
    trace_speed: f64,
    hours: u32,
) -> MissionPayload {
    MissionPayload {
        title,
        money,
        skills,
        focus,
        crime,
        state,
        hacktivist,
        base_security,
        trace_speed,
        hours,
    }
}

/// The built-in mission table.
pub const MISSION_TABLE: [MissionNode; 23] = [
    // ----- Hacktivist chain -----
    MissionNode {
        id: "hx_m1",
        all_of: &[hx(6)],
        any_of: &[],
        next: Some("hx_m2"),
        payload: payload("Files That Do Not Exist", 0.0, &[(Exploit, 4.0), (Stealth, 3.0)], 3.0, (1, -3, 3), 9, 1.4, 8),
    },
    MissionNode {
        id: "hx_m2",
        all_of: &[hx(10)],
        any_of: &[],
        next: Some("hx_m3"),
        payload: payload("The Wall of Lies", 0.0, &[(Exploit, 6.0), (Stealth, 4.0)], 5.0, (2, -4, 4), 12, 1.8, 12),
    },
    MissionNode {
        id: "hx_m3",
        all_of: &[hx(14)],
        any_of: &[],
        next: Some("hx_m4"),
        payload: payload("Purge in Silence", 20_000.0, &[(Recon, 5.0), (Exploit, 10.0)], -15.0, (3, -5, 5), 18, 2.0, 16),
    },
    MissionNode {
        id: "hx_m4",
        all_of: &[hx(19)],
        any_of: &[],
        next: Some("hx_m5"),
        payload: payload("Echo of the Void", 15_000.0, &[(Exploit, 8.0), (Stealth, 6.0)], -5.0, (2, -5, 6), 22, 2.2, 14),
    },
    MissionNode {
        id: "hx_m5",
        all_of: &[hx(25)],
        any_of: &[],
        next: Some("hx_m6"),
        payload: payload("Anatomy of Absolute Fear", 25_000.0, &[(Exploit, 10.0), (Recon, 6.0)], -12.0, (3, -6, 7), 26, 2.5, 18),
    },
    MissionNode {
        id: "hx_m6",
        all_of: &[hx(33)],
        any_of: &[],
        next: None,
        payload: payload("The Last Flame", 60_000.0, &[(Exploit, 14.0), (Stealth, 10.0), (Recon, 10.0)], -20.0, (4, -7, 9), 30, 3.0, 26),
    },
    // ----- Crime chain -----
    MissionNode {
        id: "cr_m1",
        all_of: &[cr(9)],
        any_of: &[],
        next: Some("cr_m2"),
        payload: payload("Leech Swarm", 5_000.0, &[(Exploit, 3.0)], -10.0, (3, -1, 0), 7, 1.2, 10),
    },
    MissionNode {
        id: "cr_m2",
        all_of: &[cr(15)],
        any_of: &[],
        next: Some("cr_m3"),
        payload: payload("Autonomous Puppets", 12_000.0, &[(Exploit, 6.0), (Stealth, 2.0)], -3.0, (4, -2, 0), 11, 1.6, 14),
    },
    MissionNode {
        id: "cr_m3",
        all_of: &[cr(21)],
        any_of: &[],
        next: Some("cr_m4"),
        payload: payload("Knot of the Serpent", 35_000.0, &[(Exploit, 12.0)], -20.0, (6, -4, 0), 20, 2.2, 20),
    },
    MissionNode {
        id: "cr_m4",
        all_of: &[cr(28)],
        any_of: &[],
        next: Some("cr_m5"),
        payload: payload("Black Market Specter", 20_000.0, &[(Exploit, 8.0)], -15.0, (6, -4, 0), 24, 2.3, 16),
    },
    MissionNode {
        id: "cr_m5",
        all_of: &[cr(36)],
        any_of: &[],
        next: Some("cr_m6"),
        payload: payload("The Bleeding Code", 35_000.0, &[(Exploit, 12.0), (Stealth, 4.0)], -25.0, (8, -5, 0), 28, 2.7, 22),
    },
    MissionNode {
        id: "cr_m6",
        all_of: &[cr(45)],
        any_of: &[],
        next: None,
        payload: payload("Feast of the Forgotten", 90_000.0, &[(Exploit, 16.0), (Recon, 8.0)], -35.0, (12, -8, 0), 32, 3.2, 30),
    },
    // ----- State chain -----
    MissionNode {
        id: "st_m1",
        all_of: &[st(16)],
        any_of: &[],
        next: Some("st_m2"),
        payload: payload("Ghost Contract", 9_000.0, &[(Stealth, 2.0), (Exploit, 2.0)], 5.0, (-2, 3, -3), 8, 1.0, 6),
    },
    MissionNode {
        id: "st_m2",
        all_of: &[st(22)],
        any_of: &[],
        next: Some("st_m3"),
        payload: payload("Cold Aegis", 15_000.0, &[(Stealth, 4.0), (Recon, 4.0)], 10.0, (-3, 4, -3), 13, 1.5, 10),
    },
    MissionNode {
        id: "st_m3",
        all_of: &[st(29)],
        any_of: &[],
        next: Some("st_m4"),
        payload: payload("Digital Purification", 45_000.0, &[(Stealth, 8.0), (Recon, 6.0)], 15.0, (-4, 5, -4), 21, 2.0, 18),
    },
    MissionNode {
        id: "st_m4",
        all_of: &[st(38)],
        any_of: &[],
        next: Some("st_m5"),
        payload: payload("Project Ascension", 20_000.0, &[(Recon, 6.0), (Stealth, 3.0)], 10.0, (-3, 4, -4), 23, 1.8, 14),
    },
    MissionNode {
        id: "st_m5",
        all_of: &[st(46)],
        any_of: &[],
        next: Some("st_m6"),
        payload: payload("Programmed Silence", 45_000.0, &[(Recon, 8.0), (Stealth, 6.0)], 12.0, (-4, 8, -6), 27, 2.2, 18),
    },
    MissionNode {
        id: "st_m6",
        all_of: &[st(54)],
        any_of: &[],
        next: None,
        payload: payload("Memory of Tomorrow", 120_000.0, &[(Stealth, 10.0), (Recon, 12.0)], 20.0, (-7, 12, -9), 34, 3.0, 28),
    },
    // ----- Singularity chain -----
    MissionNode {
        id: "sg_m1",
        all_of: &[hx(33)],
        any_of: &[],
        next: Some("sg_m2"),
        payload: payload("Trail Without a Shadow", 0.0, &[(Recon, 6.0), (Exploit, 8.0)], -10.0, (2, -4, 5), 40, 3.5, 22),
    },
    MissionNode {
        id: "sg_m2",
        all_of: &[hx(40)],
        any_of: &[&[cr(52)]],
        next: Some("sg_m3"),
        payload: payload("The Abyss Breathes", 25_000.0, &[(Exploit, 10.0), (Stealth, 6.0)], -18.0, (4, -6, 6), 46, 3.8, 26),
    },
    MissionNode {
        id: "sg_m3",
        all_of: &[hx(49)],
        any_of: &[&[st(37)], &[cr(52)]],
        next: Some("sg_m4"),
        payload: payload("Cold Moon, Hot Thought", 50_000.0, &[(Recon, 14.0), (Exploit, 12.0)], -20.0, (6, -8, 7), 52, 4.2, 32),
    },
    MissionNode {
        id: "sg_m4",
        all_of: &[hx(61)],
        any_of: &[&[cr(67)]],
        next: Some("sg_m5"),
        payload: payload("Corridor Between Stars", 80_000.0, &[(Recon, 18.0), (Stealth, 10.0), (Exploit, 16.0)], -25.0, (8, -10, 10), 58, 4.8, 40),
    },
    MissionNode {
        id: "sg_m5",
        all_of: &[hx(72)],
        any_of: &[&[st(47), cr(47)], &[cr(80)], &[st(77)]],
        next: None,
        payload: payload("First Whisper of the End", 150_000.0, &[(Exploit, 22.0), (Stealth, 14.0), (Recon, 20.0)], -40.0, (10, -12, 14), 65, 5.6, 48),
    },
];
