//! Enumeration types for the Nightwire simulation.
//!
//! Every closed set the simulation branches on lives here: reputation axes,
//! adversary kinds and lifecycle, regions, skills, inventory items, and asset
//! kinds. Hosts parse player input into these with [`FromStr`].

use core::fmt;
use core::str::FromStr;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Returned when a string does not name a known variant.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind}: {value}")]
pub struct ParseEnumError {
    /// Which enumeration was being parsed.
    pub kind: &'static str,
    /// The rejected input.
    pub value: String,
}

impl ParseEnumError {
    fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_owned(),
        }
    }
}

// ---------------------------------------------------------------------------
// Reputation
// ---------------------------------------------------------------------------

/// One of the three independent standing counters on the player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RepAxis {
    /// Standing with state-aligned actors.
    State,
    /// Standing with organised crime.
    Crime,
    /// Standing with hacktivist collectives.
    Hacktivist,
}

impl RepAxis {
    /// All axes in display order.
    pub const ALL: [Self; 3] = [Self::State, Self::Crime, Self::Hacktivist];

    /// Short lowercase label used in reports and mission tables.
    pub const fn label(self) -> &'static str {
        match self {
            Self::State => "state",
            Self::Crime => "crime",
            Self::Hacktivist => "hacktivists",
        }
    }
}

impl fmt::Display for RepAxis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for RepAxis {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "state" => Ok(Self::State),
            "crime" => Ok(Self::Crime),
            "hx" | "hacktivist" | "hacktivists" => Ok(Self::Hacktivist),
            _ => Err(ParseEnumError::new("reputation axis", s)),
        }
    }
}

// ---------------------------------------------------------------------------
// Adversaries
// ---------------------------------------------------------------------------

/// The behaviour family of an adversary agent.
///
/// Hidden from the player until the agent is revealed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AgentKind {
    /// Unaligned automation; blends tracing with asset attacks.
    Generic,
    /// Data pirates; prey on the player's assets.
    Pirate,
    /// Federal cyber units; trace hard and levy fines.
    Federal,
    /// Rival hacktivists; leak intel or make noise.
    Hacktivist,
}

impl AgentKind {
    /// Every kind, in a fixed order for uniform picks.
    pub const ALL: [Self; 4] = [Self::Generic, Self::Pirate, Self::Federal, Self::Hacktivist];

    /// Display label.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Generic => "Generic",
            Self::Pirate => "Pirate",
            Self::Federal => "Federal",
            Self::Hacktivist => "Hacktivist",
        }
    }
}

impl fmt::Display for AgentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Lifecycle state of an adversary agent.
///
/// `Compromised` is terminal. A compromised agent is detached from the
/// directory in the same operation that compromises it, so it never appears
/// in a listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AgentStatus {
    /// Operating normally.
    Active,
    /// Knocked offline until the given simulated time.
    Blocked {
        /// The instant the agent comes back online.
        until: NaiveDateTime,
    },
    /// Permanently removed.
    Compromised,
}

impl AgentStatus {
    /// Short label for listings.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Blocked { .. } => "blocked",
            Self::Compromised => "compromised",
        }
    }

    /// Whether the agent counts toward hack interference and may act.
    pub const fn is_active(self) -> bool {
        matches!(self, Self::Active)
    }
}

/// Why an agent left the directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RemovalReason {
    /// Removed by a successful hack; the lower reward path.
    Compromised,
    /// Removed by a critical hack; the higher reward path.
    CriticallyCompromised,
    /// The player travelled clandestinely and the agent lost the trail.
    LostTrack,
}

impl RemovalReason {
    /// Whether this removal pays a reward.
    pub const fn is_rewarded(self) -> bool {
        !matches!(self, Self::LostTrack)
    }

    /// Whether the critical reward bonus applies.
    pub const fn is_critical(self) -> bool {
        matches!(self, Self::CriticallyCompromised)
    }
}

// ---------------------------------------------------------------------------
// Geography
// ---------------------------------------------------------------------------

/// A region of the world map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RegionId {
    /// The player's starting city.
    Local,
    /// South American networks.
    SouthAmerica,
    /// European networks.
    Europe,
    /// Asian networks.
    Asia,
    /// The global backbone.
    Global,
}

impl RegionId {
    /// All regions in unlock order.
    pub const ALL: [Self; 5] = [
        Self::Local,
        Self::SouthAmerica,
        Self::Europe,
        Self::Asia,
        Self::Global,
    ];

    /// Display name.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Local => "Local",
            Self::SouthAmerica => "SouthAmerica",
            Self::Europe => "Europe",
            Self::Asia => "Asia",
            Self::Global => "Global",
        }
    }
}

impl fmt::Display for RegionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for RegionId {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|r| r.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| ParseEnumError::new("region", s))
    }
}

/// How the player moves between regions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TravelMode {
    /// Commercial travel: cheap, slow, small risk drop.
    Normal,
    /// Off-the-books travel: expensive, shakes off trackers.
    Clandestine,
}

// ---------------------------------------------------------------------------
// Player capabilities
// ---------------------------------------------------------------------------

/// One of the player's three skills.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Skill {
    /// Finding and profiling targets.
    Recon,
    /// Breaking in.
    Exploit,
    /// Not getting caught.
    Stealth,
}

impl Skill {
    /// All skills in display order.
    pub const ALL: [Self; 3] = [Self::Recon, Self::Exploit, Self::Stealth];

    /// Lowercase label.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Recon => "recon",
            Self::Exploit => "exploit",
            Self::Stealth => "stealth",
        }
    }
}

impl fmt::Display for Skill {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Skill {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|k| k.label().eq_ignore_ascii_case(s))
            .ok_or_else(|| ParseEnumError::new("skill", s))
    }
}

/// A carried inventory item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Item {
    /// Pocket computer: exploit buff.
    Raspberry,
    /// Proxy chain bundle: stealth buff, sheds risk after hacks.
    ProxyPack,
    /// Crawler bundle: recon buff.
    CrawlerPack,
    /// Self-propagating worm: flat hack-chance bonus.
    BotnetWorm,
}

impl Item {
    /// The skill buff the item grants while held, if any.
    pub const fn buff(self) -> Option<(Skill, f64)> {
        match self {
            Self::Raspberry => Some((Skill::Exploit, 5.0)),
            Self::ProxyPack => Some((Skill::Stealth, 5.0)),
            Self::CrawlerPack => Some((Skill::Recon, 6.0)),
            Self::BotnetWorm => None,
        }
    }

    /// Inventory label.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Raspberry => "raspberry",
            Self::ProxyPack => "proxy_pack",
            Self::CrawlerPack => "crawler_pack",
            Self::BotnetWorm => "botnet_worm",
        }
    }
}

impl fmt::Display for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// An income-producing installation owned by the player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AssetKind {
    /// Rented botnet; periodically sharpens exploit skill.
    BotnetWorm,
    /// Resold VPN endpoints.
    Vpn,
    /// A rack of compromised servers.
    Rack,
    /// A whole datacenter.
    Datacenter,
    /// Honeypot-as-a-service; periodically reports honeypots in the pool.
    HoneypotApi,
}

impl AssetKind {
    /// Base income per day for a freshly installed asset.
    pub const fn base_income(self) -> f64 {
        match self {
            Self::BotnetWorm => 30.0,
            Self::Rack => 100.0,
            Self::Datacenter => 400.0,
            Self::Vpn | Self::HoneypotApi => 0.0,
        }
    }

    /// Display label.
    pub const fn label(self) -> &'static str {
        match self {
            Self::BotnetWorm => "botnet_worm",
            Self::Vpn => "vpn",
            Self::Rack => "rack",
            Self::Datacenter => "datacenter",
            Self::HoneypotApi => "honeypot_api",
        }
    }
}

impl fmt::Display for AssetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn region_parse_is_case_insensitive() {
        assert_eq!("europe".parse::<RegionId>().unwrap(), RegionId::Europe);
        assert_eq!("SouthAmerica".parse::<RegionId>().unwrap(), RegionId::SouthAmerica);
        assert!("Atlantis".parse::<RegionId>().is_err());
    }

    #[test]
    fn axis_accepts_short_hx() {
        assert_eq!("hx".parse::<RepAxis>().unwrap(), RepAxis::Hacktivist);
        let err = "piracy".parse::<RepAxis>().unwrap_err();
        assert_eq!(err.kind, "reputation axis");
    }

    #[test]
    fn only_lost_track_is_unrewarded() {
        assert!(RemovalReason::Compromised.is_rewarded());
        assert!(RemovalReason::CriticallyCompromised.is_critical());
        assert!(!RemovalReason::LostTrack.is_rewarded());
    }

    #[test]
    fn botnet_item_has_no_skill_buff() {
        assert!(Item::BotnetWorm.buff().is_none());
        assert_eq!(Item::CrawlerPack.buff(), Some((Skill::Recon, 6.0)));
    }
}
