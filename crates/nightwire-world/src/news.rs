//! Regional news feed.
//!
//! Headlines are derived entirely from current state: pressure bands, the
//! adversary census, the player's notoriety, and how long the world has been
//! running.

use nightwire_types::{AgentKind, RegionId, RepAxis, ReputationLedger};

use crate::error::WorldError;
use crate::regions::RegionRegistry;

/// Adversary counts as the public sees them.
///
/// Agents whose kind has not been revealed are counted as [`AgentKind::Generic`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AgentCensus {
    /// Unrevealed or generic agents.
    pub generic: u32,
    /// Revealed pirates.
    pub pirate: u32,
    /// Revealed federal units.
    pub federal: u32,
    /// Revealed hacktivist cells.
    pub hacktivist: u32,
}

impl AgentCensus {
    /// Count one agent under its visible kind.
    pub const fn record(&mut self, visible: AgentKind) {
        let slot = match visible {
            AgentKind::Generic => &mut self.generic,
            AgentKind::Pirate => &mut self.pirate,
            AgentKind::Federal => &mut self.federal,
            AgentKind::Hacktivist => &mut self.hacktivist,
        };
        *slot = slot.saturating_add(1);
    }

    /// Total agents counted.
    pub const fn total(&self) -> u32 {
        self.generic
            .saturating_add(self.pirate)
            .saturating_add(self.federal)
            .saturating_add(self.hacktivist)
    }
}

fn banded(value: i32, high: i32, mid: i32, lines: [&str; 3]) -> &str {
    let [hi, md, lo] = lines;
    if value > high {
        hi
    } else if value > mid {
        md
    } else {
        lo
    }
}

/// Build the headline list for a region.
pub fn region_news(
    regions: &RegionRegistry,
    region: RegionId,
    census: &AgentCensus,
    reputation: &ReputationLedger,
    day: u32,
) -> Result<Vec<String>, WorldError> {
    let meta = regions.get(region)?;
    let p = meta.pressure;
    let mut out = Vec::new();
    let mut line = |text: &str| out.push(format!("[{region}] {text}"));

    line(banded(p.crime, 10, 5, [
        "Organised crime is expanding; routes and markets under pressure.",
        "Criminal activity above average; citizens and businesses on alert.",
        "Criminal activity stable, no major outbreaks reported.",
    ]));
    line(banded(p.state, 10, 5, [
        "State agencies step up digital operations; investigation protocols widened.",
        "Heavier state presence around critical infrastructure.",
        "State activity at routine levels.",
    ]));
    line(banded(p.hacktivist, 10, 4, [
        "Organised digital movements run high-impact campaigns; local networks swayed.",
        "Security communities publish public audit tools and guides.",
        "Hacktivist activity quiet, focused on research and disclosure.",
    ]));

    let total = census.total();
    if total > 0 {
        line(&format!("Analysts report {total} suspected autonomous agents on the mesh."));
        if census.pirate > 0 {
            line(&format!("{} possible 'Pirate' agents active (unconfirmed).", census.pirate));
        }
        if census.federal > 0 {
            line(&format!("{} agents showing 'Federal' behaviour (aggressive monitoring).", census.federal));
        }
        if census.hacktivist > 0 {
            line(&format!("{} operations attributed to digital collectives.", census.hacktivist));
        }
    }

    if reputation.get(RepAxis::Hacktivist) > 10 {
        line("Pro-transparency operations are rising. Analysts hunt anonymous authors.");
    }
    if reputation.get(RepAxis::Crime) > 12 {
        line("Police sources track an operator with a criminal record across regions.");
    }

    if day > 60 {
        line("Researchers detect anomalous patterns on the mesh: signs of an unexplained distributed entity.");
    }
    if day > 120 {
        line("Public debate over a possible 'Singularity' gains traction; scientists on alert.");
    }
    if day > 200 {
        line("Observers report repeated self-aware behaviour on the network. Investigations ongoing.");
    }

    if p.crime >= 15 {
        line("Headline: 'Collapse in criminal districts; emergency measures considered.'");
    }
    if p.state >= 15 {
        line("Headline: 'State widens digital powers; civil liberties debate erupts.'");
    }
    if p.hacktivist >= 15 {
        line("Headline: 'Digital collectives coordinate major leaks and campaigns.'");
    }

    Ok(out)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn quiet_start_has_three_baseline_lines() {
        let regions = RegionRegistry::new();
        let news = region_news(
            &regions,
            RegionId::Local,
            &AgentCensus::default(),
            &ReputationLedger::new(),
            1,
        )
        .unwrap();
        assert_eq!(news.len(), 3);
        assert!(news.iter().all(|l| l.starts_with("[Local]")));
    }

    #[test]
    fn census_and_notoriety_add_lines() {
        let regions = RegionRegistry::new();
        let mut census = AgentCensus::default();
        census.record(AgentKind::Generic);
        census.record(AgentKind::Federal);
        let rep = ReputationLedger::with_values(0, 13, 11);
        let news = region_news(&regions, RegionId::Europe, &census, &rep, 130).unwrap();
        assert!(news.iter().any(|l| l.contains("2 suspected")));
        assert!(news.iter().any(|l| l.contains("'Federal'")));
        assert!(news.iter().any(|l| l.contains("criminal record")));
        assert!(news.iter().any(|l| l.contains("Singularity")));
        assert!(!news.iter().any(|l| l.contains("self-aware")));
    }
}
