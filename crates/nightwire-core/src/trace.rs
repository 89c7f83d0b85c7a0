//! Post-detection trace resolution: fine, evasion, or incarceration.
//!
//! Every detection raises risk, bumps the recidivism counter kept for the
//! traced subject, and shifts reputation toward crime. Capture probability
//! grows with risk and with repeated detections of the same subject, and is
//! damped by stealth.

use chrono::{Duration, NaiveDateTime};
use nightwire_types::{AttackMemory, PlayerState, TraceSubject, round2};
use rand::Rng;
use serde::Serialize;
use tracing::{debug, info};

/// Cap on the recidivism bonus.
const RECIDIVISM_CAP: f64 = 0.75;
/// Recidivism bonus per detection.
const RECIDIVISM_STEP: f64 = 0.15;

/// What the trace did to the player.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum TraceVerdict {
    /// Captured and unable to pay: jailed until the given time.
    Jailed {
        /// Release time.
        until: NaiveDateTime,
        /// Sentence length in hours.
        hours: u32,
    },
    /// Captured and paid the fine.
    Fined {
        /// Amount paid.
        amount: f64,
    },
    /// Slipped away at a cost.
    Evaded {
        /// Amount actually paid (capped by cash on hand).
        paid: f64,
    },
}

/// Full outcome of one trace.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TraceOutcome {
    /// Immediate risk added by the trace.
    pub risk_increase: f64,
    /// Detections recorded against this subject, including this one.
    pub detections: u32,
    /// Probability of capture that was rolled against.
    pub capture_probability: f64,
    /// Result of the capture roll.
    pub verdict: TraceVerdict,
    /// Human-readable summary.
    pub message: String,
}

impl TraceOutcome {
    /// Whether the player ended up in jail.
    pub const fn jailed(&self) -> bool {
        matches!(self.verdict, TraceVerdict::Jailed { .. })
    }
}

/// Parameters of whatever was being attacked when detection happened.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct TraceSource {
    /// Identity keyed in the attack memory.
    pub subject: TraceSubject,
    /// Security of the target or agent proxy.
    pub security: u32,
}

/// `1 + min(0.75, detections * 0.15)`.
pub fn recidivism_factor(detections: u32) -> f64 {
    1.0 + (f64::from(detections) * RECIDIVISM_STEP).min(RECIDIVISM_CAP)
}

/// Capture probability for the given risk, stealth, and detection count.
///
/// `(0.05 + risk / 100) * (1 - min(0.4, stealth / 250)) * recidivism`,
/// capped at 1.
pub fn capture_probability(risk: f64, stealth: f64, detections: u32) -> f64 {
    let stealth_reduction = (stealth / 250.0).min(0.4);
    ((0.05 + risk / 100.0) * (1.0 - stealth_reduction) * recidivism_factor(detections))
        .clamp(0.0, 1.0)
}

/// Resolve a detection against `source`.
///
/// `now` anchors the jail sentence. The fixed `crime +1 / state -1` shift is
/// applied whatever the verdict.
pub fn apply_trace(
    player: &mut PlayerState,
    source: &TraceSource,
    trace_speed: f64,
    now: NaiveDateTime,
    rng: &mut impl Rng,
) -> TraceOutcome {
    let risk_increase = rng.random_range(4.0..11.0) * trace_speed;
    player.adjust_risk(risk_increase);

    let memory = player
        .attack_memory
        .entry(source.subject.clone())
        .or_insert_with(AttackMemory::default);
    memory.detections = memory.detections.saturating_add(1);
    let detections = memory.detections;
    let recidivism = recidivism_factor(detections);

    let stealth = player.effective_skills().stealth;
    let capture = capture_probability(player.risk(), stealth, detections);
    let captured = rng.random::<f64>() < capture;
    player.reputation.criminal_shift();
    debug!(subject = ?source.subject, detections, capture, captured, "trace rolled");

    let security = f64::from(source.security);
    let verdict = if captured {
        let base = (player.risk() * security).mul_add(rng.random_range(0.5..1.2), 300.0);
        let factor = (1.0 - (stealth / 300.0).min(0.3)) * recidivism;
        let fine = round2(base * factor);
        if player.can_afford(fine) {
            player.money -= fine;
            player.adjust_risk(-(10.0 + security));
            TraceVerdict::Fined { amount: fine }
        } else {
            let hours = rng.random_range(24..=120);
            let until = now
                .checked_add_signed(Duration::hours(i64::from(hours)))
                .unwrap_or(NaiveDateTime::MAX);
            player.jailed_until = Some(until);
            player.set_risk(0.0);
            info!(%until, hours, fine, "player incarcerated");
            TraceVerdict::Jailed { until, hours }
        }
    } else {
        let base = player.risk().mul_add(0.1f64.mul_add(trace_speed, 0.2), 30.0);
        let factor = (1.0 - (stealth / 400.0).min(0.25))
            * f64::from(detections.saturating_sub(1)).mul_add(0.08, 1.0);
        let paid = player.pay_capped(round2(base * factor));
        TraceVerdict::Evaded { paid }
    };

    let message = match verdict {
        TraceVerdict::Jailed { hours, .. } => {
            format!("Trace complete. You were captured and jailed for {hours} hours.")
        }
        TraceVerdict::Fined { amount } => format!(
            "You were fined ${amount:.2} and escaped prison. Risk now {:.1}%. Reputation: crime +1, state -1.",
            player.risk()
        ),
        TraceVerdict::Evaded { paid } => format!(
            "Trace detected. Evasion cost ${paid:.2}. Risk now {:.1}%. Reputation: crime +1, state -1.",
            player.risk()
        ),
    };

    TraceOutcome {
        risk_increase,
        detections,
        capture_probability: capture,
        verdict,
        message,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use nightwire_types::{RepAxis, ReputationLedger, TargetId};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2095, 11, 1)
            .unwrap()
            .and_hms_opt(8, 0, 0)
            .unwrap()
    }

    fn source(id: u32, security: u32) -> TraceSource {
        TraceSource {
            subject: TraceSubject::Target(TargetId(id)),
            security,
        }
    }

    #[test]
    fn capture_probability_non_decreasing_in_detections() {
        for risk in [0.0, 20.0, 55.0, 100.0] {
            for stealth in [0.0, 10.0, 120.0] {
                let mut last = 0.0;
                for detections in 0..20 {
                    let p = capture_probability(risk, stealth, detections);
                    assert!(p >= last);
                    assert!((0.0..=1.0).contains(&p));
                    last = p;
                }
            }
        }
    }

    #[test]
    fn recidivism_saturates() {
        assert!((recidivism_factor(1) - 1.15).abs() < 1e-12);
        assert!((recidivism_factor(5) - 1.75).abs() < 1e-12);
        assert!((recidivism_factor(50) - 1.75).abs() < 1e-12);
    }

    #[test]
    fn broke_and_captured_goes_to_jail() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut jailed = false;
        for _ in 0..50 {
            let mut p = PlayerState::new(0.0, 6);
            p.set_risk(100.0);
            let out = apply_trace(&mut p, &source(1, 10), 1.0, now(), &mut rng);
            if out.jailed() {
                jailed = true;
                assert!(p.risk().abs() < f64::EPSILON);
                assert!(p.is_jailed(now()));
            }
        }
        assert!(jailed);
    }

    #[test]
    fn memory_counts_per_subject() {
        let mut rng = StdRng::seed_from_u64(4);
        let mut p = PlayerState::new(1_000_000.0, 6);
        apply_trace(&mut p, &source(1, 2), 1.0, now(), &mut rng);
        apply_trace(&mut p, &source(1, 2), 1.0, now(), &mut rng);
        let out = apply_trace(&mut p, &source(2, 2), 1.0, now(), &mut rng);
        assert_eq!(out.detections, 1);
        assert_eq!(p.detections(&TraceSubject::Target(TargetId(1))), 2);
    }

    #[test]
    fn reputation_shift_always_applies() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut p = PlayerState::new(1_000_000.0, 6);
        p.reputation = ReputationLedger::with_values(0, 0, 0);
        apply_trace(&mut p, &source(9, 3), 1.0, now(), &mut rng);
        assert_eq!(p.reputation.get(RepAxis::Crime), 1);
        assert_eq!(p.reputation.get(RepAxis::State), 0);
        assert!(p.money >= 0.0);
        assert!((0.0..=100.0).contains(&p.risk()));
    }
}
