//! Whole-run properties of the simulation, driven through the public API
//! with seeded random sources.

#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::arithmetic_side_effects,
    clippy::indexing_slicing,
    clippy::float_cmp
)]

use chrono::NaiveDate;
use nightwire_agents::{EnemyAgentDirectory, SpawnCause, SpawnContext, SpawnRequest};
use nightwire_core::{
    MissionUnlockGraph, SimError, Simulation, SimulationConfig, calc_hack_chance,
    capture_probability,
};
use nightwire_types::{AgentKind, AgentStatus, PlayerState, RegionId, RemovalReason, RepAxis};
use nightwire_world::RegionRegistry;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn seeded(seed: u64) -> Simulation {
    let mut config = SimulationConfig::default();
    config.world.seed = Some(seed);
    Simulation::new(config).expect("default config is valid")
}

fn in_unit_range(value: f64) -> bool {
    (0.0..=100.0).contains(&value)
}

#[test]
fn meters_stay_in_range_for_any_advance() {
    let mut sim = seeded(101);
    let mut rng = StdRng::seed_from_u64(7);
    sim.player_mut().addicted = true;
    sim.player_mut().set_addiction(100.0);
    for _ in 0..200 {
        let hours = rng.random_range(0.0..60.0);
        sim.advance_time(hours).unwrap();
        let p = sim.player();
        assert!(in_unit_range(p.focus()), "focus {}", p.focus());
        assert!(in_unit_range(p.risk()), "risk {}", p.risk());
        assert!(in_unit_range(p.addiction()), "addiction {}", p.addiction());
    }
    sim.advance_time(0.0).unwrap();
}

#[test]
fn completed_missions_never_return() {
    let graph = MissionUnlockGraph::new().unwrap();
    let mut player = PlayerState::new(0.0, 6);
    player.reputation.set(RepAxis::Hacktivist, 6);
    graph.sync(&mut player);
    assert!(MissionUnlockGraph::complete(&mut player, "hx_m1"));

    let mut rng = StdRng::seed_from_u64(3);
    for _ in 0..500 {
        for axis in [RepAxis::State, RepAxis::Crime, RepAxis::Hacktivist] {
            player.reputation.set(axis, rng.random_range(0..=100));
        }
        graph.sync(&mut player);
        assert!(!player.missions_available.contains("hx_m1"));
        assert!(player.missions_completed.contains("hx_m1"));
    }
}

#[test]
fn hack_chance_is_bounded() {
    let mut rng = StdRng::seed_from_u64(11);
    for _ in 0..2_000 {
        let exploit = rng.random_range(0.0..500.0);
        let security = rng.random_range(0..=40);
        let focus = rng.random_range(0.0..=100.0);
        let levels: Vec<u32> = (0..rng.random_range(0..12))
            .map(|_| rng.random_range(1..=20))
            .collect();
        let chance = calc_hack_chance(exploit, security, &levels, focus, rng.random_bool(0.5));
        assert!((0.01..=0.99).contains(&chance), "chance {chance}");
    }
}

#[test]
fn seeded_hacks_replay_identically() {
    let run = |seed: u64| {
        let mut sim = seeded(seed);
        sim.player_mut().money = 50_000.0;
        let scan = sim.scan().unwrap();
        let target = scan.targets.first().unwrap().id;
        let report = sim.attempt_hack(target).unwrap();
        (report, sim.query_status())
    };
    let (first, first_status) = run(2024);
    let (second, second_status) = run(2024);
    assert_eq!(first, second);
    assert_eq!(first_status, second_status);
}

#[test]
fn blocked_agent_returns_exactly_at_expiry() {
    let mut sim = seeded(55);
    let id = sim.spawn_agent(Some(AgentKind::Federal), Some(RegionId::Local)).unwrap();
    let until = sim.world().clock.after_hours(5).unwrap();
    sim.world_mut().agents.get_mut(id).unwrap().block(until);

    sim.advance_time(4.5).unwrap();
    assert_eq!(
        sim.world().agents.get(id).unwrap().status,
        AgentStatus::Blocked { until }
    );
    sim.advance_time(0.5).unwrap();
    assert_eq!(sim.world().agents.get(id).unwrap().status, AgentStatus::Active);
}

#[test]
fn singularity_gate_follows_its_alternatives() {
    let graph = MissionUnlockGraph::new().unwrap();

    let mut p = PlayerState::new(0.0, 6);
    p.reputation.set(RepAxis::Hacktivist, 6);
    graph.sync(&mut p);
    assert!(p.missions_available.contains("hx_m1"));

    let mut p = PlayerState::new(0.0, 6);
    p.reputation.set(RepAxis::Hacktivist, 40);
    p.reputation.set(RepAxis::Crime, 10);
    graph.sync(&mut p);
    assert!(!p.missions_available.contains("sg_m2"));

    p.reputation.set(RepAxis::Crime, 52);
    graph.sync(&mut p);
    assert!(p.missions_available.contains("sg_m2"));
}

#[test]
fn capture_probability_grows_with_detections() {
    for risk in [0.0, 12.5, 40.0, 90.0] {
        for stealth in [0.0, 30.0, 120.0] {
            let mut previous = 0.0;
            for detections in 0..20 {
                let p = capture_probability(risk, stealth, detections);
                assert!(p >= previous, "risk {risk} stealth {stealth} n {detections}");
                assert!(p <= 1.0);
                previous = p;
            }
        }
    }
}

#[test]
fn removal_rewards_once_and_detaches() {
    let mut rng = StdRng::seed_from_u64(8);
    let regions = RegionRegistry::new();
    let mut directory = EnemyAgentDirectory::new();
    let mut player = PlayerState::new(0.0, 6);
    let now = NaiveDate::from_ymd_opt(2095, 11, 2)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap();

    let id = directory
        .spawn(
            SpawnRequest {
                kind: Some(AgentKind::Hacktivist),
                region: Some(RegionId::Local),
                cause: SpawnCause::Manual,
            },
            SpawnContext {
                day: 1,
                regions: &regions,
            },
            &player,
            &mut rng,
        )
        .unwrap()
        .id;

    let before = player.reputation.clone();
    let report = directory
        .remove(id, RemovalReason::Compromised, &mut player, now, &mut rng)
        .unwrap();
    assert!(report.reward.is_some());
    assert!(directory.get(id).is_err());
    assert!(player.reputation.get(RepAxis::Hacktivist) > before.get(RepAxis::Hacktivist));

    let after = player.reputation.clone();
    assert!(
        directory
            .remove(id, RemovalReason::Compromised, &mut player, now, &mut rng)
            .is_err()
    );
    assert_eq!(player.reputation, after);
}

#[test]
fn long_autopilot_run_holds_invariants() {
    let mut sim = seeded(9_001);
    sim.player_mut().money = 2_000.0;
    let mut rng = StdRng::seed_from_u64(17);
    for _ in 0..400 {
        if sim.is_ended() {
            assert!(matches!(sim.scan(), Err(SimError::RunEnded)));
            break;
        }
        let result = match rng.random_range(0..6) {
            0 => sim.scan().map(|_| ()),
            1 => sim.sleep().map(|_| ()),
            2 => sim.work().map(|_| ()),
            3 => sim.study(4).map(|_| ()),
            4 => {
                let id = sim.world().targets.targets().first().map(|t| t.id);
                match id {
                    Some(id) => sim.attempt_hack(id).map(|_| ()),
                    None => Ok(()),
                }
            }
            _ => sim.advance_time(rng.random_range(1.0..30.0)).map(|_| ()),
        };
        match result {
            Ok(())
            | Err(
                SimError::InsufficientResource { .. }
                | SimError::PreconditionNotMet { .. }
                | SimError::InvalidArgument { .. },
            ) => {}
            Err(other) => panic!("unexpected error: {other}"),
        }
        if let Some(event) = sim.pending_event() {
            let choice = event.choices()[1];
            let _ = sim.resolve_event(choice);
        }

        let p = sim.player();
        assert!(in_unit_range(p.focus()));
        assert!(in_unit_range(p.risk()));
        assert!(in_unit_range(p.addiction()));
        assert!(
            p.missions_completed
                .iter()
                .all(|id| !p.missions_available.contains(id))
        );
        assert!(
            sim.world()
                .agents
                .agents()
                .iter()
                .all(|a| a.status != AgentStatus::Compromised)
        );
    }
    let _ = sim.drain_notifications();
    assert!(sim.world().notifications.is_empty());
}
