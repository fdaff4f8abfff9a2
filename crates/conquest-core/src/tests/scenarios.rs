//! End-to-end games driven through the engine facade.

use std::collections::BTreeSet;

use crate::capture::{Role, VerdictKind};
use crate::collab::{ColorPool, ShuffledTaskPool};
use crate::config::RulesConfig;
use crate::engine::{AnswerOutcome, ClickOutcome, GameEngine};
use crate::error::{GameError, PoolKind};
use crate::event::EventKind;
use crate::state::GameState;
use crate::turn::GamePhase;

use super::helpers::{line_map, overwhelm, setup_roster, started_engine, task_pool, z};

// =============================================================================
// Capital Sieges
// =============================================================================

#[test]
fn three_round_siege_eliminates_defender() {
    let (mut engine, teams) = started_engine(RulesConfig::default(), &[("A", &[1]), ("B", &[3])]);
    let (a, b) = (teams[0], teams[1]);

    let click = engine.click_zone(z(3), false).unwrap();
    assert_eq!(
        click,
        ClickOutcome::CaptureStarted {
            defender: Some(b),
            capital: true
        }
    );
    let siege = engine.capture().and_then(|c| c.siege()).unwrap();
    assert_eq!(siege.preselected_tasks.len(), 3);

    let mut tasks_seen = BTreeSet::new();
    for round in 1..=2 {
        tasks_seen.insert(engine.capture().and_then(|c| c.current_task()).unwrap().id);
        engine.submit_attacker_answer(true).unwrap();
        assert_eq!(
            engine.submit_defender_answer(false).unwrap(),
            AnswerOutcome::SiegeRoundWon {
                consecutive_wins: round,
                required_wins: 3
            }
        );
        assert_eq!(
            engine.owner_of(z(3)),
            Some(b),
            "capital holds until the last round"
        );
    }
    tasks_seen.insert(engine.capture().and_then(|c| c.current_task()).unwrap().id);
    assert_eq!(tasks_seen.len(), 3, "each round gets its own task");

    engine.submit_attacker_answer(true).unwrap();
    let AnswerOutcome::Resolved(resolution) = engine.submit_defender_answer(false).unwrap() else {
        panic!("third round should decide the siege");
    };
    assert_eq!(
        resolution.verdict.kind,
        VerdictKind::CapitalTaken { defender: b }
    );

    assert_eq!(engine.team(a).unwrap().score(), 1400);
    assert_eq!(engine.team(b).unwrap().score(), 1000);
    assert!(engine.team(b).unwrap().is_eliminated());
    assert_eq!(engine.team(a).unwrap().base(), Some(z(3)));
    assert_eq!(engine.survivors(), vec![a]);

    // B never gets a turn again.
    assert_eq!(engine.active_team(), Some(a));
    assert_eq!(engine.turn().turns_order, vec![a]);
    for _ in 0..3 {
        assert_eq!(engine.complete_turn().unwrap(), Some(a));
    }
}

#[test]
fn defender_breaks_siege_midway() {
    let (mut engine, teams) =
        started_engine(RulesConfig::default(), &[("A", &[1]), ("B", &[3, 4])]);
    let (a, b) = (teams[0], teams[1]);

    engine.click_zone(z(3), false).unwrap();
    engine.submit_attacker_answer(true).unwrap();
    engine.submit_defender_answer(false).unwrap();

    engine.submit_defender_answer(true).unwrap();
    let outcome = engine.submit_attacker_answer(false).unwrap();
    let AnswerOutcome::Resolved(resolution) = outcome else {
        panic!("expected resolution, got {outcome:?}");
    };
    assert_eq!(
        resolution.verdict.kind,
        VerdictKind::Defended {
            defender: b,
            capital: true,
            rounds_won: 1
        }
    );
    assert_eq!(resolution.attacker_reward, 0);
    assert_eq!(engine.team(b).unwrap().zones().len(), 2);
    assert_eq!(engine.team(a).unwrap().score(), 1000);
    assert_eq!(engine.active_team(), Some(b));
}

#[test]
fn siege_rounds_are_not_history_steps() {
    let (mut engine, _) = started_engine(RulesConfig::default(), &[("A", &[1]), ("B", &[3])]);
    let before = engine.state().clone();

    engine.click_zone(z(3), false).unwrap();
    overwhelm(&mut engine);

    // One undo rewinds the whole siege.
    assert!(engine.undo());
    assert_eq!(*engine.state(), before);
}

#[test]
fn capital_capture_demotes_old_base() {
    let rules = RulesConfig {
        capital_required_wins: 1,
        ..RulesConfig::default()
    };
    let (mut engine, teams) = started_engine(rules, &[("A", &[1, 2]), ("B", &[5, 6])]);
    let a = teams[0];

    engine.click_zone(z(5), false).unwrap();
    overwhelm(&mut engine);

    let winner = engine.team(a).unwrap();
    assert_eq!(winner.base(), Some(z(5)));
    assert!(winner.owns(z(1)));
    assert!(!winner.is_base(z(1)));
    assert_eq!(winner.zones().len(), 4);
}

// =============================================================================
// Arbitration
// =============================================================================

#[test]
fn both_correct_first_committer_wins() {
    let (mut engine, teams) =
        started_engine(RulesConfig::default(), &[("A", &[1, 2]), ("B", &[4, 5])]);
    let (a, b) = (teams[0], teams[1]);

    engine.click_zone(z(5), false).unwrap();
    engine.submit_defender_answer(true).unwrap();
    assert_eq!(
        engine.capture().unwrap().response_position(Role::Defender),
        Some(1)
    );
    let outcome = engine.submit_attacker_answer(true).unwrap();
    assert!(matches!(
        outcome,
        AnswerOutcome::Resolved(r) if matches!(r.verdict.kind, VerdictKind::Defended { .. })
    ));
    assert_eq!(engine.owner_of(z(5)), Some(b));

    assert_eq!(engine.active_team(), Some(b));
    engine.click_zone(z(2), false).unwrap();
    engine.submit_attacker_answer(true).unwrap();
    engine.submit_defender_answer(true).unwrap();
    assert_eq!(engine.owner_of(z(2)), Some(b));
    assert_eq!(engine.team(a).unwrap().zones().len(), 1);
}

#[test]
fn neutral_capture_uses_attacker_answer_only() {
    let (mut engine, teams) = started_engine(RulesConfig::default(), &[("A", &[1]), ("B", &[9])]);
    let (a, b) = (teams[0], teams[1]);

    engine.click_zone(z(2), false).unwrap();
    assert_eq!(
        engine.submit_defender_answer(true).unwrap(),
        AnswerOutcome::Ignored
    );
    let outcome = engine.submit_attacker_answer(false).unwrap();
    assert!(matches!(
        outcome,
        AnswerOutcome::Resolved(r) if r.verdict.kind == VerdictKind::NeutralMissed
    ));
    assert_eq!(engine.owner_of(z(2)), None);
    assert_eq!(engine.active_team(), Some(b));

    engine.click_zone(z(8), false).unwrap();
    engine.submit_attacker_answer(true).unwrap();
    assert_eq!(engine.owner_of(z(8)), Some(b));
    assert_eq!(engine.team(b).unwrap().score(), 1100);
    assert_eq!(engine.team(b).unwrap().base(), Some(z(9)));

    // Round two rotates [A, B] to [B, A].
    assert_eq!(engine.active_team(), Some(b));
    assert_eq!(engine.turn().turns_order, vec![b, a]);
}

#[test]
fn empty_task_pool_rules() {
    let strict = RulesConfig {
        require_tasks: true,
        ..RulesConfig::default()
    };
    for (rules, expect_error) in [(strict, true), (RulesConfig::default(), false)] {
        let mut engine = GameEngine::new(
            rules,
            line_map(5),
            ShuffledTaskPool::empty(),
            ColorPool::default_palette(0),
        );
        setup_roster(&mut engine, &[("A", &[1])]);
        engine.start_game().unwrap();
        let could_undo = engine.can_undo();

        let result = engine.click_zone(z(2), false);
        if expect_error {
            assert_eq!(
                result.unwrap_err(),
                GameError::PoolExhausted {
                    pool: PoolKind::Tasks
                }
            );
            assert!(engine.capture().is_none());
        } else {
            assert!(result.is_ok());
            assert!(engine.capture().unwrap().current_task().is_none());
        }
        assert_eq!(engine.can_undo(), could_undo);
    }
}

// =============================================================================
// Turn Order
// =============================================================================

#[test]
fn rounds_rotate_left() {
    let (mut engine, teams) = started_engine(
        RulesConfig::default(),
        &[("A", &[1]), ("B", &[5]), ("C", &[9])],
    );
    let (a, b, c) = (teams[0], teams[1], teams[2]);

    assert_eq!(engine.complete_turn().unwrap(), Some(b));
    assert_eq!(engine.complete_turn().unwrap(), Some(c));
    assert_eq!(engine.turn().round_number, 1);

    assert_eq!(engine.complete_turn().unwrap(), Some(b));
    assert_eq!(engine.turn().round_number, 2);
    assert_eq!(engine.turn().turns_order, vec![b, c, a]);
    assert_eq!(engine.turn().current_turn_index, 0);
}

#[test]
fn eliminated_team_skipped_mid_round() {
    let rules = RulesConfig {
        capital_required_wins: 1,
        ..RulesConfig::default()
    };
    let (mut engine, teams) = started_engine(rules, &[("A", &[1]), ("B", &[5]), ("C", &[9])]);
    let (a, c) = (teams[0], teams[2]);

    engine.click_zone(z(5), false).unwrap();
    overwhelm(&mut engine);
    assert_eq!(engine.active_team(), Some(c));
    assert_eq!(engine.turn().current_turn_index, 2);

    // Survivors [A, C] rotate to [C, A]: C opens the new round.
    assert_eq!(engine.complete_turn().unwrap(), Some(c));
    assert_eq!(engine.turn().turns_order, vec![c, a]);
}

// =============================================================================
// History
// =============================================================================

#[test]
fn undo_redo_walks_every_committed_step() {
    let mut engine = GameEngine::new(
        RulesConfig::with_forfeit(),
        line_map(10),
        task_pool(12, 5),
        ColorPool::default_palette(5),
    );
    let mut snapshots: Vec<GameState> = vec![engine.state().clone()];

    let a = engine.register_team("A").unwrap();
    snapshots.push(engine.state().clone());
    let b = engine.register_team("B").unwrap();
    snapshots.push(engine.state().clone());
    engine.set_active_team_for_prepare(Some(a)).unwrap();
    snapshots.push(engine.state().clone());
    engine.claim_or_release_zone(z(1)).unwrap();
    snapshots.push(engine.state().clone());
    engine.set_active_team_for_prepare(Some(b)).unwrap();
    snapshots.push(engine.state().clone());
    engine.claim_or_release_zone(z(8)).unwrap();
    snapshots.push(engine.state().clone());
    engine.start_game().unwrap();
    snapshots.push(engine.state().clone());
    engine.click_zone(z(8), true).unwrap();
    snapshots.push(engine.state().clone());
    engine.click_zone(z(7), false).unwrap();
    engine.submit_attacker_answer(true).unwrap();
    snapshots.push(engine.state().clone());

    for expected in snapshots.iter().rev().skip(1) {
        assert!(engine.undo());
        assert_eq!(engine.state(), expected);
    }
    assert!(!engine.undo());
    assert_eq!(engine.phase(), GamePhase::Prepare);
    assert!(engine.teams().is_empty());
    assert_eq!(
        engine.state().colors.remaining(),
        7,
        "undo returns colors to the pool"
    );

    for expected in snapshots.iter().skip(1) {
        assert!(engine.redo());
        assert_eq!(engine.state(), expected);
    }
    assert!(!engine.redo());
}

#[test]
fn new_operation_discards_redo_branch() {
    let (mut engine, teams) = started_engine(RulesConfig::default(), &[("A", &[1]), ("B", &[9])]);
    engine.complete_turn().unwrap();
    engine.complete_turn().unwrap();
    assert!(engine.undo());
    assert!(engine.can_redo());

    engine.click_zone(z(8), false).unwrap();
    assert!(engine.can_redo(), "opening a capture commits nothing");
    engine.submit_attacker_answer(true).unwrap();
    assert!(!engine.can_redo());
    assert_eq!(engine.owner_of(z(8)), Some(teams[1]));
}

#[test]
fn undo_and_redo_emit_events() {
    let (mut engine, _) = started_engine(RulesConfig::default(), &[("A", &[1])]);
    engine.complete_turn().unwrap();
    assert!(engine.undo());
    assert!(engine.redo());
    assert!(!engine.redo());

    let kinds: Vec<EventKind> = engine.take_events().into_iter().map(|e| e.kind).collect();
    assert!(matches!(kinds[0], EventKind::TurnCompleted { .. }));
    assert_eq!(kinds[1..], [EventKind::Undone, EventKind::Redone]);
}

// =============================================================================
// Serialization
// =============================================================================

#[test]
fn state_and_events_serialize_to_json() {
    let (mut engine, _) = started_engine(RulesConfig::default(), &[("A", &[1]), ("B", &[9])]);
    engine.click_zone(z(2), false).unwrap();
    engine.submit_attacker_answer(true).unwrap();

    let json = serde_json::to_string(engine.state()).unwrap();
    let restored: GameState = serde_json::from_str(&json).unwrap();
    assert_eq!(&restored, engine.state());

    let events = serde_json::to_value(engine.take_events()).unwrap();
    assert_eq!(events.as_array().map(Vec::len), Some(2));
    assert!(events[1]["kind"]["CaptureResolved"].is_object());
}

#[test]
fn rules_loaded_from_json_drive_the_game() {
    let json = r#"{
        "capital_required_wins": 2,
        "capital_capture_reward": 250,
        "forfeit": { "zone": 10, "capital": 20 }
    }"#;
    let rules = RulesConfig::from_json_str(json).unwrap();
    let (mut engine, teams) = started_engine(rules, &[("A", &[1]), ("B", &[3])]);

    assert_eq!(
        engine.click_zone(z(3), true).unwrap(),
        ClickOutcome::Forfeited {
            defender: teams[1],
            award: 20
        }
    );
    engine.click_zone(z(1), false).unwrap();
    engine.submit_attacker_answer(true).unwrap();
    assert!(matches!(
        engine.submit_defender_answer(false).unwrap(),
        AnswerOutcome::SiegeRoundWon {
            consecutive_wins: 1,
            required_wins: 2
        }
    ));
    overwhelm(&mut engine);
    assert_eq!(engine.team(teams[1]).unwrap().score(), 1000 + 20 + 250);
    assert_eq!(engine.survivors(), vec![teams[1]]);
}
