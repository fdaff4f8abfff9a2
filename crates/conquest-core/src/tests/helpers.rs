//! Setup utilities for engine tests.

use crate::collab::{ColorPool, ShuffledTaskPool, Task, ZoneGraph};
use crate::config::RulesConfig;
use crate::engine::{AnswerOutcome, GameEngine};
use crate::team::{TeamIndex, ZoneId};

/// Number of zones on the test map.
pub const MAP_ZONES: u32 = 10;

/// Shorthand for [`ZoneId::new`].
pub fn z(id: u32) -> ZoneId {
    ZoneId::new(id)
}

/// Zones `1..=n` in a line, each touching its predecessor.
pub fn line_map(n: u32) -> ZoneGraph {
    let borders: Vec<(u32, u32)> = (1..n).map(|i| (i, i + 1)).collect();
    ZoneGraph::from_borders(&borders)
}

/// `count` numbered tasks shuffled with `seed`.
pub fn task_pool(count: u32, seed: u64) -> ShuffledTaskPool {
    let tasks = (1..=count)
        .map(|i| Task::new(i, format!("task {i}")))
        .collect();
    ShuffledTaskPool::new(tasks, seed)
}

/// Fresh engine on a [`MAP_ZONES`]-zone line with plenty of tasks.
pub fn new_engine(rules: RulesConfig) -> GameEngine {
    new_engine_seeded(rules, 0)
}

/// Fresh engine whose task and color shuffles derive from `seed`.
pub fn new_engine_seeded(rules: RulesConfig, seed: u64) -> GameEngine {
    GameEngine::new(
        rules,
        line_map(MAP_ZONES),
        task_pool(12, seed),
        ColorPool::default_palette(seed),
    )
}

/// Registers one team per entry and claims its zones in order, so the first
/// zone listed becomes the capital. Leaves no team selected.
pub fn setup_roster(engine: &mut GameEngine, roster: &[(&str, &[u32])]) -> Vec<TeamIndex> {
    let teams: Vec<TeamIndex> = roster
        .iter()
        .map(|(name, _)| engine.register_team(*name).unwrap())
        .collect();
    for (&team, (_, zones)) in teams.iter().zip(roster) {
        engine.set_active_team_for_prepare(Some(team)).unwrap();
        for &zone in *zones {
            engine.claim_or_release_zone(z(zone)).unwrap();
        }
    }
    engine.set_active_team_for_prepare(None).unwrap();
    teams
}

/// Engine with `roster` claimed and the game started. Events are drained.
pub fn started_engine(
    rules: RulesConfig,
    roster: &[(&str, &[u32])],
) -> (GameEngine, Vec<TeamIndex>) {
    let mut engine = new_engine(rules);
    let teams = setup_roster(&mut engine, roster);
    engine.start_game().unwrap();
    engine.take_events();
    (engine, teams)
}

/// Attacker right, defender wrong, round after round until an enemy zone or
/// capital attack resolves.
pub fn overwhelm(engine: &mut GameEngine) -> AnswerOutcome {
    loop {
        engine.submit_attacker_answer(true).unwrap();
        let outcome = engine.submit_defender_answer(false).unwrap();
        if !matches!(outcome, AnswerOutcome::SiegeRoundWon { .. }) {
            return outcome;
        }
    }
}
