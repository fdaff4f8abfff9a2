//! Seeded self-play for the conquest engine.
//!
//! Four teams start in the corners of a square grid and play until one
//! holds the map or the turn limit runs out. Answers are random but fully
//! determined by the seed, so any run can be replayed.
//!
//! ```text
//! conquest-sim [SEED] [TURNS] [RULES.json]
//! ```
//!
//! Set `CONQUEST_LOG=debug` (or `trace`) for per-operation logs.

use std::env;
use std::fs;

use anyhow::{bail, Context, Result};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{info, warn, Level};

use conquest_core::{
    ClickOutcome, ColorPool, GameEngine, RulesConfig, ShuffledTaskPool, Task, TeamIndex, ZoneGraph,
    ZoneId,
};

/// Grid side length.
const SIDE: u32 = 5;
const DEFAULT_TURNS: usize = 200;

fn main() -> Result<()> {
    let level = match env::var("CONQUEST_LOG").as_deref() {
        Ok("trace") => Level::TRACE,
        Ok("debug") => Level::DEBUG,
        Ok("warn") => Level::WARN,
        _ => Level::INFO,
    };
    tracing_subscriber::fmt().with_max_level(level).init();

    let mut args = env::args().skip(1);
    let seed: u64 = match args.next() {
        Some(raw) => raw.parse().context(format!("invalid seed {raw:?}"))?,
        None => 0,
    };
    let turns: usize = match args.next() {
        Some(raw) => raw.parse().context(format!("invalid turn count {raw:?}"))?,
        None => DEFAULT_TURNS,
    };
    let rules = match args.next() {
        Some(path) => {
            let json = fs::read_to_string(&path)
                .with_context(|| format!("reading {path}"))?;
            RulesConfig::from_json_str(&json)
                .with_context(|| format!("loading rules from {path}"))?
        }
        None => RulesConfig::default(),
    };

    let mut engine = GameEngine::new(
        rules,
        grid(SIDE),
        task_pool(seed),
        ColorPool::default_palette(seed),
    );
    let corners = [1, SIDE, SIDE * (SIDE - 1) + 1, SIDE * SIDE];
    for (i, corner) in corners.into_iter().enumerate() {
        let team = engine.register_team(format!("Team {}", i + 1))?;
        engine.set_active_team_for_prepare(Some(team))?;
        engine.claim_or_release_zone(ZoneId::new(corner))?;
    }
    engine.start_game()?;
    info!(
        seed,
        turns,
        teams = engine.teams().len(),
        "self-play started"
    );

    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut played = 0;
    while played < turns && engine.survivors().len() > 1 {
        let Some(attacker) = engine.active_team() else {
            break;
        };
        play_turn(&mut engine, attacker, &mut rng)?;
        played += 1;
    }

    let events = engine.take_events();
    info!(
        played,
        events = events.len(),
        round = engine.turn().round_number,
        "self-play finished"
    );
    if engine.survivors().len() > 1 {
        warn!(
            survivors = engine.survivors().len(),
            "turn limit reached before a winner emerged"
        );
    }

    let mut standings: Vec<_> = engine.teams().iter().collect();
    standings.sort_by_key(|team| std::cmp::Reverse(team.score()));
    for team in standings {
        println!(
            "{:<8} {:>6} pts {:>3} zones{}",
            team.name(),
            team.score(),
            team.zones().len(),
            if team.is_eliminated() { "  (eliminated)" } else { "" }
        );
    }
    println!("{}", serde_json::to_string_pretty(engine.state())?);
    Ok(())
}

/// Attacks a zone bordering the attacker's territory, or passes when there
/// is none.
fn play_turn(engine: &mut GameEngine, attacker: TeamIndex, rng: &mut ChaCha8Rng) -> Result<()> {
    let Some(team) = engine.team(attacker) else {
        bail!("active team {attacker} is not registered");
    };
    let frontier: Vec<ZoneId> = (1..=SIDE * SIDE)
        .map(ZoneId::new)
        .filter(|zone| !team.owns(*zone))
        .filter(|zone| team.zones().iter().any(|own| borders(*own, *zone)))
        .collect();
    if frontier.is_empty() {
        engine.complete_turn()?;
        return Ok(());
    }

    let target = frontier[rng.gen_range(0..frontier.len())];
    match engine.click_zone(target, false)? {
        ClickOutcome::CaptureStarted { .. } => {}
        other => bail!("attack on {target} did not open a capture: {other:?}"),
    }
    while engine.capture().is_some() {
        // Each side answers once per round; order is random.
        let attacker_right = rng.gen_bool(0.6);
        let defender_right = rng.gen_bool(0.5);
        if rng.gen_bool(0.5) {
            engine.submit_attacker_answer(attacker_right)?;
            if engine.capture().is_some_and(|c| !c.is_neutral()) {
                engine.submit_defender_answer(defender_right)?;
            }
        } else {
            if engine.capture().is_some_and(|c| !c.is_neutral()) {
                engine.submit_defender_answer(defender_right)?;
            }
            engine.submit_attacker_answer(attacker_right)?;
        }
    }
    Ok(())
}

/// Zones are numbered row-major from 1.
fn borders(a: ZoneId, b: ZoneId) -> bool {
    let (a, b) = (a.as_u32() - 1, b.as_u32() - 1);
    let (ar, ac, br, bc) = (a / SIDE, a % SIDE, b / SIDE, b % SIDE);
    ar.abs_diff(br) + ac.abs_diff(bc) == 1
}

fn grid(side: u32) -> ZoneGraph {
    let mut borders = Vec::new();
    for row in 0..side {
        for col in 0..side {
            let zone = row * side + col + 1;
            if col + 1 < side {
                borders.push((zone, zone + 1));
            }
            if row + 1 < side {
                borders.push((zone, zone + side));
            }
        }
    }
    ZoneGraph::from_borders(&borders)
}

fn task_pool(seed: u64) -> ShuffledTaskPool {
    let tasks = (1..=30)
        .map(|i| Task::new(i, format!("{i} × {i} = ?")))
        .collect();
    ShuffledTaskPool::new(tasks, seed)
}
