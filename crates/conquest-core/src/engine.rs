//! Game engine: the public surface of the crate.
//!
//! `GameEngine` wires the registry, turn manager, capture arbiter and
//! history together and exposes the operations a front end calls:
//!
//! | phase    | operations                                                           |
//! |----------|----------------------------------------------------------------------|
//! | prepare  | `register_team`, `set_active_team_for_prepare`, `claim_or_release_zone`, `start_game` |
//! | started  | `click_zone`, `submit_attacker_answer`, `submit_defender_answer`, `cancel_capture`, `complete_turn` |
//! | any      | `undo`, `redo`, read accessors, `take_events`                        |
//!
//! # Transactions
//!
//! Every operation that changes committed state validates first, then
//! snapshots history, then mutates. A rejected call returns `Err` and
//! leaves both state and history untouched. Answer toggles and intermediate
//! siege rounds only touch the live capture, which is not part of history.
//!
//! # Example
//!
//! ```
//! use conquest_core::collab::{ColorPool, ShuffledTaskPool, Task, ZoneGraph};
//! use conquest_core::config::RulesConfig;
//! use conquest_core::engine::{AnswerOutcome, ClickOutcome, GameEngine};
//! use conquest_core::team::ZoneId;
//!
//! let map = ZoneGraph::from_borders(&[(1, 2), (2, 3), (3, 4)]);
//! let tasks = ShuffledTaskPool::new(vec![Task::new(1, "2 + 2?")], 7);
//! let mut engine = GameEngine::new(RulesConfig::default(), map, tasks, ColorPool::default_palette(7));
//!
//! let red = engine.register_team("Red").unwrap();
//! let blue = engine.register_team("Blue").unwrap();
//! engine.set_active_team_for_prepare(Some(red)).unwrap();
//! engine.claim_or_release_zone(ZoneId::new(1)).unwrap();
//! engine.set_active_team_for_prepare(Some(blue)).unwrap();
//! engine.claim_or_release_zone(ZoneId::new(4)).unwrap();
//! engine.start_game().unwrap();
//!
//! // Red attacks the neutral zone next door and answers correctly.
//! let click = engine.click_zone(ZoneId::new(2), false).unwrap();
//! assert!(matches!(click, ClickOutcome::CaptureStarted { defender: None, .. }));
//! let outcome = engine.submit_attacker_answer(true).unwrap();
//! assert!(matches!(outcome, AnswerOutcome::Resolved(_)));
//!
//! assert_eq!(engine.owner_of(ZoneId::new(2)), Some(red));
//! assert_eq!(engine.active_team(), Some(blue));
//!
//! engine.undo();
//! assert_eq!(engine.owner_of(ZoneId::new(2)), None);
//! ```

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use tracing::{debug, info, trace};

use crate::capture::{
    apply_verdict, CaptureArbiter, CaptureResolution, CaptureSession, Role, Submission,
};
use crate::collab::{AdjacencyOracle, ColorPool, TaskPool};
use crate::config::RulesConfig;
use crate::error::{GameError, PoolKind};
use crate::event::{EventKind, EventLog, GameEvent};
use crate::history::HistoryManager;
use crate::invariants::check_invariants;
use crate::registry::ZoneAssignment;
use crate::state::GameState;
use crate::team::{Team, TeamIndex, ZoneId};
use crate::turn::{GamePhase, TurnAdvance, TurnState};

/// Why a zone click did nothing.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum IgnoreReason {
    /// The active team already owns the zone.
    OwnZone,
    /// Alternate click on an unowned zone.
    NeutralZone,
    /// Alternate click while the forfeit rule is off.
    ForfeitDisabled,
    /// Nobody holds zones, so nobody can attack.
    NoActiveTeam,
}

/// Result of [`GameEngine::click_zone`].
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ClickOutcome {
    /// Nothing happened.
    Ignored(IgnoreReason),
    /// A capture session is open.
    CaptureStarted {
        /// Zone owner, `None` for a neutral zone.
        defender: Option<TeamIndex>,
        /// Whether a capital siege began.
        capital: bool,
    },
    /// The attacker forfeited; the defender scored and the turn passed.
    Forfeited {
        /// Team that received the award.
        defender: TeamIndex,
        /// Points awarded.
        award: i64,
    },
}

/// Result of an answer submission.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum AnswerOutcome {
    /// Answer stored; the other party has not answered yet.
    Recorded,
    /// Same value submitted twice; the answer was withdrawn.
    Retracted,
    /// Defender answer on a neutral capture.
    Ignored,
    /// The attacker won a siege round and the next one is open.
    SiegeRoundWon {
        /// Rounds won so far.
        consecutive_wins: u32,
        /// Rounds needed.
        required_wins: u32,
    },
    /// The capture finished and the turn passed.
    Resolved(CaptureResolution),
}

/// Composition root owning all game state.
///
/// Single-threaded by construction: every call runs to completion and
/// callers sharing an engine must serialize access themselves.
pub struct GameEngine {
    rules: RulesConfig,
    /// Committed state, shared with history snapshots until written.
    state: Arc<GameState>,
    history: HistoryManager<GameState>,
    arbiter: CaptureArbiter,
    adjacency: Box<dyn AdjacencyOracle>,
    tasks: Box<dyn TaskPool>,
    events: EventLog,
}

impl fmt::Debug for GameEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GameEngine")
            .field("rules", &self.rules)
            .field("state", &self.state)
            .field(
                "history",
                &format!(
                    "[{} undo / {} redo]",
                    self.history.undo_depth(),
                    self.history.redo_depth()
                ),
            )
            .field("capture", &self.arbiter.session())
            .field("pending_events", &self.events.len())
            .finish_non_exhaustive()
    }
}

impl GameEngine {
    /// Creates an engine in the prepare phase with no teams.
    #[must_use]
    pub fn new(
        rules: RulesConfig,
        adjacency: impl AdjacencyOracle + 'static,
        tasks: impl TaskPool + 'static,
        colors: ColorPool,
    ) -> Self {
        Self {
            rules,
            state: Arc::new(GameState::new(colors)),
            history: HistoryManager::new(),
            arbiter: CaptureArbiter::new(),
            adjacency: Box::new(adjacency),
            tasks: Box::new(tasks),
            events: EventLog::new(),
        }
    }

    // =========================================================================
    // Prepare phase
    // =========================================================================

    /// Adds a team with the starting score and the next pool color.
    ///
    /// # Errors
    ///
    /// - [`GameError::InvalidPhase`] once the game has started
    /// - [`GameError::PoolExhausted`] when no colors are left
    pub fn register_team(&mut self, name: impl Into<String>) -> Result<TeamIndex, GameError> {
        self.require_phase(GamePhase::Prepare)?;
        if self.state.colors.remaining() == 0 {
            return reject(
                "register_team",
                GameError::PoolExhausted {
                    pool: PoolKind::Colors,
                },
            );
        }

        self.history.record(&self.state);
        let state = Arc::make_mut(&mut self.state);
        let name: String = name.into();
        let team = state
            .registry
            .register_team(name.as_str(), self.rules.starting_score, &mut state.colors)?;
        debug!(%team, name = %name, "team registered");
        self.commit(EventKind::TeamRegistered { team });
        Ok(team)
    }

    /// Selects which team claims zones, or clears the selection.
    ///
    /// # Errors
    ///
    /// - [`GameError::InvalidPhase`] once the game has started
    /// - [`GameError::UnknownTeam`] for an unregistered index
    pub fn set_active_team_for_prepare(
        &mut self,
        team: Option<TeamIndex>,
    ) -> Result<(), GameError> {
        self.require_phase(GamePhase::Prepare)?;
        if let Some(index) = team {
            if !self.state.registry.contains(index) {
                return reject("set_active_team_for_prepare", GameError::UnknownTeam(index));
            }
        }
        if self.state.turns.active_team() == team {
            return Ok(());
        }

        self.history.record(&self.state);
        Arc::make_mut(&mut self.state).turns.select_for_prepare(team);
        debug!(?team, "prepare team selected");
        self.commit(EventKind::PrepareTeamSelected { team });
        Ok(())
    }

    /// Toggles `zone` for the selected team: releases it if owned, otherwise
    /// claims it (taking it from any other owner).
    ///
    /// # Errors
    ///
    /// - [`GameError::InvalidPhase`] once the game has started
    /// - [`GameError::NotActiveTeam`] when no team is selected
    /// - [`GameError::ZoneDisabled`] when claiming a zone bordering another
    ///   team's territory
    pub fn claim_or_release_zone(&mut self, zone: ZoneId) -> Result<ZoneAssignment, GameError> {
        self.require_phase(GamePhase::Prepare)?;
        let Some(team) = self.state.turns.active_team() else {
            return reject("claim_or_release_zone", GameError::NotActiveTeam);
        };
        let releasing = self.state.registry.owner_of(zone) == Some(team);
        if !releasing && self.disabled_zones().contains(&zone) {
            return reject("claim_or_release_zone", GameError::ZoneDisabled(zone));
        }

        self.history.record(&self.state);
        let assignment = Arc::make_mut(&mut self.state)
            .registry
            .assign_zone(zone, team, GamePhase::Prepare);
        debug!(%zone, %team, ?assignment, "zone assigned");
        self.commit(EventKind::ZoneAssigned {
            zone,
            team,
            assignment,
        });
        Ok(assignment)
    }

    /// Zones the selected team may not claim: everything adjacent to another
    /// team's territory. Empty outside setup or with no team selected.
    #[must_use]
    pub fn disabled_zones(&self) -> BTreeSet<ZoneId> {
        let Some(active) = self.state.turns.active_team() else {
            return BTreeSet::new();
        };
        if self.state.phase() != GamePhase::Prepare {
            return BTreeSet::new();
        }
        let others: BTreeSet<ZoneId> = self
            .state
            .registry
            .indexed()
            .filter(|(index, _)| *index != active)
            .flat_map(|(_, team)| team.zones().iter().copied())
            .collect();
        self.adjacency.adjacent_zones(&others)
    }

    /// Begins turns with every team holding zones, in registration order.
    ///
    /// Teams that claimed nothing never take part.
    ///
    /// # Errors
    ///
    /// - [`GameError::InvalidPhase`] if already started
    /// - [`GameError::NoContenders`] if no team holds a zone
    pub fn start_game(&mut self) -> Result<(), GameError> {
        self.require_phase(GamePhase::Prepare)?;
        let order: Vec<TeamIndex> = self.state.survivors();
        let Some(&first) = order.first() else {
            return reject("start_game", GameError::NoContenders);
        };

        self.history.record(&self.state);
        Arc::make_mut(&mut self.state).turns.start_game(order);
        info!(%first, "game started");
        self.commit(EventKind::GameStarted { first });
        Ok(())
    }

    // =========================================================================
    // Started phase
    // =========================================================================

    /// Handles a click on `zone` by the active team.
    ///
    /// A primary click on an enemy or neutral zone opens a capture. An
    /// alternate click on an enemy zone forfeits the attack when
    /// [`RulesConfig::forfeit`] is set. Clicks on own zones are ignored.
    ///
    /// # Errors
    ///
    /// - [`GameError::InvalidPhase`] before the game has started
    /// - [`GameError::CaptureInProgress`] while a capture is open
    /// - [`GameError::PoolExhausted`] if tasks are required and none are left
    pub fn click_zone(&mut self, zone: ZoneId, alternate: bool) -> Result<ClickOutcome, GameError> {
        self.require_phase(GamePhase::Started)?;
        if self.arbiter.is_active() {
            return reject("click_zone", GameError::CaptureInProgress);
        }
        let Some(attacker) = self.state.turns.active_team() else {
            return Ok(ClickOutcome::Ignored(IgnoreReason::NoActiveTeam));
        };
        let owner = self.state.registry.owner_of(zone);
        if owner == Some(attacker) {
            trace!(%zone, %attacker, "own zone clicked");
            return Ok(ClickOutcome::Ignored(IgnoreReason::OwnZone));
        }

        if alternate {
            return Ok(self.forfeit(zone, owner));
        }

        let tasks = self.tasks.as_mut();
        let session = self
            .arbiter
            .initiate(zone, attacker, &self.state, tasks, &self.rules)
            .inspect_err(|err| trace!(%err, "click_zone rejected"))?;
        let (defender, capital) = (session.defender(), session.is_capital());
        debug!(%zone, %attacker, ?defender, capital, "capture started");
        self.commit(EventKind::CaptureStarted {
            zone,
            attacker,
            defender,
            capital,
        });
        Ok(ClickOutcome::CaptureStarted { defender, capital })
    }

    fn forfeit(&mut self, zone: ZoneId, owner: Option<TeamIndex>) -> ClickOutcome {
        let Some(rewards) = self.rules.forfeit else {
            return ClickOutcome::Ignored(IgnoreReason::ForfeitDisabled);
        };
        let Some(defender) = owner else {
            return ClickOutcome::Ignored(IgnoreReason::NeutralZone);
        };
        let capital = self
            .state
            .registry
            .team(defender)
            .is_some_and(|team| team.is_base(zone));
        let award = if capital { rewards.capital } else { rewards.zone };

        self.history.record(&self.state);
        let state = Arc::make_mut(&mut self.state);
        state.registry.add_score(defender, award);
        let advance = state.turns.advance_turn(&state.registry);
        debug!(%zone, %defender, award, "attack forfeited");
        self.commit(EventKind::Forfeited {
            zone,
            defender,
            award,
            next_team: EventKind::next_team(advance),
        });
        ClickOutcome::Forfeited { defender, award }
    }

    /// Commits the attacker's answer for the current round.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::NoPendingCapture`] if no capture is open.
    pub fn submit_attacker_answer(&mut self, is_correct: bool) -> Result<AnswerOutcome, GameError> {
        self.submit(Role::Attacker, is_correct)
    }

    /// Commits the defender's answer for the current round.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::NoPendingCapture`] if no capture is open.
    pub fn submit_defender_answer(&mut self, is_correct: bool) -> Result<AnswerOutcome, GameError> {
        self.submit(Role::Defender, is_correct)
    }

    fn submit(&mut self, role: Role, is_correct: bool) -> Result<AnswerOutcome, GameError> {
        let submission = self
            .arbiter
            .submit(role, is_correct)
            .inspect_err(|err| trace!(%role, %err, "answer rejected"))?;

        match submission {
            Submission::Ignored => Ok(AnswerOutcome::Ignored),
            Submission::Recorded => {
                self.answer_changed(role);
                Ok(AnswerOutcome::Recorded)
            }
            Submission::Retracted => {
                self.answer_changed(role);
                Ok(AnswerOutcome::Retracted)
            }
            Submission::SiegeRoundWon {
                consecutive_wins,
                required_wins,
            } => {
                let zone = self.arbiter.session().map(CaptureSession::zone);
                debug!(?zone, consecutive_wins, required_wins, "siege round won");
                if let Some(zone) = zone {
                    self.commit(EventKind::SiegeRoundWon {
                        zone,
                        consecutive_wins,
                    });
                }
                Ok(AnswerOutcome::SiegeRoundWon {
                    consecutive_wins,
                    required_wins,
                })
            }
            Submission::Decided(verdict) => {
                self.history.record(&self.state);
                let state = Arc::make_mut(&mut self.state);
                let resolution = apply_verdict(verdict, &mut state.registry, &self.rules);
                let advance = state.turns.advance_turn(&state.registry);
                info!(
                    zone = %verdict.zone,
                    attacker = %verdict.attacker,
                    kind = ?verdict.kind,
                    reward = resolution.attacker_reward,
                    "capture resolved"
                );
                if let TurnAdvance::NewRound { round, team } = advance {
                    info!(round, %team, "new round");
                }
                self.commit(EventKind::CaptureResolved {
                    resolution,
                    next_team: EventKind::next_team(advance),
                });
                Ok(AnswerOutcome::Resolved(resolution))
            }
        }
    }

    fn answer_changed(&mut self, role: Role) {
        let answer = self.arbiter.session().and_then(|session| match role {
            Role::Attacker => session.attacker_answer(),
            Role::Defender => session.defender_answer(),
        });
        self.commit(EventKind::AnswerChanged { role, answer });
    }

    /// Drops the open capture with no effect on state or turn.
    ///
    /// Returns false when nothing was open.
    pub fn cancel_capture(&mut self) -> bool {
        let Some(session) = self.arbiter.cancel() else {
            return false;
        };
        debug!(zone = %session.zone(), "capture cancelled");
        self.commit(EventKind::CaptureCancelled {
            zone: session.zone(),
        });
        true
    }

    /// Ends the active team's turn without an attack.
    ///
    /// Returns the team whose turn it now is.
    ///
    /// # Errors
    ///
    /// - [`GameError::InvalidPhase`] before the game has started
    /// - [`GameError::CaptureInProgress`] while a capture is open
    pub fn complete_turn(&mut self) -> Result<Option<TeamIndex>, GameError> {
        self.require_phase(GamePhase::Started)?;
        if self.arbiter.is_active() {
            return reject("complete_turn", GameError::CaptureInProgress);
        }

        self.history.record(&self.state);
        let state = Arc::make_mut(&mut self.state);
        let next_team = EventKind::next_team(state.turns.advance_turn(&state.registry));
        debug!(?next_team, "turn completed");
        self.commit(EventKind::TurnCompleted { next_team });
        Ok(next_team)
    }

    // =========================================================================
    // History
    // =========================================================================

    /// Restores the state before the last committed operation, discarding
    /// any open capture. Returns false if there is nothing to undo.
    pub fn undo(&mut self) -> bool {
        if !self.history.undo(&mut self.state) {
            return false;
        }
        self.arbiter.cancel();
        debug!(undo_depth = self.history.undo_depth(), "undo");
        self.commit(EventKind::Undone);
        true
    }

    /// Re-applies the last undone operation, discarding any open capture.
    /// Returns false if there is nothing to redo.
    pub fn redo(&mut self) -> bool {
        if !self.history.redo(&mut self.state) {
            return false;
        }
        self.arbiter.cancel();
        debug!(redo_depth = self.history.redo_depth(), "redo");
        self.commit(EventKind::Redone);
        true
    }

    /// Returns true if [`undo`](Self::undo) would do something.
    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    /// Returns true if [`redo`](Self::redo) would do something.
    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    // =========================================================================
    // Read access
    // =========================================================================

    /// Committed state.
    #[must_use]
    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// Rules in force.
    #[must_use]
    pub fn rules(&self) -> &RulesConfig {
        &self.rules
    }

    /// Current phase.
    #[must_use]
    pub fn phase(&self) -> GamePhase {
        self.state.phase()
    }

    /// Roster in registration order.
    #[must_use]
    pub fn teams(&self) -> &[Team] {
        self.state.teams()
    }

    /// One team by index.
    #[must_use]
    pub fn team(&self, team: TeamIndex) -> Option<&Team> {
        self.state.registry.team(team)
    }

    /// Turn pointer state.
    #[must_use]
    pub fn turn(&self) -> &TurnState {
        self.state.turn()
    }

    /// Team whose turn it is (or the selected claimer during setup).
    #[must_use]
    pub fn active_team(&self) -> Option<TeamIndex> {
        self.state.turns.active_team()
    }

    /// Owner of `zone`.
    #[must_use]
    pub fn owner_of(&self, zone: ZoneId) -> Option<TeamIndex> {
        self.state.registry.owner_of(zone)
    }

    /// Open capture, if any.
    #[must_use]
    pub fn capture(&self) -> Option<&CaptureSession> {
        self.arbiter.session()
    }

    /// Teams still holding zones. One entry means the game is decided.
    #[must_use]
    pub fn survivors(&self) -> Vec<TeamIndex> {
        self.state.survivors()
    }

    /// Drains pending state-change notifications.
    pub fn take_events(&mut self) -> Vec<GameEvent> {
        self.events.take_events()
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn require_phase(&self, expected: GamePhase) -> Result<(), GameError> {
        let actual = self.state.phase();
        if actual == expected {
            Ok(())
        } else {
            reject("phase check", GameError::InvalidPhase { expected, actual })
        }
    }

    fn commit(&mut self, kind: EventKind) {
        self.events.push(kind);
        debug_assert_eq!(check_invariants(&self.state), Vec::new());
    }
}

fn reject<T>(operation: &'static str, err: GameError) -> Result<T, GameError> {
    trace!(operation, %err, "rejected");
    Err(err)
}
