//! Capture arbitration: resolving an attack on a zone.
//!
//! An attack opens a [`CaptureSession`]. Attacker and defender each commit a
//! correct/incorrect answer to the session's task; once the session has what
//! it needs, the [`CaptureArbiter`] hands back a [`Verdict`] which the engine
//! applies with [`apply_verdict`].
//!
//! # States
//!
//! ```text
//! Idle --initiate--> AwaitingResponse --answers--> Resolved --> Idle
//!                        ^      |
//!                        +------+  capital siege round won, more rounds needed
//! ```
//!
//! - **Neutral zone**: the attacker's answer alone decides; the defender
//!   side is ignored.
//! - **Enemy zone**: both answers are needed; see [`decide_winner`].
//! - **Capital**: the attacker must win `required_wins` consecutive rounds,
//!   each on its own preselected task. One defender win ends the siege.
//!
//! Answers toggle: committing the same value twice retracts it, letting a
//! party take back a premature input before the session resolves.
//!
//! Deciding and applying are split so that the engine can snapshot history
//! between the two. The arbiter itself never touches the registry.

mod resolution;

pub use resolution::{apply_verdict, decide_winner, CaptureResolution};

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::collab::{Task, TaskPool};
use crate::config::RulesConfig;
use crate::error::{GameError, PoolKind};
use crate::state::GameState;
use crate::team::{TeamIndex, ZoneId};
use crate::turn::GamePhase;

/// Party to a capture.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    /// The active team, attacking the zone.
    Attacker,
    /// The zone's owner.
    Defender,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Attacker => write!(f, "attacker"),
            Self::Defender => write!(f, "defender"),
        }
    }
}

/// Multi-round state of a capital siege.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Siege {
    /// Rounds the attacker has won in a row.
    pub consecutive_wins: u32,
    /// Rounds needed to take the capital.
    pub required_wins: u32,
    /// One task per round, drawn when the siege opened.
    pub preselected_tasks: Vec<Task>,
}

/// What is being attacked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Target {
    /// Unowned zone; no defender.
    Neutral,
    /// Ordinary zone of `defender`.
    Zone {
        /// Owner of the zone.
        defender: TeamIndex,
    },
    /// Capital of `defender`.
    Capital {
        /// Owner of the capital.
        defender: TeamIndex,
        /// Round progress.
        siege: Siege,
    },
}

/// One attack in progress.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptureSession {
    zone: ZoneId,
    attacker: TeamIndex,
    target: Target,
    attacker_answer: Option<bool>,
    defender_answer: Option<bool>,
    response_order: Vec<Role>,
    current_task: Option<Task>,
}

impl CaptureSession {
    /// Zone under attack.
    #[must_use]
    pub const fn zone(&self) -> ZoneId {
        self.zone
    }

    /// Attacking team.
    #[must_use]
    pub const fn attacker(&self) -> TeamIndex {
        self.attacker
    }

    /// Defending team, `None` for a neutral zone.
    #[must_use]
    pub const fn defender(&self) -> Option<TeamIndex> {
        match &self.target {
            Target::Neutral => None,
            Target::Zone { defender } | Target::Capital { defender, .. } => Some(*defender),
        }
    }

    /// Target classification.
    #[must_use]
    pub const fn target(&self) -> &Target {
        &self.target
    }

    /// True for an unowned zone.
    #[must_use]
    pub const fn is_neutral(&self) -> bool {
        matches!(self.target, Target::Neutral)
    }

    /// True for a capital siege.
    #[must_use]
    pub const fn is_capital(&self) -> bool {
        matches!(self.target, Target::Capital { .. })
    }

    /// Siege progress, for capital attacks only.
    #[must_use]
    pub const fn siege(&self) -> Option<&Siege> {
        match &self.target {
            Target::Capital { siege, .. } => Some(siege),
            _ => None,
        }
    }

    /// Siege rounds won so far (0 outside sieges).
    #[must_use]
    pub fn consecutive_wins(&self) -> u32 {
        self.siege().map_or(0, |siege| siege.consecutive_wins)
    }

    /// Attacker's committed answer this round.
    #[must_use]
    pub const fn attacker_answer(&self) -> Option<bool> {
        self.attacker_answer
    }

    /// Defender's committed answer this round.
    #[must_use]
    pub const fn defender_answer(&self) -> Option<bool> {
        self.defender_answer
    }

    /// Roles in the order they committed their current answers.
    #[must_use]
    pub fn response_order(&self) -> &[Role] {
        &self.response_order
    }

    /// 1-based commit position of `role` this round, if it has answered.
    #[must_use]
    pub fn response_position(&self, role: Role) -> Option<usize> {
        self.response_order
            .iter()
            .position(|r| *r == role)
            .map(|i| i + 1)
    }

    /// Task the parties are answering.
    #[must_use]
    pub const fn current_task(&self) -> Option<&Task> {
        self.current_task.as_ref()
    }

    fn answer_slot(&mut self, role: Role) -> &mut Option<bool> {
        match role {
            Role::Attacker => &mut self.attacker_answer,
            Role::Defender => &mut self.defender_answer,
        }
    }

    /// Commits or retracts an answer. Returns false on retraction.
    fn commit(&mut self, role: Role, is_correct: bool) -> bool {
        let slot = self.answer_slot(role);
        if *slot == Some(is_correct) {
            *slot = None;
            self.response_order.retain(|r| *r != role);
            return false;
        }
        *slot = Some(is_correct);
        if !self.response_order.contains(&role) {
            self.response_order.push(role);
        }
        true
    }

    fn reset_round(&mut self) {
        self.attacker_answer = None;
        self.defender_answer = None;
        self.response_order.clear();
    }
}

/// Outcome class of a finished capture.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum VerdictKind {
    /// Attacker answered correctly and takes the unowned zone.
    NeutralClaimed,
    /// Attacker answered incorrectly; nothing changes.
    NeutralMissed,
    /// Attacker wins an ordinary enemy zone.
    ZoneTaken {
        /// Team losing the zone.
        defender: TeamIndex,
    },
    /// Attacker completed the siege; the defender is eliminated.
    CapitalTaken {
        /// Team losing everything.
        defender: TeamIndex,
    },
    /// Defender held.
    Defended {
        /// Team that held.
        defender: TeamIndex,
        /// Whether the zone was a capital.
        capital: bool,
        /// Siege rounds the attacker had won before the hold.
        rounds_won: u32,
    },
}

/// Decision on a finished capture, not yet applied.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verdict {
    /// Zone that was attacked.
    pub zone: ZoneId,
    /// Attacking team.
    pub attacker: TeamIndex,
    /// What happened.
    pub kind: VerdictKind,
}

impl Verdict {
    /// Winner of the capture.
    #[must_use]
    pub const fn winner(&self) -> Option<Role> {
        match self.kind {
            VerdictKind::NeutralClaimed
            | VerdictKind::ZoneTaken { .. }
            | VerdictKind::CapitalTaken { .. } => Some(Role::Attacker),
            VerdictKind::Defended { .. } => Some(Role::Defender),
            VerdictKind::NeutralMissed => None,
        }
    }
}

/// Result of submitting one answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission {
    /// Answer stored; waiting for the other party.
    Recorded,
    /// Same value committed twice; the answer was withdrawn.
    Retracted,
    /// Defender answer on a neutral capture; nothing to do.
    Ignored,
    /// Attacker won a siege round; the next round is open on a new task.
    SiegeRoundWon {
        /// Rounds won so far.
        consecutive_wins: u32,
        /// Rounds needed.
        required_wins: u32,
    },
    /// Session finished; the engine must apply the verdict.
    Decided(Verdict),
}

/// Owner of the live capture session.
#[derive(Debug, Clone, Default)]
pub struct CaptureArbiter {
    session: Option<CaptureSession>,
}

impl CaptureArbiter {
    /// Creates an idle arbiter.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the live session, if any.
    #[must_use]
    pub fn session(&self) -> Option<&CaptureSession> {
        self.session.as_ref()
    }

    /// Returns true if a capture is in progress.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.session.is_some()
    }

    /// Opens a capture of `zone` by `attacker`.
    ///
    /// Draws one task, or `rules.capital_required_wins` distinct tasks for a
    /// capital. A short draw is tolerated unless `rules.require_tasks` is set.
    ///
    /// # Errors
    ///
    /// - [`GameError::InvalidPhase`] outside [`GamePhase::Started`]
    /// - [`GameError::CaptureInProgress`] if a session is already live
    /// - [`GameError::PoolExhausted`] if tasks are required and none came back
    pub fn initiate(
        &mut self,
        zone: ZoneId,
        attacker: TeamIndex,
        state: &GameState,
        tasks: &mut dyn TaskPool,
        rules: &RulesConfig,
    ) -> Result<&CaptureSession, GameError> {
        if state.phase() != GamePhase::Started {
            return Err(GameError::InvalidPhase {
                expected: GamePhase::Started,
                actual: state.phase(),
            });
        }
        if self.session.is_some() {
            return Err(GameError::CaptureInProgress);
        }
        let owner = state.registry.owner_of(zone);
        debug_assert_ne!(
            owner,
            Some(attacker),
            "own zones are filtered by the engine"
        );

        let (target, drawn) = match owner {
            None => (Target::Neutral, tasks.draw_random(1)),
            Some(defender) => {
                let is_capital = state
                    .registry
                    .team(defender)
                    .is_some_and(|team| team.is_base(zone));
                if is_capital {
                    let required_wins = rules.capital_required_wins;
                    let preselected = tasks.draw_random(required_wins as usize);
                    let siege = Siege {
                        consecutive_wins: 0,
                        required_wins,
                        preselected_tasks: preselected.clone(),
                    };
                    (Target::Capital { defender, siege }, preselected)
                } else {
                    (Target::Zone { defender }, tasks.draw_random(1))
                }
            }
        };

        if rules.require_tasks && drawn.is_empty() {
            return Err(GameError::PoolExhausted {
                pool: PoolKind::Tasks,
            });
        }

        Ok(self.session.insert(CaptureSession {
            zone,
            attacker,
            target,
            attacker_answer: None,
            defender_answer: None,
            response_order: Vec::new(),
            current_task: drawn.into_iter().next(),
        }))
    }

    /// Commits `is_correct` as `role`'s answer for the current round.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::NoPendingCapture`] if no session is live.
    pub fn submit(&mut self, role: Role, is_correct: bool) -> Result<Submission, GameError> {
        let session = self.session.as_mut().ok_or(GameError::NoPendingCapture)?;

        if role == Role::Defender && session.is_neutral() {
            return Ok(Submission::Ignored);
        }
        if !session.commit(role, is_correct) {
            trace!(zone = %session.zone, %role, "answer retracted");
            return Ok(Submission::Retracted);
        }

        if session.is_neutral() {
            let kind = if is_correct {
                VerdictKind::NeutralClaimed
            } else {
                VerdictKind::NeutralMissed
            };
            return Ok(self.finish(kind));
        }

        let (Some(attacker_correct), Some(defender_correct)) =
            (session.attacker_answer, session.defender_answer)
        else {
            return Ok(Submission::Recorded);
        };
        let winner = decide_winner(attacker_correct, defender_correct, &session.response_order);

        let kind = match (&mut session.target, winner) {
            (Target::Zone { defender }, Role::Attacker) => VerdictKind::ZoneTaken {
                defender: *defender,
            },
            (Target::Zone { defender }, Role::Defender) => VerdictKind::Defended {
                defender: *defender,
                capital: false,
                rounds_won: 0,
            },
            (Target::Capital { defender, siege }, Role::Defender) => VerdictKind::Defended {
                defender: *defender,
                capital: true,
                rounds_won: siege.consecutive_wins,
            },
            (Target::Capital { defender, siege }, Role::Attacker) => {
                siege.consecutive_wins += 1;
                if siege.consecutive_wins >= siege.required_wins {
                    VerdictKind::CapitalTaken {
                        defender: *defender,
                    }
                } else {
                    let round = Submission::SiegeRoundWon {
                        consecutive_wins: siege.consecutive_wins,
                        required_wins: siege.required_wins,
                    };
                    if let Some(next) = siege
                        .preselected_tasks
                        .get(siege.consecutive_wins as usize)
                    {
                        session.current_task = Some(next.clone());
                    }
                    session.reset_round();
                    return Ok(round);
                }
            }
            (Target::Neutral, _) => unreachable!("neutral captures resolve on the attacker answer"),
        };
        Ok(self.finish(kind))
    }

    /// Drops the live session without any effect. Returns it if there was one.
    pub fn cancel(&mut self) -> Option<CaptureSession> {
        self.session.take()
    }

    fn finish(&mut self, kind: VerdictKind) -> Submission {
        match self.session.take() {
            Some(session) => Submission::Decided(Verdict {
                zone: session.zone,
                attacker: session.attacker,
                kind,
            }),
            None => unreachable!("finish is only called with a live session"),
        }
    }
}
