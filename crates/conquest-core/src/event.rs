//! State-change notifications for presentation layers.
//!
//! The engine appends exactly one [`GameEvent`] per committed call. Rejected
//! calls (those returning `Err`) and calls that change nothing emit nothing.
//! A front end drains the log with [`EventLog::take_events`] after each call
//! and re-renders from the engine's read accessors.

use serde::{Deserialize, Serialize};

use crate::capture::{CaptureResolution, Role};
use crate::registry::ZoneAssignment;
use crate::team::{TeamIndex, ZoneId};
use crate::turn::TurnAdvance;

/// What a committed call changed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventKind {
    /// A team joined the roster.
    TeamRegistered {
        /// Team that joined.
        team: TeamIndex,
    },
    /// The team claiming zones during setup changed.
    PrepareTeamSelected {
        /// Newly selected team, `None` when cleared.
        team: Option<TeamIndex>,
    },
    /// A zone was claimed or released during setup.
    ZoneAssigned {
        /// Zone that changed.
        zone: ZoneId,
        /// Team that claimed or released it.
        team: TeamIndex,
        /// Whether it was claimed or released.
        assignment: ZoneAssignment,
    },
    /// Turns began.
    GameStarted {
        /// Team holding the first turn.
        first: TeamIndex,
    },
    /// An attack opened.
    CaptureStarted {
        /// Zone under attack.
        zone: ZoneId,
        /// Attacking team.
        attacker: TeamIndex,
        /// Zone owner, `None` for a neutral zone.
        defender: Option<TeamIndex>,
        /// Whether a capital siege began.
        capital: bool,
    },
    /// An answer was committed or retracted without finishing the capture.
    AnswerChanged {
        /// Party that answered.
        role: Role,
        /// Answer now on record, `None` after a retraction.
        answer: Option<bool>,
    },
    /// The attacker won a siege round; the siege continues.
    SiegeRoundWon {
        /// Capital under siege.
        zone: ZoneId,
        /// Rounds won so far.
        consecutive_wins: u32,
    },
    /// A capture finished and the turn passed.
    CaptureResolved {
        /// Applied verdict and its effects.
        resolution: CaptureResolution,
        /// Team whose turn it now is.
        next_team: Option<TeamIndex>,
    },
    /// The live capture was dropped.
    CaptureCancelled {
        /// Zone that was under attack.
        zone: ZoneId,
    },
    /// The attacker forfeited; the defender scored and the turn passed.
    Forfeited {
        /// Zone the attack was aimed at.
        zone: ZoneId,
        /// Team that received the award.
        defender: TeamIndex,
        /// Points awarded.
        award: i64,
        /// Team whose turn it now is.
        next_team: Option<TeamIndex>,
    },
    /// The active team ended its turn without attacking.
    TurnCompleted {
        /// Team whose turn it now is.
        next_team: Option<TeamIndex>,
    },
    /// History moved back one step.
    Undone,
    /// History moved forward one step.
    Redone,
}

impl EventKind {
    pub(crate) fn next_team(advance: TurnAdvance) -> Option<TeamIndex> {
        match advance {
            TurnAdvance::NextInRound(team) | TurnAdvance::NewRound { team, .. } => Some(team),
            TurnAdvance::NoSurvivors => None,
        }
    }
}

/// A sequenced notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameEvent {
    /// Monotonic per-engine sequence number, starting at 0.
    pub sequence: u64,
    /// What changed.
    pub kind: EventKind,
}

/// Append-only log drained by the caller.
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    events: Vec<GameEvent>,
    next_sequence: u64,
}

impl EventLog {
    /// Creates an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an event and returns its sequence number.
    pub fn push(&mut self, kind: EventKind) -> u64 {
        let sequence = self.next_sequence;
        self.next_sequence += 1;
        self.events.push(GameEvent { sequence, kind });
        sequence
    }

    /// Drains and returns all pending events in emission order.
    pub fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Number of undrained events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Returns true if nothing is waiting.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
