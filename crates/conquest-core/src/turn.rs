//! Turn rotation over teams that can be eliminated mid-game.
//!
//! # Rotation
//!
//! Within a round, turns follow `turns_order`, skipping teams that no longer
//! hold zones. When the end of the order is reached the round counter
//! increments, eliminated teams are dropped for good, and the surviving order
//! is rotated left by one so a different team opens the next round.
//!
//! ```text
//! round 1: [A, B, C]   B eliminated during the round
//! round 2: [C, A]      filter -> [A, C], rotate -> [C, A]
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::registry::TerritoryRegistry;
use crate::team::TeamIndex;

/// Game phase.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GamePhase {
    /// Teams register and claim starting zones.
    #[default]
    Prepare,
    /// Teams take turns attacking.
    Started,
}

impl fmt::Display for GamePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Prepare => write!(f, "prepare"),
            Self::Started => write!(f, "started"),
        }
    }
}

/// Turn pointer state.
///
/// During [`GamePhase::Prepare`], `active_team` is the team currently
/// selected to claim zones and the other fields are unused. Once started,
/// `active_team` always names a team that still holds zones.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnState {
    /// Teams taking turns this round, in order.
    pub turns_order: Vec<TeamIndex>,
    /// Position in `turns_order` of the team whose turn it is.
    pub current_turn_index: usize,
    /// 1-based round counter; 0 before the game starts.
    pub round_number: u32,
    /// Team whose turn it is.
    pub active_team: Option<TeamIndex>,
}

/// What [`TurnManager::advance_turn`] did.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum TurnAdvance {
    /// Another team in the same round is up.
    NextInRound(TeamIndex),
    /// The round ended and a new one began with this team.
    NewRound {
        /// Number of the round that just began.
        round: u32,
        /// Team opening the round.
        team: TeamIndex,
    },
    /// Nobody holds zones any more.
    NoSurvivors,
}

/// Phase and turn-order state machine.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnManager {
    phase: GamePhase,
    state: TurnState,
}

impl TurnManager {
    /// Creates a manager in the prepare phase.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the current phase.
    #[must_use]
    pub const fn phase(&self) -> GamePhase {
        self.phase
    }

    /// Returns the turn pointer state.
    #[must_use]
    pub fn state(&self) -> &TurnState {
        &self.state
    }

    /// Returns the active team.
    #[must_use]
    pub const fn active_team(&self) -> Option<TeamIndex> {
        self.state.active_team
    }

    /// Returns the current round number.
    #[must_use]
    pub const fn round_number(&self) -> u32 {
        self.state.round_number
    }

    /// Selects the team that claims zones during setup.
    pub(crate) fn select_for_prepare(&mut self, team: Option<TeamIndex>) {
        debug_assert_eq!(self.phase, GamePhase::Prepare);
        self.state.active_team = team;
    }

    /// Enters [`GamePhase::Started`] with `order` as the first round.
    ///
    /// The caller guarantees `order` is non-empty.
    pub fn start_game(&mut self, order: Vec<TeamIndex>) {
        debug_assert!(!order.is_empty(), "cannot start without teams");
        self.phase = GamePhase::Started;
        self.state = TurnState {
            active_team: order.first().copied(),
            turns_order: order,
            current_turn_index: 0,
            round_number: 1,
        };
    }

    /// Passes the turn to the next team that still holds zones.
    ///
    /// Scans the order strictly after the current position. If nobody is
    /// left in this round, a new round begins over the survivors, rotated
    /// left by one. A lone survivor keeps the turn forever.
    pub fn advance_turn(&mut self, registry: &TerritoryRegistry) -> TurnAdvance {
        let start = self.state.current_turn_index + 1;
        let next = self
            .state
            .turns_order
            .iter()
            .enumerate()
            .skip(start)
            .find(|(_, team)| registry.has_zones(**team));

        if let Some((position, &team)) = next {
            self.state.current_turn_index = position;
            self.state.active_team = Some(team);
            return TurnAdvance::NextInRound(team);
        }

        let mut order: Vec<TeamIndex> = self
            .state
            .turns_order
            .iter()
            .copied()
            .filter(|team| registry.has_zones(*team))
            .collect();
        if !order.is_empty() {
            order.rotate_left(1);
        }

        self.state.round_number += 1;
        self.state.current_turn_index = 0;
        self.state.active_team = order.first().copied();
        self.state.turns_order = order;

        match self.state.active_team {
            Some(team) => TurnAdvance::NewRound {
                round: self.state.round_number,
                team,
            },
            None => TurnAdvance::NoSurvivors,
        }
    }
}
