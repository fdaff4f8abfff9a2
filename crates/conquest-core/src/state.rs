//! The committed game state: everything undo/redo restores.

use serde::{Deserialize, Serialize};

use crate::collab::ColorPool;
use crate::registry::TerritoryRegistry;
use crate::team::{Team, TeamIndex};
use crate::turn::{GamePhase, TurnManager, TurnState};

/// Teams, ownership, turn pointer and the remaining color pool.
///
/// A live capture is deliberately not part of this value: an attack in
/// progress is transient and is discarded by undo and redo.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameState {
    /// Team roster and zone ownership.
    pub registry: TerritoryRegistry,
    /// Phase and turn order.
    pub turns: TurnManager,
    /// Colors not yet handed to a team.
    pub colors: ColorPool,
}

impl GameState {
    /// Creates a fresh prepare-phase state drawing colors from `colors`.
    #[must_use]
    pub fn new(colors: ColorPool) -> Self {
        Self {
            registry: TerritoryRegistry::new(),
            turns: TurnManager::new(),
            colors,
        }
    }

    /// Returns the current phase.
    #[must_use]
    pub fn phase(&self) -> GamePhase {
        self.turns.phase()
    }

    /// Returns the turn pointer state.
    #[must_use]
    pub fn turn(&self) -> &TurnState {
        self.turns.state()
    }

    /// Returns the roster.
    #[must_use]
    pub fn teams(&self) -> &[Team] {
        self.registry.teams()
    }

    /// Teams that still hold at least one zone, in roster order.
    #[must_use]
    pub fn survivors(&self) -> Vec<TeamIndex> {
        self.registry
            .indexed()
            .filter(|(_, team)| !team.is_eliminated())
            .map(|(index, _)| index)
            .collect()
    }
}
