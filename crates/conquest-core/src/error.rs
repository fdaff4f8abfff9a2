//! Error types for engine operations and configuration loading.
//!
//! Every [`GameError`] is a local, recoverable condition: the engine is left
//! exactly as it was before the rejected call. Broken internal invariants are
//! not reported here; they are caught by debug assertions (see
//! [`invariants`](crate::invariants)).

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::team::{TeamIndex, ZoneId};
use crate::turn::GamePhase;

/// Which external pool ran dry.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PoolKind {
    /// Avatar color pool consumed by team registration.
    Colors,
    /// Task pool consumed when an attack starts.
    Tasks,
}

impl fmt::Display for PoolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Colors => write!(f, "color"),
            Self::Tasks => write!(f, "task"),
        }
    }
}

/// Rejected caller operation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameError {
    /// Operation attempted in the wrong phase.
    #[error("operation requires the {expected} phase, game is in {actual}")]
    InvalidPhase {
        /// Phase the operation requires.
        expected: GamePhase,
        /// Phase the game is in.
        actual: GamePhase,
    },
    /// Zone claim with no team selected.
    #[error("no team is selected to claim zones")]
    NotActiveTeam,
    /// Answer submitted with no capture open.
    #[error("no capture is pending")]
    NoPendingCapture,
    /// A collaborator pool had nothing left to give.
    #[error("{pool} pool exhausted")]
    PoolExhausted {
        /// Pool that ran dry.
        pool: PoolKind,
    },
    /// Index does not name a registered team.
    #[error("unknown team {0}")]
    UnknownTeam(TeamIndex),
    /// Zone borders another team's territory during setup.
    #[error("zone {0} borders another team's territory")]
    ZoneDisabled(ZoneId),
    /// A capture is open and must resolve first.
    #[error("a capture is already in progress")]
    CaptureInProgress,
    /// Start requested while no team holds a zone.
    #[error("no team holds any zone")]
    NoContenders,
}

/// Failure to load a [`RulesConfig`](crate::config::RulesConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    /// JSON did not parse.
    #[error("malformed rules config: {0}")]
    Parse(#[from] serde_json::Error),
    /// JSON parsed but a value is out of range.
    #[error("invalid rules config: {0}")]
    Invalid(&'static str),
}
