//! # Conquest Core
//!
//! Rules engine for a turn-based zone conquest quiz game.
//!
//! Teams claim zones on a map, then take turns attacking neighbours. Every
//! attack is settled by a task both sides answer; the engine decides who
//! won, moves territory, awards points and passes the turn. Every committed
//! operation can be undone and redone.
//!
//! ## Architecture
//!
//! - **Registry** ([`registry`]): teams, scores and zone ownership
//! - **Turns** ([`turn`]): phase, turn order, round rotation
//! - **Capture** ([`capture`]): answer arbitration and verdict application
//! - **History** ([`history`]): copy-on-write undo/redo snapshots
//! - **Engine** ([`engine`]): the facade wiring the above together
//!
//! Map geometry, task content and avatar colors are consumed through the
//! ports in [`collab`]. Nothing here renders, persists or talks to a network.
//!
//! ## Usage
//!
//! ```rust
//! use conquest_core::{ColorPool, GameEngine, RulesConfig, ShuffledTaskPool, ZoneGraph, ZoneId};
//!
//! let map = ZoneGraph::from_borders(&[(1, 2), (2, 3)]);
//! let mut engine = GameEngine::new(
//!     RulesConfig::default(),
//!     map,
//!     ShuffledTaskPool::empty(),
//!     ColorPool::default_palette(42),
//! );
//!
//! let team = engine.register_team("Owls")?;
//! engine.set_active_team_for_prepare(Some(team))?;
//! engine.claim_or_release_zone(ZoneId::new(1))?;
//! engine.start_game()?;
//!
//! assert_eq!(engine.active_team(), Some(team));
//! # Ok::<(), conquest_core::GameError>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod capture;
pub mod collab;
pub mod config;
pub mod engine;
pub mod error;
pub mod event;
pub mod history;
pub mod invariants;
pub mod registry;
pub mod state;
pub mod team;
pub mod turn;

pub use capture::{CaptureResolution, CaptureSession, Role, Verdict, VerdictKind};
pub use collab::{AdjacencyOracle, ColorPool, ShuffledTaskPool, Task, TaskPool, ZoneGraph};
pub use config::{ForfeitRewards, RulesConfig};
pub use engine::{AnswerOutcome, ClickOutcome, GameEngine, IgnoreReason};
pub use error::{ConfigError, GameError, PoolKind};
pub use event::{EventKind, GameEvent};
pub use registry::{TerritoryRegistry, ZoneAssignment};
pub use state::GameState;
pub use team::{ColorToken, Team, TeamIndex, ZoneId};
pub use turn::{GamePhase, TurnState};

#[cfg(test)]
mod tests;
