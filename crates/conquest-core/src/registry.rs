//! Territory registry: the team roster and the zone-ownership partition.
//!
//! The registry is the only place teams are created or mutated. It provides:
//! - Team registration with color assignment
//! - The toggle/transfer zone assignment used during setup and capture
//! - Whole-territory transfer for capital conquest
//! - Owner lookup through an index kept in sync with every team's zone set
//!
//! # Ownership Partition
//!
//! Every zone belongs to at most one team. The registry keeps a `BTreeMap`
//! from zone to owner next to the per-team zone sets; both are updated in the
//! same call, so `owner_of` never needs to scan the roster. The
//! [`invariants`](crate::invariants) module cross-checks the two.
//!
//! # Example
//!
//! ```
//! use conquest_core::collab::ColorPool;
//! use conquest_core::registry::{TerritoryRegistry, ZoneAssignment};
//! use conquest_core::team::ZoneId;
//! use conquest_core::turn::GamePhase;
//!
//! let mut colors = ColorPool::default_palette(7);
//! let mut registry = TerritoryRegistry::new();
//! let owls = registry.register_team("Owls", 1000, &mut colors).unwrap();
//!
//! let zone = ZoneId::new(4);
//! let result = registry.assign_zone(zone, owls, GamePhase::Prepare);
//! assert_eq!(result, ZoneAssignment::Claimed { previous_owner: None });
//!
//! // The first zone claimed during setup becomes the capital.
//! assert_eq!(registry.team(owls).unwrap().base(), Some(zone));
//! assert_eq!(registry.owner_of(zone), Some(owls));
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::collab::ColorPool;
use crate::error::{GameError, PoolKind};
use crate::team::{Team, TeamIndex, ZoneId};
use crate::turn::GamePhase;

/// What [`TerritoryRegistry::assign_zone`] did.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ZoneAssignment {
    /// The team already owned the zone and gave it up.
    Released,
    /// The team took the zone, from `previous_owner` if it had one.
    Claimed {
        /// Team the zone was stripped from.
        previous_owner: Option<TeamIndex>,
    },
}

/// Team roster plus zone ownership.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TerritoryRegistry {
    /// Roster in registration order; a team's index is its position.
    teams: Vec<Team>,
    /// Zone to owner, mirroring the teams' zone sets.
    owners: BTreeMap<ZoneId, TeamIndex>,
}

impl TerritoryRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a team with `starting_score`, no zones, no capital and the
    /// next color from `colors`.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::PoolExhausted`] if `colors` is empty. Nothing is
    /// registered in that case.
    pub fn register_team(
        &mut self,
        name: impl Into<String>,
        starting_score: i64,
        colors: &mut ColorPool,
    ) -> Result<TeamIndex, GameError> {
        let color = colors.take().ok_or(GameError::PoolExhausted {
            pool: PoolKind::Colors,
        })?;
        let index = TeamIndex::new(self.teams.len());
        self.teams.push(Team::new(name, starting_score, color));
        Ok(index)
    }

    /// Toggles or transfers ownership of `zone` to `team`.
    ///
    /// - If `team` already owns `zone`, it is released (clearing the capital
    ///   if it was the capital).
    /// - Otherwise the zone is stripped from its current owner (clearing that
    ///   owner's capital if applicable) and given to `team`. During
    ///   [`GamePhase::Prepare`], a team without a capital gets this zone as
    ///   its capital.
    ///
    /// # Panics
    ///
    /// Panics if `team` is not a registered team. Callers validate indices
    /// before reaching the registry.
    pub fn assign_zone(
        &mut self,
        zone: ZoneId,
        team: TeamIndex,
        phase: GamePhase,
    ) -> ZoneAssignment {
        if self.owners.get(&zone) == Some(&team) {
            self.teams[team.as_usize()].remove_zone(zone);
            self.owners.remove(&zone);
            return ZoneAssignment::Released;
        }

        let previous_owner = self.owners.insert(zone, team);
        if let Some(previous) = previous_owner {
            self.teams[previous.as_usize()].remove_zone(zone);
        }

        let receiver = &mut self.teams[team.as_usize()];
        receiver.insert_zone(zone);
        if phase == GamePhase::Prepare && receiver.base().is_none() {
            receiver.set_base(Some(zone));
        }
        ZoneAssignment::Claimed { previous_owner }
    }

    /// Moves every zone of `from` except `except` into `to` and clears the
    /// capital of `from`.
    ///
    /// `except` stays with `from` (if `from` owns it). Returns the number of
    /// zones moved.
    ///
    /// # Panics
    ///
    /// Panics if either index is not a registered team.
    pub fn transfer_all(&mut self, from: TeamIndex, to: TeamIndex, except: ZoneId) -> usize {
        if from == to {
            return 0;
        }
        let mut zones = self.teams[from.as_usize()].take_zones();
        let kept = zones.remove(&except);

        let moved = zones.len();
        for zone in zones {
            self.owners.insert(zone, to);
            self.teams[to.as_usize()].insert_zone(zone);
        }
        if kept {
            self.teams[from.as_usize()].insert_zone(except);
        }
        moved
    }

    /// Makes `zone` the capital of `team`.
    ///
    /// # Panics
    ///
    /// Panics if `team` is not registered. Debug builds also assert that
    /// `team` owns `zone`.
    pub(crate) fn set_base(&mut self, team: TeamIndex, zone: ZoneId) {
        self.teams[team.as_usize()].set_base(Some(zone));
    }

    /// Adds `delta` to the score of `team`.
    ///
    /// # Panics
    ///
    /// Panics if `team` is not registered.
    pub(crate) fn add_score(&mut self, team: TeamIndex, delta: i64) {
        self.teams[team.as_usize()].add_score(delta);
    }

    /// Returns the owner of `zone`, if any.
    #[must_use]
    pub fn owner_of(&self, zone: ZoneId) -> Option<TeamIndex> {
        self.owners.get(&zone).copied()
    }

    /// Returns a team by index.
    #[must_use]
    pub fn team(&self, index: TeamIndex) -> Option<&Team> {
        self.teams.get(index.as_usize())
    }

    /// Returns the roster in registration order.
    #[must_use]
    pub fn teams(&self) -> &[Team] {
        &self.teams
    }

    /// Iterates over `(index, team)` pairs in registration order.
    pub fn indexed(&self) -> impl Iterator<Item = (TeamIndex, &Team)> + '_ {
        self.teams
            .iter()
            .enumerate()
            .map(|(i, team)| (TeamIndex::new(i), team))
    }

    /// Returns true if `index` names a registered team.
    #[must_use]
    pub fn contains(&self, index: TeamIndex) -> bool {
        index.as_usize() < self.teams.len()
    }

    /// Returns true if `index` is registered and still holds zones.
    #[must_use]
    pub fn has_zones(&self, index: TeamIndex) -> bool {
        self.team(index).is_some_and(|team| !team.is_eliminated())
    }

    /// Number of registered teams.
    #[must_use]
    pub fn team_count(&self) -> usize {
        self.teams.len()
    }

    /// Returns the zone-to-owner index.
    #[must_use]
    pub fn owners(&self) -> &BTreeMap<ZoneId, TeamIndex> {
        &self.owners
    }
}
