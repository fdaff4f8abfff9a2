//! Core identifiers and the team record.
//!
//! This module provides the value types everything else is built on:
//! - [`ZoneId`]: Opaque identifier for a map region
//! - [`TeamIndex`]: Position of a team in the registry roster
//! - [`ColorToken`]: Opaque avatar color handed out by the color pool
//! - [`Team`]: Name, score, owned zones and capital of one team
//!
//! # Example
//!
//! ```
//! use conquest_core::team::{ColorToken, Team, ZoneId};
//!
//! let team = Team::new("Owls", 1000, ColorToken::new("#7975b9"));
//!
//! assert_eq!(team.score(), 1000);
//! assert!(team.is_eliminated());
//! assert_eq!(team.base(), None);
//! assert!(!team.owns(ZoneId::new(3)));
//! ```

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque identifier for a map region.
///
/// `ZoneId` is a newtype wrapper around `u32`. The core never interprets the
/// value; geometry and adjacency belong to the
/// [`AdjacencyOracle`](crate::collab::AdjacencyOracle).
///
/// # Ordering
///
/// Zone IDs are ordered by their numeric value, which keeps zone sets and
/// ownership maps iterating in a deterministic order.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ZoneId(u32);

impl ZoneId {
    /// Creates a new `ZoneId` from a raw value.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Returns the raw value of this identifier.
    #[must_use]
    pub const fn as_u32(self) -> u32 {
        self.0
    }
}

impl fmt::Debug for ZoneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ZoneId({})", self.0)
    }
}

impl fmt::Display for ZoneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for ZoneId {
    fn from(id: u32) -> Self {
        Self::new(id)
    }
}

impl From<ZoneId> for u32 {
    fn from(id: ZoneId) -> Self {
        id.0
    }
}

/// Position of a team in the registry roster.
///
/// Teams are never removed during a game, so an index stays valid for the
/// whole game once it has been handed out by
/// [`TerritoryRegistry::register_team`](crate::registry::TerritoryRegistry::register_team).
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TeamIndex(usize);

impl TeamIndex {
    /// Creates a new `TeamIndex` from a raw roster position.
    #[must_use]
    pub const fn new(index: usize) -> Self {
        Self(index)
    }

    /// Returns the roster position.
    #[must_use]
    pub const fn as_usize(self) -> usize {
        self.0
    }
}

impl fmt::Debug for TeamIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TeamIndex({})", self.0)
    }
}

impl fmt::Display for TeamIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<usize> for TeamIndex {
    fn from(index: usize) -> Self {
        Self::new(index)
    }
}

/// Opaque, exchangeable avatar color.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ColorToken(String);

impl ColorToken {
    /// Creates a color token from any string-like value.
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Returns the token as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ColorToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A team taking part in the game.
///
/// # Invariants
///
/// - `base`, if set, is an element of `zones`
/// - A team with no zones is eliminated but stays in the roster
///
/// Mutation goes through [`TerritoryRegistry`](crate::registry::TerritoryRegistry),
/// which also maintains the cross-team ownership partition. The
/// crate-private mutators below never touch other teams.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    name: String,
    score: i64,
    zones: BTreeSet<ZoneId>,
    base: Option<ZoneId>,
    color: ColorToken,
}

impl Team {
    /// Creates a team with no zones and no capital.
    #[must_use]
    pub fn new(name: impl Into<String>, score: i64, color: ColorToken) -> Self {
        Self {
            name: name.into(),
            score,
            zones: BTreeSet::new(),
            base: None,
            color,
        }
    }

    /// Returns the display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the current score.
    #[must_use]
    pub const fn score(&self) -> i64 {
        self.score
    }

    /// Returns the owned zones in ascending order.
    #[must_use]
    pub fn zones(&self) -> &BTreeSet<ZoneId> {
        &self.zones
    }

    /// Returns the capital zone, if any.
    #[must_use]
    pub const fn base(&self) -> Option<ZoneId> {
        self.base
    }

    /// Returns the avatar color.
    #[must_use]
    pub fn color(&self) -> &ColorToken {
        &self.color
    }

    /// Returns true if the team owns `zone`.
    #[must_use]
    pub fn owns(&self, zone: ZoneId) -> bool {
        self.zones.contains(&zone)
    }

    /// Returns true if `zone` is this team's capital.
    #[must_use]
    pub fn is_base(&self, zone: ZoneId) -> bool {
        self.base == Some(zone)
    }

    /// Returns true if the team holds no zones.
    #[must_use]
    pub fn is_eliminated(&self) -> bool {
        self.zones.is_empty()
    }

    pub(crate) fn add_score(&mut self, delta: i64) {
        self.score += delta;
    }

    pub(crate) fn insert_zone(&mut self, zone: ZoneId) {
        self.zones.insert(zone);
    }

    /// Removes `zone`, clearing the capital if it was the capital.
    pub(crate) fn remove_zone(&mut self, zone: ZoneId) -> bool {
        if self.base == Some(zone) {
            self.base = None;
        }
        self.zones.remove(&zone)
    }

    pub(crate) fn take_zones(&mut self) -> BTreeSet<ZoneId> {
        self.base = None;
        std::mem::take(&mut self.zones)
    }

    pub(crate) fn set_base(&mut self, zone: Option<ZoneId>) {
        debug_assert!(
            zone.iter().all(|z| self.zones.contains(z)),
            "base must be an owned zone"
        );
        self.base = zone;
    }
}
