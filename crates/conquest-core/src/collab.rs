//! Ports to the collaborators the engine consumes but does not own.
//!
//! - [`AdjacencyOracle`]: map geometry, reduced to "which zones touch these zones"
//! - [`TaskPool`]: question content handed to attacker and defender
//! - [`ColorPool`]: pre-shuffled avatar colors consumed by team registration
//!
//! Each port comes with a small reference implementation ([`ZoneGraph`],
//! [`ShuffledTaskPool`], [`ColorPool::default_palette`]) that is good enough
//! for tests and the self-play driver. Real front ends plug in their own.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::team::{ColorToken, ZoneId};

// =============================================================================
// Adjacency
// =============================================================================

/// Map adjacency consumed during the prepare phase.
///
/// # Example
///
/// ```
/// use std::collections::BTreeSet;
/// use conquest_core::collab::AdjacencyOracle;
/// use conquest_core::team::ZoneId;
///
/// // Any closure with the right shape is an oracle.
/// let line = |zones: &BTreeSet<ZoneId>| -> BTreeSet<ZoneId> {
///     zones
///         .iter()
///         .flat_map(|z| [z.as_u32().saturating_sub(1), z.as_u32() + 1])
///         .map(ZoneId::new)
///         .collect()
/// };
///
/// let around: BTreeSet<_> = [ZoneId::new(5)].into_iter().collect();
/// assert!(line.adjacent_zones(&around).contains(&ZoneId::new(6)));
/// ```
pub trait AdjacencyOracle {
    /// Returns every zone adjacent to any zone in `zones`.
    fn adjacent_zones(&self, zones: &BTreeSet<ZoneId>) -> BTreeSet<ZoneId>;
}

impl<F> AdjacencyOracle for F
where
    F: Fn(&BTreeSet<ZoneId>) -> BTreeSet<ZoneId>,
{
    fn adjacent_zones(&self, zones: &BTreeSet<ZoneId>) -> BTreeSet<ZoneId> {
        self(zones)
    }
}

/// Undirected zone graph backed by an adjacency list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoneGraph {
    edges: BTreeMap<ZoneId, BTreeSet<ZoneId>>,
}

impl ZoneGraph {
    /// Creates an empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a graph from a list of borders.
    #[must_use]
    pub fn from_borders(borders: &[(u32, u32)]) -> Self {
        let mut graph = Self::new();
        for &(a, b) in borders {
            graph.add_border(ZoneId::new(a), ZoneId::new(b));
        }
        graph
    }

    /// Records that `a` and `b` share a border.
    pub fn add_border(&mut self, a: ZoneId, b: ZoneId) {
        if a == b {
            return;
        }
        self.edges.entry(a).or_default().insert(b);
        self.edges.entry(b).or_default().insert(a);
    }

    /// Returns the direct neighbours of one zone.
    #[must_use]
    pub fn neighbours(&self, zone: ZoneId) -> Option<&BTreeSet<ZoneId>> {
        self.edges.get(&zone)
    }

    /// Returns every zone that appears in at least one border.
    pub fn zones(&self) -> impl Iterator<Item = ZoneId> + '_ {
        self.edges.keys().copied()
    }
}

impl AdjacencyOracle for ZoneGraph {
    fn adjacent_zones(&self, zones: &BTreeSet<ZoneId>) -> BTreeSet<ZoneId> {
        zones
            .iter()
            .filter_map(|zone| self.edges.get(zone))
            .flatten()
            .copied()
            .collect()
    }
}

// =============================================================================
// Tasks
// =============================================================================

/// Identifier of a task record.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TaskId(pub u32);

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A question put to both parties of a capture.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Stable identifier within the pool.
    pub id: TaskId,
    /// Question text.
    pub text: String,
    /// Optional illustration reference, opaque to the core.
    pub image_ref: Option<String>,
}

impl Task {
    /// Creates a text-only task.
    #[must_use]
    pub fn new(id: u32, text: impl Into<String>) -> Self {
        Self {
            id: TaskId(id),
            text: text.into(),
            image_ref: None,
        }
    }

    /// Attaches an illustration reference.
    #[must_use]
    pub fn with_image(mut self, image_ref: impl Into<String>) -> Self {
        self.image_ref = Some(image_ref.into());
        self
    }
}

/// Source of task records.
pub trait TaskPool {
    /// Draws up to `n` distinct tasks. May return fewer when the pool is small.
    fn draw_random(&mut self, n: usize) -> Vec<Task>;
}

/// Task pool sampling without replacement per draw, seeded for replays.
///
/// Tasks are not consumed: a later draw may return a task seen before, but a
/// single draw never repeats one.
///
/// # Example
///
/// ```
/// use conquest_core::collab::{ShuffledTaskPool, Task, TaskPool};
///
/// let mut pool = ShuffledTaskPool::new(
///     (1..=5).map(|i| Task::new(i, format!("question {i}"))).collect(),
///     42,
/// );
/// let drawn = pool.draw_random(3);
/// assert_eq!(drawn.len(), 3);
/// assert_ne!(drawn[0].id, drawn[1].id);
/// ```
#[derive(Debug, Clone)]
pub struct ShuffledTaskPool {
    tasks: Vec<Task>,
    rng: ChaCha8Rng,
}

impl ShuffledTaskPool {
    /// Creates a pool over `tasks` with a deterministic sampler.
    #[must_use]
    pub fn new(tasks: Vec<Task>, seed: u64) -> Self {
        Self {
            tasks,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Creates a pool with no tasks.
    #[must_use]
    pub fn empty() -> Self {
        Self::new(Vec::new(), 0)
    }

    /// Number of tasks available.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Returns true if the pool holds no tasks.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

impl TaskPool for ShuffledTaskPool {
    fn draw_random(&mut self, n: usize) -> Vec<Task> {
        self.tasks
            .choose_multiple(&mut self.rng, n)
            .cloned()
            .collect()
    }
}

// =============================================================================
// Colors
// =============================================================================

/// Stock avatar palette.
const DEFAULT_PALETTE: [&str; 7] = [
    "#7975b9", "#007F73", "#FB9AD1", "#FFC470", "#C5FF95", "#4793AF", "#ff7171",
];

/// Fixed sequence of avatar colors, consumed from the end.
///
/// The pool is part of every history snapshot so that undoing a team
/// registration hands its color back.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorPool {
    tokens: Vec<ColorToken>,
}

impl ColorPool {
    /// Creates a pool that hands out `tokens` from last to first.
    #[must_use]
    pub fn new(tokens: Vec<ColorToken>) -> Self {
        Self { tokens }
    }

    /// The seven-color house palette, shuffled deterministically.
    #[must_use]
    pub fn default_palette(seed: u64) -> Self {
        let mut tokens: Vec<ColorToken> =
            DEFAULT_PALETTE.iter().map(|c| ColorToken::new(*c)).collect();
        tokens.shuffle(&mut ChaCha8Rng::seed_from_u64(seed));
        Self { tokens }
    }

    /// Removes and returns the next color, or `None` when exhausted.
    pub fn take(&mut self) -> Option<ColorToken> {
        self.tokens.pop()
    }

    /// Returns the color the next [`take`](Self::take) would hand out.
    #[must_use]
    pub fn peek(&self) -> Option<&ColorToken> {
        self.tokens.last()
    }

    /// Number of colors left.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.tokens.len()
    }
}
