//! State invariants - sanity checks that detect bugs.
//!
//! These should never trigger for any sequence of engine calls. The engine
//! runs them as debug assertions after every committed operation, and the
//! property tests run them after every step.

use std::collections::BTreeMap;
use std::fmt;

use crate::state::GameState;
use crate::team::{TeamIndex, ZoneId};
use crate::turn::GamePhase;

/// Invariant violation report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvariantViolation {
    /// Description of the violated invariant.
    pub message: String,
}

impl fmt::Display for InvariantViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Invariant violation: {}", self.message)
    }
}

impl std::error::Error for InvariantViolation {}

/// Check all state invariants.
///
/// Returns a list of violations found, or empty if all invariants hold:
/// - zone sets of distinct teams are disjoint
/// - the owner index agrees with the zone sets
/// - every capital is an owned zone
/// - once started, the active team holds zones (unless nobody does)
#[must_use]
pub fn check_invariants(state: &GameState) -> Vec<InvariantViolation> {
    let mut violations = Vec::new();
    let registry = &state.registry;

    let mut seen: BTreeMap<ZoneId, TeamIndex> = BTreeMap::new();
    for (index, team) in registry.indexed() {
        for &zone in team.zones() {
            if let Some(other) = seen.insert(zone, index) {
                violations.push(InvariantViolation {
                    message: format!("zone {zone} owned by both team {other} and team {index}"),
                });
            }
            if registry.owner_of(zone) != Some(index) {
                violations.push(InvariantViolation {
                    message: format!(
                        "zone {zone} held by team {index} but indexed to {:?}",
                        registry.owner_of(zone)
                    ),
                });
            }
        }
        if let Some(base) = team.base() {
            if !team.owns(base) {
                violations.push(InvariantViolation {
                    message: format!("team {index} has capital {base} it does not own"),
                });
            }
        }
    }

    for (&zone, &owner) in registry.owners() {
        if !registry.team(owner).is_some_and(|team| team.owns(zone)) {
            violations.push(InvariantViolation {
                message: format!("owner index maps zone {zone} to team {owner} which lacks it"),
            });
        }
    }

    if state.phase() == GamePhase::Started {
        let anyone_alive = registry.teams().iter().any(|team| !team.is_eliminated());
        match state.turn().active_team {
            Some(active) if !registry.has_zones(active) && anyone_alive => {
                violations.push(InvariantViolation {
                    message: format!("eliminated team {active} is active"),
                });
            }
            None if anyone_alive => violations.push(InvariantViolation {
                message: "no active team while teams still hold zones".to_owned(),
            }),
            _ => {}
        }
    }

    violations
}
