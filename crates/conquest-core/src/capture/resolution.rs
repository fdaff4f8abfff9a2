//! Winner table and verdict application.
//!
//! # Winner Table
//!
//! | attacker | defender | winner                         |
//! |----------|----------|--------------------------------|
//! | wrong    | wrong    | defender                       |
//! | correct  | wrong    | attacker                       |
//! | wrong    | correct  | defender                       |
//! | correct  | correct  | whoever committed first        |
//!
//! Correctness decides unless both are right, in which case the first
//! committed answer wins the tie.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::RulesConfig;
use crate::registry::TerritoryRegistry;
use crate::turn::GamePhase;

use super::{Role, Verdict, VerdictKind};

/// Picks the winner of one enemy or siege round.
///
/// # Example
///
/// ```
/// use conquest_core::capture::{decide_winner, Role};
///
/// assert_eq!(decide_winner(true, false, &[Role::Defender, Role::Attacker]), Role::Attacker);
/// assert_eq!(decide_winner(true, true, &[Role::Defender, Role::Attacker]), Role::Defender);
/// ```
#[must_use]
pub fn decide_winner(
    attacker_correct: bool,
    defender_correct: bool,
    response_order: &[Role],
) -> Role {
    match (attacker_correct, defender_correct) {
        (true, false) => Role::Attacker,
        (false, _) => Role::Defender,
        (true, true) => match response_order.first() {
            Some(Role::Attacker) => Role::Attacker,
            _ => Role::Defender,
        },
    }
}

/// Effects of an applied verdict.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptureResolution {
    /// The decision that was applied.
    pub verdict: Verdict,
    /// Points added to the attacker.
    pub attacker_reward: i64,
    /// Zones that changed hands, the attacked zone included.
    pub zones_transferred: usize,
}

/// Applies `verdict` to the registry.
///
/// - Neutral claim: zone goes to the attacker, plus the neutral reward.
/// - Zone taken: zone moves from defender to attacker, plus the zone reward.
/// - Capital taken: every defender zone moves to the attacker, the defender
///   loses its capital, the captured capital becomes the attacker's capital,
///   plus the capital reward.
/// - Misses and holds change nothing.
///
/// # Panics
///
/// Panics if the verdict names a team that is not registered.
pub fn apply_verdict(
    verdict: Verdict,
    registry: &mut TerritoryRegistry,
    rules: &RulesConfig,
) -> CaptureResolution {
    let Verdict { zone, attacker, kind } = verdict;

    let (attacker_reward, zones_transferred) = match kind {
        VerdictKind::NeutralClaimed => {
            debug_assert_eq!(registry.owner_of(zone), None);
            registry.assign_zone(zone, attacker, GamePhase::Started);
            registry.add_score(attacker, rules.neutral_capture_reward);
            (rules.neutral_capture_reward, 1)
        }
        VerdictKind::ZoneTaken { defender } => {
            debug_assert_eq!(registry.owner_of(zone), Some(defender));
            registry.assign_zone(zone, attacker, GamePhase::Started);
            registry.add_score(attacker, rules.zone_capture_reward);
            (rules.zone_capture_reward, 1)
        }
        VerdictKind::CapitalTaken { defender } => {
            debug_assert_eq!(registry.owner_of(zone), Some(defender));
            registry.add_score(attacker, rules.capital_capture_reward);
            let moved = registry.transfer_all(defender, attacker, zone);
            registry.assign_zone(zone, attacker, GamePhase::Started);
            registry.set_base(attacker, zone);
            info!(
                %attacker,
                %defender,
                %zone,
                moved,
                "capital fallen, team eliminated"
            );
            (rules.capital_capture_reward, moved + 1)
        }
        VerdictKind::NeutralMissed | VerdictKind::Defended { .. } => (0, 0),
    };

    CaptureResolution {
        verdict,
        attacker_reward,
        zones_transferred,
    }
}
