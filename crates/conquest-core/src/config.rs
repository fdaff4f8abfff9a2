//! Scoring and siege rules.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Points awarded to a defender when the attacker forfeits an attack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForfeitRewards {
    /// Award when the forfeited zone is an ordinary zone.
    pub zone: i64,
    /// Award when the forfeited zone is the defender's capital.
    pub capital: i64,
}

impl Default for ForfeitRewards {
    fn default() -> Self {
        Self {
            zone: 100,
            capital: 200,
        }
    }
}

/// Configuration for a game.
///
/// Missing fields fall back to their defaults when loading from JSON.
///
/// # Example
///
/// ```
/// use conquest_core::config::RulesConfig;
///
/// let rules = RulesConfig::from_json_str(r#"{ "capital_required_wins": 2 }"#).unwrap();
/// assert_eq!(rules.capital_required_wins, 2);
/// assert_eq!(rules.starting_score, 1000);
/// assert!(rules.forfeit.is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RulesConfig {
    /// Score every team starts with
    pub starting_score: i64,
    /// Award for taking an unowned zone
    pub neutral_capture_reward: i64,
    /// Award for taking an ordinary enemy zone
    pub zone_capture_reward: i64,
    /// Award for taking an enemy capital
    pub capital_capture_reward: i64,
    /// Consecutive siege rounds the attacker must win to take a capital
    pub capital_required_wins: u32,
    /// Reject attacks when the task pool returns nothing
    pub require_tasks: bool,
    /// Alternate-click forfeit rule, disabled when `None`
    pub forfeit: Option<ForfeitRewards>,
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            starting_score: 1000,
            neutral_capture_reward: 100,
            zone_capture_reward: 100,
            capital_capture_reward: 400,
            capital_required_wins: 3,
            require_tasks: false,
            forfeit: None,
        }
    }
}

impl RulesConfig {
    /// Default rules with the forfeit rule enabled at its default awards.
    #[must_use]
    pub fn with_forfeit() -> Self {
        Self {
            forfeit: Some(ForfeitRewards::default()),
            ..Default::default()
        }
    }

    /// Parses and validates a JSON rules document.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed JSON and
    /// [`ConfigError::Invalid`] when a value fails [`validate`](Self::validate).
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks values the engine cannot run with.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] describing the first bad value.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.capital_required_wins == 0 {
            return Err(ConfigError::Invalid(
                "capital_required_wins must be at least 1",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_house_rules() {
        let rules = RulesConfig::default();
        assert_eq!(rules.starting_score, 1000);
        assert_eq!(rules.neutral_capture_reward, 100);
        assert_eq!(rules.zone_capture_reward, 100);
        assert_eq!(rules.capital_capture_reward, 400);
        assert_eq!(rules.capital_required_wins, 3);
        assert!(!rules.require_tasks);
        assert!(rules.forfeit.is_none());
    }

    #[test]
    fn forfeit_block_parses() {
        let rules =
            RulesConfig::from_json_str(r#"{ "forfeit": { "zone": 50, "capital": 150 } }"#)
                .unwrap();
        assert_eq!(
            rules.forfeit,
            Some(ForfeitRewards {
                zone: 50,
                capital: 150
            })
        );
    }

    #[test]
    fn zero_required_wins_rejected() {
        let err = RulesConfig::from_json_str(r#"{ "capital_required_wins": 0 }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn malformed_json_rejected() {
        let err = RulesConfig::from_json_str("{ starting_score: }").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn round_trips_through_json() {
        let rules = RulesConfig::with_forfeit();
        let json = serde_json::to_string(&rules).unwrap();
        assert_eq!(RulesConfig::from_json_str(&json).unwrap(), rules);
    }
}
