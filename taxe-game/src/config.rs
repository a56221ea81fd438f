//! Tunable game rules.
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants;

/// Errors raised when rule values violate their documented bounds.
#[derive(Debug, Error, PartialEq)]
pub enum RulesConfigError {
    #[error("{field} must be between {min:.2} and {max:.2} (got {value:.2})")]
    RangeViolation {
        field: &'static str,
        min: f64,
        max: f64,
        value: f64,
    },
    #[error("{field} must be at least {min} (got {value})")]
    MinViolation {
        field: &'static str,
        min: u64,
        value: u64,
    },
    #[error("rules are not valid JSON: {0}")]
    Json(String),
}

/// Rules consumed by the route graph, goal issuance and player ledgers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RulesConfig {
    #[serde(default = "RulesConfig::default_block_probability")]
    pub block_probability: f64,
    #[serde(default = "RulesConfig::default_block_duration_turns")]
    pub block_duration_turns: u32,
    #[serde(default = "RulesConfig::default_max_player_goals")]
    pub max_player_goals: usize,
    #[serde(default = "RulesConfig::default_goal_bonus")]
    pub goal_bonus: u32,
    #[serde(default = "RulesConfig::default_through_goal_chance")]
    pub through_goal_chance: f64,
    #[serde(default = "RulesConfig::default_timed_goal_chance")]
    pub timed_goal_chance: f64,
    #[serde(default = "RulesConfig::default_turn_budget_slack")]
    pub turn_budget_slack: u32,
}

impl RulesConfig {
    const fn default_block_probability() -> f64 {
        constants::BLOCK_PROBABILITY
    }

    const fn default_block_duration_turns() -> u32 {
        constants::BLOCK_DURATION_TURNS
    }

    const fn default_max_player_goals() -> usize {
        constants::MAX_PLAYER_GOALS
    }

    const fn default_goal_bonus() -> u32 {
        constants::GOAL_BONUS
    }

    const fn default_through_goal_chance() -> f64 {
        constants::THROUGH_GOAL_CHANCE
    }

    const fn default_timed_goal_chance() -> f64 {
        constants::TIMED_GOAL_CHANCE
    }

    const fn default_turn_budget_slack() -> u32 {
        constants::TURN_BUDGET_SLACK
    }

    /// Parse and validate rules from JSON. Missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// Returns `RulesConfigError` when the JSON is malformed or a value is out
    /// of bounds.
    pub fn from_json(json: &str) -> Result<Self, RulesConfigError> {
        let rules: Self =
            serde_json::from_str(json).map_err(|err| RulesConfigError::Json(err.to_string()))?;
        rules.validate()?;
        Ok(rules)
    }

    /// Validate rule invariants.
    ///
    /// # Errors
    ///
    /// Returns `RulesConfigError` when any field violates the documented bounds.
    pub fn validate(&self) -> Result<(), RulesConfigError> {
        Self::validate_chance("block_probability", self.block_probability)?;
        Self::validate_chance("through_goal_chance", self.through_goal_chance)?;
        Self::validate_chance("timed_goal_chance", self.timed_goal_chance)?;
        if self.block_duration_turns == 0 {
            return Err(RulesConfigError::MinViolation {
                field: "block_duration_turns",
                min: 1,
                value: 0,
            });
        }
        if self.max_player_goals == 0 {
            return Err(RulesConfigError::MinViolation {
                field: "max_player_goals",
                min: 1,
                value: 0,
            });
        }
        Ok(())
    }

    fn validate_chance(field: &'static str, value: f64) -> Result<(), RulesConfigError> {
        if !(0.0..=1.0).contains(&value) {
            return Err(RulesConfigError::RangeViolation {
                field,
                min: 0.0,
                max: 1.0,
                value,
            });
        }
        Ok(())
    }
}

/// Bernoulli draw for a rule chance. Chances outside `0.0..=1.0` saturate and
/// NaN never fires, so rules that skipped [`RulesConfig::validate`] cannot panic.
pub(crate) fn roll_chance<R: Rng + ?Sized>(rng: &mut R, chance: f64) -> bool {
    let chance = if chance.is_nan() { 0.0 } else { chance.clamp(0.0, 1.0) };
    rng.gen_bool(chance)
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            block_probability: Self::default_block_probability(),
            block_duration_turns: Self::default_block_duration_turns(),
            max_player_goals: Self::default_max_player_goals(),
            goal_bonus: Self::default_goal_bonus(),
            through_goal_chance: Self::default_through_goal_chance(),
            timed_goal_chance: Self::default_timed_goal_chance(),
            turn_budget_slack: Self::default_turn_budget_slack(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_json_yields_defaults() {
        let rules = RulesConfig::from_json("{}").unwrap();
        assert_eq!(rules, RulesConfig::default());
        assert_eq!(rules.block_duration_turns, 4);
        assert!((rules.block_probability - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn out_of_range_probability_is_rejected() {
        let err = RulesConfig::from_json(r#"{ "block_probability": 1.5 }"#).unwrap_err();
        assert!(matches!(
            err,
            RulesConfigError::RangeViolation { field, .. } if field == "block_probability"
        ));
    }

    #[test]
    fn zero_capacity_is_rejected() {
        let rules = RulesConfig {
            max_player_goals: 0,
            ..RulesConfig::default()
        };
        assert_eq!(
            rules.validate(),
            Err(RulesConfigError::MinViolation {
                field: "max_player_goals",
                min: 1,
                value: 0,
            })
        );
    }

    #[test]
    fn malformed_json_is_reported() {
        assert!(matches!(
            RulesConfig::from_json("[1, 2"),
            Err(RulesConfigError::Json(_))
        ));
    }
}
