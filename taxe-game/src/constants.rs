//! Centralized tuning constants for TaxE game logic.
//!
//! Rule defaults are collected here so that `RulesConfig` and the map loader
//! agree on one set of values.

/// Chance per turn that a random connection gets blocked.
pub const BLOCK_PROBABILITY: f64 = 0.5;
/// Number of turns a freshly blocked connection stays impassable.
pub const BLOCK_DURATION_TURNS: u32 = 4;
/// Maximum number of incomplete goals a player may hold.
pub const MAX_PLAYER_GOALS: usize = 3;
/// Bonus points attached to goals carrying a through or turn constraint.
pub const GOAL_BONUS: u32 = 50;
pub const THROUGH_GOAL_CHANCE: f64 = 0.3;
pub const TIMED_GOAL_CHANCE: f64 = 0.3;
/// Extra turns granted on top of the shortest route's hop count.
pub const TURN_BUDGET_SLACK: u32 = 2;

/// Label used in goal text when no train is required.
pub(crate) const DEFAULT_TRAIN_LABEL: &str = "train";
/// Only recognized goal constraint key.
pub(crate) const TRAIN_CONSTRAINT_KEY: &str = "train";
