//! Scoring contracts and their evaluation against train histories.
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::constants::{DEFAULT_TRAIN_LABEL, TRAIN_CONSTRAINT_KEY};
use crate::map::Station;
use crate::train::TrainView;

pub mod issuer;
pub use issuer::GoalIssuer;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GoalError {
    #[error("{0} is not a valid goal constraint")]
    InvalidConstraint(String),
}

/// A contract to move a train from `origin` to `destination`, optionally
/// through an intermediary, within a turn budget, or with a named train.
///
/// Goals start active and become complete exactly once.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Goal {
    origin: Station,
    destination: Station,
    intermediary: Option<Station>,
    turn_issued: u32,
    turn_budget: u32,
    score: u32,
    bonus: u32,
    train_name: Option<String>,
    complete: bool,
    going_through: bool,
    in_turns: bool,
}

impl Goal {
    /// Issue a goal. The base score is the straight-line distance between origin
    /// and destination, rounded. An intermediary equal to either endpoint is kept
    /// for display only and does not add a through constraint. A `turn_budget`
    /// of zero means no deadline.
    #[must_use]
    pub fn new(
        origin: &Station,
        destination: &Station,
        intermediary: Option<&Station>,
        turn_issued: u32,
        turn_budget: u32,
        bonus: u32,
    ) -> Self {
        let going_through =
            intermediary.is_some_and(|station| station != origin && station != destination);
        let distance = origin.location().distance_to(destination.location());
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let score = distance.round() as u32;
        Self {
            origin: origin.clone(),
            destination: destination.clone(),
            intermediary: intermediary.cloned(),
            turn_issued,
            turn_budget,
            score,
            bonus,
            train_name: None,
            complete: false,
            going_through,
            in_turns: turn_budget != 0,
        }
    }

    /// Attach a constraint. `"train"` is the only recognized key and restricts
    /// the goal to a train with that exact name. Call before the first
    /// evaluation.
    ///
    /// # Errors
    ///
    /// Returns [`GoalError::InvalidConstraint`] for any other key.
    pub fn add_constraint(&mut self, key: &str, value: &str) -> Result<(), GoalError> {
        if key != TRAIN_CONSTRAINT_KEY {
            return Err(GoalError::InvalidConstraint(key.to_string()));
        }
        self.train_name = Some(value.to_string());
        Ok(())
    }

    /// The train passed the origin at or after the issue turn, is heading for
    /// the destination, and carries the required name if one is set.
    #[must_use]
    pub fn is_satisfied_by<T: TrainView + ?Sized>(&self, train: &T) -> bool {
        let passed_origin = train
            .history()
            .iter()
            .any(|entry| entry.station == self.origin.name() && entry.turn >= self.turn_issued);
        if !passed_origin || train.final_destination() != Some(&self.destination) {
            return false;
        }
        self.train_name
            .as_deref()
            .is_none_or(|required| required == train.name())
    }

    /// Satisfied, has a through constraint, and the train's route contains the
    /// intermediary. Visit order is not checked.
    #[must_use]
    pub fn passed_through_intermediary<T: TrainView + ?Sized>(&self, train: &T) -> bool {
        if !self.going_through || !self.is_satisfied_by(train) {
            return false;
        }
        self.intermediary
            .as_ref()
            .is_some_and(|station| train.route_contains(station))
    }

    /// Satisfied, has a turn budget, and `current_turn` has reached the
    /// deadline. This tests that the deadline has elapsed, so callers poll it
    /// every turn once the goal is satisfied.
    #[must_use]
    pub fn completed_within_budget<T: TrainView + ?Sized>(&self, train: &T, current_turn: u32) -> bool {
        if !self.in_turns || !self.is_satisfied_by(train) {
            return false;
        }
        self.deadline().is_some_and(|deadline| deadline <= current_turn)
    }

    /// Flag the goal complete. Idempotent.
    pub fn mark_complete(&mut self) {
        self.complete = true;
    }

    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.complete
    }

    #[must_use]
    pub const fn origin(&self) -> &Station {
        &self.origin
    }

    #[must_use]
    pub const fn destination(&self) -> &Station {
        &self.destination
    }

    #[must_use]
    pub const fn intermediary(&self) -> Option<&Station> {
        self.intermediary.as_ref()
    }

    #[must_use]
    pub const fn turn_issued(&self) -> u32 {
        self.turn_issued
    }

    #[must_use]
    pub const fn turn_budget(&self) -> u32 {
        self.turn_budget
    }

    /// Turn at which the budget runs out.
    #[must_use]
    pub const fn deadline(&self) -> Option<u32> {
        if self.in_turns {
            Some(self.turn_issued.saturating_add(self.turn_budget))
        } else {
            None
        }
    }

    #[must_use]
    pub const fn score(&self) -> u32 {
        self.score
    }

    #[must_use]
    pub const fn bonus(&self) -> u32 {
        self.bonus
    }

    /// Points credited on completion.
    #[must_use]
    pub const fn points(&self) -> u32 {
        self.score.saturating_add(self.bonus)
    }

    #[must_use]
    pub fn required_train(&self) -> Option<&str> {
        self.train_name.as_deref()
    }

    #[must_use]
    pub const fn is_going_through(&self) -> bool {
        self.going_through
    }

    #[must_use]
    pub const fn is_in_turns(&self) -> bool {
        self.in_turns
    }
}

impl fmt::Display for Goal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let train = self.train_name.as_deref().unwrap_or(DEFAULT_TRAIN_LABEL);
        write!(
            f,
            "Send a {train} from {} to {}",
            self.origin.name(),
            self.destination.name()
        )?;
        let through = self.intermediary.as_ref().filter(|_| self.going_through);
        match (through, self.in_turns) {
            (None, false) => Ok(()),
            (None, true) => write!(f, " in {}", self.turn_budget),
            (Some(station), false) => write!(f, " through {}", station.name()),
            // No space before "turns": the UI matches this text exactly.
            (Some(station), true) => {
                write!(f, " through {} in {}turns", station.name(), self.turn_budget)
            }
        }
    }
}
