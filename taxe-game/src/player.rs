//! Players, their goal ledgers and turn bookkeeping.
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::goal::Goal;

/// One-based player number as shown to players.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerNumber(pub u8);

impl fmt::Display for PlayerNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Player {}", self.0)
    }
}

/// Position of a goal inside its owner's ledger. Goals are never removed, so
/// ids stay valid for the lifetime of the player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GoalId(usize);

/// A player with a capacity-bounded goal ledger and running score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    number: PlayerNumber,
    score: u32,
    capacity: usize,
    goals: Vec<Goal>,
}

impl Player {
    #[must_use]
    pub const fn new(number: PlayerNumber, capacity: usize) -> Self {
        Self {
            number,
            score: 0,
            capacity,
            goals: Vec::new(),
        }
    }

    #[must_use]
    pub const fn number(&self) -> PlayerNumber {
        self.number
    }

    #[must_use]
    pub const fn score(&self) -> u32 {
        self.score
    }

    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Every goal ever accepted, complete or not.
    #[must_use]
    pub fn goals(&self) -> &[Goal] {
        &self.goals
    }

    #[must_use]
    pub fn goal(&self, id: GoalId) -> Option<&Goal> {
        self.goals.get(id.0)
    }

    pub fn active_goals(&self) -> impl Iterator<Item = (GoalId, &Goal)> {
        self.goals
            .iter()
            .enumerate()
            .filter(|(_, goal)| !goal.is_complete())
            .map(|(index, goal)| (GoalId(index), goal))
    }

    #[must_use]
    pub fn active_goal_count(&self) -> usize {
        self.active_goals().count()
    }

    /// Whether another goal would be accepted.
    #[must_use]
    pub fn has_capacity(&self) -> bool {
        self.active_goal_count() < self.capacity
    }

    /// Accept a goal unless the ledger already holds `capacity` incomplete
    /// goals. A rejected goal is dropped; the return value is the only signal.
    pub fn add_goal(&mut self, goal: Goal) -> bool {
        if !self.has_capacity() {
            log::debug!("{} at goal capacity; dropping \"{goal}\"", self.number);
            return false;
        }
        self.goals.push(goal);
        true
    }

    /// Complete a goal and credit `score + bonus`. Returns the points credited,
    /// or `None` when the goal is unknown or already complete.
    pub fn complete_goal(&mut self, id: GoalId) -> Option<u32> {
        let goal = self.goals.get_mut(id.0)?;
        if goal.is_complete() {
            return None;
        }
        goal.mark_complete();
        let points = goal.points();
        self.score = self.score.saturating_add(points);
        log::info!("{} completed \"{goal}\" for {points} points", self.number);
        Some(points)
    }

    /// Text of every incomplete goal, for display.
    #[must_use]
    pub fn goal_descriptions(&self) -> Vec<String> {
        self.active_goals().map(|(_, goal)| goal.to_string()).collect()
    }

    /// `"Player N: score"` header line.
    #[must_use]
    pub fn header(&self) -> String {
        format!("{}: {}", self.number, self.score)
    }
}

/// Ordered players plus the shared turn counter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerManager {
    players: Vec<Player>,
    current: usize,
    turn_number: u32,
}

impl PlayerManager {
    /// Players are numbered from 1.
    #[must_use]
    pub fn new(player_count: u8, capacity: usize) -> Self {
        let players = (1..=player_count.max(1))
            .map(|number| Player::new(PlayerNumber(number), capacity))
            .collect();
        Self {
            players,
            current: 0,
            turn_number: 0,
        }
    }

    #[must_use]
    pub const fn turn_number(&self) -> u32 {
        self.turn_number
    }

    #[must_use]
    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn players_mut(&mut self) -> &mut [Player] {
        &mut self.players
    }

    #[must_use]
    pub fn player(&self, number: PlayerNumber) -> Option<&Player> {
        self.players.iter().find(|player| player.number == number)
    }

    pub fn player_mut(&mut self, number: PlayerNumber) -> Option<&mut Player> {
        self.players.iter_mut().find(|player| player.number == number)
    }

    #[must_use]
    pub fn current_player(&self) -> &Player {
        &self.players[self.current]
    }

    /// Hand over to the next player; every hand-over is one game turn.
    pub fn end_turn(&mut self) {
        self.current = (self.current + 1) % self.players.len();
        self.turn_number = self.turn_number.saturating_add(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::{Position, Station, StationKind};

    fn goal(bonus: u32) -> Goal {
        let paris = Station::new("Paris", Position::new(0, 0), StationKind::Station);
        let madrid = Station::new("Madrid", Position::new(3, 4), StationKind::Station);
        Goal::new(&paris, &madrid, None, 0, 0, bonus)
    }

    #[test]
    fn ledger_drops_goals_past_capacity() {
        let mut player = Player::new(PlayerNumber(1), 2);
        assert!(player.add_goal(goal(0)));
        assert!(player.add_goal(goal(0)));
        assert!(!player.has_capacity());
        assert!(!player.add_goal(goal(0)));
        assert_eq!(player.active_goal_count(), 2);
        assert_eq!(player.goals().len(), 2);
    }

    #[test]
    fn completing_frees_capacity_and_credits_once() {
        let mut player = Player::new(PlayerNumber(2), 1);
        assert!(player.add_goal(goal(10)));
        let (id, _) = player.active_goals().next().unwrap();

        assert_eq!(player.complete_goal(id), Some(15));
        assert_eq!(player.complete_goal(id), None);
        assert_eq!(player.score(), 15);
        assert!(player.goal(id).unwrap().is_complete());
        assert!(player.has_capacity());
        assert!(player.goal_descriptions().is_empty());
        assert_eq!(player.header(), "Player 2: 15");
    }

    #[test]
    fn descriptions_skip_completed_goals() {
        let mut player = Player::new(PlayerNumber(1), 3);
        player.add_goal(goal(0));
        player.add_goal(goal(0));
        let (id, _) = player.active_goals().next().unwrap();
        player.complete_goal(id);
        assert_eq!(
            player.goal_descriptions(),
            vec!["Send a train from Paris to Madrid".to_string()]
        );
    }

    #[test]
    fn manager_rotates_players_and_counts_turns() {
        let mut manager = PlayerManager::new(2, 3);
        assert_eq!(manager.current_player().number(), PlayerNumber(1));
        manager.end_turn();
        assert_eq!(manager.current_player().number(), PlayerNumber(2));
        manager.end_turn();
        assert_eq!(manager.current_player().number(), PlayerNumber(1));
        assert_eq!(manager.turn_number(), 2);
        assert!(manager.player(PlayerNumber(3)).is_none());
    }
}
