//! Per-turn driver binding the route graph, the players and a seeded RNG.
//!
//! Within a turn the graph is ticked before any new block is applied, and both
//! happen before goals are evaluated, so every query in a turn sees one graph
//! snapshot.
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::{RulesConfig, RulesConfigError};
use crate::goal::GoalIssuer;
use crate::map::{ConnectionId, RouteGraph};
use crate::player::{GoalId, PlayerManager, PlayerNumber};
use crate::train::TrainView;

/// Reasons a session cannot be set up.
#[derive(Debug, Error, PartialEq)]
pub enum SessionError {
    #[error(transparent)]
    Rules(#[from] RulesConfigError),
    #[error("a session needs at least one player")]
    NoPlayers,
}

/// A goal completed during a turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoalCompletion {
    pub player: PlayerNumber,
    pub goal: String,
    pub train: String,
    pub through: bool,
    /// The goal carried a turn budget and its deadline had been reached by
    /// the completing turn.
    pub deadline_reached: bool,
    pub points: u32,
}

/// What happened in one turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnReport {
    pub turn: u32,
    pub newly_blocked: Option<String>,
    pub blocked: Vec<String>,
    pub completions: Vec<GoalCompletion>,
}

#[derive(Debug, Clone)]
pub struct GameSession {
    graph: RouteGraph,
    players: PlayerManager,
    rules: RulesConfig,
    seed: u64,
    rng: ChaCha20Rng,
    newly_blocked: Option<ConnectionId>,
}

impl GameSession {
    /// # Errors
    ///
    /// Returns an error if `rules` violate their bounds or `player_count` is
    /// zero.
    pub fn new(
        graph: RouteGraph,
        rules: RulesConfig,
        player_count: u8,
        seed: u64,
    ) -> Result<Self, SessionError> {
        rules.validate()?;
        if player_count == 0 {
            return Err(SessionError::NoPlayers);
        }
        let players = PlayerManager::new(player_count, rules.max_player_goals);
        Ok(Self {
            graph,
            players,
            rules,
            seed,
            rng: ChaCha20Rng::seed_from_u64(seed),
            newly_blocked: None,
        })
    }

    #[must_use]
    pub const fn graph(&self) -> &RouteGraph {
        &self.graph
    }

    /// Mutable graph access, e.g. for repairing a connection.
    pub const fn graph_mut(&mut self) -> &mut RouteGraph {
        &mut self.graph
    }

    #[must_use]
    pub const fn players(&self) -> &PlayerManager {
        &self.players
    }

    pub const fn players_mut(&mut self) -> &mut PlayerManager {
        &mut self.players
    }

    #[must_use]
    pub const fn rules(&self) -> &RulesConfig {
        &self.rules
    }

    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.seed
    }

    #[must_use]
    pub const fn turn_number(&self) -> u32 {
        self.players.turn_number()
    }

    /// Issue goals to every player with spare capacity. Returns how many were
    /// accepted.
    pub fn top_up_goals(&mut self) -> usize {
        let turn = self.players.turn_number();
        let mut issued = 0;
        for player in self.players.players_mut() {
            while player.has_capacity() {
                let Some(goal) = GoalIssuer::issue(&self.graph, &mut self.rng, turn, &self.rules)
                else {
                    return issued;
                };
                if player.add_goal(goal) {
                    issued += 1;
                }
            }
        }
        issued
    }

    /// Tick blocked countdowns, then maybe block a random connection.
    pub fn begin_turn(&mut self) -> Option<ConnectionId> {
        self.graph.tick_turn();
        self.newly_blocked = self
            .graph
            .block_random_connection(&mut self.rng, &self.rules);
        self.newly_blocked
    }

    /// Evaluate goals against `trains`, credit completions and hand over to the
    /// next player. Drivers pass the trains that reached their final
    /// destination this turn; a train still en route already satisfies a goal
    /// whose origin it has visited.
    pub fn finish_turn<T: TrainView>(&mut self, trains: &[T]) -> TurnReport {
        let turn = self.players.turn_number();
        let completions = self.evaluate_goals(trains, turn);
        let report = TurnReport {
            turn,
            newly_blocked: self
                .newly_blocked
                .take()
                .map(|id| self.graph.describe_connection(self.graph.connection(id))),
            blocked: self
                .graph
                .blocked_connections()
                .into_iter()
                .map(|connection| self.graph.describe_connection(connection))
                .collect(),
            completions,
        };
        self.players.end_turn();
        report
    }

    /// [`Self::begin_turn`] followed by [`Self::finish_turn`], for drivers
    /// whose trains do not move between the two.
    pub fn advance_turn<T: TrainView>(&mut self, trains: &[T]) -> TurnReport {
        self.begin_turn();
        self.finish_turn(trains)
    }

    fn evaluate_goals<T: TrainView>(&mut self, trains: &[T], turn: u32) -> Vec<GoalCompletion> {
        let mut completions = Vec::new();
        for player in self.players.players_mut() {
            let owned: Vec<&T> = trains
                .iter()
                .filter(|train| train.owner() == player.number())
                .collect();
            let satisfied: Vec<(GoalId, GoalCompletion)> = player
                .active_goals()
                .filter_map(|(id, goal)| {
                    let train = owned.iter().find(|train| goal.is_satisfied_by(**train))?;
                    Some((
                        id,
                        GoalCompletion {
                            player: player.number(),
                            goal: goal.to_string(),
                            train: train.name().to_string(),
                            through: goal.passed_through_intermediary(*train),
                            deadline_reached: goal.completed_within_budget(*train, turn),
                            points: 0,
                        },
                    ))
                })
                .collect();
            for (id, mut completion) in satisfied {
                if let Some(points) = player.complete_goal(id) {
                    completion.points = points;
                    completions.push(completion);
                }
            }
        }
        completions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::goal::Goal;
    use crate::map::Position;
    use crate::train::TrainRecord;

    fn session(rules: RulesConfig) -> GameSession {
        let mut graph = RouteGraph::new();
        let paris = graph.add_station("Paris", Position::new(0, 0));
        let madrid = graph.add_station("Madrid", Position::new(3, 4));
        let berlin = graph.add_station("Berlin", Position::new(10, 10));
        graph.add_connection(paris, madrid);
        graph.add_connection(madrid, berlin);
        GameSession::new(graph, rules, 2, 0x00C0_FFEE).unwrap()
    }

    fn quiet_rules() -> RulesConfig {
        RulesConfig {
            block_probability: 0.0,
            ..RulesConfig::default()
        }
    }

    #[test]
    fn top_up_fills_every_ledger() {
        let mut session = session(quiet_rules());
        let issued = session.top_up_goals();
        assert_eq!(issued, 6);
        for player in session.players().players() {
            assert_eq!(player.active_goal_count(), 3);
        }
        assert_eq!(session.top_up_goals(), 0);
    }

    #[test]
    fn satisfied_goal_is_completed_once() {
        let mut session = session(quiet_rules());
        let graph = session.graph().clone();
        let paris = graph.station(graph.station_by_name("Paris").unwrap()).clone();
        let madrid = graph.station(graph.station_by_name("Madrid").unwrap()).clone();
        let player_one = session.players_mut().player_mut(PlayerNumber(1)).unwrap();
        assert!(player_one.add_goal(Goal::new(&paris, &madrid, None, 0, 0, 5)));

        let mut train = TrainRecord::new("Steam Train", PlayerNumber(1));
        train.set_route(vec![paris.clone(), madrid.clone()]);
        train.record_visit(&paris, 0);

        let report = session.advance_turn(std::slice::from_ref(&train));
        assert_eq!(report.turn, 0);
        assert_eq!(report.completions.len(), 1);
        let completion = &report.completions[0];
        assert_eq!(completion.player, PlayerNumber(1));
        assert_eq!(completion.points, 10);
        assert_eq!(completion.train, "Steam Train");
        assert!(!completion.through);

        let again = session.advance_turn(std::slice::from_ref(&train));
        assert!(again.completions.is_empty());
        assert_eq!(
            session.players().player(PlayerNumber(1)).unwrap().score(),
            10
        );
    }

    #[test]
    fn trains_only_serve_their_owner() {
        let mut session = session(quiet_rules());
        let graph = session.graph().clone();
        let paris = graph.station(graph.station_by_name("Paris").unwrap()).clone();
        let madrid = graph.station(graph.station_by_name("Madrid").unwrap()).clone();
        session
            .players_mut()
            .player_mut(PlayerNumber(2))
            .unwrap()
            .add_goal(Goal::new(&paris, &madrid, None, 0, 0, 0));

        let mut train = TrainRecord::new("Steam Train", PlayerNumber(1));
        train.set_route(vec![paris.clone(), madrid]);
        train.record_visit(&paris, 0);

        let report = session.advance_turn(&[train]);
        assert!(report.completions.is_empty());
    }

    #[test]
    fn blocking_is_reported_for_the_turn_it_happens() {
        let mut session = session(RulesConfig {
            block_probability: 1.0,
            ..RulesConfig::default()
        });
        let report = session.advance_turn::<TrainRecord>(&[]);
        assert!(report.newly_blocked.is_some());
        assert_eq!(report.blocked.len(), 1);
        assert_eq!(session.turn_number(), 1);
    }

    #[test]
    fn countdowns_tick_before_the_new_block_lands() {
        let rules = RulesConfig {
            block_probability: 1.0,
            ..RulesConfig::default()
        };
        let mut session = session(rules.clone());
        let first = session.begin_turn().unwrap();
        assert_eq!(
            session.graph().connection(first).blocked_turns_remaining(),
            rules.block_duration_turns
        );
        session.finish_turn::<TrainRecord>(&[]);

        let second = session.begin_turn().unwrap();
        let graph = session.graph();
        assert_eq!(
            graph.connection(second).blocked_turns_remaining(),
            rules.block_duration_turns
        );
        if second != first {
            assert_eq!(
                graph.connection(first).blocked_turns_remaining(),
                rules.block_duration_turns - 1
            );
        }
    }

    #[test]
    fn out_of_range_rules_are_rejected() {
        let rules = RulesConfig {
            block_probability: 1.5,
            ..RulesConfig::default()
        };
        let err = GameSession::new(RouteGraph::new(), rules, 1, 1).unwrap_err();
        assert!(matches!(
            err,
            SessionError::Rules(RulesConfigError::RangeViolation {
                field: "block_probability",
                ..
            })
        ));

        let rules = RulesConfig {
            through_goal_chance: -0.1,
            ..RulesConfig::default()
        };
        assert!(GameSession::new(RouteGraph::new(), rules, 1, 1).is_err());
    }

    #[test]
    fn zero_players_are_rejected() {
        let err = GameSession::new(RouteGraph::new(), RulesConfig::default(), 0, 1).unwrap_err();
        assert_eq!(err, SessionError::NoPlayers);
    }

    #[test]
    fn same_seed_replays_same_blocks() {
        let rules = RulesConfig::default();
        let mut first = session(rules.clone());
        let mut second = session(rules);
        for _ in 0..10 {
            assert_eq!(
                first.advance_turn::<TrainRecord>(&[]),
                second.advance_turn::<TrainRecord>(&[])
            );
        }
    }
}
