//! Random goal generation over the current route graph.
use rand::Rng;
use rand::seq::SliceRandom;

use super::Goal;
use crate::config::{RulesConfig, roll_chance};
use crate::map::{RouteGraph, StationId};

const MAX_ATTEMPTS: usize = 16;

/// Draws goals between regular stations that are currently connected.
#[derive(Debug, Clone, Copy, Default)]
pub struct GoalIssuer;

impl GoalIssuer {
    /// Issue a goal at `turn`, or `None` when the graph offers no reachable
    /// pair of regular stations.
    pub fn issue<R: Rng + ?Sized>(
        graph: &RouteGraph,
        rng: &mut R,
        turn: u32,
        rules: &RulesConfig,
    ) -> Option<Goal> {
        let candidates: Vec<StationId> = graph
            .station_ids()
            .filter(|id| !graph.station(*id).is_junction())
            .collect();
        if candidates.len() < 2 {
            log::warn!("cannot issue a goal: fewer than two regular stations");
            return None;
        }

        for _ in 0..MAX_ATTEMPTS {
            let mut picks = candidates.choose_multiple(rng, 2).copied();
            let (Some(origin), Some(destination)) = (picks.next(), picks.next()) else {
                continue;
            };
            let Some(direct) = graph.shortest_path(origin, destination) else {
                continue;
            };

            let mut hops = direct.hops();
            let mut intermediary = None;
            if roll_chance(rng, rules.through_goal_chance) {
                let through_candidates = candidates
                    .iter()
                    .copied()
                    .filter(|id| *id != origin && *id != destination)
                    .collect::<Vec<_>>();
                if let Some(&via) = through_candidates.choose(rng)
                    && let (Some(first), Some(second)) = (
                        graph.shortest_path(origin, via),
                        graph.shortest_path(via, destination),
                    )
                {
                    hops = first.hops() + second.hops();
                    intermediary = Some(via);
                }
            }

            let turn_budget = if roll_chance(rng, rules.timed_goal_chance) {
                u32::try_from(hops)
                    .unwrap_or(u32::MAX)
                    .saturating_add(rules.turn_budget_slack)
            } else {
                0
            };
            let bonus = if intermediary.is_some() || turn_budget != 0 {
                rules.goal_bonus
            } else {
                0
            };

            let goal = Goal::new(
                graph.station(origin),
                graph.station(destination),
                intermediary.map(|id| graph.station(id)),
                turn,
                turn_budget,
                bonus,
            );
            log::debug!("issued goal at turn {turn}: {goal}");
            return Some(goal);
        }

        log::warn!("cannot issue a goal: no reachable station pair after {MAX_ATTEMPTS} attempts");
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::Position;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    fn line() -> RouteGraph {
        let mut graph = RouteGraph::new();
        let a = graph.add_station("A", Position::new(0, 0));
        let j = graph.add_junction("J", Position::new(5, 0));
        let b = graph.add_station("B", Position::new(10, 0));
        let c = graph.add_station("C", Position::new(20, 0));
        graph.add_connection(a, j);
        graph.add_connection(j, b);
        graph.add_connection(b, c);
        graph
    }

    #[test]
    fn issued_goals_avoid_junction_endpoints() {
        let graph = line();
        let mut rng = SmallRng::seed_from_u64(42);
        let rules = RulesConfig::default();
        for turn in 0..32 {
            let goal = GoalIssuer::issue(&graph, &mut rng, turn, &rules).expect("goal");
            assert!(!goal.origin().is_junction());
            assert!(!goal.destination().is_junction());
            assert_ne!(goal.origin(), goal.destination());
            assert_eq!(goal.turn_issued(), turn);
        }
    }

    #[test]
    fn plain_goals_carry_no_bonus() {
        let graph = line();
        let mut rng = SmallRng::seed_from_u64(7);
        let rules = RulesConfig {
            through_goal_chance: 0.0,
            timed_goal_chance: 0.0,
            ..RulesConfig::default()
        };
        let goal = GoalIssuer::issue(&graph, &mut rng, 0, &rules).unwrap();
        assert_eq!(goal.bonus(), 0);
        assert!(!goal.is_going_through());
        assert!(!goal.is_in_turns());
    }

    #[test]
    fn timed_goals_budget_route_hops_plus_slack() {
        let graph = line();
        let mut rng = SmallRng::seed_from_u64(9);
        let rules = RulesConfig {
            through_goal_chance: 0.0,
            timed_goal_chance: 1.0,
            ..RulesConfig::default()
        };
        let goal = GoalIssuer::issue(&graph, &mut rng, 4, &rules).unwrap();
        let origin = graph.station_by_name(goal.origin().name()).unwrap();
        let destination = graph.station_by_name(goal.destination().name()).unwrap();
        let hops = graph.shortest_path(origin, destination).unwrap().hops();
        assert_eq!(goal.turn_budget() as usize, hops + 2);
        assert_eq!(goal.bonus(), rules.goal_bonus);
    }

    #[test]
    fn disconnected_graph_yields_nothing() {
        let mut graph = RouteGraph::new();
        graph.add_station("A", Position::new(0, 0));
        graph.add_station("B", Position::new(1, 0));
        let mut rng = SmallRng::seed_from_u64(1);
        assert!(GoalIssuer::issue(&graph, &mut rng, 0, &RulesConfig::default()).is_none());

        let mut lonely = RouteGraph::new();
        lonely.add_station("A", Position::new(0, 0));
        assert!(GoalIssuer::issue(&lonely, &mut rng, 0, &RulesConfig::default()).is_none());
    }
}
