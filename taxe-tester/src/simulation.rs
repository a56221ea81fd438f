//! Headless turn driver: dispatches one train per active goal, moves trains
//! one station per turn along their shortest route, and hands arrivals to the
//! session for goal evaluation.
use serde::Serialize;
use std::collections::BTreeMap;
use taxe_game::{
    GameSession, GoalId, PlayerNumber, RouteGraph, StationId, TrainRecord, TrainView, TurnReport,
};

#[derive(Debug, Clone, Serialize)]
pub struct PlayerSummary {
    pub player: PlayerNumber,
    pub score: u32,
    pub completed_goals: usize,
    pub open_goals: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SimulationSummary {
    pub seed: u64,
    pub turns: u32,
    pub players: Vec<PlayerSummary>,
    pub reports: Vec<TurnReport>,
}

impl SimulationSummary {
    #[must_use]
    pub fn completed_goals(&self) -> usize {
        self.reports.iter().map(|report| report.completions.len()).sum()
    }
}

#[derive(Debug)]
struct Dispatch {
    train: TrainRecord,
    route: Vec<StationId>,
    /// Index into `route` of the station the train is standing at.
    at: usize,
}

impl Dispatch {
    fn arrived(&self) -> bool {
        self.at + 1 >= self.route.len()
    }

    fn advance(&mut self, graph: &RouteGraph, turn: u32) {
        if self.arrived() {
            return;
        }
        let (here, next) = (self.route[self.at], self.route[self.at + 1]);
        if graph.is_blocked(here, next) {
            log::debug!("{} waiting at {}", self.train.name(), graph.station(here));
            return;
        }
        self.at += 1;
        self.train.record_visit(graph.station(next), turn);
    }
}

pub struct Simulation {
    session: GameSession,
    dispatched: BTreeMap<(PlayerNumber, GoalId), Dispatch>,
    trains_built: usize,
}

impl Simulation {
    #[must_use]
    pub fn new(session: GameSession) -> Self {
        Self {
            session,
            dispatched: BTreeMap::new(),
            trains_built: 0,
        }
    }

    /// Play `turns` turns and summarize the outcome.
    pub fn run(mut self, turns: u32) -> SimulationSummary {
        let mut reports = Vec::with_capacity(turns as usize);
        for _ in 0..turns {
            reports.push(self.play_turn());
        }
        self.summarize(turns, reports)
    }

    fn play_turn(&mut self) -> TurnReport {
        self.session.top_up_goals();
        self.dispatch_trains();

        self.session.begin_turn();
        let turn = self.session.turn_number();
        let graph = self.session.graph();
        for dispatch in self.dispatched.values_mut() {
            dispatch.advance(graph, turn);
        }

        let arrived: Vec<(PlayerNumber, GoalId)> = self
            .dispatched
            .iter()
            .filter(|(_, dispatch)| dispatch.arrived())
            .map(|(key, _)| *key)
            .collect();
        let trains: Vec<TrainRecord> = arrived
            .iter()
            .filter_map(|key| self.dispatched.remove(key))
            .map(|dispatch| dispatch.train)
            .collect();

        let report = self.session.finish_turn(&trains);
        for completion in &report.completions {
            log::info!(
                "turn {}: {} completed \"{}\" with {} (+{})",
                report.turn,
                completion.player,
                completion.goal,
                completion.train,
                completion.points
            );
        }
        report
    }

    fn dispatch_trains(&mut self) {
        let turn = self.session.turn_number();
        let graph = self.session.graph();
        let mut fresh = Vec::new();
        for player in self.session.players().players() {
            for (id, goal) in player.active_goals() {
                let key = (player.number(), id);
                if self.dispatched.contains_key(&key) {
                    continue;
                }
                let (Some(origin), Some(destination)) = (
                    graph.station_by_name(goal.origin().name()),
                    graph.station_by_name(goal.destination().name()),
                ) else {
                    continue;
                };
                let via = goal
                    .intermediary()
                    .filter(|_| goal.is_going_through())
                    .and_then(|station| graph.station_by_name(station.name()));
                let Some(route) = plan_route(graph, origin, via, destination) else {
                    log::debug!("no open route for \"{goal}\" yet");
                    continue;
                };
                fresh.push((key, route, goal.required_train().map(str::to_string)));
            }
        }

        for ((player, id), route, required) in fresh {
            self.trains_built += 1;
            let name = required.unwrap_or_else(|| format!("Train {}", self.trains_built));
            let mut train = TrainRecord::new(name, player);
            let graph = self.session.graph();
            train.set_route(
                route
                    .iter()
                    .map(|station| graph.station(*station).clone())
                    .collect(),
            );
            train.record_visit(graph.station(route[0]), turn);
            self.dispatched.insert((player, id), Dispatch { train, route, at: 0 });
        }
    }

    fn summarize(self, turns: u32, reports: Vec<TurnReport>) -> SimulationSummary {
        let players = self
            .session
            .players()
            .players()
            .iter()
            .map(|player| PlayerSummary {
                player: player.number(),
                score: player.score(),
                completed_goals: player.goals().iter().filter(|g| g.is_complete()).count(),
                open_goals: player.goal_descriptions(),
            })
            .collect();
        SimulationSummary {
            seed: self.session.seed(),
            turns,
            players,
            reports,
        }
    }
}

/// Shortest route from `origin` to `destination`, through `via` when given.
fn plan_route(
    graph: &RouteGraph,
    origin: StationId,
    via: Option<StationId>,
    destination: StationId,
) -> Option<Vec<StationId>> {
    let Some(via) = via else {
        return graph.shortest_path(origin, destination).map(|path| path.stations);
    };
    let mut route = graph.shortest_path(origin, via)?.stations;
    let tail = graph.shortest_path(via, destination)?.stations;
    route.extend(tail.into_iter().skip(1));
    Some(route)
}

#[cfg(test)]
mod tests {
    use super::*;
    use taxe_game::{BundledLoader, GameEngine, Position};

    #[test]
    fn plan_route_stitches_through_station() {
        let mut graph = RouteGraph::new();
        let a = graph.add_station("A", Position::new(0, 0));
        let b = graph.add_station("B", Position::new(5, 0));
        let c = graph.add_station("C", Position::new(10, 0));
        graph.add_connection(a, b);
        graph.add_connection(b, c);
        assert_eq!(plan_route(&graph, a, Some(c), b), Some(vec![a, b, c, b]));
        assert_eq!(plan_route(&graph, a, None, c), Some(vec![a, b, c]));
    }

    #[test]
    fn simulation_completes_goals_on_bundled_map() {
        let session = GameEngine::new(BundledLoader).create_session(1337, 2).unwrap();
        let summary = Simulation::new(session).run(40);
        assert_eq!(summary.reports.len(), 40);
        assert!(summary.completed_goals() > 0);
        let credited: u32 = summary.players.iter().map(|p| p.score).sum();
        let reported: u32 = summary
            .reports
            .iter()
            .flat_map(|report| report.completions.iter())
            .map(|completion| completion.points)
            .sum();
        assert_eq!(credited, reported);
    }
}
