//! Dijkstra over the live route graph.
//!
//! Edge weight is the straight-line distance between endpoints. Blocked
//! connections are not edges. Nothing is cached between queries because the
//! blocking state changes every turn.
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::fmt;

use super::{RouteGraph, StationId};

/// Result of a distance query.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Distance {
    Finite(f64),
    /// No passable route joins the two stations.
    Unreachable,
}

impl Distance {
    #[must_use]
    pub const fn is_reachable(self) -> bool {
        matches!(self, Self::Finite(_))
    }

    #[must_use]
    pub const fn finite(self) -> Option<f64> {
        match self {
            Self::Finite(value) => Some(value),
            Self::Unreachable => None,
        }
    }
}

impl fmt::Display for Distance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Finite(value) => write!(f, "{value:.1}"),
            Self::Unreachable => f.write_str("unreachable"),
        }
    }
}

/// Station sequence of a shortest route, endpoints included.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShortestPath {
    pub stations: Vec<StationId>,
    pub distance: f64,
}

impl ShortestPath {
    /// Number of connections travelled.
    #[must_use]
    pub fn hops(&self) -> usize {
        self.stations.len().saturating_sub(1)
    }
}

#[derive(Debug, Clone, Copy)]
struct Frontier {
    cost: f64,
    station: StationId,
}

impl PartialEq for Frontier {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Frontier {}

impl PartialOrd for Frontier {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Frontier {
    // Reversed so the max-heap pops the cheapest entry first.
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .cost
            .total_cmp(&self.cost)
            .then_with(|| other.station.cmp(&self.station))
    }
}

type Neighbours = SmallVec<[(StationId, f64); 4]>;

/// Single-source shortest path over one [`RouteGraph`] snapshot.
#[derive(Debug, Clone, Copy)]
pub struct ShortestPathEngine<'a> {
    graph: &'a RouteGraph,
}

impl<'a> ShortestPathEngine<'a> {
    #[must_use]
    pub const fn new(graph: &'a RouteGraph) -> Self {
        Self { graph }
    }

    #[must_use]
    pub fn find_min_distance(&self, source: StationId, target: StationId) -> Distance {
        self.find_path(source, target)
            .map_or(Distance::Unreachable, |path| Distance::Finite(path.distance))
    }

    #[must_use]
    pub fn find_path(&self, source: StationId, target: StationId) -> Option<ShortestPath> {
        let station_count = self.graph.stations().len();
        if source.index() >= station_count || target.index() >= station_count {
            return None;
        }

        let adjacency = self.passable_adjacency();
        let mut dist = vec![f64::INFINITY; station_count];
        let mut previous: Vec<Option<StationId>> = vec![None; station_count];
        let mut heap = BinaryHeap::new();

        dist[source.index()] = 0.0;
        heap.push(Frontier {
            cost: 0.0,
            station: source,
        });

        while let Some(Frontier { cost, station }) = heap.pop() {
            if station == target {
                break;
            }
            if cost > dist[station.index()] {
                continue;
            }
            for &(next, weight) in &adjacency[station.index()] {
                let candidate = cost + weight;
                if candidate < dist[next.index()] {
                    dist[next.index()] = candidate;
                    previous[next.index()] = Some(station);
                    heap.push(Frontier {
                        cost: candidate,
                        station: next,
                    });
                }
            }
        }

        let distance = dist[target.index()];
        if distance.is_infinite() {
            return None;
        }

        let mut stations = vec![target];
        let mut cursor = target;
        while let Some(prev) = previous[cursor.index()] {
            stations.push(prev);
            cursor = prev;
        }
        stations.reverse();
        Some(ShortestPath { stations, distance })
    }

    fn passable_adjacency(&self) -> Vec<Neighbours> {
        let mut adjacency = vec![Neighbours::new(); self.graph.stations().len()];
        for connection in self.graph.connections() {
            if connection.is_blocked() {
                continue;
            }
            let (a, b) = (connection.station1(), connection.station2());
            let weight = self.graph.distance_between(a, b);
            adjacency[a.index()].push((b, weight));
            adjacency[b.index()].push((a, weight));
        }
        adjacency
    }
}
