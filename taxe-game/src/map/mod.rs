//! Route graph: stations, connections and their blocking state.
//!
//! Stations and connections are stored in insertion order and addressed by
//! [`StationId`] / [`ConnectionId`]. Ids are only meaningful for the graph that
//! minted them; passing an id from another graph panics on lookup.
use rand::Rng;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::fmt;
use std::hash::{Hash, Hasher};
use thiserror::Error;

use crate::config::{RulesConfig, roll_chance};

pub mod data;
pub mod dijkstra;

pub use data::{ConnectionData, MapData, MapDataError, StationData};
pub use dijkstra::{Distance, ShortestPath, ShortestPathEngine};

/// Incident connections are usually few; keep them inline.
pub type ConnectionSet<'a> = SmallVec<[&'a Connection; 4]>;

/// Integer map coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Straight-line distance to another position.
    #[must_use]
    pub fn distance_to(self, other: Self) -> f64 {
        let dx = f64::from(other.x) - f64::from(self.x);
        let dy = f64::from(other.y) - f64::from(self.y);
        dx.hypot(dy)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Capability tag for a station. Junctions route exactly like stations; only
/// presentation and goal issuance treat them differently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StationKind {
    #[default]
    Station,
    Junction,
}

/// A named node of the route graph. Identity is the (case-sensitive) name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Station {
    name: String,
    location: Position,
    #[serde(default)]
    kind: StationKind,
}

impl Station {
    #[must_use]
    pub fn new(name: impl Into<String>, location: Position, kind: StationKind) -> Self {
        Self {
            name: name.into(),
            location,
            kind,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub const fn location(&self) -> Position {
        self.location
    }

    #[must_use]
    pub const fn kind(&self) -> StationKind {
        self.kind
    }

    #[must_use]
    pub const fn is_junction(&self) -> bool {
        matches!(self.kind, StationKind::Junction)
    }
}

impl PartialEq for Station {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for Station {}

impl Hash for Station {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

impl fmt::Display for Station {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Index of a station inside its [`RouteGraph`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StationId(usize);

impl StationId {
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

/// Index of a connection inside its [`RouteGraph`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConnectionId(usize);

impl ConnectionId {
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

/// Undirected edge between two stations with a blocked countdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Connection {
    station1: StationId,
    station2: StationId,
    #[serde(default)]
    blocked_turns_remaining: u32,
}

impl Connection {
    const fn new(station1: StationId, station2: StationId) -> Self {
        Self {
            station1,
            station2,
            blocked_turns_remaining: 0,
        }
    }

    #[must_use]
    pub const fn station1(&self) -> StationId {
        self.station1
    }

    #[must_use]
    pub const fn station2(&self) -> StationId {
        self.station2
    }

    #[must_use]
    pub const fn blocked_turns_remaining(&self) -> u32 {
        self.blocked_turns_remaining
    }

    #[must_use]
    pub const fn is_blocked(&self) -> bool {
        self.blocked_turns_remaining > 0
    }

    /// True when the connection touches `station`.
    #[must_use]
    pub fn touches(&self, station: StationId) -> bool {
        self.station1 == station || self.station2 == station
    }

    /// True when the connection joins `a` and `b`, in either order.
    #[must_use]
    pub fn joins(&self, a: StationId, b: StationId) -> bool {
        (self.station1 == a && self.station2 == b) || (self.station1 == b && self.station2 == a)
    }

    /// The endpoint opposite `station`, if `station` is an endpoint at all.
    #[must_use]
    pub fn other_end(&self, station: StationId) -> Option<StationId> {
        if self.station1 == station {
            Some(self.station2)
        } else if self.station2 == station {
            Some(self.station1)
        } else {
            None
        }
    }

    fn set_blocked(&mut self, turns: u32) {
        self.blocked_turns_remaining = turns;
    }

    fn decrement_blocked(&mut self) {
        self.blocked_turns_remaining = self.blocked_turns_remaining.saturating_sub(1);
    }
}

/// Errors raised by graph lookups that have no "not found" value.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GraphError {
    #[error("station `{0}` does not exist")]
    UnknownStation(String),
    #[error("station does not exist for position {0}")]
    NoStationAtPosition(Position),
    #[error("no connection between `{from}` and `{to}`")]
    UnknownConnection { from: String, to: String },
}

/// Owns every station and connection of the playing field.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RouteGraph {
    stations: Vec<Station>,
    connections: Vec<Connection>,
}

impl RouteGraph {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a regular station. Names are not deduplicated; callers keep them
    /// unique.
    pub fn add_station(&mut self, name: impl Into<String>, location: Position) -> StationId {
        self.push_station(Station::new(name, location, StationKind::Station))
    }

    /// Register a junction-tagged station.
    pub fn add_junction(&mut self, name: impl Into<String>, location: Position) -> StationId {
        self.push_station(Station::new(name, location, StationKind::Junction))
    }

    fn push_station(&mut self, station: Station) -> StationId {
        let id = StationId(self.stations.len());
        self.stations.push(station);
        id
    }

    /// Register an edge. Self-loops and duplicate pairs are not checked here;
    /// [`MapData::validate`] rejects them for loaded maps.
    pub fn add_connection(&mut self, a: StationId, b: StationId) -> ConnectionId {
        debug_assert!(a.0 < self.stations.len() && b.0 < self.stations.len());
        let id = ConnectionId(self.connections.len());
        self.connections.push(Connection::new(a, b));
        id
    }

    /// Register an edge between two stations looked up by name.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::UnknownStation`] when either name is not registered.
    pub fn add_connection_by_name(&mut self, a: &str, b: &str) -> Result<ConnectionId, GraphError> {
        let first = self.require_station(a)?;
        let second = self.require_station(b)?;
        Ok(self.add_connection(first, second))
    }

    #[must_use]
    pub fn stations(&self) -> &[Station] {
        &self.stations
    }

    #[must_use]
    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    pub fn station_ids(&self) -> impl Iterator<Item = StationId> + '_ {
        (0..self.stations.len()).map(StationId)
    }

    #[must_use]
    pub fn station(&self, id: StationId) -> &Station {
        &self.stations[id.0]
    }

    #[must_use]
    pub fn connection(&self, id: ConnectionId) -> &Connection {
        &self.connections[id.0]
    }

    /// First station whose name matches exactly.
    #[must_use]
    pub fn station_by_name(&self, name: &str) -> Option<StationId> {
        self.stations
            .iter()
            .position(|station| station.name == name)
            .map(StationId)
    }

    /// Like [`Self::station_by_name`] but for callers that cannot proceed
    /// without the station.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::UnknownStation`] when the name is not registered.
    pub fn require_station(&self, name: &str) -> Result<StationId, GraphError> {
        self.station_by_name(name)
            .ok_or_else(|| GraphError::UnknownStation(name.to_string()))
    }

    /// Every connection incident to `station`, in insertion order.
    #[must_use]
    pub fn connections_of(&self, station: StationId) -> ConnectionSet<'_> {
        self.connections
            .iter()
            .filter(|connection| connection.touches(station))
            .collect()
    }

    #[must_use]
    pub fn connection_between(&self, a: StationId, b: StationId) -> Option<ConnectionId> {
        self.connections
            .iter()
            .position(|connection| connection.joins(a, b))
            .map(ConnectionId)
    }

    /// Whether a connection exists between two stations given by name.
    #[must_use]
    pub fn does_connection_exist(&self, a: &str, b: &str) -> bool {
        self.connections.iter().any(|connection| {
            let first = self.station(connection.station1).name();
            let second = self.station(connection.station2).name();
            (first == a && second == b) || (first == b && second == a)
        })
    }

    /// True when the pair's connection is blocked, or when no connection joins
    /// the pair at all.
    #[must_use]
    pub fn is_blocked(&self, a: StationId, b: StationId) -> bool {
        self.connection_between(a, b)
            .is_none_or(|id| self.connection(id).is_blocked())
    }

    #[must_use]
    pub fn blocked_connections(&self) -> Vec<&Connection> {
        self.connections
            .iter()
            .filter(|connection| connection.is_blocked())
            .collect()
    }

    /// Human readable `"A to B"` label for a connection.
    #[must_use]
    pub fn describe_connection(&self, connection: &Connection) -> String {
        format!(
            "{} to {}",
            self.station(connection.station1),
            self.station(connection.station2)
        )
    }

    /// Advance every blocked countdown by one turn, flooring at zero.
    pub fn tick_turn(&mut self) {
        for connection in &mut self.connections {
            connection.decrement_blocked();
        }
        log::debug!(
            "graph ticked; {} connection(s) still blocked",
            self.blocked_connections().len()
        );
    }

    /// With `rules.block_probability`, block one uniformly chosen connection for
    /// `rules.block_duration_turns` turns.
    pub fn block_random_connection<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
        rules: &RulesConfig,
    ) -> Option<ConnectionId> {
        if self.connections.is_empty() || !roll_chance(rng, rules.block_probability) {
            return None;
        }
        let id = ConnectionId(rng.gen_range(0..self.connections.len()));
        self.connections[id.0].set_blocked(rules.block_duration_turns);
        log::info!(
            "Connection blocked: {}",
            self.describe_connection(self.connection(id))
        );
        Some(id)
    }

    /// Clear the blocked countdown between two stations.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::UnknownConnection`] when no connection joins the pair.
    pub fn repair_connection(&mut self, a: StationId, b: StationId) -> Result<(), GraphError> {
        let id = self
            .connection_between(a, b)
            .ok_or_else(|| GraphError::UnknownConnection {
                from: self.station(a).name().to_string(),
                to: self.station(b).name().to_string(),
            })?;
        self.connections[id.0].set_blocked(0);
        log::info!(
            "Connection repaired: {}",
            self.describe_connection(self.connection(id))
        );
        Ok(())
    }

    #[must_use]
    pub fn random_station<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<StationId> {
        if self.stations.is_empty() {
            return None;
        }
        Some(StationId(rng.gen_range(0..self.stations.len())))
    }

    /// # Errors
    ///
    /// Returns [`GraphError::NoStationAtPosition`] when nothing sits at `position`.
    pub fn station_at(&self, position: Position) -> Result<StationId, GraphError> {
        self.stations
            .iter()
            .position(|station| station.location == position)
            .map(StationId)
            .ok_or(GraphError::NoStationAtPosition(position))
    }

    /// Translate a sequence of positions into the stations placed there.
    ///
    /// # Errors
    ///
    /// Fails on the first position with no station.
    pub fn create_route(&self, positions: &[Position]) -> Result<Vec<StationId>, GraphError> {
        positions
            .iter()
            .map(|position| self.station_at(*position))
            .collect()
    }

    /// Straight-line distance between two stations, ignoring connections.
    #[must_use]
    pub fn distance_between(&self, a: StationId, b: StationId) -> f64 {
        self.station(a)
            .location
            .distance_to(self.station(b).location)
    }

    /// Shortest distance over currently passable connections.
    #[must_use]
    pub fn shortest_distance(&self, a: StationId, b: StationId) -> Distance {
        if a == b {
            return Distance::Finite(0.0);
        }
        ShortestPathEngine::new(self).find_min_distance(a, b)
    }

    /// Shortest route over currently passable connections.
    #[must_use]
    pub fn shortest_path(&self, a: StationId, b: StationId) -> Option<ShortestPath> {
        if a == b {
            return Some(ShortestPath {
                stations: vec![a],
                distance: 0.0,
            });
        }
        ShortestPathEngine::new(self).find_path(a, b)
    }
}
