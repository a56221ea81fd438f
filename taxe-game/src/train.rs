//! The view of a train that goal evaluation consumes.
//!
//! Movement is simulated elsewhere; the engine only reads the resulting visit
//! history, the current route and the final destination.
use serde::{Deserialize, Serialize};

use crate::map::Station;
use crate::player::PlayerNumber;

/// One visit of a train to a station.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub station: String,
    pub turn: u32,
}

impl HistoryEntry {
    #[must_use]
    pub fn new(station: impl Into<String>, turn: u32) -> Self {
        Self {
            station: station.into(),
            turn,
        }
    }
}

/// Read-only access to a train as goal evaluation needs it.
pub trait TrainView {
    fn name(&self) -> &str;

    /// Player that owns the train.
    fn owner(&self) -> PlayerNumber;

    /// Visits in the order they happened.
    fn history(&self) -> &[HistoryEntry];

    /// Last station of the current route, if the train has one.
    fn final_destination(&self) -> Option<&Station>;

    /// Whether the current route includes `station`.
    fn route_contains(&self, station: &Station) -> bool;
}

/// Plain train record used by turn drivers and tests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainRecord {
    name: String,
    owner: PlayerNumber,
    #[serde(default)]
    route: Vec<Station>,
    #[serde(default)]
    history: Vec<HistoryEntry>,
}

impl TrainRecord {
    #[must_use]
    pub fn new(name: impl Into<String>, owner: PlayerNumber) -> Self {
        Self {
            name: name.into(),
            owner,
            route: Vec::new(),
            history: Vec::new(),
        }
    }

    /// Replace the planned route. History is kept.
    pub fn set_route(&mut self, route: Vec<Station>) {
        self.route = route;
    }

    #[must_use]
    pub fn route(&self) -> &[Station] {
        &self.route
    }

    /// Append a visit. History is append-only.
    pub fn record_visit(&mut self, station: &Station, turn: u32) {
        self.history.push(HistoryEntry::new(station.name(), turn));
    }

    /// Station of the most recent visit.
    #[must_use]
    pub fn last_visited(&self) -> Option<&str> {
        self.history.last().map(|entry| entry.station.as_str())
    }
}

impl TrainView for TrainRecord {
    fn name(&self) -> &str {
        &self.name
    }

    fn owner(&self) -> PlayerNumber {
        self.owner
    }

    fn history(&self) -> &[HistoryEntry] {
        &self.history
    }

    fn final_destination(&self) -> Option<&Station> {
        self.route.last()
    }

    fn route_contains(&self, station: &Station) -> bool {
        self.route.contains(station)
    }
}
