//! Serializable map description and its conversion into a [`RouteGraph`].
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

use super::{Position, RouteGraph};

const DEFAULT_MAP_JSON: &str = include_str!("../../assets/stations.json");

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StationData {
    pub name: String,
    pub x: i32,
    pub y: i32,
    #[serde(default)]
    pub junction: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionData {
    pub station1: String,
    pub station2: String,
}

/// Stations and connections as shipped in a map asset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct MapData {
    pub stations: Vec<StationData>,
    #[serde(default)]
    pub connections: Vec<ConnectionData>,
}

/// Reasons a map description cannot become a graph.
#[derive(Debug, Error)]
pub enum MapDataError {
    #[error("map data is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("station `{0}` is defined more than once")]
    DuplicateStation(String),
    #[error("connection references unknown station `{0}`")]
    UnknownStation(String),
    #[error("station `{0}` is connected to itself")]
    SelfLoop(String),
    #[error("connection between `{0}` and `{1}` is defined more than once")]
    DuplicateConnection(String, String),
}

impl MapData {
    /// Parse a map description from JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON cannot be parsed into a map description.
    pub fn from_json(json: &str) -> Result<Self, MapDataError> {
        Ok(serde_json::from_str(json)?)
    }

    /// The map bundled with the crate.
    ///
    /// # Errors
    ///
    /// Returns an error if the bundled asset fails to parse.
    pub fn load_default() -> Result<Self, MapDataError> {
        Self::from_json(DEFAULT_MAP_JSON)
    }

    /// Check the invariants [`RouteGraph`] assumes but never enforces.
    ///
    /// # Errors
    ///
    /// Reports the first duplicate station, dangling endpoint, self-loop or
    /// parallel connection found.
    pub fn validate(&self) -> Result<(), MapDataError> {
        let mut names = HashSet::new();
        for station in &self.stations {
            if !names.insert(station.name.as_str()) {
                return Err(MapDataError::DuplicateStation(station.name.clone()));
            }
        }

        let mut pairs = HashSet::new();
        for connection in &self.connections {
            for endpoint in [&connection.station1, &connection.station2] {
                if !names.contains(endpoint.as_str()) {
                    return Err(MapDataError::UnknownStation(endpoint.clone()));
                }
            }
            if connection.station1 == connection.station2 {
                return Err(MapDataError::SelfLoop(connection.station1.clone()));
            }
            let key = if connection.station1 < connection.station2 {
                (connection.station1.as_str(), connection.station2.as_str())
            } else {
                (connection.station2.as_str(), connection.station1.as_str())
            };
            if !pairs.insert(key) {
                return Err(MapDataError::DuplicateConnection(
                    connection.station1.clone(),
                    connection.station2.clone(),
                ));
            }
        }
        Ok(())
    }
}

impl RouteGraph {
    /// Build a graph from a validated map description.
    ///
    /// # Errors
    ///
    /// Returns the first [`MapDataError`] reported by [`MapData::validate`].
    pub fn from_map_data(data: &MapData) -> Result<Self, MapDataError> {
        data.validate()?;
        let mut graph = Self::new();
        for station in &data.stations {
            let location = Position::new(station.x, station.y);
            if station.junction {
                graph.add_junction(station.name.clone(), location);
            } else {
                graph.add_station(station.name.clone(), location);
            }
        }
        for connection in &data.connections {
            graph
                .add_connection_by_name(&connection.station1, &connection.station2)
                .map_err(|_| MapDataError::UnknownStation(connection.station1.clone()))?;
        }
        Ok(graph)
    }
}
