//! TaxE Game Engine
//!
//! Platform-agnostic core logic for the TaxE train routing game: the route
//! graph with transient connection blocking, shortest paths over it, and goal
//! evaluation against train histories. Rendering, input and train movement
//! live outside this crate.

pub mod config;
pub mod constants;
pub mod goal;
pub mod map;
pub mod player;
pub mod session;
pub mod train;

// Re-export commonly used types
pub use config::{RulesConfig, RulesConfigError};
pub use goal::{Goal, GoalError, GoalIssuer};
pub use map::{
    Connection, ConnectionData, ConnectionId, Distance, GraphError, MapData, MapDataError,
    Position, RouteGraph, ShortestPath, ShortestPathEngine, Station, StationData, StationId,
    StationKind,
};
pub use player::{GoalId, Player, PlayerManager, PlayerNumber};
pub use session::{GameSession, GoalCompletion, SessionError, TurnReport};
pub use train::{HistoryEntry, TrainRecord, TrainView};

/// Trait for abstracting where map and rule data come from.
/// Platform-specific implementations should provide this
pub trait MapLoader {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Load the map description
    ///
    /// # Errors
    ///
    /// Returns an error if the map data cannot be loaded.
    fn load_map_data(&self) -> Result<MapData, Self::Error>;

    /// Load the game rules
    ///
    /// # Errors
    ///
    /// Returns an error if the rules cannot be loaded or parsed.
    fn load_rules(&self) -> Result<RulesConfig, Self::Error>;
}

/// Loader serving the bundled map with default rules.
#[derive(Debug, Clone, Copy, Default)]
pub struct BundledLoader;

impl MapLoader for BundledLoader {
    type Error = MapDataError;

    fn load_map_data(&self) -> Result<MapData, Self::Error> {
        MapData::load_default()
    }

    fn load_rules(&self) -> Result<RulesConfig, Self::Error> {
        Ok(RulesConfig::default())
    }
}

/// Main game engine for creating game sessions
pub struct GameEngine<L>
where
    L: MapLoader,
{
    loader: L,
}

impl<L> GameEngine<L>
where
    L: MapLoader,
{
    /// Create a new game engine with the provided loader
    pub const fn new(loader: L) -> Self {
        Self { loader }
    }

    /// Build a fresh session: load and validate the map and rules, then seed
    /// the session RNG and hand every player their opening goals.
    ///
    /// # Errors
    ///
    /// Returns an error if loading fails, the map is malformed, the rules
    /// violate their bounds, or `player_count` is zero.
    pub fn create_session(&self, seed: u64, player_count: u8) -> Result<GameSession, anyhow::Error>
    where
        L::Error: Into<anyhow::Error>,
    {
        let data = self.loader.load_map_data().map_err(Into::into)?;
        let rules = self.loader.load_rules().map_err(Into::into)?;
        let graph = RouteGraph::from_map_data(&data)?;
        let mut session = GameSession::new(graph, rules, player_count, seed)?;
        session.top_up_goals();
        Ok(session)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::convert::Infallible;

    #[derive(Clone, Default)]
    struct FixtureLoader {
        rules: RulesConfig,
    }

    impl MapLoader for FixtureLoader {
        type Error = Infallible;

        fn load_map_data(&self) -> Result<MapData, Self::Error> {
            Ok(MapData {
                stations: vec![
                    StationData {
                        name: "Paris".to_string(),
                        x: 0,
                        y: 0,
                        junction: false,
                    },
                    StationData {
                        name: "Madrid".to_string(),
                        x: 3,
                        y: 4,
                        junction: false,
                    },
                ],
                connections: vec![ConnectionData {
                    station1: "Paris".to_string(),
                    station2: "Madrid".to_string(),
                }],
            })
        }

        fn load_rules(&self) -> Result<RulesConfig, Self::Error> {
            Ok(self.rules.clone())
        }
    }

    #[test]
    fn engine_creates_session_with_opening_goals() {
        let engine = GameEngine::new(FixtureLoader::default());
        let session = engine.create_session(0xABCD, 2).unwrap();
        assert_eq!(session.seed(), 0xABCD);
        assert_eq!(session.players().players().len(), 2);
        for player in session.players().players() {
            assert_eq!(player.active_goal_count(), RulesConfig::default().max_player_goals);
        }
    }

    #[test]
    fn engine_rejects_invalid_rules() {
        let engine = GameEngine::new(FixtureLoader {
            rules: RulesConfig {
                block_probability: 2.0,
                ..RulesConfig::default()
            },
        });
        let err = engine.create_session(1, 1).unwrap_err();
        assert!(err.to_string().contains("block_probability"));
    }

    #[test]
    fn engine_rejects_zero_players() {
        let engine = GameEngine::new(FixtureLoader::default());
        let err = engine.create_session(1, 0).unwrap_err();
        assert!(err.to_string().contains("at least one player"));
    }

    #[test]
    fn bundled_loader_builds_default_map() {
        let engine = GameEngine::new(BundledLoader);
        let session = engine.create_session(7, 2).unwrap();
        assert!(session.graph().station_by_name("Paris").is_some());
    }
}
