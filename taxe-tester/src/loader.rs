use std::path::{Path, PathBuf};
use taxe_game::{MapData, MapDataError, MapLoader, RulesConfig, RulesConfigError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoaderError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Map(#[from] MapDataError),
    #[error(transparent)]
    Rules(#[from] RulesConfigError),
}

/// Reads map and rules from disk, falling back to the bundled map and the
/// default rules when no path is given.
#[derive(Debug, Clone, Default)]
pub struct FileLoader {
    map: Option<PathBuf>,
    rules: Option<PathBuf>,
}

impl FileLoader {
    #[must_use]
    pub const fn new(map: Option<PathBuf>, rules: Option<PathBuf>) -> Self {
        Self { map, rules }
    }
}

fn read(path: &Path) -> Result<String, LoaderError> {
    std::fs::read_to_string(path).map_err(|source| LoaderError::Io {
        path: path.to_path_buf(),
        source,
    })
}

impl MapLoader for FileLoader {
    type Error = LoaderError;

    fn load_map_data(&self) -> Result<MapData, Self::Error> {
        match &self.map {
            Some(path) => Ok(MapData::from_json(&read(path)?)?),
            None => Ok(MapData::load_default()?),
        }
    }

    fn load_rules(&self) -> Result<RulesConfig, Self::Error> {
        match &self.rules {
            Some(path) => Ok(RulesConfig::from_json(&read(path)?)?),
            None => Ok(RulesConfig::default()),
        }
    }
}
