use crate::game_data::GameData;
use log::*;
use std::{
    fs,
    path::{Path, PathBuf},
};
use thiserror::Error;

const DEFAULT_DIR_NAME: &str = "lax-scorebook-games";
const FILE_PREFIX: &str = "game-";
const FILE_EXTENSION: &str = "json";

/// Somewhere finished or in-progress games can be kept. Saves are best effort,
/// failures are reported to the caller and never retried.
pub trait GameStore {
    /// Returns the id the game was saved under
    fn save(&self, data: &GameData) -> Result<String>;

    fn load(&self, id: &str) -> Result<GameData>;

    /// Ids of every saved game, oldest first
    fn list(&self) -> Result<Vec<String>>;

    fn latest(&self) -> Result<GameData> {
        let id = self.list()?.pop().ok_or(StorageError::NoSavedGames)?;
        self.load(&id)
    }
}

/// Stores each save as its own pretty-printed JSON file in one directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// A directory under the user's local data dir
    pub fn default_location() -> Result<Self> {
        let mut path = directories::BaseDirs::new()
            .ok_or(StorageError::NoDataDir)?
            .data_local_dir()
            .to_path_buf();
        path.push(DEFAULT_DIR_NAME);
        Ok(Self::new(path))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, id: &str) -> PathBuf {
        self.dir.join(format!("{id}.{FILE_EXTENSION}"))
    }

    /// Ids sort in the order the games were saved
    fn id_for(data: &GameData) -> String {
        let millis = (data.metadata.saved_at.unix_timestamp_nanos() / 1_000_000).max(0);
        format!(
            "{FILE_PREFIX}{millis:015}-{:04}",
            data.metadata.game_number
        )
    }
}

impl GameStore for JsonFileStore {
    fn save(&self, data: &GameData) -> Result<String> {
        let id = Self::id_for(data);
        let path = self.path_for(&id);
        let json = data.to_json()?;

        fs::create_dir_all(&self.dir)
            .and_then(|_| fs::write(&path, json))
            .inspect_err(|e| error!("Failed to save game to {}: {e}", path.display()))?;
        info!(
            "Saved game {} to {}",
            data.metadata.game_number,
            path.display()
        );
        Ok(id)
    }

    fn load(&self, id: &str) -> Result<GameData> {
        let path = self.path_for(id);
        debug!("Loading game from {}", path.display());
        let json = fs::read_to_string(&path)
            .inspect_err(|e| error!("Failed to read {}: {e}", path.display()))?;
        Ok(GameData::from_json(&json)?)
    }

    fn list(&self) -> Result<Vec<String>> {
        if !self.dir.exists() {
            return Ok(vec![]);
        }
        let mut ids = vec![];
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some(FILE_EXTENSION) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                if stem.starts_with(FILE_PREFIX) {
                    ids.push(stem.to_string());
                }
            }
        }
        ids.sort();
        Ok(ids)
    }
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Bad game data: {0}")]
    Json(#[from] serde_json::Error),
    #[error("No saved games")]
    NoSavedGames,
    #[error("Could not find a directory to store games in")]
    NoDataDir,
}

pub type Result<T> = std::result::Result<T, StorageError>;
