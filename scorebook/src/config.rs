use crate::storage::{self, JsonFileStore};
use log::*;
use serde_derive::{Deserialize, Serialize};
use std::path::PathBuf;
pub use lax_common::config::Game;

pub const APP_NAME: &str = "lax-scorebook";

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Storage {
    /// Where saved games go. Defaults to a directory under the local data dir.
    pub directory: Option<PathBuf>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    pub game: Game,
    pub storage: Storage,
}

impl Config {
    /// Reads the config file, replacing it with the defaults if it can't be read
    pub fn load() -> Self {
        match confy::get_configuration_file_path(APP_NAME, None) {
            Ok(path) => info!("Reading config file from {path:?}"),
            Err(e) => warn!("Could not find the config file path: {e}"),
        }

        match confy::load::<Config>(APP_NAME, None) {
            Ok(config) => match config.game.validate() {
                Ok(()) => config,
                Err(e) => {
                    warn!("Game settings in config file are invalid, using defaults. Error: {e}");
                    Config {
                        game: Game::default(),
                        ..config
                    }
                }
            },
            Err(e) => {
                warn!("Failed to read config file, overwriting with default. Error: {e}");
                let config = Config::default();
                if let Err(e) = config.store() {
                    error!("Failed to write default config: {e}");
                }
                config
            }
        }
    }

    pub fn store(&self) -> Result<(), confy::ConfyError> {
        confy::store(APP_NAME, None, self)
    }

    pub fn open_store(&self) -> storage::Result<JsonFileStore> {
        match &self.storage.directory {
            Some(dir) => Ok(JsonFileStore::new(dir)),
            None => JsonFileStore::default_location(),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_ser_config() {
        let config: Config = Default::default();
        let serialized = toml::to_string(&config).unwrap();
        let deser = toml::from_str(&serialized);
        assert_eq!(deser, Ok(config));
    }

    #[test]
    fn test_ser_config_with_dir() {
        let config = Config {
            storage: Storage {
                directory: Some(PathBuf::from("/tmp/games")),
            },
            ..Default::default()
        };
        let serialized = toml::to_string(&config).unwrap();
        assert!(serialized.contains("directory = \"/tmp/games\""));
        let deser: Config = toml::from_str(&serialized).unwrap();
        assert_eq!(deser, config);
    }

    #[test]
    fn test_open_store() {
        let config = Config {
            storage: Storage {
                directory: Some(PathBuf::from("/tmp/games")),
            },
            ..Default::default()
        };
        assert_eq!(
            config.open_store().unwrap().dir(),
            std::path::Path::new("/tmp/games")
        );
    }
}
