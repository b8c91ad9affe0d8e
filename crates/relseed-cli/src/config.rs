use std::path::Path;

use relseed_generate::SeedOptions;
use relseed_introspect::{Engine, MarshalOptions};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_CONFIG_PATH: &str = "relseed.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("io error reading {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("toml decode error in {path}: {source}")]
    TomlDecode {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Contents of `relseed.toml`; every field is optional.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Engine assumed when a snapshot does not name one.
    pub engine: Engine,
    pub include_views: bool,
    pub schemas: Option<Vec<String>>,
    pub log_level: String,
    pub seed: SeedOptions,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            engine: Engine::Postgres,
            include_views: true,
            schemas: None,
            log_level: "info".to_string(),
            seed: SeedOptions::default(),
        }
    }
}

impl Config {
    pub fn from_toml_str(content: &str, origin: &Path) -> ConfigResult<Self> {
        toml::from_str(content).map_err(|source| ConfigError::TomlDecode {
            path: origin.display().to_string(),
            source,
        })
    }

    pub fn marshal_options(&self) -> MarshalOptions {
        MarshalOptions {
            engine: self.engine,
            include_views: self.include_views,
            schemas: self.schemas.clone(),
        }
    }
}

/// Load the config file; a file that does not exist yields the defaults.
pub fn load_config(path: &Path) -> ConfigResult<Config> {
    if !path.exists() {
        return Ok(Config::default());
    }
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.display().to_string(),
        source,
    })?;
    Config::from_toml_str(&content, path)
}
