//! Configuration file loading for the terminal game.
//!
//! Settings come from `chess.toml` in the working directory unless another
//! path is given on the command line. Every field has a default, so a
//! missing file or a partial one is fine.

use std::path::{Path, PathBuf};

use chess_rules::MateRule;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur when loading or parsing configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),
    /// Failed to parse the configuration file as valid TOML.
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),
}

/// Default player names. Absent names are asked for at the start of a new
/// game.
#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq, Eq)]
pub struct PlayersConfig {
    #[serde(default)]
    pub white: Option<String>,
    #[serde(default)]
    pub black: Option<String>,
}

/// Main configuration structure.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct Config {
    /// Directory save files are written to. Defaults to `saves`.
    #[serde(default = "default_save_dir")]
    pub save_dir: PathBuf,
    /// Draw the board with ANSI colours. Defaults to true.
    #[serde(default = "default_color")]
    pub color: bool,
    /// Log level used when `--verbose` is not given. Defaults to `warn`.
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// How checkmate is decided in new games.
    #[serde(default)]
    pub mate_rule: MateRule,
    #[serde(default)]
    pub players: PlayersConfig,
}

fn default_save_dir() -> PathBuf {
    PathBuf::from("saves")
}

fn default_color() -> bool {
    true
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Config {
            save_dir: default_save_dir(),
            color: default_color(),
            log_level: default_log_level(),
            mate_rule: MateRule::default(),
            players: PlayersConfig::default(),
        }
    }
}

impl Config {
    /// Loads the configuration from `path`, or from [`Self::config_path()`]
    /// when none is given.
    ///
    /// A missing file yields the default configuration.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config_path = path.map_or_else(Self::config_path, Path::to_path_buf);
        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            Ok(toml::from_str(&content)?)
        } else {
            Ok(Self::default())
        }
    }

    /// Returns the default configuration file path: `chess.toml` in the
    /// current working directory.
    pub fn config_path() -> PathBuf {
        PathBuf::from("chess.toml")
    }
}
