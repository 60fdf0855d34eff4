//! Engine configuration.
//!
//! The config file is located at `~/.config/buildql/config.toml` unless
//! `BUILDQL_CONFIG` or `XDG_CONFIG_HOME` point elsewhere. Every setting is
//! optional; a missing file yields the defaults.
//!
//! ```toml
//! # Prepared fuzzy needles kept before the cache is cleared
//! needle_cache_capacity = 1000
//!
//! # Parsed queries kept before the cache is cleared
//! ast_cache_capacity = 256
//!
//! # Match base fields against both faces of two-faced records
//! match_backs = false
//!
//! # Locale used by localized field values
//! locale = "en"
//! ```

use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use directories::BaseDirs;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::fuzzy::DEFAULT_NEEDLE_CACHE_CAPACITY;

/// Environment variable overriding the config file path.
pub const CONFIG_ENV_VAR: &str = "BUILDQL_CONFIG";

/// Default number of parsed queries kept by the engine.
pub const DEFAULT_AST_CACHE_CAPACITY: usize = 256;

/// Errors that can occur while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file exists but could not be read.
    #[error("failed to read config {}: {source}", .path.display())]
    Read {
        /// The config file path.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// The config file is not valid TOML or has wrongly typed settings.
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// Neither an explicit path nor a home directory is available.
    #[error("could not determine config directory")]
    NoConfigDir,
}

/// Engine settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryConfig {
    /// Prepared fuzzy needles kept before the needle cache is cleared.
    pub needle_cache_capacity: usize,

    /// Parsed queries kept before the AST cache is cleared.
    pub ast_cache_capacity: usize,

    /// Default for cross-face matching in resolution contexts.
    pub match_backs: bool,

    /// Default locale for resolution contexts.
    pub locale: String,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            needle_cache_capacity: DEFAULT_NEEDLE_CACHE_CAPACITY,
            ast_cache_capacity: DEFAULT_AST_CACHE_CAPACITY,
            match_backs: false,
            locale: "en".to_string(),
        }
    }
}

impl QueryConfig {
    /// Parses a config from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Loads the config from a file, returning defaults if it does not exist.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        Self::from_toml_str(&content)
    }

    /// Loads the config from the default location.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&config_path()?)
    }
}

/// Gets the config file path.
///
/// Uses `BUILDQL_CONFIG` if set, then `$XDG_CONFIG_HOME/buildql/config.toml`,
/// then `~/.config/buildql/config.toml` on all platforms.
pub fn config_path() -> Result<PathBuf, ConfigError> {
    if let Ok(path) = env::var(CONFIG_ENV_VAR) {
        return Ok(PathBuf::from(path));
    }

    if let Ok(xdg_config) = env::var("XDG_CONFIG_HOME") {
        return Ok(PathBuf::from(xdg_config).join("buildql").join("config.toml"));
    }

    BaseDirs::new()
        .map(|dirs| dirs.home_dir().join(".config").join("buildql").join("config.toml"))
        .ok_or(ConfigError::NoConfigDir)
}
