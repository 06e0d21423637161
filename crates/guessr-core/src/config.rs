//! Configuration loading and typed config structures for guessr.
//!
//! The configuration lives in `guessr-config.yaml`. This module defines
//! strongly-typed structs that mirror the YAML structure and a loader that
//! reads the file and applies environment overrides. Every field has a
//! default, so an empty document (or no file at all) yields a playable
//! server: a 60 second round, a 5 second guess window, and secrets drawn
//! from 1 to 100.

use std::path::Path;

use serde::Deserialize;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// An environment override could not be parsed.
    #[error("invalid value for {name}: {reason}")]
    Env {
        /// The environment variable name.
        name: String,
        /// Why the value was rejected.
        reason: String,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level guessr configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct GuessrConfig {
    /// HTTP listener settings.
    #[serde(default)]
    pub server: ServerSection,

    /// Game timing and secret range.
    #[serde(default)]
    pub game: GameSection,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingSection,
}

impl GuessrConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// Environment variables override YAML values for the listener:
    /// - `GUESSR_HOST` overrides `server.host`
    /// - `GUESSR_PORT` overrides `server.port`
    /// - `GUESSR_TEMPLATES_DIR` overrides `server.templates_dir`
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read,
    /// [`ConfigError::Yaml`] if the content is not valid YAML, or
    /// [`ConfigError::Env`] if an override is malformed.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Load from `path` if it exists, otherwise start from defaults.
    ///
    /// Environment overrides are applied in both cases.
    ///
    /// # Errors
    ///
    /// Same as [`GuessrConfig::from_file`].
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            return Self::from_file(path);
        }
        let mut config = Self::default();
        config.server.apply_env_overrides()?;
        Ok(config)
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let mut config: Self = if yaml.trim().is_empty() {
            Self::default()
        } else {
            serde_yml::from_str(yaml)?
        };
        config.server.apply_env_overrides()?;
        Ok(config)
    }
}

/// HTTP listener configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ServerSection {
    /// Address to bind to.
    #[serde(default = "default_host")]
    pub host: String,

    /// TCP port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Directory holding `game.html`. The built-in page is used when unset.
    #[serde(default)]
    pub templates_dir: Option<String>,
}

impl ServerSection {
    /// Override listener settings with environment variables when set.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Env`] if `GUESSR_PORT` is not a valid port.
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Ok(val) = std::env::var("GUESSR_HOST") {
            self.host = val;
        }
        if let Ok(val) = std::env::var("GUESSR_PORT") {
            self.port = val.parse().map_err(|e| ConfigError::Env {
                name: "GUESSR_PORT".to_owned(),
                reason: format!("{e}"),
            })?;
        }
        if let Ok(val) = std::env::var("GUESSR_TEMPLATES_DIR") {
            self.templates_dir = Some(val);
        }
        Ok(())
    }
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            templates_dir: None,
        }
    }
}

/// Game rule parameters as written in the config file.
///
/// Validated into [`GameRules`](crate::rules::GameRules) before use.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GameSection {
    /// Length of a round in seconds.
    #[serde(default = "default_round_seconds")]
    pub round_seconds: u64,

    /// Maximum seconds allowed between consecutive guesses.
    #[serde(default = "default_guess_window_seconds")]
    pub guess_window_seconds: u64,

    /// Smallest possible secret.
    #[serde(default = "default_secret_min")]
    pub secret_min: i64,

    /// Largest possible secret.
    #[serde(default = "default_secret_max")]
    pub secret_max: i64,

    /// Whether a plain page load (`GET /`) starts a new round.
    #[serde(default = "default_reset_on_reload")]
    pub reset_on_reload: bool,

    /// Seed for the secret generator. Drawn from the OS when unset.
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for GameSection {
    fn default() -> Self {
        Self {
            round_seconds: default_round_seconds(),
            guess_window_seconds: default_guess_window_seconds(),
            secret_min: default_secret_min(),
            secret_max: default_secret_max(),
            reset_on_reload: default_reset_on_reload(),
            seed: None,
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingSection {
    /// Default filter directive when `RUST_LOG` is not set.
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_owned()
}

const fn default_port() -> u16 {
    8888
}

const fn default_round_seconds() -> u64 {
    60
}

const fn default_guess_window_seconds() -> u64 {
    5
}

const fn default_secret_min() -> i64 {
    1
}

const fn default_secret_max() -> i64 {
    100
}

const fn default_reset_on_reload() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_owned()
}
