//! Wiring from configuration to a running server.
//!
//! [`build_state`] validates the game rules, loads the page template, and
//! starts the first round. [`run`] does that and then serves until
//! shutdown. The binary is a thin wrapper around [`run`].

use std::sync::Arc;

use guessr_core::config::{ConfigError, GuessrConfig};
use guessr_core::rules::{GameRules, RulesError};
use tracing::info;

use crate::render::{PageRenderer, RenderError};
use crate::server::{ServerConfig, ServerError, start_server};
use crate::state::AppState;

/// Errors that can occur while bringing the server up.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    /// The configuration file could not be loaded.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: ConfigError,
    },

    /// The game section describes impossible rules.
    #[error("rules error: {source}")]
    Rules {
        /// The underlying rules error.
        #[from]
        source: RulesError,
    },

    /// The page template could not be loaded.
    #[error("template error: {source}")]
    Render {
        /// The underlying render error.
        #[from]
        source: RenderError,
    },

    /// The server failed to bind or serve.
    #[error("server error: {source}")]
    Server {
        /// The underlying server error.
        #[from]
        source: ServerError,
    },
}

/// Build the shared application state described by `config`.
///
/// # Errors
///
/// Returns [`StartupError::Rules`] for invalid game settings or
/// [`StartupError::Render`] if the page template cannot be loaded.
pub fn build_state(config: &GuessrConfig) -> Result<AppState, StartupError> {
    let rules = GameRules::from_section(&config.game)?;

    let renderer = match config.server.templates_dir.as_deref() {
        Some(dir) => {
            info!(templates_dir = dir, "loading page template from disk");
            PageRenderer::from_dir(dir)?
        }
        None => PageRenderer::builtin()?,
    };

    info!(
        round_seconds = config.game.round_seconds,
        guess_window_seconds = config.game.guess_window_seconds,
        secret_min = config.game.secret_min,
        secret_max = config.game.secret_max,
        reset_on_reload = config.game.reset_on_reload,
        seeded = config.game.seed.is_some(),
        "game rules loaded"
    );

    Ok(AppState::live(
        rules,
        config.game.seed,
        config.game.reset_on_reload,
        renderer,
    ))
}

/// Build the state and serve until shutdown.
///
/// # Errors
///
/// Returns any error from [`build_state`] or the server itself.
pub async fn run(config: &GuessrConfig) -> Result<(), StartupError> {
    let state = Arc::new(build_state(config)?);
    let server = ServerConfig {
        host: config.server.host.clone(),
        port: config.server.port,
    };
    start_server(&server, state).await?;
    Ok(())
}
