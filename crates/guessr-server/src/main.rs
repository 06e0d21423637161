//! guessr server entry point.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `guessr-config.yaml` (or `GUESSR_CONFIG`)
//! 2. Initialize structured logging (tracing)
//! 3. Validate rules, load the page template, start the first round
//! 4. Serve until `Ctrl-C`

use std::path::PathBuf;

use guessr_core::config::GuessrConfig;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Default configuration file, relative to the working directory.
const DEFAULT_CONFIG_PATH: &str = "guessr-config.yaml";

/// Application entry point.
///
/// # Errors
///
/// Returns an error if configuration, startup, or serving fails.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config_path = std::env::var("GUESSR_CONFIG")
        .map_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH), PathBuf::from);
    let config = GuessrConfig::load_or_default(&config_path)?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.logging.level)),
        )
        .with_target(true)
        .init();

    info!(
        config = %config_path.display(),
        host = config.server.host,
        port = config.server.port,
        "guessr-server starting"
    );

    guessr_server::startup::run(&config).await?;

    Ok(())
}
