//! Marketday server binary.
//!
//! Loads configuration, initializes logging, and serves games until the
//! process is terminated.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `MARKETDAY_CONFIG` (default
//!    `marketday-config.yaml`), falling back to defaults if absent
//! 2. Initialize structured logging (tracing)
//! 3. Build the shared application state (empty game registry)
//! 4. Serve HTTP and `WebSocket` connections

mod error;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use marketday_core::GameConfig;
use marketday_core::config::LoggingConfig;
use marketday_server::AppState;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::error::EngineError;

/// Config file read when `MARKETDAY_CONFIG` is not set.
const DEFAULT_CONFIG_PATH: &str = "marketday-config.yaml";

/// Application entry point for the Marketday server.
///
/// # Errors
///
/// Returns an error if the configuration cannot be loaded or the server
/// fails to bind or serve.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Load configuration.
    let path = config_path();
    let loaded = load_config(&path)?;
    let config = loaded.config;

    // 2. Initialize structured logging.
    init_tracing(&config.logging);
    info!("marketday-engine starting");
    if loaded.from_file {
        info!(path = %path.display(), "Configuration loaded");
    } else {
        info!(path = %path.display(), "Config file not found, using defaults");
    }
    info!(
        host = %config.server.host,
        port = config.server.port,
        tick_interval_ms = config.session.tick_interval_ms,
        min_players = config.session.min_players,
        auction_rounds = config.session.auction_rounds,
        default_game = %config.session.default_game,
        "Configuration resolved"
    );

    // 3. Shared state.
    let state = Arc::new(AppState::new(&config));

    // 4. Serve until terminated.
    marketday_server::start_server(&config.server, state)
        .await
        .map_err(EngineError::from)?;

    info!("marketday-engine stopped");
    Ok(())
}

/// A loaded configuration and whether it came from disk.
struct LoadedConfig {
    config: GameConfig,
    from_file: bool,
}

/// Path of the configuration file.
fn config_path() -> PathBuf {
    std::env::var_os("MARKETDAY_CONFIG").map_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH), PathBuf::from)
}

/// Load configuration from `path`.
///
/// If the file does not exist, defaults are used (with environment
/// overrides still applied).
fn load_config(path: &Path) -> Result<LoadedConfig, EngineError> {
    if path.exists() {
        Ok(LoadedConfig {
            config: GameConfig::from_file(path)?,
            from_file: true,
        })
    } else {
        Ok(LoadedConfig {
            config: GameConfig::parse("")?,
            from_file: false,
        })
    }
}

/// Install the global tracing subscriber.
///
/// `RUST_LOG` takes precedence over the configured level.
fn init_tracing(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));
    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(true);
    if logging.json {
        builder.json().init();
    } else {
        builder.init();
    }
}
