//! Shared application state for the game server.

use marketday_core::GameConfig;

use crate::registry::SessionRegistry;

/// Shared state for the Axum application.
///
/// Wrapped in [`Arc`](std::sync::Arc) and injected via Axum's `State`
/// extractor.
#[derive(Debug)]
pub struct AppState {
    /// Every game hosted by this server.
    pub registry: SessionRegistry,
    /// Game joined by players who do not name one.
    pub default_game: String,
}

impl AppState {
    /// Create application state with no games running.
    pub fn new(config: &GameConfig) -> Self {
        Self {
            registry: SessionRegistry::new(config),
            default_game: config.session.default_game.clone(),
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(&GameConfig::default())
    }
}
