//! Named game sessions hosted by the server.
//!
//! The registry owns one entry per game name. The first player to join a
//! name creates the session and spawns its dispatcher and clock; everyone
//! after that joins the running session. Sessions live for as long as the
//! server does.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use marketday_core::{spawn_session, Broadcaster, GameConfig, RunningSession, Session, SessionHandle, SessionRules};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use tracing::info;

use crate::roster::Roster;

/// What a joining connection needs to take part in a game.
#[derive(Debug, Clone)]
pub struct Membership {
    /// Queue for the game's events.
    pub handle: SessionHandle,
    /// The game's connected players.
    pub roster: Arc<Roster>,
}

/// Public summary of a hosted game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GameSummary {
    /// Game name.
    pub name: String,
    /// Number of connected players.
    pub players: usize,
}

#[derive(Debug)]
struct Game {
    roster: Arc<Roster>,
    running: RunningSession,
}

/// Owned map from game name to running session.
#[derive(Debug)]
pub struct SessionRegistry {
    rules: SessionRules,
    tick_interval: Duration,
    seed: Option<u64>,
    games: Mutex<BTreeMap<String, Game>>,
}

impl SessionRegistry {
    /// Create an empty registry whose sessions follow `config`.
    pub fn new(config: &GameConfig) -> Self {
        Self {
            rules: config.rules(),
            tick_interval: config.session.tick_interval(),
            seed: config.session.seed,
            games: Mutex::new(BTreeMap::new()),
        }
    }

    /// Join the game called `name`, starting it if it is not running.
    ///
    /// Must be called from within a tokio runtime.
    pub fn join(&self, name: &str) -> Membership {
        let mut games = self.games.lock().unwrap_or_else(PoisonError::into_inner);
        let game = games.entry(name.to_owned()).or_insert_with(|| {
            info!(game = name, "Starting new game");
            let roster = Arc::new(Roster::new());
            let rng = self.seed.map_or_else(StdRng::from_os_rng, StdRng::seed_from_u64);
            let session = Session::new(
                name,
                self.rules,
                Arc::clone(&roster) as Arc<dyn Broadcaster>,
                rng,
            );
            Game {
                roster,
                running: spawn_session(session, self.tick_interval),
            }
        });
        Membership {
            handle: game.running.handle(),
            roster: Arc::clone(&game.roster),
        }
    }

    /// Summaries of every hosted game, ordered by name.
    pub fn games(&self) -> Vec<GameSummary> {
        self.games
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(name, game)| GameSummary {
                name: name.clone(),
                players: game.roster.len(),
            })
            .collect()
    }

    /// Number of hosted games.
    pub fn len(&self) -> usize {
        self.games.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Whether no game has been started yet.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn first_join_starts_game_once() {
        let registry = SessionRegistry::new(&GameConfig::default());
        assert!(registry.is_empty());

        let first = registry.join("alpha");
        let second = registry.join("alpha");
        registry.join("beta");

        assert_eq!(registry.len(), 2);
        assert!(Arc::ptr_eq(&first.roster, &second.roster));
        assert!(!first.handle.is_closed());
    }

    #[tokio::test]
    async fn games_are_listed_by_name() {
        let registry = SessionRegistry::new(&GameConfig::default());
        registry.join("zeta");
        registry.join("alpha");

        let names: Vec<String> = registry.games().into_iter().map(|g| g.name).collect();
        assert_eq!(names, vec![String::from("alpha"), String::from("zeta")]);
        assert!(registry.games().iter().all(|g| g.players == 0));
    }
}
