//! The lobby phase.
//!
//! Tracks every player who joined and whether they are ready. The game
//! starts once every tracked player is ready and there are enough of them.

use std::collections::BTreeMap;

use marketday_types::{ClientMessage, Phase, PlayerId};
use tracing::debug;

use crate::player::PlayerHandle;

/// Readiness of each player in the lobby.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Waiting {
    min_players: usize,
    ready: BTreeMap<PlayerId, bool>,
}

impl Waiting {
    /// Create an empty lobby that needs `min_players` ready players.
    pub const fn new(min_players: usize) -> Self {
        Self {
            min_players,
            ready: BTreeMap::new(),
        }
    }

    /// Number of players tracked by the lobby.
    pub fn player_count(&self) -> usize {
        self.ready.len()
    }

    /// Number of tracked players who are ready.
    pub fn ready_count(&self) -> usize {
        self.ready.values().filter(|&&ready| ready).count()
    }

    /// Whether `player` is tracked and ready.
    pub fn is_ready(&self, player: PlayerId) -> bool {
        self.ready.get(&player).copied().unwrap_or(false)
    }

    /// Whether the game may start.
    pub fn can_start(&self) -> bool {
        self.ready.len() >= self.min_players && self.ready.values().all(|&ready| ready)
    }

    pub(crate) fn receive(&mut self, player: &PlayerHandle, message: &ClientMessage) -> Option<Phase> {
        let id = player.id();
        match message {
            ClientMessage::Join => {
                self.ready.insert(id, false);
                None
            }
            ClientMessage::Ready => {
                self.ready.insert(id, true);
                debug!(player = %id, ready = self.ready_count(), total = self.ready.len(), "Player ready");
                self.proceed()
            }
            ClientMessage::Leave => {
                self.ready.remove(&id);
                self.proceed()
            }
            _ => None,
        }
    }

    fn proceed(&self) -> Option<Phase> {
        self.can_start().then_some(Phase::Production)
    }
}
