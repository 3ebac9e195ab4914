//! Connected players and the per-game roster.
//!
//! A [`WsPlayer`] is the session-facing side of one `WebSocket`
//! connection: delivering a message encodes it and queues the text on the
//! connection's outbound channel, which a writer task drains into the
//! socket. Delivery therefore never waits on the network.
//!
//! A [`Roster`] is the set of players connected to one game and serves as
//! that game's [`Broadcaster`].

use std::collections::BTreeMap;
use std::sync::{PoisonError, RwLock};

use marketday_core::{deliver_all, Broadcaster, DeliveryError, Player, PlayerHandle};
use marketday_types::{PlayerId, ServerMessage};
use tokio::sync::mpsc;

/// A player connected over a `WebSocket`.
#[derive(Debug)]
pub struct WsPlayer {
    id: PlayerId,
    name: RwLock<String>,
    outbound: mpsc::UnboundedSender<String>,
}

impl WsPlayer {
    /// Create a player whose messages are queued on `outbound`.
    pub fn new(name: String, outbound: mpsc::UnboundedSender<String>) -> Self {
        Self {
            id: PlayerId::new(),
            name: RwLock::new(name),
            outbound,
        }
    }
}

impl Player for WsPlayer {
    fn id(&self) -> PlayerId {
        self.id
    }

    fn name(&self) -> String {
        self.name
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn set_name(&self, name: String) {
        *self.name.write().unwrap_or_else(PoisonError::into_inner) = name;
    }

    fn deliver(&self, message: &ServerMessage) -> Result<(), DeliveryError> {
        let text = message.encode().map_err(|e| DeliveryError::Encode {
            reason: e.to_string(),
        })?;
        self.outbound
            .send(text)
            .map_err(|_closed| DeliveryError::Disconnected { player: self.id })
    }
}

/// Players connected to one game.
#[derive(Debug, Default)]
pub struct Roster {
    players: RwLock<BTreeMap<PlayerId, PlayerHandle>>,
}

impl Roster {
    /// Create an empty roster.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a player. Replaces any entry with the same id.
    pub fn add(&self, player: PlayerHandle) {
        self.players
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(player.id(), player);
    }

    /// Remove a player, returning it if it was present.
    pub fn remove(&self, id: PlayerId) -> Option<PlayerHandle> {
        self.players
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&id)
    }

    /// Number of connected players.
    pub fn len(&self) -> usize {
        self.players
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Whether nobody is connected.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Broadcaster for Roster {
    fn broadcast(&self, message: &ServerMessage) -> Result<(), DeliveryError> {
        // Deliver from a snapshot so the lock is not held while encoding.
        let players: Vec<PlayerHandle> = self
            .players
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .cloned()
            .collect();
        deliver_all(&players, message)
    }
}
