//! Recording test doubles for the player and broadcast seams.

#![allow(clippy::unwrap_used, clippy::missing_panics_doc)]

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use marketday_types::{PlayerId, ServerMessage};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::player::{Broadcaster, DeliveryError, Player, PlayerHandle};

/// Seed used by every test session.
pub const TEST_SEED: u64 = 7;

/// A deterministic generator seeded with [`TEST_SEED`].
pub fn test_rng() -> StdRng {
    StdRng::seed_from_u64(TEST_SEED)
}

/// The first `n` auction seeds a session built with [`test_rng`] draws.
pub fn expected_seeds(n: usize) -> Vec<u32> {
    let mut rng = test_rng();
    (0..n).map(|_| rng.random::<u32>()).collect()
}

/// Broadcaster that records every message instead of sending it.
#[derive(Debug, Clone, Default)]
pub struct RecordingBroadcaster {
    sent: Arc<Mutex<Vec<ServerMessage>>>,
}

impl RecordingBroadcaster {
    /// Create an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything broadcast so far, in order.
    pub fn messages(&self) -> Vec<ServerMessage> {
        self.sent.lock().unwrap().clone()
    }

    /// Forget everything broadcast so far.
    pub fn clear(&self) {
        self.sent.lock().unwrap().clear();
    }
}

impl Broadcaster for RecordingBroadcaster {
    fn broadcast(&self, message: &ServerMessage) -> Result<(), DeliveryError> {
        self.sent.lock().unwrap().push(message.clone());
        Ok(())
    }
}

#[derive(Debug)]
struct Recorded {
    id: PlayerId,
    name: Mutex<String>,
    inbox: Mutex<Vec<ServerMessage>>,
    connected: AtomicBool,
}

impl Player for Recorded {
    fn id(&self) -> PlayerId {
        self.id
    }

    fn name(&self) -> String {
        self.name.lock().unwrap().clone()
    }

    fn set_name(&self, name: String) {
        *self.name.lock().unwrap() = name;
    }

    fn deliver(&self, message: &ServerMessage) -> Result<(), DeliveryError> {
        if !self.connected.load(Ordering::SeqCst) {
            return Err(DeliveryError::Disconnected { player: self.id });
        }
        self.inbox.lock().unwrap().push(message.clone());
        Ok(())
    }
}

/// A player that records every message delivered to it.
#[derive(Debug, Clone)]
pub struct TestPlayer {
    inner: Arc<Recorded>,
}

impl TestPlayer {
    /// Create a connected player with the given display name.
    pub fn new(name: &str) -> Self {
        Self {
            inner: Arc::new(Recorded {
                id: PlayerId::new(),
                name: Mutex::new(name.to_owned()),
                inbox: Mutex::new(Vec::new()),
                connected: AtomicBool::new(true),
            }),
        }
    }

    /// The player's identity.
    pub fn id(&self) -> PlayerId {
        self.inner.id
    }

    /// The player's current display name.
    pub fn name(&self) -> String {
        self.inner.name()
    }

    /// A shared handle suitable for passing to a session.
    pub fn handle(&self) -> PlayerHandle {
        Arc::clone(&self.inner) as PlayerHandle
    }

    /// Every message delivered to this player, in order.
    pub fn received(&self) -> Vec<ServerMessage> {
        self.inner.inbox.lock().unwrap().clone()
    }

    /// Forget everything delivered so far.
    pub fn clear(&self) {
        self.inner.inbox.lock().unwrap().clear();
    }

    /// Make every further delivery fail.
    pub fn disconnect(&self) {
        self.inner.connected.store(false, Ordering::SeqCst);
    }
}
