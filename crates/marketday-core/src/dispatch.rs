//! Event dispatch: the single consumer that serializes access to a session.
//!
//! Every producer (one per connected player, plus the clock) holds a
//! cloneable [`SessionHandle`] and enqueues [`Event`]s without waiting.
//! One [`Dispatcher`] task drains the queue and applies each event to the
//! session to completion before taking the next, so session state is never
//! touched by two events at once and needs no locking.

use std::time::Duration;

use marketday_types::ClientMessage;
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::player::PlayerHandle;
use crate::session::Session;

/// Something that happened to a session.
#[derive(Debug)]
pub enum Event {
    /// A player sent a message.
    Player {
        /// The sender.
        player: PlayerHandle,
        /// What they sent.
        message: ClientMessage,
    },
    /// The session clock advanced.
    Tick {
        /// Total time elapsed since the clock started.
        elapsed: Duration,
    },
}

/// Errors that can occur when enqueueing an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum DispatchError {
    /// The dispatcher has stopped and will never apply the event.
    #[error("session dispatcher has shut down")]
    SessionClosed,
}

/// Producer side of a session's event queue.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    tx: mpsc::UnboundedSender<Event>,
}

impl SessionHandle {
    /// Enqueue an event.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::SessionClosed`] if the dispatcher is gone.
    pub fn dispatch(&self, event: Event) -> Result<(), DispatchError> {
        self.tx
            .send(event)
            .map_err(|_closed| DispatchError::SessionClosed)
    }

    /// Enqueue a message from `player`.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::SessionClosed`] if the dispatcher is gone.
    pub fn send(&self, player: PlayerHandle, message: ClientMessage) -> Result<(), DispatchError> {
        self.dispatch(Event::Player { player, message })
    }

    /// Enqueue a clock tick.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::SessionClosed`] if the dispatcher is gone.
    pub fn tick(&self, elapsed: Duration) -> Result<(), DispatchError> {
        self.dispatch(Event::Tick { elapsed })
    }

    /// Whether the dispatcher has stopped.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Consumer side of a session's event queue. Owns the session.
#[derive(Debug)]
pub struct Dispatcher {
    session: Session,
    rx: mpsc::UnboundedReceiver<Event>,
}

impl Dispatcher {
    /// Take ownership of `session` and return the dispatcher together with
    /// the first handle to its queue.
    pub fn new(session: Session) -> (Self, SessionHandle) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { session, rx }, SessionHandle { tx })
    }

    /// Apply events in arrival order until every handle has been dropped,
    /// then hand the session back.
    pub async fn run(mut self) -> Session {
        info!(session = %self.session.name(), "Dispatcher started");
        let mut applied: u64 = 0;
        while let Some(event) = self.rx.recv().await {
            self.session.apply(event);
            applied = applied.saturating_add(1);
        }
        debug!(session = %self.session.name(), applied, "Event queue drained");
        info!(session = %self.session.name(), phase = %self.session.phase(), "Dispatcher stopped");
        self.session
    }
}
