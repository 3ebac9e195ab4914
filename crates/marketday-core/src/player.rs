//! The seams between a session and the transport that carries its messages.
//!
//! A session never touches sockets. It talks to a [`Player`] when one
//! participant must be told something and to a [`Broadcaster`] when the
//! whole game must. Both are fire-and-forget: a failed delivery is
//! reported to the caller, which logs it and moves on.

use std::fmt;
use std::sync::Arc;

use marketday_types::{PlayerId, ServerMessage};

/// Errors that can occur when delivering a message to players.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DeliveryError {
    /// The player's connection is gone.
    #[error("player {player} is disconnected")]
    Disconnected {
        /// The unreachable player.
        player: PlayerId,
    },

    /// A broadcast reached some recipients but not all of them.
    #[error("broadcast failed for {failed} of {total} players")]
    Partial {
        /// Recipients the message could not be delivered to.
        failed: usize,
        /// Recipients the broadcast was attempted for.
        total: usize,
    },

    /// The message could not be serialized for the wire.
    #[error("failed to encode message: {reason}")]
    Encode {
        /// Description of the serialization failure.
        reason: String,
    },
}

/// A participant in a game session.
///
/// Implementations are shared between the transport and the session, so
/// every method takes `&self`. Renaming must therefore use interior
/// mutability.
pub trait Player: Send + Sync + fmt::Debug {
    /// Stable identity of this player.
    fn id(&self) -> PlayerId;

    /// Current display name.
    fn name(&self) -> String;

    /// Change the display name.
    fn set_name(&self, name: String);

    /// Send one message to this player.
    ///
    /// # Errors
    ///
    /// Returns [`DeliveryError`] if the message cannot be handed to the
    /// player's connection.
    fn deliver(&self, message: &ServerMessage) -> Result<(), DeliveryError>;
}

/// Shared handle to a player.
pub type PlayerHandle = Arc<dyn Player>;

/// Delivers a message to every player in a game.
pub trait Broadcaster: Send + Sync {
    /// Send `message` to every current player.
    ///
    /// Delivery continues past individual failures.
    ///
    /// # Errors
    ///
    /// Returns [`DeliveryError::Partial`] if any recipient failed.
    fn broadcast(&self, message: &ServerMessage) -> Result<(), DeliveryError>;
}

/// Deliver `message` to each of `players`, attempting every one even when
/// earlier deliveries fail.
///
/// # Errors
///
/// Returns [`DeliveryError::Partial`] counting the failed recipients.
pub fn deliver_all<'a, I>(players: I, message: &ServerMessage) -> Result<(), DeliveryError>
where
    I: IntoIterator<Item = &'a PlayerHandle>,
{
    let mut total = 0_usize;
    let mut failed = 0_usize;
    for player in players {
        total = total.saturating_add(1);
        if let Err(e) = player.deliver(message) {
            tracing::debug!(player = %player.id(), error = %e, "Delivery failed");
            failed = failed.saturating_add(1);
        }
    }
    if failed == 0 {
        Ok(())
    } else {
        Err(DeliveryError::Partial { failed, total })
    }
}
