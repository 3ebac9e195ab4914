//! `WebSocket` transport for players.
//!
//! Players connect to `GET /join?name=<player>&game=<game>`. Each
//! connection becomes one [`WsPlayer`] in the named game's roster:
//!
//! - On connect the player joins the roster and a `join` event is queued.
//! - Every text (or binary) frame is decoded as a
//!   [`ClientMessage`] and queued. Frames that do not decode are logged
//!   and dropped; they never reach the session.
//! - Outbound messages are written by a dedicated writer task so the
//!   session never waits on the socket.
//! - On disconnect the player leaves the roster and a `leave` event is
//!   queued.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{Query, State, WebSocketUpgrade};
use axum::response::IntoResponse;
use futures::{SinkExt, StreamExt};
use marketday_core::{PlayerHandle, SessionHandle};
use marketday_types::ClientMessage;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::registry::Membership;
use crate::roster::WsPlayer;
use crate::state::AppState;

/// Display name given to players who connect without one.
const ANONYMOUS: &str = "anonymous";

/// Query parameters for `GET /join`.
#[derive(Debug, Default, serde::Deserialize)]
pub struct JoinQuery {
    /// Display name of the joining player.
    pub name: Option<String>,
    /// Game to join. The server's default game when absent.
    pub game: Option<String>,
}

/// Upgrade an HTTP request to a `WebSocket` player connection.
///
/// # Route
///
/// `GET /join`
pub async fn join(
    ws: WebSocketUpgrade,
    Query(query): Query<JoinQuery>,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    let game = query
        .game
        .filter(|g| !g.is_empty())
        .unwrap_or_else(|| state.default_game.clone());
    let name = query
        .name
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| ANONYMOUS.to_owned());
    ws.on_upgrade(move |socket| handle_socket(socket, state, game, name))
}

/// Run one player connection until the client goes away.
async fn handle_socket(socket: WebSocket, state: Arc<AppState>, game: String, name: String) {
    let (outbound_tx, mut outbound_rx) = mpsc::unbounded_channel::<String>();
    let player: PlayerHandle = Arc::new(WsPlayer::new(name, outbound_tx));
    let id = player.id();
    let membership = state.registry.join(&game);
    info!(%game, player = %id, name = %player.name(), "Player connected");

    let (mut sink, mut stream) = socket.split();
    let writer = tokio::spawn(async move {
        while let Some(text) = outbound_rx.recv().await {
            if sink.send(Message::Text(text.into())).await.is_err() {
                debug!(player = %id, "WebSocket send failed");
                break;
            }
        }
    });

    let mut open = connect(&membership, &player);
    while open {
        open = match stream.next().await {
            Some(Ok(frame)) => on_frame(&membership.handle, &player, &frame),
            Some(Err(e)) => {
                debug!(player = %id, error = %e, "WebSocket error");
                false
            }
            None => false,
        };
    }

    disconnect(&membership, &player);
    writer.abort();
    info!(%game, player = %id, "Player disconnected");
}

/// Add `player` to the game's roster and queue its `join`. Returns `false`
/// if the session is gone.
fn connect(membership: &Membership, player: &PlayerHandle) -> bool {
    membership.roster.add(Arc::clone(player));
    forward(&membership.handle, player, ClientMessage::Join)
}

/// Take `player` out of the game's roster and queue its `leave`.
fn disconnect(membership: &Membership, player: &PlayerHandle) {
    membership.roster.remove(player.id());
    forward(&membership.handle, player, ClientMessage::Leave);
}

/// Handle one inbound frame. Returns `false` once the connection should
/// close.
fn on_frame(handle: &SessionHandle, player: &PlayerHandle, frame: &Message) -> bool {
    match frame {
        Message::Text(text) => decode_and_forward(handle, player, text.as_str().as_bytes()),
        Message::Binary(data) => decode_and_forward(handle, player, data),
        Message::Close(_) => false,
        Message::Ping(_) | Message::Pong(_) => true,
    }
}

/// Decode a frame and queue it. Returns `false` once the session is gone.
fn decode_and_forward(handle: &SessionHandle, player: &PlayerHandle, data: &[u8]) -> bool {
    match ClientMessage::decode(data) {
        Ok(message) => forward(handle, player, message),
        Err(e) => {
            warn!(player = %player.id(), error = %e, "Dropping undecodable message");
            true
        }
    }
}

/// Queue a message for the session. Returns `false` once the session is
/// gone.
fn forward(handle: &SessionHandle, player: &PlayerHandle, message: ClientMessage) -> bool {
    let action = message.action();
    match handle.send(Arc::clone(player), message) {
        Ok(()) => true,
        Err(e) => {
            warn!(player = %player.id(), action, error = %e, "Session unavailable");
            false
        }
    }
}
