//! Game server for Marketday.
//!
//! This crate provides an Axum HTTP server that hosts any number of named
//! games:
//!
//! - **`WebSocket` endpoint** (`/join`) through which players connect,
//!   send [`ClientMessage`]s, and receive [`ServerMessage`]s
//! - **REST endpoint** (`/api/sessions`) listing the hosted games
//! - **Minimal HTML status page** (`GET /`)
//!
//! # Architecture
//!
//! Each game is a [`marketday_core::Session`] running on its own
//! dispatcher task. The transport never touches session state: a
//! connection only enqueues events and drains its own outbound queue.
//!
//! [`ClientMessage`]: marketday_types::ClientMessage
//! [`ServerMessage`]: marketday_types::ServerMessage

pub mod handlers;
pub mod registry;
pub mod roster;
pub mod router;
pub mod server;
pub mod state;
pub mod ws;

// Re-export primary types for convenience.
pub use registry::{GameSummary, Membership, SessionRegistry};
pub use roster::{Roster, WsPlayer};
pub use router::build_router;
pub use server::{start_server, ServerError};
pub use state::AppState;
