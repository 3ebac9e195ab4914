//! Axum router construction for the game server.
//!
//! Assembles all routes (HTTP + `WebSocket`) into a single [`Router`]
//! with CORS middleware enabled for browser clients served elsewhere.

use std::sync::Arc;

use axum::routing::get;
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;
use crate::ws;

/// Build the complete Axum router for the game server.
///
/// The router includes:
/// - `GET /` -- minimal HTML status page
/// - `GET /join` -- `WebSocket` player connection
/// - `GET /api/sessions` -- list hosted games
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Status page
        .route("/", get(handlers::index))
        // WebSocket
        .route("/join", get(ws::join))
        // REST API
        .route("/api/sessions", get(handlers::list_sessions))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
