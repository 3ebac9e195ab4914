//! HTTP endpoint handlers for the game server.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET` | `/` | Minimal HTML status page |
//! | `GET` | `/api/sessions` | List hosted games |

use std::fmt::Write as _;
use std::sync::Arc;

use axum::extract::State;
use axum::response::{Html, IntoResponse};
use axum::Json;

use crate::registry::GameSummary;
use crate::state::AppState;

/// Serve a minimal HTML page listing the hosted games.
pub async fn index(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let games = state.registry.games();
    let mut rows = String::new();
    for game in &games {
        let _ = write!(
            rows,
            "<tr><td>{}</td><td>{}</td></tr>",
            escape(&game.name),
            game.players
        );
    }
    if games.is_empty() {
        rows.push_str(r#"<tr><td colspan="2">No games yet</td></tr>"#);
    }

    Html(format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="utf-8">
    <title>Marketday</title>
    <style>
        body {{
            background: #0d1117;
            color: #c9d1d9;
            font-family: 'Cascadia Code', 'Fira Code', 'Consolas', monospace;
            padding: 2rem;
            max-width: 800px;
        }}
        h1 {{ color: #58a6ff; }}
        table {{ border-collapse: collapse; }}
        td, th {{ padding: 0.25rem 1rem; border-bottom: 1px solid #30363d; text-align: left; }}
        code {{ color: #7ee787; }}
    </style>
</head>
<body>
    <h1>Marketday</h1>
    <p>Join a game with <code>GET /join?name=&lt;player&gt;&amp;game=&lt;game&gt;</code>
       (default game: <code>{default_game}</code>).</p>
    <table>
        <tr><th>Game</th><th>Players</th></tr>
        {rows}
    </table>
    <p><a href="/api/sessions">/api/sessions</a></p>
</body>
</html>"#,
        default_game = escape(&state.default_game),
    ))
}

/// List every hosted game with its player count.
///
/// # Route
///
/// `GET /api/sessions`
pub async fn list_sessions(State(state): State<Arc<AppState>>) -> Json<Vec<GameSummary>> {
    Json(state.registry.games())
}

/// Escape text for inclusion in HTML.
fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
