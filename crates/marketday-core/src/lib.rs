//! Session engine for Marketday.
//!
//! A game session moves its players through a repeating cycle of phases:
//!
//! ```text
//! Waiting -> Production -> Auction -> Trade -> Production -> ...
//! ```
//!
//! All state of one game lives in a [`Session`], owned by a single
//! [`Dispatcher`] task that applies events one at a time. Players and the
//! clock only ever enqueue events through a [`SessionHandle`]; nothing
//! outside the dispatcher mutates a session.
//!
//! # Modules
//!
//! - [`clock`] -- Logical session time and the single pending deadline
//! - [`config`] -- YAML configuration and the resolved [`SessionRules`]
//! - [`dispatch`] -- The event queue and its consumer
//! - [`phase`] -- The phase state machine and one controller per phase
//! - [`player`] -- The [`Player`] and [`Broadcaster`] transport seams
//! - [`runner`] -- Spawning a session with its clock on the tokio runtime
//! - [`session`] -- The [`Session`] itself

pub mod clock;
pub mod config;
pub mod dispatch;
pub mod phase;
pub mod player;
pub mod runner;
pub mod session;

#[cfg(test)]
mod testing;

pub use clock::SessionClock;
pub use config::{ConfigError, GameConfig, SessionRules};
pub use dispatch::{DispatchError, Dispatcher, Event, SessionHandle};
pub use phase::PhaseController;
pub use player::{deliver_all, Broadcaster, DeliveryError, Player, PlayerHandle};
pub use runner::{run_clock, spawn_session, RunningSession};
pub use session::Session;
