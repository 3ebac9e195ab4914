//! The phase state machine.
//!
//! A session is always in exactly one [`Phase`], driven by the matching
//! controller held in a [`PhaseController`]. Every controller answers the
//! same four hooks:
//!
//! - `begin` runs once when the phase is installed.
//! - `end` runs once just before the phase is replaced.
//! - `timer` runs when the session deadline fires.
//! - `receive` runs for every player message the session forwards.
//!
//! `timer` and `receive` return the phase to move to, if any. The session
//! performs the transition after the hook returns, so a controller never
//! replaces itself while it is still borrowed.
//!
//! ```text
//! Waiting ──all ready──▶ Production ──timeout──▶ Auction ──rounds done──▶ Trade
//!                             ▲                                            │
//!                             └───────────────────timeout──────────────────┘
//! ```

pub mod auction;
pub mod production;
pub mod trade;
pub mod waiting;

use marketday_types::{ClientMessage, Phase};

use crate::config::SessionRules;
use crate::player::PlayerHandle;
use crate::session::SessionContext;

pub use auction::Auction;
pub use production::Production;
pub use trade::{StagedOffer, Trade};
pub use waiting::Waiting;

/// The controller for the session's current phase.
#[derive(Debug)]
pub enum PhaseController {
    /// Lobby: waiting for enough players to be ready.
    Waiting(Waiting),
    /// Players produce goods until the timer runs out.
    Production(Production),
    /// Cards are auctioned one at a time.
    Auction(Auction),
    /// Players trade with each other and sell to the market.
    Trade(Trade),
}

impl PhaseController {
    /// Construct a fresh controller for `phase`.
    pub fn new(phase: Phase, rules: &SessionRules) -> Self {
        match phase {
            Phase::Waiting => Self::Waiting(Waiting::new(rules.min_players)),
            Phase::Production => Self::Production(Production::new(rules.production)),
            Phase::Auction => Self::Auction(Auction::new(rules.auction_rounds, rules.auction_bid)),
            Phase::Trade => Self::Trade(Trade::new(rules.trading_stage, rules.trade_offer)),
        }
    }

    /// The phase this controller drives.
    pub const fn kind(&self) -> Phase {
        match self {
            Self::Waiting(_) => Phase::Waiting,
            Self::Production(_) => Phase::Production,
            Self::Auction(_) => Phase::Auction,
            Self::Trade(_) => Phase::Trade,
        }
    }

    /// The lobby controller, if the session is waiting.
    pub const fn as_waiting(&self) -> Option<&Waiting> {
        match self {
            Self::Waiting(w) => Some(w),
            _ => None,
        }
    }

    /// The auction controller, if an auction is running.
    pub const fn as_auction(&self) -> Option<&Auction> {
        match self {
            Self::Auction(a) => Some(a),
            _ => None,
        }
    }

    /// The trade controller, if trading is open.
    pub const fn as_trade(&self) -> Option<&Trade> {
        match self {
            Self::Trade(t) => Some(t),
            _ => None,
        }
    }

    pub(crate) fn begin(&mut self, ctx: &mut SessionContext) {
        match self {
            Self::Waiting(_) => {}
            Self::Production(p) => p.begin(ctx),
            Self::Auction(a) => a.begin(ctx),
            Self::Trade(t) => t.begin(ctx),
        }
    }

    pub(crate) fn end(&mut self) {
        match self {
            Self::Waiting(_) | Self::Production(_) => {}
            Self::Auction(a) => a.end(),
            Self::Trade(t) => t.end(),
        }
    }

    pub(crate) fn timer(&mut self, ctx: &mut SessionContext) -> Option<Phase> {
        match self {
            Self::Waiting(_) => None,
            Self::Production(_) => Some(Production::timer()),
            Self::Auction(a) => a.timer(ctx),
            Self::Trade(_) => Some(Trade::timer()),
        }
    }

    pub(crate) fn receive(
        &mut self,
        ctx: &mut SessionContext,
        player: &PlayerHandle,
        message: &ClientMessage,
    ) -> Option<Phase> {
        match self {
            Self::Waiting(w) => w.receive(player, message),
            Self::Production(_) => None,
            Self::Auction(a) => {
                a.receive(ctx, player, message);
                None
            }
            Self::Trade(t) => {
                t.receive(ctx, player, message);
                None
            }
        }
    }
}
