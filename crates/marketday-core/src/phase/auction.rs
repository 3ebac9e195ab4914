//! The auction phase.
//!
//! A fixed number of cards is auctioned one after another. Each card is
//! announced by a seed clients derive the card from, and stays open for
//! the bid window. Every accepted bid restarts the window, so a card only
//! closes once nobody has outbid the leader for a full window.
//!
//! # Rules
//!
//! - A bid counts only if it is strictly greater than the current bid.
//!   Equal bids never displace the leader.
//! - When a card closes, its winner (if any) is told privately.
//! - A card with no bids still uses up its round.

use std::time::Duration;

use marketday_types::{ClientMessage, Phase, PlayerId, ServerMessage};
use tracing::{debug, info};

use crate::player::PlayerHandle;
use crate::session::{duration_ms, SessionContext};

/// Bidding state for the auction phase.
#[derive(Debug)]
pub struct Auction {
    rounds: u32,
    round: u32,
    bid_window: Duration,
    bid: u64,
    winner: Option<PlayerHandle>,
}

impl Auction {
    /// Create an auction of `rounds` cards, each open for `bid_window`
    /// after the most recent accepted bid.
    pub const fn new(rounds: u32, bid_window: Duration) -> Self {
        Self {
            rounds,
            round: 0,
            bid_window,
            bid: 0,
            winner: None,
        }
    }

    /// The current high bid on the open card. Zero when nobody has bid.
    pub const fn bid(&self) -> u64 {
        self.bid
    }

    /// The player holding the current high bid.
    pub fn winner_id(&self) -> Option<PlayerId> {
        self.winner.as_ref().map(|w| w.id())
    }

    /// Number of cards already closed.
    pub const fn round(&self) -> u32 {
        self.round
    }

    /// Total cards in this auction.
    pub const fn rounds(&self) -> u32 {
        self.rounds
    }

    pub(crate) fn begin(&self, ctx: &mut SessionContext) {
        self.issue_card(ctx);
    }

    pub(crate) fn end(&mut self) {
        if let Some(leader) = self.winner.take() {
            debug!(player = %leader.id(), bid = self.bid, "Auction ended with an open card");
        }
    }

    pub(crate) fn receive(&mut self, ctx: &mut SessionContext, player: &PlayerHandle, message: &ClientMessage) {
        let ClientMessage::Bid { amount } = *message else {
            return;
        };
        if amount <= self.bid {
            debug!(player = %player.id(), amount, bid = self.bid, "Bid too low");
            return;
        }

        self.bid = amount;
        self.winner = Some(PlayerHandle::clone(player));
        ctx.set_timeout(self.bid_window);
        ctx.broadcast(&ServerMessage::BidUpdated {
            bid: amount,
            winner: player.name(),
        });
    }

    /// Close the open card. Returns [`Phase::Trade`] once every card is
    /// sold, otherwise puts the next card up.
    pub(crate) fn timer(&mut self, ctx: &mut SessionContext) -> Option<Phase> {
        if let Some(winner) = self.winner.take() {
            info!(player = %winner.id(), bid = self.bid, round = self.round, "Card won");
            ctx.unicast(&winner, &ServerMessage::AuctionWon);
        }
        self.bid = 0;
        self.round = self.round.saturating_add(1);

        if self.round >= self.rounds {
            Some(Phase::Trade)
        } else {
            self.issue_card(ctx);
            None
        }
    }

    fn issue_card(&self, ctx: &mut SessionContext) {
        let seed = ctx.next_seed();
        debug!(seed, round = self.round, "Issuing card");
        ctx.broadcast(&ServerMessage::AuctionSeed { seed });
        ctx.set_timeout(self.bid_window);
        ctx.broadcast(&ServerMessage::SetClock {
            duration_ms: duration_ms(self.bid_window),
        });
    }
}
