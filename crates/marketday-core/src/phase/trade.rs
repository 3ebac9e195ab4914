//! The trading phase.
//!
//! Players swap materials with each other through a single rendezvous slot
//! and sell goods to the market. Trades are blind: a player offers
//! materials without naming a partner, and is matched with whichever other
//! player offers next within the offer window.

use std::time::Duration;

use marketday_types::{ClientMessage, Phase, ServerMessage};
use tracing::{debug, info, warn};

use crate::player::PlayerHandle;
use crate::session::{duration_ms, SessionContext};

/// An offer waiting in the rendezvous slot.
#[derive(Debug, Clone)]
pub struct StagedOffer {
    /// The player who made the offer.
    pub player: PlayerHandle,
    /// What they offered.
    pub materials: String,
    /// Session time the offer was staged at.
    pub staged_at: Duration,
}

/// Trading state: the phase length, the offer window, and the slot.
#[derive(Debug)]
pub struct Trade {
    stage: Duration,
    offer_window: Duration,
    staged: Option<StagedOffer>,
}

impl Trade {
    /// Create a trading phase lasting `stage` whose offers stay matchable
    /// for `offer_window`.
    pub const fn new(stage: Duration, offer_window: Duration) -> Self {
        Self {
            stage,
            offer_window,
            staged: None,
        }
    }

    /// The offer currently waiting for a partner.
    pub const fn staged(&self) -> Option<&StagedOffer> {
        self.staged.as_ref()
    }

    pub(crate) fn begin(&self, ctx: &mut SessionContext) {
        ctx.broadcast(&ServerMessage::PriceUpdated {
            prices: ctx.market().prices(),
        });
        ctx.set_timeout(self.stage);
        ctx.broadcast(&ServerMessage::SetClock {
            duration_ms: duration_ms(self.stage),
        });
    }

    pub(crate) fn end(&mut self) {
        if let Some(offer) = self.staged.take() {
            debug!(player = %offer.player.id(), "Unmatched offer dropped at end of trading");
        }
    }

    /// Trading closes back into production.
    pub(crate) const fn timer() -> Phase {
        Phase::Production
    }

    pub(crate) fn receive(&mut self, ctx: &mut SessionContext, player: &PlayerHandle, message: &ClientMessage) {
        match message {
            ClientMessage::Trade { materials } => self.offer(ctx, player, materials),
            ClientMessage::Sell { commodity, quantity } => Self::sell(ctx, player, commodity, *quantity),
            _ => {}
        }
    }

    fn offer(&mut self, ctx: &SessionContext, player: &PlayerHandle, materials: &str) {
        let now = ctx.now();
        if let Some(staged) = self.staged.take() {
            let fresh = now.saturating_sub(staged.staged_at) < self.offer_window;
            if fresh && staged.player.id() != player.id() {
                info!(
                    from = %staged.player.id(),
                    to = %player.id(),
                    "Trade matched"
                );
                ctx.unicast(
                    player,
                    &ServerMessage::TradeCompleted {
                        materials: staged.materials,
                    },
                );
                ctx.unicast(
                    &staged.player,
                    &ServerMessage::TradeCompleted {
                        materials: materials.to_owned(),
                    },
                );
                return;
            }
            if !fresh {
                debug!(player = %staged.player.id(), "Stale offer dropped");
            }
        }

        self.staged = Some(StagedOffer {
            player: PlayerHandle::clone(player),
            materials: materials.to_owned(),
            staged_at: now,
        });
    }

    fn sell(ctx: &mut SessionContext, player: &PlayerHandle, commodity: &str, quantity: u64) {
        match ctx.market_mut().sell(commodity, quantity) {
            Ok(sale) => {
                ctx.unicast(
                    player,
                    &ServerMessage::SaleCompleted {
                        quantity: sale.quantity,
                        commodity: sale.commodity,
                        unit_price: sale.unit_price,
                    },
                );
                ctx.broadcast(&ServerMessage::PriceUpdated {
                    prices: ctx.market().prices(),
                });
            }
            Err(e) => {
                warn!(player = %player.id(), error = %e, "Sale rejected");
            }
        }
    }
}
