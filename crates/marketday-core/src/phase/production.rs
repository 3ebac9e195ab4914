//! The production phase: a fixed-length countdown while players grow goods.

use std::time::Duration;

use marketday_types::{Phase, ServerMessage};

use crate::session::{duration_ms, SessionContext};

/// Countdown state for the production phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Production {
    duration: Duration,
}

impl Production {
    /// Create a production phase lasting `duration`.
    pub const fn new(duration: Duration) -> Self {
        Self { duration }
    }

    pub(crate) fn begin(&self, ctx: &mut SessionContext) {
        ctx.broadcast(&ServerMessage::SetClock {
            duration_ms: duration_ms(self.duration),
        });
        ctx.set_timeout(self.duration);
    }

    /// Production always hands over to the auction.
    pub(crate) const fn timer() -> Phase {
        Phase::Auction
    }
}
