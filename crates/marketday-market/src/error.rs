//! Error types for the `marketday-market` crate.

use marketday_types::UnknownCommodity;

/// Errors that can occur when trading with the market.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MarketError {
    /// The sale named a commodity the market does not trade.
    #[error("invalid commodity type: {name:?}")]
    UnknownCommodity {
        /// The name as received from the player.
        name: String,
    },

    /// A sale must move at least one unit.
    #[error("cannot sell zero units of {commodity}")]
    ZeroQuantity {
        /// The commodity named in the sale.
        commodity: String,
    },
}

impl From<UnknownCommodity> for MarketError {
    fn from(err: UnknownCommodity) -> Self {
        Self::UnknownCommodity { name: err.0 }
    }
}
