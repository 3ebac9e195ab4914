//! A single commodity and its price curve.
//!
//! The price of a commodity decays smoothly with the amount the market is
//! already holding:
//!
//! ```text
//! price = value * 2^(-supply / demand)
//! ```
//!
//! so the price halves every time supply grows by one `demand` unit and
//! approaches `value` as supply drops to zero.

use serde::{Deserialize, Serialize};

/// Starting parameters for a commodity.
///
/// Deserializable so that the session configuration can override the
/// defaults for every commodity in a market.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CommodityParams {
    /// Units the market holds at the start of a game.
    #[serde(default = "default_supply")]
    pub supply: u64,
    /// Price of a unit when supply is zero.
    #[serde(default = "default_value")]
    pub value: f64,
    /// Supply level at which the price is half of `value`.
    #[serde(default = "default_demand")]
    pub demand: f64,
}

impl Default for CommodityParams {
    fn default() -> Self {
        Self {
            supply: default_supply(),
            value: default_value(),
            demand: default_demand(),
        }
    }
}

const fn default_supply() -> u64 {
    100
}

const fn default_value() -> f64 {
    100.0
}

const fn default_demand() -> f64 {
    100.0
}

/// Market state for one commodity.
#[derive(Debug, Clone, PartialEq)]
pub struct Commodity {
    supply: u64,
    // Price of a unit at zero supply.
    value: f64,
    // Supply level at which the price is half of `value`.
    demand: f64,
}

impl Commodity {
    /// Create a commodity from its starting parameters.
    pub const fn new(params: CommodityParams) -> Self {
        Self {
            supply: params.supply,
            value: params.value,
            demand: params.demand,
        }
    }

    /// Units currently held by the market.
    pub const fn supply(&self) -> u64 {
        self.supply
    }

    /// Current market price for a single unit.
    pub fn price(&self) -> f64 {
        price_at(self.supply, self.value, self.demand)
    }

    /// Sell `quantity` units and return the unit price realized.
    ///
    /// The unit price is the mean of the price before the sale and the
    /// price with `quantity - 1` extra units on the market, which slightly
    /// favors selling in bulk. Supply then settles one unit above that
    /// tentative level, so every sale leaves the commodity cheaper than the
    /// unit price the seller received.
    ///
    /// Callers must pass a `quantity` of at least one.
    pub fn sell(&mut self, quantity: u64) -> f64 {
        let initial = self.price();
        self.supply = self.supply.saturating_add(quantity.saturating_sub(1));
        let last = self.price();
        self.supply = self.supply.saturating_add(1);
        (initial + last) / 2.0
    }
}

/// Evaluate the price curve at a given supply.
#[allow(clippy::cast_precision_loss)] // supply never approaches 2^52
fn price_at(supply: u64, value: f64, demand: f64) -> f64 {
    value * (-(supply as f64) / demand).exp2()
}
