//! The market: every commodity's price curve plus effect modifiers.
//!
//! A [`Market`] is constructed with the full, fixed commodity set and never
//! gains or loses an entry. Effect cards scale quoted prices through a
//! per-commodity modifier that accumulates multiplicatively.

use std::collections::BTreeMap;

use marketday_types::{CommodityTable, CommodityType};
use tracing::debug;

use crate::commodity::{Commodity, CommodityParams};
use crate::error::MarketError;

/// Outcome of a completed sale.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sale {
    /// The commodity sold.
    pub commodity: CommodityType,
    /// Number of units sold.
    pub quantity: u64,
    /// Price realized per unit, including the market modifier.
    pub unit_price: f64,
}

/// Pricing state for all commodities in one game.
#[derive(Debug, Clone, PartialEq)]
pub struct Market {
    commodities: BTreeMap<CommodityType, Commodity>,
    modifier: BTreeMap<CommodityType, f64>,
}

impl Default for Market {
    fn default() -> Self {
        Self::new(CommodityParams::default())
    }
}

impl Market {
    /// Create a market where every commodity starts from `params` with a
    /// neutral modifier of 1.0.
    pub fn new(params: CommodityParams) -> Self {
        Self {
            commodities: CommodityType::ALL
                .into_iter()
                .map(|c| (c, Commodity::new(params)))
                .collect(),
            modifier: CommodityType::ALL.into_iter().map(|c| (c, 1.0)).collect(),
        }
    }

    /// Look up a commodity's market state.
    pub fn commodity(&self, commodity: CommodityType) -> Option<&Commodity> {
        self.commodities.get(&commodity)
    }

    /// The accumulated price modifier for a commodity.
    pub fn modifier(&self, commodity: CommodityType) -> f64 {
        self.modifier.get(&commodity).copied().unwrap_or(1.0)
    }

    /// Multiply each commodity's modifier by the matching factor.
    ///
    /// Commodities missing from `factors` keep their current modifier.
    pub fn apply_modifier(&mut self, factors: &CommodityTable) {
        for (commodity, modifier) in &mut self.modifier {
            if let Some(factor) = factors.get(commodity) {
                *modifier *= factor;
            }
        }
    }

    /// Current unit price of every commodity, including modifiers.
    pub fn prices(&self) -> CommodityTable {
        self.commodities
            .iter()
            .map(|(&kind, c)| (kind, self.modifier(kind) * c.price()))
            .collect()
    }

    /// Sell `quantity` units of the commodity named `commodity`.
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::UnknownCommodity`] if the name is not a
    /// traded commodity and [`MarketError::ZeroQuantity`] for an empty
    /// sale. The market is left untouched in both cases.
    pub fn sell(&mut self, commodity: &str, quantity: u64) -> Result<Sale, MarketError> {
        let kind: CommodityType = commodity.parse()?;
        if quantity == 0 {
            return Err(MarketError::ZeroQuantity {
                commodity: commodity.to_owned(),
            });
        }
        let modifier = self.modifier(kind);
        let entry = self
            .commodities
            .get_mut(&kind)
            .ok_or_else(|| MarketError::UnknownCommodity {
                name: commodity.to_owned(),
            })?;

        let unit_price = modifier * entry.sell(quantity);
        debug!(
            commodity = %kind,
            quantity,
            unit_price,
            supply = entry.supply(),
            "Sale executed"
        );

        Ok(Sale {
            commodity: kind,
            quantity,
            unit_price,
        })
    }
}
