//! Enumeration types for Marketday.
//!
//! Both enums serialize as lowercase strings, which is the form clients
//! use in the `type` and `new_state` fields of the wire messages.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

// ---------------------------------------------------------------------------
// Commodities
// ---------------------------------------------------------------------------

/// A commodity that players produce and sell on the market.
///
/// The commodity set is fixed: every market is constructed with exactly
/// these four entries and never gains or loses one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export, export_to = "bindings/")]
pub enum CommodityType {
    /// Tomatoes.
    Tomato,
    /// Blueberries.
    Blueberry,
    /// Corn.
    Corn,
    /// The purple crop.
    Purple,
}

impl CommodityType {
    /// Every commodity, in canonical order.
    pub const ALL: [Self; 4] = [Self::Tomato, Self::Blueberry, Self::Corn, Self::Purple];

    /// The lowercase wire name of this commodity.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Tomato => "tomato",
            Self::Blueberry => "blueberry",
            Self::Corn => "corn",
            Self::Purple => "purple",
        }
    }
}

impl fmt::Display for CommodityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string does not name a known commodity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownCommodity(pub String);

impl fmt::Display for UnknownCommodity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown commodity type: {:?}", self.0)
    }
}

impl std::error::Error for UnknownCommodity {}

impl FromStr for CommodityType {
    type Err = UnknownCommodity;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| UnknownCommodity(s.to_owned()))
    }
}

// ---------------------------------------------------------------------------
// Phases
// ---------------------------------------------------------------------------

/// The mode a session is operating in.
///
/// Sessions start in [`Phase::Waiting`] and, once enough players are
/// ready, cycle Production -> Auction -> Trade -> Production forever.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export, export_to = "bindings/")]
pub enum Phase {
    /// Lobby: players join and declare themselves ready.
    Waiting,
    /// Players produce goods until the production clock runs out.
    Production,
    /// A fixed number of cards are auctioned one after another.
    Auction,
    /// Players trade with each other and sell to the market.
    Trade,
}

impl Phase {
    /// The lowercase wire name of this phase.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Waiting => "waiting",
            Self::Production => "production",
            Self::Auction => "auction",
            Self::Trade => "trade",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn commodity_parses_from_wire_name() {
        for c in CommodityType::ALL {
            assert_eq!(c.as_str().parse::<CommodityType>().unwrap(), c);
        }
    }

    #[test]
    fn unknown_commodity_is_rejected() {
        let err = "durian".parse::<CommodityType>().unwrap_err();
        assert_eq!(err, UnknownCommodity(String::from("durian")));
    }

    #[test]
    fn serde_names_match_display() {
        let json = serde_json::to_string(&CommodityType::Blueberry).unwrap();
        assert_eq!(json, "\"blueberry\"");
        let json = serde_json::to_string(&Phase::Production).unwrap();
        assert_eq!(json, format!("\"{}\"", Phase::Production));
    }
}
