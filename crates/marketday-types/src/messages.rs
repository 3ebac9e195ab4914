//! Messages exchanged between players and a session.
//!
//! Every message is a JSON object carrying an `action` string that names
//! the message, plus the message's own fields. [`ClientMessage`] covers
//! what players send; [`ServerMessage`] covers what the session sends back,
//! either to one player or to everyone in the game.
//!
//! | Action | Direction | Fields |
//! |---|---|---|
//! | `join` / `leave` / `ready` | client | -- |
//! | `set_name` | client | `name` |
//! | `bid` | client | `amount` |
//! | `trade` | client | `materials` |
//! | `sell` | client | `type`, `quantity` |
//! | `apply_effect` | client | `price_modifier`, `yield_rate_modifier` |
//! | `game_state_changed` | all | `new_state` |
//! | `welcome` | joiner | `game`, `state` |
//! | `set_clock` | all | `duration_ms` |
//! | `auction_seed` | all | `seed` |
//! | `bid_updated` | all | `bid`, `winner` |
//! | `auction_won` | winner | -- |
//! | `price_updated` | all | `prices` |
//! | `sale_completed` | seller | `quantity`, `type`, `unit_price` |
//! | `trade_completed` | trade pair | `materials` |
//! | `effect` | all / joiner | `yield_rates` |

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::{CommodityType, Phase};

/// Per-commodity multiplier or price table.
pub type CommodityTable = BTreeMap<CommodityType, f64>;

/// A message sent by a player to the session they are connected to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(tag = "action", rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum ClientMessage {
    /// The player entered the game. Also synthesized by the transport when
    /// a connection opens.
    Join,
    /// The player left the game. Also synthesized by the transport when a
    /// connection closes.
    Leave,
    /// The player is ready for the game to start.
    Ready,
    /// Change the player's display name.
    SetName {
        /// The new display name.
        name: String,
    },
    /// Bid on the card currently being auctioned.
    Bid {
        /// Amount offered. Must beat the current high bid to count.
        amount: u64,
    },
    /// Offer materials to whichever player trades next.
    Trade {
        /// Opaque description of the offered materials.
        materials: String,
    },
    /// Sell goods to the market.
    Sell {
        /// Wire name of the commodity. Kept as a string so that an unknown
        /// commodity reaches the session and is rejected there.
        #[serde(rename = "type")]
        commodity: String,
        /// Number of units sold.
        quantity: u64,
    },
    /// Apply a game effect card to market prices and production yields.
    ApplyEffect {
        /// Factor applied to each commodity's market price.
        #[serde(default)]
        price_modifier: CommodityTable,
        /// Factor applied to each commodity's production yield.
        #[serde(default)]
        yield_rate_modifier: CommodityTable,
    },
}

impl ClientMessage {
    /// Decode a JSON message received from a player.
    ///
    /// # Errors
    ///
    /// Returns the [`serde_json::Error`] if the payload is not JSON, has no
    /// known `action`, or is missing a field required by that action.
    pub fn decode(data: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(data)
    }

    /// The `action` tag of this message, for logging.
    pub const fn action(&self) -> &'static str {
        match self {
            Self::Join => "join",
            Self::Leave => "leave",
            Self::Ready => "ready",
            Self::SetName { .. } => "set_name",
            Self::Bid { .. } => "bid",
            Self::Trade { .. } => "trade",
            Self::Sell { .. } => "sell",
            Self::ApplyEffect { .. } => "apply_effect",
        }
    }
}

/// A message sent by a session to one or all of its players.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(tag = "action", rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum ServerMessage {
    /// The session moved to a new phase.
    #[serde(rename = "game_state_changed")]
    StateChanged {
        /// The phase that just began.
        new_state: Phase,
    },
    /// Greeting sent to a player who just joined.
    Welcome {
        /// Name of the game the player joined.
        game: String,
        /// The phase the game is currently in.
        state: Phase,
    },
    /// Restart the client-side countdown.
    SetClock {
        /// Length of the countdown in milliseconds.
        duration_ms: u64,
    },
    /// A new card is up for auction. Clients derive the card from the seed.
    AuctionSeed {
        /// Seed the card is generated from.
        seed: u32,
    },
    /// A new high bid was accepted.
    BidUpdated {
        /// The new high bid.
        bid: u64,
        /// Display name of the high bidder.
        winner: String,
    },
    /// The recipient won the card that was just auctioned.
    AuctionWon,
    /// Current market prices for every commodity.
    PriceUpdated {
        /// Unit price per commodity, including market modifiers.
        prices: CommodityTable,
    },
    /// Confirmation of a sale to the market.
    SaleCompleted {
        /// Number of units sold.
        quantity: u64,
        /// The commodity sold.
        #[serde(rename = "type")]
        commodity: CommodityType,
        /// Price realized for each unit.
        unit_price: f64,
    },
    /// A trade was matched; the recipient receives these materials.
    TradeCompleted {
        /// Materials offered by the counterpart.
        materials: String,
    },
    /// Current production yield multipliers.
    Effect {
        /// Yield multiplier per commodity.
        yield_rates: CommodityTable,
    },
}

impl ServerMessage {
    /// Encode this message as a JSON string.
    ///
    /// # Errors
    ///
    /// Returns the [`serde_json::Error`] if serialization fails, which can
    /// only happen for non-finite floating point values.
    pub fn encode(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn decodes_trade() {
        let msg = ClientMessage::decode(br#"{"action": "trade", "materials": "a hammer"}"#).unwrap();
        assert_eq!(
            msg,
            ClientMessage::Trade {
                materials: String::from("a hammer")
            }
        );
    }

    #[test]
    fn decodes_bid() {
        let msg = ClientMessage::decode(br#"{"action": "bid", "amount": 12}"#).unwrap();
        assert_eq!(msg, ClientMessage::Bid { amount: 12 });
    }

    #[test]
    fn decodes_sell_with_type_field() {
        let msg =
            ClientMessage::decode(br#"{"action": "sell", "type": "corn", "quantity": 3}"#).unwrap();
        assert_eq!(
            msg,
            ClientMessage::Sell {
                commodity: String::from("corn"),
                quantity: 3
            }
        );
    }

    #[test]
    fn sell_keeps_unknown_commodity_for_the_session() {
        let msg =
            ClientMessage::decode(br#"{"action": "sell", "type": "durian", "quantity": 1}"#)
                .unwrap();
        assert_eq!(msg.action(), "sell");
    }

    #[test]
    fn apply_effect_tables_default_to_empty() {
        let msg = ClientMessage::decode(br#"{"action": "apply_effect"}"#).unwrap();
        assert_eq!(
            msg,
            ClientMessage::ApplyEffect {
                price_modifier: CommodityTable::new(),
                yield_rate_modifier: CommodityTable::new(),
            }
        );
    }

    #[test]
    fn rejects_unknown_action() {
        assert!(ClientMessage::decode(br#"{"action": "teleport"}"#).is_err());
        assert!(ClientMessage::decode(b"not json").is_err());
        assert!(ClientMessage::decode(br#"{"action": "bid"}"#).is_err());
    }

    #[test]
    fn server_messages_use_wire_action_names() {
        let json = ServerMessage::StateChanged {
            new_state: Phase::Trade,
        }
        .encode()
        .unwrap();
        assert_eq!(json, r#"{"action":"game_state_changed","new_state":"trade"}"#);

        let json = ServerMessage::AuctionWon.encode().unwrap();
        assert_eq!(json, r#"{"action":"auction_won"}"#);

        let json = ServerMessage::SaleCompleted {
            quantity: 1,
            commodity: CommodityType::Tomato,
            unit_price: 50.0,
        }
        .encode()
        .unwrap();
        assert_eq!(
            json,
            r#"{"action":"sale_completed","quantity":1,"type":"tomato","unit_price":50.0}"#
        );
    }

    #[test]
    fn price_table_keys_are_commodity_names() {
        let mut prices = CommodityTable::new();
        prices.insert(CommodityType::Corn, 25.0);
        let json = ServerMessage::PriceUpdated { prices }.encode().unwrap();
        assert_eq!(json, r#"{"action":"price_updated","prices":{"corn":25.0}}"#);
    }
}
