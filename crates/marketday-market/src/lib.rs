//! Commodity pricing engine for Marketday.
//!
//! Every commodity a player can produce is bought by the market at a price
//! that falls as the market's supply grows. The engine is pure: it holds no
//! locks and performs no I/O, and is driven synchronously by the session
//! that owns it.
//!
//! # Modules
//!
//! - [`commodity`] -- The [`Commodity`] price curve and sale arithmetic.
//! - [`market`] -- The [`Market`]: all commodities plus effect modifiers.
//! - [`error`] -- [`MarketError`] for rejected sales.
//!
//! # Usage
//!
//! ```
//! use marketday_market::{CommodityParams, Market};
//! use marketday_types::CommodityType;
//!
//! let mut market = Market::new(CommodityParams::default());
//! let before = market.prices()[&CommodityType::Corn];
//!
//! let sale = market.sell("corn", 10).ok();
//! let after = market.prices()[&CommodityType::Corn];
//!
//! assert!(sale.is_some_and(|s| s.unit_price < before && s.unit_price > after));
//! ```

pub mod commodity;
pub mod error;
pub mod market;

// Re-export primary types at crate root.
pub use commodity::{Commodity, CommodityParams};
pub use error::MarketError;
pub use market::{Market, Sale};
