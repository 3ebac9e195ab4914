//! Shared type definitions for Marketday.
//!
//! This crate is the single source of truth for the types that cross the
//! boundary between players and a game session. Types defined here flow
//! downstream to `TypeScript` via `ts-rs` for the browser client.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe UUID wrappers for players and sessions
//! - [`enums`] -- Commodity and phase enumerations
//! - [`messages`] -- The client and server message taxonomy

pub mod enums;
pub mod ids;
pub mod messages;

// Re-export all public types at crate root for convenience.
pub use enums::{CommodityType, Phase, UnknownCommodity};
pub use ids::{PlayerId, SessionId};
pub use messages::{ClientMessage, CommodityTable, ServerMessage};

#[cfg(test)]
mod tests {
    //! `TypeScript` binding generation for the browser client.

    #[test]
    fn export_bindings() {
        // ts-rs writes the bindings when `export_all` is called. The files
        // land in the `bindings/` directory relative to the crate root.
        use ts_rs::TS;

        let _ = crate::ids::PlayerId::export_all();
        let _ = crate::ids::SessionId::export_all();

        let _ = crate::enums::CommodityType::export_all();
        let _ = crate::enums::Phase::export_all();

        let _ = crate::messages::ClientMessage::export_all();
        let _ = crate::messages::ServerMessage::export_all();
    }
}
