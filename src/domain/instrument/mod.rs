//! Tradable instrument catalogue.

pub mod client;
pub mod wire;

use serde::{Deserialize, Serialize};

/// A symbol the account may trade, and whether it shows in the Offers table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instrument {
    pub symbol: String,
    pub visible: bool,
    pub order: i32,
}

impl From<wire::InstrumentRow> for Instrument {
    fn from(row: wire::InstrumentRow) -> Self {
        Self {
            symbol: row.symbol,
            visible: row.visible,
            order: row.order,
        }
    }
}
