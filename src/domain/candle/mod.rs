//! Historical OHLC candles, bid and ask sides.

pub mod client;
pub mod convert;
pub mod wire;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Fewest and most candles one request may ask for.
pub const MIN_CANDLES: u32 = 1;
pub const MAX_CANDLES: u32 = 10_000;

/// One bar. Only produced from historical-data responses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    pub timestamp: DateTime<Utc>,
    pub bid_open: f64,
    pub bid_close: f64,
    pub bid_high: f64,
    pub bid_low: f64,
    pub ask_open: f64,
    pub ask_close: f64,
    pub ask_high: f64,
    pub ask_low: f64,
    pub tick_qty: i64,
}

impl Candle {
    pub fn mid_close(&self) -> f64 {
        (self.bid_close + self.ask_close) / 2.0
    }
}
