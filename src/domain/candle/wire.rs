//! Wire types for the `/candles/{offerId}/{timeframe}` response.

use serde::Deserialize;
use serde_json::Value;

/// Each candle row is positional:
/// `[ts, bidOpen, bidClose, bidHigh, bidLow, askOpen, askClose, askHigh, askLow, tickQty]`
/// with `ts` in Unix seconds. The echoed `instrument_id` and `period_id`
/// are ignored; the server sends them as strings or numbers.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CandlesResponse {
    #[serde(default)]
    pub candles: Vec<Vec<Value>>,
}

pub(crate) const CANDLE_ROW_LEN: usize = 10;
