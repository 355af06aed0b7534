//! Conversions from positional candle rows to [`Candle`].

use super::wire::{CandlesResponse, CANDLE_ROW_LEN};
use super::Candle;
use crate::domain::mapper::FromWireValue;
use crate::error::MappingError;
use crate::shared::serde_util;
use serde_json::Value;

const COLUMNS: [&str; CANDLE_ROW_LEN] = [
    "timestamp", "bidOpen", "bidClose", "bidHigh", "bidLow", "askOpen", "askClose", "askHigh",
    "askLow", "tickQty",
];

fn column<T: FromWireValue>(row: &[Value], index: usize) -> Result<T, MappingError> {
    T::from_wire(&row[index]).map_err(|reason| MappingError::Field {
        key: COLUMNS[index],
        reason,
    })
}

impl TryFrom<&[Value]> for Candle {
    type Error = MappingError;

    fn try_from(row: &[Value]) -> Result<Self, Self::Error> {
        if row.len() < CANDLE_ROW_LEN {
            return Err(MappingError::Payload(format!(
                "candle row has {} columns, expected {}",
                row.len(),
                CANDLE_ROW_LEN
            )));
        }

        let secs: i64 = column(row, 0)?;
        Ok(Self {
            timestamp: serde_util::from_epoch_secs(secs)
                .map_err(|reason| MappingError::Field { key: COLUMNS[0], reason })?,
            bid_open: column(row, 1)?,
            bid_close: column(row, 2)?,
            bid_high: column(row, 3)?,
            bid_low: column(row, 4)?,
            ask_open: column(row, 5)?,
            ask_close: column(row, 6)?,
            ask_high: column(row, 7)?,
            ask_low: column(row, 8)?,
            tick_qty: column(row, 9)?,
        })
    }
}

impl CandlesResponse {
    /// Converts rows in delivery order. Short rows are skipped.
    pub fn into_candles(self) -> Result<Vec<Candle>, MappingError> {
        self.candles
            .iter()
            .filter(|row| row.len() >= CANDLE_ROW_LEN)
            .map(|row| Candle::try_from(row.as_slice()))
            .collect()
    }
}
