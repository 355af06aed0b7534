//! Market price updates for subscribed symbols.
//!
//! The server sends prices in two shapes: named `Bid`/`Ask`/`High`/`Low`
//! keys, or a positional `Rates: [bid, ask, high, low]` array. Both map to
//! the same presence-tracked [`PriceUpdate`].

pub mod client;

use crate::domain::mapper::{presence_entity, MappedEntity, WireRecord};
use crate::error::MappingError;
use chrono::{DateTime, Utc};
use serde_json::Value;

presence_entity! {
    /// A top-of-book quote for one symbol.
    pub struct PriceUpdate {
        "Updated" => updated / updated_present: DateTime<Utc>,
        "Symbol" => symbol / symbol_present: String,
        "Bid" => bid / bid_present: f64,
        "Ask" => ask / ask_present: f64,
        "High" => high / high_present: f64,
        "Low" => low / low_present: f64,
    }
}

const RATE_KEYS: [&str; 4] = ["Bid", "Ask", "High", "Low"];

impl PriceUpdate {
    /// Maps either price shape. Named keys win over `Rates` entries.
    pub fn from_price_record(record: &WireRecord) -> Result<Self, MappingError> {
        match record.get("Rates") {
            None | Some(Value::Null) => Self::from_record(record),
            Some(Value::Array(rates)) => {
                let mut expanded = record.clone();
                for (key, rate) in RATE_KEYS.iter().zip(rates) {
                    expanded.entry(key.to_string()).or_insert_with(|| rate.clone());
                }
                Self::from_record(&expanded)
            }
            Some(_) => Err(MappingError::Field {
                key: "Rates",
                reason: "expected array".into(),
            }),
        }
    }

    pub fn from_price_value(value: &Value) -> Result<Self, MappingError> {
        match value {
            Value::Object(record) => Self::from_price_record(record),
            _ => Err(MappingError::NotAnObject),
        }
    }

    /// Mid price, when both sides are present.
    pub fn mid(&self) -> Option<f64> {
        (self.bid_present && self.ask_present).then(|| (self.bid + self.ask) / 2.0)
    }
}
