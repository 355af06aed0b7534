//! Offers table: one row per tradable instrument with its current quote.

use crate::domain::mapper::{presence_entity, value_date, FromWireValue};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Instrument category, wire-encoded as `1..=7`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InstrumentType {
    #[default]
    Forex,
    Indices,
    Commodity,
    Treasury,
    Bullion,
    Shares,
    FXIndex,
}

impl InstrumentType {
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            1 => Some(Self::Forex),
            2 => Some(Self::Indices),
            3 => Some(Self::Commodity),
            4 => Some(Self::Treasury),
            5 => Some(Self::Bullion),
            6 => Some(Self::Shares),
            7 => Some(Self::FXIndex),
            _ => None,
        }
    }
}

impl FromWireValue for InstrumentType {
    fn from_wire(value: &serde_json::Value) -> Result<Self, String> {
        let code = i64::from_wire(value)?;
        Self::from_code(code).ok_or_else(|| format!("unknown instrument type: {}", code))
    }
}

presence_entity! {
    pub struct Offer {
        "ratePrecision" => rate_precision / rate_precision_present: i32,
        "offerId" => offer_id / offer_id_present: i32,
        "rollB" => roll_b / roll_b_present: f64,
        "rollS" => roll_s / roll_s_present: f64,
        "fractionDigits" => fraction_digits / fraction_digits_present: i32,
        "pip" => pip / pip_present: f64,
        "defaultSortOrder" => default_sort_order / default_sort_order_present: i32,
        "Currency" => currency / currency_present: String,
        "instrumentType" => instrument_type / instrument_type_present: InstrumentType,
        "valueDate" (value_date) => value_date / value_date_present: DateTime<Utc>,
        "time" => time / time_present: DateTime<Utc>,
        "sell" => sell / sell_present: f64,
        "buy" => buy / buy_present: f64,
        "sellTradable" => sell_tradable / sell_tradable_present: bool,
        "buyTradable" => buy_tradable / buy_tradable_present: bool,
        "high" => high / high_present: f64,
        "low" => low / low_present: f64,
        "volume" => volume / volume_present: f64,
        "pipFraction" => pip_fraction / pip_fraction_present: f64,
        "spread" => spread / spread_present: f64,
        "mmr" => mmr / mmr_present: f64,
        "emr" => emr / emr_present: f64,
        "lmr" => lmr / lmr_present: f64,
        "pipCost" => pip_cost / pip_cost_present: f64,
    }
}
