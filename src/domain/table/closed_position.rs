//! Closed positions table.

use crate::domain::mapper::{compact_time, presence_entity, value_date};
use chrono::{DateTime, Utc};

presence_entity! {
    pub struct ClosedPosition {
        "ratePrecision" => rate_precision / rate_precision_present: i32,
        "tradeId" => trade_id / trade_id_present: String,
        "accountName" => account_name / account_name_present: String,
        "roll" => roll / roll_present: f64,
        "com" => com / com_present: f64,
        "open" => open / open_present: f64,
        "valueDate" (value_date) => value_date / value_date_present: DateTime<Utc>,
        "grossPL" => gross_pl / gross_pl_present: f64,
        "close" => close / close_present: f64,
        "visiblePL" => visible_pl / visible_pl_present: f64,
        "currency" => currency / currency_present: String,
        "isBuy" => is_buy / is_buy_present: bool,
        "amountK" => amount_k / amount_k_present: i32,
        "currencyPoint" => currency_point / currency_point_present: f64,
        "openTime" (compact_time) => open_time / open_time_present: DateTime<Utc>,
        "closeTime" (compact_time) => close_time / close_time_present: DateTime<Utc>,
        "isTotal" => is_total / is_total_present: bool,
    }
}
