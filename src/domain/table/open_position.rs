//! Open positions table.

use crate::domain::mapper::{compact_time, presence_entity, value_date};
use chrono::{DateTime, Utc};

presence_entity! {
    pub struct OpenPosition {
        "ratePrecision" => rate_precision / rate_precision_present: i32,
        "tradeId" => trade_id / trade_id_present: String,
        "accountName" => account_name / account_name_present: String,
        "accountId" => account_id / account_id_present: String,
        "roll" => roll / roll_present: f64,
        "com" => com / com_present: f64,
        "open" => open / open_present: f64,
        "valueDate" (value_date) => value_date / value_date_present: DateTime<Utc>,
        "grossPL" => gross_pl / gross_pl_present: f64,
        "close" => close / close_present: f64,
        "visiblePL" => visible_pl / visible_pl_present: f64,
        "isDisabled" => is_disabled / is_disabled_present: bool,
        "currency" => currency / currency_present: String,
        "isBuy" => is_buy / is_buy_present: bool,
        "amountK" => amount_k / amount_k_present: i32,
        "currencyPoint" => currency_point / currency_point_present: f64,
        "time" (compact_time) => time / time_present: DateTime<Utc>,
        "usedMargin" => used_margin / used_margin_present: f64,
        "OpenOrderId" => open_order_id / open_order_id_present: String,
        "OpenOrderReqId" => open_order_req_id / open_order_req_id_present: String,
        "stop" => stop / stop_present: f64,
        "stopMove" => stop_move / stop_move_present: i32,
        "limit" => limit / limit_present: f64,
        "isTotal" => is_total / is_total_present: bool,
    }
}
