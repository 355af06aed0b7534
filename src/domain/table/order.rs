//! Orders table: working and pending orders.

use crate::domain::mapper::{compact_time, presence_entity};
use chrono::{DateTime, Utc};

presence_entity! {
    pub struct Order {
        "ratePrecision" => rate_precision / rate_precision_present: i32,
        "orderId" => order_id / order_id_present: String,
        "time" (compact_time) => time / time_present: DateTime<Utc>,
        "accountName" => account_name / account_name_present: String,
        "accountId" => account_id / account_id_present: String,
        "timeInForce" => time_in_force / time_in_force_present: String,
        "currency" => currency / currency_present: String,
        "isBuy" => is_buy / is_buy_present: bool,
        "buy" => buy / buy_present: f64,
        "sell" => sell / sell_present: f64,
        "type" => order_type / order_type_present: String,
        "status" => status / status_present: String,
        "amountK" => amount_k / amount_k_present: i32,
        "currencyPoint" => currency_point / currency_point_present: f64,
        "stopMove" => stop_move / stop_move_present: i32,
        "stop" => stop / stop_present: f64,
        "stopRate" => stop_rate / stop_rate_present: f64,
        "limit" => limit / limit_present: f64,
        "limitRate" => limit_rate / limit_rate_present: f64,
        "isEntryOrder" => is_entry_order / is_entry_order_present: bool,
        "ocoBulkId" => oco_bulk_id / oco_bulk_id_present: i32,
        "isNetQuantity" => is_net_quantity / is_net_quantity_present: bool,
        "isLimitOrder" => is_limit_order / is_limit_order_present: bool,
        "isStopOrder" => is_stop_order / is_stop_order_present: bool,
        "isELSOrder" => is_els_order / is_els_order_present: bool,
        "stopPegBaseType" => stop_peg_base_type / stop_peg_base_type_present: i32,
        "limitPegBaseType" => limit_peg_base_type / limit_peg_base_type_present: i32,
        "range" => range / range_present: f64,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::mapper::MappedEntity;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn test_order_compact_time_and_type_key() {
        let order = Order::from_value(&json!({
            "orderId": "378540342",
            "time": "01022024101112345",
            "type": "LE",
            "isBuy": false,
            "amountK": 10,
            "ocoBulkId": 0
        }))
        .unwrap();

        assert_eq!(order.order_id, "378540342");
        assert_eq!(order.order_type, "LE");
        assert!(order.is_buy_present && !order.is_buy);
        assert!(order.oco_bulk_id_present);
        let expected = Utc.with_ymd_and_hms(2024, 1, 2, 10, 11, 12).unwrap()
            + chrono::Duration::milliseconds(345);
        assert_eq!(order.time, expected);
    }

    #[test]
    fn test_order_numeric_id_becomes_string() {
        let order = Order::from_value(&json!({"orderId": 42})).unwrap();
        assert_eq!(order.order_id, "42");
    }

    #[test]
    fn test_order_malformed_time_fails() {
        assert!(Order::from_value(&json!({"time": "not-a-time"})).is_err());
    }
}
