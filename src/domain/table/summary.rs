//! Summary table: per-instrument aggregate of open exposure.

use crate::domain::mapper::presence_entity;

presence_entity! {
    pub struct Summary {
        "ratePrecision" => rate_precision / rate_precision_present: i32,
        "offerId" => offer_id / offer_id_present: i32,
        "currency" => currency / currency_present: String,
        "plSell" => pl_sell / pl_sell_present: f64,
        "amountKSell" => amount_k_sell / amount_k_sell_present: i32,
        "avgSell" => avg_sell / avg_sell_present: f64,
        "closeBuy" => close_buy / close_buy_present: f64,
        "closeSell" => close_sell / close_sell_present: f64,
        "avgBuy" => avg_buy / avg_buy_present: f64,
        "amountKBuy" => amount_k_buy / amount_k_buy_present: i32,
        "rollSum" => roll_sum / roll_sum_present: f64,
        "usedMarginSell" => used_margin_sell / used_margin_sell_present: f64,
        "usedMarginBuy" => used_margin_buy / used_margin_buy_present: f64,
        "isSellDisabled" => is_sell_disabled / is_sell_disabled_present: bool,
        "isBuyDisabled" => is_buy_disabled / is_buy_disabled_present: bool,
        "plBuy" => pl_buy / pl_buy_present: f64,
        "amountK" => amount_k / amount_k_present: i32,
        "currencyPoint" => currency_point / currency_point_present: f64,
        "grossPL" => gross_pl / gross_pl_present: f64,
        "netPL" => net_pl / net_pl_present: f64,
        "netStop" => net_stop / net_stop_present: f64,
        "netStopMove" => net_stop_move / net_stop_move_present: f64,
        "netLimit" => net_limit / net_limit_present: f64,
        "isTotal" => is_total / is_total_present: bool,
    }
}
