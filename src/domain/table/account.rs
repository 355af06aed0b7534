//! Accounts table.

use crate::domain::mapper::presence_entity;

presence_entity! {
    pub struct Account {
        "ratePrecision" => rate_precision / rate_precision_present: i32,
        "accountId" => account_id / account_id_present: String,
        "balance" => balance / balance_present: f64,
        "usdMr" => usd_mr / usd_mr_present: f64,
        "mc" => mc / mc_present: String,
        "accountName" => account_name / account_name_present: String,
        "usdMr3" => usd_mr3 / usd_mr3_present: f64,
        "hedging" => hedging / hedging_present: String,
        "usableMargin3" => usable_margin3 / usable_margin3_present: f64,
        "usableMarginPerc" => usable_margin_perc / usable_margin_perc_present: f64,
        "usableMargin3Perc" => usable_margin3_perc / usable_margin3_perc_present: f64,
        "equity" => equity / equity_present: f64,
        "usableMargin" => usable_margin / usable_margin_present: f64,
        "dayPL" => day_pl / day_pl_present: f64,
        "grossPL" => gross_pl / gross_pl_present: f64,
        "isTotal" => is_total / is_total_present: bool,
    }
}
