//! Command structs to flat request parameters.
//!
//! Purely mechanical: the only check is that required string fields are
//! non-empty. Business rules are left to the server.

use super::{
    ChangeOrder, ChangeOrderStopLimit, ChangeTradeStopLimit, CloseAllForSymbol, CloseTrade,
    CreateEntryOrder, DeleteOrder, EditOco, OcoLeg, OpenTrade, SimpleOco, TimeInForce,
};
use crate::error::SdkError;
use crate::shared::FormParams;
use chrono::{DateTime, Utc};

/// A trading command posted to `/trading/<name>`.
pub trait TradingCommand {
    const RESOURCE: &'static str;

    fn to_params(&self) -> Result<FormParams, SdkError>;
}

/// Server expects `yyyy-M-dd HH:mm` in UTC (month not zero-padded).
pub fn format_expiration(at: DateTime<Utc>) -> String {
    at.format("%Y-%-m-%d %H:%M").to_string()
}

fn require(key: &str, value: &str) -> Result<(), SdkError> {
    if value.trim().is_empty() {
        return Err(SdkError::Validation(format!("{} is required", key)));
    }
    Ok(())
}

fn push_time_in_force(
    params: &mut FormParams,
    tif: Option<TimeInForce>,
    expiration: Option<DateTime<Utc>>,
) {
    if let Some(tif) = tif {
        params.push("time_in_force", tif.as_str());
        if tif == TimeInForce::Gtd {
            if let Some(at) = expiration {
                params.push("expiration", format_expiration(at));
            }
        }
    }
}

impl TradingCommand for OpenTrade {
    const RESOURCE: &'static str = "/trading/open_trade";

    fn to_params(&self) -> Result<FormParams, SdkError> {
        require("account_id", &self.account_id)?;
        require("symbol", &self.symbol)?;

        let mut p = FormParams::new();
        p.push("account_id", self.account_id.as_str())
            .push("symbol", self.symbol.as_str())
            .push_bool("is_buy", self.is_buy)
            .push_decimal_opt("rate", self.rate)
            .push_int("amount", self.amount.into())
            .push_decimal_opt("stop", self.stop)
            .push_decimal_opt("trailing_step", self.trailing_step)
            .push_decimal_opt("limit", self.limit)
            .push_bool_opt("is_in_pips", self.is_in_pips)
            .push_decimal_opt("at_market", self.at_market)
            .push_str_opt("order_type", self.order_type.map(|t| t.as_str()));
        push_time_in_force(&mut p, self.time_in_force, None);
        Ok(p)
    }
}

impl TradingCommand for CloseTrade {
    const RESOURCE: &'static str = "/trading/close_trade";

    fn to_params(&self) -> Result<FormParams, SdkError> {
        require("trade_id", &self.trade_id)?;

        let mut p = FormParams::new();
        p.push("trade_id", self.trade_id.as_str())
            .push_decimal_opt("rate", self.rate)
            .push_int("amount", self.amount.into())
            .push_decimal_opt("at_market", self.at_market)
            .push_str_opt("order_type", self.order_type.map(|t| t.as_str()));
        push_time_in_force(&mut p, self.time_in_force, None);
        Ok(p)
    }
}

impl TradingCommand for ChangeOrder {
    const RESOURCE: &'static str = "/trading/change_order";

    fn to_params(&self) -> Result<FormParams, SdkError> {
        require("order_id", &self.order_id)?;

        let mut p = FormParams::new();
        p.push("order_id", self.order_id.as_str())
            .push_decimal_opt("rate", self.rate)
            .push_decimal_opt("range", self.range)
            .push_int("amount", self.amount.into())
            .push_decimal_opt("trailing_step", self.trailing_step);
        Ok(p)
    }
}

impl TradingCommand for DeleteOrder {
    const RESOURCE: &'static str = "/trading/delete_order";

    fn to_params(&self) -> Result<FormParams, SdkError> {
        require("order_id", &self.order_id)?;
        Ok(FormParams::new().with("order_id", self.order_id.as_str()))
    }
}

impl TradingCommand for CreateEntryOrder {
    const RESOURCE: &'static str = "/trading/create_entry_order";

    fn to_params(&self) -> Result<FormParams, SdkError> {
        require("account_id", &self.account_id)?;
        require("symbol", &self.symbol)?;

        let mut p = FormParams::new();
        p.push("account_id", self.account_id.as_str())
            .push("symbol", self.symbol.as_str())
            .push_bool("is_buy", self.is_buy)
            .push_decimal("rate", self.rate)
            .push_int("amount", self.amount.into())
            .push_decimal_opt("stop", self.stop)
            .push_decimal_opt("trailing_step", self.trailing_step)
            .push_decimal_opt("trailing_stop_step", self.trailing_stop_step)
            .push_decimal_opt("limit", self.limit)
            .push_bool_opt("is_in_pips", self.is_in_pips)
            .push_decimal_opt("range", self.range)
            .push_str_opt("order_type", self.order_type.map(|t| t.as_str()));
        push_time_in_force(&mut p, self.time_in_force, self.expiration);
        Ok(p)
    }
}

fn push_leg(p: &mut FormParams, leg: &OcoLeg, suffix: &str) {
    p.push_bool(&format!("is_buy{}", suffix), leg.is_buy)
        .push_decimal(&format!("rate{}", suffix), leg.rate)
        .push_decimal_opt(&format!("stop{}", suffix), leg.stop)
        .push_decimal_opt(&format!("trailing_step{}", suffix), leg.trailing_step)
        .push_decimal_opt(&format!("trailing_stop_step{}", suffix), leg.trailing_stop_step)
        .push_decimal_opt(&format!("limit{}", suffix), leg.limit);
}

impl TradingCommand for SimpleOco {
    const RESOURCE: &'static str = "/trading/simple_oco";

    fn to_params(&self) -> Result<FormParams, SdkError> {
        require("account_id", &self.account_id)?;
        require("symbol", &self.symbol)?;

        let mut p = FormParams::new();
        p.push("account_id", self.account_id.as_str())
            .push("symbol", self.symbol.as_str())
            .push_int("amount", self.amount.into())
            .push_bool_opt("is_in_pips", self.is_in_pips);
        push_time_in_force(&mut p, Some(self.time_in_force), self.expiration);

        push_leg(&mut p, &self.first, "");
        p.push_decimal_opt("at_market", self.at_market)
            .push_str_opt("order_type", self.order_type.map(|t| t.as_str()));
        push_leg(&mut p, &self.second, "2");
        Ok(p)
    }
}

impl TradingCommand for EditOco {
    const RESOURCE: &'static str = "/trading/edit_oco";

    fn to_params(&self) -> Result<FormParams, SdkError> {
        let mut p = FormParams::new();
        p.push_int("ocoBulkId", self.oco_bulk_id);
        for id in self.add_order_ids.iter().filter(|id| !id.is_empty()) {
            p.push("addOrderIds", id.as_str());
        }
        for id in self.remove_order_ids.iter().filter(|id| !id.is_empty()) {
            p.push("removeOrderIds", id.as_str());
        }
        Ok(p)
    }
}

impl TradingCommand for ChangeTradeStopLimit {
    const RESOURCE: &'static str = "/trading/change_trade_stop_limit";

    fn to_params(&self) -> Result<FormParams, SdkError> {
        require("trade_id", &self.trade_id)?;

        let mut p = FormParams::new();
        p.push("trade_id", self.trade_id.as_str())
            .push_bool("is_stop", self.is_stop)
            .push_decimal_opt("rate", self.rate)
            .push_bool_opt("is_in_pips", self.is_in_pips)
            .push_decimal_opt("trailing_step", self.trailing_step);
        Ok(p)
    }
}

impl TradingCommand for ChangeOrderStopLimit {
    const RESOURCE: &'static str = "/trading/change_order_stop_limit";

    fn to_params(&self) -> Result<FormParams, SdkError> {
        require("order_id", &self.order_id)?;

        let mut p = FormParams::new();
        p.push("order_id", self.order_id.as_str())
            .push_decimal_opt("limit", self.limit)
            .push_bool("is_limit_in_pips", self.is_limit_in_pips)
            .push_decimal_opt("stop", self.stop)
            .push_bool("is_stop_in_pips", self.is_stop_in_pips)
            .push_decimal_opt("trailing_step", self.trailing_step);
        Ok(p)
    }
}

impl TradingCommand for CloseAllForSymbol {
    const RESOURCE: &'static str = "/trading/close_all_for_symbol";

    fn to_params(&self) -> Result<FormParams, SdkError> {
        require("account_id", &self.account_id)?;

        let mut p = FormParams::new();
        p.push("account_id", self.account_id.as_str())
            .push_bool("forSymbol", self.for_symbol)
            .push_str_opt("symbol", self.symbol.as_deref())
            .push_str_opt("order_type", self.order_type.map(|t| t.as_str()));
        push_time_in_force(&mut p, self.time_in_force, None);
        Ok(p)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::trading::OrderType;
    use chrono::TimeZone;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn keys(p: &FormParams) -> Vec<&str> {
        p.iter().map(|(k, _)| k).collect()
    }

    #[test]
    fn test_open_trade_minimal() {
        let p = OpenTrade::new("1234567", "EUR/USD", true, 10).to_params().unwrap();
        assert_eq!(keys(&p), vec!["account_id", "symbol", "is_buy", "amount"]);
        assert_eq!(p.get("is_buy"), Some("true"));
        assert_eq!(p.get("amount"), Some("10"));
    }

    #[test]
    fn test_open_trade_optionals_in_field_order() {
        let cmd = OpenTrade {
            rate: Some(dec("1.10500")),
            stop: Some(dec("-30")),
            limit: Some(dec("45.0")),
            is_in_pips: Some(true),
            at_market: Some(dec("3")),
            order_type: Some(OrderType::AtMarket),
            time_in_force: Some(TimeInForce::Gtc),
            ..OpenTrade::new("1234567", "EUR/USD", false, 2)
        };
        let p = cmd.to_params().unwrap();
        assert_eq!(
            keys(&p),
            vec![
                "account_id", "symbol", "is_buy", "rate", "amount", "stop", "limit",
                "is_in_pips", "at_market", "order_type", "time_in_force"
            ]
        );
        assert_eq!(p.get("rate"), Some("1.105"));
        assert_eq!(p.get("limit"), Some("45"));
        assert_eq!(p.get("is_buy"), Some("false"));
        assert_eq!(p.get("time_in_force"), Some("GTC"));
    }

    #[test]
    fn test_required_field_must_be_non_empty() {
        let err = OpenTrade::new("", "EUR/USD", true, 1).to_params().unwrap_err();
        assert!(matches!(err, SdkError::Validation(_)));
        assert!(DeleteOrder::new(" ").to_params().is_err());
    }

    #[test]
    fn test_entry_order_expiration_only_for_gtd() {
        let at = Utc.with_ymd_and_hms(2024, 3, 5, 17, 30, 0).unwrap();

        let gtc = CreateEntryOrder {
            time_in_force: Some(TimeInForce::Gtc),
            expiration: Some(at),
            ..CreateEntryOrder::new("1", "EUR/USD", true, dec("1.09"), 5)
        };
        assert!(!gtc.to_params().unwrap().contains("expiration"));

        let gtd = CreateEntryOrder {
            time_in_force: Some(TimeInForce::Gtd),
            ..gtc
        };
        let p = gtd.to_params().unwrap();
        assert_eq!(p.get("expiration"), Some("2024-3-05 17:30"));
        assert_eq!(p.get("rate"), Some("1.09"));
    }

    #[test]
    fn test_simple_oco_two_legs() {
        let cmd = SimpleOco {
            order_type: Some(OrderType::Entry),
            ..SimpleOco::new(
                "1",
                "EUR/USD",
                3,
                TimeInForce::Gtc,
                OcoLeg { stop: Some(dec("1.08")), ..OcoLeg::new(true, dec("1.10")) },
                OcoLeg { limit: Some(dec("1.02")), ..OcoLeg::new(false, dec("1.05")) },
            )
        };
        let p = cmd.to_params().unwrap();
        assert_eq!(p.get("is_buy"), Some("true"));
        assert_eq!(p.get("is_buy2"), Some("false"));
        assert_eq!(p.get("rate2"), Some("1.05"));
        assert_eq!(p.get("stop"), Some("1.08"));
        assert_eq!(p.get("limit2"), Some("1.02"));
        assert!(!p.contains("stop2"));
        assert_eq!(p.get("order_type"), Some("Entry"));
    }

    #[test]
    fn test_edit_oco_repeats_keys_and_skips_empty_ids() {
        let cmd = EditOco {
            oco_bulk_id: 77,
            add_order_ids: vec!["1".into(), "".into(), "2".into()],
            remove_order_ids: vec!["3".into()],
        };
        let p = cmd.to_params().unwrap();
        assert_eq!(p.encode(), "ocoBulkId=77&addOrderIds=1&addOrderIds=2&removeOrderIds=3");
    }

    #[test]
    fn test_change_order_stop_limit_always_sends_pip_flags() {
        let p = ChangeOrderStopLimit::new("9", false, true).to_params().unwrap();
        assert_eq!(keys(&p), vec!["order_id", "is_limit_in_pips", "is_stop_in_pips"]);
        assert_eq!(p.get("is_stop_in_pips"), Some("true"));
    }

    #[test]
    fn test_close_all_for_symbol() {
        let all = CloseAllForSymbol::new("1", None).to_params().unwrap();
        assert_eq!(all.get("forSymbol"), Some("false"));
        assert!(!all.contains("symbol"));

        let one = CloseAllForSymbol::new("1", Some("USD/JPY")).to_params().unwrap();
        assert_eq!(one.get("forSymbol"), Some("true"));
        assert_eq!(one.get("symbol"), Some("USD/JPY"));
    }

    #[test]
    fn test_resources() {
        assert_eq!(OpenTrade::RESOURCE, "/trading/open_trade");
        assert_eq!(ChangeTradeStopLimit::RESOURCE, "/trading/change_trade_stop_limit");
        assert_eq!(CloseAllForSymbol::RESOURCE, "/trading/close_all_for_symbol");
    }
}
