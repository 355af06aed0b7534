//! Trading-order commands: parameter structs, codec, responses, sub-client.
//!
//! Each command struct is a plain value: required fields are non-`Option`,
//! optional fields are `Option` and are left out of the request when `None`.
//! Build one with `new(..)` and override optionals with struct update syntax:
//!
//! ```rust,ignore
//! let cmd = OpenTrade {
//!     stop: Some(dec!(-30)),
//!     is_in_pips: Some(true),
//!     ..OpenTrade::new("1234567", "EUR/USD", true, 10)
//! };
//! ```

pub mod client;
pub mod codec;
pub mod wire;

pub use codec::TradingCommand;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

// ─── Shared enums ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimeInForce {
    Gtc,
    Gtd,
    Ioc,
    Fok,
    Day,
}

impl TimeInForce {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Gtc => "GTC",
            Self::Gtd => "GTD",
            Self::Ioc => "IOC",
            Self::Fok => "FOK",
            Self::Day => "DAY",
        }
    }
}

impl std::fmt::Display for TimeInForce {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderType {
    AtMarket,
    MarketRange,
    Entry,
}

impl OrderType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AtMarket => "AtMarket",
            Self::MarketRange => "MarketRange",
            Self::Entry => "Entry",
        }
    }
}

impl std::fmt::Display for OrderType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ─── Commands ────────────────────────────────────────────────────────────────

/// Open a trade at the best available price.
#[derive(Debug, Clone, PartialEq)]
pub struct OpenTrade {
    pub account_id: String,
    pub symbol: String,
    pub is_buy: bool,
    /// Lots, in thousands of base currency.
    pub amount: u32,
    pub rate: Option<Decimal>,
    pub stop: Option<Decimal>,
    pub trailing_step: Option<Decimal>,
    pub limit: Option<Decimal>,
    pub is_in_pips: Option<bool>,
    pub at_market: Option<Decimal>,
    pub order_type: Option<OrderType>,
    pub time_in_force: Option<TimeInForce>,
}

impl OpenTrade {
    pub fn new(account_id: &str, symbol: &str, is_buy: bool, amount: u32) -> Self {
        Self {
            account_id: account_id.to_string(),
            symbol: symbol.to_string(),
            is_buy,
            amount,
            rate: None,
            stop: None,
            trailing_step: None,
            limit: None,
            is_in_pips: None,
            at_market: None,
            order_type: None,
            time_in_force: None,
        }
    }
}

/// Close (part of) an open trade.
#[derive(Debug, Clone, PartialEq)]
pub struct CloseTrade {
    pub trade_id: String,
    pub amount: u32,
    pub rate: Option<Decimal>,
    pub at_market: Option<Decimal>,
    pub order_type: Option<OrderType>,
    pub time_in_force: Option<TimeInForce>,
}

impl CloseTrade {
    pub fn new(trade_id: &str, amount: u32) -> Self {
        Self {
            trade_id: trade_id.to_string(),
            amount,
            rate: None,
            at_market: None,
            order_type: None,
            time_in_force: None,
        }
    }
}

/// Amend a working order's rate, range or size.
#[derive(Debug, Clone, PartialEq)]
pub struct ChangeOrder {
    pub order_id: String,
    pub amount: u32,
    pub rate: Option<Decimal>,
    pub range: Option<Decimal>,
    pub trailing_step: Option<Decimal>,
}

impl ChangeOrder {
    pub fn new(order_id: &str, amount: u32) -> Self {
        Self {
            order_id: order_id.to_string(),
            amount,
            rate: None,
            range: None,
            trailing_step: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteOrder {
    pub order_id: String,
}

impl DeleteOrder {
    pub fn new(order_id: &str) -> Self {
        Self {
            order_id: order_id.to_string(),
        }
    }
}

/// Place a resting entry order.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateEntryOrder {
    pub account_id: String,
    pub symbol: String,
    pub is_buy: bool,
    pub rate: Decimal,
    pub amount: u32,
    pub stop: Option<Decimal>,
    pub trailing_step: Option<Decimal>,
    pub trailing_stop_step: Option<Decimal>,
    pub limit: Option<Decimal>,
    pub is_in_pips: Option<bool>,
    pub range: Option<Decimal>,
    pub order_type: Option<OrderType>,
    pub time_in_force: Option<TimeInForce>,
    /// Only sent with `TimeInForce::Gtd`.
    pub expiration: Option<DateTime<Utc>>,
}

impl CreateEntryOrder {
    pub fn new(account_id: &str, symbol: &str, is_buy: bool, rate: Decimal, amount: u32) -> Self {
        Self {
            account_id: account_id.to_string(),
            symbol: symbol.to_string(),
            is_buy,
            rate,
            amount,
            stop: None,
            trailing_step: None,
            trailing_stop_step: None,
            limit: None,
            is_in_pips: None,
            range: None,
            order_type: None,
            time_in_force: None,
            expiration: None,
        }
    }
}

/// One side of a [`SimpleOco`] pair.
#[derive(Debug, Clone, PartialEq)]
pub struct OcoLeg {
    pub is_buy: bool,
    pub rate: Decimal,
    pub stop: Option<Decimal>,
    pub trailing_step: Option<Decimal>,
    pub trailing_stop_step: Option<Decimal>,
    pub limit: Option<Decimal>,
}

impl OcoLeg {
    pub fn new(is_buy: bool, rate: Decimal) -> Self {
        Self {
            is_buy,
            rate,
            stop: None,
            trailing_step: None,
            trailing_stop_step: None,
            limit: None,
        }
    }
}

/// Two entry orders where filling one cancels the other.
#[derive(Debug, Clone, PartialEq)]
pub struct SimpleOco {
    pub account_id: String,
    pub symbol: String,
    pub amount: u32,
    pub time_in_force: TimeInForce,
    pub first: OcoLeg,
    pub second: OcoLeg,
    pub is_in_pips: Option<bool>,
    pub at_market: Option<Decimal>,
    pub order_type: Option<OrderType>,
    /// Only sent with `TimeInForce::Gtd`.
    pub expiration: Option<DateTime<Utc>>,
}

impl SimpleOco {
    pub fn new(
        account_id: &str,
        symbol: &str,
        amount: u32,
        time_in_force: TimeInForce,
        first: OcoLeg,
        second: OcoLeg,
    ) -> Self {
        Self {
            account_id: account_id.to_string(),
            symbol: symbol.to_string(),
            amount,
            time_in_force,
            first,
            second,
            is_in_pips: None,
            at_market: None,
            order_type: None,
            expiration: None,
        }
    }
}

/// Add orders to, or remove them from, an existing OCO group.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditOco {
    pub oco_bulk_id: i64,
    pub add_order_ids: Vec<String>,
    pub remove_order_ids: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChangeTradeStopLimit {
    pub trade_id: String,
    /// `true` edits the stop, `false` the limit.
    pub is_stop: bool,
    pub rate: Option<Decimal>,
    pub is_in_pips: Option<bool>,
    pub trailing_step: Option<Decimal>,
}

impl ChangeTradeStopLimit {
    pub fn new(trade_id: &str, is_stop: bool) -> Self {
        Self {
            trade_id: trade_id.to_string(),
            is_stop,
            rate: None,
            is_in_pips: None,
            trailing_step: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChangeOrderStopLimit {
    pub order_id: String,
    pub is_limit_in_pips: bool,
    pub is_stop_in_pips: bool,
    pub limit: Option<Decimal>,
    pub stop: Option<Decimal>,
    pub trailing_step: Option<Decimal>,
}

impl ChangeOrderStopLimit {
    pub fn new(order_id: &str, is_limit_in_pips: bool, is_stop_in_pips: bool) -> Self {
        Self {
            order_id: order_id.to_string(),
            is_limit_in_pips,
            is_stop_in_pips,
            limit: None,
            stop: None,
            trailing_step: None,
        }
    }
}

/// Close every position of an account, or only those of one symbol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CloseAllForSymbol {
    pub account_id: String,
    pub for_symbol: bool,
    pub symbol: Option<String>,
    pub order_type: Option<OrderType>,
    pub time_in_force: Option<TimeInForce>,
}

impl CloseAllForSymbol {
    pub fn new(account_id: &str, symbol: Option<&str>) -> Self {
        Self {
            account_id: account_id.to_string(),
            for_symbol: symbol.is_some(),
            symbol: symbol.map(str::to_string),
            order_type: None,
            time_in_force: None,
        }
    }
}
