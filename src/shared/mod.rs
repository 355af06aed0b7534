//! Shared enums and utilities used across the domain, transport and session layers.
//!
//! Each enum carries the exact token the server uses on the wire (`as_str`),
//! so it can be dropped straight into a request parameter or a topic name.

pub mod form;
pub mod serde_util;

pub use form::FormParams;

use serde::{Deserialize, Serialize};
use std::str::FromStr;

// ─── SessionState ────────────────────────────────────────────────────────────

/// Connection lifecycle state of a session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SessionState {
    #[default]
    Disconnected,
    Connected,
    Reconnecting,
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            SessionState::Disconnected => "Disconnected",
            SessionState::Connected => "Connected",
            SessionState::Reconnecting => "Reconnecting",
        };
        f.write_str(s)
    }
}

// ─── TradingTable ────────────────────────────────────────────────────────────

/// Server-side row sets whose changes are pushed as delta records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TradingTable {
    Offer,
    OpenPosition,
    ClosedPosition,
    Order,
    Account,
    Summary,
}

impl TradingTable {
    pub const COUNT: usize = 6;

    pub const ALL: [TradingTable; TradingTable::COUNT] = [
        TradingTable::Offer,
        TradingTable::OpenPosition,
        TradingTable::ClosedPosition,
        TradingTable::Order,
        TradingTable::Account,
        TradingTable::Summary,
    ];

    /// The `models` parameter value, which doubles as the push topic name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Offer => "Offer",
            Self::OpenPosition => "OpenPosition",
            Self::ClosedPosition => "ClosedPosition",
            Self::Order => "Order",
            Self::Account => "Account",
            Self::Summary => "Summary",
        }
    }

    /// Key of this table's rows in a `get_model` response.
    pub fn snapshot_key(&self) -> &'static str {
        match self {
            Self::Offer => "offers",
            Self::OpenPosition => "open_positions",
            Self::ClosedPosition => "closed_positions",
            Self::Order => "orders",
            Self::Account => "accounts",
            Self::Summary => "summary",
        }
    }

    pub(crate) fn index(&self) -> usize {
        *self as usize
    }
}

impl std::fmt::Display for TradingTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TradingTable {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| format!("Unknown trading table: {}", s))
    }
}

// ─── UpdateAction ────────────────────────────────────────────────────────────

/// What a pushed table record does to its row.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UpdateAction {
    Insert,
    #[default]
    Update,
    Delete,
}

impl UpdateAction {
    /// Parses the single-letter wire code (`I`, `U`, `D`).
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "I" => Some(Self::Insert),
            "U" => Some(Self::Update),
            "D" => Some(Self::Delete),
            _ => None,
        }
    }

    pub fn as_code(&self) -> &'static str {
        match self {
            Self::Insert => "I",
            Self::Update => "U",
            Self::Delete => "D",
        }
    }
}

// ─── Timeframe ───────────────────────────────────────────────────────────────

/// Historical candle period.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Timeframe {
    #[default]
    #[serde(rename = "m1")]
    Minute1,
    #[serde(rename = "m5")]
    Minute5,
    #[serde(rename = "m15")]
    Minute15,
    #[serde(rename = "m30")]
    Minute30,
    #[serde(rename = "H1")]
    Hour1,
    #[serde(rename = "H2")]
    Hour2,
    #[serde(rename = "H3")]
    Hour3,
    #[serde(rename = "H4")]
    Hour4,
    #[serde(rename = "H6")]
    Hour6,
    #[serde(rename = "H8")]
    Hour8,
    #[serde(rename = "D1")]
    Day1,
    #[serde(rename = "W1")]
    Week1,
    #[serde(rename = "M1")]
    Month1,
}

impl Timeframe {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Minute1 => "m1",
            Self::Minute5 => "m5",
            Self::Minute15 => "m15",
            Self::Minute30 => "m30",
            Self::Hour1 => "H1",
            Self::Hour2 => "H2",
            Self::Hour3 => "H3",
            Self::Hour4 => "H4",
            Self::Hour6 => "H6",
            Self::Hour8 => "H8",
            Self::Day1 => "D1",
            Self::Week1 => "W1",
            Self::Month1 => "M1",
        }
    }
}

impl std::fmt::Display for Timeframe {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Timeframe {
    type Err = String;

    // Case matters: "m1" is one minute, "M1" is one month.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "m1" => Ok(Self::Minute1),
            "m5" => Ok(Self::Minute5),
            "m15" => Ok(Self::Minute15),
            "m30" => Ok(Self::Minute30),
            "H1" => Ok(Self::Hour1),
            "H2" => Ok(Self::Hour2),
            "H3" => Ok(Self::Hour3),
            "H4" => Ok(Self::Hour4),
            "H6" => Ok(Self::Hour6),
            "H8" => Ok(Self::Hour8),
            "D1" => Ok(Self::Day1),
            "W1" => Ok(Self::Week1),
            "M1" => Ok(Self::Month1),
            _ => Err(format!("Unknown timeframe: {}", s)),
        }
    }
}
