//! Session and runner configuration, loaded from the environment.

use crate::domain::table::Account;
use crate::domain::trading::{OpenTrade, OrderType, TimeInForce};
use crate::error::SdkError;
use crate::network::DEMO_HOST;
use crate::shared::Timeframe;
use chrono::{DateTime, Local, NaiveDateTime, TimeZone, Utc};
use std::time::Duration;

/// Push-stream reconnection policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconnectConfig {
    pub enabled: bool,
    pub max_attempts: u32,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
    /// Slack added to the server's `pingTimeout` before a missing pong
    /// counts as a dead connection.
    pub ping_timeout_grace_ms: u64,
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_attempts: 10,
            base_delay_ms: 1_000,
            max_delay_ms: 30_000,
            ping_timeout_grace_ms: 5_000,
        }
    }
}

/// Everything a [`Session`](crate::session::Session) needs to reach the server.
#[derive(Clone)]
pub struct SessionConfig {
    /// Base URL, e.g. `https://api-demo.fxcm.com`.
    pub host: String,
    /// Long-lived API token.
    pub access_token: String,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub reconnect: ReconnectConfig,
    pub user_agent: String,
}

impl SessionConfig {
    pub fn new(host: &str, access_token: &str) -> Self {
        Self {
            host: host.trim_end_matches('/').to_string(),
            access_token: access_token.to_string(),
            connect_timeout: Duration::from_secs(30),
            request_timeout: Duration::from_secs(30),
            reconnect: ReconnectConfig::default(),
            user_agent: "request".to_string(),
        }
    }

    /// Reads `FXCM_HOST` and `FXCM_ACCESS_TOKEN` (required), and
    /// `FXCM_CONNECT_TIMEOUT_SECS`, `FXCM_REQUEST_TIMEOUT_SECS`,
    /// `FXCM_RECONNECT_ATTEMPTS` (optional). A `.env` file is honoured.
    pub fn from_env() -> Result<Self, SdkError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, SdkError> {
        let host = required(&lookup, "FXCM_HOST")?;
        let access_token = required(&lookup, "FXCM_ACCESS_TOKEN")?;

        let mut config = Self::new(&host, &access_token);
        if let Some(secs) = parsed::<u64>(&lookup, "FXCM_CONNECT_TIMEOUT_SECS")? {
            config.connect_timeout = Duration::from_secs(secs);
        }
        if let Some(secs) = parsed::<u64>(&lookup, "FXCM_REQUEST_TIMEOUT_SECS")? {
            config.request_timeout = Duration::from_secs(secs);
        }
        if let Some(attempts) = parsed::<u32>(&lookup, "FXCM_RECONNECT_ATTEMPTS")? {
            config.reconnect.max_attempts = attempts;
        }
        Ok(config)
    }
}

impl std::fmt::Debug for SessionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionConfig")
            .field("host", &self.host)
            .field("access_token", &"<redacted>")
            .field("connect_timeout", &self.connect_timeout)
            .field("request_timeout", &self.request_timeout)
            .field("reconnect", &self.reconnect)
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

// ─── Runner parameters ───────────────────────────────────────────────────────

/// `MM.dd.yyyy HH:mm:ss`, local time.
pub const RUNNER_DATE_FORMAT: &str = "%m.%d.%Y %H:%M:%S";

/// Parameters of the sample runner.
#[derive(Debug, Clone, PartialEq)]
pub struct RunnerParams {
    pub access_token: String,
    pub host: String,
    pub instrument: String,
    pub account: Option<String>,
    /// `FXCM_BUY_SELL=B` buys, any other value sells. Buys when unset.
    pub is_buy: bool,
    pub timeframe: Timeframe,
    pub date_from: Option<DateTime<Utc>>,
    /// Defaults to now.
    pub date_to: DateTime<Utc>,
    pub count: Option<u32>,
    /// Defaults to 1 when missing or unparsable.
    pub lots: u32,
}

impl RunnerParams {
    /// Reads `FXCM_ACCESS_TOKEN`, `FXCM_HOST`, `FXCM_INSTRUMENT` (required),
    /// and `FXCM_ACCOUNT`, `FXCM_BUY_SELL`, `FXCM_TIMEFRAME`, `FXCM_DATE_FROM`,
    /// `FXCM_DATE_TO`, `FXCM_COUNT`, `FXCM_LOTS`.
    pub fn from_env() -> Result<Self, SdkError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, SdkError> {
        let now = Utc::now();
        let timeframe = match optional(&lookup, "FXCM_TIMEFRAME") {
            Some(tf) => tf.parse().map_err(SdkError::Config)?,
            None => Timeframe::default(),
        };

        Ok(Self {
            access_token: required(&lookup, "FXCM_ACCESS_TOKEN")?,
            host: optional(&lookup, "FXCM_HOST").unwrap_or_else(|| DEMO_HOST.to_string()),
            instrument: required(&lookup, "FXCM_INSTRUMENT")?,
            account: optional(&lookup, "FXCM_ACCOUNT"),
            is_buy: optional(&lookup, "FXCM_BUY_SELL").map_or(true, |side| side == "B"),
            timeframe,
            date_from: runner_date(&lookup, "FXCM_DATE_FROM", now)?,
            date_to: runner_date(&lookup, "FXCM_DATE_TO", now)?.unwrap_or(now),
            count: optional(&lookup, "FXCM_COUNT").and_then(|c| c.parse().ok()),
            lots: optional(&lookup, "FXCM_LOTS")
                .and_then(|l| l.parse().ok())
                .unwrap_or(1),
        })
    }

    pub fn session_config(&self) -> SessionConfig {
        SessionConfig::new(&self.host, &self.access_token)
    }

    /// The configured account, else the first account with an id.
    pub fn trading_account(&self, accounts: &[Account]) -> Option<String> {
        self.account.clone().or_else(|| {
            accounts
                .iter()
                .find(|a| !a.account_id.is_empty())
                .map(|a| a.account_id.clone())
        })
    }

    /// An `AtMarket`/`GTC` order for `lots` of the instrument.
    pub fn market_order(&self, account_id: &str) -> OpenTrade {
        OpenTrade {
            order_type: Some(OrderType::AtMarket),
            time_in_force: Some(TimeInForce::Gtc),
            ..OpenTrade::new(account_id, &self.instrument, self.is_buy, self.lots)
        }
    }
}

// ─── Helpers ─────────────────────────────────────────────────────────────────

/// Blank values and unfilled `{placeholder}` templates count as missing.
fn optional(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<String> {
    lookup(key)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty() && !v.contains(['{', '}']))
}

fn required(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Result<String, SdkError> {
    optional(lookup, key).ok_or_else(|| SdkError::Config(format!("{} is not set", key)))
}

fn parsed<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
) -> Result<Option<T>, SdkError> {
    optional(lookup, key)
        .map(|raw| {
            raw.parse::<T>()
                .map_err(|_| SdkError::Config(format!("{} is not a valid number: {}", key, raw)))
        })
        .transpose()
}

/// Unparsable dates are ignored; dates in the future are rejected.
fn runner_date(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    now: DateTime<Utc>,
) -> Result<Option<DateTime<Utc>>, SdkError> {
    let Some(raw) = optional(lookup, key) else {
        return Ok(None);
    };
    let Ok(naive) = NaiveDateTime::parse_from_str(&raw, RUNNER_DATE_FORMAT) else {
        return Ok(None);
    };
    let Some(local) = Local.from_local_datetime(&naive).earliest() else {
        return Ok(None);
    };

    let at = local.with_timezone(&Utc);
    if at >= now {
        return Err(SdkError::Config(format!(
            "{} value {} is in the future",
            key, raw
        )));
    }
    Ok(Some(at))
}
