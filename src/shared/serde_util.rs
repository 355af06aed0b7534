//! Parsers for the date/time encodings the trading server mixes on the wire.
//!
//! - compact order times: `MMddyyyyHHmmss` or `MMddyyyyHHmmssfff`
//! - value dates: `yyyyMMdd`
//! - offer times: ISO-8601
//! - price updates and candles: Unix epoch (ms or s)

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

const COMPACT_TIME: &str = "%m%d%Y%H%M%S";
const COMPACT_TIME_LEN: usize = 14;

/// Parses `MMddyyyyHHmmss[fff]`.
///
/// An empty string decodes to the Unix epoch; the server uses it for
/// "no time yet" on pending orders.
pub fn parse_compact_time(s: &str) -> Result<DateTime<Utc>, String> {
    let s = s.trim();
    if s.is_empty() {
        return Ok(DateTime::<Utc>::default());
    }
    if !s.is_ascii() {
        return Err(format!("Invalid compact time: {}", s));
    }

    let (head, millis) = match s.len() {
        COMPACT_TIME_LEN => (s, 0),
        17 => {
            let ms = s[COMPACT_TIME_LEN..]
                .parse::<u32>()
                .map_err(|_| format!("Invalid compact time: {}", s))?;
            (&s[..COMPACT_TIME_LEN], ms)
        }
        _ => return Err(format!("Invalid compact time: {}", s)),
    };

    let naive = NaiveDateTime::parse_from_str(head, COMPACT_TIME)
        .map_err(|e| format!("Invalid compact time '{}': {}", s, e))?;
    let naive = naive
        .checked_add_signed(chrono::Duration::milliseconds(millis as i64))
        .ok_or_else(|| format!("Invalid compact time: {}", s))?;
    Ok(naive.and_utc())
}

/// Parses a `yyyyMMdd` settlement date as midnight UTC.
pub fn parse_value_date(s: &str) -> Result<DateTime<Utc>, String> {
    let s = s.trim();
    if s.is_empty() {
        return Ok(DateTime::<Utc>::default());
    }
    let date = NaiveDate::parse_from_str(s, "%Y%m%d")
        .map_err(|e| format!("Invalid value date '{}': {}", s, e))?;
    date.and_hms_opt(0, 0, 0)
        .map(|dt| dt.and_utc())
        .ok_or_else(|| format!("Invalid value date: {}", s))
}

/// Parses an ISO-8601 timestamp. A missing offset is read as UTC.
pub fn parse_iso_time(s: &str) -> Result<DateTime<Utc>, String> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Ok(naive.and_utc());
        }
    }
    Err(format!("Invalid ISO-8601 time: {}", s))
}

pub fn from_epoch_millis(millis: i64) -> Result<DateTime<Utc>, String> {
    DateTime::<Utc>::from_timestamp_millis(millis)
        .ok_or_else(|| format!("Invalid timestamp: {}", millis))
}

pub fn from_epoch_secs(secs: i64) -> Result<DateTime<Utc>, String> {
    DateTime::<Utc>::from_timestamp(secs, 0).ok_or_else(|| format!("Invalid timestamp: {}", secs))
}
