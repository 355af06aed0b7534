//! Ordered, repeat-friendly request parameter set.
//!
//! Values are formatted here, once, with locale-independent rules:
//! decimals use `.` and no grouping, booleans are `true`/`false`.

use rust_decimal::Decimal;

/// Flat `key=value` parameter list sent as a query string or form body.
///
/// Insertion order is kept and a key may repeat (`addOrderIds=1&addOrderIds=2`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormParams {
    pairs: Vec<(String, String)>,
}

impl FormParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, key: &str, value: impl Into<String>) -> &mut Self {
        self.pairs.push((key.to_string(), value.into()));
        self
    }

    /// Chained form of [`push`](Self::push).
    pub fn with(mut self, key: &str, value: impl Into<String>) -> Self {
        self.push(key, value);
        self
    }

    /// Skips `None` and empty strings.
    pub fn push_str_opt(&mut self, key: &str, value: Option<&str>) -> &mut Self {
        if let Some(v) = value.filter(|v| !v.is_empty()) {
            self.push(key, v);
        }
        self
    }

    pub fn push_bool(&mut self, key: &str, value: bool) -> &mut Self {
        self.push(key, format_bool(value))
    }

    pub fn push_bool_opt(&mut self, key: &str, value: Option<bool>) -> &mut Self {
        if let Some(v) = value {
            self.push_bool(key, v);
        }
        self
    }

    pub fn push_decimal(&mut self, key: &str, value: Decimal) -> &mut Self {
        self.push(key, format_decimal(value))
    }

    pub fn push_decimal_opt(&mut self, key: &str, value: Option<Decimal>) -> &mut Self {
        if let Some(v) = value {
            self.push_decimal(key, v);
        }
        self
    }

    pub fn push_int(&mut self, key: &str, value: i64) -> &mut Self {
        self.push(key, value.to_string())
    }

    /// First value for `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Every value for `key`, in insertion order.
    pub fn get_all(&self, key: &str) -> Vec<&str> {
        self.pairs
            .iter()
            .filter(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
            .collect()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.pairs.iter().any(|(k, _)| k == key)
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Percent-encodes as `k1=v1&k2=v2`.
    pub fn encode(&self) -> String {
        self.pairs
            .iter()
            .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&")
    }
}

pub fn format_bool(value: bool) -> &'static str {
    if value {
        "true"
    } else {
        "false"
    }
}

/// Shortest invariant rendering: `1.10000` becomes `1.1`, `-0.50` becomes `-0.5`.
pub fn format_decimal(value: Decimal) -> String {
    value.normalize().to_string()
}
