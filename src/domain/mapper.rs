//! Presence-flag projection of sparse wire records.
//!
//! The push stream delivers deltas: a record only carries the fields that
//! changed. Every mapped entity therefore pairs each value field `x` with an
//! `x_present` flag that is set iff the record supplied a non-null value.
//!
//! Entities are declared once with [`presence_entity!`], which emits both the
//! struct and its field table. [`map_record`] walks that table generically,
//! so no entity hand-writes the copy-and-flag pattern.

use crate::error::MappingError;
use crate::shared::serde_util;
use chrono::{DateTime, Utc};
use serde_json::Value;

/// A JSON object as received from the server.
pub type WireRecord = serde_json::Map<String, Value>;

/// One row of an entity's field table.
pub struct FieldSpec<E> {
    /// Wire key, matched exactly (keys are case-sensitive).
    pub key: &'static str,
    /// Decodes the value into the entity and raises the presence flag.
    pub apply: fn(&mut E, &Value) -> Result<(), String>,
}

/// An entity produced from a sparse wire record.
pub trait MappedEntity: Default + Sized + 'static {
    const FIELDS: &'static [FieldSpec<Self>];

    fn from_record(record: &WireRecord) -> Result<Self, MappingError> {
        map_record(record)
    }

    fn from_value(value: &Value) -> Result<Self, MappingError> {
        match value {
            Value::Object(record) => Self::from_record(record),
            _ => Err(MappingError::NotAnObject),
        }
    }
}

/// Projects `record` into `E`, field by field.
///
/// Absent and `null` keys are skipped, leaving the zero value and a `false`
/// flag. The first field that fails to decode fails the whole record.
pub fn map_record<E: MappedEntity>(record: &WireRecord) -> Result<E, MappingError> {
    let mut entity = E::default();
    for field in E::FIELDS {
        match record.get(field.key) {
            None | Some(Value::Null) => {}
            Some(value) => (field.apply)(&mut entity, value)
                .map_err(|reason| MappingError::Field { key: field.key, reason })?,
        }
    }
    Ok(entity)
}

/// Maps every element of a JSON array; a non-array maps to an empty list.
pub fn map_list<E: MappedEntity>(value: Option<&Value>) -> Result<Vec<E>, MappingError> {
    match value {
        Some(Value::Array(items)) => items.iter().map(E::from_value).collect(),
        _ => Ok(Vec::new()),
    }
}

// ─── Scalar decoding ─────────────────────────────────────────────────────────

/// Decoding of a single non-null JSON value into a field type.
///
/// Numbers are accepted as JSON numbers or numeric strings, and strings
/// accept numbers, since the server is not consistent about either.
pub trait FromWireValue: Sized {
    fn from_wire(value: &Value) -> Result<Self, String>;
}

impl FromWireValue for f64 {
    fn from_wire(value: &Value) -> Result<Self, String> {
        match value {
            Value::Number(n) => n.as_f64().ok_or_else(|| format!("not a float: {}", n)),
            Value::String(s) => s
                .trim()
                .parse::<f64>()
                .map_err(|_| format!("not a float: {:?}", s)),
            other => Err(format!("expected number, got {}", kind(other))),
        }
    }
}

impl FromWireValue for i64 {
    fn from_wire(value: &Value) -> Result<Self, String> {
        match value {
            Value::Number(n) => n
                .as_i64()
                .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64))
                .ok_or_else(|| format!("not an integer: {}", n)),
            Value::String(s) => s
                .trim()
                .parse::<i64>()
                .map_err(|_| format!("not an integer: {:?}", s)),
            other => Err(format!("expected integer, got {}", kind(other))),
        }
    }
}

impl FromWireValue for i32 {
    fn from_wire(value: &Value) -> Result<Self, String> {
        let wide = i64::from_wire(value)?;
        i32::try_from(wide).map_err(|_| format!("integer out of range: {}", wide))
    }
}

impl FromWireValue for bool {
    fn from_wire(value: &Value) -> Result<Self, String> {
        match value {
            Value::Bool(b) => Ok(*b),
            Value::String(s) if s.eq_ignore_ascii_case("true") => Ok(true),
            Value::String(s) if s.eq_ignore_ascii_case("false") => Ok(false),
            other => Err(format!("expected bool, got {}", kind(other))),
        }
    }
}

impl FromWireValue for String {
    fn from_wire(value: &Value) -> Result<Self, String> {
        match value {
            Value::String(s) => Ok(s.clone()),
            Value::Number(n) => Ok(n.to_string()),
            Value::Bool(b) => Ok(b.to_string()),
            other => Err(format!("expected string, got {}", kind(other))),
        }
    }
}

/// ISO-8601 strings or epoch milliseconds.
impl FromWireValue for DateTime<Utc> {
    fn from_wire(value: &Value) -> Result<Self, String> {
        match value {
            Value::String(s) => serde_util::parse_iso_time(s),
            Value::Number(_) => serde_util::from_epoch_millis(i64::from_wire(value)?),
            other => Err(format!("expected timestamp, got {}", kind(other))),
        }
    }
}

/// `MMddyyyyHHmmss[fff]` strings, used by order and position tables.
pub fn compact_time(value: &Value) -> Result<DateTime<Utc>, String> {
    match value {
        Value::String(s) => serde_util::parse_compact_time(s),
        other => Err(format!("expected compact time string, got {}", kind(other))),
    }
}

/// `yyyyMMdd` settlement dates.
pub fn value_date(value: &Value) -> Result<DateTime<Utc>, String> {
    match value {
        Value::String(s) => serde_util::parse_value_date(s),
        Value::Number(_) => serde_util::parse_value_date(&String::from_wire(value)?),
        other => Err(format!("expected value date, got {}", kind(other))),
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

// ─── Declaration macro ───────────────────────────────────────────────────────

macro_rules! wire_decoder {
    ($ty:ty) => {
        <$ty as $crate::domain::mapper::FromWireValue>::from_wire
    };
    ($ty:ty, $decode:path) => {
        $decode
    };
}

/// Declares a presence-tracked entity and its field table.
///
/// ```rust,ignore
/// presence_entity! {
///     pub struct Quote {
///         "bid" => bid / bid_present: f64,
///         "time" (compact_time) => time / time_present: DateTime<Utc>,
///     }
/// }
/// ```
///
/// A parenthesised path after the key overrides the type's default
/// [`FromWireValue`] decoder.
macro_rules! presence_entity {
    (
        $(#[$meta:meta])*
        pub struct $name:ident {
            $( $key:literal $( ($decode:path) )? => $field:ident / $flag:ident : $ty:ty ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Default, PartialEq)]
        pub struct $name {
            $(
                pub $field: $ty,
                pub $flag: bool,
            )*
        }

        impl $crate::domain::mapper::MappedEntity for $name {
            const FIELDS: &'static [$crate::domain::mapper::FieldSpec<Self>] = &[
                $(
                    $crate::domain::mapper::FieldSpec {
                        key: $key,
                        apply: |entity: &mut $name, value: &serde_json::Value| {
                            let decode: fn(&serde_json::Value) -> Result<$ty, String> =
                                $crate::domain::mapper::wire_decoder!($ty $(, $decode)?);
                            entity.$field = decode(value)?;
                            entity.$flag = true;
                            Ok(())
                        },
                    },
                )*
            ];
        }
    };
}

pub(crate) use presence_entity;
pub(crate) use wire_decoder;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    presence_entity! {
        /// Three-field fixture.
        pub struct Abc {
            "a" => a / a_present: i32,
            "b" => b / b_present: String,
            "c" => c / c_present: f64,
        }
    }

    presence_entity! {
        pub struct Timed {
            "time" (compact_time) => time / time_present: DateTime<Utc>,
            "updated" => updated / updated_present: DateTime<Utc>,
        }
    }

    fn record(v: Value) -> WireRecord {
        match v {
            Value::Object(m) => m,
            _ => panic!("fixture must be an object"),
        }
    }

    fn wire_keys<E: MappedEntity>() -> Vec<&'static str> {
        let fields: &'static [FieldSpec<E>] = E::FIELDS;
        fields.iter().map(|f| f.key).collect()
    }

    #[test]
    fn test_field_table_is_reachable_generically() {
        assert_eq!(wire_keys::<Abc>(), vec!["a", "b", "c"]);
        assert_eq!(wire_keys::<Timed>(), vec!["time", "updated"]);
    }

    #[test]
    fn test_presence_flags_follow_supplied_keys() {
        let abc = Abc::from_record(&record(json!({"a": 7, "c": 0.5}))).unwrap();
        assert!(abc.a_present);
        assert!(!abc.b_present);
        assert!(abc.c_present);
        assert_eq!(abc.a, 7);
        assert_eq!(abc.b, String::new());
        assert_eq!(abc.c, 0.5);
    }

    #[test]
    fn test_null_counts_as_absent() {
        let abc = Abc::from_record(&record(json!({"a": null, "b": "x"}))).unwrap();
        assert!(!abc.a_present);
        assert_eq!(abc.a, 0);
        assert!(abc.b_present);
    }

    #[test]
    fn test_explicit_zero_is_present() {
        let abc = Abc::from_record(&record(json!({"a": 0, "c": 0}))).unwrap();
        assert!(abc.a_present && abc.c_present);
        assert_eq!(abc, Abc { a_present: true, c_present: true, ..Abc::default() });
    }

    #[test]
    fn test_unknown_keys_are_ignored() {
        let abc = Abc::from_record(&record(json!({"z": 1, "A": 2}))).unwrap();
        assert_eq!(abc, Abc::default());
    }

    #[test]
    fn test_lenient_scalars() {
        let abc = Abc::from_record(&record(json!({"a": "42", "b": 17, "c": "1.25"}))).unwrap();
        assert_eq!((abc.a, abc.b.as_str(), abc.c), (42, "17", 1.25));
    }

    #[test]
    fn test_bad_field_fails_record_with_key() {
        let err = Abc::from_record(&record(json!({"a": "seven"}))).unwrap_err();
        match err {
            MappingError::Field { key, .. } => assert_eq!(key, "a"),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_custom_decoder_overrides_default() {
        let t = Timed::from_record(&record(json!({
            "time": "01022024030405",
            "updated": "2024-01-02T03:04:05Z"
        })))
        .unwrap();
        assert_eq!(t.time, t.updated);
        assert!(t.time_present && t.updated_present);
    }

    #[test]
    fn test_from_value_rejects_non_object() {
        assert_eq!(Abc::from_value(&json!([1, 2])), Err(MappingError::NotAnObject));
    }

    #[test]
    fn test_map_list_missing_is_empty() {
        assert!(map_list::<Abc>(None).unwrap().is_empty());
        let list = map_list::<Abc>(Some(&json!([{"a": 1}, {"b": "x"}]))).unwrap();
        assert_eq!(list.len(), 2);
    }

    #[test]
    fn test_i32_rejects_fraction_and_overflow() {
        assert!(i32::from_wire(&json!(1.5)).is_err());
        assert!(i32::from_wire(&json!(1u64 << 40)).is_err());
        assert_eq!(i32::from_wire(&json!(3.0)).unwrap(), 3);
    }
}
