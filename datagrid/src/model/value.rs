//! Value enum for dynamic field values

use std::cmp::Ordering;
use std::collections::HashMap;

use chrono::DateTime;
use chrono::NaiveDate;
use chrono::NaiveDateTime;
use chrono::TimeZone;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

use crate::column::DataType;

/// A dynamic value that can hold any cell of a row.
///
/// Rows are heterogeneous key/value maps, so every cell is stored as a
/// `Value`. JSON input maps onto the variants directly; date-times only
/// appear when constructed from Rust, since JSON strings always stay
/// [`Value::String`] and are coerced on demand when a column compares them
/// as dates.
///
/// # Type Mapping
///
/// | JSON | Rust Variant |
/// |------|--------------|
/// | null | `Null` |
/// | true/false | `Bool` |
/// | integer | `Int` |
/// | fractional number | `Float` |
/// | string | `String` |
/// | array | `List` |
/// | object | `Object` |
///
/// # Example
///
/// ```
/// use datagrid::model::Value;
///
/// let name = Value::from("Contoso");
/// let age = Value::from(42);
/// let empty = Value::Null;
/// assert!(empty.is_blank());
/// assert_eq!(age.as_f64(), Some(42.0));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// Null/empty value.
    Null,
    /// Boolean value.
    Bool(bool),
    /// 64-bit integer.
    Int(i64),
    /// 64-bit floating point.
    Float(f64),
    /// String value.
    String(String),
    /// Date and time in UTC.
    DateTime(DateTime<Utc>),
    /// Ordered list of values.
    List(Vec<Value>),
    /// Nested object (addressed with dotted column names).
    Object(HashMap<String, Value>),
}

impl Value {
    /// Returns `true` if this is a null value.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Returns `true` for null, whitespace-only strings and empty lists.
    ///
    /// A blank filter value is treated as "no filter".
    pub fn is_blank(&self) -> bool {
        match self {
            Value::Null => true,
            Value::String(s) => s.trim().is_empty(),
            Value::List(items) => items.is_empty(),
            _ => false,
        }
    }

    /// Returns the type name of this value.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::DateTime(_) => "datetime",
            Value::List(_) => "list",
            Value::Object(_) => "object",
        }
    }

    /// Returns the string slice if this is a string value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Interprets the value as a number.
    ///
    /// Strings are parsed after trimming; booleans and dates are not numbers.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(v) => Some(*v as f64),
            Value::Float(v) => Some(*v),
            Value::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        }
    }

    /// Interprets the value as a point in time.
    ///
    /// Accepts RFC 3339 strings, `YYYY-MM-DD`, `YYYY-MM-DDTHH:MM[:SS]`
    /// (as produced by date and datetime-local inputs) and integers holding
    /// epoch milliseconds.
    pub fn as_datetime(&self) -> Option<DateTime<Utc>> {
        match self {
            Value::DateTime(v) => Some(*v),
            Value::Int(ms) => Utc.timestamp_millis_opt(*ms).single(),
            Value::String(s) => parse_datetime(s.trim()),
            _ => None,
        }
    }

    /// Renders the value the way a text cell displays it.
    pub fn to_text(&self) -> String {
        match self {
            Value::Null => String::new(),
            Value::Bool(v) => v.to_string(),
            Value::Int(v) => v.to_string(),
            Value::Float(v) => v.to_string(),
            Value::String(s) => s.clone(),
            Value::DateTime(v) => v.to_rfc3339(),
            Value::List(items) => items
                .iter()
                .map(Value::to_text)
                .collect::<Vec<_>>()
                .join(", "),
            Value::Object(_) => serde_json::to_string(self).unwrap_or_default(),
        }
    }

    /// Converts the value into the representation used by `data_type`.
    ///
    /// Values that cannot be converted are kept as they are; comparisons
    /// against them then fall back to text ordering.
    pub fn coerce(&self, data_type: Option<DataType>) -> Value {
        match data_type {
            Some(DataType::Number) => match self.as_f64() {
                Some(v) => Value::Float(v),
                None => self.clone(),
            },
            Some(DataType::Date) => match self.as_datetime() {
                Some(v) => Value::DateTime(v),
                None => self.clone(),
            },
            Some(DataType::Text) => match self {
                Value::Null => Value::Null,
                other => Value::String(other.to_text()),
            },
            None => self.clone(),
        }
    }

    /// Compares two values under the ordering implied by `data_type`.
    ///
    /// Returns `None` when either side cannot be interpreted as that type.
    /// Text comparison is case-insensitive.
    pub fn compare(&self, other: &Value, data_type: Option<DataType>) -> Option<Ordering> {
        match data_type {
            Some(DataType::Number) => self.as_f64()?.partial_cmp(&other.as_f64()?),
            Some(DataType::Date) => Some(self.as_datetime()?.cmp(&other.as_datetime()?)),
            Some(DataType::Text) | None => {
                if self.is_null() || other.is_null() {
                    return None;
                }
                Some(
                    self.to_text()
                        .to_lowercase()
                        .cmp(&other.to_text().to_lowercase()),
                )
            }
        }
    }

    /// Total ordering used for sorting.
    ///
    /// Nulls come first, then values that fit `data_type` in typed order,
    /// then the values that do not fit, in text order.
    pub fn sort_cmp(&self, other: &Value, data_type: Option<DataType>) -> Ordering {
        match (self.is_null(), other.is_null()) {
            (true, true) => return Ordering::Equal,
            (true, false) => return Ordering::Less,
            (false, true) => return Ordering::Greater,
            _ => {}
        }
        match (self.fits(data_type), other.fits(data_type)) {
            (true, true) => self.compare(other, data_type),
            (true, false) => Some(Ordering::Less),
            (false, true) => Some(Ordering::Greater),
            (false, false) => self.compare(other, None),
        }
        .unwrap_or(Ordering::Equal)
    }

    /// Returns `true` if the value can be compared as `data_type`.
    fn fits(&self, data_type: Option<DataType>) -> bool {
        match data_type {
            Some(DataType::Number) => self.as_f64().is_some_and(|v| !v.is_nan()),
            Some(DataType::Date) => self.as_datetime().is_some(),
            Some(DataType::Text) | None => true,
        }
    }
}

fn parse_datetime(s: &str) -> Option<DateTime<Utc>> {
    if s.is_empty() {
        return None;
    }
    if let Ok(v) = DateTime::parse_from_rfc3339(s) {
        return Some(v.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(v) = NaiveDateTime::parse_from_str(s, format) {
            return Some(v.and_utc());
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|v| v.and_utc())
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_text())
    }
}

// =============================================================================
// From implementations
// =============================================================================

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v.into())
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Value::Int(v.into())
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(v: DateTime<Utc>) -> Self {
        Value::DateTime(v)
    }
}

impl From<Vec<Value>> for Value {
    fn from(v: Vec<Value>) -> Self {
        Value::List(v)
    }
}

impl From<super::Row> for Value {
    fn from(v: super::Row) -> Self {
        Value::Object(v.into_fields())
    }
}

impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        match v {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::Int(i),
                None => n.as_f64().map(Value::Float).unwrap_or(Value::Null),
            },
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(arr) => Value::List(arr.into_iter().map(Value::from).collect()),
            serde_json::Value::Object(obj) => {
                Value::Object(obj.into_iter().map(|(k, v)| (k, Value::from(v))).collect())
            }
        }
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        match v {
            Some(inner) => inner.into(),
            None => Value::Null,
        }
    }
}

impl Default for Value {
    fn default() -> Self {
        Value::Null
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_values() {
        assert!(Value::Null.is_blank());
        assert!(Value::from("   ").is_blank());
        assert!(Value::List(vec![]).is_blank());
        assert!(!Value::from(0).is_blank());
        assert!(!Value::from(false).is_blank());
    }

    #[test]
    fn test_numeric_compare_is_not_lexicographic() {
        let nine = Value::from("9");
        let ten = Value::from(10);
        assert_eq!(
            nine.compare(&ten, Some(DataType::Number)),
            Some(Ordering::Less)
        );
        assert_eq!(nine.compare(&ten, None), Some(Ordering::Greater));
    }

    #[test]
    fn test_date_parsing() {
        let date = Value::from("2024-03-01").as_datetime().unwrap();
        let local = Value::from("2024-03-01T10:30").as_datetime().unwrap();
        assert!(date < local);
        assert!(Value::from("yesterday").as_datetime().is_none());
    }

    #[test]
    fn test_coerce_keeps_unparseable_values() {
        assert_eq!(
            Value::from("12.5").coerce(Some(DataType::Number)),
            Value::Float(12.5)
        );
        assert_eq!(
            Value::from("abc").coerce(Some(DataType::Number)),
            Value::from("abc")
        );
    }

    #[test]
    fn test_sort_cmp_nulls_first() {
        assert_eq!(
            Value::Null.sort_cmp(&Value::from(1), Some(DataType::Number)),
            Ordering::Less
        );
    }

    #[test]
    fn test_sort_cmp_is_total_over_mixed_values() {
        let values: Vec<Value> = ["9", "10", "1a", "abc", "-2", "NaN", "", "7.5"]
            .into_iter()
            .map(Value::from)
            .chain([Value::Float(f64::NAN), Value::Int(3), Value::Null])
            .collect();
        let number = Some(DataType::Number);
        for a in &values {
            for b in &values {
                assert_eq!(a.sort_cmp(b, number), b.sort_cmp(a, number).reverse());
                for c in &values {
                    if a.sort_cmp(b, number).is_le() && b.sort_cmp(c, number).is_le() {
                        assert!(a.sort_cmp(c, number).is_le(), "{a:?} {b:?} {c:?}");
                    }
                }
            }
        }

        let mut sorted = values.clone();
        sorted.sort_by(|a, b| a.sort_cmp(b, number));
        let texts: Vec<String> = sorted.iter().map(Value::to_text).collect();
        assert_eq!(
            texts,
            ["", "-2", "3", "7.5", "9", "10", "", "1a", "abc", "NaN", "NaN"]
        );
    }

    #[test]
    fn test_deserialize_json() {
        let value: Value = serde_json::from_str(r#"{"a": {"b": [1, 2.5, "x", null]}}"#).unwrap();
        let Value::Object(obj) = value else {
            panic!("expected object");
        };
        let Some(Value::Object(inner)) = obj.get("a") else {
            panic!("expected nested object");
        };
        assert_eq!(
            inner.get("b"),
            Some(&Value::List(vec![
                Value::Int(1),
                Value::Float(2.5),
                Value::from("x"),
                Value::Null
            ]))
        );
    }
}
