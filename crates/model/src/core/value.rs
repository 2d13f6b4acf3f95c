use crate::core::data_type::DataType;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A converted cell. `Null` stands for an absent value (empty, unknown
/// column, or not convertible to the requested type).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Value {
    Long(i64),
    Int(i32),
    /// Milliseconds since the Unix epoch.
    Date(i64),
    String(String),
    Null,
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Long(v) | Value::Date(v) => Some(*v),
            Value::Int(v) => Some(*v as i64),
            Value::String(_) | Value::Null => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(v) => Some(v),
            _ => None,
        }
    }

    /// Date values as a UTC timestamp; `None` for anything else or
    /// out-of-range millis.
    pub fn as_timestamp(&self) -> Option<DateTime<Utc>> {
        match self {
            Value::Date(ms) => DateTime::<Utc>::from_timestamp_millis(*ms),
            _ => None,
        }
    }

    pub fn data_type(&self) -> Option<DataType> {
        match self {
            Value::Long(_) => Some(DataType::Long),
            Value::Int(_) => Some(DataType::Int),
            Value::Date(_) => Some(DataType::Date),
            Value::String(_) => Some(DataType::String),
            Value::Null => None,
        }
    }
}

impl From<Option<i64>> for Value {
    fn from(v: Option<i64>) -> Self {
        v.map(Value::Long).unwrap_or(Value::Null)
    }
}

impl From<Option<i32>> for Value {
    fn from(v: Option<i32>) -> Self {
        v.map(Value::Int).unwrap_or(Value::Null)
    }
}

impl From<Option<&str>> for Value {
    fn from(v: Option<&str>) -> Self {
        v.map(|s| Value::String(s.to_string()))
            .unwrap_or(Value::Null)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Long(v) => write!(f, "{v}"),
            Value::Int(v) => write!(f, "{v}"),
            Value::Date(v) => match self.as_timestamp() {
                Some(ts) => write!(f, "{}", ts.to_rfc3339()),
                None => write!(f, "{v}"),
            },
            Value::String(v) => write!(f, "{v}"),
            Value::Null => write!(f, "NULL"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FieldValue {
    pub name: String,
    pub value: Value,
    pub data_type: DataType,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_date_display_is_rfc3339() {
        let v = Value::Date(86_400_000);
        assert_eq!(v.to_string(), "1970-01-02T00:00:00+00:00");
    }

    #[test]
    fn test_option_conversions() {
        assert_eq!(Value::from(Some(7_i64)), Value::Long(7));
        assert_eq!(Value::from(None::<i32>), Value::Null);
        assert_eq!(Value::from(Some("x")), Value::String("x".into()));
        assert!(Value::from(None::<&str>).is_null());
    }

    #[test]
    fn test_as_i64_widens_int() {
        assert_eq!(Value::Int(-3).as_i64(), Some(-3));
        assert_eq!(Value::String("3".into()).as_i64(), None);
    }
}
