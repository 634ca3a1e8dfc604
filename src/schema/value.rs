//! Scalar field values
//!
//! A value is either text, a number, or one of the two deferred-sizing
//! sentinels. Serialized form is a plain JSON string or number.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Literal spelling of the autosize sentinel
pub const AUTOSIZE: &str = "autosize";
/// Literal spelling of the autocalculate sentinel
pub const AUTOCALCULATE: &str = "autocalculate";

/// A single field value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "serde_json::Value", into = "serde_json::Value")]
pub enum Value {
    /// Free text, node names and object references
    Text(String),
    /// 64-bit floating point
    Real(f64),
    /// 64-bit signed integer
    Integer(i64),
    /// Size this later
    Autosize,
    /// Compute this later
    Autocalculate,
}

impl Value {
    /// Returns true for `Autosize` and `Autocalculate`
    pub fn is_sentinel(&self) -> bool {
        matches!(self, Value::Autosize | Value::Autocalculate)
    }

    /// Returns the text content, or the sentinel spelling
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            Value::Autosize => Some(AUTOSIZE),
            Value::Autocalculate => Some(AUTOCALCULATE),
            Value::Real(_) | Value::Integer(_) => None,
        }
    }

    /// Returns the numeric content widened to f64
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Real(r) => Some(*r),
            Value::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// Returns the integer content
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Short type name for error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Text(_) => "text",
            Value::Real(_) => "real",
            Value::Integer(_) => "integer",
            Value::Autosize | Value::Autocalculate => "sentinel",
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Text(s) => write!(f, "{}", s),
            Value::Real(r) => write!(f, "{}", r),
            Value::Integer(i) => write!(f, "{}", i),
            Value::Autosize => f.write_str(AUTOSIZE),
            Value::Autocalculate => f.write_str(AUTOCALCULATE),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<f64> for Value {
    fn from(r: f64) -> Self {
        Value::Real(r)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Integer(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Integer(i64::from(i))
    }
}

impl TryFrom<serde_json::Value> for Value {
    type Error = String;

    fn try_from(json: serde_json::Value) -> Result<Self, Self::Error> {
        Value::try_from(&json)
    }
}

impl TryFrom<&serde_json::Value> for Value {
    type Error = String;

    fn try_from(json: &serde_json::Value) -> Result<Self, Self::Error> {
        match json {
            serde_json::Value::String(s) => Ok(Value::Text(s.clone())),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Ok(Value::Integer(i))
                } else if let Some(r) = n.as_f64() {
                    Ok(Value::Real(r))
                } else {
                    Err(format!("number {} out of range", n))
                }
            }
            other => Err(format!("expected string or number, got {}", json_type_name(other))),
        }
    }
}

impl From<Value> for serde_json::Value {
    fn from(value: Value) -> Self {
        match value {
            Value::Text(s) => serde_json::Value::String(s),
            Value::Real(r) => serde_json::Number::from_f64(r)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Value::Integer(i) => serde_json::Value::from(i),
            Value::Autosize => serde_json::Value::String(AUTOSIZE.into()),
            Value::Autocalculate => serde_json::Value::String(AUTOCALCULATE.into()),
        }
    }
}

/// Returns the JSON type name for error messages.
pub(crate) fn json_type_name(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "bool",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_sentinel_display() {
        assert_eq!(Value::Autocalculate.to_string(), "autocalculate");
        assert_eq!(Value::Autosize.to_string(), "autosize");
        assert_eq!(Value::Autosize.as_str(), Some("autosize"));
        assert!(Value::Autosize.is_sentinel());
        assert!(!Value::Real(1.0).is_sentinel());
    }

    #[test]
    fn test_from_json_scalars() {
        assert_eq!(Value::try_from(json!("abc")).unwrap(), Value::Text("abc".into()));
        assert_eq!(Value::try_from(json!(3)).unwrap(), Value::Integer(3));
        assert_eq!(Value::try_from(json!(2.5)).unwrap(), Value::Real(2.5));
    }

    #[test]
    fn test_from_json_rejects_composites() {
        let err = Value::try_from(json!([1, 2])).unwrap_err();
        assert!(err.contains("array"));
        assert!(Value::try_from(json!(null)).is_err());
        assert!(Value::try_from(json!(true)).is_err());
    }

    #[test]
    fn test_serde_roundtrip_in_struct() {
        #[derive(Serialize, Deserialize)]
        struct Holder {
            default: Value,
        }

        let holder: Holder = serde_json::from_str(r#"{"default": -1.5}"#).unwrap();
        assert_eq!(holder.default, Value::Real(-1.5));

        let out = serde_json::to_value(Holder { default: Value::Autosize }).unwrap();
        assert_eq!(out["default"], "autosize");
    }

    #[test]
    fn test_numeric_accessors() {
        assert_eq!(Value::Integer(4).as_f64(), Some(4.0));
        assert_eq!(Value::Integer(4).as_i64(), Some(4));
        assert_eq!(Value::Real(4.0).as_i64(), None);
        assert_eq!(Value::Text("4".into()).as_f64(), None);
    }
}
