//! Scalar values moved between change records and the backing store.

use serde::{Deserialize, Serialize};

/// A scalar column value.
///
/// This is the narrow set of scalars the catalog core actually moves around:
/// change-record snapshots, stub keys, and predicate evaluation. Store
/// backends widen it as they see fit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    /// SQL NULL / absent.
    Null,
    /// Boolean.
    Bool(bool),
    /// Any integer width; stored widened to 64 bits.
    Int(i64),
    /// Floating point.
    Double(f64),
    /// Text.
    Text(String),
    /// UUID in canonical hyphenated form.
    Uuid(String),
    /// Unix-epoch seconds.
    Timestamp(i64),
}

impl Value {
    /// True if this is `Value::Null`.
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Boolean view; `None` for non-boolean or null values.
    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Integer view; `None` for non-integer or null values.
    #[must_use]
    pub const fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Text view covering both `Text` and `Uuid`.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) | Value::Uuid(s) => Some(s),
            _ => None,
        }
    }

    /// Render as a JSON fragment, for log snapshots and schema dumps.
    #[must_use]
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "null".to_string())
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(i64::from(v))
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}
