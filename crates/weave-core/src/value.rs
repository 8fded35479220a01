//! Payloads held by scalar objects.

use std::fmt;

use crate::identifier::Id;

/// The closed set of values a scalar object can carry.
///
/// Scalar objects accept any variant regardless of their declared type;
/// the variant is informational only.
#[derive(Debug, Clone, PartialEq)]
pub enum ScalarValue {
    String(String),
    Float(f64),
    Boolean(bool),
    /// A symbol of an enum type, e.g. `TREBLE`.
    Enum(Id),
}

impl ScalarValue {
    /// Returns the string payload, if this is a string value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ScalarValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the float payload, if this is a float value.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            ScalarValue::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Returns the boolean payload, if this is a boolean value.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ScalarValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the enum symbol, if this is an enum value.
    pub fn as_enum(&self) -> Option<Id> {
        match self {
            ScalarValue::Enum(id) => Some(*id),
            _ => None,
        }
    }

    /// Short name of the payload kind, used in log output.
    pub fn kind_name(&self) -> &'static str {
        match self {
            ScalarValue::String(_) => "string",
            ScalarValue::Float(_) => "float",
            ScalarValue::Boolean(_) => "boolean",
            ScalarValue::Enum(_) => "enum",
        }
    }
}

impl fmt::Display for ScalarValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScalarValue::String(s) => write!(f, "\"{s}\""),
            ScalarValue::Float(n) => write!(f, "{n}"),
            ScalarValue::Boolean(b) => write!(f, "{b}"),
            ScalarValue::Enum(id) => write!(f, "{id}"),
        }
    }
}

impl From<&str> for ScalarValue {
    fn from(value: &str) -> Self {
        ScalarValue::String(value.to_string())
    }
}

impl From<String> for ScalarValue {
    fn from(value: String) -> Self {
        ScalarValue::String(value)
    }
}

impl From<f64> for ScalarValue {
    fn from(value: f64) -> Self {
        ScalarValue::Float(value)
    }
}

impl From<bool> for ScalarValue {
    fn from(value: bool) -> Self {
        ScalarValue::Boolean(value)
    }
}

impl From<Id> for ScalarValue {
    fn from(value: Id) -> Self {
        ScalarValue::Enum(value)
    }
}
