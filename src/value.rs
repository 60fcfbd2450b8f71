//! Stored values
//!
//! The value model for map entries: scalars, lists, and string-keyed
//! maps. Equality is structural (deep), never by identity, so two
//! independently built values with the same shape compare equal.
//!
//! Author: Moroya Sakamoto

use std::collections::BTreeMap;

use serde::ser::Error as _;
use serde::{Deserialize, Serialize, Serializer};

/// Value stored under a key
///
/// Serialized as plain JSON (`null`, `true`, `42`, `1.5`, `"text"`,
/// `[...]`, `{...}`). Non-finite floats have no JSON form; encoding one
/// fails instead of writing `null`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// Explicit null (distinct from an absent key)
    Null,
    /// Boolean
    Bool(bool),
    /// Signed integer
    Int(i64),
    /// Float
    #[serde(serialize_with = "finite_float")]
    Float(f64),
    /// UTF-8 text
    Text(String),
    /// Ordered list
    List(Vec<Value>),
    /// String-keyed map, sorted by key
    Map(BTreeMap<String, Value>),
}

impl Value {
    /// Recursive structural equality
    ///
    /// Scalars compare by value (NaN equals NaN, `0.0` equals `-0.0`),
    /// lists element by element, maps key by key. Values of different
    /// variants are never equal, so `Int(1) != Float(1.0)`.
    pub fn deep_eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b || (a.is_nan() && b.is_nan()),
            (Value::Text(a), Value::Text(b)) => a == b,
            (Value::List(a), Value::List(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.deep_eq(y))
            }
            (Value::Map(a), Value::Map(b)) => {
                a.len() == b.len()
                    && a.iter()
                        .zip(b)
                        .all(|((ka, va), (kb, vb))| ka == kb && va.deep_eq(vb))
            }
            _ => false,
        }
    }

    /// True for `Value::Null`
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Borrow the text payload, if any
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Integer payload, if any
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(v) => Some(*v),
            _ => None,
        }
    }
}

/// NaN and ±inf would decode as `null`, so they are refused.
fn finite_float<S: Serializer>(v: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    if v.is_finite() {
        serializer.serialize_f64(*v)
    } else {
        Err(S::Error::custom(format!("non-finite float {v} has no JSON form")))
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.deep_eq(other)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(String::from(v))
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
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

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<Vec<Value>> for Value {
    fn from(v: Vec<Value>) -> Self {
        Value::List(v)
    }
}

impl From<BTreeMap<String, Value>> for Value {
    fn from(v: BTreeMap<String, Value>) -> Self {
        Value::Map(v)
    }
}
