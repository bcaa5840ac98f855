//! Value module.

use std::fmt;

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

/// Literal payload of a constant expression.
///
/// The rewriter itself only ever synthesizes `Null` (for omitted
/// destination columns) and `String` (for static partition values);
/// the remaining variants cover literals already present in the
/// analyzed plan.
#[derive(Clone, Debug, Deserialize, Hash, PartialEq, Eq, Serialize)]
pub enum Value {
    Boolean(bool),
    Integer(i64),
    Null,
    String(SmolStr),
    Unsigned(u64),
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Value::Boolean(v) => write!(f, "{v}"),
            Value::Integer(v) => write!(f, "{v}"),
            Value::Null => write!(f, "NULL"),
            Value::String(v) => write!(f, "'{v}'"),
            Value::Unsigned(v) => write!(f, "{v}"),
        }
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.into())
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Boolean(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Integer(v)
    }
}

impl From<u64> for Value {
    fn from(v: u64) -> Self {
        Value::Unsigned(v)
    }
}

#[cfg(test)]
mod tests;
