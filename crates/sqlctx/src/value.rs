//! Bound parameters and result cells.
//!
//! [`Value`] is the closed set of scalar kinds a driver has to support. Builder
//! methods take `impl Into<Value>`, so unsupported parameter types are rejected
//! at compile time instead of failing inside the driver.

use crate::error::{DbError, DbResult};
use chrono::{NaiveDate, NaiveDateTime};
use std::fmt;

/// A single SQL parameter or result cell.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    Text(String),
    Bytes(Vec<u8>),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
    Json(serde_json::Value),
}

impl Value {
    /// Returns true for SQL `NULL`.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Short name of the variant, used in decode error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::UInt(_) => "uint",
            Value::Float(_) => "float",
            Value::Text(_) => "text",
            Value::Bytes(_) => "bytes",
            Value::Date(_) => "date",
            Value::DateTime(_) => "datetime",
            Value::Json(_) => "json",
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("NULL"),
            Value::Bool(v) => write!(f, "{v}"),
            Value::Int(v) => write!(f, "{v}"),
            Value::UInt(v) => write!(f, "{v}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::Text(v) => write!(f, "{v:?}"),
            Value::Bytes(v) => write!(f, "<{} bytes>", v.len()),
            Value::Date(v) => write!(f, "{v}"),
            Value::DateTime(v) => write!(f, "{v}"),
            Value::Json(v) => write!(f, "{v}"),
        }
    }
}

macro_rules! impl_from_signed {
    ($($ty:ty),*) => {
        $(impl From<$ty> for Value {
            fn from(v: $ty) -> Self {
                Value::Int(i64::from(v))
            }
        })*
    };
}

macro_rules! impl_from_unsigned {
    ($($ty:ty),*) => {
        $(impl From<$ty> for Value {
            fn from(v: $ty) -> Self {
                Value::UInt(u64::from(v))
            }
        })*
    };
}

impl_from_signed!(i8, i16, i32, i64);
impl_from_unsigned!(u8, u16, u32, u64);

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Float(f64::from(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<&String> for Value {
    fn from(v: &String) -> Self {
        Value::Text(v.clone())
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Value::Bytes(v)
    }
}

impl From<&[u8]> for Value {
    fn from(v: &[u8]) -> Self {
        Value::Bytes(v.to_vec())
    }
}

impl From<NaiveDate> for Value {
    fn from(v: NaiveDate) -> Self {
        Value::Date(v)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(v: NaiveDateTime) -> Self {
        Value::DateTime(v)
    }
}

impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        Value::Json(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

/// Build a `Vec<Value>` from heterogeneous expressions.
///
/// ```ignore
/// ctx.where_("name = ? and age > ?", params!["alice", 18]);
/// ```
#[macro_export]
macro_rules! params {
    () => {
        ::std::vec::Vec::<$crate::Value>::new()
    };
    ($($value:expr),+ $(,)?) => {
        ::std::vec![$($crate::Value::from($value)),+]
    };
}

/// Conversion from a result cell into a Rust type.
///
/// `column` is only used to label decode errors.
pub trait FromValue: Sized {
    fn from_value(value: &Value, column: &str) -> DbResult<Self>;
}

fn mismatch(column: &str, expected: &str, got: &Value) -> DbError {
    DbError::decode(column, format!("expected {expected}, got {}", got.kind()))
}

macro_rules! impl_from_value_int {
    ($($ty:ty),*) => {
        $(impl FromValue for $ty {
            fn from_value(value: &Value, column: &str) -> DbResult<Self> {
                let out_of_range =
                    || DbError::decode(column, format!("{value} out of range for {}", stringify!($ty)));
                match value {
                    Value::Int(v) => <$ty>::try_from(*v).map_err(|_| out_of_range()),
                    Value::UInt(v) => <$ty>::try_from(*v).map_err(|_| out_of_range()),
                    Value::Bool(v) => Ok(<$ty>::from(*v)),
                    other => Err(mismatch(column, "integer", other)),
                }
            }
        })*
    };
}

impl_from_value_int!(i8, i16, i32, i64, u8, u16, u32, u64);

impl FromValue for bool {
    fn from_value(value: &Value, column: &str) -> DbResult<Self> {
        match value {
            Value::Bool(v) => Ok(*v),
            Value::Int(v) => Ok(*v != 0),
            Value::UInt(v) => Ok(*v != 0),
            other => Err(mismatch(column, "bool", other)),
        }
    }
}

impl FromValue for f64 {
    fn from_value(value: &Value, column: &str) -> DbResult<Self> {
        match value {
            Value::Float(v) => Ok(*v),
            Value::Int(v) => Ok(*v as f64),
            Value::UInt(v) => Ok(*v as f64),
            Value::Text(s) => s
                .parse()
                .map_err(|_| DbError::decode(column, format!("{s:?} is not a number"))),
            other => Err(mismatch(column, "float", other)),
        }
    }
}

impl FromValue for f32 {
    fn from_value(value: &Value, column: &str) -> DbResult<Self> {
        f64::from_value(value, column).map(|v| v as f32)
    }
}

impl FromValue for String {
    fn from_value(value: &Value, column: &str) -> DbResult<Self> {
        match value {
            Value::Text(s) => Ok(s.clone()),
            Value::Bytes(b) => String::from_utf8(b.clone())
                .map_err(|e| DbError::decode(column, e.to_string())),
            other => Err(mismatch(column, "text", other)),
        }
    }
}

impl FromValue for Vec<u8> {
    fn from_value(value: &Value, column: &str) -> DbResult<Self> {
        match value {
            Value::Bytes(b) => Ok(b.clone()),
            Value::Text(s) => Ok(s.clone().into_bytes()),
            other => Err(mismatch(column, "bytes", other)),
        }
    }
}

impl FromValue for NaiveDate {
    fn from_value(value: &Value, column: &str) -> DbResult<Self> {
        match value {
            Value::Date(d) => Ok(*d),
            Value::DateTime(dt) => Ok(dt.date()),
            other => Err(mismatch(column, "date", other)),
        }
    }
}

impl FromValue for NaiveDateTime {
    fn from_value(value: &Value, column: &str) -> DbResult<Self> {
        match value {
            Value::DateTime(dt) => Ok(*dt),
            other => Err(mismatch(column, "datetime", other)),
        }
    }
}

impl FromValue for serde_json::Value {
    fn from_value(value: &Value, column: &str) -> DbResult<Self> {
        match value {
            Value::Json(v) => Ok(v.clone()),
            Value::Text(s) => {
                serde_json::from_str(s).map_err(|e| DbError::decode(column, e.to_string()))
            }
            other => Err(mismatch(column, "json", other)),
        }
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: &Value, column: &str) -> DbResult<Self> {
        match value {
            Value::Null => Ok(None),
            other => T::from_value(other, column).map(Some),
        }
    }
}

impl FromValue for Value {
    fn from_value(value: &Value, _column: &str) -> DbResult<Self> {
        Ok(value.clone())
    }
}
