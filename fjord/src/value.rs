//! Value types for SQL parameters and result columns

use crate::{Error, Result};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// A SQL value that can be bound as a parameter, interpolated as a literal,
/// or read back from a result column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    /// Null value
    Null,
    /// Boolean value
    Bool(bool),
    /// 32-bit integer
    I32(i32),
    /// 64-bit integer
    I64(i64),
    /// Unsigned 64-bit integer
    U64(u64),
    /// 32-bit float
    F32(f32),
    /// 64-bit float
    F64(f64),
    /// String value
    String(String),
    /// Bytes value
    Bytes(Vec<u8>),
    /// Timestamp, UTC wall clock
    Time(NaiveDateTime),
    /// JSON value
    Json(serde_json::Value),
    /// Array of values, expanded into a parenthesized list
    Array(Vec<Value>),
    /// Driver-native value that is always bound, never rendered as a literal
    #[serde(skip)]
    Opaque(Opaque),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Get the SQL type name for this value
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "NULL",
            Value::Bool(_) => "BOOLEAN",
            Value::I32(_) => "INTEGER",
            Value::I64(_) => "BIGINT",
            Value::U64(_) => "BIGINT UNSIGNED",
            Value::F32(_) => "REAL",
            Value::F64(_) => "DOUBLE PRECISION",
            Value::String(_) => "TEXT",
            Value::Bytes(_) => "BYTEA",
            Value::Time(_) => "TIMESTAMP",
            Value::Json(_) => "JSON",
            Value::Array(_) => "ARRAY",
            Value::Opaque(_) => "OPAQUE",
        }
    }

    /// Extract array values if this is an Array variant
    pub fn as_array(&self) -> Option<&Vec<Value>> {
        match self {
            Value::Array(arr) => Some(arr),
            _ => None,
        }
    }

    fn as_text(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            Value::Bytes(b) => std::str::from_utf8(b).ok(),
            _ => None,
        }
    }
}

/// A value owned by the driver layer and handed through untouched.
#[derive(Clone)]
pub struct Opaque {
    type_name: &'static str,
    inner: Arc<dyn Any + Send + Sync>,
}

impl Opaque {
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self {
            type_name: std::any::type_name::<T>(),
            inner: Arc::new(value),
        }
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.inner.downcast_ref::<T>()
    }
}

impl fmt::Debug for Opaque {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Opaque").field(&self.type_name).finish()
    }
}

impl PartialEq for Opaque {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

/// Conversion of a Rust value into a SQL [`Value`].
///
/// Takes `&self` so record fields can be read without moving them out.
pub trait ToValue {
    fn to_value(&self) -> Value;
}

/// Conversion of a SQL [`Value`] into a Rust value.
pub trait FromValue: Sized {
    fn from_value(value: Value) -> Result<Self>;
}

impl<T: ToValue + ?Sized> ToValue for &T {
    fn to_value(&self) -> Value {
        (**self).to_value()
    }
}

impl<T: ToValue> ToValue for Option<T> {
    fn to_value(&self) -> Value {
        match self {
            Some(val) => val.to_value(),
            None => Value::Null,
        }
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Null => Ok(None),
            other => T::from_value(other).map(Some),
        }
    }
}

impl ToValue for Value {
    fn to_value(&self) -> Value {
        self.clone()
    }
}

impl FromValue for Value {
    fn from_value(value: Value) -> Result<Self> {
        Ok(value)
    }
}

macro_rules! impl_to_value {
    ($($ty:ty => |$v:ident| $conv:expr),* $(,)?) => {
        $(
            impl ToValue for $ty {
                fn to_value(&self) -> Value {
                    let $v = self;
                    $conv
                }
            }

            impl From<$ty> for Value {
                fn from(val: $ty) -> Self {
                    val.to_value()
                }
            }
        )*
    };
}

impl_to_value! {
    () => |_v| Value::Null,
    bool => |v| Value::Bool(*v),
    i8 => |v| Value::I32(i32::from(*v)),
    i16 => |v| Value::I32(i32::from(*v)),
    i32 => |v| Value::I32(*v),
    i64 => |v| Value::I64(*v),
    isize => |v| Value::I64(*v as i64),
    u8 => |v| Value::I32(i32::from(*v)),
    u16 => |v| Value::I32(i32::from(*v)),
    u32 => |v| Value::I64(i64::from(*v)),
    u64 => |v| Value::U64(*v),
    usize => |v| Value::U64(*v as u64),
    f32 => |v| Value::F32(*v),
    f64 => |v| Value::F64(*v),
    String => |v| Value::String(v.clone()),
    Vec<u8> => |v| Value::Bytes(v.clone()),
    NaiveDateTime => |v| Value::Time(*v),
    DateTime<Utc> => |v| Value::Time(v.naive_utc()),
    serde_json::Value => |v| Value::Json(v.clone()),
    Vec<i32> => |v| Value::Array(v.iter().map(ToValue::to_value).collect()),
    Vec<i64> => |v| Value::Array(v.iter().map(ToValue::to_value).collect()),
    Vec<u64> => |v| Value::Array(v.iter().map(ToValue::to_value).collect()),
    Vec<f64> => |v| Value::Array(v.iter().map(ToValue::to_value).collect()),
    Vec<String> => |v| Value::Array(v.iter().map(ToValue::to_value).collect()),
    Vec<&str> => |v| Value::Array(v.iter().map(ToValue::to_value).collect()),
    Vec<Value> => |v| Value::Array(v.clone()),
}

impl ToValue for str {
    fn to_value(&self) -> Value {
        Value::String(self.to_string())
    }
}

impl From<&str> for Value {
    fn from(val: &str) -> Self {
        Value::String(val.to_string())
    }
}

impl ToValue for [u8] {
    fn to_value(&self) -> Value {
        Value::Bytes(self.to_vec())
    }
}

impl ToValue for NaiveDate {
    fn to_value(&self) -> Value {
        match self.and_hms_opt(0, 0, 0) {
            Some(midnight) => Value::Time(midnight),
            None => Value::Null,
        }
    }
}

impl<T: ToValue> From<Option<T>> for Value {
    fn from(opt: Option<T>) -> Self {
        opt.to_value()
    }
}

fn mismatch<T>(expected: &'static str, value: &Value) -> Result<T> {
    Err(Error::conversion(expected, value.type_name()))
}

macro_rules! impl_from_value_int {
    ($($ty:ty),*) => {
        $(
            impl FromValue for $ty {
                fn from_value(value: Value) -> Result<Self> {
                    let expected = stringify!($ty);
                    let converted = match &value {
                        Value::I32(v) => <$ty>::try_from(*v).ok(),
                        Value::I64(v) => <$ty>::try_from(*v).ok(),
                        Value::U64(v) => <$ty>::try_from(*v).ok(),
                        Value::Bool(v) => Some(<$ty>::from(*v)),
                        Value::String(_) | Value::Bytes(_) => {
                            value.as_text().and_then(|s| s.trim().parse::<$ty>().ok())
                        }
                        _ => None,
                    };
                    match converted {
                        Some(v) => Ok(v),
                        None => mismatch(expected, &value),
                    }
                }
            }
        )*
    };
}

impl_from_value_int!(i8, i16, i32, i64, u8, u16, u32, u64);

impl FromValue for f64 {
    fn from_value(value: Value) -> Result<Self> {
        match &value {
            Value::F32(v) => Ok(f64::from(*v)),
            Value::F64(v) => Ok(*v),
            Value::I32(v) => Ok(f64::from(*v)),
            Value::I64(v) => Ok(*v as f64),
            Value::U64(v) => Ok(*v as f64),
            Value::String(_) | Value::Bytes(_) => match value.as_text().map(|s| s.trim().parse()) {
                Some(Ok(v)) => Ok(v),
                _ => mismatch("f64", &value),
            },
            _ => mismatch("f64", &value),
        }
    }
}

impl FromValue for f32 {
    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::F32(v) => Ok(v),
            other => f64::from_value(other).map(|v| v as f32),
        }
    }
}

impl FromValue for bool {
    fn from_value(value: Value) -> Result<Self> {
        match &value {
            Value::Bool(v) => Ok(*v),
            Value::I32(v) => Ok(*v != 0),
            Value::I64(v) => Ok(*v != 0),
            Value::U64(v) => Ok(*v != 0),
            Value::String(_) | Value::Bytes(_) => match value.as_text() {
                Some("1" | "t" | "true" | "TRUE") => Ok(true),
                Some("0" | "f" | "false" | "FALSE") => Ok(false),
                _ => mismatch("bool", &value),
            },
            _ => mismatch("bool", &value),
        }
    }
}

impl FromValue for String {
    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::String(s) => Ok(s),
            Value::Bytes(b) => {
                String::from_utf8(b).map_err(|_| Error::conversion("String", "BYTEA"))
            }
            Value::Json(j) => Ok(j.to_string()),
            other => mismatch("String", &other),
        }
    }
}

impl FromValue for Vec<u8> {
    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Bytes(b) => Ok(b),
            Value::String(s) => Ok(s.into_bytes()),
            other => mismatch("Vec<u8>", &other),
        }
    }
}

impl FromValue for serde_json::Value {
    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Json(j) => Ok(j),
            Value::String(s) => Ok(serde_json::from_str(&s)?),
            Value::Bytes(b) => Ok(serde_json::from_slice(&b)?),
            other => mismatch("JSON", &other),
        }
    }
}

impl FromValue for NaiveDateTime {
    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Time(t) => Ok(t),
            Value::String(_) | Value::Bytes(_) => match value.as_text() {
                Some(s) => parse_time(s),
                None => Err(Error::CantConvertToTime { found: "BYTEA" }),
            },
            other => Err(Error::CantConvertToTime {
                found: other.type_name(),
            }),
        }
    }
}

impl FromValue for DateTime<Utc> {
    fn from_value(value: Value) -> Result<Self> {
        NaiveDateTime::from_value(value).map(|t| t.and_utc())
    }
}

impl FromValue for NaiveDate {
    fn from_value(value: Value) -> Result<Self> {
        NaiveDateTime::from_value(value).map(|t| t.date())
    }
}

/// Parse the textual timestamp forms drivers hand back.
///
/// Accepts `YYYY-MM-DD`, `YYYY-MM-DD HH:MM:SS` with up to nine fractional
/// digits (space or `T` separated), and offset-carrying forms which are
/// normalized to UTC.
pub fn parse_time(input: &str) -> Result<NaiveDateTime> {
    let s = input.trim();
    let naive = match s.len() {
        10 => NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .ok()
            .and_then(|d| d.and_hms_opt(0, 0, 0)),
        19..=29 => NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f")
            .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f"))
            .ok(),
        _ => None,
    };

    naive
        .or_else(|| DateTime::parse_from_rfc3339(s).ok().map(|t| t.naive_utc()))
        .or_else(|| {
            DateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f%#z")
                .ok()
                .map(|t| t.naive_utc())
        })
        .ok_or_else(|| Error::InvalidTimestring {
            input: input.to_string(),
        })
}

#[cfg(feature = "uuid-support")]
mod uuid_support {
    use super::*;
    use uuid::Uuid;

    impl ToValue for Uuid {
        fn to_value(&self) -> Value {
            Value::String(self.to_string())
        }
    }

    impl From<Uuid> for Value {
        fn from(val: Uuid) -> Self {
            val.to_value()
        }
    }

    impl FromValue for Uuid {
        fn from_value(value: Value) -> Result<Self> {
            match &value {
                Value::Bytes(b) if b.len() == 16 => {
                    Uuid::from_slice(b).map_err(|_| Error::conversion("Uuid", "BYTEA"))
                }
                Value::String(s) => {
                    Uuid::parse_str(s).map_err(|_| Error::conversion("Uuid", "TEXT"))
                }
                _ => mismatch("Uuid", &value),
            }
        }
    }
}

#[cfg(feature = "decimal-support")]
mod decimal_support {
    use super::*;
    use rust_decimal::Decimal;

    impl ToValue for Decimal {
        fn to_value(&self) -> Value {
            Value::String(self.to_string())
        }
    }

    impl From<Decimal> for Value {
        fn from(val: Decimal) -> Self {
            val.to_value()
        }
    }

    impl FromValue for Decimal {
        fn from_value(value: Value) -> Result<Self> {
            let parsed = match &value {
                Value::I32(v) => Some(Decimal::from(*v)),
                Value::I64(v) => Some(Decimal::from(*v)),
                Value::U64(v) => Some(Decimal::from(*v)),
                Value::F64(v) => Decimal::try_from(*v).ok(),
                Value::F32(v) => Decimal::try_from(*v).ok(),
                Value::String(_) | Value::Bytes(_) => {
                    value.as_text().and_then(|s| s.trim().parse().ok())
                }
                _ => None,
            };
            match parsed {
                Some(d) => Ok(d),
                None => mismatch("Decimal", &value),
            }
        }
    }
}
