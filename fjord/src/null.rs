//! Nullable column wrappers

use crate::{FromValue, Result, ToValue, Value};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// A column value that may be SQL `NULL`.
///
/// Serializes to JSON as `null` or the bare inner value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Null<T>(pub Option<T>);

pub type NullString = Null<String>;
pub type NullInt64 = Null<i64>;
pub type NullFloat64 = Null<f64>;
pub type NullBool = Null<bool>;
pub type NullTime = Null<NaiveDateTime>;

impl<T> Null<T> {
    /// A valid (non-NULL) value
    pub fn new(value: T) -> Self {
        Self(Some(value))
    }

    /// SQL `NULL`
    pub fn null() -> Self {
        Self(None)
    }

    pub fn valid(&self) -> bool {
        self.0.is_some()
    }

    pub fn value(&self) -> Option<&T> {
        self.0.as_ref()
    }

    pub fn into_option(self) -> Option<T> {
        self.0
    }
}

impl<T> From<Option<T>> for Null<T> {
    fn from(opt: Option<T>) -> Self {
        Self(opt)
    }
}

impl<T: ToValue> ToValue for Null<T> {
    fn to_value(&self) -> Value {
        self.0.to_value()
    }
}

impl<T: FromValue> FromValue for Null<T> {
    fn from_value(value: Value) -> Result<Self> {
        Option::<T>::from_value(value).map(Self)
    }
}

impl<T: ToValue> From<Null<T>> for Value {
    fn from(val: Null<T>) -> Self {
        val.to_value()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_scan_null_and_valid() {
        let s = NullString::from_value(Value::Null).unwrap();
        assert!(!s.valid());

        let n = NullInt64::from_value(Value::I32(42)).unwrap();
        assert_eq!(n, NullInt64::new(42));

        let b = NullBool::from_value(Value::I64(1)).unwrap();
        assert_eq!(b.value(), Some(&true));
    }

    #[test]
    fn test_null_time_from_text() {
        let t = NullTime::from_value(Value::String("2015-01-02 03:04:05.000006".into())).unwrap();
        let expected = NaiveDate::from_ymd_opt(2015, 1, 2)
            .unwrap()
            .and_hms_micro_opt(3, 4, 5, 6)
            .unwrap();
        assert_eq!(t.into_option(), Some(expected));
    }

    #[test]
    fn test_to_value() {
        assert_eq!(NullFloat64::null().to_value(), Value::Null);
        assert_eq!(NullFloat64::new(1.5).to_value(), Value::F64(1.5));
    }

    #[test]
    fn test_json_shape() {
        let valid = serde_json::to_string(&NullString::new("wow".into())).unwrap();
        assert_eq!(valid, "\"wow\"");
        let null = serde_json::to_string(&NullInt64::null()).unwrap();
        assert_eq!(null, "null");

        let back: NullInt64 = serde_json::from_str("42").unwrap();
        assert_eq!(back, NullInt64::new(42));
        let back: NullInt64 = serde_json::from_str("null").unwrap();
        assert!(!back.valid());
    }
}
