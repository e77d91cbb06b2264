//! Time point and duration conversions.

use crate::primitive::{expected, number_of};
use crate::{FromScript, ToScript};
use core_types::{JsError, Value};
use native_model::{DateTime, TimeSpan};

/// Time points become `Date`s.
impl ToScript for DateTime {
    fn to_script(&self) -> Value {
        Value::Date(self.to_unix_millis())
    }
}

/// Accepts a `Date` or a number of milliseconds since the Unix epoch.
impl FromScript for DateTime {
    fn from_script(value: &Value) -> Result<Self, JsError> {
        let ms = match value {
            Value::Date(ms) => *ms,
            Value::Smi(_) | Value::Double(_) => number_of(value)?,
            other => return Err(expected("Date", other)),
        };
        if !ms.is_finite() {
            return Err(JsError::range_error("Invalid time value"));
        }
        Ok(DateTime::from_unix_millis(ms))
    }
}

/// Durations become numbers of milliseconds.
impl ToScript for TimeSpan {
    fn to_script(&self) -> Value {
        Value::number(self.to_millis())
    }
}

impl FromScript for TimeSpan {
    fn from_script(value: &Value) -> Result<Self, JsError> {
        let ms = number_of(value)?;
        if !ms.is_finite() {
            return Err(JsError::range_error("Invalid duration"));
        }
        Ok(TimeSpan::from_millis(ms))
    }
}
