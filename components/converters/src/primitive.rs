//! Scalar conversions.

use core_types::{JsError, Value, MAX_SAFE_INTEGER};
use num_bigint::BigInt;
use num_traits::ToPrimitive;

/// Converts a native value to a script value.
pub trait ToScript {
    /// Performs the conversion.
    fn to_script(&self) -> Value;
}

/// Converts a script value to a native value.
pub trait FromScript: Sized {
    /// Performs the conversion; values of the wrong shape are type errors.
    fn from_script(value: &Value) -> Result<Self, JsError>;
}

pub(crate) fn expected(what: &str, value: &Value) -> JsError {
    JsError::type_error(format!("Expected {}, got {}", what, value.type_of()))
}

pub(crate) fn number_of(value: &Value) -> Result<f64, JsError> {
    match value {
        Value::Smi(n) => Ok(f64::from(*n)),
        Value::Double(n) => Ok(*n),
        Value::BigInt(n) => n.to_f64().ok_or_else(|| expected("number", value)),
        other => Err(expected("number", other)),
    }
}

impl ToScript for bool {
    fn to_script(&self) -> Value {
        Value::Boolean(*self)
    }
}

impl FromScript for bool {
    fn from_script(value: &Value) -> Result<Self, JsError> {
        match value {
            Value::Boolean(b) => Ok(*b),
            other => Err(expected("boolean", other)),
        }
    }
}

macro_rules! small_integer {
    ($($ty:ty),*) => {
        $(
            impl ToScript for $ty {
                fn to_script(&self) -> Value {
                    Value::number(f64::from(*self))
                }
            }

            impl FromScript for $ty {
                /// Numbers are truncated; out-of-range values saturate.
                fn from_script(value: &Value) -> Result<Self, JsError> {
                    Ok(number_of(value)?.trunc() as $ty)
                }
            }
        )*
    };
}

small_integer!(u8, i16, u16, i32, u32);

impl ToScript for i64 {
    /// Safe integers become numbers, the rest `BigInt`s.
    fn to_script(&self) -> Value {
        if self.unsigned_abs() <= MAX_SAFE_INTEGER as u64 {
            Value::number(*self as f64)
        } else {
            Value::BigInt(BigInt::from(*self))
        }
    }
}

impl FromScript for i64 {
    fn from_script(value: &Value) -> Result<Self, JsError> {
        match value {
            Value::BigInt(n) => n
                .to_i64()
                .ok_or_else(|| JsError::type_error(format!("{} does not fit in Int64", n))),
            other => Ok(number_of(other)?.trunc() as i64),
        }
    }
}

impl ToScript for u64 {
    fn to_script(&self) -> Value {
        if *self <= MAX_SAFE_INTEGER as u64 {
            Value::number(*self as f64)
        } else {
            Value::BigInt(BigInt::from(*self))
        }
    }
}

impl FromScript for u64 {
    fn from_script(value: &Value) -> Result<Self, JsError> {
        match value {
            Value::BigInt(n) => n
                .to_u64()
                .ok_or_else(|| JsError::type_error(format!("{} does not fit in UInt64", n))),
            other => Ok(number_of(other)?.trunc() as u64),
        }
    }
}

impl ToScript for f32 {
    fn to_script(&self) -> Value {
        Value::number(f64::from(*self))
    }
}

impl FromScript for f32 {
    fn from_script(value: &Value) -> Result<Self, JsError> {
        Ok(number_of(value)? as f32)
    }
}

impl ToScript for f64 {
    fn to_script(&self) -> Value {
        Value::number(*self)
    }
}

impl FromScript for f64 {
    fn from_script(value: &Value) -> Result<Self, JsError> {
        number_of(value)
    }
}

impl ToScript for String {
    fn to_script(&self) -> Value {
        Value::String(self.clone())
    }
}

impl ToScript for str {
    fn to_script(&self) -> Value {
        Value::string(self)
    }
}

impl FromScript for String {
    fn from_script(value: &Value) -> Result<Self, JsError> {
        match value {
            Value::String(s) => Ok(s.clone()),
            other => Err(expected("string", other)),
        }
    }
}

/// Boxed optionals: an empty box is `null`.
impl<T: ToScript> ToScript for Option<T> {
    fn to_script(&self) -> Value {
        match self {
            Some(inner) => inner.to_script(),
            None => Value::Null,
        }
    }
}

impl<T: FromScript> FromScript for Option<T> {
    fn from_script(value: &Value) -> Result<Self, JsError> {
        if value.is_nullish() {
            Ok(None)
        } else {
            T::from_script(value).map(Some)
        }
    }
}

/// A 16-bit character as a one-character string. A lone surrogate stays a
/// single UTF-16 unit.
///
/// ```
/// use converters::{char16_from_script, char16_to_script};
/// use core_types::Value;
///
/// assert_eq!(char16_to_script(0x41), Value::string("A"));
/// assert_eq!(char16_from_script(&char16_to_script(0xD800)).unwrap(), 0xD800);
/// ```
pub fn char16_to_script(c: u16) -> Value {
    Value::from_utf16(&[c])
}

/// A one-character string (one UTF-16 unit) as a 16-bit character.
pub fn char16_from_script(value: &Value) -> Result<u16, JsError> {
    let units = value.to_utf16().ok_or_else(|| expected("char", value))?;
    match units.as_slice() {
        [c] => Ok(*c),
        _ => Err(JsError::type_error(format!(
            "Expected a single character, got '{}'",
            value
        ))),
    }
}
